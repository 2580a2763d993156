use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::db::Db;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: ServerConfig,
    pub db: Db,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let db = Db::new(&config.db_path)?;
        if config.seed {
            db.seed_defaults()?;
        }
        Ok(Self {
            config,
            db,
            started_at: Utc::now(),
        })
    }

    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
