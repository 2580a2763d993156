use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::SharedState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: i64,
    pub database: DatabaseHealth,
}

#[derive(Serialize)]
pub struct DatabaseHealth {
    pub reachable: bool,
    pub folders: i64,
    pub test_cases: i64,
    pub running_executions: i64,
}

/// Overall health status string. Pure function extracted for testability.
pub fn determine_overall_status(db_reachable: bool, running_executions: i64) -> &'static str {
    if !db_reachable {
        "degraded"
    } else if running_executions > 0 {
        "busy"
    } else {
        "healthy"
    }
}

pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let folders = state.db.count_folders();
    let test_cases = state.db.count_test_cases();
    let running = state.db.count_running_executions();

    let reachable = folders.is_ok() && test_cases.is_ok() && running.is_ok();
    let running_executions = running.unwrap_or(0);

    Json(HealthResponse {
        status: determine_overall_status(reachable, running_executions).to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.uptime_secs(),
        database: DatabaseHealth {
            reachable,
            folders: folders.unwrap_or(0),
            test_cases: test_cases.unwrap_or(0),
            running_executions,
        },
    })
}
