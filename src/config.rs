use clap::Parser;
use std::path::PathBuf;

/// Casetrack Server — REST backend for the test-case tracking console.
#[derive(Parser, Debug, Clone)]
#[command(name = "casetrack-server")]
pub struct CliArgs {
    /// HTTP port
    #[arg(long = "port", default_value_t = DEFAULT_SERVER_PORT)]
    pub port: u16,

    /// Path to the SQLite database file (defaults to the platform data dir)
    #[arg(long = "db-path")]
    pub db_path: Option<PathBuf>,

    /// Directory holding screenshot files referenced by test results
    #[arg(long = "screenshots-dir")]
    pub screenshots_dir: Option<PathBuf>,

    /// Log file for server output (stdout only when absent)
    #[arg(short = 'l', long = "log-file")]
    pub log_file: Option<PathBuf>,

    /// Insert a default environment/deployment folder pair on first start
    #[arg(long = "seed")]
    pub seed: bool,
}

pub struct ServerConfig {
    pub port: u16,
    pub db_path: PathBuf,
    pub screenshots_dir: PathBuf,
    pub log_file: Option<PathBuf>,
    pub seed: bool,
}

// Port constants
pub const DEFAULT_SERVER_PORT: u16 = 5000;

// Query limits
pub const EXECUTION_LIST_LIMIT: i64 = 100;
pub const RESULT_LIST_LIMIT: i64 = 200;

// Defaults applied when a test case arrives without them
pub const DEFAULT_ENVIRONMENT: &str = "dev";
pub const DEFAULT_USER_ROLE: &str = "User";

// Valid test-case result statuses, in display order
pub const RESULT_STATUSES: &[&str] = &["N/T", "Pass", "Fail", "N/A", "Block"];

// Environments the dashboard summarizes
pub const ENVIRONMENTS: &[&str] = &["dev", "staging", "prod"];

impl ServerConfig {
    pub fn from_args(args: CliArgs) -> Self {
        let data_dir = match args.db_path.as_ref().and_then(|p| p.parent()) {
            Some(parent) => parent.to_path_buf(),
            None => dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("casetrack"),
        };

        let db_path = args
            .db_path
            .unwrap_or_else(|| data_dir.join("casetrack.db"));
        let screenshots_dir = args
            .screenshots_dir
            .unwrap_or_else(|| data_dir.join("screenshots"));

        ServerConfig {
            port: args.port,
            db_path,
            screenshots_dir,
            log_file: args.log_file,
            seed: args.seed,
        }
    }

    /// Absolute path of a stored screenshot file. Rejects absolute inputs
    /// and parent components so lookups stay inside the screenshots dir.
    pub fn screenshot_path(&self, filename: &str) -> Option<PathBuf> {
        let candidate = PathBuf::from(filename);
        if candidate.is_absolute()
            || candidate
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return None;
        }
        Some(self.screenshots_dir.join(candidate))
    }
}
