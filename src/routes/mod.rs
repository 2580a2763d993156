pub mod console;
pub mod dashboard;
pub mod executions;
pub mod folders;
pub mod health;
pub mod performance;
pub mod screenshots;
pub mod testcases;
pub mod users;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub ok: bool,
    pub message: String,
    pub id: i64,
}
