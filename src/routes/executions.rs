use axum::extract::{Path, State};
use axum::response::Json;
use chrono::Utc;
use serde::Deserialize;

use super::{CreatedResponse, MessageResponse};
use crate::error::ApiError;
use crate::model::TestExecution;
use crate::state::SharedState;

const TEST_TYPES: &[&str] = &["performance", "automation", "manual"];

#[derive(Debug, Deserialize)]
pub struct ExecutionInput {
    pub test_type: String,
    #[serde(default)]
    pub test_id: Option<i64>,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub executed_by: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompleteInput {
    pub status: String,
    #[serde(default)]
    pub result_summary: Option<String>,
}

pub async fn list_executions(State(state): State<SharedState>) -> Json<Vec<TestExecution>> {
    match state.db.list_executions() {
        Ok(executions) => Json(executions),
        Err(e) => {
            tracing::error!("Failed to list executions: {}", e);
            Json(Vec::new())
        }
    }
}

/// Open a Running execution record. The actual run happens in an external
/// engine; this only tracks it.
pub async fn start_execution(
    State(state): State<SharedState>,
    Json(input): Json<ExecutionInput>,
) -> Result<Json<CreatedResponse>, ApiError> {
    if !TEST_TYPES.contains(&input.test_type.as_str()) {
        return Err(ApiError::Validation(format!(
            "unknown test type '{}' (expected one of {:?})",
            input.test_type, TEST_TYPES
        )));
    }

    let execution = TestExecution {
        id: 0,
        test_type: input.test_type,
        test_id: input.test_id,
        environment: input.environment,
        executed_by: input.executed_by,
        status: "Running".to_string(),
        result_summary: None,
        started_at: Utc::now().to_rfc3339(),
        completed_at: None,
    };
    let id = state.db.insert_execution(&execution)?;
    Ok(Json(CreatedResponse {
        ok: true,
        message: "Execution started".to_string(),
        id,
    }))
}

pub async fn complete_execution(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(input): Json<CompleteInput>,
) -> Result<Json<MessageResponse>, ApiError> {
    if input.status != "Completed" && input.status != "Failed" {
        return Err(ApiError::Validation(
            "status must be 'Completed' or 'Failed'".to_string(),
        ));
    }

    state
        .db
        .get_execution(id)?
        .ok_or(ApiError::NotFound("Execution"))?;

    if state
        .db
        .complete_execution(id, &input.status, input.result_summary.as_deref())?
    {
        Ok(Json(MessageResponse {
            ok: true,
            message: format!("Execution {}", input.status.to_lowercase()),
        }))
    } else {
        Ok(Json(MessageResponse {
            ok: false,
            message: "Execution is not running".to_string(),
        }))
    }
}
