use axum::extract::{Path, State};
use axum::response::Json;
use chrono::Utc;
use serde::Deserialize;

use super::{CreatedResponse, MessageResponse};
use crate::error::ApiError;
use crate::model::PerformanceTest;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct PerformanceTestInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub script_path: String,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub parameters: Option<serde_json::Value>,
}

pub async fn list_tests(State(state): State<SharedState>) -> Json<Vec<PerformanceTest>> {
    match state.db.list_performance_tests() {
        Ok(tests) => Json(tests),
        Err(e) => {
            tracing::error!("Failed to list performance tests: {}", e);
            Json(Vec::new())
        }
    }
}

pub async fn get_test(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<PerformanceTest>, ApiError> {
    let test = state
        .db
        .get_performance_test(id)?
        .ok_or(ApiError::NotFound("Performance test"))?;
    Ok(Json(test))
}

pub async fn create_test(
    State(state): State<SharedState>,
    Json(input): Json<PerformanceTestInput>,
) -> Result<Json<CreatedResponse>, ApiError> {
    if input.name.trim().is_empty() {
        return Err(ApiError::Validation("Test name is required".to_string()));
    }

    let now = Utc::now().to_rfc3339();
    let test = PerformanceTest {
        id: 0,
        name: input.name,
        description: input.description,
        script_path: input.script_path,
        environment: input.environment.unwrap_or_else(|| "prod".to_string()),
        parameters: input.parameters.unwrap_or_else(|| serde_json::json!({})),
        created_at: now.clone(),
        updated_at: now,
    };
    let id = state.db.insert_performance_test(&test)?;
    Ok(Json(CreatedResponse {
        ok: true,
        message: "Performance test created".to_string(),
        id,
    }))
}

pub async fn update_test(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(input): Json<PerformanceTestInput>,
) -> Result<Json<MessageResponse>, ApiError> {
    let existing = state
        .db
        .get_performance_test(id)?
        .ok_or(ApiError::NotFound("Performance test"))?;

    let test = PerformanceTest {
        name: input.name,
        description: input.description,
        script_path: input.script_path,
        environment: input.environment.unwrap_or(existing.environment.clone()),
        parameters: input.parameters.unwrap_or(existing.parameters.clone()),
        ..existing
    };
    if state.db.update_performance_test(id, &test)? {
        Ok(Json(MessageResponse {
            ok: true,
            message: "Performance test updated".to_string(),
        }))
    } else {
        Err(ApiError::NotFound("Performance test"))
    }
}

pub async fn delete_test(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if state.db.delete_performance_test(id)? {
        Ok(Json(MessageResponse {
            ok: true,
            message: "Performance test deleted".to_string(),
        }))
    } else {
        Err(ApiError::NotFound("Performance test"))
    }
}
