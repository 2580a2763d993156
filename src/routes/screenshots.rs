use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;
use serde::Deserialize;

use super::CreatedResponse;
use crate::error::ApiError;
use crate::model::Screenshot;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct ScreenshotInput {
    pub test_case_id: i64,
    pub screenshot_path: String,
    #[serde(default)]
    pub description: Option<String>,
}

pub async fn list_for_testcase(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Json<Vec<Screenshot>> {
    match state.db.list_screenshots_for_case(id) {
        Ok(screenshots) => Json(screenshots),
        Err(e) => {
            tracing::error!("Failed to list screenshots: {}", e);
            Json(Vec::new())
        }
    }
}

/// Register screenshot metadata. The file itself is written by the
/// external test engine into the screenshots directory.
pub async fn create_screenshot(
    State(state): State<SharedState>,
    Json(input): Json<ScreenshotInput>,
) -> Result<Json<CreatedResponse>, ApiError> {
    state
        .db
        .get_test_case(input.test_case_id)?
        .ok_or(ApiError::NotFound("Test case"))?;

    let screenshot = Screenshot {
        id: 0,
        test_case_id: input.test_case_id,
        screenshot_path: input.screenshot_path,
        description: input.description,
        created_at: Utc::now().to_rfc3339(),
    };
    let id = state.db.insert_screenshot(&screenshot)?;
    Ok(Json(CreatedResponse {
        ok: true,
        message: "Screenshot registered".to_string(),
        id,
    }))
}

pub async fn serve_screenshot(
    State(state): State<SharedState>,
    Path(filename): Path<String>,
) -> Response {
    let Some(path) = state.config.screenshot_path(&filename) else {
        return not_found(&filename);
    };
    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.as_ref())], bytes).into_response()
        }
        Err(_) => not_found(&filename),
    }
}

fn not_found(filename: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": format!("screenshot '{}' not found", filename),
        })),
    )
        .into_response()
}
