use axum::extract::{Path, Query, State};
use axum::response::Json;
use chrono::Utc;
use serde::Deserialize;

use super::{CreatedResponse, MessageResponse};
use crate::config::{DEFAULT_ENVIRONMENT, RESULT_STATUSES};
use crate::error::ApiError;
use crate::folder_tree::{self, scope};
use crate::model::{TestCase, TestCaseWithScreenshots, TestResult};
use crate::state::SharedState;

// ============================================================================
// Request types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct TestCaseInput {
    #[serde(default)]
    pub main_category: String,
    #[serde(default)]
    pub sub_category: String,
    #[serde(default)]
    pub detail_category: String,
    #[serde(default)]
    pub pre_condition: String,
    #[serde(default)]
    pub expected_result: String,
    #[serde(default)]
    pub result_status: Option<String>,
    #[serde(default)]
    pub remark: String,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub folder_id: Option<i64>,
    #[serde(default)]
    pub automation_code_path: String,
    #[serde(default)]
    pub automation_code_type: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub folder_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StatusInput {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct TestResultInput {
    pub test_case_id: i64,
    pub result: String,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub executed_by: Option<String>,
    #[serde(default)]
    pub execution_duration: Option<f64>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub screenshot: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// List test cases, scoped to the selected folder when `folder_id` is
/// given. Scoping walks the folder tree, so selecting an environment or
/// deployment-date folder covers every feature folder nested under it.
pub async fn list_testcases(
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<TestCase>> {
    let cases = match state.db.list_test_cases() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to list test cases: {}", e);
            return Json(Vec::new());
        }
    };

    let Some(selected) = query.folder_id else {
        return Json(cases);
    };

    let folders = match state.db.list_folders() {
        Ok(f) => f,
        Err(e) => {
            tracing::error!("Failed to load folders for filtering: {}", e);
            return Json(cases);
        }
    };
    let tree = folder_tree::build_tree(&folders);
    if scope::find_folder_in_tree(&tree, selected).is_none() {
        // Stale selections fall open to the full list; make that visible.
        tracing::warn!("Filter requested for unknown folder {}", selected);
    }
    Json(scope::filter_test_cases(cases, Some(selected), &tree))
}

pub async fn get_testcase(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<TestCaseWithScreenshots>, ApiError> {
    let case = state
        .db
        .get_test_case(id)?
        .ok_or(ApiError::NotFound("Test case"))?;
    let screenshots = state.db.list_screenshots_for_case(id)?;
    Ok(Json(TestCaseWithScreenshots { case, screenshots }))
}

pub async fn create_testcase(
    State(state): State<SharedState>,
    Json(input): Json<TestCaseInput>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let result_status = validate_status(input.result_status.as_deref().unwrap_or("N/T"))?;

    // No folder given: file under the first deployment folder of the dev
    // environment, matching how the console seeds new cases.
    let folder_id = match input.folder_id {
        Some(id) => {
            state
                .db
                .get_folder(id)?
                .ok_or(ApiError::NotFound("Folder"))?;
            Some(id)
        }
        None => state.db.default_folder_id()?,
    };

    let now = Utc::now().to_rfc3339();
    let case = TestCase {
        id: 0,
        main_category: input.main_category,
        sub_category: input.sub_category,
        detail_category: input.detail_category,
        pre_condition: input.pre_condition,
        expected_result: input.expected_result,
        result_status,
        remark: input.remark,
        environment: input
            .environment
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
        folder_id,
        automation_code_path: input.automation_code_path,
        automation_code_type: input.automation_code_type,
        created_at: now.clone(),
        updated_at: now,
    };
    let id = state.db.insert_test_case(&case)?;
    Ok(Json(CreatedResponse {
        ok: true,
        message: "Test case created".to_string(),
        id,
    }))
}

pub async fn update_testcase(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(input): Json<TestCaseInput>,
) -> Result<Json<MessageResponse>, ApiError> {
    let existing = state
        .db
        .get_test_case(id)?
        .ok_or(ApiError::NotFound("Test case"))?;

    let result_status = match input.result_status {
        Some(raw) => validate_status(&raw)?,
        None => existing.result_status.clone(),
    };
    if let Some(folder_id) = input.folder_id {
        state
            .db
            .get_folder(folder_id)?
            .ok_or(ApiError::NotFound("Folder"))?;
    }

    let case = TestCase {
        main_category: input.main_category,
        sub_category: input.sub_category,
        detail_category: input.detail_category,
        pre_condition: input.pre_condition,
        expected_result: input.expected_result,
        result_status,
        remark: input.remark,
        environment: input.environment.unwrap_or(existing.environment.clone()),
        folder_id: input.folder_id.or(existing.folder_id),
        automation_code_path: input.automation_code_path,
        automation_code_type: input.automation_code_type,
        ..existing
    };
    if state.db.update_test_case(id, &case)? {
        Ok(Json(MessageResponse {
            ok: true,
            message: "Test case updated".to_string(),
        }))
    } else {
        Err(ApiError::NotFound("Test case"))
    }
}

pub async fn update_testcase_status(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(input): Json<StatusInput>,
) -> Result<Json<MessageResponse>, ApiError> {
    let status = validate_status(&input.status)?;
    if state.db.update_test_case_status(id, &status)? {
        Ok(Json(MessageResponse {
            ok: true,
            message: "Test case status updated".to_string(),
        }))
    } else {
        Err(ApiError::NotFound("Test case"))
    }
}

pub async fn delete_testcase(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if state.db.delete_test_case(id)? {
        Ok(Json(MessageResponse {
            ok: true,
            message: "Test case deleted".to_string(),
        }))
    } else {
        Err(ApiError::NotFound("Test case"))
    }
}

pub async fn list_testresults(
    State(state): State<SharedState>,
    Path(test_case_id): Path<i64>,
) -> Json<Vec<TestResult>> {
    match state.db.list_results_for_case(test_case_id) {
        Ok(results) => Json(results),
        Err(e) => {
            tracing::error!("Failed to list test results: {}", e);
            Json(Vec::new())
        }
    }
}

/// Record a test run. The owning case's result_status rolls forward to
/// the posted result so the console reflects the latest run immediately.
pub async fn create_testresult(
    State(state): State<SharedState>,
    Json(input): Json<TestResultInput>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let case = state
        .db
        .get_test_case(input.test_case_id)?
        .ok_or(ApiError::NotFound("Test case"))?;
    let result = validate_status(&input.result)?;

    let record = TestResult {
        id: 0,
        test_case_id: input.test_case_id,
        result: result.clone(),
        environment: input.environment.or(Some(case.environment)),
        executed_by: input.executed_by,
        execution_duration: input.execution_duration,
        error_message: input.error_message,
        screenshot: input.screenshot,
        notes: input.notes,
        executed_at: Utc::now().to_rfc3339(),
    };
    let id = state.db.insert_result(&record)?;
    state.db.update_test_case_status(input.test_case_id, &result)?;

    Ok(Json(CreatedResponse {
        ok: true,
        message: "Test result recorded".to_string(),
        id,
    }))
}

fn validate_status(raw: &str) -> Result<String, ApiError> {
    if RESULT_STATUSES.contains(&raw) {
        Ok(raw.to_string())
    } else {
        Err(ApiError::Validation(format!(
            "unknown result status '{}' (expected one of {:?})",
            raw, RESULT_STATUSES
        )))
    }
}
