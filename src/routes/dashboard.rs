use axum::extract::{Path, State};
use axum::response::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{CreatedResponse, MessageResponse};
use crate::error::ApiError;
use crate::folder_tree::{self, scope};
use crate::model::{DashboardSummary, TestCase};
use crate::state::SharedState;

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_test_cases: i64,
    pub total_performance_tests: i64,
    pub passed_tests: i64,
    pub failed_tests: i64,
    pub running_tests: i64,
}

#[derive(Debug, Serialize)]
pub struct TestCaseSummary {
    pub environment: String,
    pub total_testcases: usize,
    pub passed: usize,
    pub failed: usize,
    pub not_tested: usize,
    pub not_applicable: usize,
    pub blocked: usize,
    pub pass_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct ResultsSummary {
    pub environment: String,
    pub total_tests: usize,
    pub passed_tests: usize,
    pub failed_tests: usize,
    pub skipped_tests: usize,
    pub pass_rate: f64,
    pub last_updated: String,
}

#[derive(Debug, Serialize)]
pub struct FolderSummary {
    pub folder_id: i64,
    pub folder_name: String,
    pub total_testcases: usize,
    pub passed: usize,
    pub failed: usize,
    pub not_tested: usize,
    pub not_applicable: usize,
    pub blocked: usize,
    pub pass_rate: f64,
}

#[derive(Debug, Deserialize)]
pub struct SummaryInput {
    pub environment: String,
    #[serde(default)]
    pub total_tests: i64,
    #[serde(default)]
    pub passed_tests: i64,
    #[serde(default)]
    pub failed_tests: i64,
    #[serde(default)]
    pub skipped_tests: i64,
    #[serde(default)]
    pub pass_rate: f64,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn dashboard_stats(State(state): State<SharedState>) -> Json<DashboardStats> {
    let stats = build_stats(&state).unwrap_or_else(|e| {
        tracing::error!("Failed to compute dashboard stats: {}", e);
        DashboardStats {
            total_test_cases: 0,
            total_performance_tests: 0,
            passed_tests: 0,
            failed_tests: 0,
            running_tests: 0,
        }
    });
    Json(stats)
}

fn build_stats(state: &SharedState) -> anyhow::Result<DashboardStats> {
    Ok(DashboardStats {
        total_test_cases: state.db.count_test_cases()?,
        total_performance_tests: state.db.count_performance_tests()?,
        passed_tests: state.db.count_cases_with_status("Pass")?,
        failed_tests: state.db.count_cases_with_status("Fail")?,
        running_tests: state.db.count_running_executions()?,
    })
}

pub async fn testcases_summary(
    State(state): State<SharedState>,
    Path(environment): Path<String>,
) -> Result<Json<TestCaseSummary>, ApiError> {
    let cases = state.db.list_test_cases_by_environment(&environment)?;
    let tally = tally_statuses(&cases);
    Ok(Json(TestCaseSummary {
        environment,
        total_testcases: cases.len(),
        passed: tally.passed,
        failed: tally.failed,
        not_tested: tally.not_tested,
        not_applicable: tally.not_applicable,
        blocked: tally.blocked,
        pass_rate: tally.pass_rate(cases.len()),
    }))
}

pub async fn results_summary(
    State(state): State<SharedState>,
    Path(environment): Path<String>,
) -> Result<Json<ResultsSummary>, ApiError> {
    let results = state.db.list_results_by_environment(&environment)?;
    let total = results.len();
    let passed = results.iter().filter(|r| r.result == "Pass").count();
    let failed = results.iter().filter(|r| r.result == "Fail").count();
    let skipped = results
        .iter()
        .filter(|r| r.result == "N/A" || r.result == "Block")
        .count();
    let pass_rate = if total > 0 {
        round2(passed as f64 / total as f64 * 100.0)
    } else {
        0.0
    };
    Ok(Json(ResultsSummary {
        environment,
        total_tests: total,
        passed_tests: passed,
        failed_tests: failed,
        skipped_tests: skipped,
        pass_rate,
        last_updated: Utc::now().to_rfc3339(),
    }))
}

/// Pass/fail breakdown for a folder selection, scoped through the tree
/// exactly like the test-case list.
pub async fn folder_summary(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<FolderSummary>, ApiError> {
    let folders = state.db.list_folders()?;
    let tree = folder_tree::build_tree(&folders);
    let node = scope::find_folder_in_tree(&tree, id).ok_or(ApiError::NotFound("Folder"))?;
    let folder_name = node.name.clone();

    let cases = state.db.list_test_cases()?;
    let scoped = scope::filter_test_cases(cases, Some(id), &tree);
    let tally = tally_statuses(&scoped);

    Ok(Json(FolderSummary {
        folder_id: id,
        folder_name,
        total_testcases: scoped.len(),
        passed: tally.passed,
        failed: tally.failed,
        not_tested: tally.not_tested,
        not_applicable: tally.not_applicable,
        blocked: tally.blocked,
        pass_rate: tally.pass_rate(scoped.len()),
    }))
}

pub async fn list_summaries(State(state): State<SharedState>) -> Json<Vec<DashboardSummary>> {
    match state.db.list_summaries() {
        Ok(summaries) => Json(summaries),
        Err(e) => {
            tracing::error!("Failed to list dashboard summaries: {}", e);
            Json(Vec::new())
        }
    }
}

pub async fn create_summary(
    State(state): State<SharedState>,
    Json(input): Json<SummaryInput>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let summary = DashboardSummary {
        id: 0,
        environment: input.environment,
        total_tests: input.total_tests,
        passed_tests: input.passed_tests,
        failed_tests: input.failed_tests,
        skipped_tests: input.skipped_tests,
        pass_rate: input.pass_rate,
        last_updated: Utc::now().to_rfc3339(),
    };
    let id = state.db.insert_summary(&summary)?;
    Ok(Json(CreatedResponse {
        ok: true,
        message: "Dashboard summary created".to_string(),
        id,
    }))
}

pub async fn update_summary(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(input): Json<SummaryInput>,
) -> Result<Json<MessageResponse>, ApiError> {
    let summary = DashboardSummary {
        id,
        environment: input.environment,
        total_tests: input.total_tests,
        passed_tests: input.passed_tests,
        failed_tests: input.failed_tests,
        skipped_tests: input.skipped_tests,
        pass_rate: input.pass_rate,
        last_updated: Utc::now().to_rfc3339(),
    };
    if state.db.update_summary(id, &summary)? {
        Ok(Json(MessageResponse {
            ok: true,
            message: "Dashboard summary updated".to_string(),
        }))
    } else {
        Err(ApiError::NotFound("Dashboard summary"))
    }
}

pub async fn delete_summary(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if state.db.delete_summary(id)? {
        Ok(Json(MessageResponse {
            ok: true,
            message: "Dashboard summary deleted".to_string(),
        }))
    } else {
        Err(ApiError::NotFound("Dashboard summary"))
    }
}

/// Recompute every environment's summary from the live test cases,
/// updating existing rows in place and inserting rows for environments
/// seen for the first time.
pub async fn sync_summaries(
    State(state): State<SharedState>,
) -> Result<Json<Vec<DashboardSummary>>, ApiError> {
    let now = Utc::now().to_rfc3339();
    for environment in state.db.distinct_case_environments()? {
        let cases = state.db.list_test_cases_by_environment(&environment)?;
        let tally = tally_statuses(&cases);
        let computed = DashboardSummary {
            id: 0,
            environment: environment.clone(),
            total_tests: cases.len() as i64,
            passed_tests: tally.passed as i64,
            failed_tests: tally.failed as i64,
            skipped_tests: (tally.not_applicable + tally.blocked) as i64,
            pass_rate: tally.pass_rate(cases.len()),
            last_updated: now.clone(),
        };
        match state.db.find_summary_by_environment(&environment)? {
            Some(existing) => {
                state.db.update_summary(existing.id, &computed)?;
            }
            None => {
                state.db.insert_summary(&computed)?;
            }
        }
    }
    Ok(Json(state.db.list_summaries()?))
}

// ============================================================================
// Tallying
// ============================================================================

struct StatusTally {
    passed: usize,
    failed: usize,
    not_tested: usize,
    not_applicable: usize,
    blocked: usize,
}

impl StatusTally {
    fn pass_rate(&self, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        round2(self.passed as f64 / total as f64 * 100.0)
    }
}

fn tally_statuses(cases: &[TestCase]) -> StatusTally {
    StatusTally {
        passed: count_status(cases, "Pass"),
        failed: count_status(cases, "Fail"),
        not_tested: count_status(cases, "N/T"),
        not_applicable: count_status(cases, "N/A"),
        blocked: count_status(cases, "Block"),
    }
}

fn count_status(cases: &[TestCase], status: &str) -> usize {
    cases.iter().filter(|c| c.result_status == status).count()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
