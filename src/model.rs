use serde::{Deserialize, Serialize};

// ============================================================================
// Persisted records
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub id: i64,
    pub main_category: String,
    pub sub_category: String,
    pub detail_category: String,
    pub pre_condition: String,
    pub expected_result: String,
    pub result_status: String, // N/T, Pass, Fail, N/A, Block
    pub remark: String,
    pub environment: String,
    pub folder_id: Option<i64>,
    pub automation_code_path: String,
    pub automation_code_type: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub id: i64,
    pub test_case_id: i64,
    pub result: String,
    pub environment: Option<String>,
    pub executed_by: Option<String>,
    pub execution_duration: Option<f64>,
    pub error_message: Option<String>,
    pub screenshot: Option<String>,
    pub notes: Option<String>,
    pub executed_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceTest {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub script_path: String,
    pub environment: String,
    pub parameters: serde_json::Value,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestExecution {
    pub id: i64,
    pub test_type: String, // performance, automation, manual
    pub test_id: Option<i64>,
    pub environment: Option<String>,
    pub executed_by: Option<String>,
    pub status: String, // Running, Completed, Failed
    pub result_summary: Option<String>,
    pub started_at: String,
    pub completed_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screenshot {
    pub id: i64,
    pub test_case_id: i64,
    pub screenshot_path: String,
    pub description: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: String,
    pub last_login: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub id: i64,
    pub environment: String,
    pub total_tests: i64,
    pub passed_tests: i64,
    pub failed_tests: i64,
    pub skipped_tests: i64,
    pub pass_rate: f64,
    pub last_updated: String,
}

// ============================================================================
// Composite responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCaseWithScreenshots {
    #[serde(flatten)]
    pub case: TestCase,
    pub screenshots: Vec<Screenshot>,
}
