use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

use casetrack_server::config::ServerConfig;
use casetrack_server::server::build_router;
use casetrack_server::state::AppState;

fn test_router(dir: &tempfile::TempDir) -> Router {
    let config = ServerConfig {
        port: 0,
        db_path: dir.path().join("casetrack.db"),
        screenshots_dir: dir.path().join("screenshots"),
        log_file: None,
        seed: false,
    };
    let state = Arc::new(AppState::new(config).expect("state"));
    build_router(state)
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn create_folder(router: &Router, body: Value) -> i64 {
    let (status, value) = send(router, "POST", "/folders", Some(body)).await;
    assert_eq!(status, StatusCode::OK, "create folder failed: {value}");
    value["id"].as_i64().unwrap()
}

#[tokio::test]
async fn health_reports_healthy() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    let (status, value) = send(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["status"], "healthy");
    assert_eq!(value["database"]["reachable"], true);
}

#[tokio::test]
async fn folder_nesting_is_enforced() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    // A feature folder cannot live at the root.
    let (status, _) = send(
        &router,
        "POST",
        "/folders",
        Some(json!({"name": "Login", "folder_type": "feature"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let env = create_folder(
        &router,
        json!({"name": "DEV", "folder_type": "environment", "environment": "dev"}),
    )
    .await;

    // A feature folder cannot sit directly under an environment.
    let (status, _) = send(
        &router,
        "POST",
        "/folders",
        Some(json!({"name": "Login", "folder_type": "feature", "parent_folder_id": env})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let dep = create_folder(
        &router,
        json!({
            "name": "2025-08-06",
            "folder_type": "deployment_date",
            "deployment_date": "2025-08-06",
            "parent_folder_id": env
        }),
    )
    .await;
    let (status, _) = send(
        &router,
        "POST",
        "/folders",
        Some(json!({"name": "Login", "folder_type": "feature", "parent_folder_id": dep})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn tree_selection_scopes_the_case_list() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    let env = create_folder(
        &router,
        json!({"name": "DEV", "folder_type": "environment", "environment": "dev"}),
    )
    .await;
    let dep = create_folder(
        &router,
        json!({"name": "2025-08-06", "folder_type": "deployment_date", "parent_folder_id": env}),
    )
    .await;
    let feature = create_folder(
        &router,
        json!({"name": "Login", "folder_type": "feature", "parent_folder_id": dep}),
    )
    .await;

    let (status, created) = send(
        &router,
        "POST",
        "/testcases",
        Some(json!({"main_category": "Auth", "folder_id": feature})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create case failed: {created}");
    let in_scope = created["id"].as_i64().unwrap();

    // A second case filed under a different environment's subtree.
    let other_env = create_folder(
        &router,
        json!({"name": "STAGING", "folder_type": "environment", "environment": "staging"}),
    )
    .await;
    let other_dep = create_folder(
        &router,
        json!({"name": "2025-08-07", "folder_type": "deployment_date", "parent_folder_id": other_env}),
    )
    .await;
    let (status, _) = send(
        &router,
        "POST",
        "/testcases",
        Some(json!({"main_category": "Other", "folder_id": other_dep})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    for selected in [env, dep, feature] {
        let (status, value) =
            send(&router, "GET", &format!("/testcases?folder_id={selected}"), None).await;
        assert_eq!(status, StatusCode::OK);
        let list = value.as_array().unwrap();
        assert_eq!(list.len(), 1, "selection {selected} should scope to one case");
        assert_eq!(list[0]["id"].as_i64().unwrap(), in_scope);
    }

    // Unknown selections fall open to the full list.
    let (status, value) = send(&router, "GET", "/testcases?folder_id=9999", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value.as_array().unwrap().len(), 2);

    // No selection: everything, in insertion order.
    let (_, value) = send(&router, "GET", "/testcases", None).await;
    assert_eq!(value.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn folder_tree_and_scope_endpoints() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    let env = create_folder(
        &router,
        json!({"name": "DEV", "folder_type": "environment", "environment": "dev"}),
    )
    .await;
    let dep = create_folder(
        &router,
        json!({"name": "2025-08-06", "folder_type": "deployment_date", "parent_folder_id": env}),
    )
    .await;
    let (status, _) = send(
        &router,
        "POST",
        "/folders/feature",
        Some(json!({"parent_folder_id": dep, "names": ["Login", "Checkout"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, tree) = send(&router, "GET", "/folders/tree", None).await;
    assert_eq!(status, StatusCode::OK);
    let roots = tree.as_array().unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0]["type"], "environment");
    let deps = roots[0]["children"].as_array().unwrap();
    assert_eq!(deps[0]["type"], "deployment_date");
    assert_eq!(deps[0]["children"].as_array().unwrap().len(), 2);

    let (status, scope) = send(&router, "GET", &format!("/folders/{env}/scope"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(scope["scoped"], true);
    // deployment + two features
    assert_eq!(scope["folder_ids"].as_array().unwrap().len(), 3);

    let (_, scope) = send(&router, "GET", "/folders/9999/scope", None).await;
    assert_eq!(scope["scoped"], false);
}

#[tokio::test]
async fn recording_a_result_rolls_the_case_status() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    let (_, created) = send(
        &router,
        "POST",
        "/testcases",
        Some(json!({"main_category": "Auth"})),
    )
    .await;
    let case_id = created["id"].as_i64().unwrap();

    let (status, _) = send(
        &router,
        "POST",
        "/testresults",
        Some(json!({"test_case_id": case_id, "result": "Pass", "executed_by": "ci"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, case) = send(&router, "GET", &format!("/testcases/{case_id}"), None).await;
    assert_eq!(case["result_status"], "Pass");

    let (_, results) = send(&router, "GET", &format!("/testresults/{case_id}"), None).await;
    assert_eq!(results.as_array().unwrap().len(), 1);

    // Unknown statuses are rejected.
    let (status, _) = send(
        &router,
        "POST",
        "/testresults",
        Some(json!({"test_case_id": case_id, "result": "Maybe"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_users_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    let body = json!({"username": "admin", "email": "admin@example.com", "role": "Administrator"});
    let (status, _) = send(&router, "POST", "/users", Some(body.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, value) = send(&router, "POST", "/users", Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(value["error"].as_str().unwrap().contains("username"));
}

#[tokio::test]
async fn dashboard_stats_and_folder_summary() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    let env = create_folder(
        &router,
        json!({"name": "DEV", "folder_type": "environment", "environment": "dev"}),
    )
    .await;
    let dep = create_folder(
        &router,
        json!({"name": "2025-08-06", "folder_type": "deployment_date", "parent_folder_id": env}),
    )
    .await;

    for status in ["Pass", "Pass", "Fail", "N/T"] {
        let (code, _) = send(
            &router,
            "POST",
            "/testcases",
            Some(json!({"main_category": "Auth", "folder_id": dep, "result_status": status})),
        )
        .await;
        assert_eq!(code, StatusCode::OK);
    }

    let (status, stats) = send(&router, "GET", "/dashboard/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_test_cases"], 4);
    assert_eq!(stats["passed_tests"], 2);
    assert_eq!(stats["failed_tests"], 1);

    let (status, summary) = send(
        &router,
        "GET",
        &format!("/testcases/summary/folder/{env}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total_testcases"], 4);
    assert_eq!(summary["passed"], 2);
    assert_eq!(summary["pass_rate"], 50.0);

    let (status, _) = send(&router, "GET", "/testcases/summary/folder/9999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn summary_sync_recomputes_per_environment() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    for (env, status) in [("dev", "Pass"), ("dev", "Fail"), ("prod", "Pass")] {
        send(
            &router,
            "POST",
            "/testcases",
            Some(json!({"main_category": "Auth", "environment": env, "result_status": status})),
        )
        .await;
    }

    let (status, summaries) = send(&router, "POST", "/dashboard-summaries/sync", None).await;
    assert_eq!(status, StatusCode::OK);
    let list = summaries.as_array().unwrap();
    assert_eq!(list.len(), 2);
    let dev = list.iter().find(|s| s["environment"] == "dev").unwrap();
    assert_eq!(dev["total_tests"], 2);
    assert_eq!(dev["passed_tests"], 1);
    assert_eq!(dev["pass_rate"], 50.0);

    // Re-sync updates in place rather than duplicating rows.
    let (_, summaries) = send(&router, "POST", "/dashboard-summaries/sync", None).await;
    assert_eq!(summaries.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn execution_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    let (status, created) = send(
        &router,
        "POST",
        "/test-executions",
        Some(json!({"test_type": "automation", "environment": "dev"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = created["id"].as_i64().unwrap();

    let (_, stats) = send(&router, "GET", "/dashboard/stats", None).await;
    assert_eq!(stats["running_tests"], 1);

    let (status, _) = send(
        &router,
        "PUT",
        &format!("/test-executions/{id}/complete"),
        Some(json!({"status": "Completed", "result_summary": "12 passed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, list) = send(&router, "GET", "/test-executions", None).await;
    assert_eq!(list.as_array().unwrap()[0]["status"], "Completed");

    // Bad test types are rejected up front.
    let (status, _) = send(
        &router,
        "POST",
        "/test-executions",
        Some(json!({"test_type": "psychic"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn console_shell_is_served_with_index_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    let (status, _) = send(&router, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);

    // Client-side routes get the shell, not a 404.
    let (status, _) = send(&router, "GET", "/some/console/route", None).await;
    assert_eq!(status, StatusCode::OK);
}
