use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::SharedState;

pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(crate::routes::health::health))
        // Folders
        .route("/folders", get(crate::routes::folders::list_folders))
        .route("/folders", post(crate::routes::folders::create_folder))
        .route("/folders/tree", get(crate::routes::folders::folder_tree))
        .route(
            "/folders/feature",
            post(crate::routes::folders::add_feature_folders),
        )
        .route(
            "/folders/{id}/scope",
            get(crate::routes::folders::folder_scope),
        )
        .route("/folders/{id}", put(crate::routes::folders::update_folder))
        .route(
            "/folders/{id}",
            delete(crate::routes::folders::delete_folder),
        )
        // Test cases
        .route("/testcases", get(crate::routes::testcases::list_testcases))
        .route("/testcases", post(crate::routes::testcases::create_testcase))
        .route("/testcases/{id}", get(crate::routes::testcases::get_testcase))
        .route(
            "/testcases/{id}",
            put(crate::routes::testcases::update_testcase),
        )
        .route(
            "/testcases/{id}",
            delete(crate::routes::testcases::delete_testcase),
        )
        .route(
            "/testcases/{id}/status",
            put(crate::routes::testcases::update_testcase_status),
        )
        .route(
            "/testcases/{id}/screenshots",
            get(crate::routes::screenshots::list_for_testcase),
        )
        // Test results
        .route(
            "/testresults/{test_case_id}",
            get(crate::routes::testcases::list_testresults),
        )
        .route(
            "/testresults",
            post(crate::routes::testcases::create_testresult),
        )
        // Performance tests
        .route(
            "/performance-tests",
            get(crate::routes::performance::list_tests),
        )
        .route(
            "/performance-tests",
            post(crate::routes::performance::create_test),
        )
        .route(
            "/performance-tests/{id}",
            get(crate::routes::performance::get_test),
        )
        .route(
            "/performance-tests/{id}",
            put(crate::routes::performance::update_test),
        )
        .route(
            "/performance-tests/{id}",
            delete(crate::routes::performance::delete_test),
        )
        // Test executions
        .route(
            "/test-executions",
            get(crate::routes::executions::list_executions),
        )
        .route(
            "/test-executions",
            post(crate::routes::executions::start_execution),
        )
        .route(
            "/test-executions/{id}/complete",
            put(crate::routes::executions::complete_execution),
        )
        // Screenshots
        .route(
            "/screenshots",
            post(crate::routes::screenshots::create_screenshot),
        )
        .route(
            "/screenshots/{*filename}",
            get(crate::routes::screenshots::serve_screenshot),
        )
        // Users
        .route("/users", get(crate::routes::users::list_users))
        .route("/users", post(crate::routes::users::create_user))
        .route("/users/{id}", put(crate::routes::users::update_user))
        .route("/users/{id}", delete(crate::routes::users::delete_user))
        // Dashboard
        .route(
            "/dashboard/stats",
            get(crate::routes::dashboard::dashboard_stats),
        )
        .route(
            "/testcases/summary/folder/{id}",
            get(crate::routes::dashboard::folder_summary),
        )
        .route(
            "/testcases/summary/{environment}",
            get(crate::routes::dashboard::testcases_summary),
        )
        .route(
            "/test-results/summary/{environment}",
            get(crate::routes::dashboard::results_summary),
        )
        .route(
            "/dashboard-summaries",
            get(crate::routes::dashboard::list_summaries),
        )
        .route(
            "/dashboard-summaries",
            post(crate::routes::dashboard::create_summary),
        )
        .route(
            "/dashboard-summaries/sync",
            post(crate::routes::dashboard::sync_summaries),
        )
        .route(
            "/dashboard-summaries/{id}",
            put(crate::routes::dashboard::update_summary),
        )
        .route(
            "/dashboard-summaries/{id}",
            delete(crate::routes::dashboard::delete_summary),
        )
        // Console shell
        .fallback(crate::routes::console::serve_asset)
        .layer(cors)
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
