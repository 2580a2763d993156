use casetrack_server::db::Db;
use casetrack_server::folder_tree::FolderRow;
use casetrack_server::model::{DashboardSummary, TestCase, TestExecution, TestResult, User};
use chrono::Utc;
use tempfile::tempdir;

fn open_db(dir: &tempfile::TempDir) -> Db {
    Db::new(&dir.path().join("casetrack.db")).expect("open db")
}

fn folder(name: &str, folder_type: &str, parent: Option<i64>) -> FolderRow {
    FolderRow {
        id: 0,
        name: name.to_string(),
        folder_type: folder_type.to_string(),
        environment: Some("dev".to_string()),
        deployment_date: None,
        parent_folder_id: parent,
        created_at: Utc::now().to_rfc3339(),
    }
}

fn test_case(folder_id: Option<i64>, status: &str, environment: &str) -> TestCase {
    let now = Utc::now().to_rfc3339();
    TestCase {
        id: 0,
        main_category: "Auth".to_string(),
        sub_category: "Login".to_string(),
        detail_category: "Happy path".to_string(),
        pre_condition: String::new(),
        expected_result: "Dashboard shown".to_string(),
        result_status: status.to_string(),
        remark: String::new(),
        environment: environment.to_string(),
        folder_id,
        automation_code_path: String::new(),
        automation_code_type: String::new(),
        created_at: now.clone(),
        updated_at: now,
    }
}

#[test]
fn folder_roundtrip() {
    let dir = tempdir().unwrap();
    let db = open_db(&dir);

    let env_id = db.insert_folder(&folder("DEV", "environment", None)).unwrap();
    let dep_id = db
        .insert_folder(&folder("2025-08-06", "deployment_date", Some(env_id)))
        .unwrap();

    let folders = db.list_folders().unwrap();
    assert_eq!(folders.len(), 2);
    assert_eq!(folders[0].id, env_id);
    assert_eq!(folders[1].parent_folder_id, Some(env_id));

    let fetched = db.get_folder(dep_id).unwrap().unwrap();
    assert_eq!(fetched.name, "2025-08-06");
    assert!(db.get_folder(9999).unwrap().is_none());
}

#[test]
fn deleting_a_folder_cascades_children_and_unlinks_cases() {
    let dir = tempdir().unwrap();
    let db = open_db(&dir);

    let env_id = db.insert_folder(&folder("DEV", "environment", None)).unwrap();
    let dep_id = db
        .insert_folder(&folder("2025-08-06", "deployment_date", Some(env_id)))
        .unwrap();
    let feat_id = db
        .insert_folder(&folder("Login", "feature", Some(dep_id)))
        .unwrap();
    let case_id = db
        .insert_test_case(&test_case(Some(feat_id), "N/T", "dev"))
        .unwrap();

    assert!(db.delete_folder(env_id).unwrap());
    assert_eq!(db.count_folders().unwrap(), 0);

    // The case survives with its folder link cleared.
    let orphan = db.get_test_case(case_id).unwrap().unwrap();
    assert_eq!(orphan.folder_id, None);
}

#[test]
fn default_folder_is_first_dev_deployment() {
    let dir = tempdir().unwrap();
    let db = open_db(&dir);
    assert!(db.default_folder_id().unwrap().is_none());

    let env_id = db.insert_folder(&folder("DEV", "environment", None)).unwrap();
    let dep_a = db
        .insert_folder(&folder("2025-08-01", "deployment_date", Some(env_id)))
        .unwrap();
    db.insert_folder(&folder("2025-08-06", "deployment_date", Some(env_id)))
        .unwrap();

    assert_eq!(db.default_folder_id().unwrap(), Some(dep_a));
}

#[test]
fn seed_defaults_only_fills_an_empty_table() {
    let dir = tempdir().unwrap();
    let db = open_db(&dir);

    db.seed_defaults().unwrap();
    // One folder per environment plus a deployment date under dev.
    let seeded = db.count_folders().unwrap();
    assert_eq!(seeded, 4);

    // Second call is a no-op.
    db.seed_defaults().unwrap();
    assert_eq!(db.count_folders().unwrap(), seeded);
    assert!(db.default_folder_id().unwrap().is_some());
}

#[test]
fn test_case_crud_and_status() {
    let dir = tempdir().unwrap();
    let db = open_db(&dir);

    let id = db.insert_test_case(&test_case(None, "N/T", "dev")).unwrap();
    let mut fetched = db.get_test_case(id).unwrap().unwrap();
    assert_eq!(fetched.result_status, "N/T");

    fetched.remark = "flaky on CI".to_string();
    assert!(db.update_test_case(id, &fetched).unwrap());
    assert!(db.update_test_case_status(id, "Pass").unwrap());

    let updated = db.get_test_case(id).unwrap().unwrap();
    assert_eq!(updated.remark, "flaky on CI");
    assert_eq!(updated.result_status, "Pass");
    assert_eq!(db.count_cases_with_status("Pass").unwrap(), 1);

    assert!(db.delete_test_case(id).unwrap());
    assert!(!db.delete_test_case(id).unwrap());
}

#[test]
fn results_are_listed_newest_first_and_die_with_their_case() {
    let dir = tempdir().unwrap();
    let db = open_db(&dir);
    let case_id = db.insert_test_case(&test_case(None, "N/T", "dev")).unwrap();

    for (i, result) in ["Fail", "Pass"].iter().enumerate() {
        db.insert_result(&TestResult {
            id: 0,
            test_case_id: case_id,
            result: result.to_string(),
            environment: Some("dev".to_string()),
            executed_by: Some("ci".to_string()),
            execution_duration: Some(1.5),
            error_message: None,
            screenshot: None,
            notes: None,
            executed_at: format!("2025-08-0{}T00:00:00Z", i + 1),
        })
        .unwrap();
    }

    let results = db.list_results_for_case(case_id).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].result, "Pass");
    assert_eq!(results[1].result, "Fail");

    db.delete_test_case(case_id).unwrap();
    assert!(db.list_results_for_case(case_id).unwrap().is_empty());
}

#[test]
fn stale_running_executions_fail_on_reopen() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("casetrack.db");
    {
        let db = Db::new(&db_path).unwrap();
        db.insert_execution(&TestExecution {
            id: 0,
            test_type: "automation".to_string(),
            test_id: None,
            environment: Some("dev".to_string()),
            executed_by: None,
            status: "Running".to_string(),
            result_summary: None,
            started_at: Utc::now().to_rfc3339(),
            completed_at: None,
        })
        .unwrap();
        assert_eq!(db.count_running_executions().unwrap(), 1);
    }

    let db = Db::new(&db_path).unwrap();
    assert_eq!(db.count_running_executions().unwrap(), 0);
    let executions = db.list_executions().unwrap();
    assert_eq!(executions[0].status, "Failed");
    assert!(executions[0].completed_at.is_some());
}

#[test]
fn complete_execution_only_touches_running_rows() {
    let dir = tempdir().unwrap();
    let db = open_db(&dir);
    let id = db
        .insert_execution(&TestExecution {
            id: 0,
            test_type: "performance".to_string(),
            test_id: Some(1),
            environment: None,
            executed_by: None,
            status: "Running".to_string(),
            result_summary: None,
            started_at: Utc::now().to_rfc3339(),
            completed_at: None,
        })
        .unwrap();

    assert!(db.complete_execution(id, "Completed", Some("all good")).unwrap());
    // Already completed; a second completion does nothing.
    assert!(!db.complete_execution(id, "Failed", None).unwrap());

    let fetched = db.get_execution(id).unwrap().unwrap();
    assert_eq!(fetched.status, "Completed");
    assert_eq!(fetched.result_summary.as_deref(), Some("all good"));
}

#[test]
fn user_lookups_by_identity() {
    let dir = tempdir().unwrap();
    let db = open_db(&dir);

    let user = User {
        id: 0,
        username: "admin".to_string(),
        email: "admin@example.com".to_string(),
        role: "Administrator".to_string(),
        is_active: true,
        created_at: Utc::now().to_rfc3339(),
        last_login: None,
    };
    let id = db.insert_user(&user).unwrap();

    assert!(db.find_user_by_username("admin").unwrap().is_some());
    assert!(db.find_user_by_email("admin@example.com").unwrap().is_some());
    assert!(db.find_user_by_username("nobody").unwrap().is_none());

    // The UNIQUE constraint backs up the route-level duplicate check.
    assert!(db.insert_user(&user).is_err());

    assert!(db.delete_user(id).unwrap());
    assert!(db.find_user_by_username("admin").unwrap().is_none());
}

#[test]
fn summaries_upsert_by_environment() {
    let dir = tempdir().unwrap();
    let db = open_db(&dir);

    let summary = DashboardSummary {
        id: 0,
        environment: "dev".to_string(),
        total_tests: 10,
        passed_tests: 7,
        failed_tests: 2,
        skipped_tests: 1,
        pass_rate: 70.0,
        last_updated: Utc::now().to_rfc3339(),
    };
    let id = db.insert_summary(&summary).unwrap();

    let found = db.find_summary_by_environment("dev").unwrap().unwrap();
    assert_eq!(found.id, id);
    assert_eq!(found.passed_tests, 7);

    let updated = DashboardSummary {
        passed_tests: 9,
        pass_rate: 90.0,
        ..summary
    };
    assert!(db.update_summary(id, &updated).unwrap());
    let found = db.find_summary_by_environment("dev").unwrap().unwrap();
    assert_eq!(found.passed_tests, 9);

    assert!(db.find_summary_by_environment("prod").unwrap().is_none());
}

#[test]
fn environments_are_distinct_and_sorted() {
    let dir = tempdir().unwrap();
    let db = open_db(&dir);
    for env in ["prod", "dev", "dev", "staging"] {
        db.insert_test_case(&test_case(None, "N/T", env)).unwrap();
    }
    assert_eq!(
        db.distinct_case_environments().unwrap(),
        vec!["dev", "prod", "staging"]
    );
    assert_eq!(db.list_test_cases_by_environment("dev").unwrap().len(), 2);
}

#[test]
fn reopening_the_database_is_idempotent() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("casetrack.db");
    {
        let db = Db::new(&db_path).unwrap();
        db.insert_test_case(&test_case(None, "Pass", "dev")).unwrap();
    }
    // Schema init and migrations run again without clobbering data.
    let db = Db::new(&db_path).unwrap();
    assert_eq!(db.count_test_cases().unwrap(), 1);
}
