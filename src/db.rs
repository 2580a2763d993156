use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::config::{EXECUTION_LIST_LIMIT, RESULT_LIST_LIMIT};
use crate::folder_tree::FolderRow;
use crate::model::{
    DashboardSummary, PerformanceTest, Screenshot, TestCase, TestExecution, TestResult, User,
};

pub struct Db {
    conn: Mutex<Connection>,
    #[allow(dead_code)]
    db_path: PathBuf,
}

impl Db {
    pub fn new(db_path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let db = Self {
            conn: Mutex::new(conn),
            db_path: db_path.to_path_buf(),
        };
        db.init_schema()?;
        db.fail_stale_executions()?;
        Ok(db)
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }

    /// Mark any executions left in "Running" status as failed on startup.
    fn fail_stale_executions(&self) -> anyhow::Result<()> {
        let conn = self.conn();
        conn.execute(
            "UPDATE test_executions SET status = 'Failed',
                    result_summary = 'interrupted by server restart',
                    completed_at = ?1
             WHERE status = 'Running'",
            params![Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.conn();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS folders (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                folder_type TEXT NOT NULL DEFAULT 'environment',
                environment TEXT,
                deployment_date TEXT,
                parent_folder_id INTEGER REFERENCES folders(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS test_cases (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                main_category TEXT NOT NULL DEFAULT '',
                sub_category TEXT NOT NULL DEFAULT '',
                detail_category TEXT NOT NULL DEFAULT '',
                pre_condition TEXT NOT NULL DEFAULT '',
                expected_result TEXT NOT NULL DEFAULT '',
                result_status TEXT NOT NULL DEFAULT 'N/T',
                remark TEXT NOT NULL DEFAULT '',
                environment TEXT NOT NULL DEFAULT 'dev',
                folder_id INTEGER REFERENCES folders(id) ON DELETE SET NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS test_results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                test_case_id INTEGER NOT NULL REFERENCES test_cases(id) ON DELETE CASCADE,
                result TEXT NOT NULL,
                environment TEXT,
                executed_by TEXT,
                execution_duration REAL,
                error_message TEXT,
                screenshot TEXT,
                notes TEXT,
                executed_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS performance_tests (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                script_path TEXT NOT NULL DEFAULT '',
                environment TEXT NOT NULL DEFAULT 'prod',
                parameters TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS test_executions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                test_type TEXT NOT NULL,
                test_id INTEGER,
                environment TEXT,
                executed_by TEXT,
                status TEXT NOT NULL DEFAULT 'Running',
                result_summary TEXT,
                started_at TEXT NOT NULL,
                completed_at TEXT
            );

            CREATE TABLE IF NOT EXISTS screenshots (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                test_case_id INTEGER NOT NULL REFERENCES test_cases(id) ON DELETE CASCADE,
                screenshot_path TEXT NOT NULL,
                description TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                role TEXT NOT NULL DEFAULT 'User',
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                last_login TEXT
            );

            CREATE TABLE IF NOT EXISTS dashboard_summaries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                environment TEXT NOT NULL,
                total_tests INTEGER NOT NULL DEFAULT 0,
                passed_tests INTEGER NOT NULL DEFAULT 0,
                failed_tests INTEGER NOT NULL DEFAULT 0,
                skipped_tests INTEGER NOT NULL DEFAULT 0,
                pass_rate REAL NOT NULL DEFAULT 0,
                last_updated TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_folders_parent ON folders(parent_folder_id);
            CREATE INDEX IF NOT EXISTS idx_tc_folder ON test_cases(folder_id);
            CREATE INDEX IF NOT EXISTS idx_tc_environment ON test_cases(environment);
            CREATE INDEX IF NOT EXISTS idx_tr_case ON test_results(test_case_id);
            CREATE INDEX IF NOT EXISTS idx_ss_case ON screenshots(test_case_id);
            CREATE INDEX IF NOT EXISTS idx_te_status ON test_executions(status);
        ",
        )?;
        self.migrate_automation_columns(&conn)?;
        Ok(())
    }

    /// Add the automation columns if they don't exist yet. Older databases
    /// predate automation script tracking on test cases.
    fn migrate_automation_columns(&self, conn: &Connection) -> anyhow::Result<()> {
        let has_column: bool = conn
            .prepare("SELECT sql FROM sqlite_master WHERE type='table' AND name='test_cases'")?
            .query_row([], |row| row.get::<_, String>(0))
            .map(|sql| sql.contains("automation_code_path"))
            .unwrap_or(false);

        if !has_column {
            let columns = [
                "automation_code_path TEXT NOT NULL DEFAULT ''",
                "automation_code_type TEXT NOT NULL DEFAULT ''",
            ];
            for col in &columns {
                let sql = format!("ALTER TABLE test_cases ADD COLUMN {}", col);
                if let Err(e) = conn.execute(&sql, []) {
                    // Ignore "duplicate column" errors (column already exists)
                    let msg = e.to_string();
                    if !msg.contains("duplicate column") {
                        return Err(e.into());
                    }
                }
            }
        }
        Ok(())
    }

    /// Seed an empty folder table with one folder per environment plus a
    /// deployment-date folder under dev, so a fresh install has somewhere
    /// to file cases.
    pub fn seed_defaults(&self) -> anyhow::Result<()> {
        if self.count_folders()? > 0 {
            return Ok(());
        }
        let now = Utc::now().to_rfc3339();
        let today = Utc::now().format("%Y-%m-%d").to_string();
        let conn = self.conn();
        for env in crate::config::ENVIRONMENTS {
            conn.execute(
                "INSERT INTO folders (name, folder_type, environment, created_at)
                 VALUES (?1, 'environment', ?2, ?3)",
                params![env.to_uppercase(), env, now],
            )?;
            if *env == "dev" {
                let env_id = conn.last_insert_rowid();
                conn.execute(
                    "INSERT INTO folders (name, folder_type, environment, deployment_date, parent_folder_id, created_at)
                     VALUES (?1, 'deployment_date', 'dev', ?1, ?2, ?3)",
                    params![today, env_id, now],
                )?;
            }
        }
        Ok(())
    }

    // ========================================================================
    // Folders
    // ========================================================================

    pub fn list_folders(&self) -> anyhow::Result<Vec<FolderRow>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, name, folder_type, environment, deployment_date, parent_folder_id, created_at
             FROM folders ORDER BY id",
        )?;
        let rows = stmt.query_map([], row_to_folder)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn get_folder(&self, id: i64) -> anyhow::Result<Option<FolderRow>> {
        let conn = self.conn();
        let result = conn
            .query_row(
                "SELECT id, name, folder_type, environment, deployment_date, parent_folder_id, created_at
                 FROM folders WHERE id=?1",
                params![id],
                row_to_folder,
            )
            .optional()?;
        Ok(result)
    }

    pub fn insert_folder(&self, folder: &FolderRow) -> anyhow::Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO folders (name, folder_type, environment, deployment_date, parent_folder_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                folder.name,
                folder.folder_type,
                folder.environment,
                folder.deployment_date,
                folder.parent_folder_id,
                folder.created_at,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update_folder(&self, id: i64, folder: &FolderRow) -> anyhow::Result<bool> {
        let conn = self.conn();
        let changed = conn.execute(
            "UPDATE folders SET name=?2, folder_type=?3, environment=?4, deployment_date=?5, parent_folder_id=?6
             WHERE id=?1",
            params![
                id,
                folder.name,
                folder.folder_type,
                folder.environment,
                folder.deployment_date,
                folder.parent_folder_id,
            ],
        )?;
        Ok(changed > 0)
    }

    /// Delete a folder. Child folders cascade; contained test cases are
    /// unlinked (folder_id set NULL), not deleted.
    pub fn delete_folder(&self, id: i64) -> anyhow::Result<bool> {
        let conn = self.conn();
        let changed = conn.execute("DELETE FROM folders WHERE id=?1", params![id])?;
        Ok(changed > 0)
    }

    /// Fallback folder for new cases without an explicit one: the first
    /// deployment-date folder under the first dev environment folder.
    pub fn default_folder_id(&self) -> anyhow::Result<Option<i64>> {
        let conn = self.conn();
        let result = conn
            .query_row(
                "SELECT f.id FROM folders f
                 JOIN folders env ON f.parent_folder_id = env.id
                 WHERE f.folder_type = 'deployment_date'
                   AND env.folder_type = 'environment' AND env.environment = 'dev'
                 ORDER BY f.id LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(result)
    }

    pub fn count_folders(&self) -> anyhow::Result<i64> {
        let conn = self.conn();
        let count = conn.query_row("SELECT COUNT(*) FROM folders", [], |row| row.get(0))?;
        Ok(count)
    }

    // ========================================================================
    // Test cases
    // ========================================================================

    pub fn list_test_cases(&self) -> anyhow::Result<Vec<TestCase>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!("{} ORDER BY id", SELECT_CASE))?;
        let rows = stmt.query_map([], row_to_case)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn list_test_cases_by_environment(&self, environment: &str) -> anyhow::Result<Vec<TestCase>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!("{} WHERE environment=?1 ORDER BY id", SELECT_CASE))?;
        let rows = stmt.query_map(params![environment], row_to_case)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn get_test_case(&self, id: i64) -> anyhow::Result<Option<TestCase>> {
        let conn = self.conn();
        let result = conn
            .query_row(
                &format!("{} WHERE id=?1", SELECT_CASE),
                params![id],
                row_to_case,
            )
            .optional()?;
        Ok(result)
    }

    pub fn insert_test_case(&self, case: &TestCase) -> anyhow::Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO test_cases (
                main_category, sub_category, detail_category, pre_condition, expected_result,
                result_status, remark, environment, folder_id, automation_code_path,
                automation_code_type, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                case.main_category,
                case.sub_category,
                case.detail_category,
                case.pre_condition,
                case.expected_result,
                case.result_status,
                case.remark,
                case.environment,
                case.folder_id,
                case.automation_code_path,
                case.automation_code_type,
                case.created_at,
                case.updated_at,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update_test_case(&self, id: i64, case: &TestCase) -> anyhow::Result<bool> {
        let conn = self.conn();
        let changed = conn.execute(
            "UPDATE test_cases SET
                main_category=?2, sub_category=?3, detail_category=?4, pre_condition=?5,
                expected_result=?6, result_status=?7, remark=?8, environment=?9, folder_id=?10,
                automation_code_path=?11, automation_code_type=?12, updated_at=?13
             WHERE id=?1",
            params![
                id,
                case.main_category,
                case.sub_category,
                case.detail_category,
                case.pre_condition,
                case.expected_result,
                case.result_status,
                case.remark,
                case.environment,
                case.folder_id,
                case.automation_code_path,
                case.automation_code_type,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn update_test_case_status(&self, id: i64, status: &str) -> anyhow::Result<bool> {
        let conn = self.conn();
        let changed = conn.execute(
            "UPDATE test_cases SET result_status=?2, updated_at=?3 WHERE id=?1",
            params![id, status, Utc::now().to_rfc3339()],
        )?;
        Ok(changed > 0)
    }

    pub fn delete_test_case(&self, id: i64) -> anyhow::Result<bool> {
        let conn = self.conn();
        let changed = conn.execute("DELETE FROM test_cases WHERE id=?1", params![id])?;
        Ok(changed > 0)
    }

    pub fn count_test_cases(&self) -> anyhow::Result<i64> {
        let conn = self.conn();
        let count = conn.query_row("SELECT COUNT(*) FROM test_cases", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn count_cases_with_status(&self, status: &str) -> anyhow::Result<i64> {
        let conn = self.conn();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM test_cases WHERE result_status=?1",
            params![status],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn distinct_case_environments(&self) -> anyhow::Result<Vec<String>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT DISTINCT environment FROM test_cases ORDER BY environment")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ========================================================================
    // Test results
    // ========================================================================

    pub fn list_results_for_case(&self, test_case_id: i64) -> anyhow::Result<Vec<TestResult>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, test_case_id, result, environment, executed_by, execution_duration,
                    error_message, screenshot, notes, executed_at
             FROM test_results WHERE test_case_id=?1
             ORDER BY executed_at DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![test_case_id, RESULT_LIST_LIMIT], |row| {
            Ok(TestResult {
                id: row.get(0)?,
                test_case_id: row.get(1)?,
                result: row.get(2)?,
                environment: row.get(3)?,
                executed_by: row.get(4)?,
                execution_duration: row.get(5)?,
                error_message: row.get(6)?,
                screenshot: row.get(7)?,
                notes: row.get(8)?,
                executed_at: row.get(9)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn insert_result(&self, result: &TestResult) -> anyhow::Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO test_results (
                test_case_id, result, environment, executed_by, execution_duration,
                error_message, screenshot, notes, executed_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                result.test_case_id,
                result.result,
                result.environment,
                result.executed_by,
                result.execution_duration,
                result.error_message,
                result.screenshot,
                result.notes,
                result.executed_at,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn list_results_by_environment(&self, environment: &str) -> anyhow::Result<Vec<TestResult>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, test_case_id, result, environment, executed_by, execution_duration,
                    error_message, screenshot, notes, executed_at
             FROM test_results WHERE environment=?1 ORDER BY executed_at DESC",
        )?;
        let rows = stmt.query_map(params![environment], |row| {
            Ok(TestResult {
                id: row.get(0)?,
                test_case_id: row.get(1)?,
                result: row.get(2)?,
                environment: row.get(3)?,
                executed_by: row.get(4)?,
                execution_duration: row.get(5)?,
                error_message: row.get(6)?,
                screenshot: row.get(7)?,
                notes: row.get(8)?,
                executed_at: row.get(9)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ========================================================================
    // Performance tests
    // ========================================================================

    pub fn list_performance_tests(&self) -> anyhow::Result<Vec<PerformanceTest>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, name, description, script_path, environment, parameters, created_at, updated_at
             FROM performance_tests ORDER BY id",
        )?;
        let rows = stmt.query_map([], row_to_performance_test)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn get_performance_test(&self, id: i64) -> anyhow::Result<Option<PerformanceTest>> {
        let conn = self.conn();
        let result = conn
            .query_row(
                "SELECT id, name, description, script_path, environment, parameters, created_at, updated_at
                 FROM performance_tests WHERE id=?1",
                params![id],
                row_to_performance_test,
            )
            .optional()?;
        Ok(result)
    }

    pub fn insert_performance_test(&self, test: &PerformanceTest) -> anyhow::Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO performance_tests (name, description, script_path, environment, parameters, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                test.name,
                test.description,
                test.script_path,
                test.environment,
                test.parameters.to_string(),
                test.created_at,
                test.updated_at,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update_performance_test(&self, id: i64, test: &PerformanceTest) -> anyhow::Result<bool> {
        let conn = self.conn();
        let changed = conn.execute(
            "UPDATE performance_tests SET name=?2, description=?3, script_path=?4, environment=?5, parameters=?6, updated_at=?7
             WHERE id=?1",
            params![
                id,
                test.name,
                test.description,
                test.script_path,
                test.environment,
                test.parameters.to_string(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn delete_performance_test(&self, id: i64) -> anyhow::Result<bool> {
        let conn = self.conn();
        let changed = conn.execute("DELETE FROM performance_tests WHERE id=?1", params![id])?;
        Ok(changed > 0)
    }

    pub fn count_performance_tests(&self) -> anyhow::Result<i64> {
        let conn = self.conn();
        let count = conn.query_row("SELECT COUNT(*) FROM performance_tests", [], |row| {
            row.get(0)
        })?;
        Ok(count)
    }

    // ========================================================================
    // Test executions
    // ========================================================================

    pub fn list_executions(&self) -> anyhow::Result<Vec<TestExecution>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, test_type, test_id, environment, executed_by, status, result_summary, started_at, completed_at
             FROM test_executions ORDER BY started_at DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![EXECUTION_LIST_LIMIT], row_to_execution)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn get_execution(&self, id: i64) -> anyhow::Result<Option<TestExecution>> {
        let conn = self.conn();
        let result = conn
            .query_row(
                "SELECT id, test_type, test_id, environment, executed_by, status, result_summary, started_at, completed_at
                 FROM test_executions WHERE id=?1",
                params![id],
                row_to_execution,
            )
            .optional()?;
        Ok(result)
    }

    pub fn insert_execution(&self, execution: &TestExecution) -> anyhow::Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO test_executions (test_type, test_id, environment, executed_by, status, result_summary, started_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                execution.test_type,
                execution.test_id,
                execution.environment,
                execution.executed_by,
                execution.status,
                execution.result_summary,
                execution.started_at,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn complete_execution(
        &self,
        id: i64,
        status: &str,
        result_summary: Option<&str>,
    ) -> anyhow::Result<bool> {
        let conn = self.conn();
        let changed = conn.execute(
            "UPDATE test_executions SET status=?2, result_summary=?3, completed_at=?4
             WHERE id=?1 AND status='Running'",
            params![id, status, result_summary, Utc::now().to_rfc3339()],
        )?;
        Ok(changed > 0)
    }

    pub fn count_running_executions(&self) -> anyhow::Result<i64> {
        let conn = self.conn();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM test_executions WHERE status='Running'",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // ========================================================================
    // Screenshots
    // ========================================================================

    pub fn list_screenshots_for_case(&self, test_case_id: i64) -> anyhow::Result<Vec<Screenshot>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, test_case_id, screenshot_path, description, created_at
             FROM screenshots WHERE test_case_id=?1 ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(params![test_case_id], |row| {
            Ok(Screenshot {
                id: row.get(0)?,
                test_case_id: row.get(1)?,
                screenshot_path: row.get(2)?,
                description: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn insert_screenshot(&self, screenshot: &Screenshot) -> anyhow::Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO screenshots (test_case_id, screenshot_path, description, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                screenshot.test_case_id,
                screenshot.screenshot_path,
                screenshot.description,
                screenshot.created_at,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub fn list_users(&self) -> anyhow::Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, username, email, role, is_active, created_at, last_login
             FROM users ORDER BY id",
        )?;
        let rows = stmt.query_map([], row_to_user)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn get_user(&self, id: i64) -> anyhow::Result<Option<User>> {
        let conn = self.conn();
        let result = conn
            .query_row(
                "SELECT id, username, email, role, is_active, created_at, last_login
                 FROM users WHERE id=?1",
                params![id],
                row_to_user,
            )
            .optional()?;
        Ok(result)
    }

    pub fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let conn = self.conn();
        let result = conn
            .query_row(
                "SELECT id, username, email, role, is_active, created_at, last_login
                 FROM users WHERE username=?1",
                params![username],
                row_to_user,
            )
            .optional()?;
        Ok(result)
    }

    pub fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let conn = self.conn();
        let result = conn
            .query_row(
                "SELECT id, username, email, role, is_active, created_at, last_login
                 FROM users WHERE email=?1",
                params![email],
                row_to_user,
            )
            .optional()?;
        Ok(result)
    }

    pub fn insert_user(&self, user: &User) -> anyhow::Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO users (username, email, role, is_active, created_at, last_login)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.username,
                user.email,
                user.role,
                user.is_active as i64,
                user.created_at,
                user.last_login,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update_user(&self, id: i64, user: &User) -> anyhow::Result<bool> {
        let conn = self.conn();
        let changed = conn.execute(
            "UPDATE users SET username=?2, email=?3, role=?4, is_active=?5 WHERE id=?1",
            params![id, user.username, user.email, user.role, user.is_active as i64],
        )?;
        Ok(changed > 0)
    }

    pub fn delete_user(&self, id: i64) -> anyhow::Result<bool> {
        let conn = self.conn();
        let changed = conn.execute("DELETE FROM users WHERE id=?1", params![id])?;
        Ok(changed > 0)
    }

    // ========================================================================
    // Dashboard summaries
    // ========================================================================

    pub fn list_summaries(&self) -> anyhow::Result<Vec<DashboardSummary>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, environment, total_tests, passed_tests, failed_tests, skipped_tests, pass_rate, last_updated
             FROM dashboard_summaries ORDER BY environment",
        )?;
        let rows = stmt.query_map([], row_to_summary)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn find_summary_by_environment(
        &self,
        environment: &str,
    ) -> anyhow::Result<Option<DashboardSummary>> {
        let conn = self.conn();
        let result = conn
            .query_row(
                "SELECT id, environment, total_tests, passed_tests, failed_tests, skipped_tests, pass_rate, last_updated
                 FROM dashboard_summaries WHERE environment=?1",
                params![environment],
                row_to_summary,
            )
            .optional()?;
        Ok(result)
    }

    pub fn insert_summary(&self, summary: &DashboardSummary) -> anyhow::Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO dashboard_summaries (environment, total_tests, passed_tests, failed_tests, skipped_tests, pass_rate, last_updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                summary.environment,
                summary.total_tests,
                summary.passed_tests,
                summary.failed_tests,
                summary.skipped_tests,
                summary.pass_rate,
                summary.last_updated,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update_summary(&self, id: i64, summary: &DashboardSummary) -> anyhow::Result<bool> {
        let conn = self.conn();
        let changed = conn.execute(
            "UPDATE dashboard_summaries SET environment=?2, total_tests=?3, passed_tests=?4, failed_tests=?5, skipped_tests=?6, pass_rate=?7, last_updated=?8
             WHERE id=?1",
            params![
                id,
                summary.environment,
                summary.total_tests,
                summary.passed_tests,
                summary.failed_tests,
                summary.skipped_tests,
                summary.pass_rate,
                summary.last_updated,
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn delete_summary(&self, id: i64) -> anyhow::Result<bool> {
        let conn = self.conn();
        let changed = conn.execute("DELETE FROM dashboard_summaries WHERE id=?1", params![id])?;
        Ok(changed > 0)
    }
}

const SELECT_CASE: &str = "SELECT id, main_category, sub_category, detail_category, pre_condition,
        expected_result, result_status, remark, environment, folder_id,
        automation_code_path, automation_code_type, created_at, updated_at
 FROM test_cases";

fn row_to_folder(row: &Row<'_>) -> rusqlite::Result<FolderRow> {
    Ok(FolderRow {
        id: row.get(0)?,
        name: row.get(1)?,
        folder_type: row.get(2)?,
        environment: row.get(3)?,
        deployment_date: row.get(4)?,
        parent_folder_id: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn row_to_case(row: &Row<'_>) -> rusqlite::Result<TestCase> {
    Ok(TestCase {
        id: row.get(0)?,
        main_category: row.get(1)?,
        sub_category: row.get(2)?,
        detail_category: row.get(3)?,
        pre_condition: row.get(4)?,
        expected_result: row.get(5)?,
        result_status: row.get(6)?,
        remark: row.get(7)?,
        environment: row.get(8)?,
        folder_id: row.get(9)?,
        automation_code_path: row.get(10)?,
        automation_code_type: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

fn row_to_performance_test(row: &Row<'_>) -> rusqlite::Result<PerformanceTest> {
    let raw: Option<String> = row.get(5)?;
    let parameters = raw
        .and_then(|text| serde_json::from_str(&text).ok())
        .unwrap_or_else(|| serde_json::json!({}));
    Ok(PerformanceTest {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        script_path: row.get(3)?,
        environment: row.get(4)?,
        parameters,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn row_to_execution(row: &Row<'_>) -> rusqlite::Result<TestExecution> {
    Ok(TestExecution {
        id: row.get(0)?,
        test_type: row.get(1)?,
        test_id: row.get(2)?,
        environment: row.get(3)?,
        executed_by: row.get(4)?,
        status: row.get(5)?,
        result_summary: row.get(6)?,
        started_at: row.get(7)?,
        completed_at: row.get(8)?,
    })
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        role: row.get(3)?,
        is_active: row.get::<_, i64>(4)? != 0,
        created_at: row.get(5)?,
        last_login: row.get(6)?,
    })
}

fn row_to_summary(row: &Row<'_>) -> rusqlite::Result<DashboardSummary> {
    Ok(DashboardSummary {
        id: row.get(0)?,
        environment: row.get(1)?,
        total_tests: row.get(2)?,
        passed_tests: row.get(3)?,
        failed_tests: row.get(4)?,
        skipped_tests: row.get(5)?,
        pass_rate: row.get(6)?,
        last_updated: row.get(7)?,
    })
}
