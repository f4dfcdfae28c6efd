use std::{path::PathBuf, thread};

use async_trait::async_trait;
use rusqlite::{Connection, OpenFlags};
use tokio::sync::oneshot;

use crate::{
    config::{Credentials, DbTarget},
    core::{
        executor::{BatchMode, Executor},
        query,
        types::DriverResult,
    },
    error::{AppError, AppResult},
};

/// Executor backed by one SQLite connection living on a dedicated thread.
///
/// Calls from any number of tasks are queued on the worker channel and run in
/// arrival order.
#[derive(Debug, Clone)]
pub struct SqliteExecutor {
    tx: std::sync::mpsc::Sender<DbTask>,
    pub target: DbTarget,
}

impl SqliteExecutor {
    pub fn connect(creds: &Credentials, busy_timeout_ms: u64) -> AppResult<Self> {
        let target = DbTarget::from_url(creds.url())?;
        // Local files have no server to authenticate against.
        tracing::debug!(token_len = creds.auth_token().len(), "auth token not used by local sqlite");
        Self::open(target, busy_timeout_ms)
    }

    /// Spawns the worker and waits until the database is open.
    pub fn open(target: DbTarget, busy_timeout_ms: u64) -> AppResult<Self> {
        let (tx, rx) = std::sync::mpsc::channel::<DbTask>();
        let (ready_tx, ready_rx) = std::sync::mpsc::channel::<AppResult<()>>();
        let target_for_thread = target.clone();
        thread::Builder::new()
            .name("studio-bridge-db".into())
            .spawn(move || db_worker_main(target_for_thread, busy_timeout_ms, rx, ready_tx))?;

        ready_rx
            .recv()
            .map_err(|_| AppError::Internal("db worker exited during startup".into()))??;
        tracing::debug!(db = ?target, "sqlite worker ready");
        Ok(Self { tx, target })
    }
}

#[async_trait]
impl Executor for SqliteExecutor {
    async fn execute_one(&self, statement: &str) -> AppResult<DriverResult> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(DbTask::Execute {
                sql: statement.to_string(),
                respond_to: tx,
            })
            .map_err(|_| AppError::Internal("db worker unavailable".into()))?;
        rx.await.map_err(|_| AppError::Internal("db worker dropped response".into()))?
    }

    async fn execute_batch(&self, statements: &[String], mode: BatchMode) -> AppResult<Vec<DriverResult>> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(DbTask::Batch {
                statements: statements.to_vec(),
                mode,
                respond_to: tx,
            })
            .map_err(|_| AppError::Internal("db worker unavailable".into()))?;
        rx.await.map_err(|_| AppError::Internal("db worker dropped response".into()))?
    }
}

enum DbTask {
    Execute {
        sql: String,
        respond_to: oneshot::Sender<AppResult<DriverResult>>,
    },
    Batch {
        statements: Vec<String>,
        mode: BatchMode,
        respond_to: oneshot::Sender<AppResult<Vec<DriverResult>>>,
    },
}

fn db_worker_main(
    target: DbTarget,
    busy_timeout_ms: u64,
    rx: std::sync::mpsc::Receiver<DbTask>,
    ready: std::sync::mpsc::Sender<AppResult<()>>,
) {
    let mut conn = match open_conn(&target, busy_timeout_ms) {
        Ok(c) => {
            let _ = ready.send(Ok(()));
            c
        }
        Err(e) => {
            tracing::error!(error = %e, db = ?target, "failed to open db in worker");
            let _ = ready.send(Err(e));
            return;
        }
    };

    // Exits once every executor handle is dropped.
    while let Ok(task) = rx.recv() {
        match task {
            DbTask::Execute { sql, respond_to } => {
                let res = query::run_statement(&conn, &sql);
                if let Err(e) = &res {
                    tracing::debug!(error = %e, "statement failed");
                }
                let _ = respond_to.send(res);
            }
            DbTask::Batch {
                statements,
                mode: BatchMode::Write,
                respond_to,
            } => {
                let res = query::run_batch(&mut conn, &statements);
                if let Err(e) = &res {
                    tracing::debug!(error = %e, count = statements.len(), "batch rolled back");
                }
                let _ = respond_to.send(res);
            }
        }
    }
    tracing::debug!("sqlite worker stopped");
}

fn open_conn(target: &DbTarget, busy_timeout_ms: u64) -> AppResult<Connection> {
    let conn = match target {
        DbTarget::Memory => Connection::open_in_memory().map_err(|source| AppError::DbOpenFailed {
            path: PathBuf::from(":memory:"),
            source,
        })?,
        DbTarget::File(path) => {
            let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE;
            Connection::open_with_flags(path, flags).map_err(|source| AppError::DbOpenFailed {
                path: path.clone(),
                source,
            })?
        }
    };
    let _ = conn.busy_timeout(std::time::Duration::from_millis(busy_timeout_ms));
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn executes_against_a_memory_database() {
        let ex = SqliteExecutor::open(DbTarget::Memory, 100).unwrap();
        ex.execute_one("CREATE TABLE t (x INT)").await.unwrap();
        let r = ex.execute_one("INSERT INTO t VALUES (7)").await.unwrap();
        assert_eq!(r.rows_affected, 1);

        let r = ex.execute_one("SELECT x FROM t").await.unwrap();
        assert_eq!(r.rows, vec![vec![json!(7)]]);
    }

    #[tokio::test]
    async fn sql_errors_carry_the_driver_message() {
        let ex = SqliteExecutor::open(DbTarget::Memory, 100).unwrap();
        let err = ex.execute_one("SELECT * FROM missing").await.unwrap_err();
        assert_eq!(err.code(), "SQL_ERROR");
        assert!(err.to_string().contains("no such table: missing"));
    }

    #[test]
    fn connect_rejects_remote_urls() {
        let creds = Credentials::new("libsql://db.example.com", "token").unwrap();
        assert!(matches!(
            SqliteExecutor::connect(&creds, 100),
            Err(AppError::InvalidCredentials(_))
        ));
    }

    #[test]
    fn open_failure_is_reported_synchronously() {
        let dir = tempfile::tempdir().unwrap();
        let target = DbTarget::File(dir.path().join("missing-dir").join("app.db"));
        assert!(matches!(
            SqliteExecutor::open(target, 100),
            Err(AppError::DbOpenFailed { .. })
        ));
    }
}
