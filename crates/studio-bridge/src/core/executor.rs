use async_trait::async_trait;

use crate::{core::types::DriverResult, error::AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMode {
    /// All statements run in one write transaction.
    Write,
}

/// Runs SQL on behalf of the bridge.
///
/// Implementations must accept concurrent calls; the dispatcher issues them
/// without any locking of its own.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute_one(&self, statement: &str) -> AppResult<DriverResult>;

    /// Atomic: either every statement applies and one result per statement is
    /// returned in order, or nothing applies and the call fails.
    async fn execute_batch(&self, statements: &[String], mode: BatchMode) -> AppResult<Vec<DriverResult>>;
}
