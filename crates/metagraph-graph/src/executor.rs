//! Transactional batch execution with bounded retries.

use std::time::{Duration, Instant};

use metagraph_core::config::WriterConfig;

use crate::error::{GraphError, Result};
use crate::statement::Statement;
use crate::store::{GraphStore, StoreError};

/// Timing of a committed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Wall-clock time across all attempts.
    pub elapsed: Duration,
    /// Retries consumed; 0 when the first attempt committed.
    pub retries: u32,
}

/// Runs a batch of statements as one all-or-nothing transaction.
///
/// A transient store failure discards the attempt and restarts the whole
/// batch from its first statement, up to `max_retries` more times. Any
/// other failure is returned immediately.
pub struct TransactionalExecutor<S> {
    store: S,
    max_retries: u32,
    transaction_timeout: Option<Duration>,
    retry_backoff: Duration,
}

impl<S: GraphStore> TransactionalExecutor<S> {
    pub fn new(store: S, config: &WriterConfig) -> Self {
        Self {
            store,
            max_retries: config.max_retries,
            transaction_timeout: config.transaction_timeout(),
            retry_backoff: config.retry_backoff(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Execute `statements` in order inside a single transaction.
    ///
    /// An empty batch returns immediately without touching the store.
    pub async fn execute(&self, statements: &[Statement]) -> Result<ExecutionResult> {
        if statements.is_empty() {
            return Ok(ExecutionResult::default());
        }

        let started = Instant::now();
        let mut retries = 0;

        loop {
            match self.attempt(statements).await {
                Ok(()) => {
                    return Ok(ExecutionResult {
                        elapsed: started.elapsed(),
                        retries,
                    })
                }
                Err(err) if err.is_transient() && retries < self.max_retries => {
                    retries += 1;
                    tracing::warn!(
                        error = %err,
                        attempt = retries,
                        max_retries = self.max_retries,
                        statements = statements.len(),
                        "Transient failure, retrying graph write transaction"
                    );
                    if !self.retry_backoff.is_zero() {
                        tokio::time::sleep(self.retry_backoff).await;
                    }
                }
                Err(err) if err.is_transient() => {
                    tracing::error!(error = %err, attempts = retries + 1, "Graph write retries exhausted");
                    return Err(GraphError::RetryLimitReached {
                        attempts: retries + 1,
                        source: err,
                    });
                }
                Err(err) => {
                    tracing::error!(error = %err, "Graph write failed");
                    return Err(GraphError::FatalStore(err));
                }
            }
        }
    }

    /// One transaction, bounded by the configured timeout. The timeout covers
    /// the commit round trip, so an attempt reported as timed out may have
    /// committed on the server. The retry then re-applies the batch.
    async fn attempt(&self, statements: &[Statement]) -> std::result::Result<(), StoreError> {
        let run = self.store.run_in_transaction(statements);
        match self.transaction_timeout {
            Some(limit) => tokio::time::timeout(limit, run).await.unwrap_or_else(|_| {
                Err(StoreError::Transient(format!(
                    "transaction exceeded {}ms",
                    limit.as_millis()
                )))
            }),
            None => run.await,
        }
    }
}
