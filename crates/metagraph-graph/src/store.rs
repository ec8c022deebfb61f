//! Graph store driver seam.
//!
//! The executor only needs two capabilities from a backend: run an ordered
//! batch inside one transaction, and run a read-only statement.

use std::sync::Arc;

use async_trait::async_trait;
use metagraph_core::PropertyMap;

use crate::statement::Statement;

/// Failure classes raised by a store. The executor retries only `Transient`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("transient failure: {0}")]
    Transient(String),

    #[error("{0}")]
    Fatal(String),
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Run every statement, in order, inside a single transaction.
    ///
    /// Commits when all statements succeed. On any failure the transaction
    /// is rolled back and nothing from this call is visible.
    async fn run_in_transaction(&self, statements: &[Statement]) -> Result<(), StoreError>;

    /// Run a read-only statement and return the property map of every match.
    async fn fetch(&self, statement: &Statement) -> Result<Vec<PropertyMap>, StoreError>;
}

#[async_trait]
impl<S: GraphStore + ?Sized> GraphStore for Arc<S> {
    async fn run_in_transaction(&self, statements: &[Statement]) -> Result<(), StoreError> {
        (**self).run_in_transaction(statements).await
    }

    async fn fetch(&self, statement: &Statement) -> Result<Vec<PropertyMap>, StoreError> {
        (**self).fetch(statement).await
    }
}
