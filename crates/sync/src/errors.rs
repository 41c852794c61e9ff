use alloy_primitives::B256;
use bitcoin::OutPoint;
use thiserror::Error;

/// Errors reported by a [`SourceChain`](crate::SourceChain).
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl SourceError {
    pub fn rpc(msg: impl Into<String>) -> Self {
        Self::Rpc(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

/// Errors reported by an [`ExecutionEngine`](crate::ExecutionEngine).
#[derive(Debug, Error)]
pub enum EngineError {
    /// State transition of a derived block failed.
    #[error("execution failed: {0}")]
    Execution(String),

    /// Executed block could not be persisted.
    #[error("insert failed: {0}")]
    Insert(String),

    #[error("engine unavailable: {0}")]
    Unavailable(String),
}

impl EngineError {
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    pub fn insert(msg: impl Into<String>) -> Self {
        Self::Insert(msg.into())
    }
}

/// Errors that abort a sync iteration.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The next source block does not build on the last accepted one.
    #[error("source block {height} has parent {found}, expected {expected}")]
    Reorg {
        height: u64,
        expected: B256,
        found: B256,
    },

    #[error("source chain: {0}")]
    Source(#[from] SourceError),

    #[error("execution engine: {0}")]
    Engine(#[from] EngineError),

    /// A fetched transaction has no output at the referenced index.
    #[error("missing previous output {0}")]
    MissingPrevOutput(OutPoint),
}
