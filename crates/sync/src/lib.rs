//! Follows the source chain and feeds translated blocks to the execution engine.

mod engine;
mod errors;
mod handle;
mod source;
mod status;
mod task;

#[cfg(test)]
use bevm_protocol as _;

pub use engine::{ChainHead, ExecutedBlock, ExecutionEngine};
pub use errors::{EngineError, SourceError, SyncError};
pub use handle::{build_sync_task, spawn_sync_task, SyncHandle};
pub use source::{resolve_prev_outputs, BitcoindSource, SourceChain};
pub use status::{SyncStatus, SyncStatusUpdate};
pub use task::SyncTask;
