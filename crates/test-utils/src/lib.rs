//! Fixtures and in-memory backends for tests.

pub mod btc;
mod chain;
mod engine;

pub use chain::MemorySourceChain;
pub use engine::{MemoryEngine, MEMORY_ENGINE_TX_GAS};
