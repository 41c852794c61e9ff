use alloy_consensus::Header;
use alloy_primitives::B256;
use async_trait::async_trait;
use bevm_translator::{BridgedTx, DerivedBlock};
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

/// Tip of the derived chain as seen by the sync loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainHead {
    pub number: u64,
    pub hash: B256,
    /// Anchor of the source block the head was translated from.
    pub source_anchor: B256,
}

impl ChainHead {
    pub fn new(number: u64, hash: B256, source_anchor: B256) -> Self {
        Self {
            number,
            hash,
            source_anchor,
        }
    }
}

/// A derived block after its state transition, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedBlock {
    header: Header,
    hash: B256,
    transactions: Vec<BridgedTx>,
    receipt_count: usize,
}

impl ExecutedBlock {
    /// Seals `header`, which should carry the roots and gas used produced by execution.
    pub fn new(header: Header, transactions: Vec<BridgedTx>, receipt_count: usize) -> Self {
        let hash = header.hash_slow();
        Self {
            header,
            hash,
            transactions,
            receipt_count,
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn hash(&self) -> B256 {
        self.hash
    }

    pub fn transactions(&self) -> &[BridgedTx] {
        &self.transactions
    }

    pub fn receipt_count(&self) -> usize {
        self.receipt_count
    }

    pub fn gas_used(&self) -> u64 {
        self.header.gas_used
    }

    /// Head the chain moves to once this block is inserted.
    pub fn head(&self) -> ChainHead {
        ChainHead::new(self.header.number, self.hash, self.header.ommers_hash)
    }
}

/// Executes and persists derived blocks.
///
/// The sync loop is the only writer; implementations need not guard against concurrent
/// submissions from it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    /// Last inserted block.
    async fn current_head(&self) -> Result<ChainHead, EngineError>;

    /// Applies `block` on top of its parent's state without persisting it.
    async fn execute_block(&self, block: DerivedBlock) -> Result<ExecutedBlock, EngineError>;

    /// Persists an executed block and makes it the new head.
    async fn insert_block(&self, block: ExecutedBlock) -> Result<(), EngineError>;
}
