use std::sync::atomic::{AtomicBool, Ordering};

use alloy_consensus::Header;
use alloy_primitives::{keccak256, B256};
use async_trait::async_trait;
use bevm_sync::{ChainHead, EngineError, ExecutedBlock, ExecutionEngine};
use bevm_translator::{block_hash_to_anchor, DerivedBlock};
use bitcoin::BlockHash;
use tokio::sync::RwLock;

/// Gas charged per bridged transaction.
pub const MEMORY_ENGINE_TX_GAS: u64 = 21_000;

/// Execution engine keeping the derived chain in memory.
///
/// Execution folds transaction hashes into the state root so tests can tell blocks apart.
#[derive(Debug)]
pub struct MemoryEngine {
    genesis: ExecutedBlock,
    blocks: RwLock<Vec<ExecutedBlock>>,
    fail_next_execute: AtomicBool,
    fail_next_insert: AtomicBool,
}

impl MemoryEngine {
    /// Starts from a genesis block anchored to the source genesis block.
    pub fn new(source_genesis: &BlockHash) -> Self {
        let header = Header {
            ommers_hash: block_hash_to_anchor(source_genesis),
            gas_limit: u64::MAX,
            ..Default::default()
        };
        Self {
            genesis: ExecutedBlock::new(header, Vec::new(), 0),
            blocks: RwLock::new(Vec::new()),
            fail_next_execute: AtomicBool::new(false),
            fail_next_insert: AtomicBool::new(false),
        }
    }

    pub fn genesis(&self) -> &ExecutedBlock {
        &self.genesis
    }

    /// Inserted blocks above genesis, in order.
    pub async fn blocks(&self) -> Vec<ExecutedBlock> {
        self.blocks.read().await.clone()
    }

    pub fn fail_next_execute(&self) {
        self.fail_next_execute.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_insert(&self) {
        self.fail_next_insert.store(true, Ordering::SeqCst);
    }

    async fn head_block(&self) -> ExecutedBlock {
        self.blocks
            .read()
            .await
            .last()
            .cloned()
            .unwrap_or_else(|| self.genesis.clone())
    }
}

#[async_trait]
impl ExecutionEngine for MemoryEngine {
    async fn current_head(&self) -> Result<ChainHead, EngineError> {
        Ok(self.head_block().await.head())
    }

    async fn execute_block(&self, block: DerivedBlock) -> Result<ExecutedBlock, EngineError> {
        if self.fail_next_execute.swap(false, Ordering::SeqCst) {
            return Err(EngineError::execution("injected failure"));
        }

        let parent = self.head_block().await;
        if block.parent_hash() != parent.hash() {
            return Err(EngineError::execution(format!(
                "parent {} is not the head {}",
                block.parent_hash(),
                parent.hash()
            )));
        }

        let (mut header, txs) = block.into_parts();
        let mut state_root = parent.header().state_root;
        for tx in &txs {
            state_root = keccak256([state_root, tx.tx_hash()].concat());
        }
        header.state_root = state_root;
        header.gas_used = txs.len() as u64 * MEMORY_ENGINE_TX_GAS;
        header.transactions_root = if txs.is_empty() {
            B256::ZERO
        } else {
            keccak256(txs.iter().flat_map(|tx| tx.tx_hash().0).collect::<Vec<u8>>())
        };

        let receipts = txs.len();
        Ok(ExecutedBlock::new(header, txs, receipts))
    }

    async fn insert_block(&self, block: ExecutedBlock) -> Result<(), EngineError> {
        if self.fail_next_insert.swap(false, Ordering::SeqCst) {
            return Err(EngineError::insert("injected failure"));
        }

        let mut blocks = self.blocks.write().await;
        let head = blocks.last().unwrap_or(&self.genesis);
        if block.header().parent_hash != head.hash() {
            return Err(EngineError::insert("block does not extend the head"));
        }
        blocks.push(block);
        Ok(())
    }
}
