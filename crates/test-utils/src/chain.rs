use std::collections::HashMap;

use async_trait::async_trait;
use bevm_sync::{SourceChain, SourceError};
use bitcoin::{hashes::Hash, Block, BlockHash, Transaction, Txid};
use tokio::sync::RwLock;

use crate::btc::{build_block, coinbase_tx};

#[derive(Debug, Default)]
struct ChainState {
    blocks: Vec<Block>,
    by_hash: HashMap<BlockHash, usize>,
    txs: HashMap<Txid, Transaction>,
}

impl ChainState {
    fn push(&mut self, block: Block) {
        for tx in &block.txdata {
            self.txs.insert(tx.compute_txid(), tx.clone());
        }
        self.by_hash.insert(block.block_hash(), self.blocks.len());
        self.blocks.push(block);
    }
}

/// Source chain held in memory, genesis at height 0.
#[derive(Debug)]
pub struct MemorySourceChain {
    state: RwLock<ChainState>,
}

impl MemorySourceChain {
    pub fn new(genesis: Block) -> Self {
        let mut state = ChainState::default();
        state.push(genesis);
        Self {
            state: RwLock::new(state),
        }
    }

    /// Chain whose genesis is an empty block on the all-zero hash.
    pub fn with_empty_genesis() -> Self {
        Self::new(build_block(BlockHash::all_zeros(), vec![coinbase_tx(0)]))
    }

    pub async fn genesis_hash(&self) -> BlockHash {
        self.state.read().await.blocks[0].block_hash()
    }

    pub async fn tip_hash(&self) -> BlockHash {
        let state = self.state.read().await;
        state.blocks[state.blocks.len() - 1].block_hash()
    }

    /// Appends `block` without checking that it builds on the tip.
    pub async fn push_block(&self, block: Block) {
        self.state.write().await.push(block);
    }

    /// Mines a block on the tip holding a coinbase followed by `txs`.
    pub async fn mine(&self, txs: Vec<Transaction>) -> Block {
        let mut state = self.state.write().await;
        let height = state.blocks.len() as u64;
        let prev = state.blocks[state.blocks.len() - 1].block_hash();

        let mut txdata = vec![coinbase_tx(height)];
        txdata.extend(txs);
        let block = build_block(prev, txdata);
        state.push(block.clone());
        block
    }

    /// Replaces every block from `height` up with `block`.
    pub async fn replace_from(&self, height: u64, block: Block) {
        let mut state = self.state.write().await;
        let height = height as usize;
        for old in state.blocks.split_off(height) {
            state.by_hash.remove(&old.block_hash());
        }
        state.push(block);
    }
}

#[async_trait]
impl SourceChain for MemorySourceChain {
    async fn block_count(&self) -> Result<u64, SourceError> {
        Ok(self.state.read().await.blocks.len() as u64 - 1)
    }

    async fn block_hash(&self, height: u64) -> Result<BlockHash, SourceError> {
        self.state
            .read()
            .await
            .blocks
            .get(height as usize)
            .map(Block::block_hash)
            .ok_or_else(|| SourceError::not_found(format!("block at height {height}")))
    }

    async fn block(&self, hash: &BlockHash) -> Result<Block, SourceError> {
        let state = self.state.read().await;
        state
            .by_hash
            .get(hash)
            .map(|idx| state.blocks[*idx].clone())
            .ok_or_else(|| SourceError::not_found(format!("block {hash}")))
    }

    async fn transaction(&self, txid: &Txid) -> Result<Transaction, SourceError> {
        self.state
            .read()
            .await
            .txs
            .get(txid)
            .cloned()
            .ok_or_else(|| SourceError::not_found(format!("tx {txid}")))
    }
}
