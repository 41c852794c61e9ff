//! Derived-chain block assembled from a source block.

use alloy_consensus::Header;
use alloy_primitives::B256;
use bitcoin::{hashes::Hash, BlockHash};
use serde::{Deserialize, Serialize};

use crate::tx::BridgedTx;

/// Converts a source block hash into the anchor stored in derived headers.
///
/// The anchor holds the hash in display order, so it prints the same way block explorers show
/// the source block.
pub fn block_hash_to_anchor(hash: &BlockHash) -> B256 {
    let mut bytes = hash.to_byte_array();
    bytes.reverse();
    B256::from(bytes)
}

/// Inverse of [`block_hash_to_anchor`].
pub fn anchor_to_block_hash(anchor: &B256) -> BlockHash {
    let mut bytes = anchor.0;
    bytes.reverse();
    BlockHash::from_byte_array(bytes)
}

/// A derived block before execution.
///
/// The header's `ommers_hash` carries the source anchor. Roots, gas used and bloom stay zero
/// until the execution engine seals the block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedBlock {
    header: Header,
    transactions: Vec<BridgedTx>,
}

impl DerivedBlock {
    pub fn new(header: Header, transactions: Vec<BridgedTx>) -> Self {
        Self {
            header,
            transactions,
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn transactions(&self) -> &[BridgedTx] {
        &self.transactions
    }

    pub fn number(&self) -> u64 {
        self.header.number
    }

    pub fn parent_hash(&self) -> B256 {
        self.header.parent_hash
    }

    /// Hash of the source block this block was translated from, in anchor form.
    pub fn source_anchor(&self) -> B256 {
        self.header.ommers_hash
    }

    /// Recomputes the header hash.
    pub fn hash_slow(&self) -> B256 {
        self.header.hash_slow()
    }

    pub fn into_parts(self) -> (Header, Vec<BridgedTx>) {
        (self.header, self.transactions)
    }
}
