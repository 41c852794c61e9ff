//! Source block to derived block translation.

use alloy_consensus::Header;
use alloy_primitives::{B256, U256};
use bevm_protocol::{collect_referenced_outpoints, extract_invocations, PrevOutputLookup};
use bitcoin::{Block, OutPoint};
use tracing::*;

use crate::{
    block::{block_hash_to_anchor, DerivedBlock},
    tx::{txid_to_ref_hash, BridgedTx},
};

/// Outpoints whose previous outputs are needed to translate `block`, in transaction order.
///
/// May repeat an outpoint only if the block itself double-spends, which a valid block can't.
pub fn collect_block_outpoints(block: &Block) -> Vec<OutPoint> {
    block
        .txdata
        .iter()
        .flat_map(collect_referenced_outpoints)
        .collect()
}

/// Work of the block's target as a derived-chain difficulty.
pub fn block_difficulty(block: &Block) -> U256 {
    U256::from_be_bytes(block.header.work().to_be_bytes())
}

/// Translates `block` at `height` into a derived block on top of `parent_hash`.
///
/// Pure given `prevouts`: the same inputs always produce the same block.
pub fn translate(
    block: &Block,
    height: u64,
    parent_hash: B256,
    prevouts: &impl PrevOutputLookup,
) -> DerivedBlock {
    let mut transactions = Vec::new();
    for tx in &block.txdata {
        let invocations = extract_invocations(tx, prevouts);
        if invocations.is_empty() {
            continue;
        }

        let ref_hash = txid_to_ref_hash(&tx.compute_txid());
        transactions.extend(
            invocations
                .into_iter()
                .enumerate()
                .map(|(index, inv)| BridgedTx::new(inv, ref_hash, index as u64)),
        );
    }

    let header = Header {
        parent_hash,
        ommers_hash: block_hash_to_anchor(&block.block_hash()),
        state_root: B256::ZERO,
        transactions_root: B256::ZERO,
        receipts_root: B256::ZERO,
        number: height,
        timestamp: block.header.time as u64,
        difficulty: block_difficulty(block),
        gas_limit: u64::MAX,
        ..Default::default()
    };

    debug!(%height, blkid = %block.block_hash(), txs = transactions.len(), "translated block");
    DerivedBlock::new(header, transactions)
}
