//! Translation of source blocks into derived-chain blocks.

pub mod block;
pub mod translate;
pub mod tx;

pub use block::{anchor_to_block_hash, block_hash_to_anchor, DerivedBlock};
pub use translate::{block_difficulty, collect_block_outpoints, translate};
pub use tx::{txid_to_ref_hash, BridgedTx, BRIDGED_TX_GAS_LIMIT};
