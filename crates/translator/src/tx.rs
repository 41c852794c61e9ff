//! Derived-chain transaction wrapping one invocation.

use alloy_primitives::{keccak256, Address, Bytes, TxKind, B256, U256};
use alloy_rlp::{RlpDecodable, RlpEncodable};
use bevm_protocol::{Invocation, Payload};
use bitcoin::{hashes::Hash, Txid};
use serde::{Deserialize, Serialize};

/// Gas allowance given to every bridged transaction.
pub const BRIDGED_TX_GAS_LIMIT: u64 = 10_000_000;

/// Synthetic transaction carrying an invocation recovered from the source chain.
///
/// Authorization comes from the source-chain spend, so the economic fields are constants and
/// the signature is empty.
#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable, Serialize, Deserialize)]
pub struct BridgedTx {
    pub from: Address,
    pub to: TxKind,
    pub input: Bytes,
    /// Raw bytes of the source transaction id.
    pub ref_hash: B256,
    /// Position of the invocation among those of the source transaction.
    pub index: u64,
}

impl BridgedTx {
    pub fn new(invocation: Invocation, ref_hash: B256, index: u64) -> Self {
        let (from, payload) = invocation.into_parts();
        let (to, input) = match payload {
            Payload::Call { to, data } => (TxKind::Call(to), data),
            Payload::Deploy { data } => (TxKind::Create, data),
        };
        Self {
            from,
            to,
            input,
            ref_hash,
            index,
        }
    }

    /// Source transaction id this transaction was derived from.
    pub fn source_txid(&self) -> Txid {
        Txid::from_byte_array(self.ref_hash.0)
    }

    pub fn is_create(&self) -> bool {
        self.to.is_create()
    }

    pub fn gas_limit(&self) -> u64 {
        BRIDGED_TX_GAS_LIMIT
    }

    pub fn gas_price(&self) -> u128 {
        0
    }

    pub fn value(&self) -> U256 {
        U256::ZERO
    }

    pub fn nonce(&self) -> u64 {
        0
    }

    pub fn chain_id(&self) -> u64 {
        0
    }

    /// `(v, r, s)`, always zero.
    pub fn signature(&self) -> (u64, U256, U256) {
        (0, U256::ZERO, U256::ZERO)
    }

    /// Keccak-256 of the RLP encoding.
    pub fn tx_hash(&self) -> B256 {
        keccak256(alloy_rlp::encode(self))
    }
}

/// Converts a source transaction id into its reference hash.
pub fn txid_to_ref_hash(txid: &Txid) -> B256 {
    B256::from(txid.to_byte_array())
}
