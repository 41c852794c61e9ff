//! Locking scripts carrying payload capacity.
//!
//! A locking script here is a run of drop opcodes followed by a plain pay-to-pubkey check:
//!
//! ```text
//! OP_2DROP × N  <compressed pubkey>  OP_CHECKSIG
//! ```
//!
//! The drop run advertises how many witness items the spender may attach in front of the
//! signature.

use bitcoin::{
    hashes::{sha256, Hash},
    opcodes::all::{OP_2DROP, OP_CHECKSIG, OP_DROP},
    script::Builder,
    PublicKey, ScriptBuf,
};

use crate::constants::{CALL_SCRIPT_DROP_OPS, DEPLOY_SCRIPT_DROP_OPS};

/// Selects the payload capacity of a locking script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptKind {
    Call,
    Deploy,
}

impl ScriptKind {
    /// Number of `OP_2DROP`s emitted for this kind.
    pub fn drop_ops(self) -> usize {
        match self {
            ScriptKind::Call => CALL_SCRIPT_DROP_OPS,
            ScriptKind::Deploy => DEPLOY_SCRIPT_DROP_OPS,
        }
    }
}

/// Builds the locking script for `pubkey` with the capacity of `kind`.
pub fn evm_locking_script(pubkey: &secp256k1::PublicKey, kind: ScriptKind) -> ScriptBuf {
    let mut builder = Builder::new();
    for _ in 0..kind.drop_ops() {
        builder = builder.push_opcode(OP_2DROP);
    }
    builder
        .push_key(&PublicKey::new(*pubkey))
        .push_opcode(OP_CHECKSIG)
        .into_script()
}

/// Witness program committing to `script`.
pub fn witness_program(script: &[u8]) -> [u8; 32] {
    sha256::Hash::hash(script).to_byte_array()
}

/// Counts stack items discarded by the leading run of drop opcodes.
///
/// `OP_DROP` counts one, `OP_2DROP` counts two. Scanning stops at the first other byte.
pub fn num_drops(script: &[u8]) -> usize {
    let mut drops = 0;
    for &byte in script {
        if byte == OP_DROP.to_u8() {
            drops += 1;
        } else if byte == OP_2DROP.to_u8() {
            drops += 2;
        } else {
            break;
        }
    }
    drops
}
