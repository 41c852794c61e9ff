//! Spending witnesses carrying payloads.

use bitcoin::{
    ecdsa,
    hashes::Hash,
    sighash::{EcdsaSighashType, SighashCache},
    Amount, Script, Transaction, Witness,
};
use secp256k1::{Message, SecretKey, SECP256K1};

use crate::{
    errors::SignError,
    payload::Payload,
    script::{evm_locking_script, ScriptKind},
    witness::lay_out_witness,
};

/// Builds the witness spending input `input_index` of `tx`, locked by `locking_script`.
///
/// The signature commits to `locking_script` as the P2WSH subscript with `SIGHASH_ALL`. The
/// payload, if any, is laid out between the signature and the script.
pub fn build_spend_witness(
    tx: &Transaction,
    input_index: usize,
    spent_amount: Amount,
    locking_script: &Script,
    payload: Option<&Payload>,
    secret_key: &SecretKey,
) -> Result<Witness, SignError> {
    if input_index >= tx.input.len() {
        return Err(SignError::InputIndex {
            index: input_index,
            inputs: tx.input.len(),
        });
    }

    let sighash_type = EcdsaSighashType::All;
    let sighash = SighashCache::new(tx)
        .p2wsh_signature_hash(input_index, locking_script, spent_amount, sighash_type)
        .map_err(|err| SignError::Sighash(err.to_string()))?;
    let msg = Message::from_digest(sighash.to_byte_array());
    let signature = ecdsa::Signature {
        signature: SECP256K1.sign_ecdsa(&msg, secret_key),
        sighash_type,
    };

    let chunks = payload.map(Payload::to_chunks).unwrap_or_default();
    lay_out_witness(signature.to_vec(), &chunks, locking_script.as_bytes())
}

/// Signs with the standard locking script for the key, picking the deploy script for
/// deployments.
pub fn sign_evm_input(
    tx: &Transaction,
    input_index: usize,
    spent_amount: Amount,
    payload: Option<&Payload>,
    secret_key: &SecretKey,
) -> Result<Witness, SignError> {
    let kind = payload
        .map(|p| p.tag().script_kind())
        .unwrap_or(ScriptKind::Call);
    let pubkey = secp256k1::PublicKey::from_secret_key_global(secret_key);
    let script = evm_locking_script(&pubkey, kind);
    build_spend_witness(tx, input_index, spent_amount, &script, payload, secret_key)
}

/// Parses a raw 32-byte secret key.
pub fn parse_secret_key(bytes: &[u8]) -> Result<SecretKey, SignError> {
    Ok(SecretKey::from_slice(bytes)?)
}
