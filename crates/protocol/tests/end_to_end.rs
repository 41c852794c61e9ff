//! Sign then extract round trips over real locking scripts.

use std::collections::HashMap;

use alloy_primitives::Address;
use bevm_protocol::{
    build_spend_witness, evm_locking_script, extract_invocations, identity_of, num_drops,
    witness_program, EvmScriptAddress, NetworkTable, Payload, ScriptKind, SignError,
};
use bitcoin::{
    absolute::LockTime,
    hashes::Hash,
    opcodes::all::{OP_CHECKSIG, OP_DROP},
    script::Builder,
    transaction::Version,
    Amount, Network, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid, WScriptHash,
    Witness,
};
use secp256k1::{PublicKey, SecretKey};
// Silence unused dependency warnings for these crates
use hex as _;
use proptest as _;
use serde as _;
use thiserror as _;
use tracing as _;

const SPENT_VALUE: Amount = Amount::from_sat(50_000);

fn secret_key() -> SecretKey {
    SecretKey::from_slice(&[0x5a; 32]).unwrap()
}

fn spending_tx(outpoint: OutPoint) -> Transaction {
    Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: outpoint,
            script_sig: ScriptBuf::new(),
            sequence: Sequence::ENABLE_RBF_NO_LOCKTIME,
            witness: Witness::new(),
        }],
        output: vec![TxOut {
            value: Amount::from_sat(49_000),
            script_pubkey: ScriptBuf::new(),
        }],
    }
}

fn p2wsh_prevouts(outpoint: OutPoint, script: &ScriptBuf) -> HashMap<OutPoint, TxOut> {
    let program = witness_program(script.as_bytes());
    HashMap::from([(
        outpoint,
        TxOut {
            value: SPENT_VALUE,
            script_pubkey: ScriptBuf::new_p2wsh(&WScriptHash::from_byte_array(program)),
        },
    )])
}

/// Signs the single input of a fresh transaction spending `script` and returns it with the
/// matching previous output.
fn sign_and_spend(
    script: &ScriptBuf,
    payload: Option<&Payload>,
) -> Result<(Transaction, HashMap<OutPoint, TxOut>), SignError> {
    let outpoint = OutPoint::new(Txid::from_byte_array([0xab; 32]), 3);
    let mut tx = spending_tx(outpoint);
    let witness = build_spend_witness(&tx, 0, SPENT_VALUE, script, payload, &secret_key())?;
    tx.input[0].witness = witness;
    Ok((tx, p2wsh_prevouts(outpoint, script)))
}

/// Ten single drops, the key and a signature check.
fn ten_drop_script(pubkey: &PublicKey) -> ScriptBuf {
    let mut builder = Builder::new();
    for _ in 0..10 {
        builder = builder.push_opcode(OP_DROP);
    }
    builder
        .push_key(&bitcoin::PublicKey::new(*pubkey))
        .push_opcode(OP_CHECKSIG)
        .into_script()
}

#[test]
fn test_call_round_trip() {
    let pubkey = PublicKey::from_secret_key_global(&secret_key());
    let script = ten_drop_script(&pubkey);
    assert_eq!(num_drops(script.as_bytes()), 10);

    let payload = Payload::call(Address::ZERO, vec![1, 2, 3, 4, 5]);
    let (tx, prevouts) = sign_and_spend(&script, Some(&payload)).unwrap();

    let invocations = extract_invocations(&tx, &prevouts);
    assert_eq!(invocations.len(), 1);

    let (from, decoded) = invocations[0].clone().into_parts();
    assert_eq!(decoded.to(), Some(Address::ZERO));
    assert_eq!(decoded.data().as_ref(), &[1, 2, 3, 4, 5]);
    assert_eq!(from, identity_of(&witness_program(script.as_bytes())));
}

#[test]
fn test_two_chunk_deploy_round_trip() {
    let pubkey = PublicKey::from_secret_key_global(&secret_key());
    let script = evm_locking_script(&pubkey, ScriptKind::Deploy);

    let data: Vec<u8> = (0..81u8).collect();
    let payload = Payload::deploy(data);
    assert_eq!(payload.to_chunks().len(), 2);

    let (tx, prevouts) = sign_and_spend(&script, Some(&payload)).unwrap();
    let invocations = extract_invocations(&tx, &prevouts);

    assert_eq!(invocations.len(), 1);
    assert_eq!(invocations[0].payload(), &payload);
}

#[test]
fn test_identity_matches_address() {
    let pubkey = PublicKey::from_secret_key_global(&secret_key());
    let table = NetworkTable::standard();
    let params = table.get(Network::Regtest).unwrap().clone();

    let addr = EvmScriptAddress::from_pubkey(&pubkey, ScriptKind::Call, params);
    let script = evm_locking_script(&pubkey, ScriptKind::Call);
    let payload = Payload::call(Address::repeat_byte(1), Vec::<u8>::new());
    let (tx, prevouts) = sign_and_spend(&script, Some(&payload)).unwrap();

    // the wallet pays to the address, the spend recovers the same identity
    assert_eq!(prevouts.values().next().unwrap().script_pubkey, addr.script_pubkey());
    let invocations = extract_invocations(&tx, &prevouts);
    assert_eq!(invocations[0].from(), addr.identity());
}

#[test]
fn test_script_without_drops_yields_nothing() {
    let pubkey = PublicKey::from_secret_key_global(&secret_key());
    let script = Builder::new()
        .push_key(&bitcoin::PublicKey::new(pubkey))
        .push_opcode(OP_CHECKSIG)
        .into_script();

    // no slots, so a payload can't be signed in
    assert!(matches!(
        sign_and_spend(&script, Some(&Payload::deploy(vec![1]))),
        Err(SignError::Capacity { drops: 0, chunks: 1 })
    ));

    // a hand-built witness with a framed payload in front is still not ours
    let (mut tx, prevouts) = sign_and_spend(&script, None).unwrap();
    let mut items = tx.input[0].witness.to_vec();
    items.insert(1, b"evmd\x01".to_vec());
    tx.input[0].witness = Witness::from_slice(&items);

    assert!(extract_invocations(&tx, &prevouts).is_empty());
}

#[test]
fn test_capacity_violation() {
    let pubkey = PublicKey::from_secret_key_global(&secret_key());
    let script = ten_drop_script(&pubkey);

    // 4-byte tag plus 876 bytes is exactly 11 chunks
    let payload = Payload::deploy(vec![0xcc; 11 * 80 - 4]);
    assert_eq!(payload.to_chunks().len(), 11);

    assert!(matches!(
        sign_and_spend(&script, Some(&payload)),
        Err(SignError::Capacity {
            drops: 10,
            chunks: 11
        })
    ));
}

#[test]
fn test_payload_fills_capacity() {
    let pubkey = PublicKey::from_secret_key_global(&secret_key());
    let script = ten_drop_script(&pubkey);

    let payload = Payload::deploy(vec![0xcc; 10 * 80 - 4]);
    let (tx, prevouts) = sign_and_spend(&script, Some(&payload)).unwrap();

    // signature, ten payload slots, script
    assert_eq!(tx.input[0].witness.len(), 12);
    assert_eq!(extract_invocations(&tx, &prevouts)[0].payload(), &payload);
}
