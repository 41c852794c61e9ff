//! Deterministic source-chain fixtures.

use bevm_protocol::{build_spend_witness, evm_locking_script, witness_program, Payload, ScriptKind};
use bitcoin::{
    absolute::LockTime,
    block::{Header, Version as BlockVersion},
    hashes::Hash,
    script::Builder,
    transaction::Version,
    Amount, Block, BlockHash, CompactTarget, OutPoint, ScriptBuf, Sequence, Transaction,
    TxMerkleNode, TxIn, TxOut, Txid, WScriptHash, Witness,
};
use secp256k1::{PublicKey, SecretKey};

/// Value of every output created by [`evm_funding_tx`].
pub const FUNDING_VALUE: Amount = Amount::from_sat(100_000);

/// Regtest proof-of-work limit.
const REGTEST_BITS: u32 = 0x207f_ffff;

const BLOCK_TIME: u32 = 1_700_000_000;

/// Deterministic secret key; `n = 0` maps to 1.
pub fn test_secret_key(n: u8) -> SecretKey {
    SecretKey::from_slice(&[n.max(1); 32]).expect("nonzero key in range")
}

pub fn test_pubkey(n: u8) -> PublicKey {
    PublicKey::from_secret_key_global(&test_secret_key(n))
}

/// Coinbase transaction committing to `height`.
pub fn coinbase_tx(height: u64) -> Transaction {
    Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: OutPoint::null(),
            script_sig: Builder::new().push_int(height as i64).into_script(),
            sequence: Sequence::MAX,
            witness: Witness::new(),
        }],
        output: vec![TxOut {
            value: Amount::from_int_btc(50),
            script_pubkey: ScriptBuf::new(),
        }],
    }
}

/// Non-coinbase transaction paying `values` to empty scripts.
pub fn dummy_tx(values: &[u64]) -> Transaction {
    Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: OutPoint::new(Txid::all_zeros(), 0),
            script_sig: ScriptBuf::new(),
            sequence: Sequence::ENABLE_RBF_NO_LOCKTIME,
            witness: Witness::new(),
        }],
        output: values
            .iter()
            .map(|v| TxOut {
                value: Amount::from_sat(*v),
                script_pubkey: ScriptBuf::new(),
            })
            .collect(),
    }
}

/// Builds a regtest block on `prev` with a correct merkle root. Proof of work is not ground.
pub fn build_block(prev: BlockHash, txdata: Vec<Transaction>) -> Block {
    let mut block = Block {
        header: Header {
            version: BlockVersion::TWO,
            prev_blockhash: prev,
            merkle_root: TxMerkleNode::all_zeros(),
            time: BLOCK_TIME,
            bits: CompactTarget::from_consensus(REGTEST_BITS),
            nonce: 0,
        },
        txdata,
    };
    if let Some(root) = block.compute_merkle_root() {
        block.header.merkle_root = root;
    }
    block
}

/// Output script paying to the call locking script of `secret_key`.
pub fn evm_output_script(secret_key: &SecretKey) -> ScriptBuf {
    let script = evm_locking_script(
        &PublicKey::from_secret_key_global(secret_key),
        ScriptKind::Call,
    );
    ScriptBuf::new_p2wsh(&WScriptHash::from_byte_array(witness_program(
        script.as_bytes(),
    )))
}

/// Transaction funding the call locking script of `secret_key`.
///
/// `tag` keeps funding transactions for the same key distinct.
pub fn evm_funding_tx(secret_key: &SecretKey, tag: u8) -> Transaction {
    let mut tx = dummy_tx(&[]);
    tx.input[0].previous_output = OutPoint::new(Txid::from_byte_array([tag; 32]), 0);
    tx.output.push(TxOut {
        value: FUNDING_VALUE,
        script_pubkey: evm_output_script(secret_key),
    });
    tx
}

/// First output of [`evm_funding_tx`] with its outpoint.
pub fn evm_funding_output(secret_key: &SecretKey, tag: u8) -> (OutPoint, TxOut) {
    let tx = evm_funding_tx(secret_key, tag);
    (OutPoint::new(tx.compute_txid(), 0), tx.output[0].clone())
}

/// Spends outputs funded by [`evm_funding_tx`], attaching a payload to each input.
///
/// Deployments are signed against the call script too, so they must fit its capacity.
pub fn spend_evm_outputs(
    secret_key: &SecretKey,
    spends: &[(OutPoint, Option<Payload>)],
) -> Transaction {
    let mut tx = Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: spends
            .iter()
            .map(|(outpoint, _)| TxIn {
                previous_output: *outpoint,
                script_sig: ScriptBuf::new(),
                sequence: Sequence::ENABLE_RBF_NO_LOCKTIME,
                witness: Witness::new(),
            })
            .collect(),
        output: vec![TxOut {
            value: Amount::from_sat(1_000),
            script_pubkey: ScriptBuf::new(),
        }],
    };

    let script = evm_locking_script(
        &PublicKey::from_secret_key_global(secret_key),
        ScriptKind::Call,
    );
    let witnesses: Vec<Witness> = spends
        .iter()
        .enumerate()
        .map(|(i, (_, payload))| {
            build_spend_witness(&tx, i, FUNDING_VALUE, &script, payload.as_ref(), secret_key)
                .expect("payload fits call script")
        })
        .collect();
    for (txin, witness) in tx.input.iter_mut().zip(witnesses) {
        txin.witness = witness;
    }
    tx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_chain_up() {
        let first = build_block(BlockHash::all_zeros(), vec![coinbase_tx(1)]);
        let second = build_block(first.block_hash(), vec![coinbase_tx(2)]);
        assert_eq!(second.header.prev_blockhash, first.block_hash());
        assert_ne!(first.block_hash(), second.block_hash());
        assert!(first.check_merkle_root());
    }

    #[test]
    fn test_funding_outputs_differ_by_tag() {
        let sk = test_secret_key(1);
        let (a, out) = evm_funding_output(&sk, 1);
        let (b, _) = evm_funding_output(&sk, 2);
        assert_ne!(a, b);
        assert!(out.script_pubkey.is_p2wsh());
    }
}
