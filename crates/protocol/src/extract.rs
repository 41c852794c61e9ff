//! Invocation extraction from source transactions.

use std::collections::{BTreeMap, HashMap};

use bitcoin::{OutPoint, Transaction, TxIn, TxOut, Txid};
use tracing::*;

use crate::{
    address::identity_of,
    payload::{Invocation, Payload},
    witness::{reassemble_payload, WitnessPayload},
};

/// Lookup of outputs spent by the transactions being extracted.
pub trait PrevOutputLookup {
    fn prev_output(&self, outpoint: &OutPoint) -> Option<&TxOut>;
}

impl PrevOutputLookup for HashMap<OutPoint, TxOut> {
    fn prev_output(&self, outpoint: &OutPoint) -> Option<&TxOut> {
        self.get(outpoint)
    }
}

impl PrevOutputLookup for BTreeMap<OutPoint, TxOut> {
    fn prev_output(&self, outpoint: &OutPoint) -> Option<&TxOut> {
        self.get(outpoint)
    }
}

/// Reads the framed payload of an input if it looks like one of ours.
fn input_payload(txid: &Txid, idx: usize, txin: &TxIn) -> Option<Vec<u8>> {
    // only bare p2wsh spends carry payloads
    if !txin.script_sig.is_empty() {
        return None;
    }
    match reassemble_payload(&txin.witness) {
        WitnessPayload::Framed(buf) => Some(buf),
        WitnessPayload::DropsTooLarge { drops, items } => {
            warn!(%txid, input = idx, %drops, %items, "drops too large");
            None
        }
        WitnessPayload::NotOurs | WitnessPayload::Empty => None,
    }
}

/// Outpoints whose previous outputs [`extract_invocations`] may need to look up.
///
/// Lets callers fetch previous outputs for a whole block ahead of extraction.
pub fn collect_referenced_outpoints(tx: &Transaction) -> Vec<OutPoint> {
    tx.input
        .iter()
        .filter(|txin| {
            txin.script_sig.is_empty()
                && matches!(
                    reassemble_payload(&txin.witness),
                    WitnessPayload::Framed(_)
                )
        })
        .map(|txin| txin.previous_output)
        .collect()
}

/// Decodes the invocations carried by a transaction's inputs, in input order.
///
/// Inputs that don't match the witness shape, fail to decode, or spend something other than a
/// v0 script hash output are skipped. The sender of each invocation is the identity of the
/// spent output's witness program.
pub fn extract_invocations(tx: &Transaction, prevouts: &impl PrevOutputLookup) -> Vec<Invocation> {
    let txid = tx.compute_txid();
    let mut invocations = Vec::new();

    for (idx, txin) in tx.input.iter().enumerate() {
        let Some(buf) = input_payload(&txid, idx, txin) else {
            continue;
        };

        let payload = match Payload::decode(&buf) {
            Ok(payload) => payload,
            Err(err) => {
                info!(%txid, input = idx, %err, "decode evm witness error");
                continue;
            }
        };

        // resolved last so undecodable inputs never need a lookup
        let Some(prev_out) = prevouts.prev_output(&txin.previous_output) else {
            warn!(%txid, input = idx, outpoint = %txin.previous_output, "missing previous output");
            continue;
        };
        let spk = &prev_out.script_pubkey;
        if !spk.is_p2wsh() {
            debug!(%txid, input = idx, "spent output is not a v0 script hash");
            continue;
        }

        let from = identity_of(&spk.as_bytes()[2..34]);
        trace!(%txid, input = idx, %from, "extracted invocation");
        invocations.push(payload.resolve(from));
    }

    invocations
}
