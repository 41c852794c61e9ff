//! Witness standardness checks for P2WSH spends.
//!
//! Relay nodes reject P2WSH spends whose witness exceeds the standard limits even though the
//! spend is valid by consensus. Wallets run [`check_witness_standard`] before broadcasting.

use bitcoin::Transaction;

use crate::{
    constants::{
        MAX_STANDARD_P2WSH_SCRIPT_SIZE, MAX_STANDARD_P2WSH_STACK_ITEMS,
        MAX_STANDARD_P2WSH_STACK_ITEM_SIZE,
    },
    errors::PolicyError,
    extract::PrevOutputLookup,
};

/// Checks every witness-carrying input of `tx` against the standard P2WSH limits.
///
/// Coinbase transactions are always standard and inputs without a witness are ignored.
/// P2SH-wrapped and taproot spends are reported as unsupported. Other native witness programs
/// (key hashes, future versions) carry no extra limits here.
pub fn check_witness_standard(
    tx: &Transaction,
    prevouts: &impl PrevOutputLookup,
) -> Result<(), PolicyError> {
    if tx.is_coinbase() {
        return Ok(());
    }

    for (input, txin) in tx.input.iter().enumerate() {
        if txin.witness.is_empty() {
            continue;
        }

        let prev_out = prevouts
            .prev_output(&txin.previous_output)
            .ok_or(PolicyError::MissingPrevOutput { input })?;
        let spk = &prev_out.script_pubkey;

        if spk.is_p2sh() {
            return Err(PolicyError::Unsupported {
                input,
                kind: "p2sh-wrapped witness",
            });
        }
        if !spk.is_witness_program() {
            return Err(PolicyError::NotWitnessProgram { input });
        }
        if spk.is_p2tr() {
            return Err(PolicyError::Unsupported {
                input,
                kind: "taproot",
            });
        }
        if !spk.is_p2wsh() {
            continue;
        }

        let items: Vec<&[u8]> = txin.witness.iter().collect();
        let Some((script, stack)) = items.split_last() else {
            continue;
        };

        if script.len() > MAX_STANDARD_P2WSH_SCRIPT_SIZE {
            return Err(PolicyError::ScriptTooLarge {
                input,
                size: script.len(),
            });
        }
        if stack.len() > MAX_STANDARD_P2WSH_STACK_ITEMS {
            return Err(PolicyError::TooManyItems {
                input,
                count: stack.len(),
            });
        }
        if let Some((item, elem)) = stack
            .iter()
            .enumerate()
            .find(|(_, elem)| elem.len() > MAX_STANDARD_P2WSH_STACK_ITEM_SIZE)
        {
            return Err(PolicyError::ItemTooLarge {
                input,
                item,
                size: elem.len(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use bitcoin::{
        absolute::LockTime,
        hashes::Hash,
        opcodes::all::{OP_CHECKSIG, OP_DROP},
        transaction::Version,
        Amount, OutPoint, PubkeyHash, ScriptBuf, Sequence, TxIn, TxOut, Txid, WScriptHash,
        Witness,
    };

    use super::*;
    use crate::script::witness_program;

    fn spend(witness: Witness) -> (Transaction, OutPoint) {
        let outpoint = OutPoint {
            txid: Txid::from_byte_array([7; 32]),
            vout: 1,
        };
        let tx = Transaction {
            version: Version::TWO,
            lock_time: LockTime::ZERO,
            input: vec![TxIn {
                previous_output: outpoint,
                script_sig: ScriptBuf::new(),
                sequence: Sequence::MAX,
                witness,
            }],
            output: vec![TxOut {
                value: Amount::from_sat(1_000),
                script_pubkey: ScriptBuf::new(),
            }],
        };
        (tx, outpoint)
    }

    fn p2wsh_prevouts(outpoint: OutPoint, script: &[u8]) -> HashMap<OutPoint, TxOut> {
        let spk = ScriptBuf::new_p2wsh(&WScriptHash::from_byte_array(witness_program(script)));
        HashMap::from([(
            outpoint,
            TxOut {
                value: Amount::from_sat(10_000),
                script_pubkey: spk,
            },
        )])
    }

    fn script(drops: usize) -> Vec<u8> {
        let mut script = vec![OP_DROP.to_u8(); drops];
        script.push(OP_CHECKSIG.to_u8());
        script
    }

    #[test]
    fn test_standard_spend() {
        let script = script(2);
        let witness =
            Witness::from_slice(&[vec![0x30; 72], vec![1; 80], vec![2; 80], script.clone()]);
        let (tx, outpoint) = spend(witness);
        let prevouts = p2wsh_prevouts(outpoint, &script);

        assert_eq!(check_witness_standard(&tx, &prevouts), Ok(()));
    }

    #[test]
    fn test_item_too_large() {
        let script = script(1);
        let witness = Witness::from_slice(&[vec![0x30; 72], vec![1; 81], script.clone()]);
        let (tx, outpoint) = spend(witness);
        let prevouts = p2wsh_prevouts(outpoint, &script);

        assert_eq!(
            check_witness_standard(&tx, &prevouts),
            Err(PolicyError::ItemTooLarge {
                input: 0,
                item: 1,
                size: 81
            })
        );
    }

    #[test]
    fn test_too_many_items() {
        let script = script(1);
        let mut items = vec![vec![]; 101];
        items.push(script.clone());
        let (tx, outpoint) = spend(Witness::from_slice(&items));
        let prevouts = p2wsh_prevouts(outpoint, &script);

        assert_eq!(
            check_witness_standard(&tx, &prevouts),
            Err(PolicyError::TooManyItems {
                input: 0,
                count: 101
            })
        );
    }

    #[test]
    fn test_script_too_large() {
        let script = script(3600);
        let (tx, outpoint) = spend(Witness::from_slice(&[script.clone()]));
        let prevouts = p2wsh_prevouts(outpoint, &script);

        assert_eq!(
            check_witness_standard(&tx, &prevouts),
            Err(PolicyError::ScriptTooLarge {
                input: 0,
                size: 3601
            })
        );
    }

    #[test]
    fn test_legacy_output_rejected() {
        let (tx, outpoint) = spend(Witness::from_slice(&[vec![1u8]]));
        let prevouts = HashMap::from([(
            outpoint,
            TxOut {
                value: Amount::from_sat(10_000),
                script_pubkey: ScriptBuf::new_p2pkh(&PubkeyHash::from_byte_array([3; 20])),
            },
        )]);

        assert_eq!(
            check_witness_standard(&tx, &prevouts),
            Err(PolicyError::NotWitnessProgram { input: 0 })
        );
    }

    #[test]
    fn test_missing_prevout_and_bare_inputs() {
        let (tx, _) = spend(Witness::from_slice(&[vec![1u8]]));
        assert_eq!(
            check_witness_standard(&tx, &HashMap::<OutPoint, TxOut>::new()),
            Err(PolicyError::MissingPrevOutput { input: 0 })
        );

        // no witness, nothing to check
        let (tx, _) = spend(Witness::new());
        assert_eq!(
            check_witness_standard(&tx, &HashMap::<OutPoint, TxOut>::new()),
            Ok(())
        );
    }
}
