//! `sign` subcommand.

use std::collections::HashMap;

use alloy_primitives::Address;
use bevm_protocol::{
    check_witness_standard, evm_locking_script, parse_secret_key, sign_evm_input, Payload,
    ScriptKind,
};
use bitcoin::{consensus::encode::serialize_hex, Amount, ScriptBuf, Transaction, TxOut};
use secp256k1::PublicKey;

use crate::{
    args::SubcSign,
    util::{parse_hex, parse_tx},
};

fn payload_from_args(cmd: &SubcSign) -> anyhow::Result<Option<Payload>> {
    match (&cmd.call, &cmd.data, &cmd.deploy) {
        (None, None, None) => Ok(None),
        (Some(to), data, None) => {
            let to: [u8; 20] = parse_hex(to)?
                .try_into()
                .map_err(|_| anyhow::anyhow!("call target must be 20 bytes"))?;
            let data = data.as_deref().map(parse_hex).transpose()?.unwrap_or_default();
            Ok(Some(Payload::call(Address::from(to), data)))
        }
        (None, None, Some(code)) => Ok(Some(Payload::deploy(parse_hex(code)?))),
        (None, Some(_), None) => anyhow::bail!("--data needs --call"),
        _ => anyhow::bail!("--call and --deploy are exclusive"),
    }
}

/// Checks the signed input alone, the other inputs' previous outputs being unknown here.
fn check_signed_input(tx: &Transaction, input: usize, prev_out: TxOut) -> anyhow::Result<()> {
    let view = Transaction {
        input: vec![tx.input[input].clone()],
        ..tx.clone()
    };
    let prevouts = HashMap::from([(tx.input[input].previous_output, prev_out)]);
    check_witness_standard(&view, &prevouts)?;
    Ok(())
}

pub(super) fn exec(cmd: SubcSign) -> anyhow::Result<()> {
    let mut tx = parse_tx(&cmd.tx)?;
    let secret_key = parse_secret_key(&parse_hex(&cmd.key)?)?;
    let payload = payload_from_args(&cmd)?;
    let amount = Amount::from_sat(cmd.amount);

    let witness = sign_evm_input(&tx, cmd.input, amount, payload.as_ref(), &secret_key)?;
    tx.input[cmd.input].witness = witness;

    let kind = payload
        .as_ref()
        .map(|p| p.tag().script_kind())
        .unwrap_or(ScriptKind::Call);
    let script = evm_locking_script(&PublicKey::from_secret_key_global(&secret_key), kind);
    let prev_out = TxOut {
        value: amount,
        script_pubkey: ScriptBuf::new_p2wsh(&script.wscript_hash()),
    };
    check_signed_input(&tx, cmd.input, prev_out)?;

    println!("{}", serialize_hex(&tx));
    Ok(())
}
