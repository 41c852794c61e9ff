//! Parsing helpers shared by the subcommands.

use std::str::FromStr;

use anyhow::Context;
use bitcoin::{
    consensus::encode::deserialize_hex, Amount, Network, OutPoint, ScriptBuf, Transaction, TxOut,
    Txid,
};

/// The default network to use.
const DEFAULT_NETWORK: Network = Network::Regtest;

/// Resolves a [`Network`] from its core name, falling back to regtest.
pub(crate) fn resolve_network(arg: Option<&str>) -> anyhow::Result<Network> {
    match arg {
        Some(name) => {
            Network::from_str(name).with_context(|| format!("unsupported network {name}"))
        }
        None => Ok(DEFAULT_NETWORK),
    }
}

pub(crate) fn parse_hex(s: &str) -> anyhow::Result<Vec<u8>> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(s).with_context(|| format!("invalid hex {s}"))
}

pub(crate) fn parse_tx(s: &str) -> anyhow::Result<Transaction> {
    deserialize_hex(s.trim()).context("invalid transaction")
}

/// Parses `txid:vout:script-hex` into a spent output with zero value.
pub(crate) fn parse_prevout(s: &str) -> anyhow::Result<(OutPoint, TxOut)> {
    let mut parts = s.splitn(3, ':');
    let (Some(txid), Some(vout), Some(script)) = (parts.next(), parts.next(), parts.next()) else {
        anyhow::bail!("expected txid:vout:script-hex, got {s}");
    };

    let txid = Txid::from_str(txid).with_context(|| format!("invalid txid {txid}"))?;
    let vout = vout
        .parse::<u32>()
        .with_context(|| format!("invalid output index {vout}"))?;
    let script_pubkey = ScriptBuf::from_bytes(parse_hex(script)?);

    Ok((
        OutPoint::new(txid, vout),
        TxOut {
            value: Amount::ZERO,
            script_pubkey,
        },
    ))
}
