//! `address` and `decode-address` subcommands.

use bevm_protocol::{
    address::decode, evm_locking_script, identity_of, EvmScriptAddress, NetworkTable, ScriptKind,
};
use secp256k1::PublicKey;

use crate::{
    args::{SubcAddress, SubcDecodeAddress},
    util::{parse_hex, resolve_network},
};

pub(super) fn exec_address(cmd: SubcAddress) -> anyhow::Result<()> {
    let network = resolve_network(cmd.network.as_deref())?;
    let table = NetworkTable::standard();
    let params = table.get(network)?.clone();

    let pubkey = PublicKey::from_slice(&parse_hex(&cmd.pubkey)?)?;
    let kind = if cmd.deploy {
        ScriptKind::Deploy
    } else {
        ScriptKind::Call
    };

    let addr = EvmScriptAddress::from_pubkey(&pubkey, kind, params);
    let script = evm_locking_script(&pubkey, kind);

    println!("address: {addr}");
    println!("compat: {}", addr.to_compat_string()?);
    println!("identity: {}", addr.identity());
    println!("script: {}", hex::encode(script.as_bytes()));
    Ok(())
}

pub(super) fn exec_decode_address(cmd: SubcDecodeAddress) -> anyhow::Result<()> {
    let default_network = resolve_network(cmd.network.as_deref())?;
    let decoded = decode(&cmd.address, &NetworkTable::standard(), default_network)?;

    println!("version: {}", decoded.witness_version);
    println!("program: {}", hex::encode(&decoded.program));
    println!("network: {}", decoded.network);
    println!("identity: {}", identity_of(&decoded.program));
    Ok(())
}
