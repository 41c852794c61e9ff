//! `inspect` subcommand.

use std::collections::HashMap;

use bevm_protocol::{collect_referenced_outpoints, extract_invocations};

use crate::{
    args::SubcInspect,
    util::{parse_prevout, parse_tx},
};

pub(super) fn exec(cmd: SubcInspect) -> anyhow::Result<()> {
    let tx = parse_tx(&cmd.tx)?;
    let prevouts = cmd
        .prevout
        .iter()
        .map(|s| parse_prevout(s))
        .collect::<anyhow::Result<HashMap<_, _>>>()?;

    for outpoint in collect_referenced_outpoints(&tx) {
        if !prevouts.contains_key(&outpoint) {
            eprintln!("no --prevout for {outpoint}, its input is skipped");
        }
    }

    let invocations = extract_invocations(&tx, &prevouts);
    println!("{}", serde_json::to_string_pretty(&invocations)?);
    Ok(())
}
