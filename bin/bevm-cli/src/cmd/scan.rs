//! `scan` subcommand: dry-run translation of a source block range.

use alloy_primitives::B256;
use bevm_common::logging::{self, FileLoggingConfig, LoggerConfig};
use bevm_config::Config;
use bevm_sync::{resolve_prev_outputs, BitcoindSource, SourceChain};
use bevm_translator::{collect_block_outpoints, translate, BridgedTx};
use bitcoin::BlockHash;
use serde::Serialize;
use tokio::runtime;
use tracing::*;

use crate::args::SubcScan;

#[derive(Debug, Serialize)]
struct ScannedBlock {
    height: u64,
    source_hash: BlockHash,
    derived_hash: B256,
    transactions: Vec<BridgedTx>,
}

/// Logs go to stderr so the summary on stdout stays parseable.
fn logger_config(config: &Config) -> LoggerConfig {
    let json_format = config.logging.json_format.unwrap_or(false);
    let mut logger = LoggerConfig::new("bevm-cli".to_owned())
        .with_stderr()
        .with_json_logging(json_format);
    if let Some(dir) = &config.logging.log_dir {
        let prefix = config
            .logging
            .log_file_prefix
            .clone()
            .unwrap_or_else(|| "bevm-cli".to_owned());
        logger = logger.with_file_logging(
            FileLoggingConfig::new(dir.clone(), prefix).with_json_format(json_format),
        );
    }
    logger
}

async fn scan(config: &Config, from: u64, to: u64) -> anyhow::Result<Vec<ScannedBlock>> {
    let source = BitcoindSource::connect(&config.bitcoind)?;
    let concurrency = config.sync.prevout_fetch_concurrency;

    // the range is translated as if its first block sat on a zero parent
    let mut parent_hash = B256::ZERO;
    let mut scanned = Vec::new();
    for height in from..=to {
        let source_hash = source.block_hash(height).await?;
        let block = source.block(&source_hash).await?;

        let outpoints = collect_block_outpoints(&block);
        let prevouts = resolve_prev_outputs(&source, &outpoints, concurrency).await?;
        let derived = translate(&block, height, parent_hash, &prevouts);

        let derived_hash = derived.hash_slow();
        debug!(%height, %source_hash, %derived_hash, "scanned block");
        parent_hash = derived_hash;

        let (_, transactions) = derived.into_parts();
        scanned.push(ScannedBlock {
            height,
            source_hash,
            derived_hash,
            transactions,
        });
    }
    Ok(scanned)
}

pub(super) fn exec(cmd: SubcScan) -> anyhow::Result<()> {
    if cmd.from > cmd.to {
        anyhow::bail!("empty range {}..={}", cmd.from, cmd.to);
    }

    let config = Config::load(&cmd.config)?;
    logging::init(logger_config(&config))?;
    info!(from = cmd.from, to = cmd.to, network = %config.bitcoind.network, "scanning");

    let scanned = runtime::Runtime::new()?.block_on(scan(&config, cmd.from, cmd.to))?;
    let invocations: usize = scanned.iter().map(|b| b.transactions.len()).sum();
    info!(blocks = scanned.len(), %invocations, "scan done");

    println!("{}", serde_json::to_string_pretty(&scanned)?);
    Ok(())
}
