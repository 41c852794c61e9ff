//! Source chain access.

use std::collections::HashMap;

use async_trait::async_trait;
use bevm_config::BitcoindConfig;
use bitcoin::{Block, BlockHash, OutPoint, Transaction, TxOut, Txid};
use bitcoind_async_client::{traits::Reader, Auth, Client};
use futures::{stream, StreamExt, TryStreamExt};
use tracing::*;

use crate::errors::{SourceError, SyncError};

/// Read access to the source chain.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SourceChain: Send + Sync {
    /// Height of the current tip.
    async fn block_count(&self) -> Result<u64, SourceError>;

    async fn block_hash(&self, height: u64) -> Result<BlockHash, SourceError>;

    async fn block(&self, hash: &BlockHash) -> Result<Block, SourceError>;

    /// Fetches a confirmed transaction, used to resolve previous outputs.
    async fn transaction(&self, txid: &Txid) -> Result<Transaction, SourceError>;
}

/// [`SourceChain`] over a bitcoind RPC reader.
#[derive(Debug)]
pub struct BitcoindSource<R> {
    client: R,
}

impl<R: Reader> BitcoindSource<R> {
    pub fn new(client: R) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &R {
        &self.client
    }
}

impl BitcoindSource<Client> {
    /// Connects to the node described by `config`.
    pub fn connect(config: &BitcoindConfig) -> Result<Self, SourceError> {
        let auth = Auth::UserPass(config.rpc_user.clone(), config.rpc_password.clone());
        let client = Client::new(
            config.rpc_url.clone(),
            auth,
            config.retry_count.map(u16::from),
            config.retry_interval,
            None,
        )
        .map_err(|e| SourceError::rpc(e.to_string()))?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl<R: Reader + Send + Sync> SourceChain for BitcoindSource<R> {
    async fn block_count(&self) -> Result<u64, SourceError> {
        let chain_info = self
            .client
            .get_blockchain_info()
            .await
            .map_err(|e| SourceError::rpc(e.to_string()))?;
        Ok(u64::from(chain_info.blocks))
    }

    async fn block_hash(&self, height: u64) -> Result<BlockHash, SourceError> {
        self.client
            .get_block_hash(height)
            .await
            .map_err(|e| SourceError::rpc(e.to_string()))
    }

    async fn block(&self, hash: &BlockHash) -> Result<Block, SourceError> {
        self.client
            .get_block(hash)
            .await
            .map_err(|e| SourceError::rpc(e.to_string()))
    }

    async fn transaction(&self, txid: &Txid) -> Result<Transaction, SourceError> {
        let raw = self
            .client
            .get_raw_transaction_verbosity_zero(txid)
            .await
            .map_err(|e| SourceError::not_found(format!("{txid}: {e}")))?;
        Ok(raw.0)
    }
}

/// Fetches the outputs spent at `outpoints`.
///
/// Each source transaction is fetched once, with at most `concurrency` requests in flight.
/// Lookups are joined before returning.
pub async fn resolve_prev_outputs(
    source: &impl SourceChain,
    outpoints: &[OutPoint],
    concurrency: usize,
) -> Result<HashMap<OutPoint, TxOut>, SyncError> {
    if outpoints.is_empty() {
        return Ok(HashMap::new());
    }

    let mut txids: Vec<Txid> = outpoints.iter().map(|op| op.txid).collect();
    txids.sort_unstable();
    txids.dedup();
    trace!(outpoints = outpoints.len(), txs = txids.len(), "resolving previous outputs");

    let fetched: HashMap<Txid, Transaction> = stream::iter(txids)
        .map(|txid| async move { source.transaction(&txid).await.map(|tx| (txid, tx)) })
        .buffer_unordered(concurrency.max(1))
        .try_collect()
        .await?;

    let mut prevouts = HashMap::with_capacity(outpoints.len());
    for outpoint in outpoints {
        let prev_out = fetched
            .get(&outpoint.txid)
            .and_then(|tx| tx.output.get(outpoint.vout as usize))
            .cloned()
            .ok_or(SyncError::MissingPrevOutput(*outpoint))?;
        prevouts.insert(*outpoint, prev_out);
    }
    Ok(prevouts)
}

#[cfg(test)]
mod tests {
    use bevm_test_utils::btc::dummy_tx;
    use bitcoin::hashes::Hash;

    use super::*;

    #[tokio::test]
    async fn test_resolve_dedups_fetches() {
        let funding = dummy_tx(&[1_000, 2_000, 3_000]);
        let txid = funding.compute_txid();

        let mut source = MockSourceChain::new();
        source
            .expect_transaction()
            .times(1)
            .returning(move |_| Ok(funding.clone()));

        let outpoints = [OutPoint::new(txid, 2), OutPoint::new(txid, 0)];
        let prevouts = resolve_prev_outputs(&source, &outpoints, 4).await.unwrap();

        assert_eq!(prevouts.len(), 2);
        assert_eq!(prevouts[&outpoints[0]].value.to_sat(), 3_000);
        assert_eq!(prevouts[&outpoints[1]].value.to_sat(), 1_000);
    }

    #[tokio::test]
    async fn test_resolve_missing_output_index() {
        let funding = dummy_tx(&[1_000]);
        let txid = funding.compute_txid();

        let mut source = MockSourceChain::new();
        source
            .expect_transaction()
            .returning(move |_| Ok(funding.clone()));

        let missing = OutPoint::new(txid, 5);
        let err = resolve_prev_outputs(&source, &[missing], 1)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::MissingPrevOutput(op) if op == missing));
    }

    #[tokio::test]
    async fn test_resolve_propagates_source_error() {
        let mut source = MockSourceChain::new();
        source
            .expect_transaction()
            .returning(|txid| Err(SourceError::not_found(txid.to_string())));

        let outpoint = OutPoint::new(Txid::from_byte_array([9; 32]), 0);
        let err = resolve_prev_outputs(&source, &[outpoint], 8)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Source(SourceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_resolve_nothing() {
        let source = MockSourceChain::new();
        let prevouts = resolve_prev_outputs(&source, &[], 8).await.unwrap();
        assert!(prevouts.is_empty());
    }
}
