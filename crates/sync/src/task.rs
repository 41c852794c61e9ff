use std::{sync::Arc, time::Duration};

use bevm_translator::{block_hash_to_anchor, collect_block_outpoints, translate};
use tokio::{select, sync::watch, time};
use tracing::*;

use crate::{
    engine::ExecutionEngine,
    errors::SyncError,
    source::{resolve_prev_outputs, SourceChain},
    status::{SyncStatus, SyncStatusUpdate},
};

/// Drives the derived chain forward from the source chain.
#[derive(Debug)]
pub struct SyncTask<S, E> {
    source: Arc<S>,
    engine: Arc<E>,
    poll_interval: Duration,
    prevout_fetch_concurrency: usize,
    status_tx: watch::Sender<SyncStatus>,
}

impl<S: SourceChain, E: ExecutionEngine> SyncTask<S, E> {
    pub fn new(
        source: Arc<S>,
        engine: Arc<E>,
        poll_interval: Duration,
        prevout_fetch_concurrency: usize,
        status_tx: watch::Sender<SyncStatus>,
    ) -> Self {
        Self {
            source,
            engine,
            poll_interval,
            prevout_fetch_concurrency,
            status_tx,
        }
    }

    /// Accepts every source block above the derived head, in order.
    ///
    /// Returns the number of blocks accepted. On error, blocks accepted before the failing one
    /// stay accepted and the head never moves past the last successful insert.
    pub async fn poll_once(&self) -> Result<u64, SyncError> {
        let mut cursor = self.engine.current_head().await?;
        let source_height = self.source.block_count().await?;
        self.publish([
            SyncStatusUpdate::DerivedHeight(cursor.number),
            SyncStatusUpdate::SourceHeight(source_height),
        ]);

        let mut accepted = 0;
        while cursor.number < source_height {
            let height = cursor.number + 1;
            let blkid = self.source.block_hash(height).await?;
            let block = self.source.block(&blkid).await?;

            let found = block_hash_to_anchor(&block.header.prev_blockhash);
            if found != cursor.source_anchor {
                return Err(SyncError::Reorg {
                    height,
                    expected: cursor.source_anchor,
                    found,
                });
            }

            let outpoints = collect_block_outpoints(&block);
            let prevouts = resolve_prev_outputs(
                self.source.as_ref(),
                &outpoints,
                self.prevout_fetch_concurrency,
            )
            .await?;

            let derived = translate(&block, height, cursor.hash, &prevouts);
            let txs = derived.transactions().len();

            let executed = self.engine.execute_block(derived).await?;
            let head = executed.head();
            let gas_used = executed.gas_used();
            self.engine.insert_block(executed).await?;

            info!(%height, %blkid, %txs, %gas_used, "accepted new block");
            cursor = head;
            accepted += 1;
            self.publish([SyncStatusUpdate::DerivedHeight(cursor.number)]);
        }

        Ok(accepted)
    }

    /// Polls until `stop` flips to `true` or its sender is dropped.
    ///
    /// The stop signal is checked between iterations only, so a block being submitted always
    /// finishes.
    pub async fn run(self, mut stop: watch::Receiver<bool>) {
        info!(interval = ?self.poll_interval, "starting sync task");
        loop {
            let stopping = *stop.borrow_and_update();
            if stopping {
                break;
            }

            match self.poll_once().await {
                Ok(accepted) => {
                    if accepted > 0 {
                        debug!(%accepted, "sync iteration done");
                    }
                    self.publish([SyncStatusUpdate::ClearError]);
                }
                Err(err @ SyncError::Reorg { .. }) => {
                    // no rollback, retries until resolved out of band
                    error!(%err, "source chain discontinuity");
                    self.publish([SyncStatusUpdate::LastError(err.to_string())]);
                }
                Err(err) => {
                    warn!(%err, "sync iteration failed");
                    self.publish([SyncStatusUpdate::LastError(err.to_string())]);
                }
            }

            select! {
                _ = time::sleep(self.poll_interval) => {}
                changed = stop.changed() => {
                    if changed.is_err() {
                        warn!("stop channel closed");
                        break;
                    }
                }
            }
        }
        info!("sync task stopped");
    }

    fn publish<const N: usize>(&self, updates: [SyncStatusUpdate; N]) {
        self.status_tx.send_modify(|status| status.apply(updates));
    }
}
