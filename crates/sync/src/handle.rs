use std::{future::Future, sync::Arc};

use bevm_config::SyncConfig;
use tokio::{sync::watch, task::JoinHandle};

use crate::{engine::ExecutionEngine, source::SourceChain, status::SyncStatus, task::SyncTask};

/// Controls a running sync task.
#[derive(Debug)]
pub struct SyncHandle {
    stop_tx: watch::Sender<bool>,
    status_rx: watch::Receiver<SyncStatus>,
}

impl SyncHandle {
    /// Asks the task to exit at its next iteration boundary.
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }

    pub fn status(&self) -> SyncStatus {
        self.status_rx.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.status_rx.clone()
    }
}

pub fn build_sync_task<S: SourceChain, E: ExecutionEngine>(
    source: Arc<S>,
    engine: Arc<E>,
    config: &SyncConfig,
) -> (SyncHandle, impl Future<Output = ()>) {
    let (stop_tx, stop_rx) = watch::channel(false);
    let (status_tx, status_rx) = watch::channel(SyncStatus::default());

    let task = SyncTask::new(
        source,
        engine,
        config.poll_interval(),
        config.prevout_fetch_concurrency,
        status_tx,
    );
    let handle = SyncHandle { stop_tx, status_rx };

    (handle, task.run(stop_rx))
}

/// Builds the sync task and spawns it on the current runtime.
pub fn spawn_sync_task<S, E>(
    source: Arc<S>,
    engine: Arc<E>,
    config: &SyncConfig,
) -> (SyncHandle, JoinHandle<()>)
where
    S: SourceChain + 'static,
    E: ExecutionEngine + 'static,
{
    let (handle, task) = build_sync_task(source, engine, config);
    (handle, tokio::spawn(task))
}
