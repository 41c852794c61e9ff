use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Snapshot of sync progress published after every iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    /// Height of the derived head.
    pub derived_height: u64,

    /// Source chain height seen by the last successful query.
    pub source_height: Option<u64>,

    /// Error that aborted the last iteration, if it failed.
    pub last_error: Option<String>,

    /// Milliseconds since the unix epoch.
    pub last_update_ms: u64,
}

/// Changes applied to a [`SyncStatus`].
#[derive(Debug, Clone)]
pub enum SyncStatusUpdate {
    DerivedHeight(u64),
    SourceHeight(u64),
    LastError(String),
    ClearError,
}

impl SyncStatus {
    pub fn is_behind(&self) -> bool {
        self.source_height.is_some_and(|h| h > self.derived_height)
    }

    pub fn apply(&mut self, updates: impl IntoIterator<Item = SyncStatusUpdate>) {
        for update in updates {
            match update {
                SyncStatusUpdate::DerivedHeight(h) => self.derived_height = h,
                SyncStatusUpdate::SourceHeight(h) => self.source_height = Some(h),
                SyncStatusUpdate::LastError(err) => self.last_error = Some(err),
                SyncStatusUpdate::ClearError => self.last_error = None,
            }
        }
        self.last_update_ms = now_millis();
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_updates() {
        let mut status = SyncStatus::default();
        status.apply([
            SyncStatusUpdate::SourceHeight(10),
            SyncStatusUpdate::DerivedHeight(4),
            SyncStatusUpdate::LastError("boom".into()),
        ]);
        assert!(status.is_behind());
        assert_eq!(status.last_error.as_deref(), Some("boom"));
        assert!(status.last_update_ms > 0);

        status.apply([
            SyncStatusUpdate::DerivedHeight(10),
            SyncStatusUpdate::ClearError,
        ]);
        assert!(!status.is_behind());
        assert!(status.last_error.is_none());
    }
}
