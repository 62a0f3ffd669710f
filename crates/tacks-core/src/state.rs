//! Engine lifecycle state shared with callers.

/// Where the engine is in its lifecycle.
///
/// `Ready` is reached after the first load attempt settles, whether or not
/// it succeeded; the UI must never hang waiting for `Loading` to clear.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SyncPhase {
    /// No load has been attempted yet
    #[default]
    Idle,
    /// Initial full load in flight
    Loading,
    /// At least one load attempt has settled
    Ready,
}

/// Snapshot of engine status visible to callers.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct EngineStatus {
    /// Lifecycle phase
    pub phase: SyncPhase,
    /// A reload or drain pass is currently in flight
    pub is_syncing: bool,
    /// The initial load attempt has settled (success or failure)
    pub has_loaded_once: bool,
    /// Most recent load failure, cleared when a later load starts
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_is_idle() {
        let status = EngineStatus::default();
        assert_eq!(status.phase, SyncPhase::Idle);
        assert!(!status.has_loaded_once);
        assert!(status.last_error.is_none());
    }
}
