use tokio::task::JoinHandle;

/// Cancellable turn deadline, one per room.
///
/// Arming always aborts the previous task, so at most one timer is live for
/// a room and a manual action can never race a second expiry. The service
/// additionally guards every expiry callback with the round id captured at
/// arm time, so an aborted-too-late fire is still a no-op.
#[derive(Debug, Default)]
pub struct TurnTimer {
    handle: Option<JoinHandle<()>>,
    /// Millisecond timestamp the current turn runs out at, mirrored into
    /// state snapshots for the client countdown.
    pub ends_at: Option<i64>,
}

impl TurnTimer {
    pub fn arm(&mut self, handle: JoinHandle<()>, ends_at: i64) {
        self.cancel();
        self.handle = Some(handle);
        self.ends_at = Some(ends_at);
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.ends_at = None;
    }

    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for TurnTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
