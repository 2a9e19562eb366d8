use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// A one-shot delayed callback that can be stopped before it fires.
///
/// Stopping `parent` stops every task created under it.
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    token: CancellationToken,
}

impl ScheduledTask {
    pub fn after<F>(runtime: &Handle, parent: &CancellationToken, delay: Duration, fire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let token = parent.child_token();
        let guard = token.clone();
        runtime.spawn(async move {
            tokio::select! {
                _ = guard.cancelled() => {}
                _ = tokio::time::sleep(delay) => fire(),
            }
        });
        Self { token }
    }

    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Cancellation scope for everything started on behalf of the tracked job.
#[derive(Debug, Default)]
pub struct JobScope {
    token: CancellationToken,
}

impl JobScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Cancels the current scope and opens a fresh one.
    pub fn restart(&mut self) -> CancellationToken {
        self.token.cancel();
        self.token = CancellationToken::new();
        self.token.clone()
    }

    pub fn stop(&self) {
        self.token.cancel();
    }
}
