//! Caller context carried through a dispatch.

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Cancellation signal, optional deadline and a correlation id.
///
/// Cloning shares the same cancellation token.
#[derive(Debug, Clone)]
pub struct RequestContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
    request_id: String,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline: None,
            request_id: Uuid::new_v4().to_string(),
        }
    }

    /// Bind to an externally owned token (e.g. a Ctrl-C handler).
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = id.into();
        self
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_shares_cancellation() {
        let ctx = RequestContext::new();
        let other = ctx.clone();
        assert!(!other.is_cancelled());
        ctx.cancel();
        assert!(other.is_cancelled());
        assert_eq!(ctx.request_id(), other.request_id());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_expiry() {
        let ctx = RequestContext::new().with_timeout(Duration::from_secs(5));
        assert!(!ctx.is_expired());
        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(ctx.is_expired());
        assert!(!RequestContext::new().is_expired());
    }
}
