//! One-shot broadcast cancellation.
//!
//! [`CancelSignal`] wraps tokio's [`CancellationToken`]. Clones share the
//! same state; [`child`](CancelSignal::child) derives a signal that follows
//! its parent but can be cancelled on its own.
//!
//! ```rust
//! use drainpipe::CancelSignal;
//!
//! let root = CancelSignal::new();
//! let stage = root.child();
//!
//! assert!(!stage.is_cancelled());
//! root.cancel();
//! assert!(stage.is_cancelled());
//! ```

use std::fmt;

use tokio_util::sync::CancellationToken;

/// Broadcast, idempotent stop notification with no payload.
///
/// The state only moves from live to cancelled. Observe it either with a
/// non-blocking [`is_cancelled`](Self::is_cancelled) poll or by awaiting
/// [`cancelled`](Self::cancelled).
#[derive(Clone, Default)]
pub struct CancelSignal {
    token: CancellationToken,
}

impl CancelSignal {
    /// Create a live signal.
    #[inline]
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Cancel this signal and every child derived from it.
    ///
    /// Calling it again has no further effect.
    #[inline]
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Non-blocking check.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait until the signal is cancelled.
    ///
    /// Completes immediately if it already is.
    #[inline]
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// Derive a signal that is cancelled whenever this one is.
    ///
    /// Cancelling the child does not affect the parent or its siblings.
    #[inline]
    pub fn child(&self) -> CancelSignal {
        Self {
            token: self.token.child_token(),
        }
    }

    /// Borrow the underlying token.
    #[inline]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl From<CancellationToken> for CancelSignal {
    fn from(token: CancellationToken) -> Self {
        Self { token }
    }
}

impl From<CancelSignal> for CancellationToken {
    fn from(signal: CancelSignal) -> Self {
        signal.token
    }
}

impl fmt::Debug for CancelSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelSignal")
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}
