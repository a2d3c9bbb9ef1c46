//! Cooperative cancellation for delta scans.

use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use crate::error::CancelReason;

/// Cloneable cancellation handle checked by the scanner before every chunk.
///
/// Wraps a [`tokio_util::sync::CancellationToken`], which needs no runtime to
/// cancel or poll, and records why it fired. Cancellation is cooperative: a
/// read or hash already in progress finishes first. The first recorded reason
/// wins; later calls to [`cancel_with`](Self::cancel_with) are ignored. A token
/// created with a deadline fires with [`CancelReason::DeadlineExceeded`] the
/// first time it is checked after the deadline.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    token: tokio_util::sync::CancellationToken,
    state: Arc<TokenState>,
}

#[derive(Debug, Default)]
struct TokenState {
    reason: OnceLock<CancelReason>,
    deadline: Option<Instant>,
}

impl CancellationToken {
    /// Creates a token that only fires when cancelled explicitly.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a token for callers that never cancel; equivalent to [`new`](Self::new).
    #[must_use]
    pub fn never() -> Self {
        Self::default()
    }

    /// Creates a token that fires at `deadline`.
    #[must_use]
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: tokio_util::sync::CancellationToken::new(),
            state: Arc::new(TokenState {
                reason: OnceLock::new(),
                deadline: Some(deadline),
            }),
        }
    }

    /// Creates a token that fires `timeout` from now.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Instant::now()
            .checked_add(timeout)
            .map_or_else(Self::new, Self::with_deadline)
    }

    /// Requests cancellation with [`CancelReason::Requested`].
    pub fn cancel(&self) {
        self.cancel_with(CancelReason::Requested);
    }

    /// Requests cancellation with an explicit reason.
    pub fn cancel_with(&self, reason: CancelReason) {
        // Reason is stored before the token fires so observers always find it.
        let _ = self.state.reason.set(reason);
        self.token.cancel();
    }

    /// Returns the deadline, if one was attached.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.state.deadline
    }

    /// Returns `true` once cancellation was requested or the deadline passed.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.reason().is_some()
    }

    /// Returns why the token fired, or `None` while it has not.
    #[must_use]
    pub fn reason(&self) -> Option<CancelReason> {
        if !self.token.is_cancelled()
            && self
                .state
                .deadline
                .is_some_and(|deadline| Instant::now() >= deadline)
        {
            self.cancel_with(CancelReason::DeadlineExceeded);
        }

        self.token.is_cancelled().then(|| {
            self.state
                .reason
                .get()
                .cloned()
                .unwrap_or(CancelReason::Requested)
        })
    }
}
