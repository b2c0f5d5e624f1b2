use std::fmt::Display;
use std::sync::OnceLock;

use tokio_util::sync::CancellationToken;

/// Cancellation scope that remembers the first failure reported into it.
///
/// Derived from the caller's root token, so cancelling the root also ends the
/// scope (without a recorded cause).
#[derive(Debug)]
pub(crate) struct FailureScope {
    token: CancellationToken,
    cause: OnceLock<String>,
}

impl FailureScope {
    pub(crate) fn new(root: &CancellationToken) -> Self {
        Self {
            token: root.child_token(),
            cause: OnceLock::new(),
        }
    }

    /// Records `cause` if no failure was recorded yet and cancels the scope.
    /// Returns true when this call's cause was the one retained.
    pub(crate) fn fail(&self, cause: impl Display) -> bool {
        let retained = self.cause.set(cause.to_string()).is_ok();
        self.token.cancel();
        retained
    }

    pub(crate) fn cause(&self) -> Option<&str> {
        self.cause.get().map(String::as_str)
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub(crate) async fn cancelled(&self) {
        self.token.cancelled().await
    }
}
