// ABOUTME: Defines PermissionQuery - a live, re-evaluating permission check.
// ABOUTME: Exposes pending/resolved state over a watch channel and as a stream.

use futures::Stream;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// State of a live permission query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState {
    /// The check has not settled yet.
    Pending,
    /// The engine answered.
    Resolved(bool),
    /// The check failed; the message comes from the underlying error.
    Failed(String),
}

impl QueryState {
    pub fn is_pending(&self) -> bool {
        matches!(self, QueryState::Pending)
    }

    /// Fail-closed view of the state: only a resolved grant is `true`.
    pub fn allowed(&self) -> bool {
        matches!(self, QueryState::Resolved(true))
    }
}

/// A permission check that re-runs whenever its provider's engine changes.
///
/// Dropping the query stops its background task.
#[derive(Debug)]
pub struct PermissionQuery {
    pub(crate) state: watch::Receiver<QueryState>,
    pub(crate) task: JoinHandle<()>,
}

impl PermissionQuery {
    /// Current state, settled or not.
    pub fn state(&self) -> QueryState {
        self.state.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        self.state.borrow().is_pending()
    }

    /// Whether the action is currently allowed. `false` while pending.
    pub fn allowed(&self) -> bool {
        self.state.borrow().allowed()
    }

    /// Wait until the query settles and return that state.
    pub async fn wait(&mut self) -> QueryState {
        let settled = self
            .state
            .wait_for(|state| !state.is_pending())
            .await
            .map(|state| state.clone());
        settled.unwrap_or_else(|_| self.state())
    }

    /// Stream of settled states, starting with the current one if settled.
    pub fn states(&self) -> impl Stream<Item = QueryState> + use<> {
        let mut rx = self.state.clone();
        async_stream::stream! {
            loop {
                let state = rx.borrow_and_update().clone();
                if !state.is_pending() {
                    yield state;
                }
                if rx.changed().await.is_err() {
                    break;
                }
            }
        }
    }
}

impl Drop for PermissionQuery {
    fn drop(&mut self) {
        self.task.abort();
    }
}
