use tokio::sync::{broadcast, Mutex};
use tracing::{debug, warn};

use crate::error::{ClientError, ErrorKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// View state changed and should be re-rendered.
    Updated,
    /// An operation was rejected or failed; the view state is unchanged.
    Failed {
        operation: &'static str,
        kind: ErrorKind,
        message: String,
    },
}

/// State owned by a mounted page. Once unmounted, results that are still in
/// flight are dropped instead of applied.
pub(crate) struct ViewCell<S> {
    state: Mutex<Option<S>>,
    events: broadcast::Sender<ViewEvent>,
}

impl<S: Clone> ViewCell<S> {
    pub(crate) fn new(state: S) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            state: Mutex::new(Some(state)),
            events,
        }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    pub(crate) async fn snapshot(&self) -> Option<S> {
        self.state.lock().await.clone()
    }

    pub(crate) async fn is_mounted(&self) -> bool {
        self.state.lock().await.is_some()
    }

    pub(crate) async fn unmount(&self) {
        self.state.lock().await.take();
    }

    pub(crate) async fn read<R>(&self, f: impl FnOnce(&S) -> R) -> Option<R> {
        self.state.lock().await.as_ref().map(f)
    }

    /// Like [`Self::read`], but an unmounted page is an `Inactive` failure.
    pub(crate) async fn read_mounted<R>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&S) -> R,
    ) -> Result<R, ClientError> {
        match self.read(f).await {
            Some(value) => Ok(value),
            None => Err(self.fail(
                operation,
                ClientError::Inactive("page is no longer mounted".into()),
            )),
        }
    }

    /// Applies `f` if the page is still mounted. The lock is only held for
    /// the duration of `f`, never across a request.
    pub(crate) async fn update<R>(&self, f: impl FnOnce(&mut S) -> R) -> Option<R> {
        let result = {
            let mut guard = self.state.lock().await;
            guard.as_mut().map(f)
        };
        if result.is_some() {
            let _ = self.events.send(ViewEvent::Updated);
        } else {
            debug!("view unmounted; dropping result");
        }
        result
    }

    pub(crate) fn fail(&self, operation: &'static str, error: ClientError) -> ClientError {
        warn!(operation, %error, "view operation failed");
        let _ = self.events.send(ViewEvent::Failed {
            operation,
            kind: error.kind(),
            message: error.to_string(),
        });
        error
    }
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<(), ClientError> {
    if value.trim().is_empty() {
        return Err(ClientError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}
