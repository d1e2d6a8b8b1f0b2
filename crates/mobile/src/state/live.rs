use std::sync::Mutex;

use orecart_core::feed::Feed;
use orecart_core::subscription::Subscription;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::state::records::{ArrivalState, VanLocationsState};

#[uniffi::export(with_foreign)]
pub trait ArrivalObserver: Send + Sync {
    fn on_update(&self, state: ArrivalState);
}

#[uniffi::export(with_foreign)]
pub trait VanLocationsObserver: Send + Sync {
    fn on_update(&self, state: VanLocationsState);
}

/// A running feed subscription forwarding into a foreign observer.
///
/// Cancelling, or letting the foreign side release the object, unsubscribes.
#[derive(uniffi::Object)]
pub struct LiveSubscription {
    task: Mutex<Option<JoinHandle<()>>>,
}

impl LiveSubscription {
    /// Push the current state and then every change to `deliver` until cancelled.
    pub(crate) fn forward<F, D>(runtime: &Handle, mut subscription: Subscription<F>, deliver: D) -> Self
    where
        F: Feed,
        D: Fn(orecart_core::Query<F::Value>) + Send + 'static,
    {
        let task = runtime.spawn(async move {
            deliver(subscription.current());

            // Ends when the feed task shuts down; dropping the subscription unsubscribes
            while let Ok(query) = subscription.changed().await {
                deliver(query);
            }
            debug!(feed = F::NAME, handle = %subscription.handle(), "live subscription ended");
        });

        Self {
            task: Mutex::new(Some(task)),
        }
    }
}

#[uniffi::export]
impl LiveSubscription {
    pub fn cancel(&self) {
        let task = match self.task.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        if let Some(task) = task {
            task.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        match self.task.lock() {
            Ok(guard) => guard.as_ref().is_some_and(|task| !task.is_finished()),
            Err(_) => false,
        }
    }
}

impl Drop for LiveSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
