/// Connection status broadcasting
///
/// Connection state comes from background work (sign-in, API polling).
/// [`StatusReporter`] is the handle that work holds: it publishes directly when
/// already on the UI thread and otherwise hands the publish to the
/// [`UiDispatcher`].
use std::sync::Arc;

use parking_lot::Mutex;

use crate::messaging::{
    ConnectionStatus, ConnectionStatusChanged, EventMediator, Subscription, UiDispatcher,
};

#[derive(Clone)]
pub struct StatusReporter {
    mediator: EventMediator,
    dispatcher: UiDispatcher,
}

impl StatusReporter {
    pub fn new(mediator: &EventMediator, dispatcher: &UiDispatcher) -> Self {
        Self {
            mediator: mediator.clone(),
            dispatcher: dispatcher.clone(),
        }
    }

    /// Broadcast a status change from any thread
    pub fn report(&self, status: ConnectionStatus, detail: Option<String>) {
        let event = ConnectionStatusChanged { status, detail };
        tracing::debug!("Connection status: {}", event.description());

        let mediator = self.mediator.clone();
        self.dispatcher.run_or_post(move || {
            mediator.publish(&event);
        });
    }
}

/// Latest connection status, kept current by a mediator subscription
pub struct StatusTracker {
    current: Arc<Mutex<ConnectionStatusChanged>>,
    mediator: EventMediator,
    subscription: Subscription,
}

impl StatusTracker {
    pub fn attach(mediator: &EventMediator) -> Self {
        let current = Arc::new(Mutex::new(ConnectionStatusChanged {
            status: ConnectionStatus::Disconnected,
            detail: None,
        }));

        let latest = Arc::clone(&current);
        let subscription = mediator.listen(move |event: &ConnectionStatusChanged| {
            *latest.lock() = event.clone();
        });

        Self {
            current,
            mediator: mediator.clone(),
            subscription,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.current.lock().status
    }

    pub fn description(&self) -> String {
        self.current.lock().description()
    }
}

impl Drop for StatusTracker {
    fn drop(&mut self) {
        self.mediator.unsubscribe(&self.subscription);
    }
}
