use parking_lot::RwLock;
/// Event mediator for typed pub/sub messaging
///
/// Handlers run synchronously on the publishing thread, in registration order.
/// Each publish works on a snapshot of the subscriber list, so handlers added
/// while a publish is in flight only see later events.
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::diagnostics::{tracing_sink, FailureReport, SharedErrorSink};
use crate::error::DispatchError;

/// Payload type that can travel over the mediator.
///
/// The event kind is the payload's Rust type; `NAME` is only used for logs
/// and failure reports.
pub trait Event: Any + Send + Sync {
    const NAME: &'static str;
}

/// Subscription ID for tracking registrations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Handle returned by [`EventMediator::subscribe`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    id: SubscriptionId,
    kind: TypeId,
    event: &'static str,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn event_name(&self) -> &'static str {
        self.event
    }
}

type ErasedHandler = dyn Fn(&dyn Any) -> anyhow::Result<()> + Send + Sync;

struct Registration {
    id: SubscriptionId,
    live: AtomicBool,
    handler: Box<ErasedHandler>,
}

/// Outcome of a single publish
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Handlers that returned `Ok`
    pub delivered: usize,
    /// Handlers that returned `Err` or panicked
    pub failed: usize,
    /// Handlers in the snapshot that were unsubscribed before their turn
    pub skipped: usize,
}

struct MediatorInner {
    subscribers: RwLock<HashMap<TypeId, Vec<Arc<Registration>>>>,
    next_id: AtomicU64,
    sink: SharedErrorSink,
}

/// Mediator shared by every component of one session.
///
/// Cloning yields another handle to the same subscriber table.
#[derive(Clone)]
pub struct EventMediator {
    inner: Arc<MediatorInner>,
}

impl EventMediator {
    /// Create a mediator that reports handler failures through `tracing`
    pub fn new() -> Self {
        Self::with_sink(tracing_sink())
    }

    /// Create a mediator reporting handler failures to `sink`
    pub fn with_sink(sink: SharedErrorSink) -> Self {
        Self {
            inner: Arc::new(MediatorInner {
                subscribers: RwLock::new(HashMap::new()),
                next_id: AtomicU64::new(0),
                sink,
            }),
        }
    }

    /// Observability collaborator used for isolated failures
    pub fn sink(&self) -> SharedErrorSink {
        Arc::clone(&self.inner.sink)
    }

    /// Register a handler for every future publish of `E`
    pub fn subscribe<E, F>(&self, handler: F) -> Subscription
    where
        E: Event,
        F: Fn(&E) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));

        let erased = move |payload: &dyn Any| match payload.downcast_ref::<E>() {
            Some(event) => handler(event),
            None => Ok(()),
        };

        let registration = Arc::new(Registration {
            id,
            live: AtomicBool::new(true),
            handler: Box::new(erased),
        });

        self.inner
            .subscribers
            .write()
            .entry(TypeId::of::<E>())
            .or_default()
            .push(registration);

        tracing::debug!(event = E::NAME, subscription = id.0, "Subscribed");

        Subscription {
            id,
            kind: TypeId::of::<E>(),
            event: E::NAME,
        }
    }

    /// Register a handler that cannot fail
    pub fn listen<E, F>(&self, handler: F) -> Subscription
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.subscribe(move |event: &E| {
            handler(event);
            Ok(())
        })
    }

    /// Remove one registration. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        let mut subscribers = self.inner.subscribers.write();
        let Some(list) = subscribers.get_mut(&subscription.kind) else {
            return false;
        };

        let Some(pos) = list.iter().position(|r| r.id == subscription.id) else {
            return false;
        };

        let registration = list.remove(pos);
        // A publish may still hold this registration in its snapshot.
        registration.live.store(false, Ordering::Release);

        if list.is_empty() {
            subscribers.remove(&subscription.kind);
        }

        tracing::debug!(
            event = subscription.event,
            subscription = subscription.id.0,
            "Unsubscribed"
        );
        true
    }

    /// Publish an event to every handler currently registered for `E`
    pub fn publish<E: Event>(&self, event: &E) -> DispatchSummary {
        let snapshot: Vec<Arc<Registration>> = self
            .inner
            .subscribers
            .read()
            .get(&TypeId::of::<E>())
            .cloned()
            .unwrap_or_default();

        let mut summary = DispatchSummary::default();

        for registration in snapshot {
            if !registration.live.load(Ordering::Acquire) {
                summary.skipped += 1;
                continue;
            }

            let payload: &dyn Any = event;
            let outcome = catch_unwind(AssertUnwindSafe(|| (registration.handler)(payload)));

            match outcome {
                Ok(Ok(())) => summary.delivered += 1,
                Ok(Err(source)) => {
                    summary.failed += 1;
                    self.report(DispatchError::HandlerFailed {
                        event: E::NAME,
                        source,
                    });
                }
                Err(panic_err) => {
                    summary.failed += 1;
                    let message = if let Some(s) = panic_err.downcast_ref::<&str>() {
                        s.to_string()
                    } else if let Some(s) = panic_err.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "handler panicked with unknown payload".to_string()
                    };
                    self.report(DispatchError::HandlerPanicked {
                        event: E::NAME,
                        message,
                    });
                }
            }
        }

        tracing::trace!(
            event = E::NAME,
            delivered = summary.delivered,
            failed = summary.failed,
            skipped = summary.skipped,
            "Published"
        );

        summary
    }

    /// Number of handlers registered for `E`
    pub fn subscriber_count<E: Event>(&self) -> usize {
        self.inner
            .subscribers
            .read()
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }

    /// Number of handlers across all event kinds
    pub fn total_subscribers(&self) -> usize {
        self.inner.subscribers.read().values().map(Vec::len).sum()
    }

    /// Drop every registration
    pub fn clear(&self) {
        let mut subscribers = self.inner.subscribers.write();
        for registration in subscribers.values().flatten() {
            registration.live.store(false, Ordering::Release);
        }
        subscribers.clear();
    }

    fn report(&self, error: DispatchError) {
        self.inner
            .sink
            .report(FailureReport::new("event dispatch", &error));
    }
}

impl Default for EventMediator {
    fn default() -> Self {
        Self::new()
    }
}
