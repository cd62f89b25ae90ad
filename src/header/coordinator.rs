/// Header coordinator
///
/// Owns what the shared header currently shows. Reacts to
/// [`ApplyViewConfiguration`] requests and answers each valid one with exactly
/// one [`ViewConfigurationApplied`].
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::diagnostics::FailureReport;
use crate::error::{ConfigurationError, DispatchError};
use crate::messaging::{
    ApplyViewConfiguration, EventMediator, Subscription, UiDispatcher, ViewConfigurationApplied,
    HEADER_TARGET,
};
use crate::unit::UnitHandle;

use super::configuration::ViewConfiguration;
use super::labels::{context_label, DEFAULT_CONTEXT_LABEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderPhase {
    Idle,
    /// A request is being processed and its outcome published
    Applying,
}

#[derive(Debug)]
struct HeaderState {
    phase: HeaderPhase,
    displayed_unit: Option<UnitHandle>,
    context_label: String,
    last_configuration: Option<ViewConfiguration>,
}

impl HeaderState {
    fn empty() -> Self {
        Self {
            phase: HeaderPhase::Idle,
            displayed_unit: None,
            context_label: DEFAULT_CONTEXT_LABEL.to_string(),
            last_configuration: None,
        }
    }
}

pub struct HeaderCoordinator {
    state: Mutex<HeaderState>,
    mediator: EventMediator,
    dispatcher: UiDispatcher,
    subscription: Mutex<Option<Subscription>>,
}

impl HeaderCoordinator {
    /// Create a coordinator and subscribe it to apply requests on `mediator`.
    ///
    /// Refreshes of newly shown units are queued on `dispatcher`.
    pub fn attach(mediator: &EventMediator, dispatcher: &UiDispatcher) -> Arc<Self> {
        let coordinator = Arc::new(Self {
            state: Mutex::new(HeaderState::empty()),
            mediator: mediator.clone(),
            dispatcher: dispatcher.clone(),
            subscription: Mutex::new(None),
        });

        let weak = Arc::downgrade(&coordinator);
        let subscription = mediator.subscribe(move |request: &ApplyViewConfiguration| {
            match weak.upgrade() {
                Some(coordinator) => coordinator.handle(request).map(|_| ()).map_err(Into::into),
                None => Ok(()),
            }
        });
        *coordinator.subscription.lock() = Some(subscription);

        coordinator
    }

    /// Process one request and publish its outcome.
    ///
    /// Returns whether the header changed. A request without a configuration
    /// fails before any state is touched and publishes nothing.
    pub fn handle(&self, request: &ApplyViewConfiguration) -> Result<bool, ConfigurationError> {
        let configuration = request.configuration.as_ref().ok_or_else(|| {
            ConfigurationError::Invalid("apply request carries no configuration".to_string())
        })?;

        self.state.lock().phase = HeaderPhase::Applying;

        let was_changed = self.apply(configuration);
        self.mediator.publish(&ViewConfigurationApplied {
            configuration: configuration.clone(),
            target: HEADER_TARGET.to_string(),
            was_changed,
        });

        self.state.lock().phase = HeaderPhase::Idle;
        Ok(was_changed)
    }

    fn apply(&self, configuration: &ViewConfiguration) -> bool {
        let mut state = self.state.lock();

        if state
            .last_configuration
            .as_ref()
            .is_some_and(|last| last.is_same_as(configuration))
        {
            debug!(
                unit = configuration.header_unit().id(),
                "Header already shows this unit"
            );
            return false;
        }

        let unit = configuration.header_unit().clone();
        state.displayed_unit = Some(unit.clone());
        state.context_label = context_label(configuration.section_name());
        state.last_configuration = Some(configuration.clone());

        info!(
            unit = unit.id(),
            label = %state.context_label,
            "Header switched to {}",
            unit.display_name()
        );
        drop(state);

        self.schedule_refresh(unit);
        true
    }

    fn schedule_refresh(&self, unit: UnitHandle) {
        if !unit.is_refreshable() {
            return;
        }

        let sink = self.mediator.sink();
        self.dispatcher.post(move || {
            if let Some(Err(source)) = unit.refresh() {
                let error = DispatchError::RefreshFailed {
                    unit: unit.id().to_string(),
                    source,
                };
                sink.report(FailureReport::new("header refresh", &error));
            }
        });
    }

    /// Forget the current header without publishing anything
    pub fn clear_configuration(&self) {
        let mut state = self.state.lock();
        state.displayed_unit = None;
        state.context_label = DEFAULT_CONTEXT_LABEL.to_string();
        state.last_configuration = None;
        debug!("Header configuration cleared");
    }

    /// Stop listening for apply requests
    pub fn detach(&self) {
        if let Some(subscription) = self.subscription.lock().take() {
            self.mediator.unsubscribe(&subscription);
        }
    }

    pub fn displayed_unit(&self) -> Option<UnitHandle> {
        self.state.lock().displayed_unit.clone()
    }

    pub fn context_label(&self) -> String {
        self.state.lock().context_label.clone()
    }

    pub fn last_configuration(&self) -> Option<ViewConfiguration> {
        self.state.lock().last_configuration.clone()
    }

    pub fn phase(&self) -> HeaderPhase {
        self.state.lock().phase
    }
}

impl Drop for HeaderCoordinator {
    fn drop(&mut self) {
        self.detach();
    }
}
