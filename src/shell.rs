/// Workbench shell
///
/// Owns one session's mediator, dispatcher, header and step registry, and
/// wires step selection to the header: selecting a step publishes
/// [`ApplyViewConfiguration`] for the step's unit under its section name.
use std::sync::Arc;

use crate::config::ShellConfig;
use crate::diagnostics::SharedErrorSink;
use crate::error::{NavigationError, PersistenceError};
use crate::header::{HeaderCoordinator, ViewConfiguration};
use crate::messaging::{
    ApplyViewConfiguration, DispatchSummary, EventMediator, StepSelected, Subscription,
    UiDispatcher,
};
use crate::navigation::{StepDescriptor, StepRegistry};
use crate::persistence::{JsonFileStore, SharedSettingsStore};
use crate::status::StatusReporter;
use crate::unit::UnitHandle;

pub struct Shell {
    mediator: EventMediator,
    dispatcher: UiDispatcher,
    header: Arc<HeaderCoordinator>,
    registry: StepRegistry,
    selection_wiring: Subscription,
}

impl Shell {
    /// Build a shell on the calling thread, which becomes the UI thread
    pub fn new(config: &ShellConfig, store: SharedSettingsStore, sink: SharedErrorSink) -> Self {
        let mediator = EventMediator::with_sink(sink);
        let dispatcher = UiDispatcher::new();
        let header = HeaderCoordinator::attach(&mediator, &dispatcher);

        let mut registry = StepRegistry::new(store)
            .with_mediator(&mediator)
            .with_unit_policy(config.unit_policy);
        if let Some(section) = &config.default_section {
            registry = registry.with_default_section(section.clone());
        }

        let publisher = mediator.clone();
        let selection_wiring = mediator.listen(move |selected: &StepSelected| {
            let configuration =
                ViewConfiguration::new(selected.section.clone(), selected.unit.clone());
            publisher.publish(&ApplyViewConfiguration::new(configuration));
        });

        Self {
            mediator,
            dispatcher,
            header,
            registry,
            selection_wiring,
        }
    }

    pub fn register_section(
        &mut self,
        name: impl Into<String>,
        steps: Vec<StepDescriptor>,
    ) -> Result<(), NavigationError> {
        self.registry.register_section(name, steps)
    }

    /// Restore the last selection; call after every section is registered
    pub fn restore(&mut self) -> Option<String> {
        self.registry.restore_selection()
    }

    pub fn select(&mut self, id: &str) -> Result<UnitHandle, NavigationError> {
        self.registry.select(id)
    }

    /// Ask the header to show `configuration`
    pub fn apply(&self, configuration: ViewConfiguration) -> DispatchSummary {
        self.mediator
            .publish(&ApplyViewConfiguration::new(configuration))
    }

    /// Run work queued for the UI thread (refreshes, off-thread notifications)
    pub fn pump(&self) -> usize {
        self.dispatcher.drain()
    }

    pub fn status_reporter(&self) -> StatusReporter {
        StatusReporter::new(&self.mediator, &self.dispatcher)
    }

    pub fn mediator(&self) -> &EventMediator {
        &self.mediator
    }

    pub fn dispatcher(&self) -> &UiDispatcher {
        &self.dispatcher
    }

    pub fn header(&self) -> &HeaderCoordinator {
        &self.header
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut StepRegistry {
        &mut self.registry
    }
}

impl Drop for Shell {
    fn drop(&mut self) {
        self.mediator.unsubscribe(&self.selection_wiring);
    }
}

/// Open the settings store named by `config`, or the platform default
pub fn open_settings_store(config: &ShellConfig) -> Result<SharedSettingsStore, PersistenceError> {
    let store = match &config.settings_file {
        Some(path) => JsonFileStore::open(path.clone())?,
        None => JsonFileStore::open_default()?,
    };
    tracing::debug!("Using settings store at {}", store.path().display());
    Ok(Arc::new(store))
}
