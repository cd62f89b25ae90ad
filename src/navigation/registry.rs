/// Step registry
///
/// Owns the navigable sections and the current [`NavigationState`]. Selection
/// persists the chosen step id so the next session can restore it.
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::diagnostics::{tracing_sink, FailureReport, SharedErrorSink};
use crate::error::NavigationError;
use crate::messaging::{EventMediator, StepSelected};
use crate::persistence::{SettingsStoreExt, SharedSettingsStore, LAST_SELECTED_STEP_KEY};
use crate::unit::UnitHandle;

use super::collection::{BadgeBinding, ObservableCollection};
use super::state::NavigationState;
use super::steps::{Section, StepDescriptor, UnitPolicy};

pub struct StepRegistry {
    sections: Vec<Section>,
    state: NavigationState,
    store: SharedSettingsStore,
    sink: SharedErrorSink,
    mediator: Option<EventMediator>,
    default_section: Option<String>,
    unit_policy: UnitPolicy,
    /// At most one live binding per step id
    badge_bindings: Mutex<HashMap<String, BadgeBinding>>,
}

impl StepRegistry {
    /// Create an empty registry persisting selections to `store`
    pub fn new(store: SharedSettingsStore) -> Self {
        Self {
            sections: Vec::new(),
            state: NavigationState::new(),
            store,
            sink: tracing_sink(),
            mediator: None,
            default_section: None,
            unit_policy: UnitPolicy::default(),
            badge_bindings: Mutex::new(HashMap::new()),
        }
    }

    /// Publish [`StepSelected`] on `mediator` and report failures to its sink
    pub fn with_mediator(mut self, mediator: &EventMediator) -> Self {
        self.sink = mediator.sink();
        self.mediator = Some(mediator.clone());
        self
    }

    pub fn with_sink(mut self, sink: SharedErrorSink) -> Self {
        self.sink = sink;
        self
    }

    /// Section whose first step is selected when nothing was persisted
    pub fn with_default_section(mut self, name: impl Into<String>) -> Self {
        self.default_section = Some(name.into());
        self
    }

    pub fn with_unit_policy(mut self, policy: UnitPolicy) -> Self {
        self.unit_policy = policy;
        self
    }

    /// Append a named section.
    ///
    /// Fails without changing anything if a step id is already registered or
    /// repeats inside `steps`.
    pub fn register_section(
        &mut self,
        name: impl Into<String>,
        steps: Vec<StepDescriptor>,
    ) -> Result<(), NavigationError> {
        let name = name.into();
        let mut seen = HashSet::new();

        for step in &steps {
            if self.find_step(step.id()).is_some() || !seen.insert(step.id()) {
                return Err(NavigationError::DuplicateStepId {
                    id: step.id().to_string(),
                    section: name,
                });
            }
        }

        debug!(section = %name, steps = steps.len(), "Registered section");
        self.sections.push(Section::new(name, steps));
        Ok(())
    }

    /// Look up a step across all sections in registration order
    pub fn find_step(&self, id: &str) -> Option<&Arc<StepDescriptor>> {
        self.sections.iter().find_map(|section| section.find(id))
    }

    /// Section that contains `id`
    pub fn section_of(&self, id: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|section| section.find(id).is_some())
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// All steps, section by section
    pub fn steps(&self) -> impl Iterator<Item = &Arc<StepDescriptor>> {
        self.sections.iter().flat_map(|section| section.steps().iter())
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn default_section(&self) -> Option<&str> {
        self.default_section.as_deref()
    }

    /// Make `id` the active step.
    ///
    /// An unknown id leaves the state untouched. A failed persistence write is
    /// reported but the in-memory selection stands.
    pub fn select(&mut self, id: &str) -> Result<UnitHandle, NavigationError> {
        let (step, section) = self
            .sections
            .iter()
            .find_map(|section| section.find(id).map(|step| (Arc::clone(step), section.name())))
            .ok_or_else(|| NavigationError::UnknownStepId(id.to_string()))?;
        let section = section.to_string();

        let unit = step.unit(self.unit_policy);
        let previous = self.state.selected_step_id().map(str::to_string);
        self.state.set(step.id().to_string(), unit.clone());

        info!(step = id, section = %section, "Selected {}", step.display_name());

        if let Err(err) = self.store.save(LAST_SELECTED_STEP_KEY, &id.to_string()) {
            warn!("Failed to persist selected step '{}': {}", id, err);
            self.sink
                .report(FailureReport::new("persist selected step", &err));
        }

        if let Some(mediator) = &self.mediator {
            mediator.publish(&StepSelected {
                step_id: id.to_string(),
                section,
                previous,
                unit: unit.clone(),
            });
        }

        Ok(unit)
    }

    /// Restore the last session's selection.
    ///
    /// Call once, after every section is registered. Falls back to the first
    /// step of the default section; with neither, nothing is selected.
    /// Returns the selected step id.
    pub fn restore_selection(&mut self) -> Option<String> {
        if self.sections.is_empty() {
            warn!("Restoring selection before any section was registered");
        }

        let persisted = match self.store.load::<String>(LAST_SELECTED_STEP_KEY) {
            Ok(value) => value,
            Err(err) => {
                warn!("Failed to load selected step: {}", err);
                self.sink.report(FailureReport::new("load selected step", &err));
                None
            }
        };

        if let Some(id) = persisted {
            if self.find_step(&id).is_some() {
                return self.select(&id).ok().map(|_| id);
            }
            debug!(step = %id, "Persisted step is no longer registered");
        }

        let fallback = self
            .default_section
            .as_deref()
            .and_then(|name| self.sections.iter().find(|s| s.name() == name))
            .and_then(Section::first_step)
            .map(|step| step.id().to_string());

        match fallback {
            Some(id) => self.select(&id).ok().map(|_| id),
            None => {
                debug!("No step to restore");
                None
            }
        }
    }

    /// Drop the active selection. The persisted id is left alone.
    pub fn clear_selection(&mut self) {
        self.state.clear();
    }

    /// Mirror `collection`'s size into the badge of `step_id`.
    ///
    /// Replaces any collection the step was already bound to.
    pub fn bind_badge<C>(&self, step_id: &str, collection: &C) -> Result<(), NavigationError>
    where
        C: ObservableCollection + Clone + 'static,
    {
        let step = self
            .find_step(step_id)
            .ok_or_else(|| NavigationError::UnknownStepId(step_id.to_string()))?;

        let mut bindings = self.badge_bindings.lock();
        // Detach the old collection before the new one seeds the badge.
        if bindings.remove(step_id).is_some() {
            debug!(step = step_id, "Rebinding badge");
        }
        let binding =
            BadgeBinding::attach(step_id, step.badge_cell(), Arc::new(collection.clone()));
        bindings.insert(step_id.to_string(), binding);
        Ok(())
    }

    /// Stop mirroring into the badge of `step_id`; the badge keeps its value
    pub fn unbind_badge(&self, step_id: &str) -> bool {
        self.badge_bindings.lock().remove(step_id).is_some()
    }

    /// Current badge of `step_id`
    pub fn badge(&self, step_id: &str) -> Option<usize> {
        self.find_step(step_id).map(|step| step.badge())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::RecordingErrorSink;
    use crate::error::PersistenceError;
    use crate::navigation::ObservableVec;
    use crate::persistence::{MemoryStore, SettingsStore};
    use crate::unit::StaticUnit;
    use serde_json::Value;

    fn step(id: &str) -> StepDescriptor {
        let unit_id = id.to_string();
        StepDescriptor::new(id, id, move || {
            UnitHandle::new(StaticUnit::new(unit_id.clone(), unit_id.clone()))
        })
    }

    fn registry_with(store: MemoryStore) -> StepRegistry {
        let mut registry = StepRegistry::new(Arc::new(store)).with_default_section("Primary Workflow");
        registry
            .register_section(
                "Primary Workflow",
                vec![step("requirements"), step("clarifying"), step("review")],
            )
            .unwrap();
        registry
            .register_section("Repair", vec![step("repair"), step("rewrite")])
            .unwrap();
        registry
    }

    struct FailingStore;

    impl SettingsStore for FailingStore {
        fn load_value(&self, _key: &str) -> Result<Option<Value>, PersistenceError> {
            Err(PersistenceError::NoConfigDir)
        }

        fn save_value(&self, _key: &str, _value: Value) -> Result<(), PersistenceError> {
            Err(PersistenceError::NoConfigDir)
        }

        fn remove(&self, _key: &str) -> Result<(), PersistenceError> {
            Ok(())
        }
    }

    #[test]
    fn test_find_step_across_sections() {
        let registry = registry_with(MemoryStore::new());
        assert_eq!(registry.find_step("rewrite").map(|s| s.id()), Some("rewrite"));
        assert_eq!(registry.section_of("rewrite").map(Section::name), Some("Repair"));
        assert!(registry.find_step("nonexistent").is_none());
        assert_eq!(registry.steps().count(), 5);
    }

    #[test]
    fn test_duplicate_id_rejected_and_prior_sections_intact() {
        let mut registry = registry_with(MemoryStore::new());

        let err = registry
            .register_section("Reports", vec![step("summary"), step("clarifying")])
            .unwrap_err();
        assert_eq!(
            err,
            NavigationError::DuplicateStepId {
                id: "clarifying".to_string(),
                section: "Reports".to_string(),
            }
        );
        assert_eq!(registry.sections().len(), 2);
        assert!(registry.find_step("summary").is_none());
    }

    #[test]
    fn test_duplicate_inside_one_section_rejected() {
        let mut registry = StepRegistry::new(Arc::new(MemoryStore::new()));
        let err = registry
            .register_section("General", vec![step("settings"), step("settings")])
            .unwrap_err();
        assert!(matches!(err, NavigationError::DuplicateStepId { .. }));
        assert!(registry.sections().is_empty());
    }

    #[test]
    fn test_select_sets_state_and_persists() {
        let store = MemoryStore::new();
        let mut registry = registry_with(store.clone());

        let unit = registry.select("review").unwrap();
        assert_eq!(registry.state().selected_step_id(), Some("review"));
        assert!(registry.state().active_unit().unwrap().same_unit(&unit));
        assert_eq!(
            store.load::<String>(LAST_SELECTED_STEP_KEY).unwrap(),
            Some("review".to_string())
        );
    }

    #[test]
    fn test_select_reuses_unit() {
        let mut registry = registry_with(MemoryStore::new());
        let first = registry.select("repair").unwrap();
        registry.select("review").unwrap();
        let again = registry.select("repair").unwrap();
        assert!(first.same_unit(&again));
    }

    #[test]
    fn test_recreate_policy_builds_fresh_unit() {
        let mut registry = registry_with(MemoryStore::new()).with_unit_policy(UnitPolicy::Recreate);
        let first = registry.select("repair").unwrap();
        let again = registry.select("repair").unwrap();
        assert!(!first.same_unit(&again));
    }

    #[test]
    fn test_unknown_selection_keeps_state() {
        let mut registry = registry_with(MemoryStore::new());
        registry.select("clarifying").unwrap();
        let before = registry.state().clone();

        let err = registry.select("nonexistent").unwrap_err();
        assert_eq!(err, NavigationError::UnknownStepId("nonexistent".to_string()));
        assert_eq!(registry.state(), &before);
    }

    #[test]
    fn test_persistence_failure_reported_not_rolled_back() {
        let sink = RecordingErrorSink::new();
        let mut registry =
            StepRegistry::new(Arc::new(FailingStore)).with_sink(Arc::new(sink.clone()));
        registry
            .register_section("General", vec![step("settings")])
            .unwrap();

        assert!(registry.select("settings").is_ok());
        assert_eq!(registry.state().selected_step_id(), Some("settings"));
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.reports()[0].context, "persist selected step");
    }

    #[test]
    fn test_restore_persisted_selection() {
        let store = MemoryStore::new();
        store
            .save(LAST_SELECTED_STEP_KEY, &"clarifying".to_string())
            .unwrap();

        let mut registry = registry_with(store);
        assert_eq!(registry.restore_selection(), Some("clarifying".to_string()));
        assert_eq!(registry.state().selected_step_id(), Some("clarifying"));
    }

    #[test]
    fn test_restore_falls_back_to_default_section() {
        let mut registry = registry_with(MemoryStore::new());
        assert_eq!(registry.restore_selection(), Some("requirements".to_string()));
    }

    #[test]
    fn test_restore_ignores_stale_persisted_id() {
        let store = MemoryStore::new();
        store
            .save(LAST_SELECTED_STEP_KEY, &"retired-step".to_string())
            .unwrap();

        let mut registry = registry_with(store);
        assert_eq!(registry.restore_selection(), Some("requirements".to_string()));
    }

    #[test]
    fn test_restore_without_default_leaves_state_empty() {
        let mut registry = StepRegistry::new(Arc::new(MemoryStore::new()));
        registry
            .register_section("Reports", vec![step("summary")])
            .unwrap();

        assert_eq!(registry.restore_selection(), None);
        assert!(registry.state().is_empty());
    }

    #[test]
    fn test_restore_load_failure_falls_back() {
        let sink = RecordingErrorSink::new();
        let mut registry = StepRegistry::new(Arc::new(FailingStore))
            .with_sink(Arc::new(sink.clone()))
            .with_default_section("General");
        registry
            .register_section("General", vec![step("settings")])
            .unwrap();

        assert_eq!(registry.restore_selection(), Some("settings".to_string()));
        // One report for the load, one for re-persisting the fallback.
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_select_publishes_step_selected() {
        let mediator = EventMediator::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        mediator.listen(move |event: &StepSelected| {
            log.lock()
                .push((event.step_id.clone(), event.section.clone(), event.previous.clone()));
        });

        let mut registry = registry_with(MemoryStore::new()).with_mediator(&mediator);
        registry.select("requirements").unwrap();
        registry.select("repair").unwrap();

        assert_eq!(
            *seen.lock(),
            vec![
                ("requirements".to_string(), "Primary Workflow".to_string(), None),
                (
                    "repair".to_string(),
                    "Repair".to_string(),
                    Some("requirements".to_string())
                ),
            ]
        );
    }

    #[test]
    fn test_badge_mirrors_collection_size() {
        let registry = registry_with(MemoryStore::new());
        let questions = ObservableVec::from_vec(vec!["scope?", "owner?"]);

        registry.bind_badge("clarifying", &questions).unwrap();
        assert_eq!(registry.badge("clarifying"), Some(2));

        questions.push("deadline?");
        assert_eq!(registry.badge("clarifying"), Some(3));
    }

    #[test]
    fn test_rebinding_badge_detaches_previous_collection() {
        let registry = registry_with(MemoryStore::new());
        let old = ObservableVec::from_vec(vec![1, 2]);
        let new = ObservableVec::from_vec(vec![1, 2, 3, 4, 5]);

        registry.bind_badge("clarifying", &old).unwrap();
        registry.bind_badge("clarifying", &new).unwrap();
        assert_eq!(old.observer_count(), 0);
        assert_eq!(new.observer_count(), 1);
        assert_eq!(registry.badge("clarifying"), Some(5));

        old.push(3);
        assert_eq!(registry.badge("clarifying"), Some(5));
    }

    #[test]
    fn test_unbind_badge_keeps_last_value() {
        let registry = registry_with(MemoryStore::new());
        let questions = ObservableVec::from_vec(vec!["scope?"]);
        registry.bind_badge("clarifying", &questions).unwrap();

        assert!(registry.unbind_badge("clarifying"));
        assert!(!registry.unbind_badge("clarifying"));
        assert_eq!(questions.observer_count(), 0);

        questions.push("owner?");
        assert_eq!(registry.badge("clarifying"), Some(1));
    }

    #[test]
    fn test_dropping_registry_releases_collections() {
        let registry = registry_with(MemoryStore::new());
        let questions: ObservableVec<&str> = ObservableVec::new();
        registry.bind_badge("clarifying", &questions).unwrap();
        assert_eq!(questions.observer_count(), 1);

        drop(registry);
        assert_eq!(questions.observer_count(), 0);
    }

    #[test]
    fn test_bind_badge_unknown_step() {
        let registry = registry_with(MemoryStore::new());
        let items: ObservableVec<u8> = ObservableVec::new();
        assert!(matches!(
            registry.bind_badge("nonexistent", &items),
            Err(NavigationError::UnknownStepId(_))
        ));
    }

    #[test]
    fn test_clear_selection() {
        let mut registry = registry_with(MemoryStore::new());
        registry.select("review").unwrap();
        registry.clear_selection();
        assert!(registry.state().is_empty());
    }
}
