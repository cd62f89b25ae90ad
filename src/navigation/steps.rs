/// Navigation step definitions
///
/// A step is one navigable leaf; sections group steps under a heading.
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::unit::UnitHandle;

/// Builds the presentation unit of a step
pub type UnitFactory = Box<dyn Fn() -> UnitHandle + Send + Sync>;

/// Whether selecting a step reuses its first unit or builds a new one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitPolicy {
    #[default]
    Cached,
    Recreate,
}

pub struct StepDescriptor {
    id: String,
    display_name: String,
    factory: UnitFactory,
    cached_unit: OnceLock<UnitHandle>,
    badge: Arc<AtomicUsize>,
}

impl StepDescriptor {
    pub fn new<F>(id: impl Into<String>, display_name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> UnitHandle + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            factory: Box::new(factory),
            cached_unit: OnceLock::new(),
            badge: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Current badge count
    pub fn badge(&self) -> usize {
        self.badge.load(Ordering::Acquire)
    }

    pub(crate) fn badge_cell(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.badge)
    }

    /// Whether the factory has run under [`UnitPolicy::Cached`]
    pub fn is_constructed(&self) -> bool {
        self.cached_unit.get().is_some()
    }

    pub(crate) fn unit(&self, policy: UnitPolicy) -> UnitHandle {
        match policy {
            UnitPolicy::Cached => self.cached_unit.get_or_init(|| (self.factory)()).clone(),
            UnitPolicy::Recreate => (self.factory)(),
        }
    }
}

impl fmt::Debug for StepDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDescriptor")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("badge", &self.badge())
            .field("constructed", &self.is_constructed())
            .finish()
    }
}

/// Named, ordered group of steps
#[derive(Debug)]
pub struct Section {
    name: String,
    steps: Vec<Arc<StepDescriptor>>,
}

impl Section {
    pub(crate) fn new(name: String, steps: Vec<StepDescriptor>) -> Self {
        Self {
            name,
            steps: steps.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[Arc<StepDescriptor>] {
        &self.steps
    }

    pub fn first_step(&self) -> Option<&Arc<StepDescriptor>> {
        self.steps.first()
    }

    pub fn find(&self, id: &str) -> Option<&Arc<StepDescriptor>> {
        self.steps.iter().find(|step| step.id() == id)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::StaticUnit;

    fn counted_step(id: &str, calls: Arc<AtomicUsize>) -> StepDescriptor {
        let unit_id = id.to_string();
        StepDescriptor::new(id, id, move || {
            calls.fetch_add(1, Ordering::SeqCst);
            UnitHandle::new(StaticUnit::new(unit_id.clone(), unit_id.clone()))
        })
    }

    #[test]
    fn test_cached_policy_builds_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let step = counted_step("requirements", Arc::clone(&calls));
        assert!(!step.is_constructed());

        let first = step.unit(UnitPolicy::Cached);
        let second = step.unit(UnitPolicy::Cached);

        assert!(first.same_unit(&second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(step.is_constructed());
    }

    #[test]
    fn test_recreate_policy_builds_every_time() {
        let calls = Arc::new(AtomicUsize::new(0));
        let step = counted_step("report", Arc::clone(&calls));

        let first = step.unit(UnitPolicy::Recreate);
        let second = step.unit(UnitPolicy::Recreate);

        assert!(!first.same_unit(&second));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_section_lookup() {
        let calls = Arc::new(AtomicUsize::new(0));
        let section = Section::new(
            "Repair".to_string(),
            vec![
                counted_step("clarifying", Arc::clone(&calls)),
                counted_step("rewrite", Arc::clone(&calls)),
            ],
        );

        assert_eq!(section.len(), 2);
        assert_eq!(section.first_step().map(|s| s.id()), Some("clarifying"));
        assert!(section.find("rewrite").is_some());
        assert!(section.find("missing").is_none());
    }

    #[test]
    fn test_unit_policy_serialization() {
        let json = serde_json::to_string(&UnitPolicy::Recreate).unwrap();
        assert_eq!(json, "\"recreate\"");
        let policy: UnitPolicy = serde_json::from_str("\"cached\"").unwrap();
        assert_eq!(policy, UnitPolicy::Cached);
    }
}
