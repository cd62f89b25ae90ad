/// Navigation state
///
/// `active_unit` is set iff `selected_step_id` is set; both only change
/// together through the registry.
use crate::unit::UnitHandle;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    selected_step_id: Option<String>,
    active_unit: Option<UnitHandle>,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_step_id(&self) -> Option<&str> {
        self.selected_step_id.as_deref()
    }

    pub fn active_unit(&self) -> Option<&UnitHandle> {
        self.active_unit.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.selected_step_id.is_none()
    }

    pub(crate) fn set(&mut self, step_id: String, unit: UnitHandle) {
        self.selected_step_id = Some(step_id);
        self.active_unit = Some(unit);
    }

    pub(crate) fn clear(&mut self) {
        self.selected_step_id = None;
        self.active_unit = None;
    }
}
