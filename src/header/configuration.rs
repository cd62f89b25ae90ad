/// View configuration
///
/// Immutable description of what the shared header area should show.
use crate::unit::UnitHandle;

#[derive(Debug, Clone)]
pub struct ViewConfiguration {
    section_name: Option<String>,
    header_unit: UnitHandle,
}

impl ViewConfiguration {
    pub fn new(section_name: impl Into<String>, header_unit: UnitHandle) -> Self {
        Self {
            section_name: Some(section_name.into()),
            header_unit,
        }
    }

    /// Configuration with no section; the header falls back to its default label
    pub fn unsectioned(header_unit: UnitHandle) -> Self {
        Self {
            section_name: None,
            header_unit,
        }
    }

    pub fn section_name(&self) -> Option<&str> {
        self.section_name.as_deref()
    }

    pub fn header_unit(&self) -> &UnitHandle {
        &self.header_unit
    }

    /// Two configurations are the same iff they point at the same unit instance.
    /// Section names are ignored.
    pub fn is_same_as(&self, other: &ViewConfiguration) -> bool {
        self.header_unit.same_unit(&other.header_unit)
    }
}
