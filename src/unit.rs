/// Presentation units
///
/// A presentation unit is the state object behind one workspace. The core only
/// needs its identity, a display name, and optionally a refresh capability.
use std::fmt;
use std::sync::Arc;

/// Optional capability: a unit that can reload its own contents.
pub trait Refreshable: Send + Sync {
    fn refresh(&self) -> anyhow::Result<()>;
}

/// Object bound to one visual workspace.
pub trait PresentationUnit: Send + Sync {
    /// Stable identifier, used for logging only; identity comparison goes
    /// through [`UnitHandle::same_unit`].
    fn id(&self) -> &str;

    fn display_name(&self) -> &str;

    /// Expose the refresh capability, if any
    fn as_refreshable(&self) -> Option<&dyn Refreshable> {
        None
    }
}

/// Shared reference to a presentation unit.
///
/// Equality is identity of the underlying allocation, never structural.
#[derive(Clone)]
pub struct UnitHandle(Arc<dyn PresentationUnit>);

impl UnitHandle {
    pub fn new<U: PresentationUnit + 'static>(unit: U) -> Self {
        Self(Arc::new(unit))
    }

    pub fn from_arc(unit: Arc<dyn PresentationUnit>) -> Self {
        Self(unit)
    }

    /// True when both handles point at the same unit instance
    pub fn same_unit(&self, other: &UnitHandle) -> bool {
        // Compare data addresses only; vtable pointers may differ per codegen unit.
        std::ptr::eq(
            Arc::as_ptr(&self.0) as *const (),
            Arc::as_ptr(&other.0) as *const (),
        )
    }

    pub fn id(&self) -> &str {
        self.0.id()
    }

    pub fn display_name(&self) -> &str {
        self.0.display_name()
    }

    pub fn is_refreshable(&self) -> bool {
        self.0.as_refreshable().is_some()
    }

    /// Run the unit's refresh if it has one. `None` means no capability.
    pub fn refresh(&self) -> Option<anyhow::Result<()>> {
        self.0.as_refreshable().map(|unit| unit.refresh())
    }

    pub fn as_unit(&self) -> &dyn PresentationUnit {
        self.0.as_ref()
    }
}

impl PartialEq for UnitHandle {
    fn eq(&self, other: &Self) -> bool {
        self.same_unit(other)
    }
}

impl Eq for UnitHandle {}

impl fmt::Debug for UnitHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitHandle")
            .field("id", &self.id())
            .field("addr", &(Arc::as_ptr(&self.0) as *const ()))
            .finish()
    }
}

/// Plain unit with no behaviour besides its name
#[derive(Debug, Clone)]
pub struct StaticUnit {
    id: String,
    display_name: String,
}

impl StaticUnit {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

impl PresentationUnit for StaticUnit {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }
}
