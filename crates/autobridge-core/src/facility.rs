//! Capability interface of the host's dynamic-dispatch mechanism.
//!
//! An [`ActivationFacility`] turns a component identifier into a live [`Dispatch`]
//! instance. Facilities consult [`crate::redirect::override_path`] before their
//! default registry lookup.

use std::fmt;

use crate::marshal::ArgBlock;
use crate::status::Status;
use crate::value::Value;

/// Identifier of an external component (a CLSID in braces or a ProgID).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(String);

impl ComponentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for `{xxxxxxxx-...}` style class identifiers.
    pub fn is_class_id(&self) -> bool {
        self.0.starts_with('{') && self.0.ends_with('}')
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ComponentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Numeric call identifier assigned by the component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodId(pub i32);

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A live, generically callable component instance.
///
/// Dropping the instance releases it.
pub trait Dispatch {
    /// Map a symbolic operation name to its numeric id.
    fn resolve(&self, name: &str) -> Result<MethodId, Status>;

    /// Invoke `id` with `args` in wire order. Output slots in `args` are written in place.
    fn invoke(&self, id: MethodId, args: &mut ArgBlock) -> Result<Value, Status>;
}

/// Creates component instances.
pub trait ActivationFacility {
    fn activate(&self, component: &ComponentId) -> Result<Box<dyn Dispatch>, Status>;
}

impl<F: ActivationFacility + ?Sized> ActivationFacility for &F {
    fn activate(&self, component: &ComponentId) -> Result<Box<dyn Dispatch>, Status> {
        (**self).activate(component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_id_detection() {
        assert!(ComponentId::new("{4F27E588-5B1E-45B4-AD67-E32D45C4E9CA}").is_class_id());
        assert!(!ComponentId::new("AoJia.AoJiaD").is_class_id());
    }
}
