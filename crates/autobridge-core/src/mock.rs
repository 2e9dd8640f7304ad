//! In-memory activation facility for tests and for hosts without the real component.
//!
//! Method ids are derived from operation names, so every mock instance assigns the same
//! id to the same name, just as every instance of a real component class does.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::facility::{ActivationFacility, ComponentId, Dispatch, MethodId};
use crate::marshal::ArgBlock;
use crate::redirect::{override_path, RedirectHelper};
use crate::status::Status;
use crate::value::Value;

/// Body of a mock operation. Receives the block in wire order.
pub type Operation = Arc<dyn Fn(&mut ArgBlock) -> Result<Value, Status> + Send + Sync>;

/// Counters shared by every instance of one [`MockComponent`].
#[derive(Debug, Default)]
pub struct MockStats {
    resolves: AtomicUsize,
    invokes: AtomicUsize,
    releases: AtomicUsize,
}

impl MockStats {
    /// Name-resolution round trips.
    pub fn resolves(&self) -> usize {
        self.resolves.load(Ordering::SeqCst)
    }

    pub fn invokes(&self) -> usize {
        self.invokes.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

/// Stable id for an operation name (FNV-1a, kept positive).
pub fn method_id_for(name: &str) -> MethodId {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in name.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    MethodId((hash & 0x7fff_ffff) as i32)
}

/// Operation table of a mock component class.
#[derive(Clone, Default)]
pub struct MockComponent {
    ops: HashMap<MethodId, (String, Operation)>,
    stats: Arc<MockStats>,
}

impl MockComponent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_operation<F>(mut self, name: &str, op: F) -> Self
    where
        F: Fn(&mut ArgBlock) -> Result<Value, Status> + Send + Sync + 'static,
    {
        let op: Operation = Arc::new(op);
        self.ops.insert(method_id_for(name), (name.to_string(), op));
        self
    }

    /// Operation that always returns `value`.
    pub fn with_constant(self, name: &str, value: Value) -> Self {
        self.with_operation(name, move |_| Ok(value.clone()))
    }

    /// Operation that resolves but always fails when invoked.
    pub fn with_failing(self, name: &str, status: Status) -> Self {
        self.with_operation(name, move |_| Err(status))
    }

    /// `Echo(text) -> text`: returns its single input unchanged.
    pub fn with_echo(self) -> Self {
        self.with_operation("Echo", |args| {
            args.inputs().next().cloned().ok_or(Status::DISP_E_BADPARAMCOUNT)
        })
    }

    pub fn stats(&self) -> Arc<MockStats> {
        Arc::clone(&self.stats)
    }

    fn instantiate(&self) -> MockInstance {
        MockInstance {
            component: self.clone(),
        }
    }
}

struct MockInstance {
    component: MockComponent,
}

impl Dispatch for MockInstance {
    fn resolve(&self, name: &str) -> Result<MethodId, Status> {
        self.component.stats.resolves.fetch_add(1, Ordering::SeqCst);
        let id = method_id_for(name);
        if self.component.ops.contains_key(&id) {
            Ok(id)
        } else {
            Err(Status::DISP_E_UNKNOWNNAME)
        }
    }

    fn invoke(&self, id: MethodId, args: &mut ArgBlock) -> Result<Value, Status> {
        self.component.stats.invokes.fetch_add(1, Ordering::SeqCst);
        let (_, op) = self
            .component
            .ops
            .get(&id)
            .ok_or(Status::DISP_E_MEMBERNOTFOUND)?;
        op(args)
    }
}

impl Drop for MockInstance {
    fn drop(&mut self) {
        self.component.stats.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// Activation facility with a default registry plus loadable "modules" reached via overrides.
#[derive(Default)]
pub struct MockFacility {
    registry: HashMap<ComponentId, MockComponent>,
    modules: HashMap<PathBuf, MockComponent>,
    failure: Option<Status>,
    activations: AtomicUsize,
}

impl MockFacility {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `component` activatable without any override.
    pub fn with_registered(mut self, component: impl Into<ComponentId>, mock: MockComponent) -> Self {
        self.registry.insert(component.into(), mock);
        self
    }

    /// Make `mock` loadable from `path` once an override points there.
    pub fn with_module(mut self, path: impl Into<PathBuf>, mock: MockComponent) -> Self {
        self.modules.insert(path.into(), mock);
        self
    }

    /// Every activation fails with `status`.
    pub fn failing(mut self, status: Status) -> Self {
        self.failure = Some(status);
        self
    }

    pub fn activations(&self) -> usize {
        self.activations.load(Ordering::SeqCst)
    }
}

impl ActivationFacility for MockFacility {
    fn activate(&self, component: &ComponentId) -> Result<Box<dyn Dispatch>, Status> {
        self.activations.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.failure {
            return Err(status);
        }
        if let Some(path) = override_path(component) {
            if let Some(mock) = self.modules.get(&path) {
                return Ok(Box::new(mock.instantiate()));
            }
        }
        self.registry
            .get(component)
            .map(|mock| Box::new(mock.instantiate()) as Box<dyn Dispatch>)
            .ok_or(Status::REGDB_E_CLASSNOTREG)
    }
}

/// Redirection helper that accepts every path and remembers them.
#[derive(Debug)]
pub struct MockHelper {
    status: i32,
    targets: Mutex<Vec<PathBuf>>,
}

impl MockHelper {
    pub fn new(status: i32) -> Self {
        Self {
            status,
            targets: Mutex::new(Vec::new()),
        }
    }

    pub fn targets(&self) -> Vec<PathBuf> {
        self.targets
            .lock()
            .map(|t| t.clone())
            .unwrap_or_default()
    }
}

impl RedirectHelper for MockHelper {
    fn set_override_path(&self, target: &Path) -> i32 {
        if let Ok(mut targets) = self.targets.lock() {
            targets.push(target.to_path_buf());
        }
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_ids_are_stable() {
        assert_eq!(method_id_for("VerS"), method_id_for("VerS"));
        assert_ne!(method_id_for("VerS"), method_id_for("SetPath"));
        assert!(method_id_for("FindWindow").0 >= 0);
    }

    #[test]
    fn test_unknown_component_not_registered() {
        let facility = MockFacility::new();
        let err = facility.activate(&ComponentId::new("{nobody}")).err();
        assert_eq!(err, Some(Status::REGDB_E_CLASSNOTREG));
        assert_eq!(facility.activations(), 1);
    }

    #[test]
    fn test_instances_share_stats_and_count_releases() {
        let mock = MockComponent::new().with_constant("VerS", Value::from("1.0"));
        let stats = mock.stats();
        let facility = MockFacility::new().with_registered("{mock-stats}", mock);
        let a = facility.activate(&"{mock-stats}".into()).unwrap();
        let b = facility.activate(&"{mock-stats}".into()).unwrap();
        assert_eq!(a.resolve("VerS").unwrap(), b.resolve("VerS").unwrap());
        assert_eq!(stats.resolves(), 2);
        drop(a);
        drop(b);
        assert_eq!(stats.releases(), 2);
    }
}
