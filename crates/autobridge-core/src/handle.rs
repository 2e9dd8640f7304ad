//! ComponentHandle: exclusive owner of one activated component instance.
//!
//! `Activating -> {Ready, Failed}`, `Ready -> Released`. Failed and Released are terminal;
//! nothing here retries activation.

use std::path::Path;

use tracing::{info, warn};

use crate::error::{ActivationError, BridgeError};
use crate::facility::{ActivationFacility, ComponentId, Dispatch};
use crate::redirect::PathRedirector;
use crate::status::Status;

/// Lifecycle state of a [`ComponentHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    Ready,
    Failed,
    Released,
}

/// Owns one activated instance. Not `Clone`; the instance is released exactly once.
pub struct ComponentHandle {
    component: ComponentId,
    state: HandleState,
    status: Status,
    instance: Option<Box<dyn Dispatch>>,
}

impl ComponentHandle {
    /// Registered mode: the facility must already know how to find `component`.
    pub fn activate<F>(facility: &F, component: ComponentId) -> Self
    where
        F: ActivationFacility + ?Sized,
    {
        match facility.activate(&component) {
            Ok(instance) => {
                info!(target: "autobridge::handle", "Activated component {}", component);
                Self {
                    component,
                    state: HandleState::Ready,
                    status: Status::S_OK,
                    instance: Some(instance),
                }
            }
            Err(status) => {
                warn!(
                    target: "autobridge::handle",
                    "Activation of {} failed: {}",
                    component,
                    status
                );
                Self {
                    component,
                    state: HandleState::Failed,
                    status,
                    instance: None,
                }
            }
        }
    }

    /// Redirected mode: register `target` as the load path for `component`, then activate.
    pub fn activate_redirected<F>(
        facility: &F,
        component: ComponentId,
        redirector: &PathRedirector,
        target: &Path,
    ) -> Self
    where
        F: ActivationFacility + ?Sized,
    {
        redirector.register(&component, target);
        Self::activate(facility, component)
    }

    pub fn component(&self) -> &ComponentId {
        &self.component
    }

    pub fn state(&self) -> HandleState {
        self.state
    }

    /// Activation status; a failure code when the handle is `Failed`.
    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_ready(&self) -> bool {
        self.state == HandleState::Ready
    }

    /// `Ok` when the handle holds a live instance.
    pub fn check(&self) -> Result<(), ActivationError> {
        match self.state {
            HandleState::Ready => Ok(()),
            _ => Err(ActivationError {
                component: self.component.to_string(),
                status: self.not_ready_status(),
            }),
        }
    }

    /// Live instance, or `NotReady` without touching anything.
    pub(crate) fn instance(&self) -> Result<&dyn Dispatch, BridgeError> {
        match (&self.instance, self.state) {
            (Some(instance), HandleState::Ready) => Ok(instance.as_ref()),
            (_, state) => Err(BridgeError::NotReady {
                state,
                status: self.not_ready_status(),
            }),
        }
    }

    fn not_ready_status(&self) -> Status {
        if self.status.is_failure() {
            self.status
        } else {
            Status::E_POINTER
        }
    }

    /// Release the instance now. Later calls fail with `NotReady`.
    pub fn release(&mut self) {
        if let Some(instance) = self.instance.take() {
            drop(instance);
            self.state = HandleState::Released;
            info!(target: "autobridge::handle", "Released component {}", self.component);
        }
    }
}

impl Drop for ComponentHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ComponentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentHandle")
            .field("component", &self.component)
            .field("state", &self.state)
            .field("status", &self.status)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marshal::ArgBlock;
    use crate::facility::MethodId;
    use crate::value::Value;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Tracked(Rc<Cell<u32>>);

    impl Dispatch for Tracked {
        fn resolve(&self, _name: &str) -> Result<MethodId, Status> {
            Ok(MethodId(1))
        }

        fn invoke(&self, _id: MethodId, _args: &mut ArgBlock) -> Result<Value, Status> {
            Ok(Value::Empty)
        }
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    struct OneShot(Rc<Cell<u32>>);

    impl ActivationFacility for OneShot {
        fn activate(&self, _component: &ComponentId) -> Result<Box<dyn Dispatch>, Status> {
            Ok(Box::new(Tracked(self.0.clone())))
        }
    }

    struct Refusing;

    impl ActivationFacility for Refusing {
        fn activate(&self, _component: &ComponentId) -> Result<Box<dyn Dispatch>, Status> {
            Err(Status::REGDB_E_CLASSNOTREG)
        }
    }

    #[test]
    fn test_release_exactly_once() {
        let releases = Rc::new(Cell::new(0));
        let mut handle = ComponentHandle::activate(&OneShot(releases.clone()), "{a}".into());
        assert!(handle.is_ready());
        handle.release();
        assert_eq!(handle.state(), HandleState::Released);
        assert_eq!(releases.get(), 1);
        handle.release();
        drop(handle);
        assert_eq!(releases.get(), 1);
    }

    #[test]
    fn test_drop_releases() {
        let releases = Rc::new(Cell::new(0));
        {
            let _handle = ComponentHandle::activate(&OneShot(releases.clone()), "{a}".into());
        }
        assert_eq!(releases.get(), 1);
    }

    #[test]
    fn test_failed_activation_is_terminal() {
        let mut handle = ComponentHandle::activate(&Refusing, "{missing}".into());
        assert_eq!(handle.state(), HandleState::Failed);
        assert_eq!(handle.status(), Status::REGDB_E_CLASSNOTREG);
        let err = handle.check().unwrap_err();
        assert_eq!(err.status, Status::REGDB_E_CLASSNOTREG);
        handle.release();
        assert_eq!(handle.state(), HandleState::Failed);
        assert!(matches!(
            handle.instance(),
            Err(BridgeError::NotReady { state: HandleState::Failed, .. })
        ));
    }
}
