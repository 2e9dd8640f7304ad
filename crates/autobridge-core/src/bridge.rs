//! InvokeBridge: resolve, invoke and unpack one late-bound call.

use std::path::Path;

use tracing::debug;

use crate::error::BridgeError;
use crate::facility::{ActivationFacility, ComponentId};
use crate::handle::ComponentHandle;
use crate::marshal::{self, ArgBlock, Outputs};
use crate::redirect::PathRedirector;
use crate::resolver::CallSite;
use crate::status::Status;
use crate::value::{ResultKind, Value};

/// Successful call: primary value plus output slots in block order.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub value: Value,
    pub outputs: Vec<Value>,
}

/// Result of [`InvokeBridge::call`]. On failure `value` is `Empty` and `outputs` is empty.
///
/// A sentinel default and a legitimate return of the same value are only told apart by
/// `success`.
#[derive(Debug, Clone, PartialEq)]
pub struct CallOutcome {
    pub success: bool,
    pub value: Value,
    pub outputs: Vec<Value>,
    pub status: Status,
}

impl CallOutcome {
    fn failed(status: Status) -> Self {
        Self {
            success: false,
            value: Value::Empty,
            outputs: Vec::new(),
            status,
        }
    }

    pub fn i32_or(&self, default: i32) -> i32 {
        self.value.as_i32().filter(|_| self.success).unwrap_or(default)
    }

    pub fn i64_or(&self, default: i64) -> i64 {
        self.value.as_i64().filter(|_| self.success).unwrap_or(default)
    }

    pub fn u32_or(&self, default: u32) -> u32 {
        self.value.as_u32().filter(|_| self.success).unwrap_or(default)
    }

    pub fn f32_or(&self, default: f32) -> f32 {
        self.value.as_f32().filter(|_| self.success).unwrap_or(default)
    }

    pub fn f64_or(&self, default: f64) -> f64 {
        self.value.as_f64().filter(|_| self.success).unwrap_or(default)
    }

    pub fn bool_or(&self, default: bool) -> bool {
        self.value.as_bool().filter(|_| self.success).unwrap_or(default)
    }

    /// Text result, or empty text on failure.
    pub fn text_or_default(&self) -> String {
        match (&self.value, self.success) {
            (Value::Text(s), true) => s.clone(),
            _ => String::new(),
        }
    }

    /// Raw value, or `default` on failure.
    pub fn value_or(&self, default: Value) -> Value {
        if self.success {
            self.value.clone()
        } else {
            default
        }
    }

    /// Outputs in declaration order, for blocks built with [`ArgList`](crate::ArgList).
    pub fn outputs(&self) -> Outputs {
        Outputs::from_block_order(self.outputs.clone())
    }
}

/// Synchronous late-bound call bridge over one component instance.
#[derive(Debug)]
pub struct InvokeBridge {
    handle: ComponentHandle,
}

impl InvokeBridge {
    pub fn new(handle: ComponentHandle) -> Self {
        Self { handle }
    }

    /// Registered-mode construction.
    pub fn registered<F>(facility: &F, component: ComponentId) -> Self
    where
        F: ActivationFacility + ?Sized,
    {
        Self::new(ComponentHandle::activate(facility, component))
    }

    /// Redirected-mode construction.
    pub fn redirected<F>(
        facility: &F,
        component: ComponentId,
        redirector: &PathRedirector,
        target: &Path,
    ) -> Self
    where
        F: ActivationFacility + ?Sized,
    {
        Self::new(ComponentHandle::activate_redirected(
            facility, component, redirector, target,
        ))
    }

    pub fn handle(&self) -> &ComponentHandle {
        &self.handle
    }

    pub fn handle_mut(&mut self) -> &mut ComponentHandle {
        &mut self.handle
    }

    /// Activation status of the underlying handle. Check it before relying on calls.
    pub fn status(&self) -> Status {
        self.handle.status()
    }

    /// Perform `site` with `args`, absorbing every failure into `success = false`.
    pub fn call(&self, site: &CallSite, args: ArgBlock, kind: ResultKind) -> CallOutcome {
        match self.try_call(site, args, kind) {
            Ok(reply) => CallOutcome {
                success: true,
                value: reply.value,
                outputs: reply.outputs,
                status: Status::S_OK,
            },
            Err(e) => {
                debug!(target: "autobridge::bridge", "{}", e);
                CallOutcome::failed(e.status())
            }
        }
    }

    /// Same as [`call`](Self::call) but reporting the failure kind.
    pub fn try_call(
        &self,
        site: &CallSite,
        mut args: ArgBlock,
        kind: ResultKind,
    ) -> Result<Reply, BridgeError> {
        let instance = self.handle.instance()?;
        let id = site.resolve(instance)?;
        let ret = instance
            .invoke(id, &mut args)
            .map_err(|status| BridgeError::Invocation {
                name: site.name().to_string(),
                status,
            })?;
        let (value, outputs) = marshal::unpack(site.name(), args, ret, kind);
        Ok(Reply { value, outputs })
    }
}
