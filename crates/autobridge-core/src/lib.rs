//! autobridge-core: late-bound dispatch bridge for an external automation component.
//!
//! The component exposes its whole surface through one name-resolved call mechanism.
//! This crate binds to it without fixed entry points:
//!
//! - **PathRedirector**: registration-free activation via a side-loaded helper and a
//!   process-wide override table.
//! - **ComponentHandle**: exclusive owner of one activated instance.
//! - **MethodResolver**: per-call-site cache of name to method id ([`CallSite`]).
//! - **ArgumentMarshaler**: ordered, typed argument blocks with output slots.
//! - **InvokeBridge**: resolve, invoke and unpack in one synchronous call.
//!
//! The platform side (COM `IDispatch` on Windows) lives in `autobridge-com`; anything
//! implementing [`ActivationFacility`] can stand in for it, such as [`mock::MockFacility`].
//!
//! ## Failure model
//!
//! Activation failure stays with the handle ([`ComponentHandle::status`]). Resolution and
//! invocation failures never escape [`InvokeBridge::call`]; they become `success = false`
//! plus a status code, and typed call sites substitute their documented default.

mod bridge;
mod calls;
pub mod config;
mod error;
mod facility;
mod handle;
mod marshal;
pub mod mock;
pub mod redirect;
mod resolver;
mod status;
mod value;

pub use bridge::{CallOutcome, InvokeBridge, Reply};
pub use calls::{FileSize, OsInfo, Point};
pub use config::BridgeConfig;
pub use error::{ActivationError, BridgeError, ConfigError};
pub use facility::{ActivationFacility, ComponentId, Dispatch, MethodId};
pub use handle::{ComponentHandle, HandleState};
pub use marshal::{pack, unpack, Arg, ArgBlock, ArgList, Direction, Outputs};
pub use redirect::{PathRedirector, RedirectHelper};
pub use resolver::{resolve, CallSite, MethodSlot};
pub use status::Status;
pub use value::{ResultKind, Value};
