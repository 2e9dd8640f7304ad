//! Error kinds of the bridge.
//!
//! `ActivationError` travels structurally with a failed [`ComponentHandle`](crate::ComponentHandle).
//! `BridgeError` covers everything that can go wrong for one call; [`InvokeBridge::call`](crate::InvokeBridge::call)
//! absorbs it into a success flag plus status code.

use thiserror::Error;

use crate::handle::HandleState;
use crate::status::Status;

/// The component instance could not be created.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("activation of component {component} failed: {status}")]
pub struct ActivationError {
    pub component: String,
    pub status: Status,
}

/// Failure of a single late-bound call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    #[error("component is not ready ({state:?}, status {status})")]
    NotReady { state: HandleState, status: Status },
    #[error("cannot resolve operation `{name}`: {status}")]
    Resolution { name: String, status: Status },
    #[error("invocation of `{name}` failed: {status}")]
    Invocation { name: String, status: Status },
    #[error("argument block mismatch: {values} values for {directions} directions")]
    Marshal { values: usize, directions: usize },
}

impl BridgeError {
    /// Status code a call site sees for this failure.
    pub fn status(&self) -> Status {
        match self {
            BridgeError::NotReady { status, .. } => *status,
            BridgeError::Resolution { status, .. } => *status,
            BridgeError::Invocation { status, .. } => *status,
            BridgeError::Marshal { .. } => Status::DISP_E_BADPARAMCOUNT,
        }
    }
}

/// Configuration could not be loaded.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
