//! autobridge-com: COM activation facility for the autobridge dispatch bridge.
//!
//! - **Apartment**: enter a single-threaded apartment for the calling thread.
//! - **ComFacility**: `CoCreateInstance` for registered components, `DllGetClassObject`
//!   on the overridden module for redirected ones.
//! - **bridge_from_config**: build an `InvokeBridge` from a `BridgeConfig`.
//!
//! Windows only; on other platforms the API is stubbed.

#[cfg(windows)]
mod apartment;
#[cfg(windows)]
mod facility;
#[cfg(windows)]
mod variant;

#[cfg(windows)]
pub use apartment::Apartment;
#[cfg(windows)]
pub use facility::{bridge_from_config, ComFacility};

/// Stub when not on Windows: there is no COM runtime to bind to.
#[cfg(not(windows))]
pub fn com_unavailable() -> bool {
    true
}
