//! Single-threaded apartment guard. Must exist on the calling thread before any handle is built.

use std::marker::PhantomData;

use autobridge_core::Status;
use tracing::debug;
use windows::Win32::System::Com::{CoInitializeEx, CoUninitialize, COINIT_APARTMENTTHREADED};

/// Keeps the current thread in a single-threaded apartment until dropped. `!Send`.
#[derive(Debug)]
pub struct Apartment {
    _thread_bound: PhantomData<*const ()>,
}

impl Apartment {
    pub fn single_threaded() -> Result<Self, Status> {
        unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) }
            .ok()
            .map_err(|e| Status(e.code().0))?;
        debug!(target: "autobridge::com", "Entered single-threaded apartment");
        Ok(Self {
            _thread_bound: PhantomData,
        })
    }
}

impl Drop for Apartment {
    fn drop(&mut self) {
        unsafe { CoUninitialize() };
    }
}
