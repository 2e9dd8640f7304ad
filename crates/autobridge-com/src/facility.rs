//! ComFacility: IDispatch activation, name resolution and invocation.

use std::ffi::c_void;
use std::path::Path;
use std::sync::Arc;

use autobridge_core::redirect::override_path;
use autobridge_core::{
    ActivationFacility, ArgBlock, BridgeConfig, ComponentId, Dispatch, InvokeBridge, MethodId,
    Status, Value,
};
use libloading::Library;
use tracing::{debug, info, warn};
use windows::core::{Interface, GUID, HRESULT, HSTRING, PCWSTR, VARIANT};
use windows::Win32::System::Com::{
    CLSIDFromProgID, CLSIDFromString, CoCreateInstance, IClassFactory, IDispatch,
    CLSCTX_INPROC_SERVER, DISPATCH_METHOD, DISPPARAMS,
};

use crate::variant::{by_ref, from_variant, to_variant};

const LOCALE_SYSTEM_DEFAULT: u32 = 0x0800;

/// C ABI: DllGetClassObject(rclsid, riid, ppv).
type DllGetClassObjectFn =
    unsafe extern "system" fn(*const GUID, *const GUID, *mut *mut c_void) -> HRESULT;

fn status_of(e: windows::core::Error) -> Status {
    Status(e.code().0)
}

fn class_id(component: &ComponentId) -> Result<GUID, Status> {
    let id = HSTRING::from(component.as_str());
    let clsid = if component.is_class_id() {
        unsafe { CLSIDFromString(&id) }
    } else {
        unsafe { CLSIDFromProgID(&id) }
    };
    clsid.map_err(status_of)
}

/// Activates components through COM, honouring load-path overrides.
#[derive(Debug, Default, Clone, Copy)]
pub struct ComFacility;

impl ComFacility {
    pub fn new() -> Self {
        Self
    }

    /// Registration-free load: ask the module's class factory directly.
    fn activate_from_module(clsid: &GUID, module: &Path) -> Result<ComObject, Status> {
        let lib = unsafe { Library::new(module) }.map_err(|e| {
            debug!(target: "autobridge::com", "Cannot load {}: {}", module.display(), e);
            Status::REGDB_E_CLASSNOTREG
        })?;
        let get_class_object = unsafe { lib.get::<DllGetClassObjectFn>(b"DllGetClassObject") }
            .map(|symbol| *symbol)
            .map_err(|_| Status::REGDB_E_CLASSNOTREG)?;
        let mut raw: *mut c_void = std::ptr::null_mut();
        unsafe { get_class_object(clsid, &IClassFactory::IID, &mut raw) }
            .ok()
            .map_err(status_of)?;
        let factory = unsafe { IClassFactory::from_raw(raw) };
        let dispatch: IDispatch =
            unsafe { factory.CreateInstance(None::<&windows::core::IUnknown>) }.map_err(status_of)?;
        Ok(ComObject {
            dispatch,
            _module: Some(Arc::new(lib)),
        })
    }
}

impl ActivationFacility for ComFacility {
    fn activate(&self, component: &ComponentId) -> Result<Box<dyn Dispatch>, Status> {
        if let Some(module) = override_path(component) {
            if !component.is_class_id() {
                warn!(
                    target: "autobridge::com",
                    "Cannot load {} from {}: redirected activation needs a class id",
                    component,
                    module.display()
                );
                return Err(Status::CO_E_CLASSSTRING);
            }
            let clsid = class_id(component)?;
            info!(
                target: "autobridge::com",
                "Activating {} from {}",
                component,
                module.display()
            );
            return Ok(Box::new(Self::activate_from_module(&clsid, &module)?));
        }
        let clsid = class_id(component)?;
        let dispatch: IDispatch =
            unsafe { CoCreateInstance(&clsid, None, CLSCTX_INPROC_SERVER) }.map_err(status_of)?;
        Ok(Box::new(ComObject {
            dispatch,
            _module: None,
        }))
    }
}

/// A live IDispatch instance. Dropping it releases the interface before unloading the module.
struct ComObject {
    dispatch: IDispatch,
    _module: Option<Arc<Library>>,
}

impl Dispatch for ComObject {
    fn resolve(&self, name: &str) -> Result<MethodId, Status> {
        let wide: Vec<u16> = name.encode_utf16().chain(std::iter::once(0)).collect();
        let names = [PCWSTR(wide.as_ptr())];
        let mut id = -1i32;
        unsafe {
            self.dispatch.GetIDsOfNames(
                &GUID::zeroed(),
                names.as_ptr(),
                1,
                LOCALE_SYSTEM_DEFAULT,
                &mut id,
            )
        }
        .map_err(status_of)?;
        Ok(MethodId(id))
    }

    fn invoke(&self, id: MethodId, args: &mut ArgBlock) -> Result<Value, Status> {
        // Storage for output slots; the wire VARIANTs point into it, so it is never resized.
        let mut targets: Vec<VARIANT> = args
            .args()
            .iter()
            .map(|a| {
                if a.direction.is_output() {
                    to_variant(&a.value)
                } else {
                    VARIANT::default()
                }
            })
            .collect();
        let targets_ptr = targets.as_mut_ptr();
        let mut wire: Vec<VARIANT> = args
            .args()
            .iter()
            .enumerate()
            .map(|(i, a)| {
                if a.direction.is_output() {
                    by_ref(unsafe { targets_ptr.add(i) })
                } else {
                    to_variant(&a.value)
                }
            })
            .collect();

        let params = DISPPARAMS {
            rgvarg: if wire.is_empty() {
                std::ptr::null_mut()
            } else {
                wire.as_mut_ptr()
            },
            rgdispidNamedArgs: std::ptr::null_mut(),
            cArgs: wire.len() as u32,
            cNamedArgs: 0,
        };
        let mut result = VARIANT::default();
        unsafe {
            self.dispatch.Invoke(
                id.0,
                &GUID::zeroed(),
                LOCALE_SYSTEM_DEFAULT,
                DISPATCH_METHOD,
                &params,
                Some(&mut result as *mut VARIANT),
                None,
                None,
            )
        }
        .map_err(status_of)?;
        drop(wire);

        for (slot, target) in args.args_mut().iter_mut().zip(targets.iter()) {
            if slot.direction.is_output() {
                slot.write(from_variant(target)?);
            }
        }
        from_variant(&result)
    }
}

/// Bridge over the configured component: redirected when both module paths are set.
pub fn bridge_from_config(config: &BridgeConfig) -> InvokeBridge {
    config.build(&ComFacility)
}
