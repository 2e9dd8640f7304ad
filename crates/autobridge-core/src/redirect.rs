//! PathRedirector: registration-free activation through a process-wide override table.
//!
//! A side-loaded helper module exports `SetDllPathW(path, flags) -> status`. Once it has
//! been told where the component lives, activation of that component loads from the given
//! path instead of the host registry. The override is also recorded in an in-process table
//! that activation facilities consult before their default lookup.
//!
//! A missing helper module or export is a silent no-op with status `0`.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use libloading::Library;
use once_cell::sync::Lazy;
use tracing::{debug, info};

use crate::facility::ComponentId;

/// Name of the redirection export in the helper module.
pub const SET_DLL_PATH_SYMBOL: &[u8] = b"SetDllPathW";

/// C ABI: SetDllPathW(wide_path, flags) -> status.
type SetDllPathFn = unsafe extern "system" fn(*const u16, i32) -> i32;

static OVERRIDES: Lazy<RwLock<HashMap<ComponentId, PathBuf>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Helper modules that loaded successfully, keyed by module path. Failures are not cached.
static HELPERS: Lazy<Mutex<HashMap<PathBuf, Arc<dyn RedirectHelper>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Something able to install a load-path override for the component.
pub trait RedirectHelper: Send + Sync {
    /// Point subsequent activations at `target`. Returns the helper's status.
    fn set_override_path(&self, target: &Path) -> i32;
}

/// Helper backed by a loaded module exporting `SetDllPathW`.
struct NativeHelper {
    _lib: Library,
    set_dll_path: SetDllPathFn,
}

impl NativeHelper {
    fn load(path: &Path) -> Result<Self, libloading::Error> {
        let lib = unsafe { Library::new(path)? };
        let set_dll_path = unsafe { *lib.get::<SetDllPathFn>(SET_DLL_PATH_SYMBOL)? };
        Ok(Self {
            _lib: lib,
            set_dll_path,
        })
    }
}

impl RedirectHelper for NativeHelper {
    fn set_override_path(&self, target: &Path) -> i32 {
        let wide = to_wide(target);
        unsafe { (self.set_dll_path)(wide.as_ptr(), 0) }
    }
}

/// NUL-terminated UTF-16 form of a path.
fn to_wide(path: &Path) -> Vec<u16> {
    #[cfg(windows)]
    {
        use std::os::windows::ffi::OsStrExt;
        path.as_os_str().encode_wide().chain(std::iter::once(0)).collect()
    }
    #[cfg(not(windows))]
    {
        path.to_string_lossy()
            .encode_utf16()
            .chain(std::iter::once(0))
            .collect()
    }
}

enum HelperSource {
    Module(PathBuf),
    Custom(Arc<dyn RedirectHelper>),
}

/// Registers load-path overrides for components.
pub struct PathRedirector {
    source: HelperSource,
}

impl PathRedirector {
    /// Use the helper module at `path`, loaded on first use and cached for the process.
    pub fn from_module(path: impl Into<PathBuf>) -> Self {
        Self {
            source: HelperSource::Module(path.into()),
        }
    }

    /// Use an in-process helper.
    pub fn with_helper(helper: Arc<dyn RedirectHelper>) -> Self {
        Self {
            source: HelperSource::Custom(helper),
        }
    }

    /// Make later activations of `component` load from `target`.
    ///
    /// Returns the helper's status, or `0` when no helper is available.
    pub fn register(&self, component: &ComponentId, target: &Path) -> i32 {
        let Some(helper) = self.helper() else {
            return 0;
        };
        let status = helper.set_override_path(target);
        record_override(component, target);
        info!(
            target: "autobridge::redirect",
            "Redirected {} to {} (status {})",
            component,
            target.display(),
            status
        );
        status
    }

    fn helper(&self) -> Option<Arc<dyn RedirectHelper>> {
        match &self.source {
            HelperSource::Custom(helper) => Some(Arc::clone(helper)),
            HelperSource::Module(path) => load_cached(path, |path| {
                NativeHelper::load(path).map(|h| Arc::new(h) as Arc<dyn RedirectHelper>)
            }),
        }
    }
}

/// Helper for `path` from the process cache, calling `load` only on a miss.
fn load_cached<L, E>(path: &Path, load: L) -> Option<Arc<dyn RedirectHelper>>
where
    L: FnOnce(&Path) -> Result<Arc<dyn RedirectHelper>, E>,
    E: fmt::Display,
{
    let mut helpers = HELPERS.lock().ok()?;
    if let Some(helper) = helpers.get(path) {
        return Some(Arc::clone(helper));
    }
    match load(path) {
        Ok(helper) => {
            helpers.insert(path.to_path_buf(), Arc::clone(&helper));
            Some(helper)
        }
        Err(e) => {
            debug!(
                target: "autobridge::redirect",
                "Redirection helper unavailable at {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}

fn record_override(component: &ComponentId, target: &Path) {
    if let Ok(mut overrides) = OVERRIDES.write() {
        overrides.insert(component.clone(), target.to_path_buf());
    }
}

/// Load path registered for `component`, if any.
pub fn override_path(component: &ComponentId) -> Option<PathBuf> {
    OVERRIDES
        .read()
        .ok()
        .and_then(|overrides| overrides.get(component).cloned())
}

/// Remove the override for `component`, returning the path it pointed at.
pub fn clear_override(component: &ComponentId) -> Option<PathBuf> {
    OVERRIDES
        .write()
        .ok()
        .and_then(|mut overrides| overrides.remove(component))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHelper {
        calls: AtomicUsize,
        status: i32,
    }

    impl RedirectHelper for CountingHelper {
        fn set_override_path(&self, _target: &Path) -> i32 {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.status
        }
    }

    #[test]
    fn test_missing_module_is_noop() {
        let component = ComponentId::new("{redirect-test-missing}");
        let missing = PathBuf::from("/nonexistent/autobridge/helper.dll");
        let redirector = PathRedirector::from_module(&missing);
        assert_eq!(redirector.register(&component, Path::new("/tmp/component.dll")), 0);
        assert_eq!(override_path(&component), None);
        assert!(!HELPERS.lock().unwrap().contains_key(&missing));
    }

    #[test]
    fn test_custom_helper_records_override() {
        let component = ComponentId::new("{redirect-test-custom}");
        let helper = Arc::new(CountingHelper {
            calls: AtomicUsize::new(0),
            status: 1,
        });
        let redirector = PathRedirector::with_helper(helper.clone());
        let status = redirector.register(&component, Path::new("/opt/component.dll"));
        assert_eq!(status, 1);
        assert_eq!(helper.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            override_path(&component),
            Some(PathBuf::from("/opt/component.dll"))
        );
        assert_eq!(
            clear_override(&component),
            Some(PathBuf::from("/opt/component.dll"))
        );
        assert_eq!(override_path(&component), None);
    }

    #[test]
    fn test_helper_module_loaded_once_per_path() {
        let path = PathBuf::from("/opt/autobridge/cached-helper.dll");
        let loads = AtomicUsize::new(0);
        let load = |_: &Path| {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(Arc::new(CountingHelper {
                calls: AtomicUsize::new(0),
                status: 1,
            }) as Arc<dyn RedirectHelper>)
        };
        let first = load_cached(&path, &load).unwrap();
        let second = load_cached(&path, &load).unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.set_override_path(Path::new("/opt/component.dll")), 1);
    }

    #[test]
    fn test_failed_helper_load_is_retried() {
        let path = PathBuf::from("/opt/autobridge/late-helper.dll");
        let failed = load_cached(&path, |_: &Path| {
            Err::<Arc<dyn RedirectHelper>, _>("not installed yet")
        });
        assert!(failed.is_none());
        assert!(!HELPERS.lock().unwrap().contains_key(&path));

        let helper = load_cached(&path, |_: &Path| {
            Ok::<_, String>(Arc::new(CountingHelper {
                calls: AtomicUsize::new(0),
                status: 0,
            }) as Arc<dyn RedirectHelper>)
        });
        assert!(helper.is_some());
        assert!(HELPERS.lock().unwrap().contains_key(&path));
    }

    #[test]
    fn test_to_wide_is_nul_terminated() {
        let wide = to_wide(Path::new("ab"));
        assert_eq!(wide, vec![b'a' as u16, b'b' as u16, 0]);
    }
}
