//! Typed call sites for a representative slice of the component's operations.
//!
//! Each operation owns a static [`CallSite`] and substitutes its documented default
//! when the call fails. The full surface follows the same pattern.

use crate::bridge::InvokeBridge;
use crate::marshal::ArgList;
use crate::resolver::CallSite;
use crate::value::{ResultKind, Value};

/// Operating system details reported by `GetOs`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OsInfo {
    pub result: i32,
    pub version: String,
    pub version_name: String,
    pub build: i32,
    pub system_dir: String,
}

/// Screen or client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// `GetFileSize` result: size as a double plus the raw high/low words.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FileSize {
    pub size: f64,
    pub high: i32,
    pub low: i32,
}

static VER_S: CallSite = CallSite::new("VerS");
static SET_PATH: CallSite = CallSite::new("SetPath");
static GET_OS: CallSite = CallSite::new("GetOs");
static FIND_WINDOW: CallSite = CallSite::new("FindWindow");
static GET_REMOTE_PROC_ADDRESS: CallSite = CallSite::new("GetRemoteProcAddress");
static GET_MODULE_SIZE: CallSite = CallSite::new("GetModuleSize");
static CLIENT_TO_SCREEN: CallSite = CallSite::new("ClientToScreen");
static GET_FILE_SIZE: CallSite = CallSite::new("GetFileSize");
static READ_FLOAT_S: CallSite = CallSite::new("ReadFloatS");
static GET_COLOR: CallSite = CallSite::new("GetColor");
static MOVE_TO: CallSite = CallSite::new("MoveTo");
static LEFT_CLICK: CallSite = CallSite::new("LeftClick");

impl InvokeBridge {
    /// Component version string; empty on failure.
    pub fn ver_s(&self) -> String {
        self.call(&VER_S, ArgList::new().into_block(), ResultKind::Text)
            .text_or_default()
    }

    /// Set the component's working directory. `0` on failure.
    pub fn set_path(&self, path: &str) -> i32 {
        self.call(&SET_PATH, ArgList::new().arg(path).into_block(), ResultKind::I32)
            .i32_or(0)
    }

    /// On failure: result `0`, empty texts, build `-1`.
    pub fn get_os(&self, kind: i32) -> OsInfo {
        let args = ArgList::new().out().out().out().out().arg(kind);
        let outcome = self.call(&GET_OS, args.into_block(), ResultKind::I32);
        if !outcome.success {
            return OsInfo {
                build: -1,
                ..OsInfo::default()
            };
        }
        let outs = outcome.outputs();
        OsInfo {
            result: outcome.i32_or(0),
            version: outs.text_or_default(0),
            version_name: outs.text_or_default(1),
            build: outs.i32_or(2, -1),
            system_dir: outs.text_or_default(3),
        }
    }

    /// Window handle, or `0` when nothing matched or the call failed.
    #[allow(clippy::too_many_arguments)]
    pub fn find_window(
        &self,
        parent: i32,
        process_name: &str,
        process_id: i32,
        class: &str,
        title: &str,
        kind: i32,
        timeout_ms: i32,
    ) -> i32 {
        let args = ArgList::new()
            .arg(parent)
            .arg(process_name)
            .arg(process_id)
            .arg(class)
            .arg(title)
            .arg(kind)
            .arg(timeout_ms);
        self.call(&FIND_WINDOW, args.into_block(), ResultKind::I32)
            .i32_or(0)
    }

    /// 64-bit address of `func` in `module`; `0` on failure.
    pub fn get_remote_proc_address(&self, pid: i32, hwnd: i32, module: &str, func: &str) -> i64 {
        let args = ArgList::new().arg(pid).arg(hwnd).arg(module).arg(func);
        self.call(&GET_REMOTE_PROC_ADDRESS, args.into_block(), ResultKind::I64)
            .i64_or(0)
    }

    pub fn get_module_size(&self, pid: i32, hwnd: i32, module: &str) -> u32 {
        let args = ArgList::new().arg(pid).arg(hwnd).arg(module);
        self.call(&GET_MODULE_SIZE, args.into_block(), ResultKind::U32)
            .u32_or(0)
    }

    /// Converts `point` in place. On failure returns `0` and leaves `point` as it was.
    pub fn client_to_screen(&self, hwnd: i32, point: &mut Point) -> i32 {
        let args = ArgList::new().arg(hwnd).in_out(point.x).in_out(point.y);
        let outcome = self.call(&CLIENT_TO_SCREEN, args.into_block(), ResultKind::I32);
        if outcome.success {
            let outs = outcome.outputs();
            point.x = outs.i32_or(0, point.x);
            point.y = outs.i32_or(1, point.y);
        }
        outcome.i32_or(0)
    }

    /// On failure every field is `-1`.
    pub fn get_file_size(&self, file: &str) -> FileSize {
        let args = ArgList::new().arg(file).out().out();
        let outcome = self.call(&GET_FILE_SIZE, args.into_block(), ResultKind::F64);
        let outs = outcome.outputs();
        FileSize {
            size: outcome.f64_or(-1.0),
            high: outs.i32_or(0, -1),
            low: outs.i32_or(1, -1),
        }
    }

    /// Float at `addr` plus the address type the component reported. `(0.0, 0)` on failure.
    pub fn read_float_s(&self, pid: i32, hwnd: i32, addr: &str) -> (f32, i32) {
        let args = ArgList::new().arg(pid).arg(hwnd).arg(addr).out();
        let outcome = self.call(&READ_FLOAT_S, args.into_block(), ResultKind::F32);
        (outcome.f32_or(0.0), outcome.outputs().i32_or(0, 0))
    }

    /// Polymorphic: text colour or numeric code depending on `kind`. `I32(-1)` on failure.
    pub fn get_color(&self, x: i32, y: i32, kind: i32, kind_d: i32) -> Value {
        let args = ArgList::new().arg(x).arg(y).arg(kind).arg(kind_d);
        self.call(&GET_COLOR, args.into_block(), ResultKind::Any)
            .value_or(Value::I32(-1))
    }

    pub fn move_to(&self, x: i32, y: i32) -> i32 {
        self.call(&MOVE_TO, ArgList::new().arg(x).arg(y).into_block(), ResultKind::I32)
            .i32_or(0)
    }

    pub fn left_click(&self) -> i32 {
        self.call(&LEFT_CLICK, ArgList::new().into_block(), ResultKind::I32)
            .i32_or(0)
    }
}
