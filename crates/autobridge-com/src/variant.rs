//! Value <-> VARIANT conversion.
//!
//! VARIANT layout is fixed by the ABI: the type tag is the first `u16`, the payload union
//! starts at byte 8. Everything here reads and writes through that layout.

use std::mem::size_of;

use autobridge_core::{Status, Value};
use windows::core::{BSTR, VARIANT};

const VT_EMPTY: u16 = 0;
const VT_NULL: u16 = 1;
const VT_I2: u16 = 2;
const VT_I4: u16 = 3;
const VT_R4: u16 = 4;
const VT_R8: u16 = 5;
const VT_BSTR: u16 = 8;
const VT_BOOL: u16 = 11;
const VT_VARIANT: u16 = 12;
const VT_UI4: u16 = 19;
const VT_I8: u16 = 20;
const VT_UI8: u16 = 21;
const VT_INT: u16 = 22;
const VT_UINT: u16 = 23;
const VT_BYREF: u16 = 0x4000;

const PAYLOAD_OFFSET: usize = 8;

const VARIANT_TRUE: i16 = -1;
const VARIANT_FALSE: i16 = 0;

fn vt(v: &VARIANT) -> u16 {
    unsafe { std::ptr::read_unaligned(v as *const VARIANT as *const u16) }
}

unsafe fn payload<T: Copy>(v: &VARIANT) -> T {
    let base = v as *const VARIANT as *const u8;
    std::ptr::read_unaligned(base.add(PAYLOAD_OFFSET) as *const T)
}

/// Overwrite an empty VARIANT with a tag and payload.
unsafe fn set<T>(v: &mut VARIANT, tag: u16, value: T) {
    debug_assert!(PAYLOAD_OFFSET + size_of::<T>() <= size_of::<VARIANT>());
    let base = v as *mut VARIANT as *mut u8;
    std::ptr::write_unaligned(base as *mut u16, tag);
    std::ptr::write_unaligned(base.add(PAYLOAD_OFFSET) as *mut T, value);
}

/// Owned VARIANT for an input value. BSTRs are freed when the VARIANT drops.
pub(crate) fn to_variant(value: &Value) -> VARIANT {
    let mut v = VARIANT::default();
    unsafe {
        match value {
            Value::Empty => {}
            Value::I32(x) => set(&mut v, VT_I4, *x),
            Value::I64(x) => set(&mut v, VT_I8, *x),
            Value::U32(x) => set(&mut v, VT_UI4, *x),
            Value::U64(x) => set(&mut v, VT_UI8, *x),
            Value::F32(x) => set(&mut v, VT_R4, *x),
            Value::F64(x) => set(&mut v, VT_R8, *x),
            Value::Bool(b) => set(
                &mut v,
                VT_BOOL,
                if *b { VARIANT_TRUE } else { VARIANT_FALSE },
            ),
            Value::Text(s) => set(&mut v, VT_BSTR, BSTR::from(s.as_str()).into_raw()),
        }
    }
    v
}

/// `VT_BYREF | VT_VARIANT` pointing at `target`. `target` must outlive the result.
pub(crate) fn by_ref(target: *mut VARIANT) -> VARIANT {
    let mut v = VARIANT::default();
    unsafe { set(&mut v, VT_BYREF | VT_VARIANT, target) };
    v
}

/// Copy a VARIANT into a tagged value. The VARIANT keeps ownership of its payload.
pub(crate) fn from_variant(v: &VARIANT) -> Result<Value, Status> {
    let tag = vt(v);
    if tag == VT_BYREF | VT_VARIANT {
        let inner: *const VARIANT = unsafe { payload(v) };
        if inner.is_null() {
            return Err(Status::E_POINTER);
        }
        return from_variant(unsafe { &*inner });
    }
    let value = unsafe {
        match tag {
            VT_EMPTY | VT_NULL => Value::Empty,
            // Same logical kind as i32; only the COM encoding differs.
            VT_I2 => Value::I32(i32::from(payload::<i16>(v))),
            VT_I4 | VT_INT => Value::I32(payload(v)),
            VT_I8 => Value::I64(payload(v)),
            VT_UI4 | VT_UINT => Value::U32(payload(v)),
            VT_UI8 => Value::U64(payload(v)),
            VT_R4 => Value::F32(payload(v)),
            VT_R8 => Value::F64(payload(v)),
            VT_BOOL => Value::Bool(payload::<i16>(v) != VARIANT_FALSE),
            VT_BSTR => Value::Text(read_bstr(payload(v))),
            _ => return Err(Status::DISP_E_TYPEMISMATCH),
        }
    };
    Ok(value)
}

/// Copy a BSTR without taking ownership. The byte length sits in the `u32` before the data.
unsafe fn read_bstr(ptr: *const u16) -> String {
    if ptr.is_null() {
        return String::new();
    }
    let bytes = std::ptr::read_unaligned((ptr as *const u32).sub(1)) as usize;
    String::from_utf16_lossy(std::slice::from_raw_parts(ptr, bytes / 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_variants() {
        for value in [
            Value::I32(-5),
            Value::I64(1 << 40),
            Value::U32(7),
            Value::U64(9),
            Value::F32(0.5),
            Value::F64(2.25),
            Value::Bool(true),
            Value::Bool(false),
            Value::Empty,
        ] {
            assert_eq!(from_variant(&to_variant(&value)).unwrap(), value);
        }
    }

    #[test]
    fn test_text_variant() {
        let v = to_variant(&Value::from("大漠 hello"));
        assert_eq!(from_variant(&v).unwrap(), Value::from("大漠 hello"));
    }

    #[test]
    fn test_by_ref_reads_target() {
        let mut target = to_variant(&Value::I32(42));
        let reference = by_ref(&mut target);
        assert_eq!(from_variant(&reference).unwrap(), Value::I32(42));
    }
}
