//! Opaque platform status codes with HRESULT semantics (negative = failure).

use std::fmt;

/// Status code reported by the activation facility, redirection helper or component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status(pub i32);

impl Status {
    pub const S_OK: Status = Status(0);
    pub const S_FALSE: Status = Status(1);
    pub const E_FAIL: Status = Status(0x8000_4005_u32 as i32);
    pub const E_POINTER: Status = Status(0x8000_4003_u32 as i32);
    pub const E_INVALIDARG: Status = Status(0x8007_0057_u32 as i32);
    pub const DISP_E_MEMBERNOTFOUND: Status = Status(0x8002_0003_u32 as i32);
    pub const DISP_E_TYPEMISMATCH: Status = Status(0x8002_0005_u32 as i32);
    pub const DISP_E_UNKNOWNNAME: Status = Status(0x8002_0006_u32 as i32);
    pub const DISP_E_BADPARAMCOUNT: Status = Status(0x8002_000E_u32 as i32);
    pub const REGDB_E_CLASSNOTREG: Status = Status(0x8004_0154_u32 as i32);
    pub const CO_E_NOTINITIALIZED: Status = Status(0x8004_01F0_u32 as i32);
    pub const CO_E_CLASSSTRING: Status = Status(0x8004_01F3_u32 as i32);

    pub fn is_success(self) -> bool {
        self.0 >= 0
    }

    pub fn is_failure(self) -> bool {
        self.0 < 0
    }

    pub fn code(self) -> i32 {
        self.0
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::S_OK
    }
}

impl From<i32> for Status {
    fn from(code: i32) -> Self {
        Status(code)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0 as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_semantics() {
        assert!(Status::S_OK.is_success());
        assert!(Status::S_FALSE.is_success());
        assert!(Status::E_FAIL.is_failure());
        assert!(Status::REGDB_E_CLASSNOTREG.is_failure());
    }

    #[test]
    fn test_display_is_hex() {
        assert_eq!(Status::E_FAIL.to_string(), "0x80004005");
        assert_eq!(Status::S_OK.to_string(), "0x00000000");
    }
}
