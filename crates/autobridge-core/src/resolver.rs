//! MethodResolver: per-call-site name to id cache.
//!
//! Every call site owns one [`CallSite`], usually a `static`. The first call through it
//! asks the component for the id; afterwards the cached id is used with no round trip.
//! Sites are never shared between operation names.

use std::sync::OnceLock;

use tracing::debug;

use crate::error::BridgeError;
use crate::facility::{Dispatch, MethodId};

/// One-shot cache slot for a resolved method id.
#[derive(Debug, Default)]
pub struct MethodSlot {
    id: OnceLock<MethodId>,
}

impl MethodSlot {
    pub const fn new() -> Self {
        Self {
            id: OnceLock::new(),
        }
    }

    pub fn get(&self) -> Option<MethodId> {
        self.id.get().copied()
    }
}

/// Resolve `name` through `slot`, asking `target` only when the slot is still empty.
///
/// A failed resolution leaves the slot empty.
pub fn resolve(
    target: &dyn Dispatch,
    name: &str,
    slot: &MethodSlot,
) -> Result<MethodId, BridgeError> {
    if let Some(id) = slot.get() {
        return Ok(id);
    }
    let id = target.resolve(name).map_err(|status| {
        debug!(target: "autobridge::resolver", "Cannot resolve {}: {}", name, status);
        BridgeError::Resolution {
            name: name.to_string(),
            status,
        }
    })?;
    debug!(target: "autobridge::resolver", "Resolved {} to {}", name, id);
    // A concurrent first use may have won the race; keep whichever id landed first.
    Ok(*slot.id.get_or_init(|| id))
}

/// A named operation together with its cache slot.
#[derive(Debug)]
pub struct CallSite {
    name: &'static str,
    slot: MethodSlot,
}

impl CallSite {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            slot: MethodSlot::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn slot(&self) -> &MethodSlot {
        &self.slot
    }

    pub fn resolve(&self, target: &dyn Dispatch) -> Result<MethodId, BridgeError> {
        resolve(target, self.name, &self.slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marshal::ArgBlock;
    use crate::status::Status;
    use crate::value::Value;
    use std::cell::Cell;

    struct Names {
        round_trips: Cell<u32>,
    }

    impl Dispatch for Names {
        fn resolve(&self, name: &str) -> Result<MethodId, Status> {
            self.round_trips.set(self.round_trips.get() + 1);
            match name {
                "VerS" => Ok(MethodId(3)),
                "MoveTo" => Ok(MethodId(41)),
                _ => Err(Status::DISP_E_UNKNOWNNAME),
            }
        }

        fn invoke(&self, _id: MethodId, _args: &mut ArgBlock) -> Result<Value, Status> {
            Ok(Value::Empty)
        }
    }

    fn names() -> Names {
        Names {
            round_trips: Cell::new(0),
        }
    }

    #[test]
    fn test_one_round_trip_per_site() {
        let target = names();
        let site = CallSite::new("MoveTo");
        assert_eq!(site.resolve(&target).unwrap(), MethodId(41));
        assert_eq!(site.resolve(&target).unwrap(), MethodId(41));
        assert_eq!(target.round_trips.get(), 1);
        assert_eq!(site.slot().get(), Some(MethodId(41)));
    }

    #[test]
    fn test_sites_cache_independently() {
        let target = names();
        let a = CallSite::new("VerS");
        let b = CallSite::new("VerS");
        a.resolve(&target).unwrap();
        b.resolve(&target).unwrap();
        assert_eq!(target.round_trips.get(), 2);
    }

    #[test]
    fn test_failure_is_not_cached() {
        let target = names();
        let slot = MethodSlot::new();
        let err = resolve(&target, "NoSuchOp", &slot).unwrap_err();
        assert_eq!(
            err,
            BridgeError::Resolution {
                name: "NoSuchOp".to_string(),
                status: Status::DISP_E_UNKNOWNNAME
            }
        );
        assert_eq!(slot.get(), None);
        assert!(resolve(&target, "NoSuchOp", &slot).is_err());
        assert_eq!(target.round_trips.get(), 2);
    }
}
