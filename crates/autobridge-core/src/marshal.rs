//! Argument marshaling: ordered argument blocks with output slots.
//!
//! A block is sent to the component exactly in the order it was packed. Call sites
//! place the argument of the last declared parameter first; [`ArgList`] does that
//! reversal for callers that think in declaration order.

use tracing::debug;

use crate::error::BridgeError;
use crate::value::{ResultKind, Value};

/// Direction tag of one argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Value is read by the component only.
    In,
    /// Empty slot the component writes into.
    Out,
    /// Slot seeded with a value that the component may overwrite.
    InOut,
}

impl Direction {
    pub fn is_output(self) -> bool {
        !matches!(self, Direction::In)
    }
}

/// One slot of an argument block.
#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    pub value: Value,
    pub direction: Direction,
}

impl Arg {
    pub fn input(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            direction: Direction::In,
        }
    }

    pub fn output() -> Self {
        Self {
            value: Value::Empty,
            direction: Direction::Out,
        }
    }

    pub fn in_out(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            direction: Direction::InOut,
        }
    }

    /// Write a result into this slot. Input-only slots are left untouched.
    pub fn write(&mut self, value: Value) -> bool {
        if self.direction.is_output() {
            self.value = value;
            true
        } else {
            false
        }
    }
}

/// Ordered, typed argument block in wire order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArgBlock {
    args: Vec<Arg>,
}

impl ArgBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_args(args: Vec<Arg>) -> Self {
        Self { args }
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    pub fn args_mut(&mut self) -> &mut [Arg] {
        &mut self.args
    }

    pub fn get(&self, index: usize) -> Option<&Arg> {
        self.args.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Arg> {
        self.args.get_mut(index)
    }

    /// Number of output-capturing slots.
    pub fn output_count(&self) -> usize {
        self.args.iter().filter(|a| a.direction.is_output()).count()
    }

    /// Input values in wire order (output slots skipped).
    pub fn inputs(&self) -> impl Iterator<Item = &Value> {
        self.args
            .iter()
            .filter(|a| a.direction == Direction::In)
            .map(|a| &a.value)
    }
}

/// Build a block from parallel value/direction lists, preserving their order.
///
/// `Out` slots drop the supplied value and start empty; `InOut` slots keep it.
pub fn pack(values: Vec<Value>, directions: &[Direction]) -> Result<ArgBlock, BridgeError> {
    if values.len() != directions.len() {
        return Err(BridgeError::Marshal {
            values: values.len(),
            directions: directions.len(),
        });
    }
    let args = values
        .into_iter()
        .zip(directions.iter().copied())
        .map(|(value, direction)| match direction {
            Direction::In => Arg::input(value),
            Direction::Out => Arg::output(),
            Direction::InOut => Arg::in_out(value),
        })
        .collect();
    Ok(ArgBlock { args })
}

/// Split an invoked block into the primary value, read as `kind`, and the output slots.
///
/// Outputs come back in block order. `name` is only used for logging.
pub fn unpack(name: &str, block: ArgBlock, ret: Value, kind: ResultKind) -> (Value, Vec<Value>) {
    let value = coerce(name, ret, kind);
    let outputs = block
        .args
        .into_iter()
        .filter(|a| a.direction.is_output())
        .map(|a| a.value)
        .collect();
    (value, outputs)
}

/// Read `ret` as `kind`, the way a zeroed result slot is read through the declared member.
///
/// Integer kinds reinterpret each other: same-width values are bit-cast, 32-bit values
/// widen with zero high bits and 64-bit values truncate. Anything else that does not
/// match becomes the zero of `kind`.
fn coerce(name: &str, ret: Value, kind: ResultKind) -> Value {
    if kind == ResultKind::Any {
        return ret;
    }
    let found = match ret.kind() {
        None => return Value::zero(kind),
        Some(found) if found == kind => return ret,
        Some(found) => found,
    };
    match (integer_bits(&ret), kind) {
        (Some(bits), ResultKind::I32) => Value::I32(bits as u32 as i32),
        (Some(bits), ResultKind::U32) => Value::U32(bits as u32),
        (Some(bits), ResultKind::I64) => Value::I64(bits as i64),
        (Some(bits), ResultKind::U64) => Value::U64(bits),
        _ => {
            debug!(
                target: "autobridge::marshal",
                "`{}` returned {} where {} was declared, reading zero",
                name,
                found,
                kind
            );
            Value::zero(kind)
        }
    }
}

/// Raw 64-bit payload of an integer value.
fn integer_bits(value: &Value) -> Option<u64> {
    match *value {
        Value::I32(v) => Some(u64::from(v as u32)),
        Value::U32(v) => Some(u64::from(v)),
        Value::I64(v) => Some(v as u64),
        Value::U64(v) => Some(v),
        _ => None,
    }
}

/// Declaration-order argument builder.
///
/// Arguments are pushed in the order the operation declares its parameters;
/// [`ArgList::into_block`] emits them last-parameter-first.
#[derive(Debug, Clone, Default)]
pub struct ArgList {
    args: Vec<Arg>,
}

impl ArgList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(Arg::input(value));
        self
    }

    pub fn out(mut self) -> Self {
        self.args.push(Arg::output());
        self
    }

    pub fn in_out(mut self, value: impl Into<Value>) -> Self {
        self.args.push(Arg::in_out(value));
        self
    }

    pub fn into_block(mut self) -> ArgBlock {
        self.args.reverse();
        ArgBlock { args: self.args }
    }
}

/// Output values of one call, in declaration order.
///
/// Built from the block-order outputs of [`unpack`] for blocks produced by [`ArgList`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Outputs(Vec<Value>);

impl Outputs {
    pub fn from_block_order(mut outputs: Vec<Value>) -> Self {
        outputs.reverse();
        Self(outputs)
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn i32_or(&self, index: usize, default: i32) -> i32 {
        self.get(index).and_then(Value::as_i32).unwrap_or(default)
    }

    pub fn text_or_default(&self, index: usize) -> String {
        self.get(index)
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_preserves_order_and_directions() {
        let block = pack(
            vec![Value::I32(3), Value::I32(99), Value::from("a")],
            &[Direction::In, Direction::Out, Direction::InOut],
        )
        .unwrap();
        assert_eq!(block.len(), 3);
        assert_eq!(block.args()[0], Arg::input(3i32));
        assert_eq!(block.args()[1], Arg::output());
        assert_eq!(block.args()[2], Arg::in_out("a"));
        assert_eq!(block.output_count(), 2);
    }

    #[test]
    fn test_pack_length_mismatch() {
        let err = pack(vec![Value::I32(1)], &[]).unwrap_err();
        assert_eq!(err, BridgeError::Marshal { values: 1, directions: 0 });
    }

    #[test]
    fn test_unpack_reads_integers_through_declared_kind() {
        let read = |ret, kind| unpack("Op", ArgBlock::new(), ret, kind).0;
        assert_eq!(read(Value::I32(0x1000), ResultKind::I64), Value::I64(0x1000));
        assert_eq!(read(Value::I32(7), ResultKind::U32), Value::U32(7));
        assert_eq!(read(Value::I32(-1), ResultKind::U32), Value::U32(u32::MAX));
        assert_eq!(read(Value::I32(-1), ResultKind::I64), Value::I64(0xffff_ffff));
        assert_eq!(read(Value::U64(u64::MAX), ResultKind::I64), Value::I64(-1));
        assert_eq!(read(Value::I64((1 << 40) | 5), ResultKind::I32), Value::I32(5));
        assert_eq!(read(Value::I64(1 << 40), ResultKind::I64), Value::I64(1 << 40));
    }

    #[test]
    fn test_unpack_unreadable_return_is_zero_of_kind() {
        let (v, _) = unpack("Op", ArgBlock::new(), Value::from("12"), ResultKind::I32);
        assert_eq!(v, Value::I32(0));
        let (v, _) = unpack("Op", ArgBlock::new(), Value::I32(3), ResultKind::Text);
        assert_eq!(v, Value::Text(String::new()));
    }

    #[test]
    fn test_unpack_empty_return_is_zero_of_kind() {
        let (v, outs) = unpack("Op", ArgBlock::new(), Value::Empty, ResultKind::Text);
        assert_eq!(v, Value::Text(String::new()));
        assert!(outs.is_empty());
    }

    #[test]
    fn test_unpack_any_keeps_tag() {
        let (v, _) = unpack("Op", ArgBlock::new(), Value::from("ff00ff"), ResultKind::Any);
        assert_eq!(v, Value::from("ff00ff"));
    }

    #[test]
    fn test_arg_write_only_into_outputs() {
        let mut input = Arg::input(1i32);
        assert!(!input.write(Value::I32(2)));
        assert_eq!(input.value, Value::I32(1));
        let mut out = Arg::output();
        assert!(out.write(Value::I32(2)));
        assert_eq!(out.value, Value::I32(2));
    }

    #[test]
    fn test_arg_list_reverses_to_wire_order() {
        let block = ArgList::new().arg(10i32).arg("mod").out().into_block();
        assert_eq!(block.args()[0], Arg::output());
        assert_eq!(block.args()[1], Arg::input("mod"));
        assert_eq!(block.args()[2], Arg::input(10i32));
    }

    #[test]
    fn test_outputs_back_in_declaration_order() {
        let outs = Outputs::from_block_order(vec![Value::I32(2), Value::I32(1)]);
        assert_eq!(outs.i32_or(0, -1), 1);
        assert_eq!(outs.i32_or(1, -1), 2);
        assert_eq!(outs.i32_or(2, -1), -1);
        assert_eq!(outs.text_or_default(0), "");
    }
}
