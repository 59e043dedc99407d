//! Runtime values for the five domains.

use std::fmt::Write as _;
use std::sync::Arc;

use axon_diagnostic::EvalResult;
use axon_types::{convertible, ValueKind};

use crate::extensibility::FormatterSet;

/// A runtime value in exactly one domain.
///
/// Payloads are reference-counted so values clone cheaply and compiled
/// closures holding them stay `Send + Sync`.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Truth value.
    Boolean(bool),
    /// 64-bit signed integer.
    Integer(i64),
    /// IEEE-754 double.
    Numeric(f64),
    /// Immutable byte string.
    ByteSequence(Arc<[u8]>),
    /// UTF-8 text.
    String(Arc<str>),
}

impl Value {
    /// Byte-sequence value from anything that can become a shared slice.
    pub fn bytes(bytes: impl Into<Arc<[u8]>>) -> Value {
        Value::ByteSequence(bytes.into())
    }

    /// String value from anything that can become shared text.
    pub fn string(text: impl Into<Arc<str>>) -> Value {
        Value::String(text.into())
    }

    /// The domain this value inhabits.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Integer(_) => ValueKind::Integer,
            Value::Numeric(_) => ValueKind::Numeric,
            Value::ByteSequence(_) => ValueKind::ByteSequence,
            Value::String(_) => ValueKind::String,
        }
    }

    /// Present this value as `target`, following the lattice.
    ///
    /// Integer widens to numeric; both numeric domains encode to
    /// little-endian bytes; anything renders as a string through the
    /// formatter strategies. Conversions the lattice forbids fail with
    /// `ConversionImpossible`.
    pub fn convert(&self, target: ValueKind, formatters: &FormatterSet) -> EvalResult<Value> {
        if self.kind() == target {
            return Ok(self.clone());
        }
        if !convertible(self.kind(), target) {
            return Err(axon_diagnostic::EvalError::ConversionImpossible {
                from: self.kind(),
                to: target,
            });
        }
        let converted = match (self, target) {
            (Value::Integer(v), ValueKind::Numeric) => Value::Numeric(promote(*v)),
            (Value::Integer(v), ValueKind::ByteSequence) => Value::bytes(v.to_le_bytes().to_vec()),
            (Value::Numeric(v), ValueKind::ByteSequence) => Value::bytes(v.to_le_bytes().to_vec()),
            (value, ValueKind::String) => Value::string(formatters.render(value)),
            // `convertible` admits exactly the arms above.
            _ => {
                return Err(axon_diagnostic::EvalError::ConversionImpossible {
                    from: self.kind(),
                    to: target,
                })
            }
        };
        Ok(converted)
    }

    /// The built-in string rendering, used when no formatter strategy
    /// claims the value.
    pub(crate) fn default_render(&self) -> String {
        match self {
            Value::Boolean(v) => v.to_string(),
            Value::Integer(v) => v.to_string(),
            // `Display` for f64 renders 3.0 as "3" — integral numerics
            // stringify without a trailing fraction.
            Value::Numeric(v) => v.to_string(),
            Value::ByteSequence(bytes) => {
                let mut out = String::with_capacity(2 + bytes.len() * 2);
                out.push_str("0x");
                for byte in bytes.iter() {
                    let _ = write!(out, "{byte:02x}");
                }
                out
            }
            Value::String(text) => text.to_string(),
        }
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "integer-to-numeric widening is the lattice's defined conversion"
)]
pub(crate) fn promote(value: i64) -> f64 {
    value as f64
}
