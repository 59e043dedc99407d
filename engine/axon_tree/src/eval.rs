//! The runtime kernel: operator semantics on concrete values.
//!
//! Implemented exactly once and shared by constant folding and by the
//! generated closures, so a folded result can never drift from what the
//! same expression would produce at invocation time.
//!
//! Integer arithmetic is checked 64-bit; a failing operation here makes
//! folding defer to runtime, where the same failure surfaces as a typed
//! `EvalError`. Float arithmetic follows IEEE-754 (division by zero
//! yields an infinity, not an error).

use axon_diagnostic::{
    division_by_zero, exponent_out_of_range, integer_overflow, shift_out_of_range,
    unsupported_binary, unsupported_unary, EvalResult,
};
use axon_types::{
    equate_float, equate_int, greater_or_equal_float, greater_or_equal_int, greater_than_float,
    greater_than_int, less_or_equal_float, less_or_equal_int, less_than_float, less_than_int,
    Tolerance, ValueKind,
};

use crate::extensibility::FormatterSet;
use crate::op::{BinaryOp, UnaryOp};
use crate::value::{promote, Value};

// ── Dispatch ────────────────────────────────────────────────────

/// Evaluate a binary operation on two concrete values.
///
/// Mixed Integer/Numeric pairs promote to Numeric (never truncate).
/// `+` with a string on either side concatenates the rendered forms.
pub(crate) fn evaluate_binary(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    tolerance: Option<&Tolerance>,
    formatters: &FormatterSet,
) -> EvalResult<Value> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => eval_int_binary(op, *a, *b, tolerance),
        (Value::Numeric(a), Value::Numeric(b)) => eval_float_binary(op, *a, *b, tolerance),
        (Value::Integer(a), Value::Numeric(b)) => {
            eval_float_binary(op, promote(*a), *b, tolerance)
        }
        (Value::Numeric(a), Value::Integer(b)) => {
            eval_float_binary(op, *a, promote(*b), tolerance)
        }
        (Value::Boolean(a), Value::Boolean(b)) => eval_bool_binary(op, *a, *b),
        (Value::String(a), Value::String(b)) => eval_string_binary(op, a, b),
        (Value::ByteSequence(a), Value::ByteSequence(b)) => eval_bytes_binary(op, a, b),
        // String concatenation absorbs any stringifiable operand.
        (l, r)
            if op == BinaryOp::Add
                && (l.kind() == ValueKind::String || r.kind() == ValueKind::String) =>
        {
            let mut text = formatters.render(l);
            text.push_str(&formatters.render(r));
            Ok(Value::string(text))
        }
        (l, r) => Err(unsupported_binary(op.symbol(), l.kind(), r.kind())),
    }
}

/// Evaluate a unary operation on a concrete value.
pub(crate) fn evaluate_unary(op: UnaryOp, operand: &Value) -> EvalResult<Value> {
    match (op, operand) {
        (UnaryOp::Negate, Value::Integer(v)) => v
            .checked_neg()
            .map(Value::Integer)
            .ok_or_else(|| integer_overflow("negation")),
        (UnaryOp::Negate, Value::Numeric(v)) => Ok(Value::Numeric(-v)),
        (UnaryOp::Not, Value::Boolean(v)) => Ok(Value::Boolean(!v)),
        (UnaryOp::Not, Value::Integer(v)) => Ok(Value::Integer(!v)),
        (_, v) => Err(unsupported_unary(op.symbol(), v.kind())),
    }
}

// ── Integers ────────────────────────────────────────────────────

/// Shift amount validated against the 64-bit operand width.
fn checked_shift_amount(amount: i64) -> EvalResult<u32> {
    u32::try_from(amount)
        .ok()
        .filter(|&s| s < 64)
        .ok_or_else(|| shift_out_of_range(amount))
}

fn eval_int_binary(op: BinaryOp, a: i64, b: i64, tolerance: Option<&Tolerance>) -> EvalResult<Value> {
    match op {
        BinaryOp::Add => a
            .checked_add(b)
            .map(Value::Integer)
            .ok_or_else(|| integer_overflow("addition")),
        BinaryOp::Subtract => a
            .checked_sub(b)
            .map(Value::Integer)
            .ok_or_else(|| integer_overflow("subtraction")),
        BinaryOp::Multiply => a
            .checked_mul(b)
            .map(Value::Integer)
            .ok_or_else(|| integer_overflow("multiplication")),
        BinaryOp::Divide => {
            if b == 0 {
                Err(division_by_zero())
            } else {
                a.checked_div(b)
                    .map(Value::Integer)
                    .ok_or_else(|| integer_overflow("division"))
            }
        }
        BinaryOp::Power => {
            let exponent = u32::try_from(b).map_err(|_| exponent_out_of_range(b))?;
            a.checked_pow(exponent)
                .map(Value::Integer)
                .ok_or_else(|| integer_overflow("exponentiation"))
        }
        // Standard shifts: the left operand moves by the right operand.
        BinaryOp::LeftShift => Ok(Value::Integer(a.wrapping_shl(checked_shift_amount(b)?))),
        BinaryOp::RightShift => Ok(Value::Integer(a.wrapping_shr(checked_shift_amount(b)?))),
        BinaryOp::And => Ok(Value::Integer(a & b)),
        BinaryOp::Or => Ok(Value::Integer(a | b)),
        BinaryOp::Xor => Ok(Value::Integer(a ^ b)),
        BinaryOp::Equal => Ok(Value::Boolean(match tolerance {
            Some(tol) => equate_int(a, b, tol),
            None => a == b,
        })),
        BinaryOp::NotEqual => Ok(Value::Boolean(match tolerance {
            Some(tol) => !equate_int(a, b, tol),
            None => a != b,
        })),
        BinaryOp::GreaterThan => Ok(Value::Boolean(match tolerance {
            Some(tol) => greater_than_int(a, b, tol),
            None => a > b,
        })),
        BinaryOp::GreaterThanOrEqual => Ok(Value::Boolean(match tolerance {
            Some(tol) => greater_or_equal_int(a, b, tol),
            None => a >= b,
        })),
        BinaryOp::LessThan => Ok(Value::Boolean(match tolerance {
            Some(tol) => less_than_int(a, b, tol),
            None => a < b,
        })),
        BinaryOp::LessThanOrEqual => Ok(Value::Boolean(match tolerance {
            Some(tol) => less_or_equal_int(a, b, tol),
            None => a <= b,
        })),
    }
}

// ── Floats ──────────────────────────────────────────────────────

fn eval_float_binary(
    op: BinaryOp,
    a: f64,
    b: f64,
    tolerance: Option<&Tolerance>,
) -> EvalResult<Value> {
    use std::cmp::Ordering;

    match op {
        BinaryOp::Add => Ok(Value::Numeric(a + b)),
        BinaryOp::Subtract => Ok(Value::Numeric(a - b)),
        BinaryOp::Multiply => Ok(Value::Numeric(a * b)),
        BinaryOp::Divide => Ok(Value::Numeric(a / b)),
        BinaryOp::Power => Ok(Value::Numeric(a.powf(b))),
        // IEEE 754 comparisons via partial_cmp (NaN != NaN, -0.0 == 0.0).
        BinaryOp::Equal => Ok(Value::Boolean(match tolerance {
            Some(tol) => equate_float(a, b, tol),
            None => a.partial_cmp(&b) == Some(Ordering::Equal),
        })),
        BinaryOp::NotEqual => Ok(Value::Boolean(match tolerance {
            Some(tol) => !equate_float(a, b, tol),
            None => a.partial_cmp(&b) != Some(Ordering::Equal),
        })),
        BinaryOp::GreaterThan => Ok(Value::Boolean(match tolerance {
            Some(tol) => greater_than_float(a, b, tol),
            None => a.partial_cmp(&b) == Some(Ordering::Greater),
        })),
        BinaryOp::GreaterThanOrEqual => Ok(Value::Boolean(match tolerance {
            Some(tol) => greater_or_equal_float(a, b, tol),
            None => matches!(
                a.partial_cmp(&b),
                Some(Ordering::Greater | Ordering::Equal)
            ),
        })),
        BinaryOp::LessThan => Ok(Value::Boolean(match tolerance {
            Some(tol) => less_than_float(a, b, tol),
            None => a.partial_cmp(&b) == Some(Ordering::Less),
        })),
        BinaryOp::LessThanOrEqual => Ok(Value::Boolean(match tolerance {
            Some(tol) => less_or_equal_float(a, b, tol),
            None => matches!(a.partial_cmp(&b), Some(Ordering::Less | Ordering::Equal)),
        })),
        BinaryOp::LeftShift
        | BinaryOp::RightShift
        | BinaryOp::And
        | BinaryOp::Or
        | BinaryOp::Xor => Err(unsupported_binary(
            op.symbol(),
            ValueKind::Numeric,
            ValueKind::Numeric,
        )),
    }
}

// ── Booleans ────────────────────────────────────────────────────

fn eval_bool_binary(op: BinaryOp, a: bool, b: bool) -> EvalResult<Value> {
    match op {
        BinaryOp::And => Ok(Value::Boolean(a && b)),
        BinaryOp::Or => Ok(Value::Boolean(a || b)),
        BinaryOp::Xor => Ok(Value::Boolean(a ^ b)),
        BinaryOp::Equal => Ok(Value::Boolean(a == b)),
        BinaryOp::NotEqual => Ok(Value::Boolean(a != b)),
        _ => Err(unsupported_binary(
            op.symbol(),
            ValueKind::Boolean,
            ValueKind::Boolean,
        )),
    }
}

// ── Strings ─────────────────────────────────────────────────────

fn eval_string_binary(op: BinaryOp, a: &str, b: &str) -> EvalResult<Value> {
    match op {
        BinaryOp::Add => {
            let mut text = String::with_capacity(a.len() + b.len());
            text.push_str(a);
            text.push_str(b);
            Ok(Value::string(text))
        }
        BinaryOp::Equal => Ok(Value::Boolean(a == b)),
        BinaryOp::NotEqual => Ok(Value::Boolean(a != b)),
        // Lexicographic ordering.
        BinaryOp::GreaterThan => Ok(Value::Boolean(a > b)),
        BinaryOp::GreaterThanOrEqual => Ok(Value::Boolean(a >= b)),
        BinaryOp::LessThan => Ok(Value::Boolean(a < b)),
        BinaryOp::LessThanOrEqual => Ok(Value::Boolean(a <= b)),
        _ => Err(unsupported_binary(
            op.symbol(),
            ValueKind::String,
            ValueKind::String,
        )),
    }
}

// ── Byte sequences ──────────────────────────────────────────────

fn eval_bytes_binary(op: BinaryOp, a: &[u8], b: &[u8]) -> EvalResult<Value> {
    match op {
        BinaryOp::Add => {
            let mut bytes = Vec::with_capacity(a.len() + b.len());
            bytes.extend_from_slice(a);
            bytes.extend_from_slice(b);
            Ok(Value::bytes(bytes))
        }
        BinaryOp::Equal => Ok(Value::Boolean(a == b)),
        BinaryOp::NotEqual => Ok(Value::Boolean(a != b)),
        // Lexicographic ordering on the raw bytes.
        BinaryOp::GreaterThan => Ok(Value::Boolean(a > b)),
        BinaryOp::GreaterThanOrEqual => Ok(Value::Boolean(a >= b)),
        BinaryOp::LessThan => Ok(Value::Boolean(a < b)),
        BinaryOp::LessThanOrEqual => Ok(Value::Boolean(a <= b)),
        _ => Err(unsupported_binary(
            op.symbol(),
            ValueKind::ByteSequence,
            ValueKind::ByteSequence,
        )),
    }
}
