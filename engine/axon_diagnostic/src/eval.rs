//! Invocation-time failure taxonomy.

use axon_types::ValueKind;
use thiserror::Error;

/// A failure raised while invoking a compiled artifact.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum EvalError {
    /// The binding map has no entry for a referenced parameter.
    #[error("no binding supplied for parameter `{0}`")]
    MissingBinding(String),

    /// A binding was supplied in a domain the lattice cannot convert to
    /// the parameter's compiled domain.
    #[error("binding `{name}` is {found}, which cannot present as {expected}")]
    BindingKindMismatch {
        /// Parameter name.
        name: String,
        /// Domain the compiled accessor expects.
        expected: ValueKind,
        /// Domain actually supplied.
        found: ValueKind,
    },

    /// Integer or integer-like division with a zero divisor.
    #[error("division by zero")]
    DivisionByZero,

    /// A checked 64-bit operation overflowed.
    #[error("integer overflow in {0}")]
    IntegerOverflow(&'static str),

    /// Shift amount outside `0..=63`.
    #[error("shift amount {0} out of range (0-63)")]
    ShiftOutOfRange(i64),

    /// A runtime conversion the lattice forbids was requested.
    #[error("a {from} value cannot present as {to}")]
    ConversionImpossible {
        /// Domain the value actually has.
        from: ValueKind,
        /// Domain that was requested.
        to: ValueKind,
    },

    /// Integer exponent outside `0..=u32::MAX`.
    #[error("integer exponent {0} out of range")]
    ExponentOutOfRange(i64),

    /// A binary operator was applied to a domain pair it is not defined
    /// for.
    #[error("operator `{operator}` is not defined for {left} and {right}")]
    UnsupportedBinary {
        /// Operator symbol.
        operator: &'static str,
        /// Left operand domain.
        left: ValueKind,
        /// Right operand domain.
        right: ValueKind,
    },

    /// A unary operator was applied to a domain it is not defined for.
    #[error("operator `{operator}` is not defined for {operand}")]
    UnsupportedUnary {
        /// Operator symbol.
        operator: &'static str,
        /// Operand domain.
        operand: ValueKind,
    },

    /// A user-supplied function reported a failure.
    #[error("function `{name}` failed: {reason}")]
    Function {
        /// Function name as resolved.
        name: String,
        /// Failure description from the function body.
        reason: String,
    },
}

/// Result alias used by compiled artifacts and the runtime kernel.
pub type EvalResult<T> = Result<T, EvalError>;

/// No binding for a referenced parameter.
pub fn missing_binding(name: impl Into<String>) -> EvalError {
    EvalError::MissingBinding(name.into())
}

/// A binding arrived in an inconvertible domain.
pub fn binding_kind_mismatch(
    name: impl Into<String>,
    expected: ValueKind,
    found: ValueKind,
) -> EvalError {
    EvalError::BindingKindMismatch {
        name: name.into(),
        expected,
        found,
    }
}

/// Zero divisor in integer division or remainder.
pub fn division_by_zero() -> EvalError {
    EvalError::DivisionByZero
}

/// A checked 64-bit operation overflowed.
pub fn integer_overflow(operation: &'static str) -> EvalError {
    EvalError::IntegerOverflow(operation)
}

/// Shift amount outside the 64-bit operand width.
pub fn shift_out_of_range(amount: i64) -> EvalError {
    EvalError::ShiftOutOfRange(amount)
}

/// Integer exponent that cannot be applied to a 64-bit base.
pub fn exponent_out_of_range(exponent: i64) -> EvalError {
    EvalError::ExponentOutOfRange(exponent)
}

/// Operator applied to a domain pair it is not defined for.
pub fn unsupported_binary(operator: &'static str, left: ValueKind, right: ValueKind) -> EvalError {
    EvalError::UnsupportedBinary {
        operator,
        left,
        right,
    }
}

/// Operator applied to a domain it is not defined for.
pub fn unsupported_unary(operator: &'static str, operand: ValueKind) -> EvalError {
    EvalError::UnsupportedUnary { operator, operand }
}

/// A user function reported a failure.
pub fn function_failure(name: impl Into<String>, reason: impl Into<String>) -> EvalError {
    EvalError::Function {
        name: name.into(),
        reason: reason.into(),
    }
}
