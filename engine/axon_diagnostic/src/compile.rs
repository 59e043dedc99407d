//! Compile-time failure taxonomy.

use axon_types::{ToleranceError, TypeMask, ValueKind};
use thiserror::Error;

/// A failure while building, verifying or generating an expression tree.
///
/// All variants are fatal to the enclosing compile and are never retried.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Operand types admit no legal combination, a constant cannot
    /// present as the requested domain, or generation was requested for
    /// a type outside a node's verified possible-type set.
    #[error("expression is not logically valid: {reason}")]
    NotLogicallyValid {
        /// What made the expression invalid.
        reason: String,
    },

    /// The cost table reports infinite cost for a required conversion.
    ///
    /// A refinement of `NotLogicallyValid` carrying both endpoints.
    #[error("a {from} value cannot present as {to}")]
    ConversionImpossible {
        /// Domain the value actually has.
        from: ValueKind,
        /// Domain that was requested.
        to: ValueKind,
    },

    /// A precondition was violated at the call boundary, before any tree
    /// mutation.
    #[error("malformed argument `{argument}`: {reason}")]
    MalformedArgument {
        /// Name of the offending argument.
        argument: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// An invariant the engine itself must guarantee was violated.
    ///
    /// A defect, not a user-facing condition; compilation aborts rather
    /// than producing a partially-built artifact.
    #[error("internal inconsistency: {0}")]
    Internal(String),
}

/// Result alias used throughout compilation.
pub type CompileResult<T> = Result<T, CompileError>;

impl From<ToleranceError> for CompileError {
    fn from(err: ToleranceError) -> Self {
        malformed_argument("tolerance", err.to_string())
    }
}

/// Operand or target types admit no legal combination.
pub fn not_logically_valid(reason: impl Into<String>) -> CompileError {
    CompileError::NotLogicallyValid {
        reason: reason.into(),
    }
}

/// A verification intersection came up empty.
pub fn no_possible_type(required: TypeMask, available: TypeMask) -> CompileError {
    CompileError::NotLogicallyValid {
        reason: format!("required {required}, but only {available} is possible"),
    }
}

/// The lattice forbids the required conversion.
pub fn conversion_impossible(from: ValueKind, to: ValueKind) -> CompileError {
    CompileError::ConversionImpossible { from, to }
}

/// A call-boundary precondition was violated.
pub fn malformed_argument(argument: &'static str, reason: impl Into<String>) -> CompileError {
    CompileError::MalformedArgument {
        argument,
        reason: reason.into(),
    }
}

/// An internal invariant did not hold.
pub fn internal(reason: impl Into<String>) -> CompileError {
    CompileError::Internal(reason.into())
}
