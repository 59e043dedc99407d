//! Typed errors for the Axon expression engine.
//!
//! Two taxonomies, deliberately separate so callers can distinguish user
//! input problems from engine defects and from runtime failures:
//!
//! - [`CompileError`] — everything that can go wrong while building,
//!   verifying or generating an expression tree. Always fatal to the
//!   enclosing compile; partial trees are discarded wholesale.
//! - [`EvalError`] — failures raised while invoking a compiled artifact
//!   with a concrete set of parameter bindings.
//!
//! Factory functions are the preferred construction path: call sites
//! read as `Err(division_by_zero())` rather than spelling variants out.

mod compile;
mod eval;

pub use compile::{
    conversion_impossible, internal, malformed_argument, no_possible_type, not_logically_valid,
    CompileError, CompileResult,
};
pub use eval::{
    binding_kind_mismatch, division_by_zero, exponent_out_of_range, function_failure,
    integer_overflow, missing_binding, shift_out_of_range, unsupported_binary, unsupported_unary,
    EvalError, EvalResult,
};
