//! Expression tree core for the Axon engine.
//!
//! This crate owns the node abstraction and everything that happens to a
//! tree between construction and code generation:
//!
//! - `Value` — the runtime representation of the five domains, plus the
//!   lattice conversions between them.
//! - `Node` — a closed variant over constant, parameter and operation
//!   nodes. Constructors verify operand compatibility, narrow parameter
//!   types through the shared registry, and fold constant subtrees
//!   immediately.
//! - Code generation — `Node::generate` lazily produces a [`Compiled`]
//!   closure per (target domain, tolerance presence), memoized per node.
//!   The artifact captures no node state and is safe to invoke from many
//!   threads with independent [`Bindings`].
//!
//! The type set is fixed (not user-extensible), so dispatch is plain
//! pattern matching over enums rather than trait objects — both for the
//! operators and for the node families themselves.

mod compiled;
mod eval;
mod extensibility;
mod node;
mod op;
mod value;

pub use compiled::{Bindings, Compiled};
pub use extensibility::{
    FormatterSet, FunctionBody, FunctionDescriptor, FunctionResolver, NoFunctions, StringFormatter,
};
pub use node::{
    select_strategy, BinaryNode, ConstantNode, FunctionNode, Node, ParameterRegistry,
    ParameterNode, StrategyCost, UnaryNode,
};
pub use op::{BinaryOp, UnaryOp};
pub use value::Value;

// Re-export the error surface so downstream crates take one dependency.
pub use axon_diagnostic::{CompileError, CompileResult, EvalError, EvalResult};
pub use axon_types::{Tolerance, TypeMask, ValueKind};
