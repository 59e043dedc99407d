//! Top-level compilation for the Axon expression engine.
//!
//! The parser (an external collaborator) hands this crate a forest of
//! named subexpression bodies plus a factory that turns one body into a
//! node tree. The optimizer decides extraction order: independent
//! symbols build first, and those that fold to constants become visible
//! to the symbols referencing them. The session then builds the root
//! tree and wraps it as a [`CompiledExpression`], from which reusable,
//! thread-safe [`Evaluator`] artifacts are generated per target domain.

mod optimizer;
mod session;

pub use optimizer::{SymbolFactory, SymbolOptimizer};
pub use session::{BuildContext, CompiledExpression, Evaluator, NodeFactory, Session};

// The tree crate is this crate's vocabulary; re-export the surface the
// parser integration needs.
pub use axon_tree::{
    Bindings, BinaryNode, BinaryOp, CompileError, CompileResult, ConstantNode, EvalError,
    EvalResult, FormatterSet, FunctionBody, FunctionDescriptor, FunctionNode, FunctionResolver,
    NoFunctions, Node, ParameterRegistry, Tolerance, TypeMask, UnaryNode, UnaryOp, Value,
    ValueKind,
};
