//! The node abstraction.
//!
//! A tree node is one of five families — constant, parameter, unary,
//! binary, function — behind a closed variant. The type set is fixed, so
//! every shared operation dispatches by pattern matching; there are no
//! trait objects in the tree itself.
//!
//! Two views of a node's types exist while resolution is in flight:
//!
//! - `natural_types` — domains the node can produce directly, before
//!   any conversion (a constant's canonical domain; a parameter's
//!   still-narrowing slot mask; an operation's derived result mask).
//! - `possible_types` — domains the node can legally present as, i.e.
//!   the natural set widened through the conversion lattice.
//!
//! Operator compatibility reasons about natural types; generation
//! targets and strategy costs reason about possible types.

mod binary;
mod cache;
mod constant;
mod cost;
mod func;
mod parameter;
mod registry;
mod unary;

pub use binary::BinaryNode;
pub use constant::ConstantNode;
pub use cost::{select_strategy, StrategyCost};
pub use func::FunctionNode;
pub use parameter::ParameterNode;
pub use registry::ParameterRegistry;
pub use unary::UnaryNode;

use axon_diagnostic::CompileResult;
use axon_types::{legal_conversions, Tolerance, TypeMask, ValueKind};

use crate::compiled::Compiled;
use crate::extensibility::FormatterSet;
use crate::value::Value;

/// A node in an expression tree.
///
/// Created once during bottom-up construction; a constructor may hand
/// back a different (simpler) node than the operation it was asked for —
/// folding replaces nodes wholesale rather than mutating them.
#[derive(Debug)]
pub enum Node {
    /// Typed literal with precomputed representations.
    Constant(ConstantNode),
    /// Named slot resolved through the shared registry.
    Parameter(ParameterNode),
    /// Single-operand operation.
    Unary(UnaryNode),
    /// Two-operand operation.
    Binary(BinaryNode),
    /// Resolved function call with 0–3 operands.
    Function(Box<FunctionNode>),
}

impl Node {
    /// Literal node with precomputed representations.
    pub fn constant(value: Value, formatters: &FormatterSet) -> CompileResult<Node> {
        ConstantNode::new(value, formatters).map(Node::Constant)
    }

    /// Reference to a named parameter, advertised on first use.
    pub fn parameter(registry: &ParameterRegistry, name: &str) -> CompileResult<Node> {
        ParameterNode::new(registry, name).map(Node::Parameter)
    }

    /// Domains this node can produce directly, before conversion.
    pub(crate) fn natural_types(&self) -> TypeMask {
        match self {
            Node::Constant(n) => TypeMask::of(n.kind()),
            Node::Parameter(n) => n.possible_types(),
            Node::Unary(n) => n.possible_types(),
            Node::Binary(n) => n.possible_types(),
            Node::Function(n) => n.possible_types(),
        }
    }

    /// Domains this node can legally present as — the natural set
    /// widened through the conversion lattice.
    pub fn possible_types(&self) -> TypeMask {
        let mut mask = TypeMask::empty();
        for kind in self.natural_types().iter_kinds() {
            mask |= legal_conversions(kind);
        }
        mask
    }

    /// Whether this node has already folded to a literal.
    pub fn is_constant(&self) -> bool {
        matches!(self, Node::Constant(_))
    }

    /// Canonical value, when this node is a constant.
    pub fn constant_value(&self) -> Option<&Value> {
        match self {
            Node::Constant(n) => Some(n.value()),
            _ => None,
        }
    }

    /// Whether this subtree must keep its original form — true anywhere
    /// an impure function participates, which also blocks folding above
    /// it.
    pub fn requires_preserved_form(&self) -> bool {
        match self {
            Node::Constant(_) | Node::Parameter(_) => false,
            Node::Unary(n) => n.requires_preserved_form(),
            Node::Binary(n) => n.requires_preserved_form(),
            Node::Function(n) => n.requires_preserved_form(),
        }
    }

    /// Intersect this node's natural types with `mask`, persisting the
    /// narrowing where the node can carry it (parameter slots narrow in
    /// the registry; operations push the constraint into their
    /// operands). An empty intersection fails the compile.
    pub fn verify_possible_type(&self, mask: TypeMask) -> CompileResult<TypeMask> {
        match self {
            Node::Constant(n) => n.verify_possible_type(mask),
            Node::Parameter(n) => n.verify_possible_type(mask),
            Node::Unary(n) => n.verify_possible_type(mask),
            Node::Binary(n) => n.verify_possible_type(mask),
            Node::Function(n) => n.verify_possible_type(mask),
        }
    }

    /// Cost of materializing this node as `target`, including operand
    /// costs beneath operations.
    pub fn strategy_cost(&self, target: ValueKind) -> CompileResult<StrategyCost> {
        match self {
            Node::Constant(n) => select_strategy(TypeMask::of(n.kind()), target),
            Node::Parameter(n) => select_strategy(n.possible_types(), target),
            Node::Unary(n) => n.strategy_cost(target),
            Node::Binary(n) => n.strategy_cost(target),
            Node::Function(n) => n.strategy_cost(target),
        }
    }

    /// The cheapest target domain overall and its strategy.
    ///
    /// A pure function of the costed-type map: targets are scanned in
    /// ordinal order and replaced only on strictly smaller cost, so the
    /// result is deterministic across runs.
    pub fn least_costly_strategy(&self) -> CompileResult<(ValueKind, StrategyCost)> {
        let mut best: Option<(ValueKind, StrategyCost)> = None;
        for target in ValueKind::ALL {
            let Ok(strategy) = self.strategy_cost(target) else {
                continue;
            };
            if best.is_none_or(|(_, b)| strategy.cost < b.cost) {
                best = Some((target, strategy));
            }
        }
        best.ok_or_else(|| {
            axon_diagnostic::internal("node has no materializable target domain".to_string())
        })
    }

    /// Generate code producing this node's value as `target`.
    ///
    /// Memoized per (target, tolerance presence): repeat calls return
    /// the cached artifact. Requesting a target outside the possible set
    /// fails the compile and is never recovered internally.
    pub fn generate(
        &self,
        target: ValueKind,
        tolerance: Option<&Tolerance>,
        formatters: &FormatterSet,
    ) -> CompileResult<Compiled> {
        match self {
            Node::Constant(n) => n.generate(target),
            Node::Parameter(n) => n.generate(target, formatters),
            Node::Unary(n) => n.generate(target, tolerance, formatters),
            Node::Binary(n) => n.generate(target, tolerance, formatters),
            Node::Function(n) => n.generate(target, tolerance, formatters),
        }
    }

    /// Structurally identical tree resolving parameters against
    /// `registry`.
    ///
    /// Slot state carries over, generation caches do not: the clone
    /// shares no mutable state with the original and compiles
    /// independently.
    pub fn deep_clone(&self, registry: &ParameterRegistry) -> Node {
        match self {
            Node::Constant(n) => Node::Constant(n.clone()),
            Node::Parameter(n) => Node::Parameter(n.deep_clone(registry)),
            Node::Unary(n) => Node::Unary(n.deep_clone(registry)),
            Node::Binary(n) => Node::Binary(n.deep_clone(registry)),
            Node::Function(n) => Node::Function(Box::new(n.deep_clone(registry))),
        }
    }
}
