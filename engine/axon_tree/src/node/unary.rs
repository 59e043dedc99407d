//! Single-operand operation nodes.

use axon_diagnostic::{not_logically_valid, CompileResult};
use axon_types::{conversion_cost, Tolerance, TypeMask, ValueKind, IMPOSSIBLE};

use tracing::debug;

use crate::compiled::Compiled;
use crate::eval::evaluate_unary;
use crate::extensibility::FormatterSet;
use crate::node::cache::GenCache;
use crate::node::constant::ConstantNode;
use crate::node::cost::{add_costs, StrategyCost};
use crate::node::Node;
use crate::op::UnaryOp;

/// A unary operation owning its operand.
///
/// The result domain equals the operand's domain for both operators.
#[derive(Debug)]
pub struct UnaryNode {
    op: UnaryOp,
    operand: Box<Node>,
    cache: GenCache,
}

impl UnaryNode {
    /// Domains the operator accepts.
    fn legal_operand_mask(op: UnaryOp) -> TypeMask {
        match op {
            UnaryOp::Negate => TypeMask::NUMERIC_FAMILY,
            UnaryOp::Not => TypeMask::BOOLEAN | TypeMask::INTEGER,
        }
    }

    /// Build a unary operation, narrowing the operand to the operator's
    /// legal domains and folding a constant operand immediately.
    ///
    /// A fold whose evaluation fails (e.g. negating `i64::MIN`) is left
    /// unfolded and deferred to runtime.
    pub fn build(op: UnaryOp, operand: Node, formatters: &FormatterSet) -> CompileResult<Node> {
        operand.verify_possible_type(Self::legal_operand_mask(op))?;

        if let Some(value) = operand.constant_value() {
            if let Ok(folded) = evaluate_unary(op, value) {
                debug!(%op, "folded constant operand");
                return ConstantNode::new(folded, formatters).map(Node::Constant);
            }
        }

        Ok(Node::Unary(UnaryNode {
            op,
            operand: Box::new(operand),
            cache: GenCache::new(),
        }))
    }

    /// The operator.
    pub fn op(&self) -> UnaryOp {
        self.op
    }

    pub(crate) fn possible_types(&self) -> TypeMask {
        self.operand.natural_types() & Self::legal_operand_mask(self.op)
    }

    pub(crate) fn requires_preserved_form(&self) -> bool {
        self.operand.requires_preserved_form()
    }

    pub(crate) fn verify_possible_type(&self, mask: TypeMask) -> CompileResult<TypeMask> {
        // Result domain == operand domain, so the constraint pushes
        // straight through.
        self.operand
            .verify_possible_type(mask & Self::legal_operand_mask(self.op))
    }

    pub(crate) fn strategy_cost(&self, target: ValueKind) -> CompileResult<StrategyCost> {
        let mut best: Option<StrategyCost> = None;
        for via in self.possible_types().iter_kinds() {
            let own = conversion_cost(via, target);
            if own == IMPOSSIBLE {
                continue;
            }
            let Ok(operand) = self.operand.strategy_cost(via) else {
                continue;
            };
            let total = add_costs(own, operand.cost);
            if best.is_none_or(|b| total < b.cost) {
                best = Some(StrategyCost { cost: total, via });
            }
        }
        best.ok_or_else(|| {
            not_logically_valid(format!("`{}` cannot materialize as {target}", self.op))
        })
    }

    pub(crate) fn generate(
        &self,
        target: ValueKind,
        tolerance: Option<&Tolerance>,
        formatters: &FormatterSet,
    ) -> CompileResult<Compiled> {
        self.cache
            .get_or_try_insert((target, tolerance.is_some()), || {
                let strategy = self.strategy_cost(target)?;
                let inner = self.operand.generate(strategy.via, tolerance, formatters)?;
                let op = self.op;
                Compiled::new(strategy.via, move |bindings| {
                    let value = inner.invoke(bindings)?;
                    evaluate_unary(op, &value)
                })
                .converted(target, formatters)
            })
    }

    pub(crate) fn deep_clone(&self, registry: &super::ParameterRegistry) -> UnaryNode {
        UnaryNode {
            op: self.op,
            operand: Box::new(self.operand.deep_clone(registry)),
            cache: GenCache::new(),
        }
    }
}
