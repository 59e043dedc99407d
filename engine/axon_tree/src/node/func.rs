//! Resolved function-call nodes.
//!
//! The nonary through ternary function families share one node: the
//! descriptor fixes the arity (0–3), the domains each operand position
//! accepts, and the domains the body may return. The core never looks
//! up functions itself — descriptors arrive through the injected
//! resolver.

use axon_diagnostic::{
    internal, malformed_argument, no_possible_type, not_logically_valid, CompileResult,
};
use axon_types::{convertible_sources, Tolerance, TypeMask, ValueKind};
use smallvec::SmallVec;

use tracing::debug;

use crate::compiled::Compiled;
use crate::extensibility::{FormatterSet, FunctionDescriptor};
use crate::node::cache::GenCache;
use crate::node::constant::ConstantNode;
use crate::node::cost::{add_costs, select_strategy, StrategyCost};
use crate::node::Node;
use crate::value::Value;

/// A function call bound to its resolved descriptor.
#[derive(Debug)]
pub struct FunctionNode {
    descriptor: FunctionDescriptor,
    operands: SmallVec<[Node; 3]>,
    cache: GenCache,
}

impl FunctionNode {
    /// Build a call node.
    ///
    /// Operand counts must match the descriptor's arity; each operand
    /// narrows against the domains its position accepts (through the
    /// lattice — an integer operand satisfies a numeric-only position).
    /// Pure functions over constant operands fold through the body at
    /// build time; impure functions never fold.
    pub fn build(
        descriptor: FunctionDescriptor,
        operands: impl IntoIterator<Item = Node>,
        formatters: &FormatterSet,
    ) -> CompileResult<Node> {
        let operands: SmallVec<[Node; 3]> = operands.into_iter().collect();
        if operands.len() != descriptor.arity() {
            return Err(malformed_argument(
                "operands",
                format!(
                    "function `{}` takes {} operand(s), got {}",
                    descriptor.name(),
                    descriptor.arity(),
                    operands.len()
                ),
            ));
        }

        for (index, operand) in operands.iter().enumerate() {
            let mask = parameter_mask(&descriptor, index)?;
            operand.verify_possible_type(accepted_sources(mask))?;
        }

        if descriptor.is_pure() && operands.iter().all(Node::is_constant) {
            let mut args: Vec<Value> = Vec::with_capacity(operands.len());
            for (index, operand) in operands.iter().enumerate() {
                let mask = parameter_mask(&descriptor, index)?;
                let Some(value) = operand.constant_value() else {
                    return Err(internal("constant operand without a value".to_string()));
                };
                args.push(coerce_argument(value, mask, formatters)?);
            }
            if let Ok(folded) = descriptor.call(&args) {
                debug!(function = descriptor.name(), "folded constant call");
                return ConstantNode::new(folded, formatters).map(Node::Constant);
            }
        }

        Ok(Node::Function(Box::new(FunctionNode {
            descriptor,
            operands,
            cache: GenCache::new(),
        })))
    }

    /// The resolved descriptor.
    pub fn descriptor(&self) -> &FunctionDescriptor {
        &self.descriptor
    }

    pub(crate) fn possible_types(&self) -> TypeMask {
        self.descriptor.result_mask()
    }

    pub(crate) fn requires_preserved_form(&self) -> bool {
        !self.descriptor.is_pure()
            || self.operands.iter().any(Node::requires_preserved_form)
    }

    pub(crate) fn verify_possible_type(&self, mask: TypeMask) -> CompileResult<TypeMask> {
        let possible = self.possible_types();
        let narrowed = possible & mask;
        if narrowed.is_empty() {
            return Err(no_possible_type(mask, possible));
        }
        Ok(narrowed)
    }

    pub(crate) fn strategy_cost(&self, target: ValueKind) -> CompileResult<StrategyCost> {
        let own = select_strategy(self.descriptor.result_mask(), target)?;
        let mut total = own.cost;
        for (index, operand) in self.operands.iter().enumerate() {
            let mask = parameter_mask(&self.descriptor, index)?;
            let (_, cost) = cheapest_argument_kind(operand, mask)?;
            total = add_costs(total, cost);
        }
        Ok(StrategyCost {
            cost: total,
            via: own.via,
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
                // A target the result domains cannot reach fails here,
                // before any operand code is generated.
                select_strategy(self.descriptor.result_mask(), target)?;

                let mut compiled: SmallVec<[Compiled; 3]> =
                    SmallVec::with_capacity(self.operands.len());
                for (index, operand) in self.operands.iter().enumerate() {
                    let mask = parameter_mask(&self.descriptor, index)?;
                    let (kind, _) = cheapest_argument_kind(operand, mask)?;
                    compiled.push(operand.generate(kind, tolerance, formatters)?);
                }

                let descriptor = self.descriptor.clone();
                let formatters_rt = formatters.clone();
                Ok(Compiled::new(target, move |bindings| {
                    let mut args: Vec<Value> = Vec::with_capacity(compiled.len());
                    for operand in &compiled {
                        args.push(operand.invoke(bindings)?);
                    }
                    let result = descriptor.call(&args)?;
                    if result.kind() == target {
                        Ok(result)
                    } else {
                        result.convert(target, &formatters_rt)
                    }
                }))
            })
    }

    pub(crate) fn deep_clone(&self, registry: &super::ParameterRegistry) -> FunctionNode {
        FunctionNode {
            descriptor: self.descriptor.clone(),
            operands: self
                .operands
                .iter()
                .map(|operand| operand.deep_clone(registry))
                .collect(),
            cache: GenCache::new(),
        }
    }
}

fn parameter_mask(descriptor: &FunctionDescriptor, index: usize) -> CompileResult<TypeMask> {
    descriptor.parameter_mask(index).ok_or_else(|| {
        internal(format!(
            "function `{}` has no parameter {index}",
            descriptor.name()
        ))
    })
}

/// Domains an operand may naturally have and still satisfy a position
/// accepting `mask` — the accepted domains plus everything that
/// converts into one of them.
fn accepted_sources(mask: TypeMask) -> TypeMask {
    let mut sources = TypeMask::empty();
    for kind in mask.iter_kinds() {
        sources |= convertible_sources(kind);
    }
    sources
}

/// Cheapest domain in `mask` the operand can materialize as.
fn cheapest_argument_kind(operand: &Node, mask: TypeMask) -> CompileResult<(ValueKind, u32)> {
    let mut best: Option<(ValueKind, u32)> = None;
    for kind in mask.iter_kinds() {
        let Ok(strategy) = operand.strategy_cost(kind) else {
            continue;
        };
        if best.is_none_or(|(_, b)| strategy.cost < b) {
            best = Some((kind, strategy.cost));
        }
    }
    best.ok_or_else(|| {
        not_logically_valid(format!("operand cannot present as any of {mask}"))
    })
}

/// Present a constant argument in a domain the parameter accepts.
fn coerce_argument(
    value: &Value,
    mask: TypeMask,
    formatters: &FormatterSet,
) -> CompileResult<Value> {
    if mask.contains_kind(value.kind()) {
        return Ok(value.clone());
    }
    let target = best_target(value.kind(), mask)?;
    value
        .convert(target, formatters)
        .map_err(|err| not_logically_valid(err.to_string()))
}

/// Cheapest domain in `mask` reachable from `from`.
fn best_target(from: ValueKind, mask: TypeMask) -> CompileResult<ValueKind> {
    let mut best: Option<(ValueKind, u32)> = None;
    for kind in mask.iter_kinds() {
        let cost = axon_types::conversion_cost(from, kind);
        if cost == axon_types::IMPOSSIBLE {
            continue;
        }
        if best.is_none_or(|(_, b)| cost < b) {
            best = Some((kind, cost));
        }
    }
    best.map(|(kind, _)| kind)
        .ok_or_else(|| not_logically_valid(format!("a {from} argument cannot present as any of {mask}")))
}
