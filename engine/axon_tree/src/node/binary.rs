//! Two-operand operation nodes.
//!
//! Each operator family encodes which operand-domain combinations are
//! legal, how undetermined operands narrow when the other side is
//! concrete, how constant operands fold, and how the general case
//! compiles. Compatibility reasons over *natural* domains (what an
//! operand produces before conversion); the chosen generation mode then
//! persists its own narrowing before operand code is requested.
//!
//! Return-type policy:
//! - arithmetic (`+ - * / ^`) — the unified numeric domain: Integer
//!   unless either side is Numeric; mixed widths promote, never
//!   truncate. `+` additionally concatenates strings (either side
//!   string-natural, the other auto-stringifies) and byte sequences
//!   (both sides byte-natural).
//! - shifts (`<< >>`) — both operands Integer, result Integer.
//! - bitwise (`& | #`) — both Integer or both Boolean, domain preserved.
//! - comparisons — always Boolean; operands must unify in one domain
//!   among {Integer/Numeric, String, ByteSequence}; Boolean compares
//!   for equality only. Tolerance applies to the numeric domains.

use axon_diagnostic::{not_logically_valid, CompileResult};
use axon_types::{conversion_cost, Tolerance, TypeMask, ValueKind, IMPOSSIBLE};

use tracing::debug;

use crate::compiled::Compiled;
use crate::eval::evaluate_binary;
use crate::extensibility::FormatterSet;
use crate::node::cache::GenCache;
use crate::node::constant::ConstantNode;
use crate::node::cost::{add_costs, StrategyCost};
use crate::node::Node;
use crate::op::BinaryOp;

/// A binary operation owning both operands.
#[derive(Debug)]
pub struct BinaryNode {
    op: BinaryOp,
    left: Box<Node>,
    right: Box<Node>,
    cache: GenCache,
}

impl BinaryNode {
    /// Build a binary operation.
    ///
    /// Verifies operand compatibility (rejecting immediately when no
    /// legal combination exists), narrows undetermined parameters from
    /// the concrete side, and folds to a constant when both operands
    /// are constant and the subtree is reducible. A fold whose
    /// evaluation fails (overflow, zero divisor) stays unfolded and
    /// surfaces at invocation instead.
    pub fn build(
        op: BinaryOp,
        left: Node,
        right: Node,
        formatters: &FormatterSet,
    ) -> CompileResult<Node> {
        if op.is_arithmetic() {
            if op == BinaryOp::Add {
                check_add(&left, &right)?;
            } else {
                left.verify_possible_type(TypeMask::NUMERIC_FAMILY)?;
                right.verify_possible_type(TypeMask::NUMERIC_FAMILY)?;
            }
        } else if op.is_shift() {
            left.verify_possible_type(TypeMask::INTEGER)?;
            right.verify_possible_type(TypeMask::INTEGER)?;
        } else if op.is_bitwise() {
            check_bitwise(&left, &right)?;
        } else {
            check_comparison(op, &left, &right)?;
        }

        let node = BinaryNode {
            op,
            left: Box::new(left),
            right: Box::new(right),
            cache: GenCache::new(),
        };
        node.simplify(formatters)
    }

    /// Fold to a constant when both operands are constant.
    ///
    /// Comparisons fold with exact semantics: tolerance arrives at code
    /// generation and is never stored in the tree, so it cannot apply
    /// to a subtree that folded at construction.
    fn simplify(self, formatters: &FormatterSet) -> CompileResult<Node> {
        if !self.requires_preserved_form() {
            let folded = match (self.left.constant_value(), self.right.constant_value()) {
                (Some(left), Some(right)) => {
                    evaluate_binary(self.op, left, right, None, formatters).ok()
                }
                _ => None,
            };
            if let Some(value) = folded {
                debug!(op = %self.op, "folded constant operands");
                return ConstantNode::new(value, formatters).map(Node::Constant);
            }
        }
        Ok(Node::Binary(self))
    }

    /// The operator.
    pub fn op(&self) -> BinaryOp {
        self.op
    }

    pub(crate) fn possible_types(&self) -> TypeMask {
        let l = self.left.natural_types();
        let r = self.right.natural_types();
        if self.op.is_comparison() {
            return TypeMask::BOOLEAN;
        }
        if self.op.is_shift() {
            return TypeMask::INTEGER;
        }
        if self.op.is_bitwise() {
            let mut mask = TypeMask::empty();
            if l.contains_kind(ValueKind::Integer) && r.contains_kind(ValueKind::Integer) {
                mask |= TypeMask::INTEGER;
            }
            if l.contains_kind(ValueKind::Boolean) && r.contains_kind(ValueKind::Boolean) {
                mask |= TypeMask::BOOLEAN;
            }
            return mask;
        }
        if self.op == BinaryOp::Add {
            return add_result_mask(l, r);
        }
        numeric_result_mask(l, r)
    }

    pub(crate) fn requires_preserved_form(&self) -> bool {
        self.left.requires_preserved_form() || self.right.requires_preserved_form()
    }

    pub(crate) fn verify_possible_type(&self, mask: TypeMask) -> CompileResult<TypeMask> {
        let possible = self.possible_types();
        let narrowed = possible & mask;
        if narrowed.is_empty() {
            return Err(axon_diagnostic::no_possible_type(mask, possible));
        }
        // Push the surviving constraint into the operands where the
        // result domain pins theirs down.
        if self.op.is_bitwise() || self.op == BinaryOp::Add {
            if narrowed == TypeMask::INTEGER {
                self.left.verify_possible_type(TypeMask::INTEGER)?;
                self.right.verify_possible_type(TypeMask::INTEGER)?;
            } else if narrowed == TypeMask::BOOLEAN && self.op.is_bitwise() {
                self.left.verify_possible_type(TypeMask::BOOLEAN)?;
                self.right.verify_possible_type(TypeMask::BOOLEAN)?;
            } else if narrowed == TypeMask::BYTE_SEQUENCE {
                self.left.verify_possible_type(TypeMask::BYTE_SEQUENCE)?;
                self.right.verify_possible_type(TypeMask::BYTE_SEQUENCE)?;
            } else if narrowed & TypeMask::NUMERIC_FAMILY == narrowed {
                self.left.verify_possible_type(TypeMask::NUMERIC_FAMILY)?;
                self.right.verify_possible_type(TypeMask::NUMERIC_FAMILY)?;
            }
        } else if self.op.is_arithmetic() && narrowed == TypeMask::INTEGER {
            self.left.verify_possible_type(TypeMask::INTEGER)?;
            self.right.verify_possible_type(TypeMask::INTEGER)?;
        }
        Ok(narrowed)
    }

    pub(crate) fn strategy_cost(&self, target: ValueKind) -> CompileResult<StrategyCost> {
        let mut best: Option<StrategyCost> = None;
        for via in self.possible_types().iter_kinds() {
            let own = conversion_cost(via, target);
            if own == IMPOSSIBLE {
                continue;
            }
            let Some(operands) = self.operand_cost_for(via) else {
                continue;
            };
            let total = add_costs(own, operands);
            if best.is_none_or(|b| total < b.cost) {
                best = Some(StrategyCost { cost: total, via });
            }
        }
        best.ok_or_else(|| {
            not_logically_valid(format!("`{}` cannot materialize as {target}", self.op))
        })
    }

    /// Summed operand cost to realize the result domain `via`.
    fn operand_cost_for(&self, via: ValueKind) -> Option<u32> {
        if self.op.is_comparison() {
            // `via` is Boolean; the operands are priced at the cheapest
            // shared comparison domain.
            return self.comparison_mode().map(|(_, cost)| cost);
        }
        let left = self.left.strategy_cost(via).ok()?;
        let right = self.right.strategy_cost(via).ok()?;
        Some(add_costs(left.cost, right.cost))
    }

    /// The comparison operand domain: cheapest shared domain, ordinal
    /// tie-break.
    fn comparison_mode(&self) -> Option<(ValueKind, u32)> {
        let comparable = comparison_domain_mask(
            self.left.natural_types(),
            self.right.natural_types(),
            self.op.is_ordering(),
        );
        let mut best: Option<(ValueKind, u32)> = None;
        for domain in comparable.iter_kinds() {
            let Ok(left) = self.left.strategy_cost(domain) else {
                continue;
            };
            let Ok(right) = self.right.strategy_cost(domain) else {
                continue;
            };
            let total = add_costs(left.cost, right.cost);
            if best.is_none_or(|(_, b)| total < b) {
                best = Some((domain, total));
            }
        }
        best
    }

    pub(crate) fn generate(
        &self,
        target: ValueKind,
        tolerance: Option<&Tolerance>,
        formatters: &FormatterSet,
    ) -> CompileResult<Compiled> {
        self.cache
            .get_or_try_insert((target, tolerance.is_some()), || {
                if self.op.is_comparison() {
                    self.generate_comparison(target, tolerance, formatters)
                } else {
                    self.generate_combining(target, tolerance, formatters)
                }
            })
    }

    /// Arithmetic, shift, bitwise and concatenation generation: both
    /// operands materialize at the chosen result domain and the kernel
    /// combines them.
    fn generate_combining(
        &self,
        target: ValueKind,
        tolerance: Option<&Tolerance>,
        formatters: &FormatterSet,
    ) -> CompileResult<Compiled> {
        let strategy = self.strategy_cost(target)?;
        let via = strategy.via;

        // Persist the narrowing the chosen mode implies.
        match via {
            ValueKind::Integer => {
                self.left.verify_possible_type(TypeMask::INTEGER)?;
                self.right.verify_possible_type(TypeMask::INTEGER)?;
            }
            ValueKind::Numeric => {
                self.left.verify_possible_type(TypeMask::NUMERIC_FAMILY)?;
                self.right.verify_possible_type(TypeMask::NUMERIC_FAMILY)?;
            }
            ValueKind::Boolean => {
                self.left.verify_possible_type(TypeMask::BOOLEAN)?;
                self.right.verify_possible_type(TypeMask::BOOLEAN)?;
            }
            ValueKind::ByteSequence => {
                self.left.verify_possible_type(TypeMask::BYTE_SEQUENCE)?;
                self.right.verify_possible_type(TypeMask::BYTE_SEQUENCE)?;
            }
            // Everything stringifies; string concatenation constrains
            // neither operand.
            ValueKind::String => {}
        }

        let left = self.left.generate(via, tolerance, formatters)?;
        let right = self.right.generate(via, tolerance, formatters)?;
        let op = self.op;
        let tolerance = tolerance.copied();
        let formatters_rt = formatters.clone();
        Compiled::new(via, move |bindings| {
            let l = left.invoke(bindings)?;
            let r = right.invoke(bindings)?;
            evaluate_binary(op, &l, &r, tolerance.as_ref(), &formatters_rt)
        })
        .converted(target, formatters)
    }

    /// Comparison generation: operands materialize at the unified
    /// comparison domain; the Boolean result converts to `target` if
    /// needed. Tolerance reaches the kernel only through the numeric
    /// domains.
    fn generate_comparison(
        &self,
        target: ValueKind,
        tolerance: Option<&Tolerance>,
        formatters: &FormatterSet,
    ) -> CompileResult<Compiled> {
        // Reject targets Boolean cannot reach before picking a mode.
        if conversion_cost(ValueKind::Boolean, target) == IMPOSSIBLE {
            return Err(axon_diagnostic::conversion_impossible(
                ValueKind::Boolean,
                target,
            ));
        }
        let (domain, _) = self.comparison_mode().ok_or_else(|| {
            not_logically_valid(format!(
                "`{}` admits no shared domain between {} and {}",
                self.op,
                self.left.natural_types(),
                self.right.natural_types()
            ))
        })?;

        match domain {
            ValueKind::Integer | ValueKind::Numeric => {
                self.left.verify_possible_type(TypeMask::NUMERIC_FAMILY)?;
                self.right.verify_possible_type(TypeMask::NUMERIC_FAMILY)?;
            }
            other => {
                self.left.verify_possible_type(TypeMask::of(other))?;
                self.right.verify_possible_type(TypeMask::of(other))?;
            }
        }

        let left = self.left.generate(domain, tolerance, formatters)?;
        let right = self.right.generate(domain, tolerance, formatters)?;
        let op = self.op;
        let tolerance = tolerance.copied();
        let formatters_rt = formatters.clone();
        Compiled::new(ValueKind::Boolean, move |bindings| {
            let l = left.invoke(bindings)?;
            let r = right.invoke(bindings)?;
            evaluate_binary(op, &l, &r, tolerance.as_ref(), &formatters_rt)
        })
        .converted(target, formatters)
    }

    pub(crate) fn deep_clone(&self, registry: &super::ParameterRegistry) -> BinaryNode {
        BinaryNode {
            op: self.op,
            left: Box::new(self.left.deep_clone(registry)),
            right: Box::new(self.right.deep_clone(registry)),
            cache: GenCache::new(),
        }
    }
}

// ── Compatibility rules ─────────────────────────────────────────

/// Result domains of `+` for the given natural operand domains.
fn add_result_mask(l: TypeMask, r: TypeMask) -> TypeMask {
    let mut mask = numeric_result_mask(l, r);
    // Either side naturally a string: the other side auto-stringifies.
    if l.contains_kind(ValueKind::String) || r.contains_kind(ValueKind::String) {
        mask |= TypeMask::STRING;
    }
    // Byte concatenation needs byte sequences on both sides.
    if l.contains_kind(ValueKind::ByteSequence) && r.contains_kind(ValueKind::ByteSequence) {
        mask |= TypeMask::BYTE_SEQUENCE;
    }
    mask
}

/// Unified numeric result domains: Integer when both sides can be
/// Integer, Numeric when both sides are numeric-capable.
fn numeric_result_mask(l: TypeMask, r: TypeMask) -> TypeMask {
    let mut mask = TypeMask::empty();
    if l.contains_kind(ValueKind::Integer) && r.contains_kind(ValueKind::Integer) {
        mask |= TypeMask::INTEGER;
    }
    if l.intersects(TypeMask::NUMERIC_FAMILY) && r.intersects(TypeMask::NUMERIC_FAMILY) {
        mask |= TypeMask::NUMERIC;
    }
    mask
}

/// Domains in which the two sides of a comparison can unify.
fn comparison_domain_mask(l: TypeMask, r: TypeMask, ordering: bool) -> TypeMask {
    let mut mask = TypeMask::empty();
    if l.intersects(TypeMask::NUMERIC_FAMILY) && r.intersects(TypeMask::NUMERIC_FAMILY) {
        mask |= TypeMask::NUMERIC_FAMILY;
    }
    if l.contains_kind(ValueKind::String) && r.contains_kind(ValueKind::String) {
        mask |= TypeMask::STRING;
    }
    if l.contains_kind(ValueKind::ByteSequence) && r.contains_kind(ValueKind::ByteSequence) {
        mask |= TypeMask::BYTE_SEQUENCE;
    }
    // Booleans equate but never order.
    if !ordering && l.contains_kind(ValueKind::Boolean) && r.contains_kind(ValueKind::Boolean) {
        mask |= TypeMask::BOOLEAN;
    }
    mask
}

/// Legality and narrowing for `+`.
fn check_add(left: &Node, right: &Node) -> CompileResult<()> {
    let l = left.natural_types();
    let r = right.natural_types();
    if add_result_mask(l, r).is_empty() {
        return Err(not_logically_valid(format!(
            "`+` admits no combination of {l} and {r}"
        )));
    }
    // One concrete side narrows the other; two open (or two concrete)
    // sides have nothing further to pin down here.
    if let Some(kind) = l.exactly_one() {
        narrow_add_side(right, kind)?;
    }
    if let Some(kind) = r.exactly_one() {
        narrow_add_side(left, kind)?;
    }
    Ok(())
}

/// Narrow one `+` operand opposite a concrete domain.
fn narrow_add_side(side: &Node, concrete: ValueKind) -> CompileResult<()> {
    let mask = match concrete {
        // Numeric addition, or concatenation if the open side turns out
        // to be a string — a weak determination keeps both alive.
        ValueKind::Integer | ValueKind::Numeric => TypeMask::NUMERIC_FAMILY | TypeMask::STRING,
        // Anything concatenates opposite a string.
        ValueKind::String => return Ok(()),
        ValueKind::ByteSequence => TypeMask::BYTE_SEQUENCE | TypeMask::STRING,
        // A boolean only concatenates, so the other side must be the
        // string.
        ValueKind::Boolean => TypeMask::STRING,
    };
    side.verify_possible_type(mask).map(|_| ())
}

/// Legality and narrowing for `& | #`.
fn check_bitwise(left: &Node, right: &Node) -> CompileResult<()> {
    let l = left.natural_types();
    let r = right.natural_types();
    let joint = l & r & (TypeMask::BOOLEAN | TypeMask::INTEGER);
    if joint.is_empty() {
        return Err(not_logically_valid(format!(
            "bitwise operators need both sides integer or both boolean, got {l} and {r}"
        )));
    }
    left.verify_possible_type(joint)?;
    right.verify_possible_type(joint)?;
    Ok(())
}

/// Legality and narrowing for comparisons.
fn check_comparison(op: BinaryOp, left: &Node, right: &Node) -> CompileResult<()> {
    let l = left.natural_types();
    let r = right.natural_types();
    let comparable = comparison_domain_mask(l, r, op.is_ordering());
    if comparable.is_empty() {
        return Err(not_logically_valid(format!(
            "`{op}` admits no shared domain between {l} and {r}"
        )));
    }
    // Default ambiguous-pair policy: two fully undetermined parameters
    // compared against each other both become Numeric.
    if matches!(left, Node::Parameter(_))
        && matches!(right, Node::Parameter(_))
        && l == TypeMask::all()
        && r == TypeMask::all()
    {
        left.verify_possible_type(TypeMask::NUMERIC)?;
        right.verify_possible_type(TypeMask::NUMERIC)?;
        return Ok(());
    }
    left.verify_possible_type(comparable)?;
    right.verify_possible_type(comparable)?;
    Ok(())
}
