//! Conversion-cost strategy resolution.

use axon_diagnostic::{conversion_impossible, not_logically_valid, CompileResult};
use axon_types::{conversion_cost, TypeMask, ValueKind, IMPOSSIBLE};

/// Cost and intermediate kind of one conversion strategy.
///
/// `via` is the domain the node materializes internally before the
/// (possibly identity) conversion into the requested target.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StrategyCost {
    /// Total conversion cost; finite by construction.
    pub cost: u32,
    /// Internal domain the strategy goes through.
    pub via: ValueKind,
}

/// Least-costly way to materialize one of `sources` as `target`.
///
/// Sources are scanned in ordinal order and replaced only on strictly
/// smaller cost, so cost ties deterministically keep the lowest ordinal.
pub fn select_strategy(sources: TypeMask, target: ValueKind) -> CompileResult<StrategyCost> {
    let mut best: Option<StrategyCost> = None;
    for kind in sources.iter_kinds() {
        let cost = conversion_cost(kind, target);
        if cost == IMPOSSIBLE {
            continue;
        }
        if best.is_none_or(|b| cost < b.cost) {
            best = Some(StrategyCost { cost, via: kind });
        }
    }
    best.ok_or_else(|| match sources.exactly_one() {
        Some(single) => conversion_impossible(single, target),
        None => not_logically_valid(format!("none of {sources} can present as {target}")),
    })
}

/// Saturating cost addition; anything reaching [`IMPOSSIBLE`] stays
/// impossible.
pub(crate) fn add_costs(a: u32, b: u32) -> u32 {
    a.saturating_add(b)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
