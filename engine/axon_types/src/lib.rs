//! Value-type lattice and tolerance comparators for the Axon engine.
//!
//! The expression engine supports exactly five value domains. This crate
//! defines them (`ValueKind`), the possible-type bitset used while
//! resolution is still in flight (`TypeMask`), the legal conversions
//! between domains with their costs (the lattice), and the
//! tolerance-aware comparison functions every comparison node composes.
//!
//! This is a leaf crate: it has no dependency on the node tree and no
//! mutable state. The cost table is the single source of truth consulted
//! by strategy selection — its exact values drive overload-style
//! resolution and must not drift.

mod kind;
mod lattice;
mod mask;
mod tolerance;

pub use kind::ValueKind;
pub use lattice::{
    conversion_cost, convertible, convertible_sources, legal_conversions, IMPOSSIBLE,
};
pub use mask::TypeMask;
pub use tolerance::{
    equate_float, equate_int, greater_or_equal_float, greater_or_equal_int, greater_than_float,
    greater_than_int, less_or_equal_float, less_or_equal_int, less_than_float, less_than_int,
    Tolerance, ToleranceError,
};
