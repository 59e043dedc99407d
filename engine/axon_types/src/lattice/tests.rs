use pretty_assertions::assert_eq;

use super::*;

#[test]
fn identity_is_free() {
    for kind in ValueKind::ALL {
        assert_eq!(conversion_cost(kind, kind), 0, "identity for {kind}");
    }
}

#[test]
fn cost_table_matches_lattice() {
    // A conversion is legal exactly when its cost is finite.
    for from in ValueKind::ALL {
        let legal = legal_conversions(from);
        for to in ValueKind::ALL {
            let cost = conversion_cost(from, to);
            if legal.contains_kind(to) {
                assert_ne!(cost, IMPOSSIBLE, "{from} -> {to} should be legal");
            } else {
                assert_eq!(cost, IMPOSSIBLE, "{from} -> {to} should be impossible");
            }
        }
    }
}

#[test]
fn exact_costs_drive_resolution() {
    // These exact values are observable through strategy selection;
    // changing any of them changes which representation wins.
    assert_eq!(conversion_cost(ValueKind::Integer, ValueKind::Numeric), 1);
    assert_eq!(
        conversion_cost(ValueKind::Integer, ValueKind::ByteSequence),
        2
    );
    assert_eq!(
        conversion_cost(ValueKind::Numeric, ValueKind::ByteSequence),
        2
    );
    assert_eq!(conversion_cost(ValueKind::Integer, ValueKind::String), 10);
    assert_eq!(conversion_cost(ValueKind::Boolean, ValueKind::String), 10);
}

#[test]
fn narrowing_conversions_are_forbidden() {
    assert!(!convertible(ValueKind::Numeric, ValueKind::Integer));
    assert!(!convertible(ValueKind::String, ValueKind::Boolean));
    assert!(!convertible(ValueKind::String, ValueKind::Integer));
    assert!(!convertible(ValueKind::ByteSequence, ValueKind::Integer));
    assert!(!convertible(ValueKind::Boolean, ValueKind::Integer));
}

#[test]
fn string_is_a_sink() {
    // Everything stringifies; nothing converts out of a string.
    for kind in ValueKind::ALL {
        assert!(convertible(kind, ValueKind::String));
    }
    assert_eq!(
        legal_conversions(ValueKind::String),
        TypeMask::of(ValueKind::String)
    );
}

#[test]
fn convertible_sources_inverts_the_relation() {
    for target in ValueKind::ALL {
        let sources = convertible_sources(target);
        for from in ValueKind::ALL {
            assert_eq!(
                sources.contains_kind(from),
                convertible(from, target),
                "{from} -> {target}"
            );
        }
    }
    assert_eq!(convertible_sources(ValueKind::String), TypeMask::all());
}
