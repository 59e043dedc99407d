use pretty_assertions::assert_eq;

use axon_diagnostic::CompileError;

use super::*;

#[test]
fn identity_beats_conversion() {
    // {Integer, Numeric} -> Numeric: identity from Numeric wins.
    let strategy = select_strategy(TypeMask::NUMERIC_FAMILY, ValueKind::Numeric).unwrap();
    assert_eq!(strategy.via, ValueKind::Numeric);
    assert_eq!(strategy.cost, 0);
}

#[test]
fn widening_used_when_identity_unavailable() {
    let strategy = select_strategy(TypeMask::INTEGER, ValueKind::Numeric).unwrap();
    assert_eq!(strategy.via, ValueKind::Integer);
    assert_eq!(strategy.cost, 1);
}

#[test]
fn ties_keep_the_lowest_ordinal() {
    // Every domain stringifies at cost 10; with no String source the
    // scan must deterministically settle on Boolean (ordinal 0).
    let sources = TypeMask::all() & !TypeMask::STRING;
    let strategy = select_strategy(sources, ValueKind::String).unwrap();
    assert_eq!(strategy.via, ValueKind::Boolean);
    assert_eq!(strategy.cost, 10);
}

#[test]
fn single_source_failure_names_both_endpoints() {
    let err = select_strategy(TypeMask::STRING, ValueKind::Boolean);
    assert_eq!(
        err,
        Err(CompileError::ConversionImpossible {
            from: ValueKind::String,
            to: ValueKind::Boolean,
        })
    );
}

#[test]
fn multi_source_failure_is_logically_invalid() {
    let sources = TypeMask::STRING | TypeMask::BYTE_SEQUENCE;
    assert!(matches!(
        select_strategy(sources, ValueKind::Integer),
        Err(CompileError::NotLogicallyValid { .. })
    ));
}

#[test]
fn selection_is_deterministic() {
    let sources = TypeMask::all();
    let first = select_strategy(sources, ValueKind::String).unwrap();
    for _ in 0..16 {
        assert_eq!(select_strategy(sources, ValueKind::String).unwrap(), first);
    }
}
