use pretty_assertions::assert_eq;

use axon_diagnostic::CompileError;
use crate::compiled::Bindings;

use super::*;

fn formatters() -> FormatterSet {
    FormatterSet::new()
}

#[test]
fn integer_constant_precomputes_four_forms() {
    let node = ConstantNode::new(Value::Integer(5), &formatters()).unwrap();
    assert_eq!(
        node.representable(),
        TypeMask::INTEGER | TypeMask::NUMERIC | TypeMask::BYTE_SEQUENCE | TypeMask::STRING
    );
    assert_eq!(node.representation(ValueKind::Integer), Some(&Value::Integer(5)));
    assert_eq!(node.representation(ValueKind::Numeric), Some(&Value::Numeric(5.0)));
    assert_eq!(node.representation(ValueKind::String), Some(&Value::string("5")));
    assert_eq!(node.representation(ValueKind::Boolean), None);
}

#[test]
fn string_constant_presents_as_string_only() {
    let node = ConstantNode::new(Value::string("x"), &formatters()).unwrap();
    assert_eq!(node.representable(), TypeMask::STRING);
}

#[test]
fn generate_returns_the_precomputed_form() {
    let node = ConstantNode::new(Value::Integer(7), &formatters()).unwrap();
    let compiled = node.generate(ValueKind::Numeric).unwrap();
    assert_eq!(compiled.kind(), ValueKind::Numeric);
    assert_eq!(
        compiled.invoke(&Bindings::new()).unwrap(),
        Value::Numeric(7.0)
    );
}

#[test]
fn boolean_view_of_a_string_constant_fails() {
    let node = ConstantNode::new(Value::string("yes"), &formatters()).unwrap();
    assert_eq!(
        node.generate(ValueKind::Boolean).map(|_| ()),
        Err(CompileError::ConversionImpossible {
            from: ValueKind::String,
            to: ValueKind::Boolean,
        })
    );
}

#[test]
fn verify_intersects_the_representable_set() {
    let node = ConstantNode::new(Value::Integer(1), &formatters()).unwrap();
    assert_eq!(
        node.verify_possible_type(TypeMask::NUMERIC_FAMILY).unwrap(),
        TypeMask::NUMERIC_FAMILY
    );
    assert!(node.verify_possible_type(TypeMask::BOOLEAN).is_err());
}
