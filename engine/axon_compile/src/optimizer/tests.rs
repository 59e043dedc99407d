use pretty_assertions::assert_eq;
use proptest::prelude::*;

use axon_tree::{BinaryNode, BinaryOp, FormatterSet, ParameterRegistry, Value};

use super::*;

/// Minimal body builder for optimizer tests: integer literals, symbol
/// or parameter references, and a single `+` or `*` split.
fn parse(
    body: &str,
    constants: &FxHashMap<String, ConstantNode>,
    registry: &ParameterRegistry,
    formatters: &FormatterSet,
) -> CompileResult<Node> {
    let body = body.trim();
    for (symbol, op) in [("+", BinaryOp::Add), ("*", BinaryOp::Multiply)] {
        if let Some((left, right)) = body.split_once(symbol) {
            let left = parse(left, constants, registry, formatters)?;
            let right = parse(right, constants, registry, formatters)?;
            return BinaryNode::build(op, left, right, formatters);
        }
    }
    if let Ok(value) = body.parse::<i64>() {
        return Node::constant(Value::Integer(value), formatters);
    }
    if let Some(constant) = constants.get(body) {
        return Ok(Node::Constant(constant.clone()));
    }
    Node::parameter(registry, body)
}

fn run_optimizer(symbols: Vec<(&str, &str)>) -> SymbolOptimizer {
    let registry = ParameterRegistry::new();
    let formatters = FormatterSet::new();
    let mut optimizer = SymbolOptimizer::new(
        symbols
            .into_iter()
            .map(|(name, body)| (name.to_string(), body.to_string())),
    );
    optimizer
        .run(&mut |body, constants| {
            parse(body, constants, &registry, &formatters).map(Some)
        })
        .unwrap();
    optimizer
}

fn constant_value(optimizer: &SymbolOptimizer, name: &str) -> Value {
    optimizer.constants()[name].value().clone()
}

#[test]
fn dependency_chain_folds_in_order() {
    let optimizer = run_optimizer(vec![("A", "1+2"), ("B", "A*3"), ("main", "B+x")]);
    assert_eq!(constant_value(&optimizer, "A"), Value::Integer(3));
    assert_eq!(constant_value(&optimizer, "B"), Value::Integer(9));
    // The root body stays a live symbol.
    assert_eq!(optimizer.symbols().len(), 1);
    assert!(optimizer.symbols().contains_key("main"));
}

#[test]
fn non_constant_leaves_settle_without_blocking_the_loop() {
    let optimizer = run_optimizer(vec![("A", "x+1"), ("B", "2*3"), ("main", "A+B")]);
    // B folds; A references a parameter and stays live.
    assert_eq!(constant_value(&optimizer, "B"), Value::Integer(6));
    assert!(optimizer.symbols().contains_key("A"));
    assert!(optimizer.symbols().contains_key("main"));
    assert!(!optimizer.constants().contains_key("A"));
}

#[test]
fn a_single_symbol_is_left_untouched() {
    let optimizer = run_optimizer(vec![("A", "1+2")]);
    assert!(optimizer.constants().is_empty());
    assert_eq!(optimizer.symbols().len(), 1);
}

#[test]
fn an_empty_factory_result_is_fatal() {
    let mut optimizer = SymbolOptimizer::new([
        ("A".to_string(), "1".to_string()),
        ("B".to_string(), "A".to_string()),
    ]);
    let result = optimizer.run(&mut |_, _| Ok(None));
    assert!(matches!(
        result,
        Err(axon_diagnostic::CompileError::NotLogicallyValid { .. })
    ));
}

proptest! {
    /// The final partition is independent of seeding order.
    #[test]
    fn partition_is_insertion_order_independent(
        order in Just(vec![0usize, 1, 2, 3]).prop_shuffle(),
    ) {
        let base = [
            ("A", "1+2"),
            ("B", "A*3"),
            ("C", "x+B"),
            ("main", "C"),
        ];
        let shuffled: Vec<(&str, &str)> = order.iter().map(|&i| base[i]).collect();
        let optimizer = run_optimizer(shuffled);

        let mut constants: Vec<&String> = optimizer.constants().keys().collect();
        constants.sort();
        let (a, b) = ("A".to_string(), "B".to_string());
        prop_assert_eq!(constants, vec![&a, &b]);

        let mut symbols: Vec<&String> = optimizer.symbols().keys().collect();
        symbols.sort();
        let (c, main) = ("C".to_string(), "main".to_string());
        prop_assert_eq!(symbols, vec![&c, &main]);
    }
}
