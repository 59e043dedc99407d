//! End-to-end scenarios: build, fold, generate, invoke.
//!
//! The real tokenizer/parser is an external collaborator; these tests
//! drive the engine through a deliberately small body parser that only
//! understands literals, names and single binary operators.

#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use pretty_assertions::assert_eq;

use axon_compile::{
    Bindings, BinaryNode, BinaryOp, BuildContext, CompileError, CompileResult, FormatterSet, Node,
    ParameterRegistry, Session, Tolerance, TypeMask, Value, ValueKind,
};

// ── Test-side body parser ───────────────────────────────────────

const OPERATOR_GROUPS: &[&[(&str, BinaryOp)]] = &[
    &[
        (">=", BinaryOp::GreaterThanOrEqual),
        ("<=", BinaryOp::LessThanOrEqual),
        ("!=", BinaryOp::NotEqual),
        ("=", BinaryOp::Equal),
        (">", BinaryOp::GreaterThan),
        ("<", BinaryOp::LessThan),
    ],
    &[("+", BinaryOp::Add), ("-", BinaryOp::Subtract)],
    &[("*", BinaryOp::Multiply), ("/", BinaryOp::Divide)],
];

/// Split `body` at the last top-level occurrence of an operator in
/// `group`, honoring single-quoted strings and parentheses.
fn split_at_group<'a>(
    body: &'a str,
    group: &[(&str, BinaryOp)],
) -> Option<(&'a str, BinaryOp, &'a str)> {
    let bytes = body.as_bytes();
    let mut in_quote = false;
    let mut depth = 0usize;
    let mut found: Option<(usize, &str, BinaryOp)> = None;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' => {
                in_quote = !in_quote;
                i += 1;
                continue;
            }
            b'(' if !in_quote => depth += 1,
            b')' if !in_quote => depth = depth.saturating_sub(1),
            _ => {}
        }
        if !in_quote && depth == 0 {
            if let Some(&(symbol, op)) = group.iter().find(|(symbol, _)| body[i..].starts_with(symbol)) {
                found = Some((i, symbol, op));
                i += symbol.len();
                continue;
            }
        }
        i += 1;
    }
    found.map(|(at, symbol, op)| (&body[..at], op, &body[at + symbol.len()..]))
}

fn parse(body: &str, context: &BuildContext<'_>) -> CompileResult<Node> {
    let body = body.trim();
    for group in OPERATOR_GROUPS {
        if let Some((left, op, right)) = split_at_group(body, group) {
            let left = parse(left, context)?;
            let right = parse(right, context)?;
            return BinaryNode::build(op, left, right, context.formatters());
        }
    }
    if let Some(text) = body.strip_prefix('\'').and_then(|rest| rest.strip_suffix('\'')) {
        return Node::constant(Value::string(text), context.formatters());
    }
    if let Some((name, rest)) = body.split_once('(') {
        if let Some(inner) = rest.strip_suffix(')') {
            let mut operands = Vec::new();
            for argument in inner.split(',').filter(|argument| !argument.trim().is_empty()) {
                operands.push(parse(argument, context)?);
            }
            return context.function(name.trim(), operands);
        }
    }
    if body.contains('.') {
        if let Ok(value) = body.parse::<f64>() {
            return Node::constant(Value::Numeric(value), context.formatters());
        }
    }
    if let Ok(value) = body.parse::<i64>() {
        return Node::constant(Value::Integer(value), context.formatters());
    }
    if let Some(node) = context.constant_symbol(body) {
        return Ok(node);
    }
    Node::parameter(context.registry(), body)
}

fn compile(symbols: &[(&str, &str)], root: &str) -> axon_compile::CompiledExpression {
    Session::new()
        .compile(
            symbols
                .iter()
                .map(|(name, body)| (name.to_string(), body.to_string())),
            root,
            &mut |body, context| parse(body, context).map(Some),
        )
        .unwrap()
}

fn formatters() -> FormatterSet {
    FormatterSet::new()
}

// ── Scenario 1: constant folding end to end ─────────────────────

#[test]
fn constant_addition_folds_and_evaluates() {
    let expression = compile(&[], "2.0+3.0");
    assert!(expression.is_constant());

    let evaluator = expression.generate(ValueKind::Numeric, None).unwrap();
    assert_eq!(
        evaluator.invoke(&Bindings::new()).unwrap(),
        Value::Numeric(5.0)
    );
}

// ── Scenario 2: parameter narrowing through generation ──────────

#[test]
fn parameter_addition_narrows_and_converts_bindings() {
    let expression = compile(&[], "x+2.0");
    let evaluator = expression.generate(ValueKind::Numeric, None).unwrap();

    let bindings = Bindings::new().with("x", Value::Integer(3));
    assert_eq!(evaluator.invoke(&bindings).unwrap(), Value::Numeric(5.0));

    // The registry entry ended narrowed to the numeric family.
    assert_eq!(
        expression.registry().possible_types("x"),
        TypeMask::NUMERIC_FAMILY
    );
}

// ── Scenario 3: string ordering folds ───────────────────────────

#[test]
fn string_ordering_folds_to_a_boolean_constant() {
    let expression = compile(&[], "'b'>'a'");
    assert!(expression.is_constant());
    let evaluator = expression.generate(ValueKind::Boolean, None).unwrap();
    assert_eq!(
        evaluator.invoke(&Bindings::new()).unwrap(),
        Value::Boolean(true)
    );
}

// ── Scenario 4: ambiguous parameter pair ────────────────────────

#[test]
fn undetermined_comparison_pair_defaults_to_numeric() {
    let expression = compile(&[], "x=y");
    assert_eq!(
        expression.registry().determined("x"),
        Some(ValueKind::Numeric)
    );
    assert_eq!(
        expression.registry().determined("y"),
        Some(ValueKind::Numeric)
    );

    let evaluator = expression.generate(ValueKind::Boolean, None).unwrap();
    let bindings = Bindings::new()
        .with("x", Value::Integer(3))
        .with("y", Value::Numeric(3.0));
    assert_eq!(evaluator.invoke(&bindings).unwrap(), Value::Boolean(true));

    let bindings = Bindings::new()
        .with("x", Value::string("3"))
        .with("y", Value::Numeric(3.0));
    assert!(evaluator.invoke(&bindings).is_err());
}

// ── Scenario 5: symbol extraction ───────────────────────────────

#[test]
fn symbols_fold_in_dependency_order() {
    let expression = compile(&[("A", "1+2"), ("B", "A*3")], "B");
    assert!(expression.is_constant());
    let evaluator = expression.generate(ValueKind::Integer, None).unwrap();
    assert_eq!(
        evaluator.invoke(&Bindings::new()).unwrap(),
        Value::Integer(9)
    );
}

// ── Scenario 6: impossible generation targets ───────────────────

#[test]
fn boolean_view_of_a_string_constant_is_logically_invalid() {
    let expression = compile(&[], "'text'");
    let err = expression.generate(ValueKind::Boolean, None);
    assert!(matches!(
        err,
        Err(CompileError::ConversionImpossible {
            from: ValueKind::String,
            to: ValueKind::Boolean,
        })
    ));
}

// ── Tolerance end to end ────────────────────────────────────────

#[test]
fn tolerant_comparison_artifacts_coexist_with_exact_ones() {
    let expression = compile(&[], "x=100");
    let exact = expression.generate(ValueKind::Boolean, None).unwrap();
    let tolerance = Tolerance::percentage(0.10).unwrap();
    let tolerant = expression
        .generate(ValueKind::Boolean, Some(&tolerance))
        .unwrap();

    let bindings = Bindings::new().with("x", Value::Integer(105));
    assert_eq!(exact.invoke(&bindings).unwrap(), Value::Boolean(false));
    assert_eq!(tolerant.invoke(&bindings).unwrap(), Value::Boolean(true));

    let bindings = Bindings::new().with("x", Value::Integer(120));
    assert_eq!(tolerant.invoke(&bindings).unwrap(), Value::Boolean(false));
}

// ── Reuse, determinism, concurrency ─────────────────────────────

#[test]
fn one_artifact_serves_many_binding_sets() {
    let expression = compile(&[], "x*x");
    let evaluator = expression.generate_least_costly(None).unwrap();
    for i in 1..=10i64 {
        let bindings = Bindings::new().with("x", Value::Integer(i));
        assert_eq!(
            evaluator.invoke(&bindings).unwrap(),
            Value::Integer(i * i)
        );
    }
}

#[test]
fn least_costly_generation_is_stable_across_compiles() {
    let first = compile(&[], "x+2.0").generate_least_costly(None).unwrap();
    let second = compile(&[], "x+2.0").generate_least_costly(None).unwrap();
    assert_eq!(first.kind(), second.kind());
    assert_eq!(first.kind(), ValueKind::Numeric);
}

#[test]
fn cloned_expressions_evaluate_concurrently_and_independently() {
    let expression = compile(&[], "x+1");
    let clones: Vec<_> = (0..4).map(|_| expression.deep_clone()).collect();

    let handles: Vec<_> = clones
        .into_iter()
        .enumerate()
        .map(|(i, clone)| {
            std::thread::spawn(move || {
                let evaluator = clone.generate(ValueKind::Integer, None).unwrap();
                let value = i64::try_from(i).unwrap();
                let bindings = Bindings::new().with("x", Value::Integer(value));
                evaluator.invoke(&bindings).map(|result| (value, result))
            })
        })
        .collect();

    for handle in handles {
        let (value, result) = handle.join().unwrap().unwrap();
        assert_eq!(result, Value::Integer(value + 1));
    }
}

#[test]
fn generated_artifacts_are_shareable_across_threads() {
    let expression = compile(&[], "x*3");
    let evaluator = expression.generate(ValueKind::Integer, None).unwrap();

    let handles: Vec<_> = (0..4i64)
        .map(|i| {
            let evaluator = evaluator.clone();
            std::thread::spawn(move || {
                let bindings = Bindings::new().with("x", Value::Integer(i));
                evaluator.invoke(&bindings)
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let result = handle.join().unwrap().unwrap();
        assert_eq!(result, Value::Integer(i64::try_from(i).unwrap() * 3));
    }
}

// ── Injected function resolver ──────────────────────────────────

struct MathFunctions;

impl axon_compile::FunctionResolver for MathFunctions {
    fn resolve(&self, name: &str, arity: usize) -> Option<axon_compile::FunctionDescriptor> {
        match (name, arity) {
            ("abs", 1) => axon_compile::FunctionDescriptor::new(
                "abs",
                [TypeMask::NUMERIC],
                TypeMask::NUMERIC,
                std::sync::Arc::new(|args: &[Value]| match args {
                    [Value::Numeric(v)] => Ok(Value::Numeric(v.abs())),
                    _ => Err(axon_compile::EvalError::Function {
                        name: "abs".to_string(),
                        reason: "expected one numeric argument".to_string(),
                    }),
                }),
            )
            .ok(),
            _ => None,
        }
    }
}

#[test]
fn resolved_functions_fold_and_compile() {
    let session = Session::new().with_functions(std::sync::Arc::new(MathFunctions));
    let mut factory = |body: &str, context: &BuildContext<'_>| parse(body, context).map(Some);

    // Constant operands fold through the body at build time.
    let expression = session.compile([], "abs(0.0-3.5)", &mut factory).unwrap();
    assert!(expression.is_constant());
    let evaluator = expression.generate(ValueKind::Numeric, None).unwrap();
    assert_eq!(
        evaluator.invoke(&Bindings::new()).unwrap(),
        Value::Numeric(3.5)
    );

    // Parameter operands compile into the artifact.
    let expression = session.compile([], "abs(x)", &mut factory).unwrap();
    let evaluator = expression.generate(ValueKind::Numeric, None).unwrap();
    let bindings = Bindings::new().with("x", Value::Integer(-4));
    assert_eq!(evaluator.invoke(&bindings).unwrap(), Value::Numeric(4.0));

    // Unknown names are construction-time rejections.
    assert!(session.compile([], "missing(x)", &mut factory).is_err());
}

// ── Error propagation ───────────────────────────────────────────

#[test]
fn runtime_failures_surface_as_typed_errors() {
    let expression = compile(&[], "x/y");
    let evaluator = expression.generate(ValueKind::Integer, None).unwrap();
    let bindings = Bindings::new()
        .with("x", Value::Integer(1))
        .with("y", Value::Integer(0));
    assert!(matches!(
        evaluator.invoke(&bindings),
        Err(axon_compile::EvalError::DivisionByZero)
    ));

    let bindings = Bindings::new().with("x", Value::Integer(1));
    assert!(matches!(
        evaluator.invoke(&bindings),
        Err(axon_compile::EvalError::MissingBinding(_))
    ));
}

#[test]
fn incompatible_trees_are_rejected_at_construction() {
    let registry = ParameterRegistry::new();
    let left = Node::constant(Value::Boolean(true), &formatters()).unwrap();
    let right = Node::parameter(&registry, "x").unwrap();
    // A boolean can only concatenate opposite a string; multiplying it
    // is never legal.
    assert!(BinaryNode::build(BinaryOp::Multiply, left, right, &formatters()).is_err());
}
