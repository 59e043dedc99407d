//! The narrow interfaces the core consumes from the extensibility layer.
//!
//! User-pluggable functions and custom string formatters live outside
//! this crate; the core only ever sees them through [`FunctionResolver`]
//! and [`StringFormatter`]. Both are injected per compile session.

use std::fmt;
use std::sync::Arc;

use axon_diagnostic::{function_failure, malformed_argument, CompileResult, EvalResult};
use axon_types::TypeMask;
use smallvec::SmallVec;

use crate::value::Value;

// ── String formatters ───────────────────────────────────────────

/// One string-rendering strategy.
///
/// Consulted whenever a non-string value must render as a string; a
/// strategy declines values it does not handle by returning `None`.
pub trait StringFormatter: Send + Sync {
    /// Render `value`, or decline with `None`.
    fn try_format(&self, value: &Value) -> Option<String>;
}

/// Ordered strategy list with the built-in rendering as fallback.
///
/// First match wins. Cloning shares the strategies.
#[derive(Clone, Default)]
pub struct FormatterSet {
    strategies: Vec<Arc<dyn StringFormatter>>,
}

impl FormatterSet {
    /// Empty set: only the built-in rendering applies.
    pub fn new() -> Self {
        FormatterSet::default()
    }

    /// Append a strategy; earlier strategies take precedence.
    pub fn push(&mut self, formatter: Arc<dyn StringFormatter>) {
        self.strategies.push(formatter);
    }

    /// Render `value` through the strategy list.
    pub fn render(&self, value: &Value) -> String {
        for strategy in &self.strategies {
            if let Some(rendered) = strategy.try_format(value) {
                return rendered;
            }
        }
        value.default_render()
    }
}

impl fmt::Debug for FormatterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatterSet")
            .field("strategies", &self.strategies.len())
            .finish()
    }
}

// ── Functions ───────────────────────────────────────────────────

/// Evaluation body of a resolved function.
pub type FunctionBody = Arc<dyn Fn(&[Value]) -> EvalResult<Value> + Send + Sync>;

/// A named function as the resolver hands it to the core.
///
/// Arity is fixed at 0–3 (the nonary through ternary families); each
/// operand position carries the domains it accepts, and the descriptor
/// advertises the domains the body may return.
#[derive(Clone)]
pub struct FunctionDescriptor {
    name: Arc<str>,
    parameter_masks: SmallVec<[TypeMask; 3]>,
    result_mask: TypeMask,
    pure: bool,
    body: FunctionBody,
}

impl FunctionDescriptor {
    /// Describe a pure function.
    ///
    /// Rejected at the call boundary: empty names, arity above 3, and
    /// empty parameter or result masks.
    pub fn new(
        name: impl Into<Arc<str>>,
        parameter_masks: impl IntoIterator<Item = TypeMask>,
        result_mask: TypeMask,
        body: FunctionBody,
    ) -> CompileResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(malformed_argument("name", "function name is empty"));
        }
        let parameter_masks: SmallVec<[TypeMask; 3]> = parameter_masks.into_iter().collect();
        if parameter_masks.len() > 3 {
            return Err(malformed_argument(
                "parameter_masks",
                format!(
                    "function `{name}` declares {} parameters; at most 3 are supported",
                    parameter_masks.len()
                ),
            ));
        }
        if parameter_masks.iter().any(TypeMask::is_empty) {
            return Err(malformed_argument(
                "parameter_masks",
                format!("function `{name}` declares a parameter accepting no domain"),
            ));
        }
        if result_mask.is_empty() {
            return Err(malformed_argument(
                "result_mask",
                format!("function `{name}` declares no result domain"),
            ));
        }
        Ok(FunctionDescriptor {
            name,
            parameter_masks,
            result_mask,
            pure: true,
            body,
        })
    }

    /// Mark the function impure: it is never folded, and nodes calling
    /// it must preserve their original form.
    pub fn impure(mut self) -> Self {
        self.pure = false;
        self
    }

    /// Resolved name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of operands the function takes.
    pub fn arity(&self) -> usize {
        self.parameter_masks.len()
    }

    /// Domains accepted at operand position `index`.
    pub fn parameter_mask(&self, index: usize) -> Option<TypeMask> {
        self.parameter_masks.get(index).copied()
    }

    /// Domains the body may return.
    pub fn result_mask(&self) -> TypeMask {
        self.result_mask
    }

    /// Whether constant operands may be folded through the body.
    pub fn is_pure(&self) -> bool {
        self.pure
    }

    /// Invoke the body, attributing failures to the function name.
    pub(crate) fn call(&self, args: &[Value]) -> EvalResult<Value> {
        (self.body)(args).map_err(|err| match err {
            already @ axon_diagnostic::EvalError::Function { .. } => already,
            other => function_failure(self.name.to_string(), other.to_string()),
        })
    }
}

impl fmt::Debug for FunctionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDescriptor")
            .field("name", &self.name)
            .field("parameter_masks", &self.parameter_masks)
            .field("result_mask", &self.result_mask)
            .field("pure", &self.pure)
            .finish_non_exhaustive()
    }
}

/// Function-name lookup the parser integration plugs in.
pub trait FunctionResolver {
    /// Resolve `name` called with `arity` operands.
    fn resolve(&self, name: &str, arity: usize) -> Option<FunctionDescriptor>;
}

/// Resolver that knows no functions — the default when the host plugs
/// nothing in.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoFunctions;

impl FunctionResolver for NoFunctions {
    fn resolve(&self, _name: &str, _arity: usize) -> Option<FunctionDescriptor> {
        None
    }
}
