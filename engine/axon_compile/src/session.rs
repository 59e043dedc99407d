//! The top-level compile API.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use axon_diagnostic::{not_logically_valid, CompileResult, EvalResult};
use axon_tree::{
    Bindings, Compiled, ConstantNode, FormatterSet, FunctionNode, FunctionResolver, NoFunctions,
    Node, ParameterRegistry, Tolerance, TypeMask, Value, ValueKind,
};

use crate::optimizer::SymbolOptimizer;

/// Everything a parser-side node factory needs while building a body.
pub struct BuildContext<'a> {
    registry: &'a ParameterRegistry,
    formatters: &'a FormatterSet,
    functions: &'a dyn FunctionResolver,
    constants: &'a FxHashMap<String, ConstantNode>,
}

impl BuildContext<'_> {
    /// The parameter registry nodes should resolve names against.
    pub fn registry(&self) -> &ParameterRegistry {
        self.registry
    }

    /// The string-rendering strategies in effect.
    pub fn formatters(&self) -> &FormatterSet {
        self.formatters
    }

    /// A symbol the optimizer already folded, as a fresh constant node.
    pub fn constant_symbol(&self, name: &str) -> Option<Node> {
        self.constants.get(name).cloned().map(Node::Constant)
    }

    /// Build a call to a function the injected resolver knows.
    ///
    /// An unknown name/arity pair fails the compile, like every other
    /// construction-time rejection.
    pub fn function(&self, name: &str, operands: Vec<Node>) -> CompileResult<Node> {
        let descriptor = self.functions.resolve(name, operands.len()).ok_or_else(|| {
            not_logically_valid(format!(
                "no function `{name}` taking {} operand(s)",
                operands.len()
            ))
        })?;
        FunctionNode::build(descriptor, operands, self.formatters)
    }
}

/// Factory turning one raw body into a node tree.
///
/// Malformed input is reported as an error; `Ok(None)` (no expression)
/// is treated as fatal by the caller.
pub type NodeFactory<'a> = dyn FnMut(&str, &BuildContext<'_>) -> CompileResult<Option<Node>> + 'a;

/// One compilation: the ambient formatter strategies and function
/// resolver, applied to a fresh registry per compile.
pub struct Session {
    formatters: FormatterSet,
    functions: Arc<dyn FunctionResolver + Send + Sync>,
}

impl Default for Session {
    fn default() -> Self {
        Session {
            formatters: FormatterSet::new(),
            functions: Arc::new(NoFunctions),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("formatters", &self.formatters)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Session with only the built-in string rendering and no functions.
    pub fn new() -> Self {
        Session::default()
    }

    /// Session with injected string-formatter strategies.
    pub fn with_formatters(formatters: FormatterSet) -> Self {
        Session {
            formatters,
            ..Session::default()
        }
    }

    /// Inject the function resolver the factory may call through.
    pub fn with_functions(mut self, functions: Arc<dyn FunctionResolver + Send + Sync>) -> Self {
        self.functions = functions;
        self
    }

    /// Compile a forest of named subexpressions plus a root body.
    ///
    /// The optimizer first extracts constant symbols in dependency
    /// order; the factory then builds the root with those constants
    /// visible. Any factory failure aborts the whole compile — partial
    /// trees are discarded wholesale.
    pub fn compile(
        &self,
        symbols: impl IntoIterator<Item = (String, String)>,
        root_body: &str,
        factory: &mut NodeFactory<'_>,
    ) -> CompileResult<CompiledExpression> {
        let registry = ParameterRegistry::new();
        let mut optimizer = SymbolOptimizer::new(symbols);

        optimizer.run(&mut |body, constants| {
            let context = BuildContext {
                registry: &registry,
                formatters: &self.formatters,
                functions: self.functions.as_ref(),
                constants,
            };
            factory(body, &context)
        })?;

        let context = BuildContext {
            registry: &registry,
            formatters: &self.formatters,
            functions: self.functions.as_ref(),
            constants: optimizer.constants(),
        };
        let root = factory(root_body, &context)?
            .ok_or_else(|| not_logically_valid("root body produced no expression"))?;
        debug!(possible = %root.possible_types(), "root built");

        Ok(CompiledExpression {
            root,
            registry,
            formatters: self.formatters.clone(),
        })
    }
}

/// A fully constructed expression tree, ready to generate evaluation
/// artifacts.
#[derive(Debug)]
pub struct CompiledExpression {
    root: Node,
    registry: ParameterRegistry,
    formatters: FormatterSet,
}

impl CompiledExpression {
    /// The root node's still-possible result domains.
    pub fn possible_types(&self) -> TypeMask {
        self.root.possible_types()
    }

    /// Whether the whole expression folded to a constant.
    pub fn is_constant(&self) -> bool {
        self.root.is_constant()
    }

    /// Names of every parameter the expression references, sorted.
    pub fn parameter_names(&self) -> Vec<Arc<str>> {
        self.registry.names()
    }

    /// The registry this tree resolves parameters against.
    pub fn registry(&self) -> &ParameterRegistry {
        &self.registry
    }

    /// Generate the reusable artifact for `target`.
    pub fn generate(
        &self,
        target: ValueKind,
        tolerance: Option<&Tolerance>,
    ) -> CompileResult<Evaluator> {
        self.root
            .generate(target, tolerance, &self.formatters)
            .map(|compiled| Evaluator { compiled })
    }

    /// Generate at the root's cheapest target domain.
    pub fn generate_least_costly(
        &self,
        tolerance: Option<&Tolerance>,
    ) -> CompileResult<Evaluator> {
        let (target, _) = self.root.least_costly_strategy()?;
        self.generate(target, tolerance)
    }

    /// Structurally identical expression over a fresh registry.
    ///
    /// The clone shares no mutable state with the original: it narrows,
    /// generates and evaluates independently, which is what allows many
    /// isolated instances of one tree to run concurrently.
    pub fn deep_clone(&self) -> CompiledExpression {
        let registry = ParameterRegistry::new();
        let root = self.root.deep_clone(&registry);
        CompiledExpression {
            root,
            registry,
            formatters: self.formatters.clone(),
        }
    }
}

/// The invocable artifact for one (expression, target domain) pair.
///
/// Cloning shares the closure; invocation is thread-safe with
/// per-invocation bindings.
#[derive(Clone, Debug)]
pub struct Evaluator {
    compiled: Compiled,
}

impl Evaluator {
    /// Domain every invocation produces.
    pub fn kind(&self) -> ValueKind {
        self.compiled.kind()
    }

    /// Evaluate against one set of bindings.
    pub fn invoke(&self, bindings: &Bindings) -> EvalResult<Value> {
        self.compiled.invoke(bindings)
    }
}
