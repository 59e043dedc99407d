//! The generated artifact: a reusable, thread-safe evaluation closure.

use std::fmt;
use std::sync::Arc;

use axon_diagnostic::{conversion_impossible, CompileResult, EvalResult};
use axon_types::{convertible, ValueKind};
use rustc_hash::FxHashMap;

use crate::extensibility::FormatterSet;
use crate::value::Value;

/// Name → value map supplied per invocation.
///
/// Each invocation owns its bindings; the compiled closure only reads
/// them, which is what makes concurrent invocation safe.
#[derive(Clone, Debug, Default)]
pub struct Bindings {
    values: FxHashMap<Arc<str>, Value>,
}

impl Bindings {
    /// Empty binding set.
    pub fn new() -> Self {
        Bindings::default()
    }

    /// Bind `name`, replacing any previous value.
    pub fn set(&mut self, name: impl Into<Arc<str>>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, name: impl Into<Arc<str>>, value: Value) -> Self {
        self.set(name, value);
        self
    }

    /// Look up a binding.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}

/// Signature of every generated closure.
pub(crate) type EvalFn = Arc<dyn Fn(&Bindings) -> EvalResult<Value> + Send + Sync>;

/// A generated, reusable evaluation artifact for one node at one target
/// domain.
///
/// Cloning shares the underlying closure. Invocation touches no node
/// state — all memoization completes before the artifact is handed out —
/// so one `Compiled` may be invoked concurrently from many threads with
/// independent bindings.
#[derive(Clone)]
pub struct Compiled {
    kind: ValueKind,
    eval: EvalFn,
}

impl Compiled {
    /// Wrap a closure producing values of `kind`.
    pub(crate) fn new(
        kind: ValueKind,
        eval: impl Fn(&Bindings) -> EvalResult<Value> + Send + Sync + 'static,
    ) -> Self {
        Compiled {
            kind,
            eval: Arc::new(eval),
        }
    }

    /// Artifact that returns a fixed value.
    pub(crate) fn constant(value: Value) -> Self {
        let kind = value.kind();
        Compiled::new(kind, move |_| Ok(value.clone()))
    }

    /// Domain every invocation produces.
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Evaluate against one set of bindings.
    pub fn invoke(&self, bindings: &Bindings) -> EvalResult<Value> {
        (self.eval)(bindings)
    }

    /// Wrap with a conversion adapter into `target`.
    ///
    /// Identity when the natural output already matches; otherwise the
    /// adapter converts every produced value through the lattice.
    pub(crate) fn converted(
        self,
        target: ValueKind,
        formatters: &FormatterSet,
    ) -> CompileResult<Compiled> {
        if self.kind == target {
            return Ok(self);
        }
        if !convertible(self.kind, target) {
            return Err(conversion_impossible(self.kind, target));
        }
        let formatters = formatters.clone();
        let inner = self.eval;
        Ok(Compiled::new(target, move |bindings| {
            inner(bindings)?.convert(target, &formatters)
        }))
    }
}

impl fmt::Debug for Compiled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compiled")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
