//! The shared parameter registry.
//!
//! One slot per distinct name across a compiled expression, created on
//! first reference and narrowed as a side effect of every node that
//! touches the name. Narrowing is an explicit method call on this
//! object — there is no ambient global state.
//!
//! Compilation is single-threaded, so the lock is uncontended; it is
//! what lets a cloned tree (with its own registry) move to another
//! thread and compile there. The compiled accessors capture only the
//! interned name, never the registry.

use std::sync::Arc;

use parking_lot::RwLock;

use axon_diagnostic::{
    binding_kind_mismatch, internal, malformed_argument, missing_binding, no_possible_type,
    not_logically_valid, CompileResult,
};
use axon_types::{convertible, TypeMask, ValueKind};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::compiled::Compiled;
use crate::extensibility::FormatterSet;

/// One named parameter's resolution state.
#[derive(Clone, Debug)]
struct Slot {
    /// Domains the parameter may still turn out to have.
    possible: TypeMask,
    /// Set once the type is locked — by a strong determination, or
    /// automatically when weak narrowing leaves exactly one domain.
    determined: Option<ValueKind>,
}

impl Default for Slot {
    fn default() -> Self {
        Slot {
            possible: TypeMask::all(),
            determined: None,
        }
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    slots: FxHashMap<Arc<str>, Slot>,
}

/// Shared handle over the name-keyed parameter slots.
///
/// Cloning the handle shares the slots; a fresh registry (for a cloned
/// tree) starts empty and is populated by `import_slot`.
#[derive(Clone, Debug, Default)]
pub struct ParameterRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl ParameterRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        ParameterRegistry::default()
    }

    /// Create the slot for `name` on first reference; idempotent.
    ///
    /// Returns the interned name shared by every node referencing it.
    pub fn advertise(&self, name: &str) -> CompileResult<Arc<str>> {
        if name.is_empty() {
            return Err(malformed_argument("name", "parameter name is empty"));
        }
        let mut inner = self.inner.write();
        if let Some((existing, _)) = inner.slots.get_key_value(name) {
            return Ok(existing.clone());
        }
        let interned: Arc<str> = Arc::from(name);
        inner.slots.insert(interned.clone(), Slot::default());
        trace!(parameter = name, "advertised");
        Ok(interned)
    }

    /// Domains the named parameter may still have.
    ///
    /// A name that was never advertised reads as fully undetermined.
    pub fn possible_types(&self, name: &str) -> TypeMask {
        self.inner
            .read()
            .slots
            .get(name)
            .map_or(TypeMask::all(), |slot| slot.possible)
    }

    /// The locked domain, if the parameter has one.
    pub fn determined(&self, name: &str) -> Option<ValueKind> {
        self.inner
            .read()
            .slots
            .get(name)
            .and_then(|slot| slot.determined)
    }

    /// Lock the parameter to exactly one domain.
    ///
    /// Locking a second time to a different domain fails the compile.
    pub fn determine_strongly(&self, name: &str, kind: ValueKind) -> CompileResult<()> {
        let mut inner = self.inner.write();
        let slot = slot_mut(&mut inner, name)?;
        if let Some(existing) = slot.determined {
            if existing == kind {
                return Ok(());
            }
            return Err(not_logically_valid(format!(
                "parameter `{name}` is already determined {existing} and cannot become {kind}"
            )));
        }
        if !slot.possible.contains_kind(kind) {
            return Err(no_possible_type(TypeMask::of(kind), slot.possible));
        }
        slot.possible = TypeMask::of(kind);
        slot.determined = Some(kind);
        debug!(parameter = name, %kind, "strongly determined");
        Ok(())
    }

    /// Intersect the parameter's possible domains with `mask` (a weak
    /// determination).
    ///
    /// An empty intersection fails the compile; narrowing to exactly one
    /// domain auto-promotes to a strong determination.
    pub fn limit_possible_types(&self, name: &str, mask: TypeMask) -> CompileResult<TypeMask> {
        let mut inner = self.inner.write();
        let slot = slot_mut(&mut inner, name)?;
        let narrowed = slot.possible & mask;
        if narrowed.is_empty() {
            return Err(no_possible_type(mask, slot.possible));
        }
        if narrowed != slot.possible {
            trace!(parameter = name, from = %slot.possible, to = %narrowed, "weakly determined");
        }
        slot.possible = narrowed;
        if let Some(single) = narrowed.exactly_one() {
            slot.determined = Some(single);
        }
        Ok(narrowed)
    }

    /// Compiled accessor: reads the binding for `name` at invocation and
    /// presents it as `kind`.
    ///
    /// Each call returns a structurally-equal but independent artifact,
    /// so two nodes referencing the same name cache separately. Bindings
    /// in any domain the lattice can convert to `kind` are accepted.
    pub fn compile(
        &self,
        name: &str,
        kind: ValueKind,
        formatters: &FormatterSet,
    ) -> CompileResult<Compiled> {
        let inner = self.inner.read();
        let (interned, _) = inner
            .slots
            .get_key_value(name)
            .ok_or_else(|| internal(format!("parameter `{name}` was never advertised")))?;
        let interned = interned.clone();
        let formatters = formatters.clone();
        Ok(Compiled::new(kind, move |bindings| {
            let value = bindings
                .get(&interned)
                .ok_or_else(|| missing_binding(interned.to_string()))?;
            if value.kind() == kind {
                Ok(value.clone())
            } else if convertible(value.kind(), kind) {
                value.convert(kind, &formatters)
            } else {
                Err(binding_kind_mismatch(
                    interned.to_string(),
                    kind,
                    value.kind(),
                ))
            }
        }))
    }

    /// String-rendering accessor: any binding domain renders.
    pub fn compile_as_string(&self, name: &str, formatters: &FormatterSet) -> CompileResult<Compiled> {
        self.compile(name, ValueKind::String, formatters)
    }

    /// Names of every advertised parameter, sorted for determinism.
    pub fn names(&self) -> Vec<Arc<str>> {
        let mut names: Vec<Arc<str>> = self.inner.read().slots.keys().cloned().collect();
        names.sort();
        names
    }

    /// Install a slot carrying state from another registry.
    ///
    /// Used by deep cloning; an existing slot is narrowed to the
    /// intersection so repeated imports of the same name agree.
    pub(crate) fn import_slot(
        &self,
        name: Arc<str>,
        possible: TypeMask,
        determined: Option<ValueKind>,
    ) {
        let mut inner = self.inner.write();
        let slot = inner.slots.entry(name).or_default();
        slot.possible &= possible;
        if slot.determined.is_none() {
            slot.determined = determined;
        }
    }
}

fn slot_mut<'a>(inner: &'a mut RegistryInner, name: &str) -> CompileResult<&'a mut Slot> {
    inner
        .slots
        .get_mut(name)
        .ok_or_else(|| internal(format!("parameter `{name}` was never advertised")))
}
