//! Named parameter nodes.

use std::sync::Arc;

use axon_diagnostic::CompileResult;
use axon_types::{TypeMask, ValueKind};

use crate::compiled::Compiled;
use crate::extensibility::FormatterSet;
use crate::node::cost::select_strategy;
use crate::node::registry::ParameterRegistry;

/// A reference to a named slot in the shared registry.
///
/// Several nodes — across one tree or several — may reference the same
/// name; they all see the same slot, and narrowing triggered by any of
/// them is visible to all. The node itself holds no type state.
#[derive(Clone, Debug)]
pub struct ParameterNode {
    registry: ParameterRegistry,
    name: Arc<str>,
}

impl ParameterNode {
    /// Reference `name`, advertising it in the registry on first use.
    pub fn new(registry: &ParameterRegistry, name: &str) -> CompileResult<Self> {
        let name = registry.advertise(name)?;
        Ok(ParameterNode {
            registry: registry.clone(),
            name,
        })
    }

    /// The referenced name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Domains the parameter may still have, per the shared slot.
    pub fn possible_types(&self) -> TypeMask {
        self.registry.possible_types(&self.name)
    }

    /// Lock the parameter to exactly one domain.
    pub fn determine_strongly(&self, kind: ValueKind) -> CompileResult<()> {
        self.registry.determine_strongly(&self.name, kind)
    }

    /// Weak determination: intersect the still-possible domains.
    ///
    /// Auto-promotes to a strong determination when one domain remains.
    pub fn determine_weakly(&self, mask: TypeMask) -> CompileResult<TypeMask> {
        self.registry.limit_possible_types(&self.name, mask)
    }

    pub(crate) fn verify_possible_type(&self, mask: TypeMask) -> CompileResult<TypeMask> {
        self.determine_weakly(mask)
    }

    /// Accessor code for this reference.
    ///
    /// Legality is checked against the slot's current domains; the
    /// accessor itself converts whatever binding arrives at invocation.
    pub(crate) fn generate(
        &self,
        target: ValueKind,
        formatters: &FormatterSet,
    ) -> CompileResult<Compiled> {
        select_strategy(self.possible_types(), target)?;
        self.registry.compile(&self.name, target, formatters)
    }

    /// Re-reference this name against a fresh registry, carrying the
    /// narrowed slot state over.
    pub(crate) fn deep_clone(&self, registry: &ParameterRegistry) -> ParameterNode {
        registry.import_slot(
            self.name.clone(),
            self.possible_types(),
            self.registry.determined(&self.name),
        );
        ParameterNode {
            registry: registry.clone(),
            name: self.name.clone(),
        }
    }
}
