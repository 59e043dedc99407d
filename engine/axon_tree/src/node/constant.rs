//! Typed literal nodes.

use axon_diagnostic::{conversion_impossible, internal, no_possible_type, CompileResult};
use axon_types::{legal_conversions, TypeMask, ValueKind};

use crate::compiled::Compiled;
use crate::extensibility::FormatterSet;
use crate::value::Value;

/// An immutable literal holding one canonical value plus a pre-built
/// representation for every domain it can present as.
///
/// Representations are computed once at construction — an integer
/// constant immediately carries its numeric, byte and string forms.
/// Simplification is the identity: a constant is already maximally
/// reduced. Constants never participate in registry narrowing.
#[derive(Clone, Debug)]
pub struct ConstantNode {
    value: Value,
    representations: [Option<Value>; 5],
}

impl ConstantNode {
    /// Build from a literal, precomputing every lattice-legal form.
    pub fn new(value: Value, formatters: &FormatterSet) -> CompileResult<Self> {
        let kind = value.kind();
        let mut representations: [Option<Value>; 5] = std::array::from_fn(|_| None);
        for target in legal_conversions(kind).iter_kinds() {
            let representation = value.convert(target, formatters).map_err(|err| {
                internal(format!(
                    "a {kind} constant failed to precompute its {target} form: {err}"
                ))
            })?;
            representations[target.ordinal() as usize] = Some(representation);
        }
        Ok(ConstantNode {
            value,
            representations,
        })
    }

    /// Canonical domain of the literal.
    pub fn kind(&self) -> ValueKind {
        self.value.kind()
    }

    /// The canonical value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Pre-built representation in `target`, when the lattice allows it.
    pub fn representation(&self, target: ValueKind) -> Option<&Value> {
        self.representations[target.ordinal() as usize].as_ref()
    }

    /// Domains this literal can present as.
    pub fn representable(&self) -> TypeMask {
        legal_conversions(self.kind())
    }

    pub(crate) fn verify_possible_type(&self, mask: TypeMask) -> CompileResult<TypeMask> {
        let representable = self.representable();
        let narrowed = representable & mask;
        if narrowed.is_empty() {
            return Err(no_possible_type(mask, representable));
        }
        Ok(narrowed)
    }

    /// The precomputed representation as ready code.
    ///
    /// A target outside the literal's representable set fails the
    /// compile — e.g. the boolean view of a string constant.
    pub(crate) fn generate(&self, target: ValueKind) -> CompileResult<Compiled> {
        match self.representation(target) {
            Some(representation) => Ok(Compiled::constant(representation.clone())),
            None => Err(conversion_impossible(self.kind(), target)),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
