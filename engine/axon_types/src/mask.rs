//! Possible-type bitsets.

use std::fmt;

use bitflags::bitflags;

use crate::ValueKind;

bitflags! {
    /// The set of domains a node may still produce.
    ///
    /// A node's mask narrows monotonically while type resolution
    /// proceeds — it never widens. An empty mask is a terminal
    /// verification failure, never a valid resting state.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct TypeMask: u8 {
        const BOOLEAN = 1 << 0;
        const INTEGER = 1 << 1;
        const NUMERIC = 1 << 2;
        const BYTE_SEQUENCE = 1 << 3;
        const STRING = 1 << 4;
    }
}

impl TypeMask {
    /// Both numeric domains.
    pub const NUMERIC_FAMILY: TypeMask = TypeMask::INTEGER.union(TypeMask::NUMERIC);

    /// Mask with exactly one domain set.
    #[inline]
    pub const fn of(kind: ValueKind) -> TypeMask {
        match kind {
            ValueKind::Boolean => TypeMask::BOOLEAN,
            ValueKind::Integer => TypeMask::INTEGER,
            ValueKind::Numeric => TypeMask::NUMERIC,
            ValueKind::ByteSequence => TypeMask::BYTE_SEQUENCE,
            ValueKind::String => TypeMask::STRING,
        }
    }

    /// Whether `kind` is in the set.
    #[inline]
    pub const fn contains_kind(self, kind: ValueKind) -> bool {
        self.contains(TypeMask::of(kind))
    }

    /// The single remaining domain, if the set has narrowed to one.
    pub fn exactly_one(self) -> Option<ValueKind> {
        let mut found = None;
        for kind in ValueKind::ALL {
            if self.contains_kind(kind) {
                if found.is_some() {
                    return None;
                }
                found = Some(kind);
            }
        }
        found
    }

    /// The contained domains, in ordinal order.
    pub fn iter_kinds(self) -> impl Iterator<Item = ValueKind> {
        ValueKind::ALL
            .into_iter()
            .filter(move |&kind| self.contains_kind(kind))
    }
}

impl From<ValueKind> for TypeMask {
    fn from(kind: ValueKind) -> Self {
        TypeMask::of(kind)
    }
}

impl fmt::Display for TypeMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("(none)");
        }
        let mut first = true;
        for kind in self.iter_kinds() {
            if !first {
                f.write_str("|")?;
            }
            f.write_str(kind.name())?;
            first = false;
        }
        Ok(())
    }
}
