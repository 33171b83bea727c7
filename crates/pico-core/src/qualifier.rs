//! Mutability qualifiers
//!
//! A qualifier is attached to every type position in the checked program.
//! Qualifiers are plain values: they carry no state and are compared only by
//! equality, so they are `Copy` and never mutated in place.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A qualifier from the mutability hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Qualifier {
    /// Top: a read-only view that assumes nothing about the aliased object
    Readonly,
    /// The object may be mutated through this reference
    Mutable,
    /// The object is never mutated through any reference
    Immutable,
    /// Signature-only qualifier: "same mutability as the receiver or the
    /// constructed object", resolved per call site
    PolyMutable,
    /// Declaration qualifier whose meaning is the qualifier of the receiver the
    /// member is viewed through
    ReceiverDependantMutable,
    /// Placeholder that replaces `PolyMutable` at static invocation sites
    SubstitutablePolyMutable,
    /// Bottom: the type of expressions with no runtime value (`null`)
    Bottom,
}

impl Qualifier {
    /// Every qualifier of the hierarchy, top first
    pub const ALL: [Qualifier; 7] = [
        Qualifier::Readonly,
        Qualifier::Mutable,
        Qualifier::Immutable,
        Qualifier::PolyMutable,
        Qualifier::ReceiverDependantMutable,
        Qualifier::SubstitutablePolyMutable,
        Qualifier::Bottom,
    ];

    /// Dense index used by the lattice table
    pub(crate) const fn index(self) -> usize {
        match self {
            Qualifier::Readonly => 0,
            Qualifier::Mutable => 1,
            Qualifier::Immutable => 2,
            Qualifier::PolyMutable => 3,
            Qualifier::ReceiverDependantMutable => 4,
            Qualifier::SubstitutablePolyMutable => 5,
            Qualifier::Bottom => 6,
        }
    }

    /// The simple annotation name, as written in source (`Immutable`)
    pub fn simple_name(self) -> &'static str {
        match self {
            Qualifier::Readonly => "Readonly",
            Qualifier::Mutable => "Mutable",
            Qualifier::Immutable => "Immutable",
            Qualifier::PolyMutable => "PolyMutable",
            Qualifier::ReceiverDependantMutable => "ReceiverDependantMutable",
            Qualifier::SubstitutablePolyMutable => "SubstitutablePolyMutable",
            Qualifier::Bottom => "Bottom",
        }
    }

    /// The annotation as it appears in diagnostics (`@Immutable`)
    pub fn annotation_name(self) -> String {
        format!("@{}", self.simple_name())
    }

    /// Qualifiers whose meaning depends on a receiver or a call site
    pub fn is_polymorphic(self) -> bool {
        matches!(
            self,
            Qualifier::PolyMutable
                | Qualifier::ReceiverDependantMutable
                | Qualifier::SubstitutablePolyMutable
        )
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.simple_name())
    }
}

impl FromStr for Qualifier {
    type Err = EngineError;

    /// Accepts `Immutable`, `@Immutable` and the fully qualified `qual.Immutable`.
    /// `PolyImmutable` is the older spelling of `PolyMutable` and is still accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('@');
        let simple = trimmed.rsplit('.').next().unwrap_or(trimmed);
        match simple {
            "Readonly" => Ok(Qualifier::Readonly),
            "Mutable" => Ok(Qualifier::Mutable),
            "Immutable" => Ok(Qualifier::Immutable),
            "PolyMutable" | "PolyImmutable" => Ok(Qualifier::PolyMutable),
            "ReceiverDependantMutable" => Ok(Qualifier::ReceiverDependantMutable),
            "SubstitutablePolyMutable" => Ok(Qualifier::SubstitutablePolyMutable),
            "Bottom" => Ok(Qualifier::Bottom),
            _ => Err(EngineError::UnknownQualifier(s.to_string())),
        }
    }
}
