//! Implicitly immutable types: primitives, boxed primitives, strings and the like

use super::DefaultingStage;
use crate::config::CheckerConfig;
use crate::position::{Origin, TypePosition};
use crate::qualifier::Qualifier;

/// Forces `@Immutable` onto implicitly immutable types
pub struct ImplicitImmutability;

impl DefaultingStage for ImplicitImmutability {
    fn name(&self) -> &'static str {
        "implicit-immutability"
    }

    fn applies_to(&self, position: &TypePosition, config: &CheckerConfig) -> bool {
        config.is_implicitly_immutable(&position.host)
    }

    fn apply(&self, position: TypePosition, config: &CheckerConfig) -> TypePosition {
        coerce_if_implicitly_immutable(position, config)
    }
}

/// Replace any non-explicit qualifier of an implicitly immutable position with `@Immutable`.
///
/// Synthetic result types of binary expressions and casts never pass through
/// the generic defaulting pass, so the traversal calls this directly for them.
/// Explicit annotations are left for validation to report.
pub fn coerce_if_implicitly_immutable(position: TypePosition, config: &CheckerConfig) -> TypePosition {
    if !config.is_implicitly_immutable(&position.host) {
        return position;
    }
    if position.qualifier() == Some(Qualifier::Immutable) {
        return position;
    }
    position.replace_unless_explicit(Qualifier::Immutable, Origin::Defaulted)
}
