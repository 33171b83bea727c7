//! Fill-only fallbacks that run last

use super::DefaultingStage;
use crate::config::CheckerConfig;
use crate::position::{Origin, PositionKind, TypePosition};
use crate::qualifier::Qualifier;

/// `null` has no runtime object, so it is below every qualifier
pub struct NullLiteralDefault;

impl DefaultingStage for NullLiteralDefault {
    fn name(&self) -> &'static str {
        "null-literal"
    }

    fn applies_to(&self, position: &TypePosition, _config: &CheckerConfig) -> bool {
        position.kind == PositionKind::NullLiteral && position.annotation.is_none()
    }

    fn apply(&self, position: TypePosition, _config: &CheckerConfig) -> TypePosition {
        position.fill(Qualifier::Bottom, Origin::Defaulted)
    }
}

/// The generic default for anything still unannotated
pub struct GenericDefault;

impl DefaultingStage for GenericDefault {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn applies_to(&self, position: &TypePosition, _config: &CheckerConfig) -> bool {
        position.annotation.is_none()
    }

    fn apply(&self, position: TypePosition, config: &CheckerConfig) -> TypePosition {
        position.fill(config.default_qualifier, Origin::Defaulted)
    }
}
