//! Static fields have no receiver to depend on, so they default to `@Mutable`

use super::DefaultingStage;
use crate::config::CheckerConfig;
use crate::position::{Origin, PositionKind, TypePosition};
use crate::qualifier::Qualifier;

pub struct StaticFieldDefault;

impl DefaultingStage for StaticFieldDefault {
    fn name(&self) -> &'static str {
        "static-field"
    }

    fn applies_to(&self, position: &TypePosition, config: &CheckerConfig) -> bool {
        position.kind == PositionKind::StaticField
            && !position.is_explicit()
            && !config.is_implicitly_immutable(&position.host)
    }

    fn apply(&self, position: TypePosition, _config: &CheckerConfig) -> TypePosition {
        // Replaces whatever the generic pass propagated from the declaration context
        position.replace_unless_explicit(Qualifier::Mutable, Origin::Defaulted)
    }
}
