//! Pre-knowledge defaults for the universal object methods
//!
//! Every class inherits `toString`, `hashCode`, `equals` and `clone`, and
//! overriding declarations are rarely annotated. These defaults match the
//! library stubs so overrides agree with the methods they override.

use super::DefaultingStage;
use crate::config::CheckerConfig;
use crate::position::{Origin, PositionKind, TypePosition};
use crate::qualifier::Qualifier;

pub struct ObjectMethodDefaults;

impl ObjectMethodDefaults {
    /// The fixed qualifier for a signature position of an object method, if any
    pub fn qualifier_for(kind: &PositionKind) -> Option<Qualifier> {
        match kind {
            PositionKind::Receiver { method } => match method.as_str() {
                "toString" | "hashCode" | "equals" => Some(Qualifier::Readonly),
                "clone" => Some(Qualifier::ReceiverDependantMutable),
                _ => None,
            },
            PositionKind::Parameter { method, index: 0 } if method == "equals" => Some(Qualifier::Readonly),
            PositionKind::Return { method } if method == "clone" => Some(Qualifier::ReceiverDependantMutable),
            _ => None,
        }
    }
}

impl DefaultingStage for ObjectMethodDefaults {
    fn name(&self) -> &'static str {
        "object-methods"
    }

    fn applies_to(&self, position: &TypePosition, config: &CheckerConfig) -> bool {
        config.object_method_defaults
            && position.annotation.is_none()
            && Self::qualifier_for(&position.kind).is_some()
    }

    fn apply(&self, position: TypePosition, _config: &CheckerConfig) -> TypePosition {
        match Self::qualifier_for(&position.kind) {
            Some(q) => position.fill(q, Origin::Defaulted),
            None => position,
        }
    }
}
