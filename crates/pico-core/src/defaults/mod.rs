//! Defaulting engine
//!
//! Unannotated type positions receive their qualifier from an ordered
//! pipeline of stages. Each stage is a pure function over a
//! [`TypePosition`]; the order is fixed here and is part of the semantics:
//!
//! 1. implicitly immutable types become `@Immutable`, replacing anything not
//!    written in source
//! 2. static fields default to `@Mutable`
//! 3. fixed defaults for `toString`, `hashCode`, `equals` and `clone`
//! 4. the null literal is `@Bottom`
//! 5. everything still unannotated gets the generic default
//!
//! Stages 3 to 5 only fill gaps, so an earlier stage is never clobbered by a
//! later one.

mod generic;
mod implicit;
mod object_methods;
mod static_field;
mod validate;

use crate::config::CheckerConfig;
use crate::position::{HostType, PositionKind, TypePosition};
use crate::qualifier::Qualifier;
use tracing::debug;

pub use generic::{GenericDefault, NullLiteralDefault};
pub use implicit::{coerce_if_implicitly_immutable, ImplicitImmutability};
pub use object_methods::ObjectMethodDefaults;
pub use static_field::StaticFieldDefault;
pub use validate::validate_position;

/// One step of the defaulting pipeline
pub trait DefaultingStage {
    /// Stage name, for tracing
    fn name(&self) -> &'static str;

    /// Check if this stage has anything to say about the position
    fn applies_to(&self, position: &TypePosition, config: &CheckerConfig) -> bool;

    /// Compute the updated position
    fn apply(&self, position: TypePosition, config: &CheckerConfig) -> TypePosition;
}

/// Ordered registry of defaulting stages
pub struct DefaultingPipeline {
    stages: Vec<Box<dyn DefaultingStage + Send + Sync>>,
}

impl DefaultingPipeline {
    pub fn new() -> Self {
        let mut pipeline = Self::empty();

        pipeline.register(Box::new(ImplicitImmutability));
        pipeline.register(Box::new(StaticFieldDefault));
        pipeline.register(Box::new(ObjectMethodDefaults));
        pipeline.register(Box::new(NullLiteralDefault));
        pipeline.register(Box::new(GenericDefault));

        pipeline
    }

    /// A pipeline with no stages, for custom orders
    pub fn empty() -> Self {
        Self { stages: Vec::new() }
    }

    /// Append a stage; it runs after every stage registered before it
    pub fn register(&mut self, stage: Box<dyn DefaultingStage + Send + Sync>) {
        self.stages.push(stage);
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every applicable stage in order
    pub fn run(&self, position: TypePosition, config: &CheckerConfig) -> TypePosition {
        self.stages.iter().fold(position, |pos, stage| {
            if !stage.applies_to(&pos, config) {
                return pos;
            }
            let before = pos.qualifier();
            let after = stage.apply(pos, config);
            if before != after.qualifier() {
                debug!(
                    stage = stage.name(),
                    kind = %after.kind,
                    from = ?before,
                    to = ?after.qualifier(),
                    "defaulted qualifier"
                );
            }
            after
        })
    }

    /// The qualifier an unannotated position of `kind` and `host` receives
    pub fn default_qualifier(&self, kind: PositionKind, host: HostType, config: &CheckerConfig) -> Qualifier {
        self.run(TypePosition::new(kind, host), config)
            .qualifier()
            .unwrap_or(config.default_qualifier)
    }
}

impl Default for DefaultingPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::{Origin, PrimitiveKind};

    fn run(position: TypePosition) -> TypePosition {
        DefaultingPipeline::new().run(position, &CheckerConfig::default())
    }

    #[test]
    fn test_stage_order() {
        assert_eq!(
            DefaultingPipeline::new().stage_names(),
            vec!["implicit-immutability", "static-field", "object-methods", "null-literal", "generic"]
        );
    }

    #[test]
    fn test_primitive_local_is_immutable() {
        let pos = run(TypePosition::new(PositionKind::Local, HostType::Primitive(PrimitiveKind::Int)));
        assert_eq!(pos.qualifier(), Some(Qualifier::Immutable));
    }

    #[test]
    fn test_implicit_immutability_overrides_propagated() {
        let pos = TypePosition::new(PositionKind::Binary, HostType::Primitive(PrimitiveKind::Int))
            .fill(Qualifier::Mutable, Origin::Propagated);
        assert_eq!(run(pos).qualifier(), Some(Qualifier::Immutable));
    }

    #[test]
    fn test_static_field_is_mutable() {
        let pos = run(TypePosition::new(PositionKind::StaticField, HostType::object()));
        assert_eq!(pos.qualifier(), Some(Qualifier::Mutable));

        let string_field = run(TypePosition::new(PositionKind::StaticField, HostType::string()));
        assert_eq!(string_field.qualifier(), Some(Qualifier::Immutable));
    }

    #[test]
    fn test_static_field_keeps_explicit() {
        let pos = run(TypePosition::with_explicit(
            PositionKind::StaticField,
            HostType::object(),
            Some(Qualifier::Immutable),
        ));
        assert_eq!(pos.qualifier(), Some(Qualifier::Immutable));
        assert!(pos.is_explicit());
    }

    #[test]
    fn test_object_method_defaults_beat_generic_default() {
        let receiver = run(TypePosition::new(
            PositionKind::Receiver { method: "hashCode".to_string() },
            HostType::object(),
        ));
        assert_eq!(receiver.qualifier(), Some(Qualifier::Readonly));

        let clone_return = run(TypePosition::new(
            PositionKind::Return { method: "clone".to_string() },
            HostType::object(),
        ));
        assert_eq!(clone_return.qualifier(), Some(Qualifier::ReceiverDependantMutable));
    }

    #[test]
    fn test_null_literal_is_bottom() {
        let pos = run(TypePosition::new(PositionKind::NullLiteral, HostType::Null));
        assert_eq!(pos.qualifier(), Some(Qualifier::Bottom));
    }

    #[test]
    fn test_generic_default_from_config() {
        let config = CheckerConfig {
            default_qualifier: Qualifier::Readonly,
            ..CheckerConfig::default()
        };
        let q = DefaultingPipeline::new().default_qualifier(PositionKind::Local, HostType::object(), &config);
        assert_eq!(q, Qualifier::Readonly);
    }

    #[test]
    fn test_explicit_annotation_survives_pipeline() {
        let pos = run(TypePosition::with_explicit(
            PositionKind::Parameter { method: "equals".to_string(), index: 0 },
            HostType::object(),
            Some(Qualifier::Immutable),
        ));
        assert_eq!(pos.qualifier(), Some(Qualifier::Immutable));
    }
}
