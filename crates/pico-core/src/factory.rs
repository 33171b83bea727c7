//! Qualifier factory
//!
//! The single entry point a traversal collaborator talks to. It owns the
//! configuration and the defaulting pipeline and delegates every rule to the
//! stateless components (lattice, viewpoint adaptor, assignability checker).

use crate::assignability::FieldInfo;
use crate::config::CheckerConfig;
use crate::defaults::{coerce_if_implicitly_immutable, validate_position, DefaultingPipeline};
use crate::error::{Diagnostic, EngineError, Result};
use crate::position::{HostType, PositionKind, TypePosition};
use crate::qualifier::Qualifier;
use crate::refinement;
use crate::viewpoint::{MethodSignature, ViewpointAdaptor};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace};

/// Syntactic kind of a tree handed to [`QualifierFactory::lhs_qualifier`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeKind {
    Variable,
    Identifier,
    MemberSelect,
    ArrayAccess,
    /// A type tree, e.g. the target of an annotated cast
    TypeTree,
    MethodInvocation,
    NewObject,
    Literal,
    Binary,
    Cast,
    Conditional,
    Lambda,
}

impl TreeKind {
    /// Trees that can appear on the left of an assignment
    pub fn is_assignment_target(self) -> bool {
        matches!(
            self,
            TreeKind::Variable
                | TreeKind::Identifier
                | TreeKind::MemberSelect
                | TreeKind::ArrayAccess
                | TreeKind::TypeTree
        )
    }
}

impl fmt::Display for TreeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

pub struct QualifierFactory {
    config: CheckerConfig,
    pipeline: DefaultingPipeline,
}

impl QualifierFactory {
    pub fn new(config: CheckerConfig) -> Self {
        Self::with_pipeline(config, DefaultingPipeline::new())
    }

    /// Factory with a custom stage order
    pub fn with_pipeline(config: CheckerConfig, pipeline: DefaultingPipeline) -> Self {
        debug!(stages = ?pipeline.stage_names(), "qualifier factory ready");
        Self { config, pipeline }
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Run the defaulting pipeline over `position`
    pub fn annotate(&self, position: TypePosition) -> TypePosition {
        let annotated = self.pipeline.run(position, &self.config);
        match annotated.kind {
            // Results of operators and casts are re-checked after propagation
            PositionKind::Binary | PositionKind::Cast => coerce_if_implicitly_immutable(annotated, &self.config),
            _ => annotated,
        }
    }

    /// The resolved qualifier of `position`
    pub fn qualifier_of(&self, position: TypePosition) -> Result<Qualifier> {
        let annotated = self.annotate(position);
        annotated
            .qualifier()
            .ok_or_else(|| EngineError::MissingQualifier(annotated.kind.to_string()))
    }

    /// Qualifier of an unannotated position
    pub fn default_qualifier(&self, kind: PositionKind, host: HostType) -> Qualifier {
        self.pipeline.default_qualifier(kind, host, &self.config)
    }

    /// Declared (unrefined) qualifier of an assignment target
    pub fn lhs_qualifier(&self, tree: TreeKind, position: TypePosition) -> Result<Qualifier> {
        if !tree.is_assignment_target() {
            return Err(EngineError::UnexpectedLhs(tree.to_string()));
        }
        self.qualifier_of(position)
    }

    /// Resolve a signature at a call site
    pub fn method_from_use(&self, signature: &MethodSignature, receiver: Option<Qualifier>) -> MethodSignature {
        let resolved = ViewpointAdaptor::method_from_use(signature, receiver);
        trace!(method = %signature.name, ?receiver, ret = %resolved.ret, "resolved signature at use");
        resolved
    }

    /// Accept a dataflow refinement, keeping implicitly immutable types `@Immutable`
    pub fn apply_inferred(&self, position: TypePosition, proposed: Qualifier) -> TypePosition {
        refinement::apply_inferred(position, proposed, &self.config)
    }

    /// The qualifier the initialization tracker checks fields against
    pub fn field_invariant_qualifier(&self) -> Qualifier {
        Qualifier::Immutable
    }

    pub fn has_field_invariant(&self, field: &FieldInfo) -> bool {
        field.has_invariant()
    }

    /// Positional legality of an explicitly annotated position
    pub fn validate(&self, position: &TypePosition) -> Option<Diagnostic> {
        validate_position(position, &self.config)
    }

    /// Qualifier for an annotation name, honouring configured aliases
    pub fn resolve_annotation(&self, name: &str) -> Result<Qualifier> {
        self.config.resolve_annotation(name)
    }
}

impl Default for QualifierFactory {
    fn default() -> Self {
        Self::new(CheckerConfig::default())
    }
}
