//! # PICO Core
//!
//! Qualifier reasoning for the PICO object-mutability type system.
//!
//! ## Modules
//!
//! - **[`qualifier`]** / **[`lattice`]** - The qualifier set and its partial order
//! - **[`defaults`]** - Ordered defaulting pipeline and annotation validation
//! - **[`viewpoint`]** - Receiver adaptation and call-site polymorphism
//! - **[`assignability`]** - Field-write and constructor legality
//! - **[`refinement`]** - Dataflow refinement under implicit immutability
//! - **[`init`]** - Composition with an initialization hierarchy
//! - **[`factory`]** - The facade a traversal collaborator drives
//!
//! ## Quick Start
//!
//! ```rust
//! use pico_core::prelude::*;
//!
//! let factory = QualifierFactory::new(CheckerConfig::default());
//! let sum = TypePosition::new(PositionKind::Binary, HostType::Primitive(PrimitiveKind::Int));
//! assert_eq!(factory.qualifier_of(sum).unwrap(), Qualifier::Immutable);
//!
//! assert_eq!(Qualifier::Mutable.join(Qualifier::Immutable), Qualifier::Readonly);
//! ```

pub mod assignability;
pub mod config;
pub mod defaults;
pub mod error;
pub mod factory;
pub mod init;
pub mod lattice;
pub mod position;
pub mod qualifier;
pub mod refinement;
pub mod viewpoint;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::assignability::{
        Assignability, AssignabilityChecker, ConstructorContext, FieldInfo, FieldWrite,
    };
    pub use crate::config::CheckerConfig;
    pub use crate::defaults::{DefaultingPipeline, DefaultingStage};
    pub use crate::error::{Diagnostic, DiagnosticKind, EngineError};
    pub use crate::factory::{QualifierFactory, TreeKind};
    pub use crate::init::{AnyQualifier, CombinedHierarchy, CompositeQualifier, InitializationLattice};
    pub use crate::lattice::{hierarchy, QualifierHierarchy};
    pub use crate::position::{Annotation, HostType, Origin, PositionKind, PrimitiveKind, TypePosition};
    pub use crate::qualifier::Qualifier;
    pub use crate::viewpoint::{MethodSignature, StaticBinding, ViewpointAdaptor};
}

pub use config::CheckerConfig;
pub use error::{Diagnostic, DiagnosticKind, EngineError, Result};
pub use factory::QualifierFactory;
pub use qualifier::Qualifier;
