//! # PICO Analysis
//!
//! Drives the qualifier engine of `pico-core` over a declaration model and
//! reports on the result.
//!
//! ## Modules
//!
//! - **[`model`]** - Serializable classes, members, statements and expressions
//! - **[`checker`]** - The class checker producing located diagnostics
//! - **[`init`]** - Freedom-before-commitment initialization states
//! - **[`metrics`]** - Qualifier coverage and diagnostic distribution
//! - **[`verify`]** - Exhaustive and sampled verification of the engine's laws
//!
//! ## Quick Start
//!
//! ```rust
//! use pico_analysis::prelude::*;
//!
//! let unit = CompilationUnit::from_json_str(r#"{"classes": []}"#).unwrap();
//! let report = check_unit(&QualifierFactory::default(), &unit).unwrap();
//! assert!(!report.has_errors());
//!
//! let metrics = Analyzer::new().analyze(&report);
//! assert_eq!(metrics.diagnostics.total, 0);
//! ```

pub mod checker;
pub mod error;
pub mod init;
pub mod metrics;
pub mod model;
pub mod verify;

use std::path::Path;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::checker::{check_unit, CheckReport, ClassChecker, ConstructorSummary, LocatedDiagnostic, Location};
    pub use crate::error::CheckError;
    pub use crate::init::{FreedomBeforeCommitment, InitState};
    pub use crate::metrics::{AnalysisResult, Analyzer, DiagnosticSummary, QualifierCoverage, QualifierDistribution};
    pub use crate::model::{ClassDecl, CompilationUnit, ConstructorDecl, Expr, FieldDecl, MethodDecl, ParamDecl, Stmt};
    pub use crate::verify::{PropertyStatus, PropertyVerifier, VerificationMethod, VerificationResult};
    pub use pico_core::{CheckerConfig, QualifierFactory};
}

pub use checker::{check_unit, CheckReport, ClassChecker, LocatedDiagnostic};
pub use error::CheckError;
pub use metrics::{AnalysisResult, Analyzer};
pub use model::CompilationUnit;
pub use verify::{PropertyStatus, PropertyVerifier, VerificationResult};

/// Load a model file and check it
pub fn check_file(factory: &pico_core::QualifierFactory, path: &Path) -> anyhow::Result<CheckReport> {
    let unit = CompilationUnit::from_file(path)?;
    tracing::info!(path = %path.display(), classes = unit.classes.len(), "loaded model");
    Ok(check_unit(factory, &unit)?)
}
