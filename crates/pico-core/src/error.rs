//! Diagnostics reported to the user and fatal engine errors
//!
//! A [`Diagnostic`] is a normal result of checking: the program under check
//! violates a qualifier rule. An [`EngineError`] means the engine itself was
//! driven into a state it cannot handle and the check must abort.

use crate::qualifier::Qualifier;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Kinds of user-facing qualifier violations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// Cast target qualifier is impossible for the underlying type
    InvalidCastQualifier,
    /// Explicit qualifier is impossible for the position or its type
    TypeInvalid,
    /// Write through a receiver that does not permit mutation
    IllegalWrite,
    /// Value qualifier is not a subtype of the (adapted) field qualifier
    AssignmentTypeIncompatible,
    /// Constructor declaration is structurally illegal
    ConstructorInvalid,
    /// Requested object-creation qualifier does not match the constructor
    ConstructorInvocationInvalid,
    /// `new @Readonly T(..)`
    ReadonlyObjectCreation,
    /// Argument qualifier is not a subtype of the adapted parameter qualifier
    ArgumentTypeIncompatible,
    /// Returned value is not a subtype of the declared return qualifier
    ReturnTypeIncompatible,
    /// Receiver qualifier is not a subtype of the method's adapted receiver
    MethodInvocationInvalid,
}

impl DiagnosticKind {
    /// Stable message key, as used by the expected-error markers of test inputs
    pub fn key(self) -> &'static str {
        match self {
            DiagnosticKind::InvalidCastQualifier | DiagnosticKind::TypeInvalid => "type.invalid",
            DiagnosticKind::IllegalWrite => "illegal.write",
            DiagnosticKind::AssignmentTypeIncompatible => "assignment.type.incompatible",
            DiagnosticKind::ConstructorInvalid => "constructor.invalid",
            DiagnosticKind::ConstructorInvocationInvalid => "constructor.invocation.invalid",
            DiagnosticKind::ReadonlyObjectCreation => "pico.new",
            DiagnosticKind::ArgumentTypeIncompatible => "argument.type.incompatible",
            DiagnosticKind::ReturnTypeIncompatible => "return.type.incompatible",
            DiagnosticKind::MethodInvocationInvalid => "method.invocation.invalid",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A single qualifier violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn incompatible(kind: DiagnosticKind, found: Qualifier, required: Qualifier) -> Self {
        Self::new(kind, format!("found {found}, required {required}"))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) {}", self.kind.key(), self.message)
    }
}

/// Fatal failures of the engine itself
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unexpected tree passed as assignment target: {0}")]
    UnexpectedLhs(String),

    #[error("cannot relate {mutability} with initialization state {initialization}")]
    MixedHierarchies { mutability: Qualifier, initialization: String },

    #[error("no qualifier for {0} after defaulting")]
    MissingQualifier(String),

    #[error("unknown qualifier `{0}`")]
    UnknownQualifier(String),

    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON config: {0}")]
    ConfigJson(#[from] serde_json::Error),

    #[error("invalid TOML config: {0}")]
    ConfigToml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic::incompatible(
            DiagnosticKind::AssignmentTypeIncompatible,
            Qualifier::PolyMutable,
            Qualifier::Immutable,
        );
        insta::assert_snapshot!(d.to_string(), @"(assignment.type.incompatible) found @PolyMutable, required @Immutable");
    }

    #[test]
    fn test_cast_and_type_invalid_share_key() {
        assert_eq!(DiagnosticKind::InvalidCastQualifier.key(), DiagnosticKind::TypeInvalid.key());
    }

    #[test]
    fn test_engine_error_messages() {
        let err = EngineError::UnexpectedLhs("MethodInvocation".to_string());
        assert_eq!(err.to_string(), "unexpected tree passed as assignment target: MethodInvocation");
    }
}
