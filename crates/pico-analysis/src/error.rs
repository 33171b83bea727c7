//! Failures of a checking run that are not user diagnostics

use pico_core::EngineError;
use thiserror::Error;

/// The model refers to something it does not declare, or the engine failed
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("unknown class `{0}`")]
    UnknownClass(String),

    #[error("class {class} has no field `{field}`")]
    UnknownField { class: String, field: String },

    #[error("class {class} has no method `{method}` taking {arity} arguments")]
    UnknownMethod { class: String, method: String, arity: usize },

    #[error("class {class} has no constructor taking {arity} arguments")]
    UnknownConstructor { class: String, arity: usize },

    #[error("unknown variable `{0}` in {1}")]
    UnknownVariable(String, String),

    #[error("`this` used in static context {0}")]
    ThisInStatic(String),

    #[error("cannot select a member of non-class type {0}")]
    NotAClass(String),
}

pub type Result<T> = std::result::Result<T, CheckError>;
