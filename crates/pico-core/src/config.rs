//! Checker configuration
//!
//! Loaded from JSON or TOML (chosen by file extension); every field has a
//! default, so a partial file only overrides what it names.

use crate::error::{EngineError, Result};
use crate::position::{HostType, PrimitiveKind};
use crate::qualifier::Qualifier;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Classes whose instances can never be modified once constructed
const DEFAULT_IMPLICITLY_IMMUTABLE: &[&str] = &[
    "java.lang.String",
    "java.lang.Number",
    "java.math.BigInteger",
    "java.math.BigDecimal",
    "java.lang.Class",
    "java.lang.Enum",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Declared types treated like primitives: only `@Immutable` is legal on them
    pub implicitly_immutable_types: IndexSet<String>,
    /// Foreign annotation names accepted as qualifiers of this hierarchy
    pub aliases: IndexMap<String, Qualifier>,
    /// Qualifier the generic defaulting pass gives unannotated positions
    pub default_qualifier: Qualifier,
    /// Apply the fixed defaults of `toString`, `hashCode`, `equals` and `clone`
    pub object_method_defaults: bool,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        let mut aliases = IndexMap::new();
        aliases.insert("org.jmlspecs.annotation.Readonly".to_string(), Qualifier::Readonly);

        Self {
            implicitly_immutable_types: DEFAULT_IMPLICITLY_IMMUTABLE.iter().map(|s| s.to_string()).collect(),
            aliases,
            default_qualifier: Qualifier::Mutable,
            object_method_defaults: true,
        }
    }
}

impl CheckerConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| EngineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Primitives, boxed primitives and the configured unmodifiable classes
    pub fn is_implicitly_immutable(&self, host: &HostType) -> bool {
        match host {
            HostType::Primitive(_) | HostType::Boxed(_) => true,
            HostType::Declared(name) => {
                PrimitiveKind::from_boxed_name(name).is_some() || self.implicitly_immutable_types.contains(name.as_str())
            }
            HostType::Array(_) | HostType::TypeVariable(_) | HostType::Null => false,
        }
    }

    /// Resolve an annotation name, honouring configured aliases first
    pub fn resolve_annotation(&self, name: &str) -> Result<Qualifier> {
        let trimmed = name.trim().trim_start_matches('@');
        match self.aliases.get(trimmed) {
            Some(q) => Ok(*q),
            None => trimmed.parse(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_implicitly_immutable() {
        let config = CheckerConfig::default();
        assert!(config.is_implicitly_immutable(&HostType::Primitive(PrimitiveKind::Int)));
        assert!(config.is_implicitly_immutable(&HostType::Boxed(PrimitiveKind::Double)));
        assert!(config.is_implicitly_immutable(&HostType::string()));
        assert!(config.is_implicitly_immutable(&HostType::declared("java.lang.Integer")));
        assert!(!config.is_implicitly_immutable(&HostType::object()));
        assert!(!config.is_implicitly_immutable(&HostType::Array(Box::new(HostType::Primitive(PrimitiveKind::Int)))));
    }

    #[test]
    fn test_alias_resolution() {
        let config = CheckerConfig::default();
        assert_eq!(
            config.resolve_annotation("@org.jmlspecs.annotation.Readonly").unwrap(),
            Qualifier::Readonly
        );
        assert_eq!(config.resolve_annotation("qual.Immutable").unwrap(), Qualifier::Immutable);
        assert!(config.resolve_annotation("org.example.Frozen").is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = CheckerConfig::from_json_str(r#"{"default_qualifier": "Readonly"}"#).unwrap();
        assert_eq!(config.default_qualifier, Qualifier::Readonly);
        assert!(config.object_method_defaults);
        assert!(config.implicitly_immutable_types.contains("java.lang.String"));
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "implicitly_immutable_types = [\"com.example.Money\"]\nobject_method_defaults = false"
        )
        .unwrap();

        let config = CheckerConfig::from_file(file.path()).unwrap();
        assert!(config.is_implicitly_immutable(&HostType::declared("com.example.Money")));
        assert!(!config.is_implicitly_immutable(&HostType::string()));
        assert!(!config.object_method_defaults);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = CheckerConfig::from_file(Path::new("/nonexistent/pico.json")).unwrap_err();
        assert!(matches!(err, EngineError::ConfigIo { .. }));
    }
}
