//! Type positions: every place in a program where a type is written or computed

use crate::qualifier::Qualifier;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Host-language primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 8] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Byte,
        PrimitiveKind::Char,
        PrimitiveKind::Short,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
    ];

    /// The primitive wrapped by the class `name`, if it is a wrapper class
    pub fn from_boxed_name(name: &str) -> Option<PrimitiveKind> {
        Self::ALL.into_iter().find(|p| p.boxed_name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        }
    }

    /// The wrapper class of this primitive
    pub fn boxed_name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "java.lang.Boolean",
            PrimitiveKind::Byte => "java.lang.Byte",
            PrimitiveKind::Char => "java.lang.Character",
            PrimitiveKind::Short => "java.lang.Short",
            PrimitiveKind::Int => "java.lang.Integer",
            PrimitiveKind::Long => "java.lang.Long",
            PrimitiveKind::Float => "java.lang.Float",
            PrimitiveKind::Double => "java.lang.Double",
        }
    }
}

/// The underlying (unqualified) host type of a position
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostType {
    Primitive(PrimitiveKind),
    Boxed(PrimitiveKind),
    /// A declared class or interface, by qualified name
    Declared(String),
    Array(Box<HostType>),
    TypeVariable(String),
    /// The type of the `null` literal
    Null,
}

impl HostType {
    pub fn declared(name: impl Into<String>) -> Self {
        HostType::Declared(name.into())
    }

    pub fn string() -> Self {
        HostType::Declared("java.lang.String".to_string())
    }

    pub fn object() -> Self {
        HostType::Declared("java.lang.Object".to_string())
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostType::Primitive(p) => f.write_str(p.name()),
            HostType::Boxed(p) => f.write_str(p.boxed_name()),
            HostType::Declared(name) | HostType::TypeVariable(name) => f.write_str(name),
            HostType::Array(elem) => write!(f, "{elem}[]"),
            HostType::Null => f.write_str("null"),
        }
    }
}

/// Syntactic role of a type position
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PositionKind {
    StaticField,
    InstanceField,
    Receiver { method: String },
    Parameter { method: String, index: usize },
    Return { method: String },
    ConstructorReturn,
    Local,
    Cast,
    Binary,
    NullLiteral,
    NewObject,
}

impl fmt::Display for PositionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionKind::StaticField => f.write_str("static field"),
            PositionKind::InstanceField => f.write_str("field"),
            PositionKind::Receiver { method } => write!(f, "receiver of {method}"),
            PositionKind::Parameter { method, index } => write!(f, "parameter {index} of {method}"),
            PositionKind::Return { method } => write!(f, "return of {method}"),
            PositionKind::ConstructorReturn => f.write_str("constructor return"),
            PositionKind::Local => f.write_str("local variable"),
            PositionKind::Cast => f.write_str("cast"),
            PositionKind::Binary => f.write_str("binary expression"),
            PositionKind::NullLiteral => f.write_str("null literal"),
            PositionKind::NewObject => f.write_str("object creation"),
        }
    }
}

/// Where a qualifier on a position came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Written in source
    Explicit,
    /// Attached by the external generic propagation pass
    Propagated,
    /// Supplied by the defaulting pipeline
    Defaulted,
    /// Narrowed by flow-sensitive refinement
    Refined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub qualifier: Qualifier,
    pub origin: Origin,
}

/// A type position together with the qualifier computed for it so far
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypePosition {
    pub kind: PositionKind,
    pub host: HostType,
    pub annotation: Option<Annotation>,
}

impl TypePosition {
    pub fn new(kind: PositionKind, host: HostType) -> Self {
        Self {
            kind,
            host,
            annotation: None,
        }
    }

    /// Position with an explicit source annotation (if `qualifier` is `Some`)
    pub fn with_explicit(kind: PositionKind, host: HostType, qualifier: Option<Qualifier>) -> Self {
        Self {
            kind,
            host,
            annotation: qualifier.map(|qualifier| Annotation {
                qualifier,
                origin: Origin::Explicit,
            }),
        }
    }

    pub fn qualifier(&self) -> Option<Qualifier> {
        self.annotation.map(|a| a.qualifier)
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self.annotation, Some(Annotation { origin: Origin::Explicit, .. }))
    }

    /// Attach `qualifier` only when the position has none yet
    pub fn fill(mut self, qualifier: Qualifier, origin: Origin) -> Self {
        if self.annotation.is_none() {
            self.annotation = Some(Annotation { qualifier, origin });
        }
        self
    }

    /// Attach `qualifier`, replacing anything that was not written in source
    pub fn replace_unless_explicit(mut self, qualifier: Qualifier, origin: Origin) -> Self {
        if !self.is_explicit() {
            self.annotation = Some(Annotation { qualifier, origin });
        }
        self
    }
}

impl fmt::Display for TypePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.qualifier() {
            Some(q) => write!(f, "{} {} ({})", q, self.host, self.kind),
            None => write!(f, "{} ({})", self.host, self.kind),
        }
    }
}
