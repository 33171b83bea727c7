//! Declaration model handed to the class checker
//!
//! A front end lowers source into this shape (classes with fields,
//! constructors and methods; bodies as statement lists) and serializes it as
//! JSON. Qualifiers are kept as the annotation names written in source so
//! that configured aliases can be resolved by the checker.

use pico_core::position::HostType;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything checked in one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilationUnit {
    #[serde(default)]
    pub classes: Vec<ClassDecl>,
}

impl CompilationUnit {
    pub fn from_json_str(content: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
        Self::from_json_str(&content)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub constructors: Vec<ConstructorDecl>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
}

impl ClassDecl {
    pub fn host(&self) -> HostType {
        HostType::declared(self.name.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    pub host: HostType,
    #[serde(default)]
    pub qualifier: Option<String>,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_final: bool,
    /// Annotated `@Assignable`
    #[serde(default)]
    pub assignable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    pub host: HostType,
    #[serde(default)]
    pub qualifier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorDecl {
    /// Qualifier of the constructed object
    #[serde(default)]
    pub qualifier: Option<String>,
    #[serde(default)]
    pub params: Vec<ParamDecl>,
    #[serde(default)]
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub receiver: Option<String>,
    #[serde(default)]
    pub params: Vec<ParamDecl>,
    /// Return host type; `None` for `void`
    #[serde(default)]
    pub returns: Option<HostType>,
    #[serde(default)]
    pub return_qualifier: Option<String>,
    #[serde(default)]
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stmt", rename_all = "snake_case")]
pub enum Stmt {
    Local {
        name: String,
        host: HostType,
        #[serde(default)]
        qualifier: Option<String>,
        #[serde(default)]
        init: Option<Expr>,
    },
    /// `name = value` for a local or parameter
    Assign { target: String, value: Expr },
    /// `receiver.field = value`
    FieldWrite { receiver: Expr, field: String, value: Expr },
    Expr { expr: Expr },
    Return {
        #[serde(default)]
        value: Option<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "expr", rename_all = "snake_case")]
pub enum Expr {
    This,
    Null,
    Literal { host: HostType },
    Var { name: String },
    FieldRead { receiver: Box<Expr>, field: String },
    New {
        class: String,
        #[serde(default)]
        qualifier: Option<String>,
        #[serde(default)]
        args: Vec<Expr>,
    },
    Call {
        receiver: Box<Expr>,
        method: String,
        #[serde(default)]
        args: Vec<Expr>,
    },
    StaticCall {
        class: String,
        method: String,
        #[serde(default)]
        args: Vec<Expr>,
    },
    Cast {
        host: HostType,
        #[serde(default)]
        qualifier: Option<String>,
        operand: Box<Expr>,
    },
    /// Operator application; `host` is the result type
    Binary { host: HostType, lhs: Box<Expr>, rhs: Box<Expr> },
}
