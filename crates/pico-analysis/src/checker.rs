//! Class checker
//!
//! Walks a [`CompilationUnit`] and asks the qualifier factory for every
//! qualifier and legality decision. Declarations are resolved in a first
//! pass so bodies can refer to members of any class in the unit.

use crate::error::{CheckError, Result};
use crate::init::{FreedomBeforeCommitment, InitState};
use crate::model::{ClassDecl, CompilationUnit, ConstructorDecl, Expr, MethodDecl, ParamDecl, Stmt};
use indexmap::{IndexMap, IndexSet};
use pico_core::assignability::{Assignability, AssignabilityChecker, ConstructorContext, FieldInfo, FieldWrite};
use pico_core::factory::TreeKind;
use pico_core::init::{CombinedHierarchy, CompositeQualifier};
use pico_core::lattice::hierarchy;
use pico_core::position::{HostType, Origin, PositionKind, TypePosition};
use pico_core::viewpoint::{MethodSignature, ViewpointAdaptor};
use pico_core::{Diagnostic, DiagnosticKind, EngineError, Qualifier, QualifierFactory};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

const CONSTRUCTOR_NAME: &str = "<init>";

/// Class and member a diagnostic belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub class: String,
    pub member: String,
}

impl Location {
    fn new(class: &str, member: impl Into<String>) -> Self {
        Self {
            class: class.to_string(),
            member: member.into(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.class, self.member)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatedDiagnostic {
    pub location: Location,
    #[serde(flatten)]
    pub diagnostic: Diagnostic,
}

impl fmt::Display for LocatedDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.diagnostic)
    }
}

/// Object state at the end of one constructor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorSummary {
    pub location: Location,
    pub object: CompositeQualifier<InitState>,
    /// Fields with an initialization invariant the constructor never writes
    pub uninitialized: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckReport {
    pub diagnostics: Vec<LocatedDiagnostic>,
    /// Every declared position, after defaulting
    pub positions: Vec<TypePosition>,
    pub constructors: Vec<ConstructorSummary>,
    /// Qualifier of a freshly constructed object, joined over the class's constructors
    pub objects: IndexMap<String, CompositeQualifier<InitState>>,
}

impl CheckReport {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Diagnostic keys in report order
    pub fn keys(&self) -> Vec<&'static str> {
        self.diagnostics.iter().map(|d| d.diagnostic.kind.key()).collect()
    }

    /// Diagnostics reported for one member
    pub fn for_member(&self, class: &str, member: &str) -> Vec<DiagnosticKind> {
        self.diagnostics
            .iter()
            .filter(|d| d.location.class == class && d.location.member == member)
            .map(|d| d.diagnostic.kind)
            .collect()
    }
}

#[derive(Debug, Clone)]
struct ResolvedField {
    info: FieldInfo,
    host: HostType,
}

#[derive(Debug, Clone)]
struct ResolvedParam {
    name: String,
    host: HostType,
    position: TypePosition,
}

#[derive(Debug, Clone)]
struct ResolvedConstructor {
    ret: Qualifier,
    params: Vec<ResolvedParam>,
}

#[derive(Debug, Clone)]
struct ResolvedMethod {
    signature: MethodSignature,
    params: Vec<ResolvedParam>,
    returns: Option<HostType>,
}

#[derive(Debug, Default)]
struct ClassTable {
    fields: IndexMap<String, ResolvedField>,
    constructors: Vec<ResolvedConstructor>,
    methods: Vec<ResolvedMethod>,
}

/// Host type and qualifier of an expression
#[derive(Debug, Clone)]
struct Typed {
    host: HostType,
    qualifier: Qualifier,
}

#[derive(Debug, Clone)]
struct Var {
    host: HostType,
    /// Declared position, already defaulted
    declared: TypePosition,
    current: Qualifier,
}

struct Scope<'a> {
    class: &'a ClassDecl,
    location: Location,
    receiver: Option<Qualifier>,
    constructor: Option<ConstructorContext>,
    return_qualifier: Option<Qualifier>,
    vars: IndexMap<String, Var>,
    written: IndexSet<String>,
}

impl<'a> Scope<'a> {
    fn new(class: &'a ClassDecl, member: impl Into<String>) -> Self {
        Self {
            class,
            location: Location::new(&class.name, member),
            receiver: None,
            constructor: None,
            return_qualifier: None,
            vars: IndexMap::new(),
            written: IndexSet::new(),
        }
    }

    fn bind_params(&mut self, params: &[ResolvedParam]) -> Result<()> {
        for param in params {
            let current = qualifier(&param.position)?;
            self.vars.insert(
                param.name.clone(),
                Var {
                    host: param.host.clone(),
                    declared: param.position.clone(),
                    current,
                },
            );
        }
        Ok(())
    }
}

fn qualifier(position: &TypePosition) -> Result<Qualifier> {
    position
        .qualifier()
        .ok_or_else(|| EngineError::MissingQualifier(position.kind.to_string()).into())
}

pub struct ClassChecker<'a> {
    factory: &'a QualifierFactory,
    unit: &'a CompilationUnit,
    init: CombinedHierarchy<FreedomBeforeCommitment>,
    tables: IndexMap<String, ClassTable>,
    report: CheckReport,
}

impl<'a> ClassChecker<'a> {
    pub fn new(factory: &'a QualifierFactory, unit: &'a CompilationUnit) -> Self {
        Self {
            factory,
            unit,
            init: CombinedHierarchy::new(FreedomBeforeCommitment),
            tables: IndexMap::new(),
            report: CheckReport::default(),
        }
    }

    /// Check every class of the unit
    pub fn check(mut self) -> Result<CheckReport> {
        let unit = self.unit;
        for class in &unit.classes {
            let table = self.resolve_class(class)?;
            self.tables.insert(class.name.clone(), table);
        }
        for class in &unit.classes {
            self.check_class(class)?;
        }
        info!(
            classes = unit.classes.len(),
            diagnostics = self.report.diagnostics.len(),
            "check finished"
        );
        Ok(self.report)
    }

    fn emit(&mut self, location: &Location, diagnostic: Diagnostic) {
        debug!(%location, %diagnostic, "diagnostic");
        self.report.diagnostics.push(LocatedDiagnostic {
            location: location.clone(),
            diagnostic,
        });
    }

    fn resolve_name(&self, name: Option<&String>) -> Result<Option<Qualifier>> {
        Ok(name.map(|n| self.factory.resolve_annotation(n)).transpose()?)
    }

    /// Validate, default and record a declared position
    fn declare(
        &mut self,
        location: &Location,
        kind: PositionKind,
        host: HostType,
        explicit: Option<Qualifier>,
    ) -> Result<TypePosition> {
        let position = TypePosition::with_explicit(kind, host, explicit);
        if let Some(diagnostic) = self.factory.validate(&position) {
            self.emit(location, diagnostic);
        }
        let annotated = self.factory.annotate(position);
        qualifier(&annotated)?;
        self.report.positions.push(annotated.clone());
        Ok(annotated)
    }

    fn resolve_params(&mut self, location: &Location, method: &str, params: &[ParamDecl]) -> Result<Vec<ResolvedParam>> {
        let mut resolved = Vec::with_capacity(params.len());
        for (index, param) in params.iter().enumerate() {
            let explicit = self.resolve_name(param.qualifier.as_ref())?;
            let kind = PositionKind::Parameter {
                method: method.to_string(),
                index,
            };
            let position = self.declare(location, kind, param.host.clone(), explicit)?;
            resolved.push(ResolvedParam {
                name: param.name.clone(),
                host: param.host.clone(),
                position,
            });
        }
        Ok(resolved)
    }

    fn resolve_class(&mut self, class: &ClassDecl) -> Result<ClassTable> {
        let mut table = ClassTable::default();

        for field in &class.fields {
            let location = Location::new(&class.name, field.name.clone());
            let kind = if field.is_static {
                PositionKind::StaticField
            } else {
                PositionKind::InstanceField
            };
            let explicit = self.resolve_name(field.qualifier.as_ref())?;
            let position = self.declare(&location, kind, field.host.clone(), explicit)?;
            let mut info = FieldInfo::new(
                field.name.clone(),
                qualifier(&position)?,
                Assignability::from_modifiers(field.is_final, field.assignable),
            );
            if field.is_static {
                info = info.into_static();
            }
            table.fields.insert(
                field.name.clone(),
                ResolvedField {
                    info,
                    host: field.host.clone(),
                },
            );
        }

        for (index, ctor) in class.constructors.iter().enumerate() {
            let location = constructor_location(class, index);
            let explicit = self.resolve_name(ctor.qualifier.as_ref())?;
            let ret = self.declare(&location, PositionKind::ConstructorReturn, class.host(), explicit)?;
            let params = self.resolve_params(&location, CONSTRUCTOR_NAME, &ctor.params)?;
            table.constructors.push(ResolvedConstructor {
                ret: qualifier(&ret)?,
                params,
            });
        }

        for method in &class.methods {
            table.methods.push(self.resolve_method(class, method)?);
        }

        Ok(table)
    }

    fn resolve_method(&mut self, class: &ClassDecl, method: &MethodDecl) -> Result<ResolvedMethod> {
        let location = Location::new(&class.name, method.name.clone());

        let receiver = if method.is_static {
            None
        } else {
            let explicit = self.resolve_name(method.receiver.as_ref())?;
            let kind = PositionKind::Receiver {
                method: method.name.clone(),
            };
            Some(qualifier(&self.declare(&location, kind, class.host(), explicit)?)?)
        };

        let params = self.resolve_params(&location, &method.name, &method.params)?;

        // A void method produces no value
        let ret = match &method.returns {
            Some(host) => {
                let explicit = self.resolve_name(method.return_qualifier.as_ref())?;
                let kind = PositionKind::Return {
                    method: method.name.clone(),
                };
                qualifier(&self.declare(&location, kind, host.clone(), explicit)?)?
            }
            None => Qualifier::Bottom,
        };

        let param_qualifiers = params
            .iter()
            .map(|p| qualifier(&p.position))
            .collect::<Result<Vec<_>>>()?;
        let mut signature = MethodSignature::new(method.name.clone(), method.is_static, &param_qualifiers, ret);
        if let Some(receiver) = receiver {
            signature = signature.with_receiver(receiver);
        }

        Ok(ResolvedMethod {
            signature,
            params,
            returns: method.returns.clone(),
        })
    }

    fn table(&self, class: &str) -> Result<&ClassTable> {
        self.tables
            .get(class)
            .ok_or_else(|| CheckError::UnknownClass(class.to_string()))
    }

    fn class_name(host: &HostType) -> Result<&str> {
        match host {
            HostType::Declared(name) => Ok(name),
            other => Err(CheckError::NotAClass(other.to_string())),
        }
    }

    fn field(&self, host: &HostType, name: &str) -> Result<ResolvedField> {
        let class = Self::class_name(host)?;
        self.table(class)?
            .fields
            .get(name)
            .cloned()
            .ok_or_else(|| CheckError::UnknownField {
                class: class.to_string(),
                field: name.to_string(),
            })
    }

    fn method(&self, class: &str, name: &str, arity: usize) -> Result<ResolvedMethod> {
        self.table(class)?
            .methods
            .iter()
            .find(|m| m.signature.name == name && m.params.len() == arity)
            .cloned()
            .ok_or_else(|| CheckError::UnknownMethod {
                class: class.to_string(),
                method: name.to_string(),
                arity,
            })
    }

    fn check_class(&mut self, class: &'a ClassDecl) -> Result<()> {
        debug!(class = %class.name, "checking class");

        let mut joined: Option<CompositeQualifier<InitState>> = None;
        for (index, ctor) in class.constructors.iter().enumerate() {
            let summary = self.check_constructor(class, index, ctor)?;
            joined = Some(match joined {
                Some(acc) => self.init.composite_least_upper_bound(&acc, &summary.object),
                None => summary.object.clone(),
            });
            self.report.constructors.push(summary);
        }
        if let Some(object) = joined {
            self.report.objects.insert(class.name.clone(), object);
        }

        for (index, method) in class.methods.iter().enumerate() {
            self.check_method(class, index, method)?;
        }
        Ok(())
    }

    fn check_constructor(&mut self, class: &'a ClassDecl, index: usize, ctor: &ConstructorDecl) -> Result<ConstructorSummary> {
        let resolved = self.table(&class.name)?.constructors[index].clone();
        let mut scope = Scope::new(class, constructor_location(class, index).member);

        let params = resolved
            .params
            .iter()
            .map(|p| qualifier(&p.position))
            .collect::<Result<Vec<_>>>()?;
        for diagnostic in AssignabilityChecker::check_constructor_declaration(resolved.ret, &params) {
            self.emit(&scope.location, diagnostic);
        }

        let context = ConstructorContext::new(resolved.ret);
        scope.receiver = Some(context.receiver());
        scope.constructor = Some(context);
        scope.bind_params(&resolved.params)?;

        for stmt in &ctor.body {
            self.stmt(&mut scope, stmt)?;
        }

        let factory = self.factory;
        let uninitialized: Vec<String> = self
            .table(&class.name)?
            .fields
            .values()
            .filter(|f| !f.info.is_static && factory.has_field_invariant(&f.info))
            .filter(|f| !scope.written.contains(&f.info.name))
            .map(|f| f.info.name.clone())
            .collect();

        let state = if uninitialized.is_empty() {
            InitState::Initialized
        } else {
            warn!(location = %scope.location, fields = ?uninitialized, "constructor leaves fields uninitialized");
            InitState::UnderInitialization(0)
        };

        Ok(ConstructorSummary {
            location: scope.location,
            object: CompositeQualifier::new(resolved.ret, state),
            uninitialized,
        })
    }

    fn check_method(&mut self, class: &'a ClassDecl, index: usize, method: &MethodDecl) -> Result<()> {
        let resolved = self.table(&class.name)?.methods[index].clone();
        let mut scope = Scope::new(class, method.name.clone());
        scope.receiver = resolved.signature.receiver;
        if resolved.returns.is_some() {
            scope.return_qualifier = Some(resolved.signature.ret);
        }
        scope.bind_params(&resolved.params)?;

        for stmt in &method.body {
            self.stmt(&mut scope, stmt)?;
        }
        Ok(())
    }

    fn check_subtype(&mut self, location: &Location, kind: DiagnosticKind, found: Qualifier, required: Qualifier) {
        if !hierarchy().is_subtype(found, required) {
            self.emit(location, Diagnostic::incompatible(kind, found, required));
        }
    }

    fn stmt(&mut self, scope: &mut Scope<'a>, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Local {
                name,
                host,
                qualifier: annotation,
                init,
            } => {
                let explicit = self.resolve_name(annotation.as_ref())?;
                let declared = self.declare(&scope.location, PositionKind::Local, host.clone(), explicit)?;
                let mut current = qualifier(&declared)?;
                if let Some(init) = init {
                    let value = self.expr(scope, init)?;
                    current = self.assign_local(scope, &declared, value.qualifier)?;
                }
                scope.vars.insert(
                    name.clone(),
                    Var {
                        host: host.clone(),
                        declared,
                        current,
                    },
                );
            }
            Stmt::Assign { target, value } => {
                let var = scope
                    .vars
                    .get(target)
                    .cloned()
                    .ok_or_else(|| CheckError::UnknownVariable(target.clone(), scope.location.to_string()))?;
                let value = self.expr(scope, value)?;
                let current = self.assign_local(scope, &var.declared, value.qualifier)?;
                if let Some(var) = scope.vars.get_mut(target) {
                    var.current = current;
                }
            }
            Stmt::FieldWrite { receiver, field, value } => {
                let target = self.expr(scope, receiver)?;
                let resolved = self.field(&target.host, field)?;
                let value = self.expr(scope, value)?;
                let in_constructor = scope.constructor.is_some() && matches!(receiver, Expr::This);
                let write = FieldWrite {
                    field: &resolved.info,
                    receiver: target.qualifier,
                    in_constructor,
                    value: value.qualifier,
                };
                for diagnostic in AssignabilityChecker::check_field_write(&write) {
                    self.emit(&scope.location, diagnostic);
                }
                if in_constructor {
                    scope.written.insert(field.clone());
                }
            }
            Stmt::Expr { expr } => {
                self.expr(scope, expr)?;
            }
            Stmt::Return { value } => {
                if let Some(value) = value {
                    let value = self.expr(scope, value)?;
                    if let Some(required) = scope.return_qualifier {
                        self.check_subtype(
                            &scope.location,
                            DiagnosticKind::ReturnTypeIncompatible,
                            value.qualifier,
                            required,
                        );
                    }
                }
            }
        }
        Ok(())
    }

    /// Explicitly annotated variables are checked; the rest are refined to the assigned value
    fn assign_local(&mut self, scope: &Scope<'a>, declared: &TypePosition, value: Qualifier) -> Result<Qualifier> {
        let required = self.factory.lhs_qualifier(TreeKind::Identifier, declared.clone())?;
        if declared.is_explicit() {
            self.check_subtype(&scope.location, DiagnosticKind::AssignmentTypeIncompatible, value, required);
            return Ok(required);
        }
        qualifier(&self.factory.apply_inferred(declared.clone(), value))
    }

    fn arguments(&mut self, scope: &mut Scope<'a>, args: &[Expr]) -> Result<Vec<Qualifier>> {
        args.iter()
            .map(|arg| self.expr(scope, arg).map(|t| t.qualifier))
            .collect()
    }

    fn check_arguments(&mut self, location: &Location, arguments: &[Qualifier], params: &[Qualifier]) {
        for (index, (argument, param)) in arguments.iter().zip(params).enumerate() {
            if !hierarchy().is_subtype(*argument, *param) {
                self.emit(
                    location,
                    Diagnostic::new(
                        DiagnosticKind::ArgumentTypeIncompatible,
                        format!("argument {index}: found {argument}, required {param}"),
                    ),
                );
            }
        }
    }

    fn expr(&mut self, scope: &mut Scope<'a>, expr: &Expr) -> Result<Typed> {
        match expr {
            Expr::This => {
                let qualifier = scope
                    .receiver
                    .ok_or_else(|| CheckError::ThisInStatic(scope.location.to_string()))?;
                Ok(Typed {
                    host: scope.class.host(),
                    qualifier,
                })
            }
            Expr::Null => Ok(Typed {
                host: HostType::Null,
                qualifier: self.factory.default_qualifier(PositionKind::NullLiteral, HostType::Null),
            }),
            Expr::Literal { host } => Ok(Typed {
                host: host.clone(),
                qualifier: self.factory.default_qualifier(PositionKind::Local, host.clone()),
            }),
            Expr::Var { name } => scope
                .vars
                .get(name)
                .map(|v| Typed {
                    host: v.host.clone(),
                    qualifier: v.current,
                })
                .ok_or_else(|| CheckError::UnknownVariable(name.clone(), scope.location.to_string())),
            Expr::FieldRead { receiver, field } => {
                let target = self.expr(scope, receiver)?;
                let resolved = self.field(&target.host, field)?;
                let qualifier = if resolved.info.is_static {
                    resolved.info.declared
                } else {
                    resolved.info.viewed_through(target.qualifier)
                };
                Ok(Typed {
                    host: resolved.host,
                    qualifier,
                })
            }
            Expr::New {
                class,
                qualifier: annotation,
                args,
            } => self.new_object(scope, class, annotation.as_ref(), args),
            Expr::Call { receiver, method, args } => {
                let target = self.expr(scope, receiver)?;
                let class = Self::class_name(&target.host)?.to_string();
                let resolved = self.method(&class, method, args.len())?;
                let arguments = self.arguments(scope, args)?;

                let signature = self.factory.method_from_use(&resolved.signature, Some(target.qualifier));
                if let Some(required) = signature.receiver {
                    self.check_subtype(
                        &scope.location,
                        DiagnosticKind::MethodInvocationInvalid,
                        target.qualifier,
                        required,
                    );
                }
                self.check_arguments(&scope.location, &arguments, &signature.params);
                Ok(Typed {
                    host: resolved.returns.unwrap_or(HostType::Null),
                    qualifier: signature.ret,
                })
            }
            Expr::StaticCall { class, method, args } => {
                let resolved = self.method(class, method, args.len())?;
                let arguments = self.arguments(scope, args)?;

                let substituted = self.factory.method_from_use(&resolved.signature, None);
                let bound = ViewpointAdaptor::bind_substitutable(&substituted, &arguments);
                self.check_arguments(&scope.location, &arguments, &bound.signature.params);
                Ok(Typed {
                    host: resolved.returns.unwrap_or(HostType::Null),
                    qualifier: bound.signature.ret,
                })
            }
            Expr::Cast {
                host,
                qualifier: annotation,
                operand,
            } => {
                let inner = self.expr(scope, operand)?;
                let explicit = self.resolve_name(annotation.as_ref())?;
                let position = TypePosition::with_explicit(PositionKind::Cast, host.clone(), explicit);
                if let Some(diagnostic) = self.factory.validate(&position) {
                    self.emit(&scope.location, diagnostic);
                }
                // An unannotated cast keeps the qualifier of its operand
                let position = position.fill(inner.qualifier, Origin::Propagated);
                Ok(Typed {
                    host: host.clone(),
                    qualifier: self.factory.qualifier_of(position)?,
                })
            }
            Expr::Binary { host, lhs, rhs } => {
                let l = self.expr(scope, lhs)?;
                let r = self.expr(scope, rhs)?;
                let position = TypePosition::new(PositionKind::Binary, host.clone())
                    .fill(l.qualifier.join(r.qualifier), Origin::Propagated);
                Ok(Typed {
                    host: host.clone(),
                    qualifier: self.factory.qualifier_of(position)?,
                })
            }
        }
    }

    fn new_object(
        &mut self,
        scope: &mut Scope<'a>,
        class: &str,
        annotation: Option<&String>,
        args: &[Expr],
    ) -> Result<Typed> {
        let arity = args.len();
        let ctor = self
            .table(class)?
            .constructors
            .iter()
            .find(|c| c.params.len() == arity)
            .cloned()
            .ok_or_else(|| CheckError::UnknownConstructor {
                class: class.to_string(),
                arity,
            })?;

        let requested = self.resolve_name(annotation)?;
        let host = HostType::declared(class);
        let position = TypePosition::with_explicit(PositionKind::NewObject, host.clone(), requested);
        if let Some(diagnostic) = self.factory.validate(&position) {
            self.emit(&scope.location, diagnostic);
        }

        let arguments = self.arguments(scope, args)?;
        let params = ctor
            .params
            .iter()
            .map(|p| qualifier(&p.position))
            .collect::<Result<Vec<_>>>()?;
        if let Err(diagnostics) = AssignabilityChecker::can_invoke_constructor(ctor.ret, requested, &arguments, &params) {
            for diagnostic in diagnostics {
                self.emit(&scope.location, diagnostic);
            }
        }

        Ok(Typed {
            host,
            qualifier: requested.unwrap_or(ctor.ret),
        })
    }
}

fn constructor_location(class: &ClassDecl, index: usize) -> Location {
    Location::new(&class.name, format!("{CONSTRUCTOR_NAME}[{index}]"))
}

/// Check a unit with a fresh checker
pub fn check_unit(factory: &QualifierFactory, unit: &CompilationUnit) -> Result<CheckReport> {
    ClassChecker::new(factory, unit).check()
}
