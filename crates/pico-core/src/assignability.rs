//! Field assignability and constructor legality
//!
//! Every field belongs to one assignability category fixed at declaration:
//! - `Assignable`: writable through any receiver
//! - `FinalUnassignable`: written only while the declaring constructor runs
//! - `ReceiverDependantAssignable`: writable only through a receiver that
//!   adapts to `@Mutable` (the default for ordinary fields)

use crate::error::{Diagnostic, DiagnosticKind};
use crate::lattice::hierarchy;
use crate::qualifier::Qualifier;
use crate::viewpoint::ViewpointAdaptor;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Qualifiers that can be the declared return of a constructor
const CONSTRUCTOR_RETURN_QUALIFIERS: [Qualifier; 3] = [
    Qualifier::Mutable,
    Qualifier::Immutable,
    Qualifier::ReceiverDependantMutable,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assignability {
    Assignable,
    FinalUnassignable,
    ReceiverDependantAssignable,
}

impl Assignability {
    /// Category from the declaration's modifiers; `final` wins over `@Assignable`
    pub fn from_modifiers(is_final: bool, annotated_assignable: bool) -> Self {
        if is_final {
            Assignability::FinalUnassignable
        } else if annotated_assignable {
            Assignability::Assignable
        } else {
            Assignability::ReceiverDependantAssignable
        }
    }
}

/// The parts of a field declaration the rules look at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    /// Declared qualifier, receiver independent
    pub declared: Qualifier,
    pub assignability: Assignability,
    pub is_static: bool,
}

impl FieldInfo {
    /// A field has no signature to be polymorphic over, so `@PolyMutable`
    /// on a field reads as `@ReceiverDependantMutable`.
    pub fn new(name: impl Into<String>, declared: Qualifier, assignability: Assignability) -> Self {
        let declared = match declared {
            Qualifier::PolyMutable => Qualifier::ReceiverDependantMutable,
            q => q,
        };
        Self {
            name: name.into(),
            declared,
            assignability,
            is_static: false,
        }
    }

    pub fn into_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Qualifier of the field read through `receiver`
    pub fn viewed_through(&self, receiver: Qualifier) -> Qualifier {
        ViewpointAdaptor::adapt(receiver, self.declared)
    }

    /// Whether the initialization tracker must see this field set by the end of each constructor
    pub fn has_invariant(&self) -> bool {
        matches!(self.declared, Qualifier::Immutable | Qualifier::ReceiverDependantMutable)
            && self.assignability != Assignability::Assignable
    }
}

/// A write `receiver.field = value`
#[derive(Debug, Clone, Copy)]
pub struct FieldWrite<'a> {
    pub field: &'a FieldInfo,
    /// Effective receiver qualifier (the constructor's return qualifier for `this` in a constructor)
    pub receiver: Qualifier,
    /// The write goes through `this` inside a constructor of the declaring class
    pub in_constructor: bool,
    pub value: Qualifier,
}

/// State of the constructor whose body is being checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstructorContext {
    pub return_qualifier: Qualifier,
}

impl ConstructorContext {
    pub fn new(return_qualifier: Qualifier) -> Self {
        Self { return_qualifier }
    }

    /// `this` inside the constructor has the constructed object's qualifier
    pub fn receiver(&self) -> Qualifier {
        self.return_qualifier
    }

    /// Qualifier a parameter can be captured as when the constructor writes it into a field.
    ///
    /// Callers of an `@Immutable` constructor always bind `@PolyMutable`
    /// parameters to `@Immutable`. Only the declaration check uses this; in
    /// the body the parameter keeps `@PolyMutable`.
    pub fn parameter_qualifier(&self, declared: Qualifier) -> Qualifier {
        if self.return_qualifier == Qualifier::Immutable && declared == Qualifier::PolyMutable {
            Qualifier::Immutable
        } else {
            declared
        }
    }
}

/// Stateless field-write and constructor rules
pub struct AssignabilityChecker;

impl AssignabilityChecker {
    /// Check if `field` may be written through a receiver qualified `receiver`
    pub fn can_assign(field: &FieldInfo, receiver: Qualifier, in_constructor: bool) -> bool {
        match field.assignability {
            Assignability::Assignable => true,
            Assignability::FinalUnassignable => in_constructor,
            // Static fields belong to no object, so any receiver is as good as `@Mutable`
            Assignability::ReceiverDependantAssignable => field.is_static || Self::permits_mutation(receiver),
        }
    }

    /// A receiver permits mutation when a receiver-dependant member adapts to `@Mutable` through it
    fn permits_mutation(receiver: Qualifier) -> bool {
        ViewpointAdaptor::adapt(receiver, Qualifier::ReceiverDependantMutable) == Qualifier::Mutable
    }

    /// Writability and type compatibility are independent; both may fail
    pub fn check_field_write(write: &FieldWrite<'_>) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let field = write.field;

        // Static fields are not viewed through any receiver
        let receiver = if field.is_static { Qualifier::Mutable } else { write.receiver };

        if !Self::can_assign(field, receiver, write.in_constructor) {
            debug!(field = %field.name, receiver = %receiver, "illegal field write");
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::IllegalWrite,
                format!(
                    "cannot write field {} ({:?}) through a {receiver} receiver",
                    field.name, field.assignability
                ),
            ));
        }

        let required = field.viewed_through(receiver);
        if !hierarchy().is_subtype(write.value, required) {
            diagnostics.push(Diagnostic::incompatible(
                DiagnosticKind::AssignmentTypeIncompatible,
                write.value,
                required,
            ));
        }

        diagnostics
    }

    /// Structural legality of a constructor declaration
    pub fn check_constructor_declaration(return_qualifier: Qualifier, params: &[Qualifier]) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        if !CONSTRUCTOR_RETURN_QUALIFIERS.contains(&return_qualifier) {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::ConstructorInvalid,
                format!("{return_qualifier} is not a valid constructor return qualifier"),
            ));
        }

        // A mutable parameter could be captured by a field of an immutable object
        if return_qualifier == Qualifier::Immutable {
            let ctx = ConstructorContext::new(return_qualifier);
            if let Some(index) = params.iter().position(|p| ctx.parameter_qualifier(*p) == Qualifier::Mutable) {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::ConstructorInvalid,
                    format!("immutable constructor declares a @Mutable parameter at position {index}"),
                ));
            }
        }

        diagnostics
    }

    /// Legality of `new @requested T(arguments)` against a constructor declared
    /// with `declared_return` and `parameters`.
    pub fn can_invoke_constructor(
        declared_return: Qualifier,
        requested: Option<Qualifier>,
        arguments: &[Qualifier],
        parameters: &[Qualifier],
    ) -> Result<(), Vec<Diagnostic>> {
        let mut diagnostics = Vec::new();
        let invocation = requested.unwrap_or(declared_return);

        if invocation == Qualifier::Readonly {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::ReadonlyObjectCreation,
                "an object cannot be created as @Readonly",
            ));
        }
        if invocation == Qualifier::Readonly || invocation != declared_return {
            diagnostics.push(Diagnostic::incompatible(
                DiagnosticKind::ConstructorInvocationInvalid,
                invocation,
                declared_return,
            ));
        }

        let h = hierarchy();
        for (index, (argument, parameter)) in arguments.iter().zip(parameters).enumerate() {
            let required = ViewpointAdaptor::adapt_invocation(invocation, *parameter);
            if !h.is_subtype(*argument, required) {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::ArgumentTypeIncompatible,
                    format!("argument {index}: found {argument}, required {required}"),
                ));
            }
        }

        if diagnostics.is_empty() {
            Ok(())
        } else {
            Err(diagnostics)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Qualifier::*;

    fn rda(name: &str, declared: Qualifier) -> FieldInfo {
        FieldInfo::new(name, declared, Assignability::ReceiverDependantAssignable)
    }

    fn kinds(diagnostics: &[Diagnostic]) -> Vec<DiagnosticKind> {
        diagnostics.iter().map(|d| d.kind).collect()
    }

    #[test]
    fn test_assignable_always_writable() {
        let f = FieldInfo::new("cache", Readonly, Assignability::Assignable);
        for receiver in Qualifier::ALL {
            assert!(AssignabilityChecker::can_assign(&f, receiver, false));
        }
    }

    #[test]
    fn test_final_only_in_constructor() {
        let f = FieldInfo::new("id", Immutable, Assignability::FinalUnassignable);
        assert!(AssignabilityChecker::can_assign(&f, Immutable, true));
        assert!(!AssignabilityChecker::can_assign(&f, Mutable, false));
    }

    #[test]
    fn test_receiver_dependant_needs_mutable_receiver() {
        let f = rda("items", ReceiverDependantMutable);
        assert!(AssignabilityChecker::can_assign(&f, Mutable, false));
        assert!(!AssignabilityChecker::can_assign(&f, Immutable, false));
        assert!(!AssignabilityChecker::can_assign(&f, Readonly, false));
        assert!(!AssignabilityChecker::can_assign(&f, PolyMutable, false));
        assert!(!AssignabilityChecker::can_assign(&f, ReceiverDependantMutable, true));
    }

    #[test]
    fn test_static_field_ignores_receiver() {
        let f = rda("cache", Mutable).into_static();
        for receiver in [Mutable, Immutable, Readonly] {
            assert!(AssignabilityChecker::can_assign(&f, receiver, false));
        }

        let write = FieldWrite {
            field: &f,
            receiver: Immutable,
            in_constructor: false,
            value: Mutable,
        };
        assert!(AssignabilityChecker::check_field_write(&write).is_empty());

        let write = FieldWrite { value: Readonly, ..write };
        assert_eq!(
            kinds(&AssignabilityChecker::check_field_write(&write)),
            vec![DiagnosticKind::AssignmentTypeIncompatible]
        );
    }

    #[test]
    fn test_poly_field_reads_as_receiver_dependant() {
        let f = rda("pif", PolyMutable);
        assert_eq!(f.declared, ReceiverDependantMutable);
        assert_eq!(f.viewed_through(Mutable), Mutable);
    }

    #[test]
    fn test_write_reports_both_errors() {
        let f = rda("imf", Immutable);
        let write = FieldWrite {
            field: &f,
            receiver: Immutable,
            in_constructor: true,
            value: PolyMutable,
        };
        assert_eq!(
            kinds(&AssignabilityChecker::check_field_write(&write)),
            vec![DiagnosticKind::IllegalWrite, DiagnosticKind::AssignmentTypeIncompatible]
        );
    }

    #[test]
    fn test_field_invariant() {
        assert!(rda("a", Immutable).has_invariant());
        assert!(rda("b", ReceiverDependantMutable).has_invariant());
        assert!(!rda("c", Mutable).has_invariant());
        assert!(!FieldInfo::new("d", Immutable, Assignability::Assignable).has_invariant());
    }

    #[test]
    fn test_constructor_declaration() {
        assert!(AssignabilityChecker::check_constructor_declaration(Mutable, &[Mutable]).is_empty());
        assert_eq!(
            kinds(&AssignabilityChecker::check_constructor_declaration(Readonly, &[])),
            vec![DiagnosticKind::ConstructorInvalid]
        );
        assert_eq!(
            kinds(&AssignabilityChecker::check_constructor_declaration(
                Immutable,
                &[Mutable, PolyMutable, Immutable]
            )),
            vec![DiagnosticKind::ConstructorInvalid]
        );
        assert!(AssignabilityChecker::check_constructor_declaration(Immutable, &[PolyMutable, Immutable]).is_empty());
    }

    #[test]
    fn test_poly_parameter_in_immutable_constructor() {
        let ctx = ConstructorContext::new(Immutable);
        assert_eq!(ctx.parameter_qualifier(PolyMutable), Immutable);
        assert_eq!(ctx.parameter_qualifier(Mutable), Mutable);
        assert_eq!(ConstructorContext::new(Mutable).parameter_qualifier(PolyMutable), PolyMutable);
    }

    #[test]
    fn test_invocation_mismatch() {
        let err = AssignabilityChecker::can_invoke_constructor(Immutable, Some(Mutable), &[Mutable, Immutable], &[
            PolyMutable,
            Immutable,
        ])
        .unwrap_err();
        assert_eq!(kinds(&err), vec![DiagnosticKind::ConstructorInvocationInvalid]);
    }

    #[test]
    fn test_invocation_argument_adapted_to_constructed_object() {
        assert!(AssignabilityChecker::can_invoke_constructor(Immutable, Some(Immutable), &[Immutable, Immutable], &[
            PolyMutable,
            Immutable
        ])
        .is_ok());

        let err = AssignabilityChecker::can_invoke_constructor(Mutable, None, &[Mutable, PolyMutable, Immutable], &[
            Mutable,
            PolyMutable,
            Immutable,
        ])
        .unwrap_err();
        assert_eq!(kinds(&err), vec![DiagnosticKind::ArgumentTypeIncompatible]);
    }
}
