use pico_core::prelude::*;

fn kinds(diagnostics: &[Diagnostic]) -> Vec<DiagnosticKind> {
    diagnostics.iter().map(|d| d.kind).collect()
}

#[test]
fn test_sum_of_ints_is_immutable_without_annotation() {
    let factory = QualifierFactory::default();
    let sum = TypePosition::new(PositionKind::Binary, HostType::Primitive(PrimitiveKind::Int));
    let annotated = factory.annotate(sum);
    assert_eq!(annotated.qualifier(), Some(Qualifier::Immutable));
    assert!(!annotated.is_explicit());
}

#[test]
fn test_wrapper_class_by_name_is_implicitly_immutable() {
    let factory = QualifierFactory::default();
    let local = TypePosition::new(PositionKind::Local, HostType::declared("java.lang.Integer"));
    assert_eq!(factory.qualifier_of(local).unwrap(), Qualifier::Immutable);

    let cast = TypePosition::with_explicit(PositionKind::Cast, HostType::declared("java.lang.Long"), Some(Qualifier::Mutable));
    assert_eq!(factory.validate(&cast).map(|d| d.kind), Some(DiagnosticKind::InvalidCastQualifier));
}

#[test]
fn test_static_substitution_is_all_or_nothing() {
    let factory = QualifierFactory::default();
    let sig = MethodSignature::new("copyOf", true, &[Qualifier::PolyMutable, Qualifier::PolyMutable], Qualifier::PolyMutable);
    let resolved = factory.method_from_use(&sig, None);
    assert!(resolved.qualifiers().all(|q| q == Qualifier::SubstitutablePolyMutable));

    let bound = ViewpointAdaptor::bind_substitutable(&resolved, &[Qualifier::Mutable, Qualifier::Mutable]);
    assert_eq!(bound.binding, Qualifier::Mutable);
    assert!(bound.signature.qualifiers().all(|q| q == Qualifier::Mutable));
}

#[test]
fn test_static_without_poly_return_keeps_poly_parameters() {
    let sig = MethodSignature::new("inspect", true, &[Qualifier::PolyMutable], Qualifier::Immutable);
    let resolved = ViewpointAdaptor::method_from_use(&sig, None);
    assert_eq!(resolved.params[0], Qualifier::PolyMutable);
    assert_eq!(resolved.ret, Qualifier::Immutable);
}

#[test]
fn test_receiver_dependant_field_write() {
    let field = FieldInfo::new("items", Qualifier::ReceiverDependantMutable, Assignability::ReceiverDependantAssignable);

    let through_immutable = FieldWrite {
        field: &field,
        receiver: Qualifier::Immutable,
        in_constructor: false,
        value: Qualifier::Immutable,
    };
    assert_eq!(
        kinds(&AssignabilityChecker::check_field_write(&through_immutable)),
        vec![DiagnosticKind::IllegalWrite]
    );

    let through_mutable = FieldWrite {
        receiver: Qualifier::Mutable,
        value: Qualifier::Mutable,
        ..through_immutable
    };
    assert!(AssignabilityChecker::check_field_write(&through_mutable).is_empty());
}

#[test]
fn test_immutable_constructor_cannot_store_mutable_parameter() {
    let ctx = ConstructorContext::new(Qualifier::Immutable);
    let field = FieldInfo::new("f", Qualifier::Readonly, Assignability::ReceiverDependantAssignable);
    let write = FieldWrite {
        field: &field,
        receiver: ctx.receiver(),
        in_constructor: true,
        value: Qualifier::Mutable,
    };
    assert_eq!(
        kinds(&AssignabilityChecker::check_field_write(&write)),
        vec![DiagnosticKind::IllegalWrite]
    );
}

#[test]
fn test_final_field_written_in_constructor() {
    let ctx = ConstructorContext::new(Qualifier::Immutable);
    let field = FieldInfo::new("id", Qualifier::Immutable, Assignability::FinalUnassignable);
    let write = FieldWrite {
        field: &field,
        receiver: ctx.receiver(),
        in_constructor: true,
        value: Qualifier::Immutable,
    };
    assert!(AssignabilityChecker::check_field_write(&write).is_empty());
    assert!(!AssignabilityChecker::can_assign(&field, Qualifier::Mutable, false));
}

#[test]
fn test_readonly_creation_always_invalid() {
    for args in [
        vec![Qualifier::Readonly, Qualifier::Immutable],
        vec![Qualifier::Bottom, Qualifier::Bottom],
    ] {
        let err = AssignabilityChecker::can_invoke_constructor(
            Qualifier::Immutable,
            Some(Qualifier::Readonly),
            &args,
            &[Qualifier::PolyMutable, Qualifier::Immutable],
        )
        .unwrap_err();
        let kinds = kinds(&err);
        assert!(kinds.contains(&DiagnosticKind::ConstructorInvocationInvalid));
        assert!(kinds.contains(&DiagnosticKind::ReadonlyObjectCreation));
    }
}

#[test]
fn test_refinement_cannot_make_string_mutable() {
    let factory = QualifierFactory::default();
    let local = TypePosition::new(PositionKind::Local, HostType::string());
    let once = factory.apply_inferred(local, Qualifier::Mutable);
    let twice = factory.apply_inferred(once.clone(), Qualifier::Mutable);
    assert_eq!(once.qualifier(), Some(Qualifier::Immutable));
    assert_eq!(once, twice);
}

#[test]
fn test_explicit_mutable_string_cast_reported() {
    let factory = QualifierFactory::default();
    let cast = TypePosition::with_explicit(PositionKind::Cast, HostType::string(), Some(Qualifier::Mutable));
    let diagnostic = factory.validate(&cast).map(|d| d.kind);
    assert_eq!(diagnostic, Some(DiagnosticKind::InvalidCastQualifier));
    assert_eq!(factory.qualifier_of(cast).unwrap(), Qualifier::Mutable);
}

#[test]
fn test_config_alias_through_factory() {
    let factory = QualifierFactory::default();
    assert_eq!(
        factory.resolve_annotation("org.jmlspecs.annotation.Readonly").unwrap(),
        Qualifier::Readonly
    );
}
