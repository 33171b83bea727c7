//! Positional legality of explicitly written qualifiers

use crate::config::CheckerConfig;
use crate::error::{Diagnostic, DiagnosticKind};
use crate::position::{PositionKind, TypePosition};
use crate::qualifier::Qualifier;

/// Report an explicit qualifier that can never be legal where it is written
pub fn validate_position(position: &TypePosition, config: &CheckerConfig) -> Option<Diagnostic> {
    if !position.is_explicit() {
        return None;
    }
    let qualifier = position.qualifier()?;

    let kind = if position.kind == PositionKind::Cast {
        DiagnosticKind::InvalidCastQualifier
    } else {
        DiagnosticKind::TypeInvalid
    };

    if config.is_implicitly_immutable(&position.host) && qualifier != Qualifier::Immutable {
        return Some(Diagnostic::new(
            kind,
            format!("{qualifier} is not allowed on implicitly immutable type {}", position.host),
        ));
    }

    match qualifier {
        Qualifier::SubstitutablePolyMutable | Qualifier::Bottom => Some(Diagnostic::new(
            kind,
            format!("{qualifier} cannot be written in source"),
        )),
        q if q.is_polymorphic() && position.kind == PositionKind::StaticField => {
            Some(Diagnostic::new(
                kind,
                format!("{qualifier} is not allowed on a static field"),
            ))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::{HostType, PrimitiveKind};

    fn check(kind: PositionKind, host: HostType, q: Qualifier) -> Option<DiagnosticKind> {
        let pos = TypePosition::with_explicit(kind, host, Some(q));
        validate_position(&pos, &CheckerConfig::default()).map(|d| d.kind)
    }

    #[test]
    fn test_mutable_cast_to_string() {
        assert_eq!(
            check(PositionKind::Cast, HostType::string(), Qualifier::Mutable),
            Some(DiagnosticKind::InvalidCastQualifier)
        );
        assert_eq!(check(PositionKind::Cast, HostType::string(), Qualifier::Immutable), None);
    }

    #[test]
    fn test_readonly_int_local() {
        assert_eq!(
            check(PositionKind::Local, HostType::Primitive(PrimitiveKind::Int), Qualifier::Readonly),
            Some(DiagnosticKind::TypeInvalid)
        );
    }

    #[test]
    fn test_internal_qualifiers_rejected() {
        assert_eq!(
            check(PositionKind::Local, HostType::object(), Qualifier::SubstitutablePolyMutable),
            Some(DiagnosticKind::TypeInvalid)
        );
        assert_eq!(
            check(PositionKind::Local, HostType::object(), Qualifier::Bottom),
            Some(DiagnosticKind::TypeInvalid)
        );
    }

    #[test]
    fn test_receiver_dependant_static_field() {
        assert_eq!(
            check(PositionKind::StaticField, HostType::object(), Qualifier::ReceiverDependantMutable),
            Some(DiagnosticKind::TypeInvalid)
        );
        assert_eq!(
            check(PositionKind::InstanceField, HostType::object(), Qualifier::ReceiverDependantMutable),
            None
        );
    }

    #[test]
    fn test_defaulted_positions_not_validated() {
        let pos = TypePosition::new(PositionKind::Cast, HostType::string());
        assert!(validate_position(&pos, &CheckerConfig::default()).is_none());
    }
}
