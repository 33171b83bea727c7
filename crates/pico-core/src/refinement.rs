//! Reconciling flow-sensitive refinement with implicit immutability

use crate::config::CheckerConfig;
use crate::position::{Origin, TypePosition};
use crate::qualifier::Qualifier;
use tracing::trace;

/// Accept a refinement proposed by the dataflow analysis.
///
/// Values of implicitly immutable types can never be anything but
/// `@Immutable`, whatever the proposal. Applying the same proposal twice
/// yields the same position.
pub fn apply_inferred(position: TypePosition, proposed: Qualifier, config: &CheckerConfig) -> TypePosition {
    let qualifier = if config.is_implicitly_immutable(&position.host) {
        Qualifier::Immutable
    } else {
        proposed
    };
    if qualifier != proposed {
        trace!(host = %position.host, %proposed, "refinement overridden by implicit immutability");
    }
    position.replace_unless_explicit(qualifier, Origin::Refined)
}
