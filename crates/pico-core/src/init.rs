//! Composition with an external initialization lattice
//!
//! Every type position carries two qualifiers: one from the mutability
//! hierarchy and one from an initialization hierarchy (committed, under
//! initialization, unknown initialization, bottom) whose rules are owned by
//! another component. The adapter routes each comparison to the right
//! hierarchy and never inlines the initialization rules.

use crate::error::{EngineError, Result};
use crate::lattice::{hierarchy, QualifierHierarchy};
use crate::qualifier::Qualifier;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// The operations the core needs from an initialization hierarchy
pub trait InitializationLattice {
    type State: Clone + PartialEq + Debug;

    fn is_subtype(&self, sub: &Self::State, sup: &Self::State) -> bool;

    fn least_upper_bound(&self, a: &Self::State, b: &Self::State) -> Self::State;
}

/// A single qualifier drawn from either hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnyQualifier<S> {
    Mutability(Qualifier),
    Initialization(S),
}

/// A mutability qualifier paired with the initialization state of the same position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeQualifier<S> {
    pub mutability: Qualifier,
    pub initialization: S,
}

impl<S> CompositeQualifier<S> {
    pub fn new(mutability: Qualifier, initialization: S) -> Self {
        Self {
            mutability,
            initialization,
        }
    }
}

/// Subtyping and join over both hierarchies
pub struct CombinedHierarchy<L> {
    mutability: &'static QualifierHierarchy,
    initialization: L,
}

impl<L: InitializationLattice> CombinedHierarchy<L> {
    pub fn new(initialization: L) -> Self {
        Self {
            mutability: hierarchy(),
            initialization,
        }
    }

    /// Routed subtype check; relating qualifiers of different hierarchies is an engine bug
    pub fn is_subtype(&self, sub: &AnyQualifier<L::State>, sup: &AnyQualifier<L::State>) -> Result<bool> {
        match (sub, sup) {
            (AnyQualifier::Initialization(a), AnyQualifier::Initialization(b)) => {
                Ok(self.initialization.is_subtype(a, b))
            }
            (AnyQualifier::Mutability(a), AnyQualifier::Mutability(b)) => Ok(self.mutability.is_subtype(*a, *b)),
            (AnyQualifier::Mutability(q), AnyQualifier::Initialization(s))
            | (AnyQualifier::Initialization(s), AnyQualifier::Mutability(q)) => Err(mixed(*q, s)),
        }
    }

    /// Routed least upper bound
    pub fn least_upper_bound(
        &self,
        a: &AnyQualifier<L::State>,
        b: &AnyQualifier<L::State>,
    ) -> Result<AnyQualifier<L::State>> {
        match (a, b) {
            (AnyQualifier::Initialization(x), AnyQualifier::Initialization(y)) => {
                Ok(AnyQualifier::Initialization(self.initialization.least_upper_bound(x, y)))
            }
            (AnyQualifier::Mutability(x), AnyQualifier::Mutability(y)) => {
                Ok(AnyQualifier::Mutability(self.mutability.least_upper_bound(*x, *y)))
            }
            (AnyQualifier::Mutability(q), AnyQualifier::Initialization(s))
            | (AnyQualifier::Initialization(s), AnyQualifier::Mutability(q)) => Err(mixed(*q, s)),
        }
    }

    /// Componentwise subtyping of composite qualifiers
    pub fn is_composite_subtype(
        &self,
        sub: &CompositeQualifier<L::State>,
        sup: &CompositeQualifier<L::State>,
    ) -> bool {
        self.mutability.is_subtype(sub.mutability, sup.mutability)
            && self.initialization.is_subtype(&sub.initialization, &sup.initialization)
    }

    /// Componentwise join of composite qualifiers
    pub fn composite_least_upper_bound(
        &self,
        a: &CompositeQualifier<L::State>,
        b: &CompositeQualifier<L::State>,
    ) -> CompositeQualifier<L::State> {
        CompositeQualifier {
            mutability: self.mutability.least_upper_bound(a.mutability, b.mutability),
            initialization: self.initialization.least_upper_bound(&a.initialization, &b.initialization),
        }
    }
}

fn mixed<S: Debug>(mutability: Qualifier, state: &S) -> EngineError {
    EngineError::MixedHierarchies {
        mutability,
        initialization: format!("{state:?}"),
    }
}
