//! Viewpoint adaptation
//!
//! A member declared `@ReceiverDependantMutable` means "whatever the receiver
//! is": reading it through a `@Mutable` receiver yields `@Mutable`, through an
//! `@Immutable` one `@Immutable`. Fixed qualifiers ignore the receiver.
//!
//! `@PolyMutable` signature positions are resolved per call instead: instance
//! methods and constructors adopt the receiver (or constructed object)
//! qualifier, static methods get `@SubstitutablePolyMutable` placeholders that
//! are bound to one concrete qualifier for the whole call.

use crate::lattice::hierarchy;
use crate::qualifier::Qualifier;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

/// Qualifiers of a method or constructor signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    pub name: String,
    pub is_static: bool,
    /// Declared receiver qualifier; `None` for static methods and constructors
    pub receiver: Option<Qualifier>,
    pub params: SmallVec<[Qualifier; 4]>,
    /// Return qualifier; for constructors, the constructed object's qualifier
    pub ret: Qualifier,
}

impl MethodSignature {
    pub fn new(name: impl Into<String>, is_static: bool, params: &[Qualifier], ret: Qualifier) -> Self {
        Self {
            name: name.into(),
            is_static,
            receiver: None,
            params: params.iter().copied().collect(),
            ret,
        }
    }

    pub fn with_receiver(mut self, receiver: Qualifier) -> Self {
        self.receiver = Some(receiver);
        self
    }

    /// Every qualifier of the signature, return first
    pub fn qualifiers(&self) -> impl Iterator<Item = Qualifier> + '_ {
        std::iter::once(self.ret).chain(self.receiver).chain(self.params.iter().copied())
    }
}

/// Result of binding the placeholders of a static call to its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticBinding {
    /// The single qualifier every placeholder resolves to
    pub binding: Qualifier,
    pub signature: MethodSignature,
}

/// Stateless receiver/member adaptation
pub struct ViewpointAdaptor;

impl ViewpointAdaptor {
    /// Qualifier of a member declared `declared`, read through a `receiver`
    pub fn adapt(receiver: Qualifier, declared: Qualifier) -> Qualifier {
        match declared {
            Qualifier::ReceiverDependantMutable => receiver,
            _ => declared,
        }
    }

    /// Adaptation of a signature position at an instance invocation
    pub fn adapt_invocation(receiver: Qualifier, declared: Qualifier) -> Qualifier {
        match declared {
            Qualifier::ReceiverDependantMutable | Qualifier::PolyMutable => receiver,
            _ => declared,
        }
    }

    /// Resolve a signature at a use site.
    ///
    /// `receiver` is the receiver qualifier of an instance method or the
    /// constructed-object qualifier of a constructor; it is ignored for
    /// static methods.
    pub fn method_from_use(signature: &MethodSignature, receiver: Option<Qualifier>) -> MethodSignature {
        if signature.is_static {
            return Self::substitute_static(signature);
        }
        let Some(receiver) = receiver else {
            return signature.clone();
        };

        MethodSignature {
            name: signature.name.clone(),
            is_static: false,
            receiver: signature.receiver.map(|r| Self::adapt_invocation(receiver, r)),
            params: signature
                .params
                .iter()
                .map(|p| Self::adapt_invocation(receiver, *p))
                .collect(),
            ret: Self::adapt_invocation(receiver, signature.ret),
        }
    }

    /// Replace `@PolyMutable` by `@SubstitutablePolyMutable` in a static signature.
    ///
    /// The return qualifier decides: when it is polymorphic, the return and
    /// every polymorphic parameter are substituted together; otherwise
    /// nothing is touched. Other qualifiers are never replaced.
    pub fn substitute_static(signature: &MethodSignature) -> MethodSignature {
        let mut resolved = signature.clone();
        if signature.ret != Qualifier::PolyMutable {
            return resolved;
        }

        resolved.ret = Qualifier::SubstitutablePolyMutable;
        for param in resolved.params.iter_mut() {
            if *param == Qualifier::PolyMutable {
                *param = Qualifier::SubstitutablePolyMutable;
            }
        }
        debug!(method = %signature.name, "substituted polymorphic static signature");
        resolved
    }

    /// Bind every placeholder of a resolved static signature to one qualifier.
    ///
    /// The binding is the join of the arguments passed at placeholder
    /// positions (`@Bottom` when there are none), so all placeholders of
    /// one call resolve identically.
    pub fn bind_substitutable(resolved: &MethodSignature, arguments: &[Qualifier]) -> StaticBinding {
        let h = hierarchy();
        let binding = h.least_upper_bound_all(
            resolved
                .params
                .iter()
                .zip(arguments)
                .filter(|(p, _)| **p == Qualifier::SubstitutablePolyMutable)
                .map(|(_, a)| *a),
        );

        let bind = |q: Qualifier| {
            if q == Qualifier::SubstitutablePolyMutable {
                binding
            } else {
                q
            }
        };

        StaticBinding {
            binding,
            signature: MethodSignature {
                name: resolved.name.clone(),
                is_static: resolved.is_static,
                receiver: resolved.receiver.map(bind),
                params: resolved.params.iter().copied().map(bind).collect(),
                ret: bind(resolved.ret),
            },
        }
    }
}
