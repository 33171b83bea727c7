//! QuickCheck integration for properties over unbounded inputs

use super::{PropertyStatus, VerificationMethod, VerificationResult};
use pico_core::lattice::hierarchy;
use pico_core::viewpoint::{MethodSignature, ViewpointAdaptor};
use pico_core::Qualifier;
use quickcheck::{Arbitrary, Gen, QuickCheck, TestResult};

/// A qualifier drawn uniformly from the whole hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArbitraryQualifier(pub Qualifier);

impl Arbitrary for ArbitraryQualifier {
    fn arbitrary(g: &mut Gen) -> Self {
        ArbitraryQualifier(*g.choose(&Qualifier::ALL).unwrap_or(&Qualifier::Readonly))
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        // Shrink towards the top
        match self.0 {
            Qualifier::Readonly => quickcheck::empty_shrinker(),
            _ => quickcheck::single_shrinker(ArbitraryQualifier(Qualifier::Readonly)),
        }
    }
}

/// A static method signature of arbitrary arity
#[derive(Debug, Clone)]
pub struct ArbitrarySignature(pub MethodSignature);

impl Arbitrary for ArbitrarySignature {
    fn arbitrary(g: &mut Gen) -> Self {
        let arity = usize::arbitrary(g) % 6;
        let params: Vec<Qualifier> = (0..arity).map(|_| ArbitraryQualifier::arbitrary(g).0).collect();
        let ret = ArbitraryQualifier::arbitrary(g).0;
        ArbitrarySignature(MethodSignature::new("m", true, &params, ret))
    }
}

/// Substitution replaces `@PolyMutable` everywhere or nowhere, and touches nothing else
pub fn prop_static_substitution_all_or_nothing(sig: ArbitrarySignature) -> bool {
    let sig = sig.0;
    let resolved = ViewpointAdaptor::substitute_static(&sig);
    let substituted = sig.ret == Qualifier::PolyMutable;

    std::iter::once((sig.ret, resolved.ret))
        .chain(sig.params.iter().copied().zip(resolved.params.iter().copied()))
        .all(|(before, after)| match before {
            Qualifier::PolyMutable if substituted => after == Qualifier::SubstitutablePolyMutable,
            _ => after == before,
        })
}

/// Binding resolves every placeholder of one call to the same qualifier, above every argument bound to one
pub fn prop_binding_is_uniform(sig: ArbitrarySignature, args: Vec<ArbitraryQualifier>) -> TestResult {
    let sig = sig.0;
    if args.len() < sig.params.len() {
        return TestResult::discard();
    }
    let resolved = ViewpointAdaptor::substitute_static(&sig);
    let args: Vec<Qualifier> = args.into_iter().map(|a| a.0).collect();
    let bound = ViewpointAdaptor::bind_substitutable(&resolved, &args);

    let uniform = resolved
        .params
        .iter()
        .zip(&bound.signature.params)
        .filter(|(p, _)| **p == Qualifier::SubstitutablePolyMutable)
        .all(|(_, b)| *b == bound.binding);
    let accepts_args = resolved
        .params
        .iter()
        .zip(&args)
        .filter(|(p, _)| **p == Qualifier::SubstitutablePolyMutable)
        .all(|(_, a)| hierarchy().is_subtype(*a, bound.binding));

    TestResult::from_bool(uniform && accepts_args)
}

fn sampled(name: &str, tests: u64, outcome: Result<u64, TestResult>) -> VerificationResult {
    match outcome {
        Ok(passed) => VerificationResult {
            property: name.to_string(),
            status: PropertyStatus::Proven,
            method: VerificationMethod::Sampled { tests: passed },
            counterexample: None,
        },
        Err(failure) => VerificationResult {
            property: name.to_string(),
            status: PropertyStatus::Violated,
            method: VerificationMethod::Sampled { tests },
            counterexample: Some(format!("{failure:?}")),
        },
    }
}

/// Run the sampled properties with `tests` cases each
pub fn sampled_properties(tests: u64) -> Vec<VerificationResult> {
    let runner = || QuickCheck::new().tests(tests).max_tests(tests * 10);
    vec![
        sampled(
            "static_substitution_all_or_nothing",
            tests,
            runner().quicktest(prop_static_substitution_all_or_nothing as fn(ArbitrarySignature) -> bool),
        ),
        sampled(
            "static_binding_uniform",
            tests,
            runner().quicktest(prop_binding_is_uniform as fn(ArbitrarySignature, Vec<ArbitraryQualifier>) -> TestResult),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[quickcheck]
    fn static_substitution(sig: ArbitrarySignature) -> bool {
        prop_static_substitution_all_or_nothing(sig)
    }

    #[test]
    fn test_sampled_properties_pass() {
        for result in sampled_properties(50) {
            assert!(result.is_proven(), "{}: {:?}", result.property, result.counterexample);
        }
    }

    #[test]
    fn test_shrinks_to_top() {
        let shrunk: Vec<_> = ArbitraryQualifier(Qualifier::Bottom).shrink().collect();
        assert_eq!(shrunk, vec![ArbitraryQualifier(Qualifier::Readonly)]);
        assert_eq!(ArbitraryQualifier(Qualifier::Readonly).shrink().count(), 0);
    }
}
