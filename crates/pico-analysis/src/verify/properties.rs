//! Exhaustively checked properties of the qualifier engine

use pico_core::lattice::hierarchy;
use pico_core::position::{HostType, PositionKind, PrimitiveKind, TypePosition};
use pico_core::refinement::apply_inferred;
use pico_core::viewpoint::ViewpointAdaptor;
use pico_core::{CheckerConfig, Qualifier};

/// A named property; `check` returns the first counterexample it finds
pub struct Property {
    pub name: &'static str,
    pub check: fn() -> Option<String>,
}

const ALL: [Qualifier; 7] = Qualifier::ALL;

fn pairs() -> impl Iterator<Item = (Qualifier, Qualifier)> {
    ALL.into_iter().flat_map(|a| ALL.into_iter().map(move |b| (a, b)))
}

fn triples() -> impl Iterator<Item = (Qualifier, Qualifier, Qualifier)> {
    pairs().flat_map(|(a, b)| ALL.into_iter().map(move |c| (a, b, c)))
}

fn first<T, I, F>(inputs: I, holds: F) -> Option<String>
where
    I: Iterator<Item = T>,
    T: std::fmt::Debug,
    F: Fn(&T) -> bool,
{
    inputs.filter(|input| !holds(input)).map(|input| format!("{input:?}")).next()
}

fn reflexive() -> Option<String> {
    first(ALL.into_iter(), |a| hierarchy().is_subtype(*a, *a))
}

fn antisymmetric() -> Option<String> {
    let h = hierarchy();
    first(pairs(), |(a, b)| !(h.is_subtype(*a, *b) && h.is_subtype(*b, *a)) || a == b)
}

fn transitive() -> Option<String> {
    let h = hierarchy();
    first(triples(), |(a, b, c)| {
        !(h.is_subtype(*a, *b) && h.is_subtype(*b, *c)) || h.is_subtype(*a, *c)
    })
}

fn lub_is_least_upper_bound() -> Option<String> {
    let h = hierarchy();
    first(triples(), |(a, b, c)| {
        let j = h.least_upper_bound(*a, *b);
        let upper = h.is_subtype(*a, j) && h.is_subtype(*b, j);
        let least = !(h.is_subtype(*a, *c) && h.is_subtype(*b, *c)) || h.is_subtype(j, *c);
        upper && least
    })
}

fn glb_is_greatest_lower_bound() -> Option<String> {
    let h = hierarchy();
    first(triples(), |(a, b, c)| {
        let m = h.greatest_lower_bound(*a, *b);
        let lower = h.is_subtype(m, *a) && h.is_subtype(m, *b);
        let greatest = !(h.is_subtype(*c, *a) && h.is_subtype(*c, *b)) || h.is_subtype(*c, m);
        lower && greatest
    })
}

fn commutative() -> Option<String> {
    first(pairs(), |(a, b)| a.join(*b) == b.join(*a) && a.meet(*b) == b.meet(*a))
}

fn associative() -> Option<String> {
    first(triples(), |(a, b, c)| {
        a.join(*b).join(*c) == a.join(b.join(*c)) && a.meet(*b).meet(*c) == a.meet(b.meet(*c))
    })
}

fn idempotent() -> Option<String> {
    first(ALL.into_iter(), |a| a.join(*a) == *a && a.meet(*a) == *a)
}

fn absorption() -> Option<String> {
    first(pairs(), |(a, b)| a.join(a.meet(*b)) == *a && a.meet(a.join(*b)) == *a)
}

fn bounded() -> Option<String> {
    let h = hierarchy();
    first(ALL.into_iter(), |a| h.is_subtype(h.bottom(), *a) && h.is_subtype(*a, h.top()))
}

fn fixed_members_ignore_receiver() -> Option<String> {
    let fixed = [Qualifier::Mutable, Qualifier::Immutable, Qualifier::Readonly, Qualifier::Bottom];
    first(pairs().filter(|(_, d)| fixed.contains(d)), |(r, d)| {
        ViewpointAdaptor::adapt(*r, *d) == *d
    })
}

fn receiver_dependant_adopts_receiver() -> Option<String> {
    first(ALL.into_iter(), |r| {
        ViewpointAdaptor::adapt(*r, Qualifier::ReceiverDependantMutable) == *r
    })
}

fn adaptation_is_monotone_in_receiver() -> Option<String> {
    let h = hierarchy();
    first(triples(), |(r1, r2, d)| {
        !h.is_subtype(*r1, *r2)
            || h.is_subtype(ViewpointAdaptor::adapt(*r1, *d), ViewpointAdaptor::adapt(*r2, *d))
    })
}

fn refinement_respects_implicit_immutability() -> Option<String> {
    let config = CheckerConfig::default();
    let hosts = [
        HostType::Primitive(PrimitiveKind::Int),
        HostType::Boxed(PrimitiveKind::Boolean),
        HostType::string(),
        HostType::object(),
    ];
    let inputs = hosts.into_iter().flat_map(|h| ALL.into_iter().map(move |q| (h.clone(), q)));
    first(inputs, |(host, q)| {
        let pos = TypePosition::new(PositionKind::Local, host.clone());
        let once = apply_inferred(pos, *q, &config);
        let twice = apply_inferred(once.clone(), *q, &config);
        let forced = !config.is_implicitly_immutable(host) || once.qualifier() == Some(Qualifier::Immutable);
        forced && once == twice
    })
}

/// Every exhaustively checked property
pub fn all_properties() -> Vec<Property> {
    vec![
        Property { name: "subtype_reflexive", check: reflexive },
        Property { name: "subtype_antisymmetric", check: antisymmetric },
        Property { name: "subtype_transitive", check: transitive },
        Property { name: "lub_least_upper_bound", check: lub_is_least_upper_bound },
        Property { name: "glb_greatest_lower_bound", check: glb_is_greatest_lower_bound },
        Property { name: "lub_glb_commutative", check: commutative },
        Property { name: "lub_glb_associative", check: associative },
        Property { name: "lub_glb_idempotent", check: idempotent },
        Property { name: "absorption", check: absorption },
        Property { name: "bounded", check: bounded },
        Property { name: "fixed_members_ignore_receiver", check: fixed_members_ignore_receiver },
        Property { name: "receiver_dependant_adopts_receiver", check: receiver_dependant_adopts_receiver },
        Property { name: "adaptation_monotone", check: adaptation_is_monotone_in_receiver },
        Property { name: "refinement_implicit_immutability", check: refinement_respects_implicit_immutability },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_names_unique() {
        let props = all_properties();
        let names: std::collections::HashSet<_> = props.iter().map(|p| p.name).collect();
        assert_eq!(names.len(), props.len());
    }

    #[test]
    fn test_first_reports_failing_input() {
        assert_eq!(first([1, 2, 3].into_iter(), |n| *n < 2), Some("2".to_string()));
        assert_eq!(first([1].into_iter(), |n| *n < 2), None);
    }
}
