use pico_core::lattice::hierarchy;
use pico_core::Qualifier;
use proptest::prelude::*;
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;

fn any_qualifier() -> impl Strategy<Value = Qualifier> {
    proptest::sample::select(Qualifier::ALL.to_vec())
}

#[derive(Debug, Clone, Copy)]
struct Q(Qualifier);

impl Arbitrary for Q {
    fn arbitrary(g: &mut Gen) -> Self {
        Q(*g.choose(&Qualifier::ALL).unwrap_or(&Qualifier::Readonly))
    }
}

proptest! {
    #[test]
    fn subtyping_is_a_partial_order(a in any_qualifier(), b in any_qualifier(), c in any_qualifier()) {
        let h = hierarchy();
        prop_assert!(h.is_subtype(a, a));
        if h.is_subtype(a, b) && h.is_subtype(b, a) {
            prop_assert_eq!(a, b);
        }
        if h.is_subtype(a, b) && h.is_subtype(b, c) {
            prop_assert!(h.is_subtype(a, c));
        }
    }

    #[test]
    fn join_is_least_upper_bound(a in any_qualifier(), b in any_qualifier(), c in any_qualifier()) {
        let h = hierarchy();
        let j = h.least_upper_bound(a, b);
        prop_assert!(h.is_subtype(a, j));
        prop_assert!(h.is_subtype(b, j));
        if h.is_subtype(a, c) && h.is_subtype(b, c) {
            prop_assert!(h.is_subtype(j, c));
        }
    }

    #[test]
    fn meet_is_greatest_lower_bound(a in any_qualifier(), b in any_qualifier(), c in any_qualifier()) {
        let h = hierarchy();
        let m = h.greatest_lower_bound(a, b);
        prop_assert!(h.is_subtype(m, a));
        prop_assert!(h.is_subtype(m, b));
        if h.is_subtype(c, a) && h.is_subtype(c, b) {
            prop_assert!(h.is_subtype(c, m));
        }
    }

    #[test]
    fn join_and_meet_associate(a in any_qualifier(), b in any_qualifier(), c in any_qualifier()) {
        prop_assert_eq!(a.join(b).join(c), a.join(b.join(c)));
        prop_assert_eq!(a.meet(b).meet(c), a.meet(b.meet(c)));
    }
}

#[quickcheck]
fn join_commutes(a: Q, b: Q) -> bool {
    a.0.join(b.0) == b.0.join(a.0) && a.0.meet(b.0) == b.0.meet(a.0)
}

#[quickcheck]
fn join_and_meet_idempotent(a: Q) -> bool {
    a.0.join(a.0) == a.0 && a.0.meet(a.0) == a.0
}

#[quickcheck]
fn absorption(a: Q, b: Q) -> bool {
    a.0.join(a.0.meet(b.0)) == a.0 && a.0.meet(a.0.join(b.0)) == a.0
}

#[quickcheck]
fn subtype_agrees_with_join(a: Q, b: Q) -> bool {
    a.0.is_subtype_of(b.0) == (a.0.join(b.0) == b.0)
}

#[test]
fn test_bounds() {
    let h = hierarchy();
    assert_eq!(h.top(), Qualifier::Readonly);
    assert_eq!(h.bottom(), Qualifier::Bottom);
    assert_eq!(h.least_upper_bound(Qualifier::Mutable, Qualifier::Immutable), Qualifier::Readonly);
}
