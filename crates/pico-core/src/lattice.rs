//! Qualifier lattice for mutability checking
//!
//! The hierarchy is:
//! - `Readonly` (⊤) = a read-only view, supertype of every qualifier
//! - `Mutable`, `Immutable`, `ReceiverDependantMutable` and `PolyMutable`
//!   are pairwise incomparable directly below `Readonly`
//! - `SubstitutablePolyMutable` sits below all four middle qualifiers; it is
//!   unifiable with any of them
//! - `Bottom` (⊥) = the null type, subtype of everything
//!
//! The relation, join and meet tables are computed once from the direct
//! edges and never change afterwards.

use crate::qualifier::Qualifier;
use std::sync::LazyLock;

const N: usize = Qualifier::ALL.len();

/// Direct `(subtype, supertype)` edges of the hierarchy
const DIRECT_EDGES: &[(Qualifier, Qualifier)] = &[
    (Qualifier::Mutable, Qualifier::Readonly),
    (Qualifier::Immutable, Qualifier::Readonly),
    (Qualifier::ReceiverDependantMutable, Qualifier::Readonly),
    (Qualifier::PolyMutable, Qualifier::Readonly),
    (Qualifier::SubstitutablePolyMutable, Qualifier::Mutable),
    (Qualifier::SubstitutablePolyMutable, Qualifier::Immutable),
    (Qualifier::SubstitutablePolyMutable, Qualifier::ReceiverDependantMutable),
    (Qualifier::SubstitutablePolyMutable, Qualifier::PolyMutable),
    (Qualifier::Bottom, Qualifier::SubstitutablePolyMutable),
];

static HIERARCHY: LazyLock<QualifierHierarchy> = LazyLock::new(QualifierHierarchy::build);

/// The process-wide mutability hierarchy
pub fn hierarchy() -> &'static QualifierHierarchy {
    &HIERARCHY
}

/// Precomputed subtype relation plus join and meet tables
#[derive(Debug)]
pub struct QualifierHierarchy {
    subtype: [[bool; N]; N],
    lub: [[Qualifier; N]; N],
    glb: [[Qualifier; N]; N],
}

impl QualifierHierarchy {
    fn build() -> Self {
        let mut subtype = [[false; N]; N];
        for q in Qualifier::ALL {
            subtype[q.index()][q.index()] = true;
        }
        for &(sub, sup) in DIRECT_EDGES {
            subtype[sub.index()][sup.index()] = true;
        }
        // Reflexive-transitive closure
        for k in 0..N {
            for i in 0..N {
                for j in 0..N {
                    if subtype[i][k] && subtype[k][j] {
                        subtype[i][j] = true;
                    }
                }
            }
        }

        let mut lub = [[Qualifier::Readonly; N]; N];
        let mut glb = [[Qualifier::Bottom; N]; N];
        for a in Qualifier::ALL {
            for b in Qualifier::ALL {
                lub[a.index()][b.index()] = Self::least_of(&subtype, a, b);
                glb[a.index()][b.index()] = Self::greatest_of(&subtype, a, b);
            }
        }

        Self { subtype, lub, glb }
    }

    /// The common upper bound of `a` and `b` that is below every other one
    fn least_of(subtype: &[[bool; N]; N], a: Qualifier, b: Qualifier) -> Qualifier {
        let uppers: Vec<Qualifier> = Qualifier::ALL
            .into_iter()
            .filter(|u| subtype[a.index()][u.index()] && subtype[b.index()][u.index()])
            .collect();
        uppers
            .iter()
            .copied()
            .find(|candidate| uppers.iter().all(|u| subtype[candidate.index()][u.index()]))
            .unwrap_or(Qualifier::Readonly)
    }

    /// The common lower bound of `a` and `b` that is above every other one
    fn greatest_of(subtype: &[[bool; N]; N], a: Qualifier, b: Qualifier) -> Qualifier {
        let lowers: Vec<Qualifier> = Qualifier::ALL
            .into_iter()
            .filter(|l| subtype[l.index()][a.index()] && subtype[l.index()][b.index()])
            .collect();
        lowers
            .iter()
            .copied()
            .find(|candidate| lowers.iter().all(|l| subtype[l.index()][candidate.index()]))
            .unwrap_or(Qualifier::Bottom)
    }

    pub fn top(&self) -> Qualifier {
        Qualifier::Readonly
    }

    pub fn bottom(&self) -> Qualifier {
        Qualifier::Bottom
    }

    /// Check whether `sub` is lower than or equal to `sup`
    pub fn is_subtype(&self, sub: Qualifier, sup: Qualifier) -> bool {
        self.subtype[sub.index()][sup.index()]
    }

    /// Join: the most specific qualifier both sides can be viewed as
    pub fn least_upper_bound(&self, a: Qualifier, b: Qualifier) -> Qualifier {
        self.lub[a.index()][b.index()]
    }

    /// Meet: the most general qualifier that is a subtype of both sides
    pub fn greatest_lower_bound(&self, a: Qualifier, b: Qualifier) -> Qualifier {
        self.glb[a.index()][b.index()]
    }

    /// Join over any number of qualifiers; `Bottom` for an empty input
    pub fn least_upper_bound_all<I>(&self, qualifiers: I) -> Qualifier
    where
        I: IntoIterator<Item = Qualifier>,
    {
        qualifiers
            .into_iter()
            .fold(Qualifier::Bottom, |acc, q| self.least_upper_bound(acc, q))
    }
}

impl Qualifier {
    /// Join operation (least upper bound)
    pub fn join(self, other: Qualifier) -> Qualifier {
        hierarchy().least_upper_bound(self, other)
    }

    /// Meet operation (greatest lower bound)
    pub fn meet(self, other: Qualifier) -> Qualifier {
        hierarchy().greatest_lower_bound(self, other)
    }

    /// Check if this qualifier is lower in the lattice than (or equal to) `other`
    pub fn is_subtype_of(self, other: Qualifier) -> bool {
        hierarchy().is_subtype(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Qualifier::*;

    #[test]
    fn test_bottom_below_everything() {
        for q in Qualifier::ALL {
            assert!(Bottom.is_subtype_of(q), "Bottom <: {q}");
        }
    }

    #[test]
    fn test_readonly_above_everything() {
        for q in Qualifier::ALL {
            assert!(q.is_subtype_of(Readonly), "{q} <: Readonly");
        }
    }

    #[test]
    fn test_mutable_and_immutable_incomparable() {
        assert!(!Mutable.is_subtype_of(Immutable));
        assert!(!Immutable.is_subtype_of(Mutable));
        assert_eq!(Mutable.join(Immutable), Readonly);
        assert_eq!(Mutable.meet(Immutable), SubstitutablePolyMutable);
    }

    #[test]
    fn test_poly_is_not_a_concrete_qualifier() {
        assert!(!PolyMutable.is_subtype_of(Mutable));
        assert!(!PolyMutable.is_subtype_of(Immutable));
        assert!(PolyMutable.is_subtype_of(Readonly));
    }

    #[test]
    fn test_substitutable_unifies_with_concrete_qualifiers() {
        for q in [Mutable, Immutable, ReceiverDependantMutable, PolyMutable] {
            assert!(SubstitutablePolyMutable.is_subtype_of(q));
            assert_eq!(SubstitutablePolyMutable.join(q), q);
        }
    }

    #[test]
    fn test_join_with_bottom_is_identity() {
        for q in Qualifier::ALL {
            assert_eq!(Bottom.join(q), q);
            assert_eq!(q.meet(Readonly), q);
        }
    }

    #[test]
    fn test_join_all() {
        let h = hierarchy();
        assert_eq!(h.least_upper_bound_all([]), Bottom);
        assert_eq!(h.least_upper_bound_all([Immutable, Immutable]), Immutable);
        assert_eq!(h.least_upper_bound_all([Immutable, Bottom, Mutable]), Readonly);
    }
}
