//! Freedom-before-commitment initialization states
//!
//! The reference initialization hierarchy composed with the mutability
//! lattice. `UnderInitialization(n)` is an object whose constructors up to
//! class depth `n` have finished; `UnknownInitialization(n)` may be either
//! fully initialized or under initialization at depth `n` or more.

use pico_core::init::InitializationLattice;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitState {
    Initialized,
    UnderInitialization(u32),
    UnknownInitialization(u32),
    Bottom,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FreedomBeforeCommitment;

impl InitializationLattice for FreedomBeforeCommitment {
    type State = InitState;

    fn is_subtype(&self, sub: &InitState, sup: &InitState) -> bool {
        use InitState::*;
        match (sub, sup) {
            (Bottom, _) => true,
            (_, Bottom) => false,
            (Initialized, Initialized) => true,
            (Initialized, UnknownInitialization(_)) => true,
            (UnderInitialization(n), UnderInitialization(m)) => n == m,
            (UnderInitialization(n), UnknownInitialization(m)) => n >= m,
            (UnknownInitialization(n), UnknownInitialization(m)) => n >= m,
            (Initialized, UnderInitialization(_))
            | (UnderInitialization(_), Initialized)
            | (UnknownInitialization(_), Initialized | UnderInitialization(_)) => false,
        }
    }

    fn least_upper_bound(&self, a: &InitState, b: &InitState) -> InitState {
        use InitState::*;
        match (*a, *b) {
            (Bottom, x) | (x, Bottom) => x,
            (Initialized, Initialized) => Initialized,
            (UnderInitialization(n), UnderInitialization(m)) if n == m => UnderInitialization(n),
            _ => UnknownInitialization(depth(a).min(depth(b))),
        }
    }
}

fn depth(state: &InitState) -> u32 {
    match state {
        InitState::UnderInitialization(n) | InitState::UnknownInitialization(n) => *n,
        InitState::Initialized | InitState::Bottom => u32::MAX,
    }
}
