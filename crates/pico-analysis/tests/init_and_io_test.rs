use pico_analysis::prelude::*;
use pico_core::init::InitializationLattice;
use proptest::prelude::*;
use std::io::Write;

fn state() -> impl Strategy<Value = InitState> {
    prop_oneof![
        Just(InitState::Initialized),
        Just(InitState::Bottom),
        (0u32..4).prop_map(InitState::UnderInitialization),
        (0u32..4).prop_map(InitState::UnknownInitialization),
    ]
}

proptest! {
    #[test]
    fn join_is_least_upper_bound(a in state(), b in state(), c in state()) {
        let l = FreedomBeforeCommitment;
        let j = l.least_upper_bound(&a, &b);
        prop_assert!(l.is_subtype(&a, &j));
        prop_assert!(l.is_subtype(&b, &j));
        if l.is_subtype(&a, &c) && l.is_subtype(&b, &c) {
            prop_assert!(l.is_subtype(&j, &c));
        }
    }

    #[test]
    fn join_is_commutative(a in state(), b in state()) {
        let l = FreedomBeforeCommitment;
        prop_assert_eq!(l.least_upper_bound(&a, &b), l.least_upper_bound(&b, &a));
    }
}

#[test]
fn test_check_file_reads_model_from_disk() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        "{}",
        include_str!("../../../tests/fixtures/pico/copy_to_cast.json")
    )
    .unwrap();

    let report = pico_analysis::check_file(&QualifierFactory::default(), file.path()).unwrap();
    assert_eq!(report.keys(), vec!["type.invalid"]);
}

#[test]
fn test_check_file_rejects_malformed_model() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{\"classes\": [{{\"fields\": 3}}]}}").unwrap();

    assert!(pico_analysis::check_file(&QualifierFactory::default(), file.path()).is_err());
}
