//! Generator to coordinator, through files on disk

use digest_gen::{file_name, generate, hash_value, write_digests, Profile};
use psi_core::{DigestList, RendezvousCoordinator, SlotId, SubmitOutcome};

fn load(path: &std::path::Path) -> DigestList {
    DigestList::from_bytes(&std::fs::read(path).unwrap()).unwrap()
}

#[test]
fn test_generated_files_intersect_in_even_numbers() {
    let dir = tempfile::tempdir().unwrap();
    let all_path = dir.path().join(file_name(100, Profile::All));
    let even_path = dir.path().join(file_name(100, Profile::EvenOnly));

    write_digests(&all_path, &generate(100, Profile::All)).unwrap();
    write_digests(&even_path, &generate(100, Profile::EvenOnly)).unwrap();

    let coordinator = RendezvousCoordinator::new();
    assert_eq!(
        coordinator.submit(load(&all_path)),
        SubmitOutcome::Waiting { slot: SlotId::First }
    );

    let result = match coordinator.submit(load(&even_path)) {
        SubmitOutcome::Computed { result, .. } => result,
        other => panic!("expected a computed result, got {:?}", other),
    };

    assert_eq!(result.len(), 50);
    assert!(result.iter().all(|d| (0..100).step_by(2).any(|v| hash_value(v) == *d)));
    assert!(!result.iter().any(|d| *d == hash_value(1)));
}

#[test]
fn test_same_file_twice_intersects_fully() {
    let list = generate(64, Profile::EvenOnly);
    let coordinator = RendezvousCoordinator::new();

    coordinator.submit(list.clone());
    match coordinator.submit(list.clone()) {
        SubmitOutcome::Computed { round, result, .. } => {
            assert_eq!(round, 1);
            assert_eq!(result, list);
        }
        other => panic!("expected a computed result, got {:?}", other),
    }
}
