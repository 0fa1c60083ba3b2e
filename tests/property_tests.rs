//! Property-based tests for hashing and classification invariants.

use std::fs;

use mediasift::classify::Classifier;
use mediasift::hasher::Hasher;
use mediasift::index::HashIndex;
use proptest::prelude::*;
use tempfile::TempDir;

proptest! {
    #[test]
    fn test_digest_determinism(content in prop::collection::vec(any::<u8>(), 0..4096)) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("candidate.bin");
        fs::write(&path, &content).unwrap();

        let hasher = Hasher::new();
        let d1 = hasher.digest(&path).unwrap();
        let d2 = hasher.digest(&path).unwrap();

        prop_assert_eq!(d1, d2);
    }

    #[test]
    fn test_digest_independent_of_file_name(content in prop::collection::vec(any::<u8>(), 0..4096)) {
        let dir = TempDir::new().unwrap();
        let path1 = dir.path().join("one.jpg");
        let path2 = dir.path().join("completely-different.mov");
        fs::write(&path1, &content).unwrap();
        fs::write(&path2, &content).unwrap();

        let hasher = Hasher::new();
        prop_assert_eq!(hasher.digest(&path1).unwrap(), hasher.digest(&path2).unwrap());
    }

    #[test]
    fn test_identical_content_admitted_exactly_once(
        content in prop::collection::vec(any::<u8>(), 0..2048),
        copies in 2usize..6,
    ) {
        let dir = TempDir::new().unwrap();
        let batch: Vec<_> = (0..copies)
            .map(|i| {
                let path = dir.path().join(format!("copy{i}.jpg"));
                fs::write(&path, &content).unwrap();
                path
            })
            .collect();

        let index = HashIndex::open_in_memory().unwrap();
        let report = Classifier::with_defaults().classify_batch(&index, &batch).unwrap();

        // Exactly one admission per content, first in input order wins,
        // every other copy points back at it.
        prop_assert_eq!(report.unique.clone(), vec![batch[0].clone()]);
        prop_assert_eq!(report.duplicates.len(), copies - 1);
        for dup in &report.duplicates {
            prop_assert_eq!(&dup.original, &batch[0]);
        }
        prop_assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_partition_is_exclusive_and_total(
        contents in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..512), 0..12),
    ) {
        let dir = TempDir::new().unwrap();
        let batch: Vec<_> = contents
            .iter()
            .enumerate()
            .map(|(i, content)| {
                let path = dir.path().join(format!("file{i}.jpg"));
                fs::write(&path, content).unwrap();
                path
            })
            .collect();

        let index = HashIndex::open_in_memory().unwrap();
        let report = Classifier::with_defaults().classify_batch(&index, &batch).unwrap();

        prop_assert_eq!(
            report.unique.len() + report.duplicates.len() + report.skipped.len(),
            batch.len()
        );

        // Unique count equals the number of distinct contents.
        let mut distinct = contents.clone();
        distinct.sort();
        distinct.dedup();
        prop_assert_eq!(report.unique.len(), distinct.len());

        // Rerunning the same batch admits nothing new.
        let rerun = Classifier::with_defaults().classify_batch(&index, &batch).unwrap();
        prop_assert!(rerun.unique.is_empty());
        prop_assert_eq!(rerun.duplicates.len(), batch.len());
    }
}
