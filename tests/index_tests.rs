//! Durability and concurrency tests for the hash index store.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use mediasift::hasher::Digest;
use mediasift::index::HashIndex;
use tempfile::tempdir;

fn digest_of(byte: u8) -> Digest {
    [byte; 32]
}

#[test]
fn test_insert_survives_handle_drop_and_reopen() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("index.db");
    let digest = digest_of(0x01);

    {
        let index = HashIndex::open(&db).unwrap();
        assert!(index
            .insert_if_absent(&digest, Path::new("/backup/a.jpg"))
            .unwrap());
        // Dropped without any explicit flush or close; the insert must
        // already be durable.
    }

    let reopened = HashIndex::open(&db).unwrap();
    assert_eq!(
        reopened.lookup(&digest).unwrap(),
        Some(PathBuf::from("/backup/a.jpg"))
    );
}

#[test]
fn test_committed_insert_visible_to_second_connection() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("index.db");
    let digest = digest_of(0x02);

    let writer = HashIndex::open(&db).unwrap();
    let reader = HashIndex::open(&db).unwrap();

    assert!(writer
        .insert_if_absent(&digest, Path::new("/backup/b.jpg"))
        .unwrap());

    // A different connection to the same store observes the commit, and its
    // own insert attempt loses.
    assert_eq!(
        reader.lookup(&digest).unwrap(),
        Some(PathBuf::from("/backup/b.jpg"))
    );
    assert!(!reader
        .insert_if_absent(&digest, Path::new("/backup/late.jpg"))
        .unwrap());
}

#[test]
fn test_racing_inserts_on_same_digest_produce_one_winner() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("index.db");
    let index = Arc::new(HashIndex::open(&db).unwrap());
    let digest = digest_of(0x03);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let index = Arc::clone(&index);
            thread::spawn(move || {
                let path = PathBuf::from(format!("/backup/racer{i}.jpg"));
                (path.clone(), index.insert_if_absent(&digest, &path).unwrap())
            })
        })
        .collect();

    let results: Vec<(PathBuf, bool)> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let winners: Vec<_> = results.iter().filter(|(_, won)| *won).collect();
    assert_eq!(winners.len(), 1, "exactly one insert may win");

    // The recorded holder is the winner's path, and it stays recorded.
    assert_eq!(
        index.lookup(&digest).unwrap(),
        Some(winners[0].0.clone())
    );
    assert_eq!(index.len().unwrap(), 1);
}

#[test]
fn test_racing_inserts_on_distinct_digests_all_win() {
    let dir = tempdir().unwrap();
    let index = Arc::new(HashIndex::open(&dir.path().join("index.db")).unwrap());

    let handles: Vec<_> = (0..8u8)
        .map(|i| {
            let index = Arc::clone(&index);
            thread::spawn(move || {
                let path = PathBuf::from(format!("/backup/file{i}.jpg"));
                index.insert_if_absent(&digest_of(i), &path).unwrap()
            })
        })
        .collect();

    let wins: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(wins.iter().all(|&won| won), "distinct digests never collide");
    assert_eq!(index.len().unwrap(), 8);
}

#[test]
fn test_reopen_does_not_disturb_existing_entries() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("index.db");

    {
        let index = HashIndex::open(&db).unwrap();
        for i in 0..5u8 {
            let path = PathBuf::from(format!("/backup/seed{i}.jpg"));
            assert!(index.insert_if_absent(&digest_of(i), &path).unwrap());
        }
    }

    // Several reopen cycles; the ledger must neither shrink nor grow.
    for _ in 0..3 {
        let index = HashIndex::open(&db).unwrap();
        assert_eq!(index.len().unwrap(), 5);
    }

    let index = HashIndex::open(&db).unwrap();
    for i in 0..5u8 {
        assert_eq!(
            index.lookup(&digest_of(i)).unwrap(),
            Some(PathBuf::from(format!("/backup/seed{i}.jpg")))
        );
    }
}
