mod common;

use act_ledger::ledger::{Ledger, LedgerSnapshot, GENESIS_PARENT_HASH, DEFAULT_MAX_ENTRIES};
use act_ledger::{LedgerError, ValidationError, ViolationKind};
use common::{record, sample_ledger};

#[test]
fn test_end_to_end_scenario() {
    let ledger = sample_ledger();
    let history = ledger.history();

    assert_eq!(history.len(), 3);
    assert_eq!(
        history.iter().map(|row| row.version).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(
        history.iter().map(|row| row.author.as_str()).collect::<Vec<_>>(),
        vec!["Alice", "Bob", "Carol"]
    );
    assert!(ledger.verify_integrity());

    assert_eq!(history[0].parent_hash, GENESIS_PARENT_HASH);
    for pair in history.windows(2) {
        assert_eq!(pair[1].parent_hash, pair[0].hash);
    }
    for row in &history {
        assert_eq!(row.hash.len(), 64);
        assert!(row.hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}

#[test]
fn test_validation_rejections() {
    assert_eq!(
        act_ledger::Record::new("", "substantive", "Alice", None, None).unwrap_err(),
        ValidationError::EmptyContent
    );
    assert!(matches!(
        act_ledger::Record::new("x", "bogus", "Alice", None, None).unwrap_err(),
        ValidationError::InvalidCategory(_)
    ));
    assert_eq!(
        act_ledger::Record::new("x", "substantive", "", None, None).unwrap_err(),
        ValidationError::EmptyAuthor
    );
}

#[test]
fn test_exported_snapshot_verifies_offline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exports").join("act-1.json");

    sample_ledger().snapshot().save(&path).unwrap();
    let loaded = LedgerSnapshot::load(&path).unwrap();

    assert_eq!(loaded.act_id, "ACT-1");
    assert_eq!(loaded.verify(None), Ok(3));
    assert!(loaded.integrity_report(None).is_valid);
}

#[test]
fn test_snapshot_content_tamper() {
    let mut snapshot = sample_ledger().snapshot();
    snapshot.history[1].content = "B'".to_string();

    assert_eq!(
        snapshot.verify(None).unwrap_err().violation(),
        Some((2, ViolationKind::HashMismatch))
    );
}

#[test]
fn test_snapshot_hash_tamper() {
    let mut snapshot = sample_ledger().snapshot();
    snapshot.history[2].hash = "f".repeat(64);

    assert_eq!(
        snapshot.verify(None).unwrap_err().violation(),
        Some((3, ViolationKind::HashMismatch))
    );
}

#[test]
fn test_snapshot_relinked_entry_breaks_chain() {
    let ledger = sample_ledger();
    let mut snapshot = ledger.snapshot();

    // Point entry 2 elsewhere and re-hash it so it is self-consistent
    let forged_parent = "1".repeat(64);
    let row = &mut snapshot.history[1];
    row.parent_hash = forged_parent;
    row.hash = row.hash_input().digest();

    assert_eq!(
        snapshot.verify(None).unwrap_err().violation(),
        Some((2, ViolationKind::ParentLinkBroken))
    );
}

#[test]
fn test_snapshot_splice_detected_after_splice_point() {
    let ledger = sample_ledger();
    let mut snapshot = ledger.snapshot();

    let donor = Ledger::new("ACT-1", "Test Act").unwrap();
    donor.append(record("A", "Alice")).unwrap();
    let mut spliced = donor.history().remove(0);
    spliced.content = "Injected".to_string();
    spliced.author = "Mallory".to_string();
    spliced.parent_hash = snapshot.history[0].hash.clone();
    spliced.hash = spliced.hash_input().digest();

    snapshot.history.insert(1, spliced);
    for (i, row) in snapshot.history.iter_mut().enumerate() {
        row.version = i + 1;
    }

    assert_eq!(
        snapshot.verify(None).unwrap_err().violation(),
        Some((3, ViolationKind::ParentLinkBroken))
    );
    assert!(Ledger::restore(&snapshot, DEFAULT_MAX_ENTRIES).is_err());
}

#[test]
fn test_restore_continues_chain() {
    let original = sample_ledger();
    let restored = Ledger::restore(&original.snapshot(), DEFAULT_MAX_ENTRIES).unwrap();

    let hash = restored.append(record("D", "Dave")).unwrap();
    let history = restored.history();
    assert_eq!(history[3].parent_hash, original.head_hash().unwrap());
    assert_eq!(history[3].hash, hash);
    assert!(restored.verify_integrity());
}

#[test]
fn test_capacity_policy() {
    let ledger = Ledger::new("ACT-1", "Test Act").unwrap().with_max_entries(3);
    for (content, author) in [("A", "Alice"), ("B", "Bob"), ("C", "Carol")] {
        ledger.append(record(content, author)).unwrap();
    }

    assert_eq!(
        ledger.append(record("D", "Dave")),
        Err(LedgerError::CapacityExceeded { limit: 3, actual: 4 })
    );
    assert!(ledger.verify_integrity());

    let snapshot = ledger.snapshot();
    assert!(matches!(
        snapshot.verify(Some(2)),
        Err(LedgerError::CapacityExceeded { limit: 2, actual: 3 })
    ));
}

#[test]
fn test_queries() {
    let ledger = sample_ledger();
    assert_eq!(ledger.search("bob").len(), 1);
    assert_eq!(ledger.statistics().total, 3);
    assert_eq!(ledger.statistics().authors.len(), 3);

    let diff = ledger.diff(2).unwrap();
    assert_eq!(diff.added_lines, vec!["B".to_string()]);
    assert_eq!(diff.removed_lines, vec!["A".to_string()]);
    assert!(ledger.diff(4).is_none());
}
