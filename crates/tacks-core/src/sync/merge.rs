//! Deterministic per-item merge of a local collection against a remote
//! snapshot.
//!
//! Resolution is pairwise by id: `version` decides first, `lastModified`
//! breaks ties, and an exact tie with differing content is a conflict with
//! the remote copy adopted provisionally. Local-only records are always
//! preserved; this engine cannot distinguish a not-yet-pushed creation from
//! a record deleted remotely, so deletions must arrive through the explicit
//! mutation path.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use uuid::Uuid;

use crate::models::Syncable;

/// Local/remote pair recorded when resolution is ambiguous.
#[derive(Debug, Clone, PartialEq)]
pub struct ConflictPair<T> {
    pub local: T,
    pub remote: T,
}

/// Result of one merge pass.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome<T> {
    /// Reconciled collection; iteration order is unspecified
    pub merged: Vec<T>,
    /// At most one entry per id
    pub conflicts: Vec<ConflictPair<T>>,
}

/// Merge `remote` into `local`, keeping the winner of each id pairwise.
///
/// Deterministic for identical inputs. Never regresses `version` or
/// `lastModified` for a kept record, and never drops a local-only record.
pub fn merge<T>(local: &[T], remote: &[T]) -> MergeOutcome<T>
where
    T: Syncable + Clone + PartialEq,
{
    let mut merged: HashMap<Uuid, T> = local
        .iter()
        .map(|record| (record.merge_id(), record.clone()))
        .collect();
    let mut conflicts = Vec::new();

    for remote_record in remote {
        match merged.entry(remote_record.merge_id()) {
            Entry::Vacant(slot) => {
                slot.insert(remote_record.clone());
            }
            Entry::Occupied(mut slot) => {
                let local_record = slot.get();
                match local_record.version().cmp(&remote_record.version()) {
                    std::cmp::Ordering::Greater => {}
                    std::cmp::Ordering::Less => {
                        slot.insert(remote_record.clone());
                    }
                    std::cmp::Ordering::Equal => {
                        match local_record.last_modified().cmp(&remote_record.last_modified()) {
                            std::cmp::Ordering::Greater => {}
                            std::cmp::Ordering::Less => {
                                slot.insert(remote_record.clone());
                            }
                            std::cmp::Ordering::Equal => {
                                // Ambiguous ordering: identical counters but
                                // different content. Remote wins by default
                                // pending explicit resolution.
                                if local_record != remote_record {
                                    conflicts.push(ConflictPair {
                                        local: local_record.clone(),
                                        remote: remote_record.clone(),
                                    });
                                }
                                slot.insert(remote_record.clone());
                            }
                        }
                    }
                }
            }
        }
    }

    MergeOutcome {
        merged: merged.into_values().collect(),
        conflicts,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Rec {
        id: Uuid,
        version: i64,
        last_modified: i64,
        body: String,
    }

    impl Rec {
        fn new(id: Uuid, version: i64, last_modified: i64, body: &str) -> Self {
            Self {
                id,
                version,
                last_modified,
                body: body.to_string(),
            }
        }
    }

    impl Syncable for Rec {
        fn merge_id(&self) -> Uuid {
            self.id
        }

        fn version(&self) -> i64 {
            self.version
        }

        fn last_modified(&self) -> i64 {
            self.last_modified
        }
    }

    fn find<'a>(records: &'a [Rec], id: Uuid) -> &'a Rec {
        records.iter().find(|r| r.id == id).unwrap()
    }

    #[test]
    fn higher_local_version_wins_regardless_of_timestamps() {
        let id = Uuid::now_v7();
        let local = vec![Rec::new(id, 2, 1000, "A")];
        let remote = vec![Rec::new(id, 1, 2000, "B")];

        let outcome = merge(&local, &remote);
        assert_eq!(find(&outcome.merged, id).body, "A");
        assert!(outcome.conflicts.is_empty());
    }

    #[test]
    fn higher_remote_version_wins_regardless_of_timestamps() {
        let id = Uuid::now_v7();
        let local = vec![Rec::new(id, 1, 9999, "A")];
        let remote = vec![Rec::new(id, 3, 1, "B")];

        let outcome = merge(&local, &remote);
        assert_eq!(find(&outcome.merged, id).body, "B");
        assert!(outcome.conflicts.is_empty());
    }

    #[test]
    fn equal_versions_resolve_by_last_modified() {
        let id = Uuid::now_v7();
        let newer_local = merge(
            &[Rec::new(id, 2, 2000, "local")],
            &[Rec::new(id, 2, 1000, "remote")],
        );
        assert_eq!(find(&newer_local.merged, id).body, "local");

        let newer_remote = merge(
            &[Rec::new(id, 2, 1000, "local")],
            &[Rec::new(id, 2, 2000, "remote")],
        );
        assert_eq!(find(&newer_remote.merged, id).body, "remote");
        assert!(newer_local.conflicts.is_empty());
        assert!(newer_remote.conflicts.is_empty());
    }

    #[test]
    fn exact_tie_with_differing_content_is_a_conflict_and_remote_is_adopted() {
        let id = Uuid::now_v7();
        let local = vec![Rec::new(id, 1, 500, "A")];
        let remote = vec![Rec::new(id, 1, 500, "B")];

        let outcome = merge(&local, &remote);
        assert_eq!(outcome.conflicts.len(), 1);
        assert_eq!(outcome.conflicts[0].local.body, "A");
        assert_eq!(outcome.conflicts[0].remote.body, "B");
        assert_eq!(find(&outcome.merged, id).body, "B");
    }

    #[test]
    fn exact_tie_with_identical_content_is_not_a_conflict() {
        let id = Uuid::now_v7();
        let local = vec![Rec::new(id, 1, 500, "same")];
        let remote = vec![Rec::new(id, 1, 500, "same")];

        let outcome = merge(&local, &remote);
        assert!(outcome.conflicts.is_empty());
        assert_eq!(outcome.merged.len(), 1);
    }

    #[test]
    fn local_only_records_are_preserved() {
        let kept = Uuid::now_v7();
        let shared = Uuid::now_v7();
        let local = vec![Rec::new(kept, 1, 100, "mine"), Rec::new(shared, 1, 100, "x")];
        let remote = vec![Rec::new(shared, 2, 200, "y")];

        let outcome = merge(&local, &remote);
        assert_eq!(outcome.merged.len(), 2);
        assert_eq!(find(&outcome.merged, kept).body, "mine");
        assert_eq!(find(&outcome.merged, shared).body, "y");
    }

    #[test]
    fn remote_only_records_are_inserted() {
        let id = Uuid::now_v7();
        let outcome = merge(&[], &[Rec::new(id, 1, 100, "new")]);
        assert_eq!(outcome.merged.len(), 1);
        assert_eq!(find(&outcome.merged, id).body, "new");
    }

    #[test]
    fn merge_is_deterministic_for_identical_inputs() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let local = vec![Rec::new(a, 2, 100, "la"), Rec::new(b, 1, 100, "lb")];
        let remote = vec![Rec::new(a, 1, 200, "ra"), Rec::new(b, 1, 200, "rb")];

        let mut first = merge(&local, &remote);
        let mut second = merge(&local, &remote);
        first.merged.sort_by_key(|r| r.id);
        second.merged.sort_by_key(|r| r.id);
        assert_eq!(first, second);
        assert_eq!(find(&first.merged, a).body, "la");
        assert_eq!(find(&first.merged, b).body, "rb");
    }
}
