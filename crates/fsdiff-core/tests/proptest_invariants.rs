//! Property tests for digest invariants.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

use fsdiff_core::digest::{digest, DigestTree, RollingDigest, RootDigest};
use fsdiff_core::types::FileRecord;

fn record(path: String, content: u64, size: u64, secs: i64) -> FileRecord {
    let mod_time: DateTime<Utc> = Utc.timestamp_opt(secs, 0).single().unwrap_or_default();
    FileRecord {
        path,
        content_digest: format!("{content:016x}"),
        size,
        mode: 0o100_644,
        mod_time,
        is_dir: false,
        owner_id: 0,
        group_id: 0,
        security_metadata: None,
    }
}

fn records_strategy() -> impl Strategy<Value = Vec<FileRecord>> {
    prop::collection::btree_map(
        "/[a-c]{1,3}(/[a-c]{1,3}){0,3}",
        (any::<u64>(), 0u64..1_000_000, 0i64..2_000_000_000),
        0..40,
    )
    .prop_map(|entries| {
        entries
            .into_iter()
            .map(|(path, (content, size, secs))| record(path, content, size, secs))
            .collect()
    })
}

proptest! {
    #[test]
    fn root_digest_is_order_independent(records in records_strategy(), seed in any::<u64>()) {
        let mut shuffled = records.clone();
        let len = shuffled.len();
        if len > 1 {
            shuffled.rotate_left((seed as usize) % len);
            shuffled.reverse();
        }
        prop_assert_eq!(digest(&records), digest(&shuffled));
    }

    #[test]
    fn rolling_digest_matches_full_digest(records in records_strategy()) {
        let mut rolling = RollingDigest::new();
        for r in &records {
            rolling.fold_in(r);
        }
        prop_assert_eq!(rolling.finish(), digest(&records));
    }

    #[test]
    fn merged_partitions_match_full_digest(records in records_strategy(), split in any::<usize>()) {
        let at = if records.is_empty() { 0 } else { split % (records.len() + 1) };
        let (head, tail) = records.split_at(at);
        let mut merged = RollingDigest::new();
        let mut rest = RollingDigest::new();
        head.iter().for_each(|r| merged.fold_in(r));
        tail.iter().for_each(|r| rest.fold_in(r));
        merged.merge(&rest);
        prop_assert_eq!(merged.finish(), digest(&records));
        prop_assert_eq!(merged.count(), records.len() as u64);
    }

    #[test]
    fn tree_root_is_order_independent(records in records_strategy()) {
        let mut reversed = records.clone();
        reversed.reverse();
        let a = DigestTree::build(&records);
        let b = DigestTree::build(&reversed);
        prop_assert_eq!(a.root_hash(), b.root_hash());
        prop_assert_eq!(a.is_empty(), records.is_empty());
        if !records.is_empty() {
            prop_assert!(a.verify_integrity());
        }
    }

    #[test]
    fn every_leaf_has_a_valid_proof(records in records_strategy()) {
        let tree = DigestTree::build(&records);
        for r in &records {
            let proof = tree.get_proof(&r.path).unwrap();
            prop_assert!(proof.verify_record(r));
        }
    }
}

#[test]
fn empty_record_set_is_the_zero_sentinel() {
    assert_eq!(digest(&Vec::<FileRecord>::new()), RootDigest::EMPTY);
}
