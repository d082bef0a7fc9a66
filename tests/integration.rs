use std::collections::HashMap;

use flowhash::{DefaultKeyHasher, ErrorKind, InsertStatus, Table};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn key_for(i: u32) -> [u8; 4] {
    i.to_le_bytes()
}

#[test]
fn basic_insert_lookup_and_iterate() {
    let mut table: Table<DefaultKeyHasher> = Table::create(4, 8, None, 16, 185).unwrap();

    for i in 0..50u32 {
        let (mut handle, status) = table.insert(&key_for(i)).unwrap();
        assert_eq!(status, InsertStatus::Inserted);
        handle.write(&(i as u64).to_le_bytes());
    }

    assert_eq!(table.count_entries(), 50);
    for i in 0..50u32 {
        let value = table.lookup(&key_for(i)).unwrap().unwrap();
        assert_eq!(u64::from_le_bytes(value.as_bytes().try_into().unwrap()), i as u64);
    }
    assert!(table.lookup(&key_for(999)).unwrap().is_none());

    let total: u64 = table.iter().map(|(_, v)| u64::from_le_bytes(v.try_into().unwrap())).sum();
    assert_eq!(total, (0..50u64).sum());
}

#[test]
fn growth_boundary_at_initial_load_limit() {
    // Primary capacity for estimated_count=200 at load_factor=185 is 512
    // (the worked example in the design notes); the load limit is
    // floor(512 * 185 / 256) = 370 entries.
    let mut table: Table<DefaultKeyHasher> = Table::create(4, 8, None, 200, 185).unwrap();
    assert_eq!(table.primary_capacity(), 512);

    for i in 0..370u32 {
        let (mut handle, status) = table.insert(&key_for(i)).unwrap();
        assert_eq!(status, InsertStatus::Inserted);
        handle.write(&[0u8; 8]);
    }
    assert_eq!(table.block_count(), 1, "should not have grown yet");

    let (mut handle, status) = table.insert(&key_for(370)).unwrap();
    assert_eq!(status, InsertStatus::Inserted);
    handle.write(&[0u8; 8]);
    assert!(
        table.block_count() > 1 || table.primary_capacity() > 512,
        "the 371st insert must trigger either an append or a rehash"
    );
}

#[test]
fn duplicate_insert_returns_handle_to_existing_value() {
    let mut table: Table<DefaultKeyHasher> = Table::create(4, 8, None, 1, 185).unwrap();
    let key = key_for(7);

    let (mut handle, status) = table.insert(&key).unwrap();
    assert_eq!(status, InsertStatus::Inserted);
    handle.write(b"original");

    let (handle, status) = table.insert(&key).unwrap();
    assert_eq!(status, InsertStatus::Duplicate);
    assert_eq!(handle.as_bytes(), b"original");
    assert_eq!(table.count_entries(), 1);
}

#[test]
fn sort_then_iterate_yields_ascending_keys() {
    let mut rng = StdRng::seed_from_u64(1234);
    let mut reference: HashMap<u32, u64> = HashMap::new();
    let mut table: Table<DefaultKeyHasher> = Table::create(4, 8, None, 256, 185).unwrap();

    while reference.len() < 300 {
        let key: u32 = rng.gen();
        if reference.contains_key(&key) {
            continue;
        }
        let value: u64 = rng.gen();
        let (mut handle, status) = table.insert(&key.to_be_bytes()).unwrap();
        assert_eq!(status, InsertStatus::Inserted);
        handle.write(&value.to_le_bytes());
        reference.insert(key, value);
    }

    table.sort_by(|a, b| a.cmp(b)).unwrap();

    let collected: Vec<(u32, u64)> = table
        .iter()
        .map(|(k, v)| {
            (
                u32::from_be_bytes(k.try_into().unwrap()),
                u64::from_le_bytes(v.try_into().unwrap()),
            )
        })
        .collect();

    assert_eq!(collected.len(), reference.len());
    for window in collected.windows(2) {
        assert!(window[0].0 <= window[1].0);
    }
    for (key, value) in &collected {
        assert_eq!(reference.get(key), Some(value));
    }
}

#[test]
fn sorted_table_rejects_insert_and_lookup() {
    let mut table: Table<DefaultKeyHasher> = Table::create(4, 8, None, 1, 185).unwrap();
    let (mut handle, _) = table.insert(&key_for(1)).unwrap();
    handle.write(&[0u8; 8]);
    table.sort_by(|a, b| a.cmp(b)).unwrap();

    let err = table.insert(&key_for(2)).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::SortedTable { op: "insert" }));

    let err = table.lookup(&key_for(1)).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::SortedTable { op: "lookup" }));
}

#[test]
fn no_more_blocks_once_growth_is_exhausted() {
    // A rehash_trigger_count of usize::MAX forces the planner to append a
    // secondary block every time rather than ever rehashing, so the table
    // reaches MAX_BLOCKS deterministically.
    let mut table: Table<DefaultKeyHasher> =
        Table::create_with_options(4, 8, None, 1, 185, -3, usize::MAX).unwrap();

    let mut i: u32 = 0;
    loop {
        match table.insert(&key_for(i)) {
            Ok((mut handle, InsertStatus::Inserted)) => handle.write(&[0u8; 8]),
            Ok((_, InsertStatus::Duplicate)) => unreachable!("keys are generated without repeats"),
            Err(err) => {
                assert!(matches!(err.kind(), ErrorKind::NoMoreBlocks));
                break;
            }
        }
        i += 1;
        assert!(i < 5_000_000, "table never refused growth");
    }
    assert_eq!(table.block_count(), flowhash::MAX_BLOCKS);
}
