//! Tests for Engine
//!
//! These tests verify:
//! - Basic put/get/update/delete operations
//! - Recid reuse (LIFO) and span reuse
//! - Index entry sizes after put and update
//! - Error paths (not found, reserved recids, oversized, closed)
//! - Concurrent access patterns

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use recstore::layout::{FIRST_USER_RECID, MAX_RECORD_SIZE, OFFSET_MASK};
use recstore::{
    BincodeCodec, BytesCodec, Config, Engine, I32Codec, I64Codec, StoreError, StringCodec,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_engine() -> Engine {
    let config = Config::builder().ephemeral().page_size(4096).build();
    Engine::open(config).unwrap()
}

fn live_count(engine: &Engine) -> usize {
    engine.live_recids().unwrap().len()
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_engine_put_get() {
    let engine = setup_engine();

    let recid = engine.put(&10000i64, &I64Codec).unwrap();

    assert_eq!(engine.get(recid, &I64Codec).unwrap(), 10000);
}

#[test]
fn test_engine_first_recid() {
    let engine = setup_engine();

    let recid = engine.put(&1000i64, &I64Codec).unwrap();

    assert_eq!(recid, FIRST_USER_RECID);
}

#[test]
fn test_engine_multiple_records() {
    let engine = setup_engine();

    let a = engine.put(&"alpha".to_string(), &StringCodec).unwrap();
    let b = engine.put(&"beta".to_string(), &StringCodec).unwrap();
    let c = engine.put(&vec![1u8, 2, 3], &BytesCodec).unwrap();

    assert_eq!(engine.get(a, &StringCodec).unwrap(), "alpha");
    assert_eq!(engine.get(b, &StringCodec).unwrap(), "beta");
    assert_eq!(engine.get(c, &BytesCodec).unwrap(), vec![1, 2, 3]);
}

#[test]
fn test_engine_in_memory_many() {
    let engine = Engine::ephemeral().unwrap();
    let codec = BincodeCodec::<i32>::new();
    let mut recids = HashMap::new();

    for i in 0..1000i32 {
        let recid = engine.put(&i, &codec).unwrap();
        recids.insert(recid, i);
    }

    for (recid, value) in &recids {
        assert_eq!(engine.get(*recid, &codec).unwrap(), *value);
    }
}

#[test]
fn test_engine_payload_spans_pages() {
    let config = Config::builder().page_size(1024).build();
    let engine = Engine::open(config).unwrap();
    let data: Vec<u8> = (0..3000u32).map(|i| (i % 251) as u8).collect();

    let recid = engine.put(&data, &BytesCodec).unwrap();

    assert_eq!(engine.get(recid, &BytesCodec).unwrap(), data);
}

#[test]
fn test_engine_max_size_record() {
    let engine = setup_engine();
    let data = vec![0xABu8; MAX_RECORD_SIZE];

    let recid = engine.put(&data, &BytesCodec).unwrap();

    assert_eq!(engine.get(recid, &BytesCodec).unwrap(), data);
    assert_eq!(engine.index_word(recid).unwrap() >> 48, MAX_RECORD_SIZE as u64);
}

#[test]
fn test_engine_empty_payload() {
    let engine = setup_engine();

    let recid = engine.put(&String::new(), &StringCodec).unwrap();

    assert_ne!(engine.index_word(recid).unwrap(), 0);
    assert_eq!(engine.get(recid, &StringCodec).unwrap(), "");

    engine.delete(recid).unwrap();
    assert!(!engine.contains(recid).unwrap());
}

// =============================================================================
// Delete and Reuse Tests
// =============================================================================

#[test]
fn test_engine_delete_decrements_live_count() {
    let engine = setup_engine();

    let recid = engine.put(&1000i64, &I64Codec).unwrap();
    engine.commit().unwrap();
    assert_eq!(live_count(&engine), 1);

    engine.delete(recid).unwrap();
    engine.commit().unwrap();
    assert_eq!(live_count(&engine), 0);
}

#[test]
fn test_engine_delete_and_reuse_recid() {
    let engine = setup_engine();

    let recid = engine.put(&1000i64, &I64Codec).unwrap();
    engine.delete(recid).unwrap();
    assert_eq!(live_count(&engine), 0);

    let recid2 = engine.put(&1000i64, &I64Codec).unwrap();

    assert_eq!(recid, recid2);
    assert_eq!(live_count(&engine), 1);
    assert_ne!(engine.index_word(recid).unwrap(), 0);
}

#[test]
fn test_engine_recid_reuse_is_lifo() {
    let engine = setup_engine();

    let mut recids: Vec<u64> = (0..10)
        .map(|_| engine.put(&0i64, &I64Codec).unwrap())
        .collect();

    for recid in &recids {
        engine.delete(*recid).unwrap();
    }

    let recids2: Vec<u64> = (0..10)
        .map(|_| engine.put(&0i64, &I64Codec).unwrap())
        .collect();

    // Free recids come back newest first
    recids.reverse();
    assert_eq!(recids, recids2);
}

#[test]
fn test_engine_span_reused() {
    let engine = setup_engine();

    let recid = engine.put(&1i64, &I64Codec).unwrap();
    let word = engine.index_word(recid).unwrap();
    engine.delete(recid).unwrap();

    let recid2 = engine.put(&1i64, &I64Codec).unwrap();

    assert_eq!(recid, recid2);
    assert_eq!(engine.index_word(recid).unwrap(), word);
}

#[test]
fn test_engine_delete_zeroes_entry_once() {
    let engine = setup_engine();
    let recid = engine.put(&5i64, &I64Codec).unwrap();

    engine.delete(recid).unwrap();

    assert_eq!(engine.index_word(recid).unwrap(), 0);
    assert!(matches!(
        engine.delete(recid),
        Err(StoreError::RecordNotFound(r)) if r == recid
    ));
    assert_eq!(engine.stats().unwrap().free_recids, 1);
}

// =============================================================================
// Update Tests
// =============================================================================

#[test]
fn test_engine_index_stores_record_size() {
    let engine = setup_engine();

    let recid = engine.put(&1i32, &I32Codec).unwrap();
    engine.commit().unwrap();
    assert_eq!(engine.index_word(recid).unwrap() >> 48, 4);
    assert_eq!(engine.get(recid, &I32Codec).unwrap(), 1);

    engine.update(recid, &1i64, &I64Codec).unwrap();
    engine.commit().unwrap();
    assert_eq!(engine.index_word(recid).unwrap() >> 48, 8);
    assert_eq!(engine.get(recid, &I64Codec).unwrap(), 1);
}

#[test]
fn test_engine_update_same_size_in_place() {
    let engine = setup_engine();
    let recid = engine.put(&"aaaa".to_string(), &StringCodec).unwrap();
    let word = engine.index_word(recid).unwrap();

    engine.update(recid, &"bbbb".to_string(), &StringCodec).unwrap();

    assert_eq!(engine.index_word(recid).unwrap(), word);
    assert_eq!(engine.get(recid, &StringCodec).unwrap(), "bbbb");
}

#[test]
fn test_engine_update_resize_moves_record() {
    let engine = setup_engine();
    let recid = engine.put(&"short".to_string(), &StringCodec).unwrap();
    let neighbour = engine.put(&"neighbour".to_string(), &StringCodec).unwrap();
    let old_offset = engine.index_word(recid).unwrap() & OFFSET_MASK;

    let longer = "a considerably longer value".to_string();
    engine.update(recid, &longer, &StringCodec).unwrap();

    let word = engine.index_word(recid).unwrap();
    assert_eq!(word >> 48, longer.len() as u64);
    assert_ne!(word & OFFSET_MASK, old_offset);
    assert_eq!(engine.get(recid, &StringCodec).unwrap(), longer);
    assert_eq!(engine.get(neighbour, &StringCodec).unwrap(), "neighbour");

    // The old 5-byte span is free again
    let reuse = engine.put(&"fiver".to_string(), &StringCodec).unwrap();
    assert_eq!(engine.index_word(reuse).unwrap() & OFFSET_MASK, old_offset);
}

#[test]
fn test_engine_update_to_and_from_empty() {
    let engine = setup_engine();
    let recid = engine.put(&"abc".to_string(), &StringCodec).unwrap();

    engine.update(recid, &String::new(), &StringCodec).unwrap();
    assert_eq!(engine.get(recid, &StringCodec).unwrap(), "");
    assert_eq!(engine.index_word(recid).unwrap() >> 48, 0);

    engine.update(recid, &"xyz!".to_string(), &StringCodec).unwrap();
    assert_eq!(engine.get(recid, &StringCodec).unwrap(), "xyz!");
}

// =============================================================================
// Error Path Tests
// =============================================================================

#[test]
fn test_engine_get_deleted_record() {
    let engine = setup_engine();
    let recid = engine.put(&7i64, &I64Codec).unwrap();
    engine.delete(recid).unwrap();

    let result = engine.get(recid, &I64Codec);

    assert!(matches!(result, Err(StoreError::RecordNotFound(r)) if r == recid));
}

#[test]
fn test_engine_get_unknown_recid() {
    let engine = setup_engine();

    assert!(matches!(
        engine.get(FIRST_USER_RECID + 100, &I64Codec),
        Err(StoreError::RecordNotFound(_))
    ));
    assert!(matches!(
        engine.update(FIRST_USER_RECID, &1i64, &I64Codec),
        Err(StoreError::RecordNotFound(_))
    ));
}

#[test]
fn test_engine_reserved_recid_rejected() {
    let engine = setup_engine();

    assert!(matches!(
        engine.get(0, &I64Codec),
        Err(StoreError::InvalidArgument(_))
    ));
    assert!(matches!(
        engine.delete(FIRST_USER_RECID - 1),
        Err(StoreError::InvalidArgument(_))
    ));
}

#[test]
fn test_engine_record_too_large() {
    let engine = setup_engine();
    let before = engine.stats().unwrap();

    let result = engine.put(&vec![0u8; MAX_RECORD_SIZE + 1], &BytesCodec);

    assert!(matches!(
        result,
        Err(StoreError::RecordTooLarge { size, max }) if size == MAX_RECORD_SIZE + 1 && max == MAX_RECORD_SIZE
    ));
    assert_eq!(engine.stats().unwrap(), before);
}

#[test]
fn test_engine_update_too_large_keeps_old_value() {
    let engine = setup_engine();
    let recid = engine.put(&vec![1u8; 10], &BytesCodec).unwrap();

    let result = engine.update(recid, &vec![0u8; MAX_RECORD_SIZE + 1], &BytesCodec);

    assert!(matches!(result, Err(StoreError::RecordTooLarge { .. })));
    assert_eq!(engine.get(recid, &BytesCodec).unwrap(), vec![1u8; 10]);
}

#[test]
fn test_engine_decode_mismatch() {
    let engine = setup_engine();
    let recid = engine.put(&1i32, &I32Codec).unwrap();

    assert!(matches!(
        engine.get(recid, &I64Codec),
        Err(StoreError::Codec(_))
    ));
}

#[test]
fn test_engine_invalid_page_size() {
    let too_small = Config::builder().page_size(512).build();
    let unaligned = Config::builder().page_size(4100).build();

    assert!(matches!(Engine::open(too_small), Err(StoreError::Config(_))));
    assert!(matches!(Engine::open(unaligned), Err(StoreError::Config(_))));
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_engine_closed_rejects_operations() {
    let engine = setup_engine();
    let recid = engine.put(&1i64, &I64Codec).unwrap();

    engine.close().unwrap();

    assert!(engine.is_closed());
    assert!(matches!(engine.get(recid, &I64Codec), Err(StoreError::Closed)));
    assert!(matches!(engine.put(&2i64, &I64Codec), Err(StoreError::Closed)));
    assert!(matches!(engine.update(recid, &3i64, &I64Codec), Err(StoreError::Closed)));
    assert!(matches!(engine.delete(recid), Err(StoreError::Closed)));
    assert!(matches!(engine.commit(), Err(StoreError::Closed)));
    assert!(matches!(engine.stats(), Err(StoreError::Closed)));
    assert!(matches!(engine.close(), Err(StoreError::Closed)));
}

#[test]
fn test_engine_stats() {
    let engine = setup_engine();

    let a = engine.put(&1i64, &I64Codec).unwrap();
    engine.put(&2i64, &I64Codec).unwrap();
    engine.put(&3i64, &I64Codec).unwrap();
    engine.delete(a).unwrap();

    let stats = engine.stats().unwrap();
    assert_eq!(stats.index_slots, FIRST_USER_RECID + 3);
    assert_eq!(stats.live_records, 2);
    assert_eq!(stats.free_recids, 1);
    assert!(stats.data_end > 8 + 3 * 8);
}

// =============================================================================
// Mixed Workload Tests
// =============================================================================

#[test]
fn test_engine_random_put_update_delete() {
    let engine = setup_engine();
    let mut model: HashMap<u64, Vec<u8>> = HashMap::new();
    let mut seed = 0x2545_F491_4F6C_DD1Du64;

    let mut next = move || {
        // xorshift64
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        seed
    };

    for _ in 0..3000 {
        let roll = next() % 10;
        let len = (next() % 3000) as usize;
        let byte = next() as u8;

        if roll < 5 || model.is_empty() {
            let value = vec![byte; len];
            let recid = engine.put(&value, &BytesCodec).unwrap();
            assert!(model.insert(recid, value).is_none(), "recid {} handed out twice", recid);
        } else {
            let keys: Vec<u64> = model.keys().copied().collect();
            let recid = keys[(next() % keys.len() as u64) as usize];
            if roll < 8 {
                let value = vec![byte; len];
                engine.update(recid, &value, &BytesCodec).unwrap();
                model.insert(recid, value);
            } else {
                engine.delete(recid).unwrap();
                model.remove(&recid);
            }
        }
    }

    assert_eq!(live_count(&engine), model.len());
    for (recid, value) in &model {
        assert_eq!(&engine.get(*recid, &BytesCodec).unwrap(), value);
    }
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_engine_concurrent_readers_and_writer() {
    let engine = Arc::new(setup_engine());

    let seeded: Vec<(u64, i64)> = (0..100i64)
        .map(|i| (engine.put(&i, &I64Codec).unwrap(), i))
        .collect();
    let seeded = Arc::new(seeded);

    let writer = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || {
            for i in 0..500i64 {
                engine.put(&(i * 2), &I64Codec).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let seeded = Arc::clone(&seeded);
            thread::spawn(move || {
                for _ in 0..5 {
                    for (recid, value) in seeded.iter() {
                        assert_eq!(engine.get(*recid, &I64Codec).unwrap(), *value);
                    }
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(live_count(&engine), 600);
}
