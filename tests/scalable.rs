//! Scalable cuckoo filter behavior through the public API

use amqcraft::builder::ScalableCuckooFilterBuilder;
use amqcraft::{AmqFilter, DeletableFilter, ScalableCuckooFilter};

#[test]
fn test_grows_without_false_negatives() {
    let mut filter = ScalableCuckooFilter::with_capacity(128);

    for i in 0..10_000 {
        assert!(filter.insert(&format!("key-{}", i)));
    }
    assert!(filter.filter_count() > 1);
    assert_eq!(filter.count(), 10_000);

    for i in 0..10_000 {
        assert!(filter.lookup(&format!("key-{}", i)), "false negative for key-{}", i);
    }
}

#[test]
fn test_sub_filters_double() {
    let mut filter = ScalableCuckooFilter::with_capacity(64);
    for i in 0..2_000 {
        filter.insert(&i.to_string());
    }

    let sizes: Vec<usize> = filter.filters().iter().map(|f| f.bucket_count()).collect();
    for pair in sizes.windows(2) {
        assert_eq!(pair[1], pair[0] * 2, "{:?}", sizes);
    }
}

#[test]
fn test_delete_across_chain() {
    let mut filter = ScalableCuckooFilter::with_capacity(32);
    for i in 0..300 {
        filter.insert(&i.to_string());
    }
    assert!(filter.filter_count() > 1);

    for i in 0..300 {
        assert!(filter.delete(&i.to_string()), "delete {} failed", i);
    }
    assert!(filter.is_empty());
    assert!(!filter.lookup("0"));
}

#[test]
fn test_insert_unique_across_chain() {
    let mut filter = ScalableCuckooFilter::with_capacity(16);
    for i in 0..100 {
        filter.insert_unique(&i.to_string());
    }
    let count = filter.count();

    for i in 0..100 {
        assert!(!filter.insert_unique(&i.to_string()));
    }
    assert_eq!(filter.count(), count);
}

#[test]
fn test_trait_objects() {
    let mut filter: Box<dyn DeletableFilter> = Box::new(ScalableCuckooFilter::with_capacity(8));
    for i in 0u32..100 {
        filter.try_insert(&i.to_le_bytes()).unwrap();
    }
    assert_eq!(filter.len(), 100);
    assert!(filter.remove(&7u32.to_le_bytes()));
    assert_eq!(filter.len(), 99);
}

#[test]
fn test_batch_helpers() {
    let mut filter = ScalableCuckooFilter::with_capacity(16);
    let keys: Vec<&[u8]> = vec![&b"a"[..], &b"b"[..], &b"c"[..]];
    filter.try_insert_batch(keys.iter().copied()).unwrap();

    let found = filter.contains_batch(keys.iter().copied());
    assert_eq!(found, vec![true, true, true]);
}

#[cfg(feature = "serde")]
#[test]
fn test_encode_decode_roundtrip() {
    let mut filter = ScalableCuckooFilter::with_capacity(64);
    for i in 0..1_000 {
        filter.insert(&format!("r{}", i));
    }

    let bytes = filter.encode().unwrap();
    let restored = ScalableCuckooFilter::decode(&bytes).unwrap();

    assert_eq!(restored.filter_count(), filter.filter_count());
    assert_eq!(restored.count(), filter.count());
    for i in 0..1_000 {
        assert!(restored.lookup(&format!("r{}", i)));
    }
}

#[cfg(feature = "serde")]
#[test]
fn test_decode_with_builder_options() {
    fn same_size(buckets: usize) -> usize {
        buckets * 4
    }

    let mut filter = ScalableCuckooFilter::with_capacity(16);
    filter.insert("seed");
    let bytes = filter.encode().unwrap();

    let mut restored = ScalableCuckooFilterBuilder::new()
        .scale_factor(same_size)
        .load_factor(0.5)
        .decode(&bytes)
        .unwrap();
    assert!(restored.lookup("seed"));
    assert_eq!(restored.load_factor(), 0.5);

    for i in 0..100 {
        restored.insert(&i.to_string());
    }
    assert!(restored.filters().iter().all(|f| f.bucket_count() == 4));
}
