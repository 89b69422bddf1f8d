//! d-left counting filter behavior through the public API

use amqcraft::builder::CountingFilterBuilder;
use amqcraft::{AmqCraftError, AmqFilter, CountingFilter};

#[test]
fn test_add_delete_cycle() {
    let mut filter = CountingFilter::new_for_capacity(1_000_000).unwrap();
    assert_eq!(filter.num_tables(), 30);

    for i in 1001..2000 {
        assert!(filter.add(&i.to_string()), "add {} rejected", i);
    }
    assert_eq!(filter.get_count(), 999);
    for i in 1001..2000 {
        assert!(filter.is_member(&i.to_string()));
    }

    for i in 1001..2000 {
        assert!(filter.delete(&i.to_string()), "delete {} failed", i);
    }
    assert_eq!(filter.get_count(), 0);
    for i in 1001..2000 {
        assert!(!filter.is_member(&i.to_string()), "{} still a member", i);
    }
}

#[test]
fn test_no_false_negatives_10k() {
    let mut filter = CountingFilter::new(3, 4096).unwrap();

    for i in 0..10_000 {
        assert!(filter.add(&format!("key-{}", i)), "add key-{} rejected", i);
    }
    for i in 0..10_000 {
        assert!(filter.is_member(&format!("key-{}", i)));
    }
    assert_eq!(filter.len(), 10_000);
}

#[test]
fn test_false_positives_are_rare() {
    let mut filter = CountingFilter::new(3, 4096).unwrap();
    for i in 0..10_000 {
        filter.add(&format!("key-{}", i));
    }

    let hits = (0..10_000)
        .filter(|i| filter.is_member(&format!("other-{}", i)))
        .count();
    // Each query compares against at most 24 fingerprints of 16 bits
    assert!(hits <= 20, "{} false positives", hits);
}

#[test]
fn test_duplicate_add_is_rejected() {
    let mut filter = CountingFilterBuilder::new().dimensions(2, 16).build().unwrap();

    assert!(filter.add("dup"));
    assert!(!filter.add("dup"));
    assert_eq!(filter.get_count(), 1);

    // Through the trait a duplicate is not an error
    assert!(filter.try_insert(b"dup").is_ok());
    assert_eq!(filter.get_count(), 1);
}

#[test]
fn test_bucket_overflow() {
    // One bucket of eight entries
    let mut filter = CountingFilter::new(1, 1).unwrap();
    let accepted = (0..20)
        .filter(|i| filter.add(&format!("k{}", i)))
        .count();

    assert_eq!(accepted, 8);
    assert_eq!(filter.get_count(), 8);
    assert_eq!(filter.load_factor(), 1.0);
    assert!(matches!(
        filter.try_insert(b"one more"),
        Err(AmqCraftError::Full { capacity: 8 })
    ));
}

#[test]
fn test_delete_absent_key() {
    let mut filter = CountingFilter::new(2, 64).unwrap();
    filter.add("present");

    assert!(!filter.delete("absent"));
    assert_eq!(filter.get_count(), 1);
}

#[test]
fn test_clear_and_reuse() {
    let mut filter = CountingFilter::new(4, 256).unwrap();
    for i in 0..500 {
        filter.add(&i.to_string());
    }
    filter.clear();

    assert!(filter.is_empty());
    assert!(filter.add("0"));
}
