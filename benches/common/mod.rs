//! Shared data generators and constants for all benchmarks
//!
//! Every benchmark draws keys from these helpers so that filters are compared on the
//! same inputs.
#![allow(dead_code)]

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use std::collections::HashSet;

// DATA GENERATORS

/// Generate random alphanumeric string of specified length
#[inline]
pub fn random_string(len: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Generate batch of random strings with specified length
pub fn generate_strings(count: usize, len: usize) -> Vec<String> {
    (0..count).map(|_| random_string(len)).collect()
}

/// Generate sequential strings: "item_00000000", "item_00000001", ...
///
/// Sequential keys share long prefixes, which stresses hash quality.
pub fn generate_sequential_strings(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("item_{:08}", i)).collect()
}

/// Generate random u64 keys
pub fn generate_u64s(count: usize) -> Vec<u64> {
    let mut rng = thread_rng();
    (0..count).map(|_| rng.gen()).collect()
}

/// Two disjoint sets of random strings: one to insert, one to query as misses.
pub fn create_disjoint_sets(count: usize, len: usize) -> (Vec<String>, Vec<String>) {
    let mut seen = HashSet::with_capacity(count * 2);
    let mut draw = || loop {
        let s = random_string(len);
        if seen.insert(s.clone()) {
            return s;
        }
    };

    let inserted = (0..count).map(|_| draw()).collect();
    let absent = (0..count).map(|_| draw()).collect();
    (inserted, absent)
}

// CONSTANTS

/// Filter sizes (expected keys)
pub const SIZES: &[usize] = &[1_000, 10_000, 100_000];

/// Quotient filter target false positive rates
pub const FP_RATES: &[f64] = &[0.1, 0.01, 0.001];

/// Fill levels in percent of capacity
pub const LOAD_FACTORS: &[usize] = &[25, 50, 75, 90];

/// Empirical false positive rate of a batch of miss queries.
pub fn measure_fpr(results: &[bool]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    results.iter().filter(|hit| **hit).count() as f64 / results.len() as f64
}
