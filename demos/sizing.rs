//! Sizing choices for each filter at a few expected key counts.
//!
//! Run with: cargo run --example sizing

use amqcraft::{CountingFilter, CuckooFilter, QuotientFilter, Result};

fn main() -> Result<()> {
    println!("Filter Sizing\n");

    let workloads = [
        ("Session cache", 1_000, 0.01),
        ("URL dedup", 100_000, 0.001),
        ("Block index", 1_000_000, 0.0001),
    ];

    for (name, keys, fp_rate) in workloads {
        println!("{} ({} keys, target fp {})", name, keys, fp_rate);

        let quotient = QuotientFilter::new_for_capacity(keys, fp_rate)?;
        println!(
            "  quotient: q = {}, r = {}, {} slots, {} bytes",
            quotient.quotient_bits(),
            quotient.remainder_bits(),
            quotient.capacity(),
            quotient.memory_usage()
        );

        let cuckoo = CuckooFilter::new(keys);
        println!(
            "  cuckoo:   {} buckets, {} slots, {:.1}% full at capacity, {} bytes",
            cuckoo.bucket_count(),
            cuckoo.capacity(),
            100.0 * keys as f64 / cuckoo.capacity() as f64,
            cuckoo.memory_usage()
        );

        let counting = CountingFilter::new_for_capacity(keys)?;
        println!(
            "  counting: {} tables x {} buckets, {} entries, {} bytes\n",
            counting.num_tables(),
            counting.num_buckets(),
            counting.capacity(),
            counting.memory_usage()
        );
    }

    Ok(())
}
