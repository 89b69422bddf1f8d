//! WyHash for filter keys.
//!
//! A public-domain multiply-xor hash by Wang Yi. It is faster than FNV-1a on keys
//! longer than a few bytes and has better avalanche, at the cost of a slightly more
//! involved implementation. Enabled by the `wyhash` feature (on by default).
//!
//! ```
//! use amqcraft::hash::{FilterHasher, WyHasher};
//!
//! let h1 = WyHasher::with_seed(0).hash_bytes(b"test");
//! let h2 = WyHasher::with_seed(1).hash_bytes(b"test");
//! assert_ne!(h1, h2);
//! ```

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::unreadable_literal)]

use super::hasher::FilterHasher;

const SECRET: [u64; 4] = [
    0xa076_1d64_78bd_642f,
    0xe703_7ed1_a0b4_28db,
    0x8ebc_6af0_9c88_c6e3,
    0x5899_65cc_7537_4cc3,
];

/// WyHash hasher with a 64-bit seed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WyHasher {
    seed: u64,
}

impl WyHasher {
    /// Create a hasher with seed `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self { seed: 0 }
    }

    /// Create a hasher with an explicit seed.
    #[must_use]
    pub const fn with_seed(seed: u64) -> Self {
        Self { seed }
    }
}

impl FilterHasher for WyHasher {
    #[inline]
    fn hash_bytes(&self, bytes: &[u8]) -> u64 {
        wyhash(bytes, self.seed)
    }

    #[inline]
    fn name(&self) -> &'static str {
        "WyHash"
    }
}

/// Hash `bytes` with `seed`.
///
/// Inputs up to 16 bytes take a single mix. Longer inputs are folded 16 bytes at a
/// time, with the final (possibly overlapping) 16 bytes mixed last, then the length
/// is mixed in.
fn wyhash(bytes: &[u8], seed: u64) -> u64 {
    let len = bytes.len();

    match len {
        0 => wymix(SECRET[0], SECRET[1] ^ seed),
        1..=3 => {
            let x = (u64::from(bytes[0]) << 16)
                | (u64::from(bytes[len / 2]) << 8)
                | u64::from(bytes[len - 1])
                | ((len as u64) << 24);
            wymix(x ^ SECRET[0], seed ^ SECRET[1])
        }
        4..=7 => {
            let a = u64::from(read_u32(bytes, 0));
            let b = u64::from(read_u32(bytes, len - 4));
            wymix(((a << 32) | b) ^ SECRET[0] ^ len as u64, seed ^ SECRET[1])
        }
        8..=16 => {
            let a = read_u64(bytes, 0);
            let b = read_u64(bytes, len - 8);
            wymix(a ^ SECRET[0] ^ len as u64, b ^ seed ^ SECRET[1])
        }
        _ => {
            let mut state = seed;
            let mut offset = 0;
            let mut lane = 0;
            while len - offset > 16 {
                state = wymix(
                    read_u64(bytes, offset) ^ SECRET[lane],
                    read_u64(bytes, offset + 8) ^ state,
                );
                offset += 16;
                lane = (lane + 1) % 3;
            }
            state = wymix(
                read_u64(bytes, len - 16) ^ SECRET[3],
                read_u64(bytes, len - 8) ^ state,
            );
            wymix(state ^ len as u64, SECRET[1])
        }
    }
}

/// Multiply as 128 bits and fold the halves together.
#[inline(always)]
fn wymix(a: u64, b: u64) -> u64 {
    let r = u128::from(a).wrapping_mul(u128::from(b));
    ((r >> 64) as u64) ^ (r as u64)
}

#[inline(always)]
fn read_u64(bytes: &[u8], at: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(buf)
}

#[inline(always)]
fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(buf)
}
