//! Deterministic hashing helpers for reproducible "coin flips".
//!
//! This module intentionally does **not** provide cryptographic guarantees; it exists so that
//! pure functions (such as the purely random detector) can behave like a seeded random source
//! without carrying mutable RNG state.

/// Deterministic (non-crypto) stable hash of a `(seed, x)` pair.
///
/// Implementation: SplitMix64 finalizer over `seed ^ x * φ` (golden-ratio spreading of `x`).
#[must_use]
pub fn stable_hash64_u64(seed: u64, x: u64) -> u64 {
    splitmix64(seed ^ x.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Map `(seed, x)` to a uniform-looking value in `[0, 1)`.
#[must_use]
pub fn stable_unit_f64(seed: u64, x: u64) -> f64 {
    // Keep the top 53 bits: exactly representable in an f64 mantissa.
    (stable_hash64_u64(seed, x) >> 11) as f64 / (1u64 << 53) as f64
}

#[inline]
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_inputs_same_hash() {
        assert_eq!(stable_hash64_u64(7, 42), stable_hash64_u64(7, 42));
        assert_ne!(stable_hash64_u64(7, 42), stable_hash64_u64(8, 42));
        assert_ne!(stable_hash64_u64(7, 42), stable_hash64_u64(7, 43));
    }

    #[test]
    fn unit_values_are_in_range_and_roughly_uniform() {
        let n = 20_000u64;
        let mut below_half = 0u64;
        for x in 0..n {
            let u = stable_unit_f64(123, x);
            assert!((0.0..1.0).contains(&u), "u={u}");
            if u < 0.5 {
                below_half += 1;
            }
        }
        let frac = below_half as f64 / n as f64;
        assert!((frac - 0.5).abs() < 0.02, "frac={frac}");
    }
}
