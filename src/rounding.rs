// This file implements functionality from FIPS 204 section 7.4 Hints; all inputs named `r` are
// canonical, in [0, Q).

use crate::reduce::freeze;
use crate::{D, Q};


/// # Algorithm 35 `Power2Round(r)`
/// Decomposes `r` into `(r1, r0)` such that `r ≡ r1·2^d + r0 mod q` with
/// `r0 ∈ (-2^{d-1}, 2^{d-1}]`.
#[inline]
pub(crate) const fn power2round(r: i32) -> (i32, i32) {
    debug_assert!(0 <= r && r < Q);
    let r1 = (r + (1 << (D - 1)) - 1) >> D;
    (r1, r - (r1 << D))
}


/// # Algorithm 36 `Decompose(r)`
/// Decomposes `r` into `(r1, r0)` such that `r ≡ r1·(2·γ2) + r0 mod q` with
/// `r0 ∈ (-γ2, γ2]`, except at the top of the range where `r1` wraps to 0 and `r0` lands on
/// `-γ2`. Branch-free in `r`; only the public `gamma2` selects the constants.
#[inline]
pub(crate) const fn decompose(gamma2: i32, r: i32) -> (i32, i32) {
    debug_assert!(0 <= r && r < Q);
    let mut r1 = (r + 127) >> 7;
    if gamma2 == (Q - 1) / 32 {
        r1 = (r1 * 1025 + (1 << 21)) >> 22;
        r1 &= 15;
    } else {
        debug_assert!(gamma2 == (Q - 1) / 88);
        r1 = (r1 * 11275 + (1 << 23)) >> 24;
        r1 ^= ((43 - r1) >> 31) & r1;
    }
    let mut r0 = r - r1 * 2 * gamma2;
    r0 -= (((Q - 1) / 2 - r0) >> 31) & Q;
    (r1, r0)
}


/// # Algorithm 37 `HighBits(r)`
#[inline]
pub(crate) const fn high_bits(gamma2: i32, r: i32) -> i32 { decompose(gamma2, r).0 }


/// # Algorithm 38 `LowBits(r)`
#[inline]
pub(crate) const fn low_bits(gamma2: i32, r: i32) -> i32 { decompose(gamma2, r).1 }


/// # Algorithm 39 `MakeHint(z, r)`
/// Returns 1 when adding the small `z` to `r` changes the high bits.
#[inline]
pub(crate) fn make_hint(gamma2: i32, z: i32, r: i32) -> i32 {
    let r1 = high_bits(gamma2, r);
    let v1 = high_bits(gamma2, freeze(r + z));
    i32::from(r1 != v1)
}


/// # Algorithm 40 `UseHint(h, r)`
/// Recovers the high bits of `r + z` from `r` and the hint. Only applied to public data.
#[inline]
pub(crate) fn use_hint(gamma2: i32, h: i32, r: i32) -> i32 {
    // 1: m ← (q − 1)/(2γ2)
    let m = (Q - 1) / (2 * gamma2);

    // 2: (r1, r0) ← Decompose(r)
    let (r1, r0) = decompose(gamma2, r);

    // 3: if h = 1 and r0 > 0 return (r1 + 1) mod m
    // 4: if h = 1 and r0 ≤ 0 return (r1 − 1) mod m
    // 5: return r1
    match (h, r0 > 0) {
        (1, true) => (r1 + 1).rem_euclid(m),
        (1, false) => (r1 - 1).rem_euclid(m),
        _ => r1,
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::reduce::center;
    use rand::{Rng, SeedableRng};

    const GAMMA2_88: i32 = (Q - 1) / 88;
    const GAMMA2_32: i32 = (Q - 1) / 32;

    #[test]
    fn test_power2round() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(35);
        for r in [0, 1, 4095, 4096, 4097, 8191, 8192, Q - 1].into_iter().chain((0..10_000).map(|_| rng.gen_range(0..Q))) {
            let (r1, r0) = power2round(r);
            assert_eq!((r1 << D) + r0, r);
            assert!(-(1 << (D - 1)) < r0 && r0 <= (1 << (D - 1)));
            assert!((0..1024).contains(&r1));
        }
    }

    // Direct transcription of the reference definition using rem_euclid and branches.
    fn decompose_slow(gamma2: i32, r: i32) -> (i32, i32) {
        let mut r0 = r.rem_euclid(2 * gamma2);
        if r0 > gamma2 {
            r0 -= 2 * gamma2;
        }
        if r - r0 == Q - 1 {
            (0, r0 - 1)
        } else {
            ((r - r0) / (2 * gamma2), r0)
        }
    }

    #[test]
    fn test_decompose_matches_definition() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(36);
        for gamma2 in [GAMMA2_88, GAMMA2_32] {
            let edges = [0, 1, gamma2, gamma2 + 1, 2 * gamma2, Q - gamma2 - 1, Q - gamma2, Q - 2, Q - 1];
            for r in edges.into_iter().chain((0..20_000).map(|_| rng.gen_range(0..Q))) {
                assert_eq!(decompose(gamma2, r), decompose_slow(gamma2, r), "r = {r}");
            }
        }
        assert_eq!(decompose(GAMMA2_32, Q - 1), (0, -1));
        assert_eq!(decompose(GAMMA2_88, Q - 1), (0, -1));
    }

    #[test]
    fn test_high_bits_range() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(37);
        for _ in 0..10_000 {
            let r = rng.gen_range(0..Q);
            assert!((0..44).contains(&high_bits(GAMMA2_88, r)));
            assert!((0..16).contains(&high_bits(GAMMA2_32, r)));
            assert!(low_bits(GAMMA2_32, r).abs() <= GAMMA2_32);
        }
    }

    #[test]
    fn test_use_hint_recovers_high_bits() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(39);
        for gamma2 in [GAMMA2_88, GAMMA2_32] {
            for _ in 0..20_000 {
                let r = rng.gen_range(0..Q);
                let z = rng.gen_range(-gamma2..=gamma2);
                let h = make_hint(gamma2, z, r);
                assert_eq!(use_hint(gamma2, h, r), high_bits(gamma2, freeze(r + z)));
            }
        }
        // Zero perturbation never needs a hint.
        assert_eq!(make_hint(GAMMA2_32, 0, 12345), 0);
        assert_eq!(center(freeze(-5)), -5);
    }
}
