// Modular reductions over Q. Every modular multiplication in the crate goes through
// `mont_reduce`; the remaining functions only correct ranges with shifts and masks.

use crate::Q;

/// Q^{-1} mod 2^32
pub(crate) const QINV: i32 = 58_728_449;

/// 2^64 mod Q, lifts a value into Montgomery form through one `mont_reduce`.
const MONT_R2: i64 = 2_365_951;


/// # Algorithm 49 `MontgomeryReduce(a)`
/// For `|a| < 2^31 * Q` returns `a * 2^{-32} mod Q` in `(-Q, Q)`.
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub(crate) const fn mont_reduce(a: i64) -> i32 {
    let t = (a as i32).wrapping_mul(QINV);
    ((a - (t as i64) * (Q as i64)) >> 32) as i32
}


/// Maps `a <= 2^31 - 2^22 - 1` to a representative in `[-6283008, 6283008]`.
#[inline]
pub(crate) const fn reduce32(a: i32) -> i32 {
    let t = (a + (1 << 22)) >> 23;
    a - t * Q
}


/// Adds Q when `a` is negative.
#[inline]
pub(crate) const fn caddq(a: i32) -> i32 { a + ((a >> 31) & Q) }


/// Canonical representative in `[0, Q)`.
#[inline]
pub(crate) const fn freeze(a: i32) -> i32 { caddq(reduce32(a)) }


/// `a mod± Q` for canonical `a`, in `[-(Q-1)/2, (Q-1)/2]`.
#[inline]
pub(crate) const fn center(a: i32) -> i32 {
    debug_assert!(0 <= a && a < Q);
    a - ((((Q - 1) / 2) - a) >> 31 & Q)
}


/// `a * 2^32 mod Q`, in `(-Q, Q)`.
#[inline]
pub(crate) const fn to_mont(a: i32) -> i32 { mont_reduce(a as i64 * MONT_R2) }


#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_qinv() {
        assert_eq!(Q.wrapping_mul(QINV), 1);
        assert_eq!(MONT_R2, (1i128 << 64).rem_euclid(i128::from(Q)) as i64);
    }

    #[test]
    fn test_mont_round_trip() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(17);
        for _ in 0..10_000 {
            let a = rng.gen_range(-Q + 1..Q);
            let m = to_mont(a);
            assert!(m.abs() < Q);
            assert_eq!(mont_reduce(i64::from(m)).rem_euclid(Q), a.rem_euclid(Q));
        }
    }

    #[test]
    fn test_mont_reduce_products() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(18);
        let r_inv = 8_265_825_i64; // 2^{-32} mod Q
        assert_eq!((r_inv << 32).rem_euclid(i64::from(Q)), 1);
        for _ in 0..10_000 {
            let a = i64::from(rng.gen_range(-Q + 1..Q));
            let b = i64::from(rng.gen_range(-Q + 1..Q));
            let r = mont_reduce(a * b);
            assert!(r.abs() < Q);
            assert_eq!(i64::from(r).rem_euclid(i64::from(Q)), (a * b % i64::from(Q) * r_inv).rem_euclid(i64::from(Q)));
        }
    }

    #[test]
    fn test_freeze_and_center() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(19);
        for a in [0, 1, Q - 1, Q, -Q, 2 * Q + 5, -1, i32::MAX - (1 << 22) - 1] {
            let f = freeze(a);
            assert!((0..Q).contains(&f));
            assert_eq!(f, a.rem_euclid(Q));
        }
        for _ in 0..10_000 {
            let a = rng.gen_range(-(1 << 30)..(1 << 30));
            let f = freeze(a);
            assert_eq!(f, a.rem_euclid(Q));
            let c = center(f);
            assert!(c.abs() <= (Q - 1) / 2);
            assert_eq!(c.rem_euclid(Q), f);
        }
        assert_eq!(center((Q - 1) / 2), (Q - 1) / 2);
        assert_eq!(center((Q + 1) / 2), -(Q - 1) / 2);
    }
}
