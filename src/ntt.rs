// Forward and inverse Number-Theoretic Transform over Z_Q[X]/(X^256 + 1), with twiddle factors
// held in (centered) Montgomery form so every butterfly product is one `mont_reduce`.

use crate::reduce::{freeze, mont_reduce, reduce32};
use crate::types::{NttPoly, Poly};
use crate::{N, Q, ZETA};

/// `256^{-1} * 2^32 mod Q`; one `mont_reduce` against this divides by 256.
const F_INV: i64 = 16_382;


/// # Algorithm 41 `NTT(w)`
/// Cooley-Tukey butterflies over bit-reversed powers of `ZETA`. Input coefficients must satisfy
/// `|w_j| < Q`; the output is reduced into `[-6283008, 6283008]`.
pub(crate) fn ntt(w: &Poly) -> NttPoly {
    // 1: for j from 0 to 255 do  w_hat[j] ← w_j
    let mut w_hat = w.0;

    // 4: m ← 0
    let mut m = 0;

    // 5: len ← 128; 6: while len ≥ 1 do
    let mut len = 128;
    while len >= 1 {
        //
        // 7: start ← 0; 8: while start < 256 do
        let mut start = 0;
        while start < N {
            //
            // 9, 10: m ← m + 1; zeta ← ζ^{brv(m)} mod q
            m += 1;
            let zeta = i64::from(ZETA_TABLE_MONT[m]);

            // 11: for j from start to start + len − 1 do
            for j in start..(start + len) {
                let t = mont_reduce(zeta * i64::from(w_hat[j + len]));
                w_hat[j + len] = w_hat[j] - t;
                w_hat[j] += t;
            }

            // 16: start ← start + 2 · len
            start += 2 * len;
        }

        // 18: len ← ⌊len/2⌋
        len >>= 1;
    }

    NttPoly(w_hat.map(reduce32))
}


/// # Algorithm 42 `NTT^{-1}(w_hat)`
/// Gentleman-Sande butterflies in the complementary order. Accepts any output of the NTT-domain
/// arithmetic (`|w_hat_j| < 2^31 - 2^22`) and returns canonical coefficients in `[0, Q)`.
pub(crate) fn inv_ntt(w_hat: &NttPoly) -> Poly {
    // 1: for j from 0 to 255 do  w_j ← w_hat[j]
    // A leading reduce32 keeps 8 levels of unreduced sums below 2^31.
    let mut w = w_hat.0.map(reduce32);

    // 4: m ← 256
    let mut m = N;

    // 5: len ← 1; 6: while len < 256 do
    let mut len = 1;
    while len < N {
        //
        let mut start = 0;
        while start < N {
            //
            // 9, 10: m ← m − 1; zeta ← −ζ^{brv(m)} mod q
            m -= 1;
            let zeta = -i64::from(ZETA_TABLE_MONT[m]);

            for j in start..(start + len) {
                let t = w[j];
                w[j] = t + w[j + len];
                w[j + len] = mont_reduce(zeta * i64::from(t - w[j + len]));
            }

            start += 2 * len;
        }

        len <<= 1;
    }

    // 21: f ← 8347681 (256^{-1} mod q); 22: w_j ← f · w_j
    Poly(w.map(|x| freeze(mont_reduce(F_INV * i64::from(x)))))
}


/// HAC Algorithm 14.76 Right-to-left binary exponentiation mod Q.
const fn pow_mod_q(g: i32, e: u8) -> i64 {
    let q = Q as i64;
    let mut result = 1;
    let mut s = g as i64;
    let mut e = e;
    while e != 0 {
        if e & 1 != 0 {
            result = (result * s).rem_euclid(q);
        };
        e >>= 1;
        s = (s * s).rem_euclid(q);
    }
    result
}


/// `ζ^{brv(i)} * 2^32 mod± Q`
#[allow(clippy::cast_possible_truncation)]
const fn gen_zeta_table_mont() -> [i32; N] {
    let q = Q as i64;
    let mut result = [0i32; N];
    let mut i = 0;
    while i < N {
        let z = (pow_mod_q(ZETA, (i as u8).reverse_bits()) << 32).rem_euclid(q);
        result[i] = if z > (q - 1) / 2 { (z - q) as i32 } else { z as i32 };
        i += 1;
    }
    result
}

static ZETA_TABLE_MONT: [i32; N] = gen_zeta_table_mont();
