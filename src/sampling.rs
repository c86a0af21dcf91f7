// This file implements functionality from FIPS 204 section 7.3 Pseudorandom Sampling

use crate::packing::bit_unpack_unchecked;
use crate::polyvec::to_mont_vec;
use crate::types::{MontNttPoly, NttPoly, Poly};
use crate::xof::{self, SHAKE128_RATE, SHAKE256_RATE};
use crate::{helpers, N, Q};


/// # Algorithm 14 `CoefFromThreeBytes(b0, b1, b2)`
/// Generates an element of `{0, 1, 2, ..., q − 1} ∪ {⊥}`.
fn coef_from_three_bytes(bbb: &[u8]) -> Option<i32> {
    // 1: if b2 > 127 then b2 ← b2 − 128
    // 4: z ← 2^16 · b_2 + 2^8 · b1 + b0
    let z = (i32::from(bbb[2] & 0x7F) << 16) | (i32::from(bbb[1]) << 8) | i32::from(bbb[0]);

    // 5: if z < q then return z else return ⊥
    (z < Q).then_some(z)
}


/// # Algorithm 15 `CoefFromHalfByte(b)`
/// Generates an element of `{−η, −η + 1, ..., η} ∪ {⊥}`. Only `η ∈ {2, 4}` is defined; any
/// other value panics.
fn coef_from_half_byte(eta: i32, b: u8) -> Option<i32> {
    debug_assert!(b < 16);
    let b = i32::from(b);
    match eta {
        // 1: if η = 2 and b < 15 then return 2 − (b mod 5)
        2 => (b < 15).then_some(2 - (b % 5)),
        // 3: if η = 4 and b < 9 then return 4 − b
        4 => (b < 9).then_some(4 - b),
        _ => unreachable!("eta must be 2 or 4"),
    }
}


/// # Algorithm 29 `SampleInBall(ρ)`
/// Samples a polynomial `c ∈ R` with exactly `tau` coefficients from `{−1, 1}` and the rest zero.
/// Only the first 8 bytes of output are sign bits; positions are then drawn by rejection.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn sample_in_ball(tau: usize, c_tilde: &[u8]) -> Poly {
    // 1: c ← 0
    let mut c = Poly::ZERO;

    // 2: ctx ← H.Init(); 3: ctx ← H.Absorb(ctx, ρ)
    let mut xof = xof::h256(&[c_tilde]);

    // 4: (ctx, s) ← H.Squeeze(ctx, 8); 5: h ← BytesToBits(s)
    let signs = u64::from_le_bytes(xof.squeeze_array::<8>());

    // 6: for i from 256 − τ to 255 do
    for (k, i) in ((N - tau)..N).enumerate() {
        //
        // 7-10: sample j ← {0..255} by rejection until j ≤ i
        let j = loop {
            let [byte] = xof.squeeze_array::<1>();
            if usize::from(byte) <= i {
                break usize::from(byte);
            }
        };

        // 11: c_i ← c_j
        c.0[i] = c.0[j];

        // 12: c_j ← (−1)^{h[i+τ−256]}
        c.0[j] = 1 - 2 * ((signs >> k) & 1) as i32;
    }

    // 14: return c
    c
}


/// # Algorithm 30 `RejNTTPoly(ρ)`
/// Samples a uniform NTT-domain element from `G(rho || s || r)`, pulling whole SHAKE128 blocks.
pub(crate) fn rej_ntt_poly(rho: &[u8; 32], s: u8, r: u8) -> NttPoly {
    let mut a_hat = [0i32; N];
    let mut xof = xof::h128(&[rho, &[s], &[r]]);
    let mut block = [0u8; SHAKE128_RATE];

    // 1: j ← 0; 4: while j < 256 do
    let mut j = 0;
    while j < N {
        xof.squeeze(&mut block);
        for bbb in block.chunks_exact(3) {
            // 6: a_hat[j] ← CoefFromThreeBytes(s[0], s[1], s[2]); 7: if a_hat[j] ≠ ⊥ then j ← j + 1
            if let Some(coef) = coef_from_three_bytes(bbb) {
                a_hat[j] = coef;
                j += 1;
                if j == N {
                    break;
                }
            }
        }
    }

    NttPoly(a_hat)
}


/// # Algorithm 31 `RejBoundedPoly(ρ)`
/// Samples an element of `R` with coefficients in `[−η, η]` from `H(rho' || IntegerToBytes(r, 2))`.
pub(crate) fn rej_bounded_poly(eta: i32, rho_prime: &[u8; 64], r: u16) -> Poly {
    let mut a = [0i32; N];
    let mut xof = xof::h256(&[rho_prime, &r.to_le_bytes()]);
    let mut block = [0u8; SHAKE256_RATE];

    // 1: j ← 0; 4: while j < 256 do
    let mut j = 0;
    'outer: while j < N {
        xof.squeeze(&mut block);
        for &z in &block {
            // 6, 7: z0 ← CoefFromHalfByte(z mod 16, η); z1 ← CoefFromHalfByte(⌊z/16⌋, η)
            // 8-14: keep z0 then z1 while fewer than 256 are held
            for half in [z & 0x0F, z >> 4] {
                if let Some(coef) = coef_from_half_byte(eta, half) {
                    a[j] = coef;
                    j += 1;
                    if j == N {
                        break 'outer;
                    }
                }
            }
        }
    }

    Poly(a)
}


/// # Algorithm 32 `ExpandA(ρ)`
/// Samples a `k × ℓ` matrix `A_hat` of elements of `T_q`, returned in Montgomery form.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn expand_a<const K: usize, const L: usize>(rho: &[u8; 32]) -> [[MontNttPoly; L]; K] {
    // 1: for r from 0 to k − 1 do; 2: for s from 0 to ℓ − 1 do
    // 3: A_hat[r, s] ← RejNTTPoly(ρ || IntegerToBytes(s, 1) || IntegerToBytes(r, 1))
    core::array::from_fn(|r| to_mont_vec(&core::array::from_fn(|s| rej_ntt_poly(rho, s as u8, r as u8))))
}


/// # Algorithm 33 `ExpandS(ρ)`
/// Samples vectors `s1 ∈ R^ℓ` and `s2 ∈ R^k`, each with coefficients in `[−η, η]`.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn expand_s<const K: usize, const L: usize>(eta: i32, rho_prime: &[u8; 64]) -> ([Poly; L], [Poly; K]) {
    // 1: for r from 0 to ℓ − 1 do  s1[r] ← RejBoundedPoly(ρ || IntegerToBytes(r, 2))
    let s1 = core::array::from_fn(|r| rej_bounded_poly(eta, rho_prime, r as u16));

    // 4: for r from 0 to k − 1 do  s2[r] ← RejBoundedPoly(ρ || IntegerToBytes(r + ℓ, 2))
    let s2 = core::array::from_fn(|r| rej_bounded_poly(eta, rho_prime, (r + L) as u16));

    (s1, s2)
}


/// # Algorithm 34 `ExpandMask(ρ, µ)`
/// Samples `y ∈ R^ℓ` with coefficients in `(−γ1, γ1]` for mask counter `kappa`.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn expand_mask<const L: usize>(gamma1: i32, rho_pp: &[u8; 64], kappa: u16) -> [Poly; L] {
    // 1: c ← 1 + bitlen(γ1 − 1)
    let c = 1 + helpers::bit_length(gamma1 - 1);
    let mut v = [0u8; 32 * 20];

    // 2: for r from 0 to ℓ − 1 do
    core::array::from_fn(|r| {
        // 3: n ← IntegerToBytes(κ + r, 2)
        let n = kappa + r as u16;

        // 4: v ← H(ρ″ || IntegerToBytes(κ + r, 2), 32c)
        xof::h256(&[rho_pp, &n.to_le_bytes()]).squeeze(&mut v[..32 * c]);

        // 5: y[r] ← BitUnpack(v, γ1 − 1, γ1)
        bit_unpack_unchecked(&v[..32 * c], gamma1 - 1, gamma1)
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::polyvec::infinity_norm;
    use rand::{RngCore, SeedableRng};

    #[test]
    fn test_coef_from_three_bytes() {
        assert_eq!(coef_from_three_bytes(&[0x12, 0x34, 0x56]), Some(0x0056_3412));
        assert_eq!(coef_from_three_bytes(&[0x12, 0x34, 0xD6]), Some(0x0056_3412));
        assert_eq!(coef_from_three_bytes(&[0x00, 0xE0, 0x7F]), Some(Q - 1));
        assert_eq!(coef_from_three_bytes(&[0x01, 0xE0, 0x7F]), None);
        assert_eq!(coef_from_three_bytes(&[0xFF, 0xFF, 0xFF]), None);
    }

    #[test]
    fn test_coef_from_half_byte() {
        assert_eq!(coef_from_half_byte(2, 0), Some(2));
        assert_eq!(coef_from_half_byte(2, 4), Some(-2));
        assert_eq!(coef_from_half_byte(2, 14), Some(-2));
        assert_eq!(coef_from_half_byte(2, 15), None);
        assert_eq!(coef_from_half_byte(4, 8), Some(-4));
        assert_eq!(coef_from_half_byte(4, 9), None);
    }

    #[test]
    #[should_panic(expected = "eta must be 2 or 4")]
    fn test_coef_from_half_byte_rejects_unknown_eta() { let _ = coef_from_half_byte(3, 0); }

    #[test]
    fn test_sample_in_ball() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(29);
        for tau in [39, 49, 60] {
            for _ in 0..32 {
                let mut c_tilde = [0u8; 48];
                rng.fill_bytes(&mut c_tilde);
                let c = sample_in_ball(tau, &c_tilde);
                assert_eq!(c.0.iter().filter(|&&x| x != 0).count(), tau);
                assert!(c.0.iter().all(|&x| (-1..=1).contains(&x)));
                assert_eq!(c, sample_in_ball(tau, &c_tilde));
            }
        }
    }

    #[test]
    fn test_expansions_in_range() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(31);
        let mut rho = [0u8; 32];
        rng.fill_bytes(&mut rho);
        let mut rho_prime = [0u8; 64];
        rng.fill_bytes(&mut rho_prime);

        let a_hat = expand_a::<4, 4>(&rho);
        assert!(a_hat.iter().flatten().all(|p| p.0.iter().all(|x| x.abs() < Q)));
        assert_ne!(a_hat[0][1], a_hat[1][0]);
        assert_eq!(rej_ntt_poly(&rho, 1, 0).to_mont(), a_hat[0][1]);
        assert!(rej_ntt_poly(&rho, 2, 3).0.iter().all(|x| (0..Q).contains(x)));

        for eta in [2, 4] {
            let (s1, s2) = expand_s::<6, 5>(eta, &rho_prime);
            assert!(infinity_norm(&s1) <= eta);
            assert!(infinity_norm(&s2) <= eta);
            assert_eq!(s2[0], rej_bounded_poly(eta, &rho_prime, 5));
        }

        for gamma1 in [1 << 17, 1 << 19] {
            let y = expand_mask::<7>(gamma1, &rho_prime, 700);
            assert!(y.iter().all(|p| p.0.iter().all(|&x| -gamma1 < x && x <= gamma1)));
            assert_eq!(y[1], expand_mask::<1>(gamma1, &rho_prime, 701)[0]);
        }
    }
}
