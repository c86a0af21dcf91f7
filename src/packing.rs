// This file implements functionality from FIPS 204 sections 7.1 Conversion Between Data Types
// and 7.2 Encodings of ML-DSA Keys and Signatures.
//
// Packed fields always hold non-negative values: `SimpleBitPack` stores the coefficient itself
// (callers hand it canonical values) and `BitPack` stores the offset `b - w` of a centered one.

use crate::error::Error;
use crate::helpers::{bit_length, ensure};
use crate::types::Poly;
use crate::{D, N};

/// `t1` coefficients occupy `bitlen(q − 1) − d = 10` bits.
const T1_MAX: i32 = (1 << (23 - D)) - 1;
const T1_LEN: usize = 32 * 10;
const T0_LEN: usize = 32 * D as usize;


/// Little-endian bit packing of 256 values of `bits` bits each.
#[allow(clippy::cast_possible_truncation)]
fn pack_bits(w: &[i32; N], bits: usize, out: &mut [u8], map: impl Fn(i32) -> u32) {
    debug_assert_eq!(out.len(), 32 * bits);
    let (mut acc, mut acc_bits, mut index) = (0u64, 0, 0);
    for &coef in w {
        acc |= u64::from(map(coef)) << acc_bits;
        acc_bits += bits;
        while acc_bits >= 8 {
            out[index] = acc as u8;
            index += 1;
            acc >>= 8;
            acc_bits -= 8;
        }
    }
    debug_assert_eq!(acc_bits, 0);
}


#[allow(clippy::cast_possible_truncation)]
fn unpack_bits(v: &[u8], bits: usize) -> [u32; N] {
    debug_assert_eq!(v.len(), 32 * bits);
    let mask = (1u64 << bits) - 1;
    let (mut acc, mut acc_bits, mut index) = (0u64, 0, 0);
    core::array::from_fn(|_| {
        while acc_bits < bits {
            acc |= u64::from(v[index]) << acc_bits;
            index += 1;
            acc_bits += 8;
        }
        let x = (acc & mask) as u32;
        acc >>= bits;
        acc_bits -= bits;
        x
    })
}


/// # Algorithm 16 `SimpleBitPack(w, b)`
/// Encodes a polynomial with coefficients in `[0, b]` into `32 · bitlen(b)` bytes.
#[allow(clippy::cast_sign_loss)]
pub(crate) fn simple_bit_pack(w: &Poly, b: i32, out: &mut [u8]) {
    debug_assert!(w.0.iter().all(|x| (0..=b).contains(x)));
    pack_bits(&w.0, bit_length(b), out, |x| x as u32);
}


/// # Algorithm 17 `BitPack(w, a, b)`
/// Encodes a polynomial with coefficients in `[−a, b]` into `32 · bitlen(a + b)` bytes.
#[allow(clippy::cast_sign_loss)]
pub(crate) fn bit_pack(w: &Poly, a: i32, b: i32, out: &mut [u8]) {
    debug_assert!(w.0.iter().all(|x| (-a..=b).contains(x)));
    pack_bits(&w.0, bit_length(a + b), out, |x| (b - x) as u32);
}


/// # Algorithm 18 `SimpleBitUnpack(v, b)`
/// Every `bitlen(b)`-bit value is accepted; callers only use this where `b + 1` is a power of two.
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn simple_bit_unpack(v: &[u8], b: i32) -> Poly {
    Poly(unpack_bits(v, bit_length(b)).map(|x| x as i32))
}


/// # Algorithm 19 `BitUnpack(v, a, b)`
/// Returns `None` when a packed value falls outside `[0, a + b]`. All values are inspected
/// before deciding, the check does not exit early.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub(crate) fn bit_unpack(v: &[u8], a: i32, b: i32) -> Option<Poly> {
    let raw = unpack_bits(v, bit_length(a + b));
    let limit = (a + b) as u32;
    let invalid = raw.iter().fold(0u32, |acc, &x| acc | (limit.wrapping_sub(x) >> 31));
    (invalid == 0).then(|| Poly(raw.map(|x| b - x as i32)))
}


/// `BitUnpack` for fields where `a + b + 1` is a power of two, so every packed value is valid.
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn bit_unpack_unchecked(v: &[u8], a: i32, b: i32) -> Poly {
    debug_assert!((a + b + 1).count_ones() == 1);
    Poly(unpack_bits(v, bit_length(a + b)).map(|x| b - x as i32))
}


/// # Algorithm 20 `HintBitPack(h)`
/// Encodes a hint vector with at most `omega` ones into `omega + K` bytes: positions of the ones
/// row by row, then the running count at the end of each row.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn hint_bit_pack<const K: usize>(omega: usize, h: &[Poly; K], y: &mut [u8]) {
    debug_assert_eq!(y.len(), omega + K);

    // 1: y ∈ B^{ω+k} ← 0^{ω+k}
    y.fill(0);

    // 2: index ← 0
    let mut index = 0;

    // 3: for i from 0 to k − 1 do
    for (i, row) in h.iter().enumerate() {
        //
        // 4: for j from 0 to 255 do; 5: if h[i]_j ≠ 0 then
        for (j, _) in row.0.iter().enumerate().filter(|(_, &x)| x != 0) {
            // 6: y[index] ← j; 7: index ← index + 1
            y[index] = j as u8;
            index += 1;
        }

        // 10: y[ω + i] ← index
        y[omega + i] = index as u8;
    }
}


/// # Algorithm 21 `HintBitUnpack(y)`
/// Rejects encodings with non-monotone row counts, counts beyond `omega`, positions that do not
/// strictly increase within a row, or non-zero padding.
pub(crate) fn hint_bit_unpack<const K: usize>(omega: usize, y: &[u8]) -> Option<[Poly; K]> {
    debug_assert_eq!(y.len(), omega + K);

    // 1: h ∈ R_2^k ← 0^k
    let mut h = [Poly::ZERO; K];

    // 2: index ← 0
    let mut index = 0;

    // 3: for i from 0 to k − 1 do
    for (i, row) in h.iter_mut().enumerate() {
        let end = usize::from(y[omega + i]);

        // 4: if y[ω + i] < index or y[ω + i] > ω then return ⊥
        if end < index || end > omega {
            return None;
        }

        // 5: first ← index
        let first = index;

        // 6: while index < y[ω + i] do
        while index < end {
            //
            // 7: if index > first then; 8: if y[index − 1] ≥ y[index] then return ⊥
            if index > first && y[index - 1] >= y[index] {
                return None;
            }

            // 11: h[i]_{y[index]} ← 1; 12: index ← index + 1
            row.0[usize::from(y[index])] = 1;
            index += 1;
        }
    }

    // 15: for i from index to ω − 1 do; 16: if y[i] ≠ 0 then return ⊥
    if y[index..omega].iter().any(|&b| b != 0) {
        return None;
    }

    Some(h)
}


/// # Algorithm 22 `pkEncode(ρ, t1)`
/// Encodes a public key as `rho || SimpleBitPack(t1[i], 2^{bitlen(q−1)−d} − 1)`.
pub(crate) fn pk_encode<const K: usize, const PK_LEN: usize>(rho: &[u8; 32], t1: &[Poly; K]) -> [u8; PK_LEN] {
    let mut pk = [0u8; PK_LEN];
    pk[..32].copy_from_slice(rho);
    for (chunk, t1_i) in pk[32..].chunks_exact_mut(T1_LEN).zip(t1) {
        simple_bit_pack(t1_i, T1_MAX, chunk);
    }
    pk
}


/// # Algorithm 23 `pkDecode(pk)`
pub(crate) fn pk_decode<const K: usize, const PK_LEN: usize>(pk: &[u8; PK_LEN]) -> ([u8; 32], [Poly; K]) {
    let mut rho = [0u8; 32];
    rho.copy_from_slice(&pk[..32]);
    let t1 = core::array::from_fn(|i| simple_bit_unpack(&pk[32 + T1_LEN * i..32 + T1_LEN * (i + 1)], T1_MAX));
    (rho, t1)
}


/// # Algorithm 24 `skEncode(ρ, K, tr, s1, s2, t0)`
#[allow(clippy::too_many_arguments)]
pub(crate) fn sk_encode<const K: usize, const L: usize, const SK_LEN: usize>(
    eta: i32, rho: &[u8; 32], cap_k: &[u8; 32], tr: &[u8; 64], s1: &[Poly; L], s2: &[Poly; K], t0: &[Poly; K],
) -> [u8; SK_LEN] {
    let eta_len = 32 * bit_length(2 * eta);
    let mut sk = [0u8; SK_LEN];

    // 1: sk ← ρ || K || tr
    sk[..32].copy_from_slice(rho);
    sk[32..64].copy_from_slice(cap_k);
    sk[64..128].copy_from_slice(tr);

    // 2-4: for i from 0 to ℓ − 1 do  sk ← sk || BitPack(s1[i], η, η)
    // 5-7: for i from 0 to k − 1 do  sk ← sk || BitPack(s2[i], η, η)
    let (s_bytes, t0_bytes) = sk[128..].split_at_mut((L + K) * eta_len);
    for (chunk, s) in s_bytes.chunks_exact_mut(eta_len).zip(s1.iter().chain(s2)) {
        bit_pack(s, eta, eta, chunk);
    }

    // 8-10: for i from 0 to k − 1 do  sk ← sk || BitPack(t0[i], 2^{d−1} − 1, 2^{d−1})
    for (chunk, t) in t0_bytes.chunks_exact_mut(T0_LEN).zip(t0) {
        bit_pack(t, (1 << (D - 1)) - 1, 1 << (D - 1), chunk);
    }

    sk
}


/// Fields of a decoded private key: `(rho, K, tr, s1, s2, t0)`.
pub(crate) type SkParts<const K: usize, const L: usize> = ([u8; 32], [u8; 32], [u8; 64], [Poly; L], [Poly; K], [Poly; K]);


/// # Algorithm 25 `skDecode(sk)`
/// # Errors
/// Returns `MalformedKey` when an `s1` or `s2` coefficient falls outside `[−η, η]`.
pub(crate) fn sk_decode<const K: usize, const L: usize, const SK_LEN: usize>(
    eta: i32, sk: &[u8; SK_LEN],
) -> Result<SkParts<K, L>, Error> {
    let eta_len = 32 * bit_length(2 * eta);
    let (mut rho, mut cap_k, mut tr) = ([0u8; 32], [0u8; 32], [0u8; 64]);

    // 1: (ρ, K, tr, y0..yℓ−1, z0..zk−1, w0..wk−1) ∈ B^32 × B^32 × B^64 × ...
    rho.copy_from_slice(&sk[..32]);
    cap_k.copy_from_slice(&sk[32..64]);
    tr.copy_from_slice(&sk[64..128]);
    let s_start = 128;
    let t0_start = s_start + (L + K) * eta_len;

    // 2-7: s1[i] ← BitUnpack(y_i, η, η); s2[i] ← BitUnpack(z_i, η, η)
    let mut valid = true;
    let mut unpack_s = |i: usize| {
        let p = bit_unpack(&sk[s_start + i * eta_len..s_start + (i + 1) * eta_len], eta, eta);
        valid &= p.is_some();
        p.unwrap_or(Poly::ZERO)
    };
    let s1: [Poly; L] = core::array::from_fn(&mut unpack_s);
    let s2: [Poly; K] = core::array::from_fn(|i| unpack_s(L + i));
    ensure!(valid, Error::MalformedKey);

    // 8-10: t0[i] ← BitUnpack(w_i, 2^{d−1} − 1, 2^{d−1})
    let t0 = core::array::from_fn(|i| {
        bit_unpack_unchecked(&sk[t0_start + i * T0_LEN..t0_start + (i + 1) * T0_LEN], (1 << (D - 1)) - 1, 1 << (D - 1))
    });

    Ok((rho, cap_k, tr, s1, s2, t0))
}


/// # Algorithm 26 `sigEncode(c_tilde, z, h)`
pub(crate) fn sig_encode<const K: usize, const L: usize, const CTILDE_LEN: usize, const SIG_LEN: usize>(
    gamma1: i32, omega: usize, c_tilde: &[u8; CTILDE_LEN], z: &[Poly; L], h: &[Poly; K],
) -> [u8; SIG_LEN] {
    let z_len = 32 * (1 + bit_length(gamma1 - 1));
    let mut sigma = [0u8; SIG_LEN];

    // 1: σ ← c_tilde
    sigma[..CTILDE_LEN].copy_from_slice(c_tilde);

    // 2-4: for i from 0 to ℓ − 1 do  σ ← σ || BitPack(z[i], γ1 − 1, γ1)
    let (z_bytes, h_bytes) = sigma[CTILDE_LEN..].split_at_mut(L * z_len);
    for (chunk, z_i) in z_bytes.chunks_exact_mut(z_len).zip(z) {
        bit_pack(z_i, gamma1 - 1, gamma1, chunk);
    }

    // 5: σ ← σ || HintBitPack(h)
    hint_bit_pack(omega, h, h_bytes);

    sigma
}


/// # Algorithm 27 `sigDecode(σ)`
/// The hint component is `None` when its encoding is malformed.
pub(crate) fn sig_decode<const K: usize, const L: usize, const CTILDE_LEN: usize, const SIG_LEN: usize>(
    gamma1: i32, omega: usize, sigma: &[u8; SIG_LEN],
) -> ([u8; CTILDE_LEN], [Poly; L], Option<[Poly; K]>) {
    let z_len = 32 * (1 + bit_length(gamma1 - 1));
    let mut c_tilde = [0u8; CTILDE_LEN];

    // 1: (ω, x0, ..., xℓ−1, y) ∈ B^{λ/4} × B^{ℓ·32·(1+bitlen(γ1−1))} × B^{ω+k}
    c_tilde.copy_from_slice(&sigma[..CTILDE_LEN]);
    let z_start = CTILDE_LEN;
    let h_start = z_start + L * z_len;

    // 3-5: z[i] ← BitUnpack(x_i, γ1 − 1, γ1)
    let z = core::array::from_fn(|i| {
        bit_unpack_unchecked(&sigma[z_start + i * z_len..z_start + (i + 1) * z_len], gamma1 - 1, gamma1)
    });

    // 6: h ← HintBitUnpack(y)
    let h = hint_bit_unpack(omega, &sigma[h_start..]);

    (c_tilde, z, h)
}


/// # Algorithm 28 `w1Encode(w1)`
/// Packs the canonical high bits, `bitlen((q − 1)/(2γ2) − 1)` bits per coefficient.
pub(crate) fn w1_encode<const K: usize>(gamma2: i32, w1: &[Poly; K], w1_tilde: &mut [u8]) {
    let b = (crate::Q - 1) / (2 * gamma2) - 1;
    let chunk_len = 32 * bit_length(b);
    debug_assert_eq!(w1_tilde.len(), K * chunk_len);

    // 2: for i from 0 to k − 1 do  w1_tilde ← w1_tilde || BytesToBits(SimpleBitPack(w1[i], b))
    for (chunk, w1_i) in w1_tilde.chunks_exact_mut(chunk_len).zip(w1) {
        simple_bit_pack(w1_i, b, chunk);
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    fn random_poly(rng: &mut impl Rng, lo: i32, hi: i32) -> Poly {
        Poly(core::array::from_fn(|_| rng.gen_range(lo..=hi)))
    }

    #[test]
    fn test_bit_pack_layout() {
        // Offsets of 0 and 1 in 3-bit fields: value b - w
        let mut w = Poly([2; N]);
        w.0[0] = 1;
        let mut out = [0u8; 96];
        bit_pack(&w, 2, 2, &mut out);
        assert_eq!(out[0], 0b0000_0001);
        assert!(out[1..].iter().all(|&x| x == 0));

        let mut w = Poly::ZERO;
        w.0[1] = 1023;
        let mut out = [0u8; 320];
        simple_bit_pack(&w, 1023, &mut out);
        assert_eq!(&out[..3], &[0x00, 0xFC, 0x0F]);
        assert_eq!(simple_bit_unpack(&out, 1023), w);
    }

    #[test]
    fn test_bit_unpack_range_check() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(19);
        for eta in [2, 4] {
            let len = 32 * bit_length(2 * eta);
            let w = random_poly(&mut rng, -eta, eta);
            let mut out = [0u8; 128];
            bit_pack(&w, eta, eta, &mut out[..len]);
            assert_eq!(bit_unpack(&out[..len], eta, eta), Some(w));

            // All ones decodes to b - (2^bits - 1), outside [-eta, eta]
            out[..len].fill(0xFF);
            assert_eq!(bit_unpack(&out[..len], eta, eta), None);
        }
        for gamma1 in [1 << 17, 1 << 19] {
            let len = 32 * (1 + bit_length(gamma1 - 1));
            let z = random_poly(&mut rng, -gamma1 + 1, gamma1);
            let mut out = [0u8; 640];
            bit_pack(&z, gamma1 - 1, gamma1, &mut out[..len]);
            assert_eq!(bit_unpack_unchecked(&out[..len], gamma1 - 1, gamma1), z);
        }
    }

    #[test]
    fn test_hint_bit_unpack_rejects() {
        let omega = 4;
        let mut h = [Poly::ZERO; 2];
        h[0].0[3] = 1;
        h[0].0[200] = 1;
        h[1].0[0] = 1;
        let mut y = [0u8; 6];
        hint_bit_pack(omega, &h, &mut y);
        assert_eq!(y, [3, 200, 0, 0, 2, 3]);
        assert_eq!(hint_bit_unpack::<2>(omega, &y), Some(h));

        let mut bad = y;
        bad[1] = 3; // repeated position in a row
        assert_eq!(hint_bit_unpack::<2>(omega, &bad), None);
        let mut bad = y;
        bad[0] = 201; // decreasing positions
        assert_eq!(hint_bit_unpack::<2>(omega, &bad), None);
        let mut bad = y;
        bad[5] = 1; // row counts go backwards
        assert_eq!(hint_bit_unpack::<2>(omega, &bad), None);
        let mut bad = y;
        bad[5] = 5; // beyond omega
        assert_eq!(hint_bit_unpack::<2>(omega, &bad), None);
        let mut bad = y;
        bad[3] = 9; // padding must be zero
        assert_eq!(hint_bit_unpack::<2>(omega, &bad), None);
    }

    #[test]
    fn test_key_encodings() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(22);
        let (mut rho, mut cap_k) = ([0u8; 32], [0u8; 32]);
        rng.fill(&mut rho);
        rng.fill(&mut cap_k);
        let mut tr = [0u8; 64];
        rng.fill(&mut tr[..]);

        let t1: [Poly; 4] = core::array::from_fn(|_| random_poly(&mut rng, 0, 1023));
        let pk = pk_encode::<4, 1312>(&rho, &t1);
        assert_eq!(pk_decode::<4, 1312>(&pk), (rho, t1));

        let s1: [Poly; 5] = core::array::from_fn(|_| random_poly(&mut rng, -4, 4));
        let s2: [Poly; 6] = core::array::from_fn(|_| random_poly(&mut rng, -4, 4));
        let t0: [Poly; 6] = core::array::from_fn(|_| random_poly(&mut rng, -4095, 4096));
        let sk = sk_encode::<6, 5, 4032>(4, &rho, &cap_k, &tr, &s1, &s2, &t0);
        assert_eq!(sk_decode::<6, 5, 4032>(4, &sk), Ok((rho, cap_k, tr, s1, s2, t0)));

        let mut bad = sk;
        bad[128] = 0xFF; // first s1 nibble decodes to 4 - 15
        assert_eq!(sk_decode::<6, 5, 4032>(4, &bad), Err(Error::MalformedKey));
    }

    #[test]
    fn test_sig_encoding() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(26);
        let mut c_tilde = [0u8; 32];
        rng.fill(&mut c_tilde);
        let z: [Poly; 4] = core::array::from_fn(|_| random_poly(&mut rng, -(1 << 17) + 1, 1 << 17));
        let mut h = [Poly::ZERO; 4];
        for _ in 0..40 {
            h[rng.gen_range(0..4)].0[rng.gen_range(0..N)] = 1;
        }
        let sig = sig_encode::<4, 4, 32, 2420>(1 << 17, 80, &c_tilde, &z, &h);
        assert_eq!(sig_decode::<4, 4, 32, 2420>(1 << 17, 80, &sig), (c_tilde, z, Some(h)));
    }

    #[test]
    fn test_w1_encode_width() {
        let mut out = [0u8; 4 * 192];
        let w1: [Poly; 4] = [Poly([43; N]); 4];
        w1_encode((crate::Q - 1) / 88, &w1, &mut out);
        // 43 = 0b101011 packed four at a time into three bytes
        assert_eq!(&out[..3], &[0xEB, 0xBA, 0xAE]);
    }
}
