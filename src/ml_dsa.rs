// This file implements functionality from FIPS 204 section 6 Internal Functions: key
// generation from a seed, the signing loop and verification, plus the key expansions that
// precompute NTT-domain values.

use sha3::Shake256;
use subtle::{Choice, ConstantTimeEq, ConstantTimeGreater};
use zeroize::Zeroizing;

use crate::error::Error;
use crate::polyvec::{
    add_vec, center_vec, count_ones, exceeds_bound, inv_ntt_vec, map_vec, mat_vec_mul, mul_vec, ntt_vec,
    sub_ntt_vec, sub_vec, to_mont_vec, zip_vec,
};
use crate::reduce::freeze;
use crate::rounding::{high_bits, low_bits, make_hint, power2round, use_hint};
use crate::types::{MontNttPoly, ParamSet, Poly, PrivateKey, PublicKey};
use crate::{ntt, packing, sampling, xof, D, MAX_SIGN_ATTEMPTS};


/// # Algorithm 6 `ML-DSA.KeyGen_internal(ξ)`
/// Generates a key pair from the 32-byte seed `xi`. Deterministic and retry-free.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn key_gen_internal<const K: usize, const L: usize, const PK_LEN: usize>(
    p: &ParamSet, xi: &[u8; 32],
) -> (PublicKey<K>, PrivateKey<K, L>) {
    // 1: (ρ, ρ′, K) ∈ B^32 × B^64 × B^32 ← H(ξ || IntegerToBytes(k, 1) || IntegerToBytes(ℓ, 1), 128)
    let mut seeds = Zeroizing::new([0u8; 128]);
    xof::h256(&[xi, &[K as u8], &[L as u8]]).squeeze(&mut *seeds);
    let (mut rho, mut rho_prime, mut cap_k) = ([0u8; 32], Zeroizing::new([0u8; 64]), [0u8; 32]);
    rho.copy_from_slice(&seeds[..32]);
    rho_prime.copy_from_slice(&seeds[32..96]);
    cap_k.copy_from_slice(&seeds[96..]);

    // 3: A_hat ← ExpandA(ρ)
    let a_hat = sampling::expand_a::<K, L>(&rho);

    // 4: (s1, s2) ← ExpandS(ρ′)
    let (s1, s2) = sampling::expand_s::<K, L>(p.eta, &rho_prime);

    // 5: t ← NTT^{−1}(A_hat ∘ NTT(s1)) + s2
    let a_s1 = inv_ntt_vec(&mat_vec_mul(&a_hat, &ntt_vec(&s1)));
    let t = map_vec(&add_vec(&a_s1, &s2), freeze);

    // 6: (t1, t0) ← Power2Round(t)
    let t1 = map_vec(&t, |r| power2round(r).0);
    let t0 = map_vec(&t, |r| power2round(r).1);

    // 8: pk ← pkEncode(ρ, t1)
    let pk_bytes = packing::pk_encode::<K, PK_LEN>(&rho, &t1);

    // 9: tr ← H(pk, 64)
    let tr = xof::h256(&[&pk_bytes]).squeeze_array::<64>();

    // 10: sk ← skEncode(ρ, K, tr, s1, s2, t0) (kept expanded; serialized on demand)
    let pk = PublicKey { rho, tr, t1, t1_d2_hat: t1_d2_hat(&t1) };
    let sk = expand_private(rho, cap_k, tr, s1, s2, t0);

    log::debug!("generated key pair (k = {}, l = {})", K, L);
    (pk, sk)
}


/// Builds a private key with its NTT-domain precomputations.
pub(crate) fn expand_private<const K: usize, const L: usize>(
    rho: [u8; 32], cap_k: [u8; 32], tr: [u8; 64], s1: [Poly; L], s2: [Poly; K], t0: [Poly; K],
) -> PrivateKey<K, L> {
    let s1_hat = to_mont_vec(&ntt_vec(&s1));
    let s2_hat = to_mont_vec(&ntt_vec(&s2));
    let t0_hat = to_mont_vec(&ntt_vec(&t0));
    PrivateKey { rho, cap_k, tr, s1, s2, t0, s1_hat, s2_hat, t0_hat }
}


/// Builds a public key from its encoding, hashing the encoding into `tr`.
pub(crate) fn expand_public<const K: usize, const PK_LEN: usize>(pk: &[u8; PK_LEN]) -> PublicKey<K> {
    let (rho, t1) = packing::pk_decode::<K, PK_LEN>(pk);
    let tr = xof::h256(&[pk]).squeeze_array::<64>();
    PublicKey { rho, tr, t1, t1_d2_hat: t1_d2_hat(&t1) }
}


/// Derives the public key matching a private key by recomputing `t1`.
pub(crate) fn private_to_public_key<const K: usize, const L: usize, const PK_LEN: usize>(
    sk: &PrivateKey<K, L>,
) -> PublicKey<K> {
    let a_hat = sampling::expand_a::<K, L>(&sk.rho);
    let a_s1 = inv_ntt_vec(&mat_vec_mul(&a_hat, &ntt_vec(&sk.s1)));
    let t = map_vec(&add_vec(&a_s1, &sk.s2), freeze);
    let t1 = map_vec(&t, |r| power2round(r).0);
    expand_public::<K, PK_LEN>(&packing::pk_encode::<K, PK_LEN>(&sk.rho, &t1))
}


/// `NTT(t1 · 2^d)` in Montgomery form; `t1 · 2^d < q` so no reduction is needed first.
fn t1_d2_hat<const K: usize>(t1: &[Poly; K]) -> [MontNttPoly; K] {
    to_mont_vec(&ntt_vec(&map_vec(t1, |x| x << D)))
}


/// `µ ← H(tr || M′, 64)` with `M′ = IntegerToBytes(0, 1) || IntegerToBytes(|ctx|, 1) || ctx || M`.
#[allow(clippy::cast_possible_truncation)]
fn message_representative(tr: &[u8; 64], ctx: &[u8], message: &[u8]) -> [u8; 64] {
    debug_assert!(ctx.len() < 256);
    xof::Absorb::<Shake256>::new()
        .absorb(tr)
        .absorb_byte(0)
        .absorb_byte(ctx.len() as u8)
        .absorb(ctx)
        .absorb(message)
        .finalize()
        .squeeze_array::<64>()
}


/// # Algorithm 7 `ML-DSA.Sign_internal(sk, M′, rnd)`
/// Fiat-Shamir with aborts. Each attempt draws a fresh mask from the counter `kappa`, so no RNG
/// state is carried between attempts. Rejection is the only control flow that depends on secret
/// data. Gives up after `MAX_SIGN_ATTEMPTS` attempts.
#[allow(clippy::cast_possible_truncation, clippy::similar_names)]
pub(crate) fn sign_internal<
    const K: usize,
    const L: usize,
    const CTILDE_LEN: usize,
    const SIG_LEN: usize,
    const W1_LEN: usize,
>(
    p: &ParamSet, sk: &PrivateKey<K, L>, message: &[u8], ctx: &[u8], rnd: &[u8; 32],
) -> Result<[u8; SIG_LEN], Error> {
    // 5: A_hat ← ExpandA(ρ)
    let a_hat = sampling::expand_a::<K, L>(&sk.rho);

    // 6: µ ← H(BytesToBits(tr) || M′, 64)
    let mu = message_representative(&sk.tr, ctx, message);

    // 7: ρ″ ← H(K || rnd || µ, 64)
    let rho_pp = Zeroizing::new(xof::h256(&[&sk.cap_k, rnd, &mu]).squeeze_array::<64>());

    // 8: κ ← 0; 9: (z, h) ← ⊥; 10: while (z, h) = ⊥ do
    for attempt in 0..MAX_SIGN_ATTEMPTS {
        let kappa = attempt * L as u16;

        // 11: y ∈ R^ℓ ← ExpandMask(ρ″, κ)
        let y = Zeroizing::new(sampling::expand_mask::<L>(p.gamma1, &rho_pp, kappa));

        // 12: w ← NTT^{−1}(A_hat ∘ NTT(y))
        let w = inv_ntt_vec(&mat_vec_mul(&a_hat, &ntt_vec(&y)));

        // 13: w1 ← HighBits(w)
        let w1 = map_vec(&w, |r| high_bits(p.gamma2, r));

        // 15: c_tilde ← H(µ || w1Encode(w1), λ/4)
        let mut w1_tilde = [0u8; W1_LEN];
        packing::w1_encode(p.gamma2, &w1, &mut w1_tilde);
        let c_tilde = xof::h256(&[&mu, &w1_tilde]).squeeze_array::<CTILDE_LEN>();

        // 16: c ∈ R_q ← SampleInBall(c_tilde); 17: c_hat ← NTT(c)
        let c_hat = ntt::ntt(&sampling::sample_in_ball(p.tau, &c_tilde));

        // 18-20: ⟨⟨c s1⟩⟩, ⟨⟨c s2⟩⟩, centered
        let cs1 = center_vec(&inv_ntt_vec(&mul_vec(&c_hat, &sk.s1_hat)));
        let cs2 = center_vec(&inv_ntt_vec(&mul_vec(&c_hat, &sk.s2_hat)));

        // 20: z ← y + ⟨⟨c s1⟩⟩
        let z = add_vec(&y, &cs1);

        // 21: r0 ← LowBits(w − ⟨⟨c s2⟩⟩)
        let w_cs2 = map_vec(&sub_vec(&w, &cs2), freeze);
        let r0 = map_vec(&w_cs2, |r| low_bits(p.gamma2, r));

        // 23: if ||z||∞ ≥ γ1 − β or ||r0||∞ ≥ γ2 − β then (z, h) ← ⊥
        let mut reject = exceeds_bound(&z, p.gamma1 - p.beta) | exceeds_bound(&r0, p.gamma2 - p.beta);

        // 25: ⟨⟨c t0⟩⟩ ← NTT^{−1}(c_hat ∘ t0_hat)
        let ct0 = center_vec(&inv_ntt_vec(&mul_vec(&c_hat, &sk.t0_hat)));

        // 26: h ← MakeHint(−⟨⟨c t0⟩⟩, w − ⟨⟨c s2⟩⟩ + ⟨⟨c t0⟩⟩)
        let r = map_vec(&add_vec(&w_cs2, &ct0), freeze);
        let h = zip_vec(&ct0, &r, |ct0_j, r_j| make_hint(p.gamma2, -ct0_j, r_j));

        // 28: if ||⟨⟨c t0⟩⟩||∞ ≥ γ2 or the number of 1's in h is greater than ω, then (z, h) ← ⊥
        reject |= exceeds_bound(&ct0, p.gamma2) | count_ones(&h).ct_gt(&(p.omega as u32));

        // 31: κ ← κ + ℓ
        if bool::from(reject) {
            continue;
        }

        // 33: σ ← sigEncode(c_tilde, z mod± q, h)
        log::trace!("signature accepted after {} attempt(s)", attempt + 1);
        return Ok(packing::sig_encode::<K, L, CTILDE_LEN, SIG_LEN>(p.gamma1, p.omega, &c_tilde, &z, &h));
    }

    log::error!("signing loop exhausted {} attempts", MAX_SIGN_ATTEMPTS);
    Err(Error::InternalArithmeticFault { attempts: MAX_SIGN_ATTEMPTS })
}


/// # Algorithm 8 `ML-DSA.Verify_internal(pk, M′, σ)`
/// Every check is computed before the outcomes are combined, and the caller only learns
/// accept or reject.
pub(crate) fn verify_internal<
    const K: usize,
    const L: usize,
    const CTILDE_LEN: usize,
    const SIG_LEN: usize,
    const W1_LEN: usize,
>(
    p: &ParamSet, pk: &PublicKey<K>, message: &[u8], ctx: &[u8], sigma: &[u8; SIG_LEN],
) -> bool {
    // 2: (c_tilde, z, h) ← sigDecode(σ)
    let (c_tilde, z, h) = packing::sig_decode::<K, L, CTILDE_LEN, SIG_LEN>(p.gamma1, p.omega, sigma);

    // 3: if h = ⊥ then return false (folded into the final decision)
    let hint_ok = Choice::from(u8::from(h.is_some()));
    let h = h.unwrap_or([Poly::ZERO; K]);

    // 5: A_hat ← ExpandA(ρ)
    let a_hat = sampling::expand_a::<K, L>(&pk.rho);

    // 6, 7: tr ← H(pk, 64); µ ← H(BytesToBits(tr) || M′, 64)
    let mu = message_representative(&pk.tr, ctx, message);

    // 8: c ∈ R_q ← SampleInBall(c_tilde)
    let c_hat = ntt::ntt(&sampling::sample_in_ball(p.tau, &c_tilde));

    // 9: w′_Approx ← NTT^{−1}(A_hat ∘ NTT(z) − NTT(c) ∘ NTT(t1 · 2^d))
    let az = mat_vec_mul(&a_hat, &ntt_vec(&z));
    let ct1 = mul_vec(&c_hat, &pk.t1_d2_hat);
    let w_approx = inv_ntt_vec(&sub_ntt_vec(&az, &ct1));

    // 10: w1′ ← UseHint(h, w′_Approx)
    let w1 = zip_vec(&h, &w_approx, |h_j, r_j| use_hint(p.gamma2, h_j, r_j));

    // 12: c_tilde′ ← H(µ || w1Encode(w1′), λ/4)
    let mut w1_tilde = [0u8; W1_LEN];
    packing::w1_encode(p.gamma2, &w1, &mut w1_tilde);
    let c_tilde_p = xof::h256(&[&mu, &w1_tilde]).squeeze_array::<CTILDE_LEN>();

    // 13: return [[ ||z||∞ < γ1 − β ]] and [[c_tilde = c_tilde′]]
    let accept = !exceeds_bound(&z, p.gamma1 - p.beta) & hint_ok & c_tilde[..].ct_eq(&c_tilde_p[..]);
    accept.into()
}
