#![no_std]
#![deny(clippy::pedantic, warnings, missing_docs, unsafe_code)]
// Almost all of the 'allow' category...
#![deny(absolute_paths_not_starting_with_crate, dead_code)]
#![deny(elided_lifetimes_in_paths, explicit_outlives_requirements, keyword_idents)]
#![deny(let_underscore_drop, macro_use_extern_crate, meta_variable_misuse, missing_abi)]
#![deny(non_ascii_idents, rust_2021_incompatible_closure_captures)]
#![deny(rust_2021_incompatible_or_patterns, rust_2021_prefixes_incompatible_syntax)]
#![deny(rust_2021_prelude_collisions, single_use_lifetimes, trivial_casts)]
#![deny(trivial_numeric_casts, unreachable_pub, unsafe_op_in_unsafe_fn, unstable_features)]
#![deny(unused_extern_crates, unused_import_braces, unused_lifetimes, unused_macro_rules)]
#![deny(unused_qualifications, unused_results, variant_size_differences)]
#![allow(clippy::module_name_repetitions, clippy::large_stack_arrays)]
//
#![doc = include_str!("../README.md")]

// Module-lattice signatures (CRYSTALS-Dilithium as standardized in FIPS 204, ML-DSA).
// See <https://nvlpubs.nist.gov/nistpubs/FIPS/NIST.FIPS.204.pdf>
//
// Functionality map
//
// Algorithms 2, 3 ML-DSA.Sign / ML-DSA.Verify (ctx handling)   --> lib.rs
// Algorithm 6 ML-DSA.KeyGen_internal(ξ)                        --> ml_dsa.rs
// Algorithm 7 ML-DSA.Sign_internal(sk, M', rnd)                --> ml_dsa.rs
// Algorithm 8 ML-DSA.Verify_internal(pk, M', σ)                --> ml_dsa.rs
// Algorithms 14, 15 CoefFromThreeBytes / CoefFromHalfByte      --> sampling.rs
// Algorithms 16-21 bit packing and hint packing                --> packing.rs
// Algorithms 22-28 key, signature and w1 encodings             --> packing.rs
// Algorithms 29-34 SampleInBall, RejNTTPoly, ... ExpandMask    --> sampling.rs
// Algorithms 35-40 Power2Round, Decompose, ... UseHint         --> rounding.rs
// Algorithms 41, 42 NTT and NTT^{-1}                           --> ntt.rs
// Algorithms 44-48 NTT-domain vector and matrix arithmetic     --> types.rs, polyvec.rs
// Algorithm 49 MontgomeryReduce                                --> reduce.rs
// SHAKE128/SHAKE256 sponge handling                            --> xof.rs
// Types are in types.rs, traits are in traits.rs, errors are in error.rs...

// Note that debug_assert! statements enforce correct program construction and are not involved
// in any operational dataflow. The ensure! statements implement conservative dataflow validation
// and do not panic. Functions are only generic over parameters that size stack arrays; the
// remaining parameters travel in a `ParamSet`.

extern crate alloc;

/// The `rand_core` types are re-exported so that users of this crate do not
/// have to worry about using the exact correct version of `rand_core`.
pub use rand_core::{CryptoRng, CryptoRngCore, RngCore};

mod error;
mod helpers;
mod ml_dsa;
mod ntt;
mod packing;
mod polyvec;
mod reduce;
mod rounding;
mod sampling;
mod types;
mod xof;

/// All functionality is covered by traits, such that consumers can utilize trait objects as desired.
pub mod traits;
pub use crate::error::{Error, KeyKind};

// Applies across all security parameter sets
const Q: i32 = 8_380_417; // 2^23 - 2^13 + 1 = 0x7FE001
const N: usize = 256; // Ring degree
const ZETA: i32 = 1753; // 512th root of unity mod Q
const D: u32 = 13; // Dropped bits of t

/// Seed length in bytes for deterministic key generation.
pub const SEED_LEN: usize = 32;

/// Upper bound on signing attempts before giving up. Each attempt succeeds with probability
/// above 1/5 for every parameter set, so this is never reached with a valid key.
pub const MAX_SIGN_ATTEMPTS: u16 = 1000;


// This common functionality is injected into each security parameter set namespace, and is
// largely a lightweight wrapper into the ml_dsa functions.
macro_rules! functionality {
    () => {
        use crate::error::{Error, KeyKind};
        use crate::helpers::{self, ensure};
        use crate::ml_dsa;
        use crate::packing;
        use crate::traits::{KeyGen, SerDes, Signer, Verifier};
        use crate::types::ParamSet;
        use crate::{Q, SEED_LEN};
        use alloc::vec::Vec;
        use rand_core::CryptoRngCore;
        use zeroize::Zeroizing;

        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        const BETA: i32 = TAU as i32 * ETA;
        const CTILDE_LEN: usize = LAMBDA / 4;
        const W1_LEN: usize = 32 * K * helpers::bit_length((Q - 1) / (2 * GAMMA2) - 1);
        const PARAMS: ParamSet = ParamSet { tau: TAU, eta: ETA, beta: BETA, gamma1: GAMMA1, gamma2: GAMMA2, omega: OMEGA };


        // ----- 'EXTERNAL' DATA TYPES -----

        /// Empty struct to enable `KeyGen` trait objects across security parameter
        /// sets. Implements the [`crate::traits::KeyGen`] trait.
        #[derive(Clone, Copy, Debug, Default)]
        pub struct KG;


        /// Private key specific to the target security parameter set that contains
        /// precomputed elements which improves signature performance.
        ///
        /// Implements the [`crate::traits::Signer`] and [`crate::traits::SerDes`] traits.
        pub type PrivateKey = crate::types::PrivateKey<K, L>;


        /// Public key specific to the target security parameter set that contains
        /// precomputed elements which improves verification performance.
        ///
        /// Implements the [`crate::traits::Verifier`] and [`crate::traits::SerDes`] traits.
        pub type PublicKey = crate::types::PublicKey<K>;


        /// Signature as a plain fixed-size byte array.
        pub type Signature = [u8; SIG_LEN];


        // ----- BYTE-SLICE SURFACE -----

        /// Derives a serialized key pair from exactly 32 bytes of entropy.
        ///
        /// **Output**: `(public key, private key)` byte arrays.
        ///
        /// # Errors
        /// Returns `InvalidEntropyLength` when `seed` is not 32 bytes long.
        pub fn keygen(seed: &[u8]) -> Result<([u8; PK_LEN], [u8; SK_LEN]), Error> {
            let (pk, sk) = KG::keygen_from_seed(seed)?;
            Ok((pk.into_bytes(), sk.into_bytes()))
        }


        /// Signs `message` under a serialized private key, returning `signature || message`.
        ///
        /// Signing is deterministic unless the `randomized-signing` feature is enabled, in which
        /// case 32 fresh bytes from the OS RNG are mixed into each signature.
        ///
        /// # Errors
        /// Returns `InvalidKeyLength` or `MalformedKey` for a bad private key, and
        /// `InternalArithmeticFault` if the signing loop runs out of attempts.
        pub fn sign(message: &[u8], sk: &[u8]) -> Result<Vec<u8>, Error> {
            let sk = PrivateKey::try_from_bytes(sk)?;
            #[cfg(feature = "randomized-signing")]
            let sig = sk.try_sign(message, &[])?;
            #[cfg(not(feature = "randomized-signing"))]
            let sig = sk.try_sign_deterministic(message, &[])?;

            let mut signed_message = Vec::with_capacity(SIG_LEN + message.len());
            signed_message.extend_from_slice(&sig);
            signed_message.extend_from_slice(message);
            Ok(signed_message)
        }


        /// Verifies `signature || message` under a serialized public key and returns the message.
        ///
        /// # Errors
        /// Returns `InvalidKeyLength` or `InvalidSignatureLength` before doing any arithmetic,
        /// and `SignatureRejected` when the signature does not verify.
        pub fn open(signed_message: &[u8], pk: &[u8]) -> Result<Vec<u8>, Error> {
            ensure!(
                pk.len() == PK_LEN,
                Error::InvalidKeyLength { kind: KeyKind::Public, expected: PK_LEN, actual: pk.len() }
            );
            ensure!(
                signed_message.len() >= SIG_LEN,
                Error::InvalidSignatureLength { minimum: SIG_LEN, actual: signed_message.len() }
            );
            let pk = PublicKey::try_from_bytes(pk)?;
            let (sig, message) = signed_message.split_at(SIG_LEN);
            let sig: &Signature = sig
                .try_into()
                .map_err(|_| Error::InvalidSignatureLength { minimum: SIG_LEN, actual: signed_message.len() })?;
            pk.try_verify(message, sig, &[])?;
            Ok(message.to_vec())
        }


        // ----- TYPED SURFACE -----

        /// Generates a public and private key pair specific to this security parameter set,
        /// seeded from the OS random number generator.
        ///
        /// # Errors
        /// Returns an error if the random number generator fails.
        #[cfg(feature = "default-rng")]
        pub fn try_keygen() -> Result<(PublicKey, PrivateKey), Error> { KG::try_keygen() }


        /// Generates a public and private key pair specific to this security parameter set,
        /// seeded from the supplied random number generator.
        ///
        /// # Errors
        /// Returns an error if the random number generator fails.
        pub fn try_keygen_with_rng(rng: &mut impl CryptoRngCore) -> Result<(PublicKey, PrivateKey), Error> {
            KG::try_keygen_with_rng(rng)
        }


        impl KeyGen for KG {
            type PrivateKey = PrivateKey;
            type PublicKey = PublicKey;

            fn try_keygen_with_rng(rng: &mut impl CryptoRngCore) -> Result<(PublicKey, PrivateKey), Error> {
                let mut xi = Zeroizing::new([0u8; SEED_LEN]);
                rng.try_fill_bytes(&mut *xi).map_err(|_| Error::RngFailure)?;
                Self::keygen_from_seed(&*xi)
            }

            fn keygen_from_seed(seed: &[u8]) -> Result<(PublicKey, PrivateKey), Error> {
                let xi: &[u8; SEED_LEN] = seed.try_into().map_err(|_| {
                    log::debug!("rejected key generation seed of {} bytes", seed.len());
                    Error::InvalidEntropyLength { expected: SEED_LEN, actual: seed.len() }
                })?;
                Ok(ml_dsa::key_gen_internal::<K, L, PK_LEN>(&PARAMS, xi))
            }
        }


        impl Signer for PrivateKey {
            type Signature = Signature;
            type PublicKey = PublicKey;

            /// # Algorithm 2: `ML-DSA.Sign(sk, M, ctx)`
            /// The hedged variant: 32 bytes from `rng` are mixed into the per-message seed.
            fn try_sign_with_rng(
                &self, rng: &mut impl CryptoRngCore, message: &[u8], ctx: &[u8],
            ) -> Result<Signature, Error> {
                // 1: if |ctx| > 255 then return ⊥
                ensure!(ctx.len() < 256, Error::ContextTooLong);

                // 5: rnd ← B^32; 6: if rnd = NULL then return ⊥
                let mut rnd = Zeroizing::new([0u8; 32]);
                rng.try_fill_bytes(&mut *rnd).map_err(|_| Error::RngFailure)?;

                // 10: M′ ← IntegerToBytes(0, 1) || IntegerToBytes(|ctx|, 1) || ctx || M
                // 11: σ ← ML-DSA.Sign_internal(sk, M′, rnd)
                ml_dsa::sign_internal::<K, L, CTILDE_LEN, SIG_LEN, W1_LEN>(&PARAMS, self, message, ctx, &rnd)
            }

            /// # Algorithm 2: `ML-DSA.Sign(sk, M, ctx)`
            /// The deterministic variant, with `rnd ← {0}^32`.
            fn try_sign_deterministic(&self, message: &[u8], ctx: &[u8]) -> Result<Signature, Error> {
                ensure!(ctx.len() < 256, Error::ContextTooLong);
                ml_dsa::sign_internal::<K, L, CTILDE_LEN, SIG_LEN, W1_LEN>(&PARAMS, self, message, ctx, &[0u8; 32])
            }

            fn get_public_key(&self) -> PublicKey { ml_dsa::private_to_public_key::<K, L, PK_LEN>(self) }
        }


        impl Verifier for PublicKey {
            type Signature = Signature;

            /// # Algorithm 3: `ML-DSA.Verify(pk, M, σ, ctx)`
            fn try_verify(&self, message: &[u8], sig: &Signature, ctx: &[u8]) -> Result<(), Error> {
                // 1: if |ctx| > 255 then return ⊥
                ensure!(ctx.len() < 256, Error::ContextTooLong);

                // 5: M′ ← IntegerToBytes(0, 1) || IntegerToBytes(|ctx|, 1) || ctx || M
                // 6: return ML-DSA.Verify_internal(pk, M′, σ)
                let ok = ml_dsa::verify_internal::<K, L, CTILDE_LEN, SIG_LEN, W1_LEN>(&PARAMS, self, message, ctx, sig);
                ensure!(ok, Error::SignatureRejected);
                Ok(())
            }
        }


        // ----- SERIALIZATION AND DESERIALIZATION ---

        impl SerDes for PrivateKey {
            type ByteArray = [u8; SK_LEN];

            fn into_bytes(self) -> Self::ByteArray {
                packing::sk_encode::<K, L, SK_LEN>(ETA, &self.rho, &self.cap_k, &self.tr, &self.s1, &self.s2, &self.t0)
            }

            fn try_from_bytes(bytes: &[u8]) -> Result<Self, Error> {
                let sk: &[u8; SK_LEN] = bytes.try_into().map_err(|_| {
                    log::debug!("rejected private key of {} bytes", bytes.len());
                    Error::InvalidKeyLength { kind: KeyKind::Private, expected: SK_LEN, actual: bytes.len() }
                })?;
                let (rho, cap_k, tr, s1, s2, t0) = packing::sk_decode::<K, L, SK_LEN>(ETA, sk)?;
                Ok(ml_dsa::expand_private(rho, cap_k, tr, s1, s2, t0))
            }
        }


        impl SerDes for PublicKey {
            type ByteArray = [u8; PK_LEN];

            fn into_bytes(self) -> Self::ByteArray { packing::pk_encode::<K, PK_LEN>(&self.rho, &self.t1) }

            fn try_from_bytes(bytes: &[u8]) -> Result<Self, Error> {
                let pk: &[u8; PK_LEN] = bytes.try_into().map_err(|_| {
                    log::debug!("rejected public key of {} bytes", bytes.len());
                    Error::InvalidKeyLength { kind: KeyKind::Public, expected: PK_LEN, actual: bytes.len() }
                })?;
                Ok(ml_dsa::expand_public::<K, PK_LEN>(pk))
            }
        }


    };
}


/// # Functionality for the **ML-DSA-44** security parameter set.
///
/// This includes specific sizes for the public key, secret key, and signature along with a
/// number of internal constants. The ML-DSA-44 parameter set is claimed to be in security
/// strength category 2.
///
/// **1)** The simplest usage is the byte-slice surface: [`ml_dsa_44::keygen`] derives a key pair
/// from 32 bytes of entropy, [`ml_dsa_44::sign`] produces `signature || message`, and
/// [`ml_dsa_44::open`] verifies it and hands back the message.
///
/// **2)** The typed surface starts from [`ml_dsa_44::try_keygen`], producing
/// [`ml_dsa_44::PublicKey`] and [`ml_dsa_44::PrivateKey`] structs that implement
/// [`traits::Verifier`], [`traits::Signer`] and [`traits::SerDes`], with context strings.
///
/// See the top-level [crate] documentation for example code.
#[cfg(feature = "ml-dsa-44")]
pub mod ml_dsa_44 {
    const TAU: usize = 39;
    const LAMBDA: usize = 128;
    const GAMMA1: i32 = 1 << 17;
    const GAMMA2: i32 = (Q - 1) / 88;
    const K: usize = 4;
    const L: usize = 4;
    const ETA: i32 = 2;
    const OMEGA: usize = 80;
    /// Private (secret) key length in bytes.
    pub const SK_LEN: usize = 2560;
    /// Public key length in bytes.
    pub const PK_LEN: usize = 1312;
    /// Signature length in bytes.
    pub const SIG_LEN: usize = 2420;

    functionality!();
}


/// # Functionality for the **ML-DSA-65** security parameter set.
///
/// This includes specific sizes for the public key, secret key, and signature along with a
/// number of internal constants. The ML-DSA-65 parameter set is claimed to be in security
/// strength category 3.
///
/// Usage mirrors [`ml_dsa_44`]: the byte-slice [`ml_dsa_65::keygen`], [`ml_dsa_65::sign`] and
/// [`ml_dsa_65::open`] functions, or the typed keys and the [`traits`].
#[cfg(feature = "ml-dsa-65")]
pub mod ml_dsa_65 {
    const TAU: usize = 49;
    const LAMBDA: usize = 192;
    const GAMMA1: i32 = 1 << 19;
    const GAMMA2: i32 = (Q - 1) / 32;
    const K: usize = 6;
    const L: usize = 5;
    const ETA: i32 = 4;
    const OMEGA: usize = 55;
    /// Private (secret) key length in bytes.
    pub const SK_LEN: usize = 4032;
    /// Public key length in bytes.
    pub const PK_LEN: usize = 1952;
    /// Signature length in bytes.
    pub const SIG_LEN: usize = 3309;

    functionality!();
}


/// # Functionality for the **ML-DSA-87** security parameter set.
///
/// This includes specific sizes for the public key, secret key, and signature along with a
/// number of internal constants. The ML-DSA-87 parameter set is claimed to be in security
/// strength category 5.
///
/// Usage mirrors [`ml_dsa_44`]: the byte-slice [`ml_dsa_87::keygen`], [`ml_dsa_87::sign`] and
/// [`ml_dsa_87::open`] functions, or the typed keys and the [`traits`].
#[cfg(feature = "ml-dsa-87")]
pub mod ml_dsa_87 {
    const TAU: usize = 60;
    const LAMBDA: usize = 256;
    const GAMMA1: i32 = 1 << 19;
    const GAMMA2: i32 = (Q - 1) / 32;
    const K: usize = 8;
    const L: usize = 7;
    const ETA: i32 = 2;
    const OMEGA: usize = 75;
    /// Private (secret) key length in bytes.
    pub const SK_LEN: usize = 4896;
    /// Public key length in bytes.
    pub const PK_LEN: usize = 2592;
    /// Signature length in bytes.
    pub const SIG_LEN: usize = 4627;

    functionality!();
}
