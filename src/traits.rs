use crate::error::Error;
use rand_core::CryptoRngCore;
#[cfg(feature = "default-rng")]
use rand_core::OsRng;


/// The `KeyGen` trait is defined to allow trait objects.
pub trait KeyGen {
    /// A public key specific to the chosen security parameter set, e.g., ml-dsa-44, ml-dsa-65 or ml-dsa-87
    type PublicKey;
    /// A private (secret) key specific to the chosen security parameter set, e.g., ml-dsa-44, ml-dsa-65 or ml-dsa-87
    type PrivateKey;

    /// Generates a public and private key pair specific to this security parameter set. <br>
    /// This function utilizes the OS default random number generator.
    /// # Errors
    /// Returns an error when the random number generator fails.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// # #[cfg(all(feature = "ml-dsa-44", feature = "default-rng"))] {
    /// use lattice_sig::ml_dsa_44; // Could also be ml_dsa_65 or ml_dsa_87.
    /// use lattice_sig::traits::{KeyGen, Signer, Verifier};
    ///
    /// let message = [0u8, 1, 2, 3, 4, 5, 6, 7];
    ///
    /// let (pk, sk) = ml_dsa_44::KG::try_keygen()?; // Generate both public and secret keys
    /// let sig = sk.try_sign(&message, &[])?; // Use the secret key to generate a message signature
    /// assert!(pk.verify(&message, &sig, &[]));
    /// # }
    /// # Ok(())}
    /// ```
    #[cfg(feature = "default-rng")]
    fn try_keygen() -> Result<(Self::PublicKey, Self::PrivateKey), Error> { Self::try_keygen_with_rng(&mut OsRng) }

    /// Generates a public and private key pair specific to this security parameter set. <br>
    /// This function utilizes a supplied random number generator for the 32-byte seed.
    /// # Errors
    /// Returns an error when the random number generator fails.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// # #[cfg(feature = "ml-dsa-65")] {
    /// use lattice_sig::ml_dsa_65; // Could also be ml_dsa_44 or ml_dsa_87.
    /// use lattice_sig::traits::{KeyGen, Signer, Verifier};
    /// use rand_chacha::rand_core::SeedableRng;
    ///
    /// let message = [0u8, 1, 2, 3, 4, 5, 6, 7];
    /// let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
    ///
    /// let (pk, sk) = ml_dsa_65::KG::try_keygen_with_rng(&mut rng)?;
    /// let sig = sk.try_sign_with_rng(&mut rng, &message, b"app")?;
    /// assert!(pk.verify(&message, &sig, b"app"));
    /// # }
    /// # Ok(())}
    /// ```
    fn try_keygen_with_rng(rng: &mut impl CryptoRngCore) -> Result<(Self::PublicKey, Self::PrivateKey), Error>;

    /// Generates a key pair deterministically from a 32-byte seed.
    /// # Errors
    /// Returns `InvalidEntropyLength` when `seed` is not exactly 32 bytes.
    fn keygen_from_seed(seed: &[u8]) -> Result<(Self::PublicKey, Self::PrivateKey), Error>;
}


/// The Signer trait is implemented for the `PrivateKey` struct on each of the security parameter sets
pub trait Signer {
    /// The signature is specific to the chosen security parameter set, e.g., ml-dsa-44, ml-dsa-65 or ml-dsa-87
    type Signature;
    /// The public key that corresponds to the private/secret key
    type PublicKey;

    /// Attempt to sign the given message with a context string of at most 255 bytes. This
    /// function mixes 32 bytes from the default OS RNG into the signature ("hedged" signing).
    ///
    /// # Errors
    /// Returns an error when the random number generator fails or the context is too long.
    #[cfg(feature = "default-rng")]
    fn try_sign(&self, message: &[u8], ctx: &[u8]) -> Result<Self::Signature, Error> {
        self.try_sign_with_rng(&mut OsRng, message, ctx)
    }

    /// Attempt to sign the given message with a context string, mixing 32 bytes from the supplied
    /// random number generator into the signature.
    ///
    /// # Errors
    /// Returns an error when the random number generator fails or the context is too long.
    fn try_sign_with_rng(
        &self, rng: &mut impl CryptoRngCore, message: &[u8], ctx: &[u8],
    ) -> Result<Self::Signature, Error>;

    /// Deterministic signing: the same key, message and context always give the same signature.
    ///
    /// # Errors
    /// Returns an error when the context is too long.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// # #[cfg(feature = "ml-dsa-87")] {
    /// use lattice_sig::ml_dsa_87;
    /// use lattice_sig::traits::{KeyGen, Signer};
    ///
    /// let (_pk, sk) = ml_dsa_87::KG::keygen_from_seed(&[42u8; 32])?;
    /// let sig1 = sk.try_sign_deterministic(b"message", &[])?;
    /// let sig2 = sk.try_sign_deterministic(b"message", &[])?;
    /// assert_eq!(sig1, sig2);
    /// # }
    /// # Ok(())}
    /// ```
    fn try_sign_deterministic(&self, message: &[u8], ctx: &[u8]) -> Result<Self::Signature, Error>;

    /// Retrieves the public key associated with this private/secret key
    fn get_public_key(&self) -> Self::PublicKey;
}


/// The Verifier trait is implemented for `PublicKey` on each of the security parameter sets
pub trait Verifier {
    /// The signature is specific to the chosen security parameter set, e.g., ml-dsa-44, ml-dsa-65
    /// or ml-dsa-87
    type Signature;

    /// Verifies a digital signature on a message with respect to a `PublicKey` and context.
    fn verify(&self, message: &[u8], signature: &Self::Signature, ctx: &[u8]) -> bool {
        self.try_verify(message, signature, ctx).is_ok()
    }

    /// Verifies a digital signature, reporting failure as an error.
    ///
    /// # Errors
    /// Returns `ContextTooLong` for an oversized context, otherwise `SignatureRejected` for
    /// any signature that does not verify.
    fn try_verify(&self, message: &[u8], signature: &Self::Signature, ctx: &[u8]) -> Result<(), Error>;
}


/// The `SerDes` trait provides for validated serialization and deserialization of fixed-size
/// elements. Deserialization checks the exact length, and private keys additionally have their
/// secret coefficients range-checked.
pub trait SerDes {
    /// The fixed-size byte array to be serialized or deserialized
    type ByteArray;

    /// Produces a byte array of fixed-size specific to the struct being serialized.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// # #[cfg(feature = "ml-dsa-65")] {
    /// use lattice_sig::ml_dsa_65;
    /// use lattice_sig::traits::{KeyGen, SerDes};
    ///
    /// let (pk, sk) = ml_dsa_65::KG::keygen_from_seed(&[7u8; 32])?;
    /// let pk_bytes = pk.into_bytes(); // Serialize the public key
    /// let sk_bytes = sk.into_bytes(); // Serialize the private key
    /// assert_eq!(pk_bytes.len(), ml_dsa_65::PK_LEN);
    /// assert_eq!(sk_bytes.len(), ml_dsa_65::SK_LEN);
    /// # }
    /// # Ok(())}
    /// ```
    fn into_bytes(self) -> Self::ByteArray;

    /// Deserializes and validates a byte slice.
    /// # Errors
    /// Returns `InvalidKeyLength` on a length mismatch and `MalformedKey` on out-of-range content.
    fn try_from_bytes(bytes: &[u8]) -> Result<Self, Error>
    where
        Self: Sized;
}
