use core::fmt;

use thiserror::Error;


/// Identifies which half of a key pair a length error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyKind {
    /// The public (verification) key.
    Public,
    /// The private (signing) key.
    Private,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyKind::Public => f.write_str("public"),
            KeyKind::Private => f.write_str("private"),
        }
    }
}


/// Every failure reported by this crate.
///
/// Length and format checks run before any arithmetic, so a malformed input never costs a
/// matrix expansion. Verification failures are deliberately reported without a sub-reason.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// Key generation was handed a seed of the wrong size.
    #[error("entropy must be {expected} bytes, got {actual}")]
    InvalidEntropyLength {
        /// Required seed length.
        expected: usize,
        /// Supplied seed length.
        actual: usize,
    },

    /// A serialized key had the wrong size for the parameter set.
    #[error("{kind} key must be {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// Which key was malformed.
        kind: KeyKind,
        /// Required key length.
        expected: usize,
        /// Supplied key length.
        actual: usize,
    },

    /// A signed message was too short to even hold a signature.
    #[error("signed message must be at least {minimum} bytes, got {actual}")]
    InvalidSignatureLength {
        /// Signature length for the parameter set.
        minimum: usize,
        /// Supplied length.
        actual: usize,
    },

    /// A private key encoding carried secret coefficients outside of `[-eta, eta]`.
    #[error("private key holds out-of-range coefficients")]
    MalformedKey,

    /// Context strings are limited to 255 bytes.
    #[error("context string exceeds 255 bytes")]
    ContextTooLong,

    /// The caller-supplied random number generator failed.
    #[error("random number generator failed")]
    RngFailure,

    /// The signature does not verify under the public key.
    #[error("signature verification failed")]
    SignatureRejected,

    /// The signing loop ran out of attempts; practically unreachable with a well-formed key.
    #[error("signing gave up after {attempts} attempts")]
    InternalArithmeticFault {
        /// Number of rejected attempts.
        attempts: u16,
    },
}


#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::string::ToString;

    #[test]
    fn test_messages() {
        let e = Error::InvalidKeyLength { kind: KeyKind::Public, expected: 1312, actual: 3 };
        assert_eq!(e.to_string(), "public key must be 1312 bytes, got 3");
        let e = Error::InvalidEntropyLength { expected: 32, actual: 31 };
        assert_eq!(e.to_string(), "entropy must be 32 bytes, got 31");
        assert_eq!(Error::SignatureRejected.to_string(), "signature verification failed");
    }
}
