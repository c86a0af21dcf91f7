// Sponge-based extendable output over Keccak-f[1600]. State is an explicit value: an `Absorb`
// accepts input until `finalize()` turns it into a `Squeeze`, which only produces output.

use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::{Shake128, Shake256};

/// SHAKE128 rate in bytes; `RejNTTPoly` pulls whole blocks of this size.
pub(crate) const SHAKE128_RATE: usize = 168;
/// SHAKE256 rate in bytes.
pub(crate) const SHAKE256_RATE: usize = 136;


/// Absorbing half of a sponge. Consumed by `finalize()`.
pub(crate) struct Absorb<S> {
    state: S,
}

impl<S: Default + Update + ExtendableOutput> Absorb<S> {
    pub(crate) fn new() -> Self { Self { state: S::default() } }

    pub(crate) fn absorb(mut self, bytes: &[u8]) -> Self {
        self.state.update(bytes);
        self
    }

    /// Control and domain-separation bytes (lengths, indices).
    pub(crate) fn absorb_byte(self, byte: u8) -> Self { self.absorb(&[byte]) }

    pub(crate) fn finalize(self) -> Squeeze<S::Reader> {
        Squeeze { reader: self.state.finalize_xof() }
    }
}


/// Squeezing half of a sponge. Successive calls continue the same output stream.
pub(crate) struct Squeeze<R> {
    reader: R,
}

impl<R: XofReader> Squeeze<R> {
    pub(crate) fn squeeze(&mut self, out: &mut [u8]) { self.reader.read(out); }

    pub(crate) fn squeeze_array<const LEN: usize>(&mut self) -> [u8; LEN] {
        let mut out = [0u8; LEN];
        self.reader.read(&mut out);
        out
    }
}


/// `H`: SHAKE256 over the concatenation of `fields`.
pub(crate) fn h256(fields: &[&[u8]]) -> Squeeze<<Shake256 as ExtendableOutput>::Reader> {
    fields.iter().fold(Absorb::<Shake256>::new(), |s, f| s.absorb(f)).finalize()
}


/// `G`: SHAKE128 over the concatenation of `fields`.
pub(crate) fn h128(fields: &[&[u8]]) -> Squeeze<<Shake128 as ExtendableOutput>::Reader> {
    fields.iter().fold(Absorb::<Shake128>::new(), |s, f| s.absorb(f)).finalize()
}
