use crate::reduce::{center, mont_reduce, reduce32, to_mont};
use crate::N;
use zeroize::{Zeroize, ZeroizeOnDrop};


/// Ring element in the standard (coefficient) domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Zeroize)]
pub(crate) struct Poly(pub(crate) [i32; N]);

/// Ring element in the NTT domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Zeroize)]
pub(crate) struct NttPoly(pub(crate) [i32; N]);

/// NTT-domain element carrying an extra factor of 2^32, the long-lived operand of a pointwise
/// product so that `NttPoly::mul` stays exact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Zeroize)]
pub(crate) struct MontNttPoly(pub(crate) [i32; N]);


#[allow(clippy::should_implement_trait)]
impl Poly {
    pub(crate) const ZERO: Self = Self([0; N]);

    pub(crate) fn map(&self, f: impl Fn(i32) -> i32) -> Self {
        Self(core::array::from_fn(|n| f(self.0[n])))
    }

    pub(crate) fn zip(&self, other: &Self, f: impl Fn(i32, i32) -> i32) -> Self {
        Self(core::array::from_fn(|n| f(self.0[n], other.0[n])))
    }

    pub(crate) fn add(&self, other: &Self) -> Self { self.zip(other, |a, b| a + b) }

    pub(crate) fn sub(&self, other: &Self) -> Self { self.zip(other, |a, b| a - b) }

    /// Expects canonical input.
    pub(crate) fn center(&self) -> Self { self.map(center) }
}


#[allow(clippy::should_implement_trait)]
impl NttPoly {
    pub(crate) fn to_mont(&self) -> MontNttPoly { MontNttPoly(core::array::from_fn(|n| to_mont(self.0[n]))) }

    /// Pointwise product; the result is exact, in `(-Q, Q)`.
    pub(crate) fn mul(&self, other: &MontNttPoly) -> Self {
        Self(core::array::from_fn(|n| mont_reduce(i64::from(self.0[n]) * i64::from(other.0[n]))))
    }

    pub(crate) fn add(&self, other: &Self) -> Self {
        Self(core::array::from_fn(|n| reduce32(self.0[n] + other.0[n])))
    }

    pub(crate) fn sub(&self, other: &Self) -> Self {
        Self(core::array::from_fn(|n| reduce32(self.0[n] - other.0[n])))
    }
}


/// Per-set scalar parameters. Sizes stay const generics on the functions taking this.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ParamSet {
    pub(crate) tau: usize,
    pub(crate) eta: i32,
    pub(crate) beta: i32,
    pub(crate) gamma1: i32,
    pub(crate) gamma2: i32,
    pub(crate) omega: usize,
}


/// Private key specific to a parameter set. It carries NTT-domain copies of the secret vectors
/// so that repeated signing skips those transforms. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey<const K: usize, const L: usize> {
    pub(crate) rho: [u8; 32],
    pub(crate) cap_k: [u8; 32],
    pub(crate) tr: [u8; 64],
    pub(crate) s1: [Poly; L],
    pub(crate) s2: [Poly; K],
    pub(crate) t0: [Poly; K],
    pub(crate) s1_hat: [MontNttPoly; L],
    pub(crate) s2_hat: [MontNttPoly; K],
    pub(crate) t0_hat: [MontNttPoly; K],
}


/// Public key specific to a parameter set, with `NTT(t1 * 2^d)` precomputed for verification.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PublicKey<const K: usize> {
    pub(crate) rho: [u8; 32],
    pub(crate) tr: [u8; 64],
    pub(crate) t1: [Poly; K],
    pub(crate) t1_d2_hat: [MontNttPoly; K],
}
