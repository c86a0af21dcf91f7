// Fixed-size vectors and matrices of ring elements. Sizes are const generics so everything
// lives on the stack.

use subtle::Choice;

use crate::ntt::{inv_ntt, ntt};
use crate::types::{MontNttPoly, NttPoly, Poly};


pub(crate) fn ntt_vec<const M: usize>(v: &[Poly; M]) -> [NttPoly; M] { core::array::from_fn(|i| ntt(&v[i])) }


pub(crate) fn inv_ntt_vec<const M: usize>(v_hat: &[NttPoly; M]) -> [Poly; M] {
    core::array::from_fn(|i| inv_ntt(&v_hat[i]))
}


/// Applies `f` to every coefficient.
pub(crate) fn map_vec<const M: usize>(v: &[Poly; M], f: impl Fn(i32) -> i32) -> [Poly; M] {
    core::array::from_fn(|i| v[i].map(&f))
}


/// Applies `f` to every pair of matching coefficients.
pub(crate) fn zip_vec<const M: usize>(a: &[Poly; M], b: &[Poly; M], f: impl Fn(i32, i32) -> i32) -> [Poly; M] {
    core::array::from_fn(|i| a[i].zip(&b[i], &f))
}


pub(crate) fn add_vec<const M: usize>(a: &[Poly; M], b: &[Poly; M]) -> [Poly; M] {
    core::array::from_fn(|i| a[i].add(&b[i]))
}


pub(crate) fn sub_vec<const M: usize>(a: &[Poly; M], b: &[Poly; M]) -> [Poly; M] {
    core::array::from_fn(|i| a[i].sub(&b[i]))
}


/// Canonical `[0, Q)` to centered coefficients.
pub(crate) fn center_vec<const M: usize>(v: &[Poly; M]) -> [Poly; M] { core::array::from_fn(|i| v[i].center()) }


/// # Algorithm 48 `MatrixVectorNTT(M_hat, v_hat)`
/// `w_hat[i] = sum_j A_hat[i][j] * v_hat[j]`
pub(crate) fn mat_vec_mul<const K: usize, const L: usize>(
    a_hat: &[[MontNttPoly; L]; K], v_hat: &[NttPoly; L],
) -> [NttPoly; K] {
    core::array::from_fn(|i| {
        (1..L).fold(v_hat[0].mul(&a_hat[i][0]), |acc, j| acc.add(&v_hat[j].mul(&a_hat[i][j])))
    })
}


/// # Algorithm 47 `ScalarVectorNTT(c_hat, v_hat)`
pub(crate) fn mul_vec<const M: usize>(c_hat: &NttPoly, v_hat: &[MontNttPoly; M]) -> [NttPoly; M] {
    core::array::from_fn(|i| c_hat.mul(&v_hat[i]))
}


pub(crate) fn sub_ntt_vec<const M: usize>(a: &[NttPoly; M], b: &[NttPoly; M]) -> [NttPoly; M] {
    core::array::from_fn(|i| a[i].sub(&b[i]))
}


pub(crate) fn to_mont_vec<const M: usize>(v_hat: &[NttPoly; M]) -> [MontNttPoly; M] {
    core::array::from_fn(|i| v_hat[i].to_mont())
}


/// Set when any centered coefficient has `|x| >= bound`. Every coefficient is visited and no
/// branch depends on the data.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn exceeds_bound<const M: usize>(v: &[Poly; M], bound: i32) -> Choice {
    let mut acc = 0i32;
    for x in v.iter().flat_map(|p| p.0.iter()) {
        let sign = x >> 31;
        let abs = (x ^ sign) - sign;
        acc |= (bound - 1 - abs) >> 31;
    }
    Choice::from((acc & 1) as u8)
}


/// Infinity norm of centered coefficients.
#[cfg(test)]
pub(crate) fn infinity_norm<const M: usize>(v: &[Poly; M]) -> i32 {
    v.iter().flat_map(|p| p.0.iter()).map(|x| x.abs()).max().unwrap_or(0)
}


/// Number of non-zero coefficients in a hint vector.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn count_ones<const M: usize>(h: &[Poly; M]) -> u32 {
    h.iter().flat_map(|p| p.0.iter()).map(|&x| x as u32).sum()
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::{N, Q};
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_exceeds_bound() {
        let mut v = [Poly::ZERO; 3];
        v[1].0[7] = 99;
        assert!(!bool::from(exceeds_bound(&v, 100)));
        assert!(bool::from(exceeds_bound(&v, 99)));
        v[2].0[255] = -100;
        assert!(bool::from(exceeds_bound(&v, 100)));
        assert!(!bool::from(exceeds_bound(&v, 101)));
        assert_eq!(infinity_norm(&v), 100);

        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            let v: [Poly; 2] = core::array::from_fn(|_| Poly(core::array::from_fn(|_| rng.gen_range(-5000..5000))));
            let bound = rng.gen_range(1..6000);
            assert_eq!(bool::from(exceeds_bound(&v, bound)), infinity_norm(&v) >= bound);
        }
    }

    #[test]
    fn test_mat_vec_mul_linear() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(8);
        let a: [[Poly; 3]; 2] =
            core::array::from_fn(|_| core::array::from_fn(|_| Poly(core::array::from_fn(|_| rng.gen_range(0..Q)))));
        let u: [Poly; 3] = core::array::from_fn(|_| Poly(core::array::from_fn(|_| rng.gen_range(-100..100))));
        let v: [Poly; 3] = core::array::from_fn(|_| Poly(core::array::from_fn(|_| rng.gen_range(-100..100))));
        let a_hat: [[MontNttPoly; 3]; 2] = core::array::from_fn(|i| to_mont_vec(&ntt_vec(&a[i])));

        let au = inv_ntt_vec(&mat_vec_mul(&a_hat, &ntt_vec(&u)));
        let av = inv_ntt_vec(&mat_vec_mul(&a_hat, &ntt_vec(&v)));
        let auv = inv_ntt_vec(&mat_vec_mul(&a_hat, &ntt_vec(&add_vec(&u, &v))));
        assert_eq!(auv, map_vec(&add_vec(&au, &av), crate::reduce::freeze));

        // With u = (1, 0, 0) the product selects the first column of A.
        let mut e = [Poly::ZERO; 3];
        e[0].0[0] = 1;
        let col = inv_ntt_vec(&mat_vec_mul(&a_hat, &ntt_vec(&e)));
        assert_eq!(col, [a[0][0], a[1][0]]);
    }

    #[test]
    fn test_count_ones() {
        let mut h = [Poly::ZERO; 4];
        h[0].0[0] = 1;
        h[3].0[N - 1] = 1;
        h[2].0[9] = 1;
        assert_eq!(count_ones(&h), 3);
        assert_eq!(sub_vec(&h, &h), [Poly::ZERO; 4]);
        assert_eq!(center_vec(&map_vec(&h, |x| (Q - x) % Q)), map_vec(&h, |x| -x));
    }
}
