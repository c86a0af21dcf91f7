/// If the condition is not met, return the given error. Borrowed from the `anyhow` crate.
macro_rules! ensure {
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return Err($err);
        }
    };
}

pub(crate) use ensure; // make available throughout crate


/// Bit length required to express `a` in bits; `a` must be positive.
#[allow(clippy::cast_sign_loss)]
pub(crate) const fn bit_length(a: i32) -> usize {
    debug_assert!(a > 0);
    (u32::BITS - (a as u32).leading_zeros()) as usize
}
