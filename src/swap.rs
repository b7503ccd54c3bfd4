//! Byte-order reversal for fixed-width scalars.
//!
//! For an N-byte value, byte `i` moves to position `N - 1 - i`. Floats are
//! reversed through their bit pattern, so NaN payloads survive.

/// Reverse the byte order of a scalar
pub trait Swap: Sized {
    fn swap_bytes(self) -> Self;
}

macro_rules! impl_swap_int {
    ($($t:ty),*) => {
        $(
            impl Swap for $t {
                #[inline]
                fn swap_bytes(self) -> Self {
                    <$t>::swap_bytes(self)
                }
            }
        )*
    };
}

impl_swap_int!(u16, i16, u32, i32, u64, i64);

impl Swap for f32 {
    #[inline]
    fn swap_bytes(self) -> Self {
        f32::from_bits(self.to_bits().swap_bytes())
    }
}

impl Swap for f64 {
    #[inline]
    fn swap_bytes(self) -> Self {
        f64::from_bits(self.to_bits().swap_bytes())
    }
}

/// Swap `value` only when `swap` is set
#[inline]
pub fn swap_if<T: Swap>(value: T, swap: bool) -> T {
    if swap {
        value.swap_bytes()
    } else {
        value
    }
}
