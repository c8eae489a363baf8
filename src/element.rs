//! Numeric element types a [`Matrix`](crate::Matrix) can hold.

use std::fmt::{Debug, Display};

use rand::Rng;

/// Marker for types the active transport can move between workers.
#[cfg(feature = "mpi")]
pub trait Transferable: mpi::datatype::Equivalence {}
#[cfg(feature = "mpi")]
impl<T: mpi::datatype::Equivalence> Transferable for T {}

/// Marker for types the active transport can move between workers.
#[cfg(not(feature = "mpi"))]
pub trait Transferable {}
#[cfg(not(feature = "mpi"))]
impl<T> Transferable for T {}

pub trait Element:
    Copy + Default + PartialEq + Debug + Display + Send + Sync + Transferable + 'static
{
    /// Additive identity, the starting value of every dot product.
    fn zero() -> Self;

    /// Returns `self + a * b`. Integers wrap on overflow.
    fn mul_acc(self, a: Self, b: Self) -> Self;

    /// Uniform sample from the inclusive range `[low, high]`.
    fn sample<R: Rng + ?Sized>(rng: &mut R, low: Self, high: Self) -> Self;

    fn parse_token(token: &str) -> Option<Self>;
}

macro_rules! int_element {
    ($($t:ty),*) => {$(
        impl Element for $t {
            fn zero() -> Self {
                0
            }

            fn mul_acc(self, a: Self, b: Self) -> Self {
                self.wrapping_add(a.wrapping_mul(b))
            }

            fn sample<R: Rng + ?Sized>(rng: &mut R, low: Self, high: Self) -> Self {
                rng.gen_range(low..=high)
            }

            fn parse_token(token: &str) -> Option<Self> {
                token.parse().ok()
            }
        }
    )*};
}

macro_rules! float_element {
    ($($t:ty),*) => {$(
        impl Element for $t {
            fn zero() -> Self {
                0.0
            }

            fn mul_acc(self, a: Self, b: Self) -> Self {
                self + a * b
            }

            fn sample<R: Rng + ?Sized>(rng: &mut R, low: Self, high: Self) -> Self {
                rng.gen_range(low..=high)
            }

            fn parse_token(token: &str) -> Option<Self> {
                token.parse().ok()
            }
        }
    )*};
}

int_element!(i32, i64, u32, u64);
float_element!(f32, f64);
