//! Full-precision arithmetic helpers.
//!
//! Domain quantities are `u128`; intermediate products are computed in
//! `U256` so that scaling never overflows before the division.

mod wide;

pub use wide::{isqrt, mul_div, sqrt_product};
