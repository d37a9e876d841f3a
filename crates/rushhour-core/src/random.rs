//! Uniform random source used by navigation.
//!
//! The simulation draws from a seedable [`rand_chacha::ChaCha8Rng`]; any
//! [`rand::RngCore`] works through the blanket impl. Tests substitute a
//! scripted source to force specific gate and brake outcomes.

use rand::{Rng, RngCore};

/// Integer and real uniform draws.
pub trait RandomSource {
    /// Integer in `[0, n)`. Returns 0 when `n == 0`.
    fn below(&mut self, n: u32) -> u32;

    /// Real in `[0, 1)`.
    fn unit(&mut self) -> f32;
}

impl<R: RngCore + ?Sized> RandomSource for R {
    fn below(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.gen_range(0..n)
        }
    }

    fn unit(&mut self) -> f32 {
        self.gen::<f32>()
    }
}
