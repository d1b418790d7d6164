//! Continuous sampling helpers shared by scenario building and the crowd.

use rand::Rng;

/// `low + (high - low) * u` with `u` in `[0, 1)`; tolerates `low >= high`.
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    low + (high - low) * rng.gen::<f64>()
}
