//! Optional display jitter for demo output
//!
//! Historical variants of this pipeline mixed uniform randomness
//! directly into the final numeric fields, which destroys determinism
//! and testability. Jitter is therefore an explicitly separate
//! component: seeded, injectable, and disabled unless configured. It is
//! never part of the core math.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded jitter source for display fields
pub struct ResultJitter {
    rng: StdRng,
}

impl ResultJitter {
    /// Create a jitter source from an explicit seed
    ///
    /// The same seed always produces the same perturbation sequence.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Perturb a value by a uniform offset in [-amplitude, amplitude]
    ///
    /// Callers re-apply their own clamps afterwards; jitter never gets
    /// to violate a field's documented range.
    pub fn perturb(&mut self, value: f64, amplitude: f64) -> f64 {
        if amplitude <= 0.0 {
            return value;
        }
        value + self.rng.gen_range(-amplitude..=amplitude)
    }
}
