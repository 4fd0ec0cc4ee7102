use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{DqnError, Result};

/// The environment's action space, as far as the trainer needs it.
///
/// The trainer only draws uniformly random actions from it during
/// exploration; stepping and resetting the environment stay with the caller.
pub trait ActionSpace {
    fn num_actions(&self) -> usize;

    /// A uniformly random action in `0..num_actions()`.
    fn sample_action(&mut self) -> usize;
}

impl<T: ActionSpace + ?Sized> ActionSpace for Box<T> {
    fn num_actions(&self) -> usize {
        (**self).num_actions()
    }

    fn sample_action(&mut self) -> usize {
        (**self).sample_action()
    }
}

/// `n` discrete actions sampled with an owned RNG.
#[derive(Clone, Debug)]
pub struct Discrete {
    n: usize,
    rng: StdRng,
}

impl Discrete {
    pub fn new(n: usize) -> Result<Self> {
        Self::build(n, StdRng::from_entropy())
    }

    pub fn with_seed(n: usize, seed: u64) -> Result<Self> {
        Self::build(n, StdRng::seed_from_u64(seed))
    }

    fn build(n: usize, rng: StdRng) -> Result<Self> {
        if n == 0 {
            return Err(DqnError::invalid_configuration(
                "num_actions",
                "action space must contain at least one action",
            ));
        }
        Ok(Discrete { n, rng })
    }
}

impl ActionSpace for Discrete {
    fn num_actions(&self) -> usize {
        self.n
    }

    fn sample_action(&mut self) -> usize {
        self.rng.gen_range(0..self.n)
    }
}
