use ndarray::{stack, Array1, Array2, ArrayView1, Axis};
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{DqnError, Result};

/// One environment interaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub state: Array1<f32>,
    pub action: usize,
    pub next_state: Array1<f32>,
    pub reward: f32,
    pub done: bool,
}

impl Transition {
    pub fn new(state: Array1<f32>, action: usize, next_state: Array1<f32>, reward: f32, done: bool) -> Self {
        Transition {
            state,
            action,
            next_state,
            reward,
            done,
        }
    }
}

/// A sampled minibatch: five index-aligned columns, one row per transition.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionBatch {
    /// `[batch, state_dim]`
    pub states: Array2<f32>,
    pub actions: Vec<usize>,
    /// `[batch, state_dim]`
    pub next_states: Array2<f32>,
    pub rewards: Array1<f32>,
    pub dones: Vec<bool>,
}

impl TransitionBatch {
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Fixed-capacity experience replay.
///
/// Storage grows until it reaches `capacity`; from then on each push
/// overwrites the slot under the write cursor and advances the cursor modulo
/// `capacity`, so slots are recycled in insertion order.
///
/// The buffer has no internal locking. Feeding it from several producers
/// requires wrapping it in a mutex.
#[derive(Clone, Debug)]
pub struct ReplayBuffer {
    storage: Vec<Transition>,
    capacity: usize,
    write_index: usize,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(DqnError::invalid_configuration(
                "replay_capacity",
                "must be greater than 0",
            ));
        }
        Ok(ReplayBuffer {
            storage: Vec::with_capacity(capacity),
            capacity,
            write_index: 0,
        })
    }

    /// Insert a transition, overwriting the slot under the write cursor once full.
    pub fn push(&mut self, transition: Transition) {
        if self.storage.len() < self.capacity {
            self.storage.push(transition);
        } else {
            self.storage[self.write_index] = transition;
        }
        self.write_index = (self.write_index + 1) % self.capacity;
    }

    /// Draw `batch_size` distinct transitions uniformly at random, without
    /// replacement, and stack them into a [`TransitionBatch`].
    ///
    /// Row order carries no meaning. Results are reproducible only when `rng`
    /// is seeded by the caller.
    ///
    /// A `batch_size` of zero is rejected with
    /// [`DqnError::InvalidConfiguration`], and one larger than [`len`](Self::len)
    /// with [`DqnError::InsufficientSamples`].
    pub fn sample<R: Rng + ?Sized>(&self, batch_size: usize, rng: &mut R) -> Result<TransitionBatch> {
        if batch_size == 0 {
            return Err(DqnError::invalid_configuration("batch_size", "must be greater than 0"));
        }
        if batch_size > self.storage.len() {
            return Err(DqnError::InsufficientSamples {
                requested: batch_size,
                available: self.storage.len(),
            });
        }

        let picked: Vec<&Transition> = index::sample(rng, self.storage.len(), batch_size)
            .iter()
            .map(|i| &self.storage[i])
            .collect();

        let state_dim = picked[0].state.len();
        for transition in &picked {
            for len in [transition.state.len(), transition.next_state.len()] {
                if len != state_dim {
                    return Err(DqnError::dimension_mismatch(
                        format!("states of length {}", state_dim),
                        format!("states of length {}", len),
                    ));
                }
            }
        }

        let states: Vec<ArrayView1<f32>> = picked.iter().map(|t| t.state.view()).collect();
        let next_states: Vec<ArrayView1<f32>> = picked.iter().map(|t| t.next_state.view()).collect();

        Ok(TransitionBatch {
            states: stack(Axis(0), &states)?,
            actions: picked.iter().map(|t| t.action).collect(),
            next_states: stack(Axis(0), &next_states)?,
            rewards: picked.iter().map(|t| t.reward).collect(),
            dones: picked.iter().map(|t| t.done).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slot the next push will write to.
    pub fn write_index(&self) -> usize {
        self.write_index
    }

    pub fn get(&self, slot: usize) -> Option<&Transition> {
        self.storage.get(slot)
    }

    /// Stored transitions in slot order (not insertion order once wrapped).
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.storage.iter()
    }
}
