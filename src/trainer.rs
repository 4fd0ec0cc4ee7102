//! # DQN Trainer
//!
//! The [`Trainer`] owns the online network, its target copy, the optimizer and
//! the replay buffer, and drives one interaction step at a time:
//!
//! 1. the caller asks [`Trainer::choose_action`] for an action,
//! 2. steps its environment and hands the outcome to [`Trainer::push`],
//! 3. calls [`Trainer::optimize`] (or [`Trainer::train_step`]).
//!
//! A single step counter, advanced by `choose_action`, drives both the
//! epsilon schedule and the periodic gradient/target-sync triggers.
//!
//! ```rust
//! use tdq::action_space::Discrete;
//! use tdq::config::TrainerConfig;
//! use tdq::network::NeuralNetwork;
//! use tdq::trainer::Trainer;
//! use ndarray::array;
//!
//! let config = TrainerConfig::builder().batch_size(2).seed(1).build().unwrap();
//! let network = NeuralNetwork::q_network(&[2, 16, 2]).unwrap();
//! let mut trainer = Trainer::new(config, Discrete::with_seed(2, 1).unwrap(), network).unwrap();
//!
//! let state = array![0.1, -0.2];
//! let action = trainer.choose_action(state.view()).unwrap();
//! trainer.push(state, action, array![0.2, -0.1], 1.0, false).unwrap();
//!
//! // Not enough transitions for a batch of two yet.
//! assert!(trainer.optimize(false).unwrap().is_none());
//! ```

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::action_space::ActionSpace;
use crate::config::TrainerConfig;
use crate::error::{DqnError, Result};
use crate::loss::{Loss, MeanSquaredError};
use crate::network::QNetwork;
use crate::optimizer::{GradientClipper, Optimizer, OptimizerWrapper};
use crate::replay_buffer::{ReplayBuffer, Transition};

/// Outcome of a gradient step that was not skipped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrainStep {
    pub loss: f32,
    /// The target network was resynchronized right after the step.
    pub target_synced: bool,
}

/// Index of the largest value, first one on ties. NaN never wins.
pub fn argmax(values: ArrayView1<f32>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        let better = match best {
            None => true,
            Some((_, b)) => v > b || (b.is_nan() && !v.is_nan()),
        };
        if better {
            best = Some((i, v));
        }
    }
    best.map(|(i, _)| i)
}

/// Like `f32::max`, but a NaN on either side wins.
fn nan_max(a: f32, b: f32) -> f32 {
    if a.is_nan() || b.is_nan() {
        f32::NAN
    } else {
        a.max(b)
    }
}

/// `reward + gamma * bootstrap` for live transitions, `reward` alone for terminal ones.
pub fn td_targets(
    rewards: ArrayView1<f32>,
    dones: &[bool],
    bootstrap: ArrayView1<f32>,
    gamma: f32,
) -> Result<Array1<f32>> {
    if rewards.len() != dones.len() || rewards.len() != bootstrap.len() {
        return Err(DqnError::dimension_mismatch(
            format!("{} rewards, dones and bootstrap values", rewards.len()),
            format!("{} dones and {} bootstrap values", dones.len(), bootstrap.len()),
        ));
    }
    Ok(rewards
        .iter()
        .zip(dones)
        .zip(bootstrap.iter())
        .map(|((&reward, &done), &next)| if done { reward } else { reward + gamma * next })
        .collect())
}

pub struct Trainer<N: QNetwork, A: ActionSpace> {
    config: TrainerConfig,
    action_space: A,
    online: N,
    target: N,
    optimizer: OptimizerWrapper,
    clipper: GradientClipper,
    replay: ReplayBuffer,
    steps: usize,
    rng: StdRng,
}

impl<N: QNetwork, A: ActionSpace> Trainer<N, A> {
    /// Validate `config`, build the replay buffer and the optimizer, and clone
    /// `network` into the target network.
    pub fn new(config: TrainerConfig, action_space: A, network: N) -> Result<Self> {
        config.validate()?;
        if network.num_actions() == 0 {
            return Err(DqnError::invalid_configuration("network", "network produces no action values"));
        }
        if action_space.num_actions() != network.num_actions() {
            return Err(DqnError::dimension_mismatch(
                format!("{} actions", network.num_actions()),
                format!("{} actions in the action space", action_space.num_actions()),
            ));
        }

        let replay = ReplayBuffer::new(config.replay_capacity)?;
        let optimizer = OptimizerWrapper::from_kind(config.optimizer, config.lr);
        let clipper = GradientClipper::symmetric(config.grad_clip);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let target = network.clone();

        info!(
            input_size = network.input_size(),
            num_actions = network.num_actions(),
            replay_capacity = config.replay_capacity,
            batch_size = config.batch_size,
            double = config.double,
            "trainer initialized"
        );

        Ok(Trainer {
            config,
            action_space,
            online: network,
            target,
            optimizer,
            clipper,
            replay,
            steps: 0,
            rng,
        })
    }

    /// Replace the optimizer built from the configuration.
    pub fn with_optimizer(mut self, optimizer: OptimizerWrapper) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Number of `choose_action` calls so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Exploration probability for the next `choose_action` call.
    pub fn epsilon(&self) -> f32 {
        self.config.eps.threshold(self.steps)
    }

    pub fn online_network(&self) -> &N {
        &self.online
    }

    pub fn online_network_mut(&mut self) -> &mut N {
        &mut self.online
    }

    pub fn target_network(&self) -> &N {
        &self.target
    }

    pub fn optimizer(&self) -> &OptimizerWrapper {
        &self.optimizer
    }

    pub fn replay(&self) -> &ReplayBuffer {
        &self.replay
    }

    pub fn replay_mut(&mut self) -> &mut ReplayBuffer {
        &mut self.replay
    }

    fn check_observation(&self, len: usize) -> Result<()> {
        if len != self.online.input_size() {
            return Err(DqnError::dimension_mismatch(
                format!("observation of length {}", self.online.input_size()),
                format!("observation of length {}", len),
            ));
        }
        Ok(())
    }

    /// Store a transition after checking it against the network's shapes.
    pub fn push(
        &mut self,
        state: Array1<f32>,
        action: usize,
        next_state: Array1<f32>,
        reward: f32,
        done: bool,
    ) -> Result<()> {
        self.check_observation(state.len())?;
        self.check_observation(next_state.len())?;
        if action >= self.online.num_actions() {
            return Err(DqnError::InvalidAction {
                action,
                max_actions: self.online.num_actions(),
            });
        }
        self.replay.push(Transition::new(state, action, next_state, reward, done));
        Ok(())
    }

    /// Action with the highest online-network value for `observation`.
    pub fn greedy_action(&self, observation: ArrayView1<f32>) -> Result<usize> {
        let q_values = self.online.forward(observation)?;
        argmax(q_values.view()).ok_or_else(|| DqnError::NumericalError("no action values".to_string()))
    }

    /// Epsilon-greedy action selection.
    ///
    /// With probability [`Trainer::epsilon`] a random action is drawn from the
    /// action space, otherwise the greedy action is returned. Every successful
    /// call advances the step counter by one.
    pub fn choose_action(&mut self, observation: ArrayView1<f32>) -> Result<usize> {
        self.check_observation(observation.len())?;
        let threshold = self.epsilon();
        let action = if self.rng.gen::<f32>() < threshold {
            let action = self.action_space.sample_action();
            if action >= self.online.num_actions() {
                return Err(DqnError::InvalidAction {
                    action,
                    max_actions: self.online.num_actions(),
                });
            }
            action
        } else {
            self.greedy_action(observation)?
        };
        self.steps += 1;
        Ok(action)
    }

    /// Value of the next states used in the TD target.
    ///
    /// Vanilla DQN takes the target network's maximum. Double DQN selects the
    /// action with the online network and reads its value from the target
    /// network.
    pub fn bootstrap_values(&self, next_states: ArrayView2<f32>, use_double: bool) -> Result<Array1<f32>> {
        let target_q = self.target.forward_batch(next_states)?;
        if !use_double {
            return Ok(target_q
                .rows()
                .into_iter()
                .map(|row| row.iter().copied().fold(f32::NEG_INFINITY, nan_max))
                .collect());
        }

        let online_q = self.online.forward_batch(next_states)?;
        online_q
            .rows()
            .into_iter()
            .zip(target_q.rows())
            .map(|(online_row, target_row)| {
                argmax(online_row)
                    .map(|best| target_row[best])
                    .ok_or_else(|| DqnError::NumericalError("no action values".to_string()))
            })
            .collect()
    }

    /// One gradient step on a sampled minibatch, if due.
    ///
    /// Returns `Ok(None)` without touching any state when the step counter is
    /// not a multiple of `train_interval` or the buffer holds fewer than
    /// `batch_size` transitions.
    pub fn optimize(&mut self, use_double: bool) -> Result<Option<TrainStep>> {
        if self.steps % self.config.train_interval != 0 {
            return Ok(None);
        }
        if self.replay.len() < self.config.batch_size {
            return Ok(None);
        }

        let batch = self.replay.sample(self.config.batch_size, &mut self.rng)?;

        let q_values = self.online.forward_batch(batch.states.view())?;
        let num_actions = q_values.ncols();
        let mut current_q = Array1::zeros(batch.len());
        for (i, &action) in batch.actions.iter().enumerate() {
            if action >= num_actions {
                return Err(DqnError::InvalidAction {
                    action,
                    max_actions: num_actions,
                });
            }
            current_q[i] = q_values[[i, action]];
        }

        let bootstrap = self.bootstrap_values(batch.next_states.view(), use_double)?;
        let targets = td_targets(batch.rewards.view(), &batch.dones, bootstrap.view(), self.config.gamma)?;

        let loss = MeanSquaredError.compute(current_q.view(), targets.view())?;
        let q_gradient = MeanSquaredError.gradient(current_q.view(), targets.view())?;

        // Only the taken action's output receives error.
        let mut output_errors = Array2::zeros(q_values.raw_dim());
        for (i, &action) in batch.actions.iter().enumerate() {
            output_errors[[i, action]] = q_gradient[i];
        }

        let mut gradients = self.online.gradients(batch.states.view(), output_errors.view())?;
        self.clipper.clip(&mut gradients);
        {
            let mut parameters = self.online.parameters_mut();
            self.optimizer.step(&mut parameters, &gradients)?;
        }

        if !loss.is_finite() {
            warn!(step = self.steps, loss, "non-finite TD loss");
        }

        let target_synced = self.steps % self.config.target_update_interval == 0;
        if target_synced {
            self.update_target_net()?;
        }

        debug!(step = self.steps, loss, double = use_double, target_synced, "gradient step");
        Ok(Some(TrainStep { loss, target_synced }))
    }

    /// [`Trainer::optimize`] with the configured `double` flag.
    pub fn train_step(&mut self) -> Result<Option<TrainStep>> {
        let use_double = self.config.double;
        self.optimize(use_double)
    }

    /// Hard-copy every online parameter into the target network.
    pub fn update_target_net(&mut self) -> Result<()> {
        self.target.copy_parameters_from(&self.online)?;
        info!(step = self.steps, "target network synchronized");
        Ok(())
    }
}
