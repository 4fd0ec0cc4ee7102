//! # tdq - DQN Training Core
//!
//! tdq implements the training side of a value-based reinforcement-learning
//! agent: an experience-replay buffer, epsilon-greedy action selection, and the
//! temporal-difference optimization step with a periodically synchronized
//! target network (vanilla or Double DQN bootstrap).
//!
//! The environment stays with the caller. The trainer only needs its action
//! space ([`action_space::ActionSpace`]) and a function approximator
//! ([`network::QNetwork`]); [`network::NeuralNetwork`] is the bundled
//! multilayer perceptron.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tdq::action_space::Discrete;
//! use tdq::config::TrainerConfig;
//! use tdq::network::NeuralNetwork;
//! use tdq::trainer::Trainer;
//! use ndarray::Array1;
//!
//! let config = TrainerConfig::builder()
//!     .replay_capacity(10_000)
//!     .batch_size(32)
//!     .epsilon(1.0, 0.05, 5_000)
//!     .target_update_interval(500)
//!     .double(true)
//!     .build()?;
//! let network = NeuralNetwork::q_network(&[4, 128, 128, 2])?;
//! let mut trainer = Trainer::new(config, Discrete::new(2)?, network)?;
//!
//! let mut state = Array1::zeros(4);
//! for _ in 0..1_000 {
//!     let action = trainer.choose_action(state.view())?;
//!     // step the environment here
//!     let (next_state, reward, done) = (Array1::zeros(4), 1.0, false);
//!     trainer.push(state, action, next_state.clone(), reward, done)?;
//!     trainer.train_step()?;
//!     state = next_state;
//! }
//! # Ok::<(), tdq::error::DqnError>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`action_space`] - Random-action capability of the environment
//! - [`activations`] - Activation functions for dense layers
//! - [`config`] - Trainer hyperparameters, JSON loading and validation
//! - [`error`] - Error types and result handling
//! - [`layers`] - Dense layer
//! - [`loss`] - Mean squared error
//! - [`network`] - Function-approximator trait and the bundled MLP
//! - [`optimizer`] - SGD, Adam and gradient clipping
//! - [`replay_buffer`] - Ring-buffer experience replay
//! - [`trainer`] - Action selection, TD optimization and target sync

#[macro_use]
pub mod macros;

pub mod action_space;
pub mod activations;
pub mod config;
pub mod error;
pub mod layers;
pub mod loss;
pub mod network;
pub mod optimizer;
pub mod replay_buffer;
pub mod trainer;

#[cfg(test)]
mod tests;
