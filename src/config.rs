//! # Trainer Configuration
//!
//! [`TrainerConfig`] gathers every hyperparameter of the training core. It can
//! be written in code, assembled with [`TrainerConfigBuilder`], or read from
//! JSON:
//!
//! ```rust
//! use tdq::config::TrainerConfig;
//!
//! let config = TrainerConfig::from_json_str(r#"{
//!     "replay_capacity": 50000,
//!     "lr": 0.0005,
//!     "eps": { "start": 1.0, "end": 0.02, "decay": 20000 },
//!     "batch_size": 64,
//!     "train_interval": 4,
//!     "gamma": 0.99,
//!     "grad_clip": 1.0,
//!     "target_update_interval": 2000,
//!     "double": true
//! }"#).unwrap();
//! assert_eq!(config.batch_size, 64);
//! ```
//!
//! Omitted keys fall back to [`TrainerConfig::default`]; unknown keys are rejected.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{DqnError, Result};
use crate::optimizer::OptimizerKind;

/// Linearly decaying exploration rate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EpsilonSchedule {
    pub start: f32,
    pub end: f32,
    /// Steps over which epsilon falls from `start` to `end`.
    pub decay: usize,
}

impl Default for EpsilonSchedule {
    fn default() -> Self {
        EpsilonSchedule {
            start: 1.0,
            end: 0.05,
            decay: 10_000,
        }
    }
}

impl EpsilonSchedule {
    /// `end + (start - end) * max(1 - step / decay, 0)`
    pub fn threshold(&self, step: usize) -> f32 {
        let remaining = (1.0 - step as f64 / self.decay as f64).max(0.0) as f32;
        self.end + (self.start - self.end) * remaining
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainerConfig {
    pub replay_capacity: usize,
    pub lr: f32,
    pub eps: EpsilonSchedule,
    pub batch_size: usize,
    /// Gradient steps are attempted only when the step counter is a multiple of this.
    pub train_interval: usize,
    pub gamma: f32,
    /// Elementwise gradient bound.
    pub grad_clip: f32,
    pub target_update_interval: usize,
    /// Double DQN bootstrap in [`Trainer::train_step`](crate::trainer::Trainer::train_step).
    pub double: bool,
    pub optimizer: OptimizerKind,
    /// Seeds the trainer's RNG (exploration draws and minibatch sampling).
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            replay_capacity: 10_000,
            lr: 1e-3,
            eps: EpsilonSchedule::default(),
            batch_size: 32,
            train_interval: 1,
            gamma: 0.99,
            grad_clip: 1.0,
            target_update_interval: 1_000,
            double: false,
            optimizer: OptimizerKind::Adam,
            seed: None,
        }
    }
}

fn positive(name: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(DqnError::invalid_configuration(name, "must be greater than 0"));
    }
    Ok(())
}

fn positive_finite(name: &str, value: f32) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DqnError::invalid_configuration(
            name.to_string(),
            format!("must be a positive finite number, got {}", value),
        ));
    }
    Ok(())
}

fn unit_interval(name: &str, value: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(DqnError::invalid_configuration(
            name.to_string(),
            format!("must lie in [0, 1], got {}", value),
        ));
    }
    Ok(())
}

impl TrainerConfig {
    pub fn builder() -> TrainerConfigBuilder {
        TrainerConfigBuilder::new()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: TrainerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the training loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        positive("replay_capacity", self.replay_capacity)?;
        positive("batch_size", self.batch_size)?;
        positive("train_interval", self.train_interval)?;
        positive("target_update_interval", self.target_update_interval)?;
        positive("eps.decay", self.eps.decay)?;
        if self.batch_size > self.replay_capacity {
            return Err(DqnError::invalid_configuration(
                "batch_size".to_string(),
                format!(
                    "{} exceeds replay_capacity {}, no batch could ever be drawn",
                    self.batch_size, self.replay_capacity
                ),
            ));
        }
        positive_finite("lr", self.lr)?;
        positive_finite("grad_clip", self.grad_clip)?;
        unit_interval("gamma", self.gamma)?;
        unit_interval("eps.start", self.eps.start)?;
        unit_interval("eps.end", self.eps.end)?;
        Ok(())
    }
}

/// Builder for [`TrainerConfig`]; [`TrainerConfigBuilder::build`] validates.
pub struct TrainerConfigBuilder {
    config: TrainerConfig,
}

impl TrainerConfigBuilder {
    pub fn new() -> Self {
        TrainerConfigBuilder {
            config: TrainerConfig::default(),
        }
    }

    pub fn replay_capacity(mut self, capacity: usize) -> Self {
        self.config.replay_capacity = capacity;
        self
    }

    pub fn lr(mut self, lr: f32) -> Self {
        self.config.lr = lr;
        self
    }

    pub fn epsilon(mut self, start: f32, end: f32, decay: usize) -> Self {
        self.config.eps = EpsilonSchedule { start, end, decay };
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    pub fn train_interval(mut self, interval: usize) -> Self {
        self.config.train_interval = interval;
        self
    }

    pub fn gamma(mut self, gamma: f32) -> Self {
        self.config.gamma = gamma;
        self
    }

    pub fn grad_clip(mut self, grad_clip: f32) -> Self {
        self.config.grad_clip = grad_clip;
        self
    }

    pub fn target_update_interval(mut self, interval: usize) -> Self {
        self.config.target_update_interval = interval;
        self
    }

    pub fn double(mut self, double: bool) -> Self {
        self.config.double = double;
        self
    }

    pub fn optimizer(mut self, kind: OptimizerKind) -> Self {
        self.config.optimizer = kind;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<TrainerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for TrainerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
