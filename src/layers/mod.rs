//! Layers used to build the Q-value function approximator.

pub mod dense;

pub use dense::DenseLayer;
