//! # Activation Functions
//!
//! Elementwise non-linearities applied by [`DenseLayer`](crate::layers::DenseLayer).
//! A Q-network uses a non-linear activation on its hidden layers and
//! [`Activation::Linear`] on the output layer, since action values are unbounded.

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// An enumeration of the activation functions a dense layer can apply.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum Activation {
    #[default]
    Relu,
    Linear,
    Tanh,
    LeakyRelu { alpha: f32 },
}

impl Activation {
    #[inline]
    fn value(&self, v: f32) -> f32 {
        match *self {
            Activation::Relu => v.max(0.0),
            Activation::Linear => v,
            Activation::Tanh => v.tanh(),
            Activation::LeakyRelu { alpha } => {
                if v > 0.0 {
                    v
                } else {
                    alpha * v
                }
            }
        }
    }

    #[inline]
    fn slope(&self, v: f32) -> f32 {
        match *self {
            Activation::Relu => {
                if v > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::Linear => 1.0,
            Activation::Tanh => {
                let t = v.tanh();
                1.0 - t * t
            }
            Activation::LeakyRelu { alpha } => {
                if v > 0.0 {
                    1.0
                } else {
                    alpha
                }
            }
        }
    }

    /// Apply the activation to a batch of pre-activations in-place.
    pub fn apply_batch(&self, inputs: &mut Array2<f32>) {
        if *self != Activation::Linear {
            inputs.mapv_inplace(|v| self.value(v));
        }
    }

    /// Derivative of the activation evaluated at the given pre-activations.
    pub fn derivative_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        match self {
            Activation::Linear => Array2::ones(inputs.dim()),
            _ => inputs.mapv(|v| self.slope(v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_relu_clamps_negatives() {
        let mut x = array![[-1.0, 0.0, 2.5]];
        Activation::Relu.apply_batch(&mut x);
        assert_eq!(x, array![[0.0, 0.0, 2.5]]);
        let d = Activation::Relu.derivative_batch(array![[-1.0, 0.0, 2.5]].view());
        assert_eq!(d, array![[0.0, 0.0, 1.0]]);
    }

    #[test]
    fn test_leaky_relu_slope() {
        let act = Activation::LeakyRelu { alpha: 0.1 };
        let mut x = array![[-2.0, 3.0]];
        act.apply_batch(&mut x);
        assert!((x[[0, 0]] + 0.2).abs() < 1e-6);
        assert_eq!(x[[0, 1]], 3.0);
        assert_eq!(act.derivative_batch(array![[-2.0, 3.0]].view()), array![[0.1, 1.0]]);
    }

    #[test]
    fn test_linear_is_identity() {
        let mut x = array![[-4.0, 7.0]];
        Activation::Linear.apply_batch(&mut x);
        assert_eq!(x, array![[-4.0, 7.0]]);
        assert_eq!(Activation::Linear.derivative_batch(x.view()), array![[1.0, 1.0]]);
    }

    #[test]
    fn test_tanh_derivative_at_zero() {
        let d = Activation::Tanh.derivative_batch(array![[0.0]].view());
        assert!((d[[0, 0]] - 1.0).abs() < 1e-6);
    }
}
