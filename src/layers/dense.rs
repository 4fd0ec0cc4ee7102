use ndarray::{Array1, Array2, ArrayView2, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activations::Activation;
use crate::error::{DqnError, Result};

/// A fully connected (dense) layer: `activation(inputs · weights + biases)`.
///
/// The layer keeps no per-call state; the pre-activations needed for
/// backpropagation are returned to the caller by [`DenseLayer::pre_activation`]
/// and handed back to [`DenseLayer::backward_batch`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DenseLayer {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    pub activation: Activation,
}

impl DenseLayer {
    /// Create a new dense layer with the given input size, output size, and activation function.
    /// The weights are initialized with random values from a uniform distribution
    /// between -0.1 and 0.1. The biases are initialized with zeros.
    pub fn new(input_size: usize, output_size: usize, activation: Activation) -> Self {
        Self::new_with_rng(input_size, output_size, activation, &mut rand::thread_rng())
    }

    /// Same as [`DenseLayer::new`] but draws the initial weights from `rng`.
    pub fn new_with_rng<R: Rng>(
        input_size: usize,
        output_size: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Self {
        let weights = Array2::random_using((input_size, output_size), Uniform::new(-0.1, 0.1), rng);
        let biases = Array1::zeros(output_size);
        DenseLayer {
            weights,
            biases,
            activation,
        }
    }

    pub fn with_weights(mut self, weights: Array2<f32>) -> Result<Self> {
        if weights.dim() != self.weights.dim() {
            return Err(DqnError::dimension_mismatch(
                format!("weights {:?}", self.weights.dim()),
                format!("weights {:?}", weights.dim()),
            ));
        }
        self.weights = weights;
        Ok(self)
    }

    pub fn with_biases(mut self, biases: Array1<f32>) -> Result<Self> {
        if biases.dim() != self.biases.dim() {
            return Err(DqnError::dimension_mismatch(
                format!("biases ({},)", self.biases.len()),
                format!("biases ({},)", biases.len()),
            ));
        }
        self.biases = biases;
        Ok(self)
    }

    pub fn input_size(&self) -> usize {
        self.weights.nrows()
    }

    pub fn output_size(&self) -> usize {
        self.weights.ncols()
    }

    /// `inputs · weights + biases` for a batch, before the activation is applied.
    pub fn pre_activation(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        inputs.dot(&self.weights) + &self.biases
    }

    /// Forward pass for a batch of input rows.
    pub fn forward_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut outputs = self.pre_activation(inputs);
        self.activation.apply_batch(&mut outputs);
        outputs
    }

    /// Backward pass for a batch.
    ///
    /// `output_errors` is dLoss/dOutput for every row. Returns the error
    /// propagated to the layer inputs together with the weight and bias
    /// gradients, summed over the batch.
    pub fn backward_batch(
        &self,
        inputs: ArrayView2<f32>,
        pre_activation: ArrayView2<f32>,
        output_errors: ArrayView2<f32>,
    ) -> (Array2<f32>, Array2<f32>, Array1<f32>) {
        let adjusted_error = &output_errors * &self.activation.derivative_batch(pre_activation);
        let weight_gradients = inputs.t().dot(&adjusted_error);
        let bias_gradients = adjusted_error.sum_axis(Axis(0));
        let input_error = adjusted_error.dot(&self.weights.t());
        (input_error, weight_gradients, bias_gradients)
    }
}
