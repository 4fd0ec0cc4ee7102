use ndarray::{Array1, Array2, ArrayD, ArrayView1, ArrayView2, ArrayViewD, ArrayViewMutD, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::activations::Activation;
use crate::error::{DqnError, Result};
use crate::layers::DenseLayer;

/// A parameterized mapping from a batch of observations to per-action values.
///
/// This is the capability the trainer needs from a function approximator:
/// forward evaluation, gradients of the parameters for a given error on the
/// outputs, and an enumerable parameter collection. `Clone` produces a fresh
/// independent instance (used to build the target network) and
/// [`QNetwork::copy_parameters_from`] resynchronizes an existing one.
///
/// Parameters and gradients are exchanged as dynamic-dimensional arrays in the
/// same, stable order.
pub trait QNetwork: Clone {
    /// Length of an observation vector.
    fn input_size(&self) -> usize;

    /// Number of action values produced per observation.
    fn num_actions(&self) -> usize;

    /// Evaluate a `[batch, input_size]` matrix into `[batch, num_actions]` values.
    fn forward_batch(&self, inputs: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// Evaluate a single observation.
    fn forward(&self, input: ArrayView1<f32>) -> Result<Array1<f32>> {
        let outputs = self.forward_batch(input.insert_axis(Axis(0)))?;
        Ok(outputs.index_axis_move(Axis(0), 0))
    }

    /// Gradients of every parameter given `output_errors` = dLoss/dOutputs.
    fn gradients(
        &self,
        inputs: ArrayView2<f32>,
        output_errors: ArrayView2<f32>,
    ) -> Result<Vec<ArrayD<f32>>>;

    fn parameters(&self) -> Vec<ArrayViewD<'_, f32>>;

    fn parameters_mut(&mut self) -> Vec<ArrayViewMutD<'_, f32>>;

    /// Overwrite every parameter of `self` with the value held by `source`.
    ///
    /// Shapes are checked before anything is written, so a failed copy leaves
    /// `self` untouched.
    fn copy_parameters_from(&mut self, source: &Self) -> Result<()> {
        let sources = source.parameters();
        let mut targets = self.parameters_mut();
        if sources.len() != targets.len() {
            return Err(DqnError::dimension_mismatch(
                format!("{} parameter tensors", targets.len()),
                format!("{} parameter tensors", sources.len()),
            ));
        }
        for (dst, src) in targets.iter().zip(sources.iter()) {
            if dst.shape() != src.shape() {
                return Err(DqnError::dimension_mismatch(
                    format!("{:?}", dst.shape()),
                    format!("{:?}", src.shape()),
                ));
            }
        }
        for (dst, src) in targets.iter_mut().zip(sources.iter()) {
            dst.assign(src);
        }
        Ok(())
    }
}

/// A multilayer perceptron built from [`DenseLayer`]s.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NeuralNetwork {
    pub layers: Vec<DenseLayer>,
}

impl NeuralNetwork {
    /// Create a new neural network with the given layer sizes and activations.
    /// `layer_sizes` includes the input and the output layer, so there is one
    /// activation per consecutive pair of sizes.
    pub fn new(layer_sizes: &[usize], activations: &[Activation]) -> Result<Self> {
        Self::new_with_rng(layer_sizes, activations, &mut rand::thread_rng())
    }

    pub fn new_with_rng<R: Rng>(
        layer_sizes: &[usize],
        activations: &[Activation],
        rng: &mut R,
    ) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(DqnError::invalid_configuration(
                "layer_sizes",
                "must contain at least input and output sizes",
            ));
        }
        if layer_sizes.iter().any(|&size| size == 0) {
            return Err(DqnError::invalid_configuration(
                "layer_sizes",
                "every layer must have at least one unit",
            ));
        }
        if activations.len() != layer_sizes.len() - 1 {
            return Err(DqnError::invalid_configuration(
                "activations".to_string(),
                format!("expected {} activations, got {}", layer_sizes.len() - 1, activations.len()),
            ));
        }

        let layers = layer_sizes
            .windows(2)
            .zip(activations.iter())
            .map(|(window, &activation)| DenseLayer::new_with_rng(window[0], window[1], activation, rng))
            .collect();

        Ok(NeuralNetwork { layers })
    }

    /// The usual Q-network shape: ReLU on every hidden layer, linear output.
    pub fn q_network(layer_sizes: &[usize]) -> Result<Self> {
        Self::q_network_with_rng(layer_sizes, &mut rand::thread_rng())
    }

    pub fn q_network_with_rng<R: Rng>(layer_sizes: &[usize], rng: &mut R) -> Result<Self> {
        let hidden = layer_sizes.len().saturating_sub(2);
        let mut activations = vec![Activation::Relu; hidden];
        activations.push(Activation::Linear);
        Self::new_with_rng(layer_sizes, &activations, rng)
    }

    /// Assemble a network from prebuilt layers, checking that they chain.
    pub fn from_layers(layers: Vec<DenseLayer>) -> Result<Self> {
        if layers.is_empty() {
            return Err(DqnError::invalid_configuration("layers", "network needs at least one layer"));
        }
        for pair in layers.windows(2) {
            if pair[0].output_size() != pair[1].input_size() {
                return Err(DqnError::dimension_mismatch(
                    format!("layer input of {}", pair[0].output_size()),
                    format!("layer input of {}", pair[1].input_size()),
                ));
            }
        }
        Ok(NeuralNetwork { layers })
    }

    fn check_inputs(&self, inputs: &ArrayView2<f32>) -> Result<()> {
        if inputs.ncols() != self.input_size() {
            return Err(DqnError::dimension_mismatch(
                format!("observations of length {}", self.input_size()),
                format!("observations of length {}", inputs.ncols()),
            ));
        }
        Ok(())
    }

    /// Serialize the network with bincode and write it to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = bincode::serialize(self)?;
        fs::write(path, serialized)?;
        Ok(())
    }

    /// Read a network previously written by [`NeuralNetwork::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read(path)?;
        let network: Self = bincode::deserialize(&data)?;
        Self::from_layers(network.layers)
    }
}

impl QNetwork for NeuralNetwork {
    fn input_size(&self) -> usize {
        self.layers.first().map_or(0, DenseLayer::input_size)
    }

    fn num_actions(&self) -> usize {
        self.layers.last().map_or(0, DenseLayer::output_size)
    }

    fn forward_batch(&self, inputs: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_inputs(&inputs)?;
        let mut current = inputs.to_owned();
        for layer in &self.layers {
            current = layer.forward_batch(current.view());
        }
        Ok(current)
    }

    fn gradients(
        &self,
        inputs: ArrayView2<f32>,
        output_errors: ArrayView2<f32>,
    ) -> Result<Vec<ArrayD<f32>>> {
        self.check_inputs(&inputs)?;
        let expected = (inputs.nrows(), self.num_actions());
        if output_errors.dim() != expected {
            return Err(DqnError::dimension_mismatch(
                format!("output errors {:?}", expected),
                format!("output errors {:?}", output_errors.dim()),
            ));
        }

        // Forward pass, keeping what backprop needs.
        let mut layer_inputs = Vec::with_capacity(self.layers.len());
        let mut pre_activations = Vec::with_capacity(self.layers.len());
        let mut current = inputs.to_owned();
        for layer in &self.layers {
            let pre = layer.pre_activation(current.view());
            let mut output = pre.clone();
            layer.activation.apply_batch(&mut output);
            layer_inputs.push(current);
            pre_activations.push(pre);
            current = output;
        }

        let mut per_layer = Vec::with_capacity(self.layers.len());
        let mut error = output_errors.to_owned();
        for (i, layer) in self.layers.iter().enumerate().rev() {
            let (input_error, weight_gradients, bias_gradients) =
                layer.backward_batch(layer_inputs[i].view(), pre_activations[i].view(), error.view());
            per_layer.push((weight_gradients, bias_gradients));
            error = input_error;
        }
        per_layer.reverse();

        let mut gradients = Vec::with_capacity(per_layer.len() * 2);
        for (weight_gradients, bias_gradients) in per_layer {
            gradients.push(weight_gradients.into_dyn());
            gradients.push(bias_gradients.into_dyn());
        }
        Ok(gradients)
    }

    fn parameters(&self) -> Vec<ArrayViewD<'_, f32>> {
        let mut params = Vec::with_capacity(self.layers.len() * 2);
        for layer in &self.layers {
            params.push(layer.weights.view().into_dyn());
            params.push(layer.biases.view().into_dyn());
        }
        params
    }

    fn parameters_mut(&mut self) -> Vec<ArrayViewMutD<'_, f32>> {
        let mut params = Vec::with_capacity(self.layers.len() * 2);
        for layer in self.layers.iter_mut() {
            params.push(layer.weights.view_mut().into_dyn());
            params.push(layer.biases.view_mut().into_dyn());
        }
        params
    }
}
