//! # Optimizers
//!
//! An optimizer consumes the gradients of a network's parameters and updates
//! the parameters in place. Parameters and gradients travel as the ordered
//! dynamic-dimensional views exposed by [`QNetwork`](crate::network::QNetwork).

pub mod gradient_clipper;

use ndarray::{ArrayD, ArrayViewMutD, Zip};
use serde::{Deserialize, Serialize};

use crate::error::{DqnError, Result};

pub use gradient_clipper::GradientClipper;

pub trait Optimizer {
    /// Apply one update to `parameters` using `gradients` (same order, same shapes).
    fn step(&mut self, parameters: &mut [ArrayViewMutD<'_, f32>], gradients: &[ArrayD<f32>]) -> Result<()>;

    fn learning_rate(&self) -> f32;
}

fn check_shapes(parameters: &[ArrayViewMutD<'_, f32>], gradients: &[ArrayD<f32>]) -> Result<()> {
    if parameters.len() != gradients.len() {
        return Err(DqnError::dimension_mismatch(
            format!("{} gradient tensors", parameters.len()),
            format!("{} gradient tensors", gradients.len()),
        ));
    }
    for (param, grad) in parameters.iter().zip(gradients) {
        if param.shape() != grad.shape() {
            return Err(DqnError::dimension_mismatch(
                format!("gradient {:?}", param.shape()),
                format!("gradient {:?}", grad.shape()),
            ));
        }
    }
    Ok(())
}

/// Which optimizer a trainer builds from its configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    #[default]
    Adam,
    Sgd,
}

#[derive(Clone, Debug)]
pub enum OptimizerWrapper {
    SGD(SGD),
    Adam(Adam),
}

impl OptimizerWrapper {
    pub fn from_kind(kind: OptimizerKind, learning_rate: f32) -> Self {
        match kind {
            OptimizerKind::Adam => OptimizerWrapper::Adam(Adam::with_learning_rate(learning_rate)),
            OptimizerKind::Sgd => OptimizerWrapper::SGD(SGD::new(learning_rate)),
        }
    }
}

impl Optimizer for OptimizerWrapper {
    fn step(&mut self, parameters: &mut [ArrayViewMutD<'_, f32>], gradients: &[ArrayD<f32>]) -> Result<()> {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.step(parameters, gradients),
            OptimizerWrapper::Adam(optimizer) => optimizer.step(parameters, gradients),
        }
    }

    fn learning_rate(&self) -> f32 {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.learning_rate(),
            OptimizerWrapper::Adam(optimizer) => optimizer.learning_rate(),
        }
    }
}

/// Plain stochastic gradient descent.
#[derive(Clone, Debug)]
pub struct SGD {
    pub learning_rate: f32,
}

impl SGD {
    pub fn new(learning_rate: f32) -> SGD {
        SGD { learning_rate }
    }
}

impl Optimizer for SGD {
    fn step(&mut self, parameters: &mut [ArrayViewMutD<'_, f32>], gradients: &[ArrayD<f32>]) -> Result<()> {
        check_shapes(parameters, gradients)?;
        let lr = self.learning_rate;
        for (param, grad) in parameters.iter_mut().zip(gradients) {
            param.zip_mut_with(grad, |p, &g| *p -= lr * g);
        }
        Ok(())
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
}

/// Adam with bias-corrected moment estimates.
///
/// Moment buffers are allocated on the first step from the gradient shapes and
/// must keep matching afterwards.
#[derive(Clone, Debug)]
pub struct Adam {
    pub learning_rate: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    m: Vec<ArrayD<f32>>,
    v: Vec<ArrayD<f32>>,
    pub t: i32,
}

impl Adam {
    pub fn new(learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Adam {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            m: Vec::new(),
            v: Vec::new(),
            t: 0,
        }
    }

    pub fn with_learning_rate(learning_rate: f32) -> Self {
        Self::new(learning_rate, 0.9, 0.999, 1e-8)
    }

    fn ensure_state(&mut self, gradients: &[ArrayD<f32>]) -> Result<()> {
        if self.m.is_empty() {
            self.m = gradients.iter().map(|g| ArrayD::zeros(g.raw_dim())).collect();
            self.v = gradients.iter().map(|g| ArrayD::zeros(g.raw_dim())).collect();
            return Ok(());
        }
        let matches = self.m.len() == gradients.len()
            && self.m.iter().zip(gradients).all(|(m, g)| m.shape() == g.shape());
        if !matches {
            return Err(DqnError::dimension_mismatch(
                "gradients shaped like the first step".to_string(),
                format!("{} tensors with different shapes", gradients.len()),
            ));
        }
        Ok(())
    }
}

impl Optimizer for Adam {
    fn step(&mut self, parameters: &mut [ArrayViewMutD<'_, f32>], gradients: &[ArrayD<f32>]) -> Result<()> {
        check_shapes(parameters, gradients)?;
        self.ensure_state(gradients)?;
        self.t += 1;

        let (lr, beta1, beta2, eps) = (self.learning_rate, self.beta1, self.beta2, self.epsilon);
        let bias1 = 1.0 - beta1.powi(self.t);
        let bias2 = 1.0 - beta2.powi(self.t);

        for (((param, grad), m), v) in parameters
            .iter_mut()
            .zip(gradients)
            .zip(self.m.iter_mut())
            .zip(self.v.iter_mut())
        {
            Zip::from(param)
                .and(grad)
                .and(m)
                .and(v)
                .for_each(|p, &g, m, v| {
                    *m = beta1 * *m + (1.0 - beta1) * g;
                    *v = beta2 * *v + (1.0 - beta2) * g * g;
                    let m_hat = *m / bias1;
                    let v_hat = *v / bias2;
                    *p -= lr * m_hat / (v_hat.sqrt() + eps);
                });
        }
        Ok(())
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
}
