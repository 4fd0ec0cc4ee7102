use ndarray::{Array1, ArrayView1};

use crate::error::{DqnError, Result};

/// Trait defining the interface for regression losses over a batch of scalars
pub trait Loss {
    /// Loss reduced to a scalar
    fn compute(&self, predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> Result<f32>;

    /// Gradient of [`Loss::compute`] with respect to each prediction
    fn gradient(&self, predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> Result<Array1<f32>>;
}

/// Mean squared error, `mean((p - t)^2)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MeanSquaredError;

fn check_lengths(predictions: &ArrayView1<f32>, targets: &ArrayView1<f32>) -> Result<()> {
    if predictions.len() != targets.len() {
        return Err(DqnError::dimension_mismatch(
            format!("{} targets", predictions.len()),
            format!("{} targets", targets.len()),
        ));
    }
    if predictions.is_empty() {
        return Err(DqnError::NumericalError("loss over an empty batch".to_string()));
    }
    Ok(())
}

impl Loss for MeanSquaredError {
    fn compute(&self, predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> Result<f32> {
        check_lengths(&predictions, &targets)?;
        let diff = &predictions - &targets;
        Ok(diff.mapv(|d| d * d).sum() / predictions.len() as f32)
    }

    fn gradient(&self, predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> Result<Array1<f32>> {
        check_lengths(&predictions, &targets)?;
        let scale = 2.0 / predictions.len() as f32;
        Ok((&predictions - &targets) * scale)
    }
}
