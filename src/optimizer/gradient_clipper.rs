use ndarray::ArrayD;

/// Gradient clipping applied between backpropagation and the optimizer step
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GradientClipper {
    /// Clamp every gradient component into `[min, max]`
    ClipByValue { min: f32, max: f32 },

    /// No clipping
    None,
}

impl GradientClipper {
    /// Elementwise clipping into `[-bound, bound]`.
    pub fn symmetric(bound: f32) -> Self {
        let bound = bound.abs();
        GradientClipper::ClipByValue {
            min: -bound,
            max: bound,
        }
    }

    /// Clip every gradient tensor in place. NaN components stay NaN.
    pub fn clip(&self, gradients: &mut [ArrayD<f32>]) {
        match *self {
            GradientClipper::ClipByValue { min, max } => {
                for grad in gradients.iter_mut() {
                    grad.mapv_inplace(|g| if g.is_nan() { g } else { g.max(min).min(max) });
                }
            }
            GradientClipper::None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_clip_by_value_bounds_every_component() {
        let mut grads = vec![
            array![[5.0f32, -0.5], [-7.0, 0.25]].into_dyn(),
            array![1.5f32, -1.5].into_dyn(),
        ];
        GradientClipper::symmetric(1.0).clip(&mut grads);
        assert_eq!(grads[0], array![[1.0f32, -0.5], [-1.0, 0.25]].into_dyn());
        assert_eq!(grads[1], array![1.0f32, -1.0].into_dyn());
    }

    #[test]
    fn test_none_leaves_gradients() {
        let mut grads = vec![array![100.0f32].into_dyn()];
        GradientClipper::None.clip(&mut grads);
        assert_eq!(grads[0], array![100.0f32].into_dyn());
    }

    #[test]
    fn test_clip_keeps_nan() {
        let mut grads = vec![array![f32::NAN, 3.0, -3.0].into_dyn()];
        GradientClipper::symmetric(1.0).clip(&mut grads);
        assert!(grads[0][0].is_nan());
        assert_eq!(grads[0][1], 1.0);
        assert_eq!(grads[0][2], -1.0);
    }
}
