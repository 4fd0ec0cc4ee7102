use std::fmt;

/// Result type for tdq operations
pub type Result<T> = std::result::Result<T, DqnError>;

/// Main error type for the training core
#[derive(Debug, Clone, PartialEq)]
pub enum DqnError {
    /// Array shapes disagree between a transition, a batch and a network
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Rejected configuration value, reported at construction time
    InvalidConfiguration {
        name: String,
        reason: String,
    },

    /// A sample was requested that is larger than the buffer contents
    InsufficientSamples {
        requested: usize,
        available: usize,
    },

    /// Action index outside the network's output range
    InvalidAction {
        action: usize,
        max_actions: usize,
    },

    /// Numerical computation errors
    NumericalError(String),

    /// IO errors (file operations)
    IoError(String),

    /// Serialization/deserialization errors
    SerializationError(String),
}

impl fmt::Display for DqnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DqnError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {}, got {}", expected, actual)
            }
            DqnError::InvalidConfiguration { name, reason } => {
                write!(f, "Invalid configuration '{}': {}", name, reason)
            }
            DqnError::InsufficientSamples { requested, available } => {
                write!(
                    f,
                    "Insufficient samples: requested {} but buffer holds {}",
                    requested, available
                )
            }
            DqnError::InvalidAction { action, max_actions } => {
                write!(f, "Invalid action {}: must be less than {}", action, max_actions)
            }
            DqnError::NumericalError(msg) => write!(f, "Numerical error: {}", msg),
            DqnError::IoError(msg) => write!(f, "IO error: {}", msg),
            DqnError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for DqnError {}

impl From<std::io::Error> for DqnError {
    fn from(err: std::io::Error) -> Self {
        DqnError::IoError(err.to_string())
    }
}

impl From<bincode::Error> for DqnError {
    fn from(err: bincode::Error) -> Self {
        DqnError::SerializationError(err.to_string())
    }
}

impl From<serde_json::Error> for DqnError {
    fn from(err: serde_json::Error) -> Self {
        DqnError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for DqnError {
    fn from(err: ndarray::ShapeError) -> Self {
        DqnError::DimensionMismatch {
            expected: "compatible array shapes".to_string(),
            actual: err.to_string(),
        }
    }
}

// Helper functions for common error patterns
impl DqnError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        DqnError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_configuration<S: Into<String>>(name: S, reason: S) -> Self {
        DqnError::InvalidConfiguration {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = DqnError::InsufficientSamples { requested: 32, available: 4 };
        assert_eq!(
            err.to_string(),
            "Insufficient samples: requested 32 but buffer holds 4"
        );

        let err = DqnError::invalid_configuration("batch_size", "must be greater than 0");
        assert_eq!(
            err.to_string(),
            "Invalid configuration 'batch_size': must be greater than 0"
        );
    }

    #[test]
    fn test_shape_error_conversion() {
        let shape_err = ndarray::Array2::<f32>::from_shape_vec((2, 2), vec![1.0])
            .unwrap_err();
        let err: DqnError = shape_err.into();
        assert!(matches!(err, DqnError::DimensionMismatch { .. }));
    }
}
