use thiserror::Error;

/// Core error types for Clinigate operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid resource data: {message}")]
    InvalidResource { message: String },
}

impl CoreError {
    /// Create a new InvalidResource error
    pub fn invalid_resource(message: impl Into<String>) -> Self {
        Self::InvalidResource {
            message: message.into(),
        }
    }
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::invalid_resource("missing resourceType field");
        assert_eq!(
            err.to_string(),
            "Invalid resource data: missing resourceType field"
        );
    }
}
