//! Error types for the uvstrip_dosimetry library

use thiserror::Error;

/// Result type alias for uvstrip_dosimetry operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Error types for strip analysis operations
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Image file or bytes could not be loaded or decoded
    #[error("Failed to load image: {message}")]
    ImageLoadError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Located or fallback region has no pixels to measure
    #[error("Degenerate region: {width}x{height} px")]
    DegenerateRegion { width: u32, height: u32 },

    /// Requested calibration profile is not registered
    #[error("Unknown calibration profile: {name}")]
    UnknownProfile { name: String },

    /// Invalid configuration or calibration parameter
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// Geometry fault during candidate analysis
    #[error("Processing error: {message}")]
    ProcessingError { message: String },

    /// Configuration or profile file could not be read or parsed
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl AnalysisError {
    /// Create an image load error with context
    pub fn image_load<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ImageLoadError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error with context
    pub fn config<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ConfigError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn invalid_parameter(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self::ProcessingError {
            message: message.into(),
        }
    }

    /// Check if this error is absorbed by the locator fallback instead of failing the request
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AnalysisError::ProcessingError { .. })
    }

    /// Get user-friendly error description for application display
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::ImageLoadError { .. } => {
                "Could not read the image. Please upload a valid photo of the strip.".to_string()
            }
            AnalysisError::DegenerateRegion { .. } => {
                "The image is too small to analyze. Please use a larger photo.".to_string()
            }
            AnalysisError::UnknownProfile { name } => {
                format!("Strip type '{}' is not supported.", name)
            }
            _ => "Strip analysis failed. Please try with a different image.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_processing_errors_are_recoverable() {
        assert!(AnalysisError::processing("degenerate contour").is_recoverable());
        assert!(!AnalysisError::DegenerateRegion { width: 0, height: 4 }.is_recoverable());
        assert!(!AnalysisError::UnknownProfile { name: "uvc".into() }.is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let err = AnalysisError::invalid_parameter("canny_low", 200.0);
        assert_eq!(err.to_string(), "Invalid parameter: canny_low = 200");

        let err = AnalysisError::DegenerateRegion { width: 0, height: 3 };
        assert_eq!(err.to_string(), "Degenerate region: 0x3 px");
    }

    #[test]
    fn test_user_message_names_profile() {
        let err = AnalysisError::UnknownProfile { name: "uva".into() };
        assert!(err.user_message().contains("uva"));
    }
}
