/// Errors surfaced by the window controller.
///
/// None of these are thrown across the public API: operations either return
/// them as values or log them and degrade.
#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("{message}")]
    InvalidArgument { message: String },

    #[error("Invalid size '{value}': expected WIDTHxHEIGHT")]
    InvalidSize { value: String },

    #[error("Invalid window options: {source}")]
    InvalidOptions {
        #[from]
        source: serde_json::Error,
    },

    #[error("Malformed '{kind}' control message: {reason}")]
    MalformedMessage { kind: &'static str, reason: String },
}

impl WindowError {
    pub fn missing_event_name() -> Self {
        Self::InvalidArgument {
            message: "You must specify an event name as the first parameter".to_string(),
        }
    }

    /// Stable code for programmatic handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            WindowError::InvalidArgument { .. } => "INVALID_ARGUMENT",
            WindowError::InvalidSize { .. } => "INVALID_SIZE",
            WindowError::InvalidOptions { .. } => "INVALID_OPTIONS",
            WindowError::MalformedMessage { .. } => "MALFORMED_MESSAGE",
        }
    }
}
