//! Error types and handling for the trip planner

use axum::http::StatusCode;
use thiserror::Error;

/// Main error type for the planner
#[derive(Error, Debug)]
pub enum PlannerError {
    /// Malformed trip request (bad dates, out-of-range duration)
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Missing or invalid settings for the selected mode
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A sub-agent or backing service could not produce a result
    #[error("{service} unavailable: {message}")]
    DownstreamUnavailable { service: String, message: String },

    /// Structured data could not be recovered from free-form text
    #[error("Extraction failed for section '{section}': {reason}")]
    Extraction { section: String, reason: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl PlannerError {
    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a new downstream error for the named service
    pub fn downstream<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::DownstreamUnavailable {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn extraction<S: Into<String>, R: Into<String>>(section: S, reason: R) -> Self {
        Self::Extraction {
            section: section.into(),
            reason: reason.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Whether the request must be terminated rather than degraded
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PlannerError::Validation { .. } | PlannerError::Configuration { .. }
        )
    }

    /// HTTP status used when this error reaches the API surface
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            PlannerError::DownstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            PlannerError::Validation { message } => format!("Invalid input: {message}"),
            PlannerError::Configuration { message } => {
                format!("Planner is not configured correctly: {message}")
            }
            PlannerError::DownstreamUnavailable { service, .. } => {
                format!("The {service} service is currently unavailable. Please try again later.")
            }
            PlannerError::Extraction { section, .. } => {
                format!("Could not read the {section} section of the plan.")
            }
            PlannerError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            PlannerError::General { message } => message.clone(),
        }
    }
}

impl From<reqwest::Error> for PlannerError {
    fn from(err: reqwest::Error) -> Self {
        let service = err
            .url()
            .and_then(|url| url.path_segments()?.next().map(str::to_string))
            .unwrap_or_else(|| "http".to_string());
        PlannerError::downstream(service, err.to_string())
    }
}

impl From<reqwest_middleware::Error> for PlannerError {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(err) => err.into(),
            reqwest_middleware::Error::Middleware(err) => {
                PlannerError::downstream("http", err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let validation_err = PlannerError::validation("duration out of range");
        assert!(matches!(validation_err, PlannerError::Validation { .. }));

        let config_err = PlannerError::configuration("missing API key");
        assert!(matches!(config_err, PlannerError::Configuration { .. }));

        let downstream = PlannerError::downstream("route", "connection refused");
        assert_eq!(downstream.to_string(), "route unavailable: connection refused");
    }

    #[test]
    fn test_fatal_classification() {
        assert!(PlannerError::validation("x").is_fatal());
        assert!(PlannerError::configuration("x").is_fatal());
        assert!(!PlannerError::downstream("weather", "x").is_fatal());
        assert!(!PlannerError::extraction("route_plan", "no block").is_fatal());
    }

    #[test]
    fn test_user_messages() {
        let validation_err = PlannerError::validation("test input");
        assert!(validation_err.user_message().contains("test input"));

        let config_err = PlannerError::configuration("Missing AZURE_OPENAI_API_KEY");
        assert!(config_err.user_message().contains("AZURE_OPENAI_API_KEY"));

        let downstream = PlannerError::downstream("hotel", "connect error: 10.0.0.7:8000");
        assert!(downstream.user_message().contains("hotel"));
        assert!(!downstream.user_message().contains("10.0.0.7"));
        assert_eq!(downstream.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let planner_err: PlannerError = io_err.into();
        assert!(matches!(planner_err, PlannerError::Io { .. }));
    }
}
