//! Operation framework for typed UPnP actions
//!
//! Every SOAP action is described by a zero-sized operation type implementing
//! [`UPnPOperation`]: which service it belongs to, how a typed request becomes
//! the argument payload and how the response element becomes a typed value.
//! Requests validate themselves before any payload is built.

pub mod macros;

use serde::Serialize;
use xmltree::Element;

use crate::error::ApiError;
use crate::service::Service;

/// Validation error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Parameter '{parameter}' value '{value}' is out of range ({min}..={max})")]
    RangeError {
        parameter: String,
        value: String,
        min: String,
        max: String,
    },

    #[error("Parameter '{parameter}' value '{value}' is invalid: {reason}")]
    InvalidValue {
        parameter: String,
        value: String,
        reason: String,
    },

    #[error("Required parameter '{parameter}' is missing")]
    MissingParameter { parameter: String },

    #[error("Parameter '{parameter}' failed validation: {message}")]
    Custom { parameter: String, message: String },
}

impl ValidationError {
    pub fn range_error(
        parameter: &str,
        min: impl std::fmt::Display,
        max: impl std::fmt::Display,
        value: impl std::fmt::Display,
    ) -> Self {
        Self::RangeError {
            parameter: parameter.to_string(),
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    pub fn invalid_value(parameter: &str, value: impl std::fmt::Display) -> Self {
        Self::InvalidValue {
            parameter: parameter.to_string(),
            value: value.to_string(),
            reason: "invalid format or content".to_string(),
        }
    }

    pub fn missing(parameter: &str) -> Self {
        Self::MissingParameter {
            parameter: parameter.to_string(),
        }
    }
}

/// Trait for types that can be validated
pub trait Validate {
    /// Light checks that fail fast on obviously invalid input
    fn validate_basic(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// A typed UPnP action
pub trait UPnPOperation {
    /// The request type for this operation
    type Request: Serialize + Validate;

    /// The typed result of the action
    type Response;

    /// The UPnP service this operation belongs to
    const SERVICE: Service;

    /// The SOAP action name for this operation
    const ACTION: &'static str;

    /// Validate the request and build the argument payload.
    ///
    /// String arguments are XML escaped here, callers pass raw values.
    fn build_payload(request: &Self::Request) -> Result<String, ValidationError>;

    /// Parse the `<{ACTION}Response>` element into the typed response
    fn parse_response(xml: &Element) -> Result<Self::Response, ApiError>;
}

/// Text of a direct child element, trimmed
pub fn child_text(xml: &Element, name: &str) -> Option<String> {
    xml.get_child(name)
        .and_then(|e| e.get_text())
        .map(|t| t.trim().to_string())
}

/// Parse a direct child element's text, falling back to the type's default
pub fn child_value<T>(xml: &Element, name: &str) -> T
where
    T: std::str::FromStr + Default,
{
    child_text(xml, name)
        .and_then(|s| s.parse().ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_creation() {
        let error = ValidationError::range_error("volume", 0, 100, 150);
        assert!(error.to_string().contains("volume"));
        assert!(error.to_string().contains("150"));
        assert!(error.to_string().contains("0..=100"));
    }

    struct TestRequest {
        value: i32,
    }

    impl Validate for TestRequest {
        fn validate_basic(&self) -> Result<(), ValidationError> {
            if self.value < 0 {
                Err(ValidationError::range_error("value", 0, 100, self.value))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_validate_basic() {
        assert!(TestRequest { value: 50 }.validate_basic().is_ok());
        assert!(TestRequest { value: -10 }.validate_basic().is_err());
    }

    #[test]
    fn test_requests_without_rules_pass() {
        struct Empty;
        impl Validate for Empty {}
        assert!(Empty.validate_basic().is_ok());
    }

    #[test]
    fn test_child_helpers() {
        let xml = Element::parse(
            "<GetVolumeResponse><CurrentVolume> 42 </CurrentVolume><Bad>x</Bad></GetVolumeResponse>".as_bytes(),
        )
        .unwrap();
        assert_eq!(child_text(&xml, "CurrentVolume").as_deref(), Some("42"));
        assert_eq!(child_value::<u8>(&xml, "CurrentVolume"), 42);
        assert_eq!(child_value::<u8>(&xml, "Bad"), 0);
        assert_eq!(child_value::<u32>(&xml, "Missing"), 0);
    }
}
