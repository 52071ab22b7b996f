use soap_client::{FaultKind, SoapError};
use thiserror::Error;

/// High-level API errors for Sonos operations
///
/// This enum abstracts away the underlying SOAP communication details and
/// classifies failures the way callers need to react to them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Network communication error
    ///
    /// Connection refused, DNS failures, HTTP errors without a SOAP fault.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The device did not answer within the configured budget
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Response parsing error
    ///
    /// The device answered but the content could not be parsed into the
    /// expected shape.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// SOAP fault returned by device
    #[error("SOAP fault {code}: {}", fault_message(.kind, .description))]
    SoapFault {
        code: u16,
        kind: FaultKind,
        /// Device-supplied `<errorDescription>`
        description: Option<String>,
    },

    /// Invalid parameter value
    ///
    /// Returned before anything is sent when a request fails validation.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

fn fault_message(kind: &FaultKind, description: &Option<String>) -> String {
    match description.as_deref() {
        Some(d) if !d.is_empty() => format!("{} ({})", kind, d),
        _ => kind.to_string(),
    }
}

impl ApiError {
    /// Build a fault error from a raw UPnP code
    pub fn fault(code: u16) -> Self {
        ApiError::SoapFault {
            code,
            kind: FaultKind::from_code(code),
            description: None,
        }
    }

    /// Fault classification, `None` for anything that is not a SOAP fault
    pub fn fault_kind(&self) -> Option<FaultKind> {
        match self {
            ApiError::SoapFault { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// The device's own description of a fault, when it sent one
    pub fn fault_description(&self) -> Option<&str> {
        match self {
            ApiError::SoapFault { description, .. } => description.as_deref(),
            _ => None,
        }
    }

    /// Whether the device rejected an object id (701/710)
    pub fn is_invalid_object_id(&self) -> bool {
        self.fault_kind() == Some(FaultKind::InvalidObjectId)
    }
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

/// Convert from SoapError to ApiError
impl From<SoapError> for ApiError {
    fn from(error: SoapError) -> Self {
        match error {
            SoapError::Network(msg) => ApiError::NetworkError(msg),
            SoapError::Timeout(msg) => ApiError::Timeout(msg),
            SoapError::Parse(msg) => ApiError::ParseError(msg),
            SoapError::Fault { code, description } => ApiError::SoapFault {
                code,
                kind: FaultKind::from_code(code),
                description,
            },
        }
    }
}

impl From<sonos_parser::ParseError> for ApiError {
    fn from(error: sonos_parser::ParseError) -> Self {
        ApiError::ParseError(error.to_string())
    }
}

/// Convert from ValidationError to ApiError
impl From<crate::operation::ValidationError> for ApiError {
    fn from(validation_error: crate::operation::ValidationError) -> Self {
        use crate::operation::ValidationError;
        match validation_error {
            ValidationError::InvalidValue { parameter, value, reason } => ApiError::InvalidParameter(
                format!("Invalid value '{}' for parameter '{}': {}", value, parameter, reason),
            ),
            ValidationError::RangeError { parameter, value, min, max } => {
                ApiError::InvalidParameter(format!(
                    "Parameter '{}' value {} is out of range [{}, {}]",
                    parameter, value, min, max
                ))
            }
            ValidationError::Custom { parameter, message } => {
                ApiError::InvalidParameter(format!("Parameter '{}': {}", parameter, message))
            }
            ValidationError::MissingParameter { parameter } => {
                ApiError::InvalidParameter(format!("Required parameter '{}' is missing", parameter))
            }
        }
    }
}
