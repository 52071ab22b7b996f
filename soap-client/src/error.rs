//! Error types for the SOAP client

use std::fmt;

use thiserror::Error;

/// Errors that can occur during SOAP communication
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SoapError {
    /// Network or HTTP communication error
    #[error("Network/HTTP error: {0}")]
    Network(String),

    /// The device did not answer within the configured budget
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// XML parsing error
    #[error("XML parsing error: {0}")]
    Parse(String),

    /// SOAP fault returned by the device
    #[error("SOAP fault: {}", fault_display(.code, .description))]
    Fault {
        /// UPnP error code from `<errorCode>`
        code: u16,
        /// Device-supplied `<errorDescription>`, when present
        description: Option<String>,
    },
}

fn fault_display(code: &u16, description: &Option<String>) -> String {
    FaultKind::from_code(*code).describe(description.as_deref())
}

impl SoapError {
    /// Build a fault without a device description
    pub fn fault(code: u16) -> Self {
        SoapError::Fault { code, description: None }
    }

    /// Classify a fault, `None` for transport and parse errors
    pub fn fault_kind(&self) -> Option<FaultKind> {
        match self {
            SoapError::Fault { code, .. } => Some(FaultKind::from_code(*code)),
            _ => None,
        }
    }
}

/// Known UPnP fault codes this client gives meaning to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// ContentDirectory 701/710: the object or container does not exist
    InvalidObjectId,
    /// AVTransport 804: the device refused to enqueue the URI
    QueueAddRejected,
    /// 402: malformed or missing arguments
    InvalidArgs,
    /// 705: transport is locked by another controller
    TransportLocked,
    /// 714: the URI's media type is not supported
    IllegalMimeType,
    /// 716: the referenced resource could not be found
    ResourceNotFound,
    /// Anything else, carrying the raw code
    Other(u16),
}

impl FaultKind {
    /// Map a raw UPnP error code
    pub fn from_code(code: u16) -> Self {
        match code {
            701 | 710 => FaultKind::InvalidObjectId,
            804 => FaultKind::QueueAddRejected,
            402 => FaultKind::InvalidArgs,
            705 => FaultKind::TransportLocked,
            714 => FaultKind::IllegalMimeType,
            716 => FaultKind::ResourceNotFound,
            other => FaultKind::Other(other),
        }
    }

    /// Human readable message for this fault
    pub fn message(&self) -> String {
        match self {
            FaultKind::InvalidObjectId => "invalid object id (no such object)".to_string(),
            FaultKind::QueueAddRejected => "queue add rejected by device".to_string(),
            FaultKind::InvalidArgs => "invalid arguments".to_string(),
            FaultKind::TransportLocked => "transport is locked".to_string(),
            FaultKind::IllegalMimeType => "illegal MIME type".to_string(),
            FaultKind::ResourceNotFound => "resource not found".to_string(),
            FaultKind::Other(code) => format!("UPnP error {}", code),
        }
    }

    fn describe(&self, description: Option<&str>) -> String {
        match description {
            Some(d) if !d.is_empty() => format!("{} ({})", self.message(), d),
            _ => self.message(),
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}
