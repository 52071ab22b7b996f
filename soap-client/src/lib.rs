//! Private SOAP client for UPnP device communication
//!
//! This crate provides a minimal SOAP transport specifically designed for
//! talking to Sonos speakers. It builds the envelope, performs the HTTP POST
//! and classifies the answer as a response element, a SOAP fault or a
//! transport failure. Retry policy belongs to the callers.

mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{FaultKind, SoapError};

use std::time::{Duration, Instant};

use xmltree::Element;

/// Port every Sonos control endpoint listens on
pub const SONOS_PORT: u16 = 1400;

/// Anything able to deliver a SOAP action to a device.
///
/// `SoapClient` is the HTTP implementation; tests substitute a scripted one.
pub trait SoapTransport: Send + Sync + std::fmt::Debug {
    /// Send `action` with `payload` to the control `endpoint` of the device at `ip`.
    ///
    /// Returns the `<{action}Response>` element on success.
    fn call(
        &self,
        ip: &str,
        endpoint: &str,
        service_uri: &str,
        action: &str,
        payload: &str,
    ) -> Result<Element, SoapError>;
}

/// A minimal SOAP client for UPnP device communication
#[derive(Debug, Clone)]
pub struct SoapClient {
    agent: ureq::Agent,
}

impl SoapClient {
    /// Create a new SOAP client with default configuration (5s connect, 10s read)
    pub fn new() -> Self {
        Self::with_timeouts(Duration::from_secs(5), Duration::from_secs(10))
    }

    /// Create a SOAP client with explicit connect and read budgets
    pub fn with_timeouts(connect: Duration, read: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(connect)
                .timeout_read(read)
                .build(),
        }
    }

    /// Send an action to a fully qualified control URL
    pub fn call_url(
        &self,
        url: &str,
        service_uri: &str,
        action: &str,
        payload: &str,
    ) -> Result<Element, SoapError> {
        // Single line envelope, devices reject leading whitespace before the root
        let body = format!(
            r#"<?xml version="1.0" encoding="utf-8"?><s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/"><s:Body><u:{action} xmlns:u="{service_uri}">{payload}</u:{action}></s:Body></s:Envelope>"#,
            action = action,
            service_uri = service_uri,
            payload = payload
        );
        let soap_action = format!("\"{}#{}\"", service_uri, action);

        tracing::debug!(url, action, bytes = body.len(), "sending SOAP request");
        let started = Instant::now();

        let xml_text = self.post(url, &soap_action, &body);
        tracing::debug!(action, elapsed = ?started.elapsed(), ok = xml_text.is_ok(), "SOAP request finished");

        let xml = Element::parse(xml_text?.as_bytes())
            .map_err(|e| SoapError::Parse(e.to_string()))?;

        // Extract response or handle SOAP fault
        self.extract_response(&xml, action)
    }

    fn post(&self, url: &str, soap_action: &str, body: &str) -> Result<String, SoapError> {
        match self
            .agent
            .post(url)
            .set("Content-Type", "text/xml; charset=\"utf-8\"")
            .set("SOAPACTION", soap_action)
            .send_string(body)
        {
            Ok(response) => response
                .into_string()
                .map_err(|e| classify_io(e.to_string())),
            // Devices deliver SOAP faults with HTTP 500, the body still has to be read
            Err(ureq::Error::Status(status, response)) => {
                let text = response
                    .into_string()
                    .map_err(|e| classify_io(e.to_string()))?;
                if text.contains("Fault") {
                    Ok(text)
                } else {
                    Err(SoapError::Network(format!("HTTP {}", status)))
                }
            }
            Err(ureq::Error::Transport(transport)) => Err(classify_io(transport.to_string())),
        }
    }

    fn extract_response(&self, xml: &Element, action: &str) -> Result<Element, SoapError> {
        let body = xml
            .get_child("Body")
            .ok_or_else(|| SoapError::Parse("Missing SOAP Body".to_string()))?;

        // Check for SOAP fault first
        if let Some(fault) = body.get_child("Fault") {
            let upnp_error = fault
                .get_child("detail")
                .and_then(|d| d.get_child("UPnPError").or_else(|| d.get_child("UpnPError")));
            let code = upnp_error
                .and_then(|e| e.get_child("errorCode"))
                .and_then(|c| c.get_text())
                .and_then(|t| t.trim().parse::<u16>().ok())
                .unwrap_or(500);
            let description = upnp_error
                .and_then(|e| e.get_child("errorDescription"))
                .and_then(|c| c.get_text())
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty());
            return Err(SoapError::Fault { code, description });
        }

        // Extract the action response
        let response_name = format!("{}Response", action);
        body.get_child(response_name.as_str())
            .cloned()
            .ok_or_else(|| SoapError::Parse(format!("Missing {} element", response_name)))
    }
}

impl SoapTransport for SoapClient {
    fn call(
        &self,
        ip: &str,
        endpoint: &str,
        service_uri: &str,
        action: &str,
        payload: &str,
    ) -> Result<Element, SoapError> {
        let url = format!("http://{}:{}/{}", ip, SONOS_PORT, endpoint.trim_start_matches('/'));
        self.call_url(&url, service_uri, action, payload)
    }
}

impl Default for SoapClient {
    fn default() -> Self {
        Self::new()
    }
}

fn classify_io(message: String) -> SoapError {
    let lowered = message.to_lowercase();
    if lowered.contains("timed out") || lowered.contains("timeout") {
        SoapError::Timeout(message)
    } else {
        SoapError::Network(message)
    }
}
