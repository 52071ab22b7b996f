use std::sync::Arc;
use std::time::Duration;

use soap_client::{SoapClient, SoapTransport};

use crate::operation::UPnPOperation;
use crate::Result;

/// A client for executing Sonos operations against actual devices
///
/// This client bridges the stateless operation definitions and the network.
/// The transport is shared, so clones are cheap and all of them reuse the same
/// HTTP agent.
///
/// ```rust,ignore
/// use sonos_api::SonosClient;
/// use sonos_api::services::av_transport::{play, PlayOperation};
///
/// let client = SonosClient::new();
/// client.execute::<PlayOperation>("192.168.1.100", &play("1".to_string()))?;
/// ```
#[derive(Debug, Clone)]
pub struct SonosClient {
    transport: Arc<dyn SoapTransport>,
}

impl SonosClient {
    /// Create a client backed by an HTTP SOAP transport with default timeouts
    pub fn new() -> Self {
        Self::with_transport(Arc::new(SoapClient::new()))
    }

    /// Create a client whose HTTP transport uses explicit connect and read budgets
    pub fn with_timeouts(connect: Duration, read: Duration) -> Self {
        Self::with_transport(Arc::new(SoapClient::with_timeouts(connect, read)))
    }

    /// Create a client over any transport, tests use a scripted one
    pub fn with_transport(transport: Arc<dyn SoapTransport>) -> Self {
        Self { transport }
    }

    /// Execute a Sonos operation against a device
    ///
    /// Validates and serializes the request, sends it to the device at `ip`
    /// and parses the response.
    pub fn execute<Op: UPnPOperation>(&self, ip: &str, request: &Op::Request) -> Result<Op::Response> {
        let service_info = Op::SERVICE.info();
        let payload = Op::build_payload(request)?;

        let xml = self.transport.call(
            ip,
            service_info.endpoint,
            service_info.service_uri,
            Op::ACTION,
            &payload,
        )?;

        Op::parse_response(&xml)
    }
}

impl Default for SonosClient {
    fn default() -> Self {
        Self::new()
    }
}
