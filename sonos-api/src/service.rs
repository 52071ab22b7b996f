/// Represents the UPnP services exposed by Sonos devices
///
/// Each service provides a specific set of operations for controlling different
/// aspects of the Sonos device functionality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// AVTransport service - Controls playback, transport URI and queue
    AVTransport,

    /// RenderingControl service - Controls audio rendering (volume, mute, etc.)
    RenderingControl,

    /// ZoneGroupTopology service - Reports speaker grouping and topology
    ZoneGroupTopology,

    /// ContentDirectory service - Browses favorites, queues and music library
    ContentDirectory,

    /// MusicServices service - Proxies metadata requests to music services
    MusicServices,
}

/// Contains the endpoint and service URI information for a UPnP service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    /// The HTTP endpoint path for this service (relative to device base URL)
    pub endpoint: &'static str,

    /// The UPnP service URI used in SOAP requests
    pub service_uri: &'static str,
}

impl Service {
    /// Get the name of this service as a string
    pub fn name(&self) -> &'static str {
        match self {
            Service::AVTransport => "AVTransport",
            Service::RenderingControl => "RenderingControl",
            Service::ZoneGroupTopology => "ZoneGroupTopology",
            Service::ContentDirectory => "ContentDirectory",
            Service::MusicServices => "MusicServices",
        }
    }

    /// Get the service information (endpoint and URI) for this service
    pub fn info(&self) -> ServiceInfo {
        match self {
            Service::AVTransport => ServiceInfo {
                endpoint: "MediaRenderer/AVTransport/Control",
                service_uri: "urn:schemas-upnp-org:service:AVTransport:1",
            },
            Service::RenderingControl => ServiceInfo {
                endpoint: "MediaRenderer/RenderingControl/Control",
                service_uri: "urn:schemas-upnp-org:service:RenderingControl:1",
            },
            Service::ZoneGroupTopology => ServiceInfo {
                endpoint: "ZoneGroupTopology/Control",
                service_uri: "urn:schemas-upnp-org:service:ZoneGroupTopology:1",
            },
            Service::ContentDirectory => ServiceInfo {
                endpoint: "MediaServer/ContentDirectory/Control",
                service_uri: "urn:schemas-upnp-org:service:ContentDirectory:1",
            },
            Service::MusicServices => ServiceInfo {
                endpoint: "MusicServices/Control",
                service_uri: "urn:schemas-upnp-org:service:MusicServices:1",
            },
        }
    }
}
