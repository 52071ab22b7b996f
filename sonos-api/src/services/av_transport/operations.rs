//! AVTransport service operations
//!
//! This module contains the UPnP operations for the AVTransport service used
//! to point a speaker at content, manage its queue and start playback.

use sonos_parser::escape_xml;

use crate::operation::{child_value, ValidationError};
use crate::{define_upnp_operation, Validate};

// =============================================================================
// TRANSPORT URI AND QUEUE
// =============================================================================

define_upnp_operation! {
    operation: SetAVTransportURIOperation,
    constructor: set_av_transport_uri,
    action: "SetAVTransportURI",
    service: AVTransport,
    request: {
        current_uri: String,
        current_uri_meta_data: String,
    },
    response: (),
    payload: |req| {
        format!(
            "<InstanceID>{}</InstanceID><CurrentURI>{}</CurrentURI><CurrentURIMetaData>{}</CurrentURIMetaData>",
            req.instance_id,
            escape_xml(&req.current_uri),
            escape_xml(&req.current_uri_meta_data)
        )
    },
    parse: |_xml| Ok(()),
}

impl Validate for SetAVTransportURIOperationRequest {
    fn validate_basic(&self) -> Result<(), ValidationError> {
        if self.current_uri.trim().is_empty() {
            return Err(ValidationError::missing("CurrentURI"));
        }
        Ok(())
    }
}

/// Result of enqueuing a URI
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddURIToQueueResponse {
    pub first_track_number_enqueued: u32,
    pub num_tracks_added: u32,
    pub new_queue_length: u32,
}

define_upnp_operation! {
    operation: AddURIToQueueOperation,
    constructor: add_uri_to_queue,
    action: "AddURIToQueue",
    service: AVTransport,
    request: {
        enqueued_uri: String,
        enqueued_uri_meta_data: String,
        desired_first_track_number_enqueued: u32,
        enqueue_as_next: bool,
    },
    response: AddURIToQueueResponse,
    payload: |req| {
        format!(
            "<InstanceID>{}</InstanceID><EnqueuedURI>{}</EnqueuedURI><EnqueuedURIMetaData>{}</EnqueuedURIMetaData><DesiredFirstTrackNumberEnqueued>{}</DesiredFirstTrackNumberEnqueued><EnqueueAsNext>{}</EnqueueAsNext>",
            req.instance_id,
            escape_xml(&req.enqueued_uri),
            escape_xml(&req.enqueued_uri_meta_data),
            req.desired_first_track_number_enqueued,
            if req.enqueue_as_next { "1" } else { "0" }
        )
    },
    parse: |xml| Ok(AddURIToQueueResponse {
        first_track_number_enqueued: child_value(xml, "FirstTrackNumberEnqueued"),
        num_tracks_added: child_value(xml, "NumTracksAdded"),
        new_queue_length: child_value(xml, "NewQueueLength"),
    }),
}

impl Validate for AddURIToQueueOperationRequest {
    fn validate_basic(&self) -> Result<(), ValidationError> {
        if self.enqueued_uri.trim().is_empty() {
            return Err(ValidationError::missing("EnqueuedURI"));
        }
        Ok(())
    }
}

define_upnp_operation! {
    operation: RemoveAllTracksFromQueueOperation,
    constructor: remove_all_tracks_from_queue,
    action: "RemoveAllTracksFromQueue",
    service: AVTransport,
    request: {},
    response: (),
    payload: |req| format!("<InstanceID>{}</InstanceID>", req.instance_id),
    parse: |_xml| Ok(()),
}

impl Validate for RemoveAllTracksFromQueueOperationRequest {}

// =============================================================================
// PLAYBACK CONTROL
// =============================================================================

define_upnp_operation! {
    operation: PlayOperation,
    constructor: play,
    action: "Play",
    service: AVTransport,
    request: {
        speed: String,
    },
    response: (),
    payload: |req| {
        format!("<InstanceID>{}</InstanceID><Speed>{}</Speed>", req.instance_id, escape_xml(&req.speed))
    },
    parse: |_xml| Ok(()),
}

impl Validate for PlayOperationRequest {
    fn validate_basic(&self) -> Result<(), ValidationError> {
        if self.speed.is_empty() {
            return Err(ValidationError::invalid_value("speed", &self.speed));
        }
        match self.speed.as_str() {
            "1" | "0" => Ok(()),
            other if other.parse::<f32>().is_ok() => Ok(()),
            _ => Err(ValidationError::Custom {
                parameter: "speed".to_string(),
                message: "Speed must be '1', '0', or a numeric value".to_string(),
            }),
        }
    }
}

define_upnp_operation! {
    operation: SeekOperation,
    constructor: seek,
    action: "Seek",
    service: AVTransport,
    request: {
        unit: String,
        target: String,
    },
    response: (),
    payload: |req| {
        format!(
            "<InstanceID>{}</InstanceID><Unit>{}</Unit><Target>{}</Target>",
            req.instance_id,
            escape_xml(&req.unit),
            escape_xml(&req.target)
        )
    },
    parse: |_xml| Ok(()),
}

impl Validate for SeekOperationRequest {
    fn validate_basic(&self) -> Result<(), ValidationError> {
        match self.unit.as_str() {
            "TRACK_NR" | "REL_TIME" | "TIME_DELTA" => Ok(()),
            other => Err(ValidationError::Custom {
                parameter: "unit".to_string(),
                message: format!(
                    "Invalid unit '{}'. Must be 'TRACK_NR', 'REL_TIME', or 'TIME_DELTA'",
                    other
                ),
            }),
        }
    }
}

// =============================================================================
// GROUPING
// =============================================================================

define_upnp_operation! {
    operation: BecomeCoordinatorOfStandaloneGroupOperation,
    constructor: become_coordinator_of_standalone_group,
    action: "BecomeCoordinatorOfStandaloneGroup",
    service: AVTransport,
    request: {},
    response: (),
    payload: |req| format!("<InstanceID>{}</InstanceID>", req.instance_id),
    parse: |_xml| Ok(()),
}

impl Validate for BecomeCoordinatorOfStandaloneGroupOperationRequest {}
