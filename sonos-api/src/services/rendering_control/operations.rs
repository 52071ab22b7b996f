//! RenderingControl service operations

use sonos_parser::escape_xml;

use crate::operation::ValidationError;
use crate::{define_operation_with_response, define_upnp_operation, Validate};

define_operation_with_response! {
    operation: GetVolumeOperation,
    constructor: get_volume,
    action: "GetVolume",
    service: RenderingControl,
    request: {
        channel: String,
    },
    payload: |req| {
        format!("<InstanceID>{}</InstanceID><Channel>{}</Channel>", req.instance_id, escape_xml(&req.channel))
    },
    response: GetVolumeResponse {
        current_volume: u8 => "CurrentVolume",
    },
}

impl Validate for GetVolumeOperationRequest {
    fn validate_basic(&self) -> Result<(), ValidationError> {
        validate_channel(&self.channel)
    }
}

define_upnp_operation! {
    operation: SetVolumeOperation,
    constructor: set_volume,
    action: "SetVolume",
    service: RenderingControl,
    request: {
        channel: String,
        desired_volume: u8,
    },
    response: (),
    payload: |req| {
        format!(
            "<InstanceID>{}</InstanceID><Channel>{}</Channel><DesiredVolume>{}</DesiredVolume>",
            req.instance_id,
            escape_xml(&req.channel),
            req.desired_volume
        )
    },
    parse: |_xml| Ok(()),
}

impl Validate for SetVolumeOperationRequest {
    fn validate_basic(&self) -> Result<(), ValidationError> {
        validate_channel(&self.channel)?;
        if self.desired_volume > 100 {
            return Err(ValidationError::range_error("desired_volume", 0, 100, self.desired_volume));
        }
        Ok(())
    }
}

fn validate_channel(channel: &str) -> Result<(), ValidationError> {
    match channel {
        "Master" | "LF" | "RF" => Ok(()),
        other => Err(ValidationError::invalid_value("channel", other)),
    }
}
