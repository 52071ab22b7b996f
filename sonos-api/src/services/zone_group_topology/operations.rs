//! ZoneGroupTopology service operations

use sonos_parser::ZoneGroupState;

use crate::error::ApiError;
use crate::operation::child_text;
use crate::{define_upnp_operation, Validate};

/// Parsed household topology
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetZoneGroupStateResponse {
    pub zone_group_state: ZoneGroupState,
}

// Get the current zone group topology
define_upnp_operation! {
    operation: GetZoneGroupStateOperation,
    constructor: get_zone_group_state,
    action: "GetZoneGroupState",
    service: ZoneGroupTopology,
    request: {},
    response: GetZoneGroupStateResponse,
    payload: |_req| String::new(),
    parse: |xml| {
        let text = child_text(xml, "ZoneGroupState")
            .ok_or_else(|| ApiError::ParseError("Missing ZoneGroupState element".to_string()))?;
        Ok(GetZoneGroupStateResponse {
            zone_group_state: ZoneGroupState::from_xml(&text)?,
        })
    },
}

impl Validate for GetZoneGroupStateOperationRequest {}
