//! MusicServices service operations

use sonos_parser::services::music_services::parse_metadata_result;
use sonos_parser::{escape_xml, MediaEntry};
use xmltree::Element;

use crate::error::ApiError;
use crate::operation::{child_value, ValidationError};
use crate::{define_upnp_operation, Validate};

/// Entries of a `getMetadata` page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetMetadataResponse {
    pub entries: Vec<MediaEntry>,
    pub total: u32,
}

define_upnp_operation! {
    operation: GetMetadataOperation,
    constructor: get_metadata,
    action: "GetMetadata",
    service: MusicServices,
    request: {
        id: String,
        index: u32,
        count: u32,
        recursive: bool,
        service_id: String,
        account_token: String,
    },
    response: GetMetadataResponse,
    payload: |req| {
        format!(
            "<Id>{}</Id><Index>{}</Index><Count>{}</Count><Recursive>{}</Recursive><ServiceId>{}</ServiceId><AccountToken>{}</AccountToken>",
            escape_xml(&req.id),
            req.index,
            req.count,
            if req.recursive { "1" } else { "0" },
            escape_xml(&req.service_id),
            escape_xml(&req.account_token)
        )
    },
    parse: |xml| {
        let result = metadata_result_text(xml)?;
        let entries = parse_metadata_result(&result)?;
        let total = xml
            .get_child("getMetadataResult")
            .map(|r| child_value(r, "total"))
            .unwrap_or_else(|| child_value(xml, "Total"));
        Ok(GetMetadataResponse { entries, total })
    },
}

impl Validate for GetMetadataOperationRequest {
    fn validate_basic(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::missing("Id"));
        }
        if self.service_id.is_empty() {
            return Err(ValidationError::missing("ServiceId"));
        }
        Ok(())
    }
}

/// The result either arrives escaped inside a text argument or inline
fn metadata_result_text(xml: &Element) -> Result<String, ApiError> {
    let embedded = xml
        .children
        .iter()
        .filter_map(|node| node.as_element())
        .filter_map(|child| child.get_text())
        .map(|text| text.trim().to_string())
        .find(|text| text.starts_with('<'));
    if let Some(text) = embedded {
        return Ok(text);
    }

    let mut buffer = Vec::new();
    xml.write(&mut buffer)
        .map_err(|e| ApiError::ParseError(format!("re-serializing metadata result: {:?}", e)))?;
    String::from_utf8(buffer).map_err(|e| ApiError::ParseError(e.to_string()))
}
