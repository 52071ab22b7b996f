//! ContentDirectory service operations

use sonos_parser::{escape_xml, DidlDocument, ParseResult};

use crate::operation::{child_text, child_value, ValidationError};
use crate::{define_upnp_operation, Validate};

/// `BrowseFlag` values
pub const BROWSE_DIRECT_CHILDREN: &str = "BrowseDirectChildren";
pub const BROWSE_METADATA: &str = "BrowseMetadata";

/// Raw browse result plus paging counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowseResponse {
    /// DIDL-Lite document, already unescaped
    pub result: String,
    pub number_returned: u32,
    pub total_matches: u32,
    pub update_id: u32,
}

impl BrowseResponse {
    /// Strict DIDL parse of the result
    pub fn document(&self) -> ParseResult<DidlDocument> {
        DidlDocument::parse(&self.result)
    }

    /// DIDL parse that falls back to pattern extraction
    pub fn document_lenient(&self) -> DidlDocument {
        DidlDocument::parse_lenient(&self.result)
    }
}

define_upnp_operation! {
    operation: BrowseOperation,
    constructor: browse,
    action: "Browse",
    service: ContentDirectory,
    request: {
        object_id: String,
        browse_flag: String,
        filter: String,
        starting_index: u32,
        requested_count: u32,
        sort_criteria: String,
    },
    response: BrowseResponse,
    payload: |req| {
        format!(
            "<ObjectID>{}</ObjectID><BrowseFlag>{}</BrowseFlag><Filter>{}</Filter><StartingIndex>{}</StartingIndex><RequestedCount>{}</RequestedCount><SortCriteria>{}</SortCriteria>",
            escape_xml(&req.object_id),
            escape_xml(&req.browse_flag),
            escape_xml(&req.filter),
            req.starting_index,
            req.requested_count,
            escape_xml(&req.sort_criteria)
        )
    },
    parse: |xml| Ok(BrowseResponse {
        result: child_text(xml, "Result").unwrap_or_default(),
        number_returned: child_value(xml, "NumberReturned"),
        total_matches: child_value(xml, "TotalMatches"),
        update_id: child_value(xml, "UpdateID"),
    }),
}

impl Validate for BrowseOperationRequest {
    fn validate_basic(&self) -> Result<(), ValidationError> {
        if self.object_id.is_empty() {
            return Err(ValidationError::missing("ObjectID"));
        }
        match self.browse_flag.as_str() {
            BROWSE_DIRECT_CHILDREN | BROWSE_METADATA => Ok(()),
            other => Err(ValidationError::invalid_value("browse_flag", other)),
        }
    }
}

/// First page of direct children with every property and no sorting
pub fn browse_children(object_id: &str, requested_count: u32) -> BrowseOperationRequest {
    browse(
        object_id.to_string(),
        BROWSE_DIRECT_CHILDREN.to_string(),
        "*".to_string(),
        0,
        requested_count,
        String::new(),
    )
}
