//! # sonos-parser
//!
//! XML parsing for the Sonos UPnP responses the favorites orchestrator
//! consumes: DIDL-Lite browse results, SMAPI `getMetadata` results and
//! zone group topology.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sonos_parser::DidlDocument;
//!
//! let doc = DidlDocument::parse_lenient(&browse_result);
//! for object in doc.objects() {
//!     println!("{} {:?}", object.id, object.title());
//! }
//! ```

pub mod common;
pub mod error;
pub mod services;

pub use error::{ParseError, ParseResult};

pub use common::didl::{DidlDocument, DidlKind, DidlObject, NewDidlItem, ALBUM_ART_TAGS, DATE_TAGS, DIDL_ROOT};
pub use common::escape::{escape_xml, unescape_xml};
pub use services::music_services::{MediaEntry, MediaKind};
pub use services::zone_group_topology::{ZoneGroup, ZoneGroupMember, ZoneGroupState};
