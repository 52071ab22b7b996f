//! Common utilities and data structures shared across UPnP services
//!
//! - [`xml_decode`]: namespace stripping and serde decoding
//! - [`escape`]: XML entity escaping for payloads and metadata
//! - [`didl`]: DIDL-Lite documents as returned by ContentDirectory
//! - [`scrape`]: pattern based extraction for malformed documents

pub mod didl;
pub mod escape;
pub mod scrape;
pub mod xml_decode;
