//! MusicServices (SMAPI) result parsing
//!
//! Music service content that a household has no ContentDirectory view of is
//! described by `getMetadata` results made of `<mediaCollection>` (browsable)
//! and `<mediaMetadata>` (playable) entries.

pub mod parser;

pub use parser::{parse_metadata_result, MediaEntry, MediaKind};
