//! ZoneGroupTopology service parser module
//!
//! Parses the `ZoneGroupState` document returned by `GetZoneGroupState`,
//! which lists every zone group, its coordinator and the network location
//! of each member.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sonos_parser::services::zone_group_topology::ZoneGroupState;
//!
//! let state = ZoneGroupState::from_xml(&zone_group_state_text)?;
//! for member in state.members() {
//!     println!("{} at {:?}", member.uuid, member.ip_address());
//! }
//! ```

pub mod parser;

pub use parser::{ZoneGroup, ZoneGroupMember, ZoneGroupState};
