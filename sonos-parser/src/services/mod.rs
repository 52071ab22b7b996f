//! Service-specific parsers organized by UPnP service type
//!
//! - [`zone_group_topology`]: `GetZoneGroupState` household topology
//! - [`music_services`]: SMAPI `getMetadata` results

pub mod music_services;
pub mod zone_group_topology;
