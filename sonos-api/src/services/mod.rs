//! Service modules with typed UPnP operations
//!
//! Each service module defines its operations with the declarative macros and
//! re-exports them for convenient access.

pub mod av_transport;
pub mod content_directory;
pub mod music_services;
pub mod rendering_control;
pub mod zone_group_topology;
