//! MusicServices service
//!
//! Metadata for music service content that has no ContentDirectory view,
//! requested through the device on behalf of a linked account.

pub mod operations;

pub use operations::*;
