//! RenderingControl service for audio rendering operations
//!
//! ```rust,ignore
//! use sonos_api::services::rendering_control;
//!
//! let request = rendering_control::set_volume("Master".to_string(), 30);
//! client.execute::<rendering_control::SetVolumeOperation>("192.168.1.100", &request)?;
//! ```

pub mod operations;

pub use operations::*;
