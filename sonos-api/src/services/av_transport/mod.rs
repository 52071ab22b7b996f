//! AVTransport service for playback and queue operations
//!
//! ```rust,ignore
//! use sonos_api::services::av_transport;
//!
//! let request = av_transport::set_av_transport_uri("x-rincon:RINCON_A1400".to_string(), String::new());
//! client.execute::<av_transport::SetAVTransportURIOperation>("192.168.1.100", &request)?;
//! ```

pub mod operations;

pub use operations::*;

/// Service identifier for AVTransport
pub const SERVICE: crate::Service = crate::Service::AVTransport;
