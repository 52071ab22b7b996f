//! Typed Sonos API for device control
//!
//! Each UPnP action the favorites orchestrator needs is modeled as an
//! operation type with a typed request and response. `SonosClient` executes
//! them over a pluggable SOAP transport.
//!
//! ```rust,ignore
//! use sonos_api::SonosClient;
//! use sonos_api::services::content_directory::{browse_children, BrowseOperation};
//!
//! let client = SonosClient::new();
//! let favorites = client.execute::<BrowseOperation>("192.168.1.100", &browse_children("FV:2", 100))?;
//! println!("{} favorites", favorites.total_matches);
//! ```

pub mod client;
pub mod error;
pub mod operation;
pub mod service;
pub mod services;

pub use client::SonosClient;
pub use error::{ApiError, Result};
pub use operation::{UPnPOperation, Validate, ValidationError};
pub use service::{Service, ServiceInfo};
pub use soap_client::FaultKind;
