//! ContentDirectory service
//!
//! Browses the device's content tree: Sonos favorites (`FV:2`), saved
//! queues, the music library and music service containers the household has
//! access to.
//!
//! ```rust,ignore
//! use sonos_api::services::content_directory::{browse_children, BrowseOperation};
//!
//! let response = client.execute::<BrowseOperation>(ip, &browse_children("FV:2", 100))?;
//! for object in response.document_lenient().objects() {
//!     println!("{}", object.id);
//! }
//! ```

pub mod operations;

pub use operations::*;
