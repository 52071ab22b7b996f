//! # sonos-favorites
//!
//! Play Sonos favorites on a group of speakers.
//!
//! A favorite either points straight at something playable (a station, a
//! track) or at a container such as a podcast feed. Containers are expanded
//! through a cascade of browse strategies and the newest entry is played.
//! The requested devices are grouped under the first one before playback is
//! committed on it.
//!
//! ```rust,ignore
//! use sonos_favorites::{OrchestratorConfig, PlaybackOrchestrator, PlaybackRequest, Playable};
//!
//! let config = OrchestratorConfig::load_default()?.with_bootstrap_address("192.168.1.20");
//! let orchestrator = PlaybackOrchestrator::from_config(config)?;
//! let request = PlaybackRequest::new("FV:2/13", ["RINCON_000E58A0123401400", "RINCON_000E58B0456701400"]);
//! match orchestrator.play_favorite(&request)? {
//!     outcome if outcome.is_started() => println!("playing"),
//!     _ => println!("nothing to play"),
//! }
//! ```
//!
//! Everything runs on the calling thread. Commands to devices are sent one at
//! a time, which is what keeps group changes and transport changes from
//! racing each other on the devices.

pub mod address;
pub mod browse;
pub mod config;
pub mod episode;
pub mod error;
pub mod favorites;
pub mod group;
pub mod ids;
pub mod logging;
pub mod notify;
pub mod object_id;
pub mod orchestrator;
pub mod transport;

pub use address::{DeviceAddressCache, StaticTopology, TopologyEntry, TopologySource, ZoneGroupTopologySource};
pub use browse::{BrowseCascade, BrowseOutcome, BrowseResultItem, BrowseStrategy, StrategyAttempt};
pub use config::OrchestratorConfig;
pub use episode::{parse_date, pick_latest};
pub use error::{PlaybackError, Result};
pub use favorites::{FavoriteRecord, FavoritesCache, ServiceAccount};
pub use group::{DeviceGroup, GroupCoordinator, JoinFailure};
pub use ids::DeviceId;
pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};
pub use notify::{Notification, NotificationLevel, NotificationSink, TracingSink};
pub use object_id::{derive_canonical_id, normalize};
pub use orchestrator::{AddressResolvable, Groupable, Playable, PlaybackOrchestrator, PlaybackOutcome, PlaybackRequest};
pub use transport::{PlaybackTarget, TargetClass, TransportCommitter};
