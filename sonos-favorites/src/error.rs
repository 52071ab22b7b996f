use sonos_api::ApiError;
use thiserror::Error;

use crate::logging::LoggingError;

/// Errors surfaced by the favorites orchestrator
///
/// A favorite that resolves to nothing playable is not an error, see
/// [`PlaybackOutcome::NothingToPlay`](crate::PlaybackOutcome::NothingToPlay).
/// Members that fail to join a group are recorded on the
/// [`DeviceGroup`](crate::DeviceGroup) instead of being raised.
#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("No target devices given")]
    EmptyDeviceList,

    #[error("Favorite not found: {0}")]
    FavoriteNotFound(String),

    #[error("Topology error: {0}")]
    Topology(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),
}

impl PlaybackError {
    /// Fault classification when the device rejected an action
    pub fn fault_kind(&self) -> Option<sonos_api::FaultKind> {
        match self {
            PlaybackError::Api(api) => api.fault_kind(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PlaybackError>;
