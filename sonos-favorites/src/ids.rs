//! Device identity type

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a Sonos device
///
/// This is the `RINCON_…` UUID from the topology snapshot, normalized to strip
/// the "uuid:" prefix device descriptions carry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceId(String);

impl DeviceId {
    /// Creates a new DeviceId, normalizing the format
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let trimmed = id.trim();
        let normalized = trimmed.strip_prefix("uuid:").unwrap_or(trimmed);
        Self(normalized.to_string())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Transport URI that makes another device join this one's group
    pub fn group_join_uri(&self) -> String {
        format!("x-rincon:{}", self.0)
    }

    /// Transport URI selecting this device's own play queue
    pub fn queue_uri(&self) -> String {
        format!("x-rincon-queue:{}#0", self.0)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        DeviceId::new(s)
    }
}

impl From<String> for DeviceId {
    fn from(s: String) -> Self {
        DeviceId::new(s)
    }
}

impl AsRef<str> for DeviceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_strips_uuid_prefix() {
        let id = DeviceId::new("uuid:RINCON_123456789");
        assert_eq!(id.as_str(), "RINCON_123456789");
    }

    #[test]
    fn test_equality_ignores_prefix() {
        assert_eq!(DeviceId::new("uuid:RINCON_123"), DeviceId::from("RINCON_123"));
    }

    #[test]
    fn test_transport_uris() {
        let id = DeviceId::new("RINCON_000E58A0123401400");
        assert_eq!(id.group_join_uri(), "x-rincon:RINCON_000E58A0123401400");
        assert_eq!(id.queue_uri(), "x-rincon-queue:RINCON_000E58A0123401400#0");
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", DeviceId::new("RINCON_1")), "RINCON_1");
    }
}
