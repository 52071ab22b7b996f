//! Device addresses
//!
//! Discovery happens elsewhere. What this crate gets is a topology snapshot
//! mapping device ids to addresses, refreshed on demand.

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;
use sonos_api::services::zone_group_topology::{get_zone_group_state, GetZoneGroupStateOperation};
use sonos_api::SonosClient;

use crate::error::{PlaybackError, Result};
use crate::ids::DeviceId;

/// One device of the household
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyEntry {
    pub id: DeviceId,
    pub ip: String,
    pub zone_name: String,
    /// Coordinator of the group the device is currently in
    pub coordinator_id: Option<DeviceId>,
}

impl TopologyEntry {
    pub fn new(id: impl Into<DeviceId>, ip: impl Into<String>, zone_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ip: ip.into(),
            zone_name: zone_name.into(),
            coordinator_id: None,
        }
    }
}

/// Anything that can list the household's devices
pub trait TopologySource: Send + Sync + fmt::Debug {
    fn snapshot(&self) -> Result<Vec<TopologyEntry>>;
}

/// Reads `GetZoneGroupState` from a bootstrap device
#[derive(Debug, Clone)]
pub struct ZoneGroupTopologySource {
    client: SonosClient,
    bootstrap_ip: String,
}

impl ZoneGroupTopologySource {
    pub fn new(client: SonosClient, bootstrap_ip: impl Into<String>) -> Self {
        Self {
            client,
            bootstrap_ip: bootstrap_ip.into(),
        }
    }
}

impl TopologySource for ZoneGroupTopologySource {
    fn snapshot(&self) -> Result<Vec<TopologyEntry>> {
        let response = self
            .client
            .execute::<GetZoneGroupStateOperation>(&self.bootstrap_ip, &get_zone_group_state())
            .map_err(|e| {
                PlaybackError::Topology(format!("zone group state from {}: {}", self.bootstrap_ip, e))
            })?;

        let state = response.zone_group_state;
        let mut entries = Vec::new();
        for (group, member) in state.members() {
            // Bonded satellites and subs cannot be addressed on their own
            if member.is_invisible() {
                continue;
            }
            match member.ip_address() {
                Some(ip) => entries.push(TopologyEntry {
                    id: DeviceId::new(member.uuid.as_str()),
                    ip: ip.to_string(),
                    zone_name: member.zone_name.clone(),
                    coordinator_id: Some(DeviceId::new(group.coordinator.as_str())),
                }),
                None => tracing::debug!(uuid = %member.uuid, location = %member.location, "member without address"),
            }
        }

        tracing::debug!(bootstrap = %self.bootstrap_ip, devices = entries.len(), "topology snapshot");
        Ok(entries)
    }
}

/// A fixed device list
#[derive(Debug, Clone, Default)]
pub struct StaticTopology {
    entries: Vec<TopologyEntry>,
}

impl StaticTopology {
    pub fn new(entries: Vec<TopologyEntry>) -> Self {
        Self { entries }
    }
}

impl TopologySource for StaticTopology {
    fn snapshot(&self) -> Result<Vec<TopologyEntry>> {
        Ok(self.entries.clone())
    }
}

/// Read-through cache of device addresses
#[derive(Debug, Default)]
pub struct DeviceAddressCache {
    entries: RwLock<HashMap<DeviceId, TopologyEntry>>,
}

impl DeviceAddressCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached entry for `id`, without touching the network
    pub fn get(&self, id: &DeviceId) -> Option<TopologyEntry> {
        self.entries.read().get(id).cloned()
    }

    /// Cached entry for `id`, refreshing from `source` once on a miss
    pub fn resolve(&self, id: &DeviceId, source: &dyn TopologySource) -> Result<TopologyEntry> {
        if let Some(entry) = self.get(id) {
            return Ok(entry);
        }

        tracing::debug!(device = %id, "address cache miss, refreshing topology");
        self.refresh(source)?;
        self.get(id)
            .ok_or_else(|| PlaybackError::DeviceNotFound(id.to_string()))
    }

    /// Replace the cache with a fresh snapshot from `source`
    pub fn refresh(&self, source: &dyn TopologySource) -> Result<usize> {
        let snapshot = source.snapshot()?;
        let count = snapshot.len();
        self.replace(snapshot);
        Ok(count)
    }

    /// Swap in a new snapshot, last writer wins
    pub fn replace(&self, entries: Vec<TopologyEntry>) {
        let map = entries.into_iter().map(|e| (e.id.clone(), e)).collect();
        *self.entries.write() = map;
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
