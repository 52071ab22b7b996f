//! Group formation
//!
//! The first requested device coordinates; every other one is pointed at it
//! with an `x-rincon:` transport URI. Joins are sent one device at a time and
//! a member that refuses is left out rather than failing the request.

use std::sync::Arc;

use sonos_api::services::av_transport::{
    become_coordinator_of_standalone_group, set_av_transport_uri, BecomeCoordinatorOfStandaloneGroupOperation,
    SetAVTransportURIOperation,
};
use sonos_api::SonosClient;

use crate::address::{DeviceAddressCache, TopologySource};
use crate::error::{PlaybackError, Result};
use crate::ids::DeviceId;

/// A member that could not be added to the group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinFailure {
    pub device_id: DeviceId,
    pub reason: String,
}

/// The group a playback request runs on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceGroup {
    pub coordinator_id: DeviceId,
    pub coordinator_address: String,
    /// Coordinator first, then every member that joined, in request order
    pub member_ids: Vec<DeviceId>,
    pub failures: Vec<JoinFailure>,
}

impl DeviceGroup {
    /// A group of one
    pub fn standalone(coordinator_id: DeviceId, coordinator_address: impl Into<String>) -> Self {
        Self {
            member_ids: vec![coordinator_id.clone()],
            coordinator_id,
            coordinator_address: coordinator_address.into(),
            failures: Vec::new(),
        }
    }

    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn contains(&self, id: &DeviceId) -> bool {
        self.member_ids.contains(id)
    }
}

/// Elects the coordinator and merges the remaining devices into its group
#[derive(Debug, Clone)]
pub struct GroupCoordinator {
    client: SonosClient,
    addresses: Arc<DeviceAddressCache>,
    topology: Arc<dyn TopologySource>,
}

impl GroupCoordinator {
    pub fn new(client: SonosClient, addresses: Arc<DeviceAddressCache>, topology: Arc<dyn TopologySource>) -> Self {
        Self {
            client,
            addresses,
            topology,
        }
    }

    /// Address of a device, refreshing the topology once on a miss
    pub fn resolve_address(&self, id: &DeviceId) -> Result<String> {
        Ok(self.addresses.resolve(id, self.topology.as_ref())?.ip)
    }

    /// Group `device_ids` under `device_ids[0]`.
    ///
    /// Only an unresolvable coordinator or an empty list fails; member
    /// failures end up in [`DeviceGroup::failures`].
    pub fn form_group(&self, device_ids: &[DeviceId]) -> Result<DeviceGroup> {
        let (coordinator, members) = device_ids.split_first().ok_or(PlaybackError::EmptyDeviceList)?;
        let coordinator_address = self.resolve_address(coordinator)?;
        let mut group = DeviceGroup::standalone(coordinator.clone(), coordinator_address);
        let join_uri = coordinator.group_join_uri();

        for member in members {
            if group.contains(member) {
                tracing::debug!(device = %member, "skipping duplicate device");
                continue;
            }

            match self.join(member, &join_uri) {
                Ok(()) => {
                    tracing::debug!(device = %member, coordinator = %coordinator, "joined group");
                    group.member_ids.push(member.clone());
                }
                Err(e) => {
                    tracing::warn!(device = %member, coordinator = %coordinator, error = %e, "device did not join group");
                    group.failures.push(JoinFailure {
                        device_id: member.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            coordinator = %group.coordinator_id,
            members = group.member_ids.len(),
            failures = group.failures.len(),
            "group formed"
        );
        Ok(group)
    }

    /// Take a device out of whatever group it is in
    pub fn leave_group(&self, id: &DeviceId) -> Result<()> {
        let ip = self.resolve_address(id)?;
        self.client.execute::<BecomeCoordinatorOfStandaloneGroupOperation>(
            &ip,
            &become_coordinator_of_standalone_group(),
        )?;
        tracing::debug!(device = %id, "left group");
        Ok(())
    }

    fn join(&self, member: &DeviceId, join_uri: &str) -> Result<()> {
        let ip = self.resolve_address(member)?;
        self.client
            .execute::<SetAVTransportURIOperation>(&ip, &set_av_transport_uri(join_uri.to_string(), String::new()))?;
        Ok(())
    }
}
