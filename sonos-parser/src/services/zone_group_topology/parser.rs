//! ZoneGroupTopology service parser implementation

use serde::{Deserialize, Serialize};

use crate::common::xml_decode;
use crate::error::{ParseError, ParseResult};

/// Complete topology of all speakers and groups in the household.
///
/// Newer firmware wraps the groups in `<ZoneGroupState>`, older firmware
/// returns `<ZoneGroups>` as the root. Both are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ZoneGroupState {
    /// All current zone groups in the system
    #[serde(rename = "ZoneGroups", default)]
    pub zone_groups: ZoneGroups,
}

/// Container for all zone groups in the system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ZoneGroups {
    #[serde(rename = "ZoneGroup", default)]
    pub zone_groups: Vec<ZoneGroup>,
}

/// A single zone group representing speakers playing together.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ZoneGroup {
    /// UUID of the coordinator speaker for this group
    #[serde(rename = "@Coordinator")]
    pub coordinator: String,

    #[serde(rename = "@ID", default)]
    pub id: String,

    #[serde(rename = "ZoneGroupMember", default)]
    pub members: Vec<ZoneGroupMember>,
}

/// A speaker that is part of a zone group.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ZoneGroupMember {
    /// Unique identifier for this speaker (RINCON_...)
    #[serde(rename = "@UUID")]
    pub uuid: String,

    /// Device description URL, e.g. `http://192.168.1.20:1400/xml/device_description.xml`
    #[serde(rename = "@Location", default)]
    pub location: String,

    /// Human-readable name of the room
    #[serde(rename = "@ZoneName", default)]
    pub zone_name: String,

    /// `1` for bonded satellites and subs that never act on their own
    #[serde(rename = "@Invisible", default)]
    pub invisible: Option<String>,
}

impl ZoneGroupState {
    /// Parse the text of a `ZoneGroupState` output argument
    pub fn from_xml(xml: &str) -> ParseResult<Self> {
        if xml.trim().is_empty() {
            return Err(ParseError::MissingRequiredElement("ZoneGroupState".to_string()));
        }
        match xml_decode::parse::<ZoneGroupState>(xml) {
            Ok(state) if !state.zone_groups.zone_groups.is_empty() => Ok(state),
            // Legacy layout, the groups element is the root
            first => match xml_decode::parse::<ZoneGroups>(xml) {
                Ok(groups) if !groups.zone_groups.is_empty() => Ok(ZoneGroupState { zone_groups: groups }),
                _ => first,
            },
        }
    }

    pub fn groups(&self) -> &[ZoneGroup] {
        &self.zone_groups.zone_groups
    }

    /// Every member of every group
    pub fn members(&self) -> impl Iterator<Item = (&ZoneGroup, &ZoneGroupMember)> {
        self.groups()
            .iter()
            .flat_map(|group| group.members.iter().map(move |member| (group, member)))
    }

    /// Find the group containing a specific speaker
    pub fn find_group_containing_speaker(&self, speaker_uuid: &str) -> Option<&ZoneGroup> {
        self.groups()
            .iter()
            .find(|group| group.members.iter().any(|m| m.uuid == speaker_uuid))
    }
}

impl ZoneGroupMember {
    /// Extract the IP address from the location URL
    pub fn ip_address(&self) -> Option<&str> {
        let rest = self.location.split("://").nth(1)?;
        let host_port = rest.split('/').next()?;
        let host = host_port.split(':').next()?;
        (!host.is_empty()).then_some(host)
    }

    pub fn is_invisible(&self) -> bool {
        self.invisible.as_deref() == Some("1")
    }
}
