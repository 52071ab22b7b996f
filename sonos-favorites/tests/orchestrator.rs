//! Playback requests end to end over a scripted transport

mod common;

use std::sync::Arc;

use soap_client::SoapError;
use sonos_favorites::{
    AddressResolvable, DeviceId, FavoriteRecord, Groupable, NotificationLevel, Playable, PlaybackError,
    PlaybackOrchestrator, PlaybackOutcome, PlaybackRequest, TopologySource, ZoneGroupTopologySource,
};
use sonos_parser::{escape_xml, DIDL_ROOT};

use common::{
    browse_result, client, episode, orchestrator, show_favorite, DEN, DEN_IP, KITCHEN, KITCHEN_IP,
};

#[test]
fn test_container_favorite_plays_newest_episode() {
    let (mock, sink, orchestrator) = orchestrator();
    orchestrator.favorites().replace(vec![show_favorite("show:123")]);
    mock.push_ok(
        "Browse",
        &browse_result(&[
            episode("ep:0", "Zero", None, "u0"),
            episode("ep:1", "One", Some("2023-05-01"), "u1"),
            episode("ep:2", "Two", Some("2024-02-01"), "u2"),
        ]),
    );

    let outcome = orchestrator
        .play_favorite(&PlaybackRequest::new("FV:2/13", [KITCHEN, DEN]))
        .unwrap();

    let target = outcome.target().unwrap();
    assert_eq!(target.uri, "u2");
    assert!(target.meta_data.contains(r#"<item id="ep:2""#));
    match &outcome {
        PlaybackOutcome::Started { group, item, .. } => {
            assert_eq!(group.member_ids, vec![DeviceId::new(KITCHEN), DeviceId::new(DEN)]);
            assert_eq!(item.as_ref().map(|i| i.id.as_str()), Some("ep:2"));
        }
        other => panic!("expected playback, got {:?}", other),
    }

    assert_eq!(mock.actions(), vec!["Browse", "SetAVTransportURI", "SetAVTransportURI", "Play"]);
    let browse = &mock.calls_for("Browse")[0];
    assert_eq!(browse.ip, KITCHEN_IP);
    assert_eq!(browse.arg("ObjectID").as_deref(), Some("show%3A123"));
    let sets = mock.calls_for("SetAVTransportURI");
    assert_eq!(sets[0].ip, DEN_IP);
    assert_eq!(sets[1].ip, KITCHEN_IP);
    assert_eq!(sets[1].arg("CurrentURI").as_deref(), Some("u2"));
    assert!(sink.received().is_empty());
}

#[test]
fn test_direct_favorite_skips_browse() {
    let (mock, _, orchestrator) = orchestrator();
    orchestrator.favorites().replace(vec![FavoriteRecord {
        item_id: "FV:2/4".to_string(),
        title: "Radio".to_string(),
        canonical_object_id: "FV%3A2/4".to_string(),
        uri: Some("x-sonosapi-stream:s1234?sid=254&flags=8224&sn=0".to_string()),
        ..FavoriteRecord::default()
    }]);

    let outcome = orchestrator
        .play_favorite(&PlaybackRequest::new("FV:2/4", [KITCHEN]))
        .unwrap();

    assert!(outcome.is_started());
    assert_eq!(mock.actions(), vec!["SetAVTransportURI", "Play"]);
}

#[test]
fn test_nothing_to_play_notifies_and_leaves_devices_alone() {
    let (mock, sink, orchestrator) = orchestrator();
    orchestrator.favorites().replace(vec![show_favorite("show:123")]);
    mock.push_ok("Browse", &browse_result(&[]));

    let outcome = orchestrator
        .play_favorite(&PlaybackRequest::new("show:123", [KITCHEN, DEN]))
        .unwrap();

    match outcome {
        PlaybackOutcome::NothingToPlay { title, message } => {
            assert_eq!(title, "Morning Show");
            assert!(message.contains("show:123"), "{}", message);
        }
        other => panic!("expected nothing to play, got {:?}", other),
    }
    assert_eq!(mock.actions(), vec!["Browse"]);
    let received = sink.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].level, NotificationLevel::Warning);
}

#[test]
fn test_commit_failure_notifies_and_propagates() {
    let (mock, sink, orchestrator) = orchestrator();
    orchestrator.favorites().replace(vec![show_favorite("show:123")]);
    mock.push_ok("Browse", &browse_result(&[episode("ep:1", "One", None, "u1")]));
    mock.push_err(
        "Play",
        SoapError::Fault {
            code: 705,
            description: Some("Transition not available".to_string()),
        },
    );

    let err = orchestrator
        .play_favorite(&PlaybackRequest::new("FV:2/13", [KITCHEN]))
        .unwrap_err();

    assert!(matches!(err, PlaybackError::Api(_)));
    assert_eq!(err.fault_kind(), Some(sonos_api::FaultKind::TransportLocked));
    let received = sink.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].level, NotificationLevel::Error);
    assert!(received[0].message.contains("Transition not available"), "{}", received[0].message);
}

#[test]
fn test_unknown_favorite_refreshes_once() {
    let (mock, _, orchestrator) = orchestrator();
    mock.push_ok("Browse", &browse_result(&[]));

    let err = orchestrator
        .play_favorite(&PlaybackRequest::new("FV:2/99", [KITCHEN]))
        .unwrap_err();

    assert!(matches!(err, PlaybackError::FavoriteNotFound(id) if id == "FV:2/99"));
    let browses = mock.calls_for("Browse");
    assert_eq!(browses.len(), 1);
    assert_eq!(browses[0].arg("ObjectID").as_deref(), Some("FV:2"));
}

#[test]
fn test_refresh_builds_records_with_canonical_ids() {
    let (mock, _, orchestrator) = orchestrator();
    let res_md = format!(
        r#"{}<container id="1006206cshow%3a123" parentID="1006206c"><dc:title>Morning Show</dc:title><upnp:class>object.container.playlistContainer</upnp:class></container></DIDL-Lite>"#,
        DIDL_ROOT
    );
    let favorite = format!(
        r#"<item id="FV:2/13" parentID="FV:2"><dc:title>Morning Show</dc:title><upnp:class>object.itemobject.item.sonos-favorite</upnp:class><res>x-rincon-cpcontainer:1006206cshow%3a123?sid=254&amp;flags=8300&amp;sn=3</res><r:resMD>{}</r:resMD></item>"#,
        escape_xml(&res_md)
    );
    mock.push_ok("Browse", &browse_result(&[favorite]));

    let count = orchestrator.refresh_favorites(&DeviceId::new(KITCHEN)).unwrap();

    assert_eq!(count, 1);
    let record = orchestrator.favorites().find("FV:2/13").unwrap();
    assert!(record.is_container);
    assert_eq!(record.canonical_object_id, "1006206cshow%3a123");
    assert_eq!(record.uri.as_deref(), Some("x-rincon-cpcontainer:1006206cshow%3a123?sid=254&flags=8300&sn=3"));
    assert!(orchestrator.favorites().find("1006206cshow:123").is_some());
}

#[test]
fn test_browse_favorite_reports_strategy() {
    let (mock, _, orchestrator) = orchestrator();
    orchestrator.favorites().replace(vec![show_favorite("show:123")]);
    mock.push_ok("Browse", &browse_result(&[episode("ep:1", "One", None, "u1")]));

    let outcome = orchestrator
        .browse_favorite("FV:2/13", &DeviceId::new(DEN))
        .unwrap();

    assert_eq!(outcome.items.len(), 1);
    assert_eq!(outcome.attempts.len(), 1);
    assert_eq!(mock.calls_for("Browse")[0].ip, DEN_IP);
}

#[test]
fn test_volume_round_trip() {
    let (mock, _, orchestrator) = orchestrator();
    mock.push_ok("GetVolume", "<CurrentVolume>23</CurrentVolume>");

    orchestrator.set_volume(&DeviceId::new(DEN), 40).unwrap();
    assert_eq!(orchestrator.volume(&DeviceId::new(DEN)).unwrap(), 23);

    let set = &mock.calls_for("SetVolume")[0];
    assert_eq!(set.ip, DEN_IP);
    assert_eq!(set.arg("DesiredVolume").as_deref(), Some("40"));
    assert_eq!(set.arg("Channel").as_deref(), Some("Master"));

    let err = orchestrator.set_volume(&DeviceId::new(DEN), 120).unwrap_err();
    assert!(matches!(err, PlaybackError::Api(sonos_api::ApiError::InvalidParameter(_))));
    assert_eq!(mock.count("SetVolume"), 1);
}

#[test]
fn test_capabilities_are_usable_as_trait_objects() {
    let (_, _, orchestrator) = orchestrator();
    let orchestrator = Arc::new(orchestrator);

    let resolver: Arc<dyn AddressResolvable + Send + Sync> = orchestrator.clone();
    assert_eq!(resolver.resolve_address(&DeviceId::new(KITCHEN)).unwrap(), KITCHEN_IP);

    let grouper: &dyn Groupable = orchestrator.as_ref();
    let group = grouper.form_group(&[DeviceId::new(DEN)]).unwrap();
    assert_eq!(group.coordinator_address, DEN_IP);
}

#[test]
fn test_zone_group_topology_source() {
    let (mock, client) = client();
    let state = r#"<ZoneGroupState><ZoneGroups><ZoneGroup Coordinator="RINCON_A" ID="RINCON_A:1"><ZoneGroupMember UUID="RINCON_A" Location="http://10.0.0.1:1400/xml/device_description.xml" ZoneName="Kitchen"/><ZoneGroupMember UUID="RINCON_S" Location="http://10.0.0.9:1400/xml/device_description.xml" ZoneName="Kitchen" Invisible="1"/></ZoneGroup><ZoneGroup Coordinator="RINCON_B" ID="RINCON_B:4"><ZoneGroupMember UUID="RINCON_B" Location="http://10.0.0.2:1400/xml/device_description.xml" ZoneName="Den"/></ZoneGroup></ZoneGroups></ZoneGroupState>"#;
    mock.push_ok(
        "GetZoneGroupState",
        &format!("<ZoneGroupState>{}</ZoneGroupState>", escape_xml(state)),
    );

    let source = ZoneGroupTopologySource::new(client, "10.0.0.1");
    let entries = source.snapshot().unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, DeviceId::new("RINCON_A"));
    assert_eq!(entries[0].ip, "10.0.0.1");
    assert_eq!(entries[1].zone_name, "Den");
    assert_eq!(entries[1].coordinator_id, Some(DeviceId::new("RINCON_B")));
    assert_eq!(mock.calls_for("GetZoneGroupState")[0].endpoint, "ZoneGroupTopology/Control");
}

#[test]
fn test_orchestrator_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PlaybackOrchestrator>();
}
