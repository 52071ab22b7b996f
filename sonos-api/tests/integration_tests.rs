//! Operations executed through `SonosClient` over a scripted transport

use std::sync::Arc;

use rstest::rstest;
use soap_client::mock::MockTransport;
use soap_client::SoapError;
use sonos_api::services::av_transport::{self, SetAVTransportURIOperation};
use sonos_api::services::content_directory::{browse_children, BrowseOperation};
use sonos_api::{ApiError, FaultKind, SonosClient};
use sonos_parser::escape_xml;

fn client() -> (Arc<MockTransport>, SonosClient) {
    let mock = Arc::new(MockTransport::new());
    (mock.clone(), SonosClient::with_transport(mock))
}

#[test]
fn test_browse_favorites_through_client() {
    let (mock, client) = client();
    let didl = r#"<DIDL-Lite xmlns:dc="http://purl.org/dc/elements/1.1/"><item id="FV:2/1" parentID="FV:2"><dc:title>Morning</dc:title><res>x-sonosapi-stream:s1?sid=254</res></item></DIDL-Lite>"#;
    mock.push_ok(
        "Browse",
        &format!(
            "<Result>{}</Result><NumberReturned>1</NumberReturned><TotalMatches>1</TotalMatches><UpdateID>3</UpdateID>",
            escape_xml(didl)
        ),
    );

    let response = client
        .execute::<BrowseOperation>("192.168.1.20", &browse_children("FV:2", 100))
        .unwrap();
    let doc = response.document().unwrap();
    assert_eq!(doc.objects()[0].title(), Some("Morning"));

    let call = &mock.calls_for("Browse")[0];
    assert_eq!(call.endpoint, "MediaServer/ContentDirectory/Control");
    assert_eq!(call.arg("ObjectID").as_deref(), Some("FV:2"));
    assert_eq!(call.arg("RequestedCount").as_deref(), Some("100"));
}

#[rstest]
#[case(701, FaultKind::InvalidObjectId)]
#[case(710, FaultKind::InvalidObjectId)]
#[case(804, FaultKind::QueueAddRejected)]
#[case(402, FaultKind::InvalidArgs)]
fn test_faults_surface_with_kind(#[case] code: u16, #[case] kind: FaultKind) {
    let (mock, client) = client();
    mock.push_err("Browse", SoapError::fault(code));

    let err = client
        .execute::<BrowseOperation>("192.168.1.20", &browse_children("show%3A123", 100))
        .unwrap_err();
    assert_eq!(err, ApiError::SoapFault { code, kind, description: None });
}

#[test]
fn test_transport_errors_are_classified() {
    let (mock, client) = client();
    mock.push_err("SetAVTransportURI", SoapError::Timeout("read timed out".to_string()));
    mock.push_err("SetAVTransportURI", SoapError::Network("refused".to_string()));

    let request = av_transport::set_av_transport_uri("x-rincon:RINCON_A".to_string(), String::new());
    assert!(matches!(
        client.execute::<SetAVTransportURIOperation>("10.0.0.3", &request),
        Err(ApiError::Timeout(_))
    ));
    assert!(matches!(
        client.execute::<SetAVTransportURIOperation>("10.0.0.3", &request),
        Err(ApiError::NetworkError(_))
    ));
}

#[test]
fn test_group_join_payload() {
    let (mock, client) = client();
    let request = av_transport::set_av_transport_uri("x-rincon:RINCON_A1400".to_string(), String::new());
    client
        .execute::<SetAVTransportURIOperation>("10.0.0.4", &request)
        .unwrap();

    let call = &mock.calls()[0];
    assert_eq!(call.arg("CurrentURI").as_deref(), Some("x-rincon:RINCON_A1400"));
    assert_eq!(call.arg("CurrentURIMetaData").as_deref(), Some(""));
}
