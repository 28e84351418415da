mod helpers;

use helpers::ScriptedTransport;
use wiim_api::{HttpError, WiimClient};
use wiim_sdk::{discover, DiscoveryError, ServiceCatalog, ServiceLabel, SourceCategory};

#[test]
fn test_full_discovery() {
    let transport = ScriptedTransport::wiim_pro();
    let client = WiimClient::with_transport(transport.clone());

    let caps = discover(&client, "10.0.0.40", 1, &ServiceCatalog::builtin()).unwrap();

    assert_eq!(caps.epoch, 1);
    assert_eq!(caps.identity.id, "FF970016A6FE22C21234");
    assert_eq!(caps.identity.name.as_deref(), Some("Living Room"));
    assert_eq!(caps.identity.model.as_deref(), Some("WiiM_Pro_with_gc4a"));
    assert_eq!(caps.identity.firmware.as_deref(), Some("4.6.415145"));

    let sources: Vec<&str> = caps.sources.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(sources, vec!["wifi", "line-in", "bluetooth", "optical"]);
    assert_eq!(caps.sources[0].category, SourceCategory::Streaming);

    let slots: Vec<u8> = caps.presets.iter().map(|p| p.slot).collect();
    assert_eq!(slots, vec![1, 2, 3, 4]);
    assert_eq!(
        caps.services,
        vec![
            ServiceLabel::Known("Spotify".to_string()),
            ServiceLabel::Known("Pandora".to_string()),
        ]
    );
    // generic URL content stays unresolved
    assert_eq!(caps.preset(4).and_then(|p| p.service.clone()), None);
    assert_eq!(caps.presets[0].raw["name"], "Discover Weekly");

    assert_eq!(caps.eq_presets, vec!["Flat", "Acoustic", "Bass Booster", "Rock"]);
    assert_eq!(caps.outputs.len(), 3);
}

#[test]
fn test_lowest_slot_wins_for_service() {
    let client = WiimClient::with_transport(ScriptedTransport::wiim_pro());
    let catalog = ServiceCatalog::builtin();

    for _ in 0..3 {
        let caps = discover(&client, "10.0.0.40", 1, &catalog).unwrap();
        assert_eq!(caps.preset_for_service("Spotify"), Some(1));
        assert_eq!(caps.preset_for_service("pandora"), Some(2));
    }
}

#[test]
fn test_identity_failure_is_fatal() {
    let transport = ScriptedTransport::wiim_pro();
    transport.fail("getStatusEx", HttpError::Network("timed out".to_string()));
    let client = WiimClient::with_transport(transport.clone());

    let err = discover(&client, "10.0.0.40", 1, &ServiceCatalog::builtin()).unwrap_err();

    assert!(matches!(err, DiscoveryError::Identity(ref e) if e.is_unreachable()));
    // nothing else is probed once identity fails
    assert_eq!(transport.calls(), vec!["getStatusEx"]);
}

#[test]
fn test_optional_probe_failures_degrade() {
    let transport = ScriptedTransport::wiim_pro();
    transport.fail("getPresetInfo", HttpError::Network("reset".to_string()));
    transport.respond("EQGetList", "unknown command");
    transport.respond("getNewAudioOutputHardwareMode", "<html>404</html>");
    let client = WiimClient::with_transport(transport);

    let caps = discover(&client, "10.0.0.40", 2, &ServiceCatalog::builtin()).unwrap();

    assert!(caps.presets.is_empty());
    assert!(caps.services.is_empty());
    assert!(!caps.has_eq());
    assert!(!caps.supports_output_switching());
    assert_eq!(caps.sources.len(), 4);
}

#[test]
fn test_unknown_service_stays_distinct() {
    let transport = ScriptedTransport::wiim_pro();
    transport.respond(
        "getPresetInfo",
        r#"{"preset_num":2,"preset_list":[
            {"number":1,"name":"Mandopop","url":"","source":"KKBOX"},
            {"number":2,"name":"Tarab","url":"","source":"Anghami"}
        ]}"#,
    );
    let client = WiimClient::with_transport(transport);

    let caps = discover(&client, "10.0.0.40", 1, &ServiceCatalog::builtin()).unwrap();
    assert_eq!(
        caps.services,
        vec![
            ServiceLabel::Opaque("KKBOX".to_string()),
            ServiceLabel::Opaque("Anghami".to_string()),
        ]
    );

    let extended = ServiceCatalog::builtin().with_alias("KKBOX", "KKBOX");
    let caps = discover(&client, "10.0.0.40", 1, &extended).unwrap();
    assert!(caps.services[0].is_known());
}

#[test]
fn test_missing_plm_support_uses_default_inputs() {
    let transport = ScriptedTransport::wiim_pro();
    transport.respond("getStatusEx", r#"{"DeviceName":"Mini","uuid":"","MAC":"00:22:6C:11:22:33"}"#);
    let client = WiimClient::with_transport(transport);

    let caps = discover(&client, "10.0.0.40", 1, &ServiceCatalog::builtin()).unwrap();
    assert_eq!(caps.identity.id, "00226C112233");
    assert!(caps.source("hdmi").is_some());
    assert!(caps.source("phono").is_some());
}

#[test]
fn test_unreadable_preset_entry_keeps_the_rest() {
    let transport = ScriptedTransport::wiim_pro();
    transport.respond(
        "getPresetInfo",
        r#"{"preset_num":3,"preset_list":[
            {"number":1,"name":"Discover Weekly","url":"","source":"Spotify"},
            null,
            {"number":3,"name":"Jazz24","url":"","source":"TuneIn"}
        ]}"#,
    );
    let client = WiimClient::with_transport(transport);

    let caps = discover(&client, "10.0.0.40", 1, &ServiceCatalog::builtin()).unwrap();

    let slots: Vec<u8> = caps.presets.iter().map(|p| p.slot).collect();
    assert_eq!(slots, vec![1, 3]);
    assert_eq!(caps.preset_for_service("Spotify"), Some(1));
    assert_eq!(caps.preset_for_service("TuneIn"), Some(3));
}
