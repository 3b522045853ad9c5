// Integration tests for `FastmileClient` using wiremock.

use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gatemon_api::fastmile::RebootOutcome;
use gatemon_api::{Error, FastmileClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, FastmileClient) {
    let server = MockServer::start().await;
    let client = client_for(&server.uri());
    (server, client)
}

fn client_for(uri: &str) -> FastmileClient {
    let host = uri.trim_start_matches("http://").to_owned();
    FastmileClient::new(
        &host,
        "admin".to_owned(),
        "hunter2".to_owned().into(),
        &TransportConfig::default(),
    )
    .unwrap()
}

// ── Status ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_prelogin_status_snapshot() {
    let (server, client) = setup().await;

    let body = json!({
        "device_info": [{
            "ModelName": "FastMile 5G Gateway 3.2",
            "Vendor": "NOKIA",
            "SerialNumber": "ALCLB1234567",
            "SoftwareVersion": "1.2105.00.0334",
            "UpTime": 90_061
        }],
        "wan_conns": [{
            "ipConns": [{
                "ConnectionStatus": "Connected",
                "ExternalIPAddress": "100.64.12.34",
                "NATEnabled": 1
            }]
        }],
        "cell_5G_stats_cfg": [{ "stat": { "RSRPCurrent": -98, "SNRCurrent": 14 } }],
        "cell_LTE_stats_cfg": [{ "stat": { "RSRPCurrent": "-104" } }],
        "WAN": [{ "wan_mode": "5G_preferred" }],
        "device_cfg": [{
            "HostName": "office-switch",
            "IPAddress": "192.168.192.10",
            "Active": 1
        }]
    });

    Mock::given(method("GET"))
        .and(path("/prelogin_status_web_app.cgi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let snapshot = client.get_prelogin_status().await.unwrap();

    let info = snapshot.device_info().unwrap();
    assert_eq!(info.model_name.as_deref(), Some("FastMile 5G Gateway 3.2"));
    assert_eq!(info.uptime, Some(90_061));

    let wan = snapshot.wan_info().unwrap();
    let conn = wan.connection.unwrap();
    assert_eq!(conn.connection_status.as_deref(), Some("Connected"));
    assert_eq!(conn.external_ip_address.as_deref(), Some("100.64.12.34"));

    let cell = snapshot.cellular_stats();
    assert_eq!(cell.five_g.unwrap().rsrp, Some(json!(-98)));
    assert_eq!(cell.lte.unwrap().rsrp, Some(json!("-104")));
    assert_eq!(snapshot.connected_devices().len(), 1);
}

#[tokio::test]
async fn test_prelogin_status_rejects_non_json() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/prelogin_status_web_app.cgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = client.get_prelogin_status().await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { .. }));
}

#[tokio::test]
async fn test_status_http_error_maps_to_api() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/prelogin_status_web_app.cgi"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client.get_prelogin_status().await.unwrap_err();
    assert!(matches!(err, Error::Api { status: 500, .. }));
}

// ── Login ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_session_from_cookie() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/login_web_app.cgi"))
        .and(body_string_contains("name=admin"))
        .and(body_string_contains("pubkey="))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "sid=abc123; Path=/")
                .set_body_json(json!({ "pubkey": "c2VydmVyLXB1YmtleQ==" })),
        )
        .mount(&server)
        .await;

    assert!(client.login().await);
    assert!(client.has_session());
}

#[tokio::test]
async fn test_login_session_from_body() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/login_web_app.cgi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sid": "xyz789" })))
        .mount(&server)
        .await;

    assert!(client.login().await);
    assert!(client.has_session());
}

#[tokio::test]
async fn test_login_bare_200_proceeds_without_session() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/login_web_app.cgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&server)
        .await;

    assert!(client.login().await);
    assert!(!client.has_session());
}

#[tokio::test]
async fn test_login_rejected() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/login_web_app.cgi"))
        .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
        .mount(&server)
        .await;

    assert!(!client.login().await);
    assert!(!client.has_session());
}

#[tokio::test]
async fn test_ensure_session_logs_in_once() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/login_web_app.cgi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sid": "once" })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.ensure_session().await);
    assert!(client.ensure_session().await);
}

// ── Reboot ──────────────────────────────────────────────────────────

async fn mount_login_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/login_web_app.cgi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sid": "s1" })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_reboot_primary_endpoint_accepts() {
    let (server, mut client) = setup().await;
    mount_login_ok(&server).await;

    Mock::given(method("POST"))
        .and(path("/reboot_web_app.cgi"))
        .and(body_string_contains("Page=REBOOT"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/command_web_app.cgi"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = client.reboot().await.unwrap();
    assert_eq!(outcome, RebootOutcome::Confirmed);
}

#[tokio::test]
async fn test_reboot_falls_back_to_second_endpoint() {
    let (server, mut client) = setup().await;
    mount_login_ok(&server).await;

    Mock::given(method("POST"))
        .and(path("/reboot_web_app.cgi"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/command_web_app.cgi"))
        .and(body_string_contains("action=reboot"))
        .respond_with(ResponseTemplate::new(202).set_body_string(""))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/maintenance_web_app.cgi"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = client.reboot().await.unwrap();
    assert_eq!(outcome, RebootOutcome::Confirmed);
}

#[tokio::test]
async fn test_reboot_all_endpoints_refuse() {
    let (server, mut client) = setup().await;
    mount_login_ok(&server).await;

    for endpoint in [
        "/reboot_web_app.cgi",
        "/command_web_app.cgi",
        "/maintenance_web_app.cgi",
    ] {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .expect(1)
            .mount(&server)
            .await;
    }

    let err = client.reboot().await.unwrap_err();
    assert!(matches!(err, Error::CommandRejected { .. }));
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn test_reboot_connection_loss_is_presumed_success() {
    // Bind and immediately drop a listener so the port refuses connections,
    // the same signal a mid-reboot gateway gives.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut client = client_for(&format!("http://{addr}"));

    let outcome = client.reboot().await.unwrap();
    assert_eq!(outcome, RebootOutcome::Presumed);
}
