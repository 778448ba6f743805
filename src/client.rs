//! Portal endpoint client
//!
//! One method per backend call. Each call is a single attempt: build the
//! request, send it, decode the body as JSON, validate it and return it.
//! HTTP status codes are not inspected since the upstream services answer
//! errors with JSON bodies.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::header::{HeaderName, HeaderValue};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::{Config, EndpointsConfig};
use crate::error::Result;
use crate::http::{Redirects, ReqwestTransport, Transport, TransportRequest};
use crate::models::{
    AirportInformation, ApiVersion, DeviceInfo, FlightInformation, InternetProvision,
    ManufacturerConfig, PortalConfig, RegisterDeviceResult, Weather, WeatherRequest,
    WifiInventory,
};
use crate::schema::{self, Validated};

/// Client for the portal and on-board API services
#[derive(Clone)]
pub struct PortalClient {
    portal_base: Url,
    api_base: Url,
    transport: Arc<dyn Transport>,
}

impl PortalClient {
    /// Create a client using the `reqwest` transport
    pub fn new(config: &Config) -> Result<Self> {
        let transport = ReqwestTransport::new(&config.http)?;
        Self::with_transport(&config.endpoints, Arc::new(transport))
    }

    pub fn with_transport(
        endpoints: &EndpointsConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        Ok(Self {
            portal_base: Url::parse(&endpoints.portal_base_url)?,
            api_base: Url::parse(&endpoints.api_base_url)?,
            transport,
        })
    }

    /// Same client, pointed at another API host (e.g. the manufacturer's emulator)
    pub fn with_api_base(&self, api_base: &str) -> Result<Self> {
        Ok(Self {
            api_base: Url::parse(api_base)?,
            ..self.clone()
        })
    }

    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    pub fn portal_base(&self) -> &Url {
        &self.portal_base
    }

    /// Whether the on-board API answers, i.e. whether we are on a plane.
    ///
    /// Never fails: any transport error counts as "no".
    pub async fn is_in_flight(&self) -> bool {
        let url = match self.api_base.join("version.json") {
            Ok(url) => url,
            Err(e) => {
                debug!("In-flight probe skipped: {}", e);
                return false;
            }
        };

        let request = TransportRequest::get(url).redirects(Redirects::Manual);
        match self.transport.execute(request).await {
            Ok(resp) => {
                debug!(
                    "In-flight probe: {} ({})",
                    resp.status,
                    resp.content_type.as_deref().unwrap_or("no content type")
                );
                resp.is_json_success()
            }
            Err(e) => {
                debug!("In-flight probe failed: {}", e);
                false
            }
        }
    }

    pub async fn get_manufacturer_config(&self) -> Result<ManufacturerConfig> {
        let url = cache_busted(&self.portal_base, "config/env/manufacturer.json")?;
        self.fetch(TransportRequest::get(url)).await
    }

    pub async fn get_flight_information(&self) -> Result<FlightInformation> {
        let url = self
            .api_base
            .join("v1/flight-information-svc/flight-information")?;
        self.fetch(TransportRequest::get(url)).await
    }

    pub async fn get_portal_config(&self) -> Result<PortalConfig> {
        let url = cache_busted(&self.portal_base, "config/env/portal-config.json")?;
        self.fetch(TransportRequest::get(url)).await
    }

    /// Ask the provisioning service what it knows about this device
    pub async fn get_device_info(&self, provisioning_service: &str) -> Result<DeviceInfo> {
        let url = Url::parse(provisioning_service)?.join("ac/device/info")?;
        self.fetch(TransportRequest::get(url)).await
    }

    pub async fn get_wifi_inventory(&self) -> Result<WifiInventory> {
        let url = self.api_base.join("v1/inventory-svc/inventory?type=WIFI")?;
        self.fetch(TransportRequest::get(url)).await
    }

    pub async fn get_api_version(&self) -> Result<ApiVersion> {
        let url = self.api_base.join("version.json")?;
        self.fetch(TransportRequest::get(url)).await
    }

    /// Obtain a device token for the provisioning calls
    pub async fn register_device(&self) -> Result<RegisterDeviceResult> {
        // The trailing NONE is required upstream; its meaning is unknown.
        let url = self
            .api_base
            .join("v2/internet-svc/internet-provision/register-device/NONE")?;
        self.fetch(TransportRequest::post(url)).await
    }

    pub async fn get_internet_provision(&self, device_token: &str) -> Result<InternetProvision> {
        let url = self.api_base.join("v2/internet-svc/internet-provision")?;
        let request = TransportRequest::get(url).header(
            HeaderName::from_static("x-device-token"),
            HeaderValue::from_str(device_token)?,
        );
        self.fetch(request).await
    }

    pub async fn get_airport_information(&self, iata: &str) -> Result<AirportInformation> {
        let url = self.api_base.join(&format!(
            "v1/airport-information-svc?iata={}",
            urlencoding::encode(iata)
        ))?;
        self.fetch(TransportRequest::get(url)).await
    }

    pub async fn get_weather(&self, request: &WeatherRequest) -> Result<Weather> {
        let url = self.api_base.join("v1/weather-svc/weather")?;
        self.fetch(TransportRequest::post(url).json(request)?).await
    }

    async fn fetch<T: Validated>(&self, request: TransportRequest) -> Result<T> {
        debug!("{} {}", request.method, request.url);

        let resp = self.transport.execute(request).await?;
        debug!("  -> {} ({} bytes)", resp.status, resp.body.len());

        let value: Value = serde_json::from_slice(&resp.body)?;
        schema::validate(value)
    }
}

/// `base` joined with `path`, plus a `t=<epoch-ms>` query to defeat caches
fn cache_busted(base: &Url, path: &str) -> Result<Url> {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    Ok(base.join(&format!("{path}?t={millis}"))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::http::TransportResponse;
    use crate::models::{SessionState, TimezoneOffset, WeatherUnit};
    use async_trait::async_trait;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> PortalClient {
        let config = Config {
            endpoints: EndpointsConfig {
                portal_base_url: server.base_url(),
                api_base_url: server.base_url(),
            },
            ..Config::default()
        };
        PortalClient::new(&config).unwrap()
    }

    struct Unreachable;

    #[async_trait]
    impl Transport for Unreachable {
        async fn execute(&self, _request: TransportRequest) -> Result<TransportResponse> {
            Err(Error::Transport("network is unreachable".into()))
        }
    }

    fn unreachable_client() -> PortalClient {
        PortalClient::with_transport(&EndpointsConfig::default(), Arc::new(Unreachable)).unwrap()
    }

    #[tokio::test]
    async fn test_flight_information_keeps_textual_offset() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v1/flight-information-svc/flight-information");
                then.status(200).json_body(json!({
                    "originIATA": "LHR",
                    "destinationIATA": "JFK",
                    "arrivalTimezoneOffsetHrs": "-5"
                }));
            })
            .await;

        let flight = client_for(&server).get_flight_information().await.unwrap();
        mock.assert_async().await;

        assert_eq!(flight.origin_iata.as_deref(), Some("LHR"));
        assert_eq!(flight.destination_iata.as_deref(), Some("JFK"));
        assert_eq!(
            flight.arrival_timezone_offset_hrs,
            Some(TimezoneOffset::Textual("-5".to_string()))
        );
        assert!(flight.altitude.is_none());
        assert!(flight.ground_speed.is_none());
        assert!(flight.time_to_destination_minutes.is_none());
    }

    #[tokio::test]
    async fn test_config_files_are_cache_busted() {
        let server = MockServer::start_async().await;
        let manufacturer = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/config/env/manufacturer.json")
                    .query_param_exists("t");
                then.status(200).json_body(json!({
                    "manufacturer": "acme",
                    "emulator": "http://emulator.local/",
                    "provisioningService": "http://prov.local:8054/"
                }));
            })
            .await;
        let portal = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/config/env/portal-config.json")
                    .query_param_exists("t");
                then.status(200).json_body(json!({
                    "title": "Wi-Fi",
                    "auth0": {"clientId": "abc"},
                    "featureFlags": {"newCheckout": true}
                }));
            })
            .await;

        let client = client_for(&server);
        let config = client.get_manufacturer_config().await.unwrap();
        let portal_config = client.get_portal_config().await.unwrap();
        manufacturer.assert_async().await;
        portal.assert_async().await;

        assert_eq!(config.emulator.as_deref(), Some("http://emulator.local/"));
        assert_eq!(
            portal_config.auth0.unwrap().client_id.as_deref(),
            Some("abc")
        );
        assert_eq!(
            portal_config.extra["featureFlags"],
            json!({"newCheckout": true})
        );
    }

    #[tokio::test]
    async fn test_device_info_uses_provisioning_service() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/ac/device/info");
                then.status(200).json_body(json!({
                    "HTTPHeaders": {"Host": "localhost:8054", "X-Forwarded-For": "172.19.0.7"},
                    "ip": "172.19.0.7",
                    "status": "transparent"
                }));
            })
            .await;

        let client = PortalClient::new(&Config::default()).unwrap();
        let info = client
            .get_device_info(&server.base_url())
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(info.ip.as_deref(), Some("172.19.0.7"));
        assert_eq!(info.status.as_deref(), Some("transparent"));
    }

    #[tokio::test]
    async fn test_wifi_inventory_query() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v1/inventory-svc/inventory")
                    .query_param("type", "WIFI");
                then.status(200).json_body(json!({
                    "$$type": "FLIGHT_INVENTORY",
                    "type": "WIFI",
                    "status": "OPEN"
                }));
            })
            .await;

        let inventory = client_for(&server).get_wifi_inventory().await.unwrap();
        mock.assert_async().await;
        assert_eq!(inventory.status.as_deref(), Some("OPEN"));
    }

    #[tokio::test]
    async fn test_wrong_literal_is_shape_mismatch() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/inventory-svc/inventory");
                then.status(200).json_body(json!({"type": "IFE"}));
            })
            .await;

        let err = client_for(&server).get_wifi_inventory().await.unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch(_)));
        assert_eq!(err.mismatch_path(), Some("$.type"));
    }

    #[tokio::test]
    async fn test_api_version() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/version.json");
                then.status(200)
                    .json_body(json!({"version": "1.2.3", "createdAt": "2024-01-01T00:00:00Z"}));
            })
            .await;

        let version = client_for(&server).get_api_version().await.unwrap();
        assert_eq!(version.version.as_deref(), Some("1.2.3"));
    }

    #[tokio::test]
    async fn test_register_device() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v2/internet-svc/internet-provision/register-device/NONE");
                then.status(200).json_body(json!({"deviceToken": "abc"}));
            })
            .await;

        let result = client_for(&server).register_device().await.unwrap();
        mock.assert_async().await;
        assert_eq!(result.device_token.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_register_device_non_json_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v2/internet-svc/internet-provision/register-device/NONE");
                then.status(200)
                    .header("content-type", "text/html")
                    .body("<html>captive portal</html>");
            })
            .await;

        let err = client_for(&server).register_device().await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[tokio::test]
    async fn test_error_status_still_decoded() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v2/internet-svc/internet-provision/register-device/NONE");
                then.status(403)
                    .json_body(json!({"errorCode": "NOT_ON_BOARD"}));
            })
            .await;

        let result = client_for(&server).register_device().await.unwrap();
        assert!(result.device_token.is_none());
        assert_eq!(result.extra["errorCode"], json!("NOT_ON_BOARD"));
    }

    #[tokio::test]
    async fn test_internet_provision_sends_device_token() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v2/internet-svc/internet-provision")
                    .header("x-device-token", "tok-123");
                then.status(200).json_body(json!({
                    "$$type": "InternetProvision",
                    "created": "2025-08-03T09:59:42.572Z",
                    "sessionInfo": [{"state": "ACTIVE", "userMac": "aa:bb:cc:dd:ee:ff"}]
                }));
            })
            .await;

        let provision = client_for(&server)
            .get_internet_provision("tok-123")
            .await
            .unwrap();
        mock.assert_async().await;

        let sessions = provision.session_info.unwrap();
        assert_eq!(sessions[0].state, Some(SessionState::Active));
    }

    #[tokio::test]
    async fn test_internet_provision_rejects_unknown_state() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/internet-svc/internet-provision");
                then.status(200)
                    .json_body(json!({"sessionInfo": [{"state": "BOGUS"}]}));
            })
            .await;

        let err = client_for(&server)
            .get_internet_provision("tok")
            .await
            .unwrap_err();
        assert_eq!(err.mismatch_path(), Some("$.sessionInfo[0].state"));
    }

    #[tokio::test]
    async fn test_airport_code_is_escaped() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v1/airport-information-svc")
                    .query_param("iata", "L&R");
                then.status(200).json_body(json!({"name": "Somewhere"}));
            })
            .await;

        let airport = client_for(&server)
            .get_airport_information("L&R")
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(airport.fields["name"], json!("Somewhere"));
    }

    #[tokio::test]
    async fn test_weather_posts_json_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/weather-svc/weather")
                    .header("content-type", "application/json")
                    .json_body(json!({
                        "languages": ["en-GB"],
                        "services": ["currentconditions"],
                        "unit": "Imperial"
                    }));
                then.status(200).json_body(json!({"currentconditions": []}));
            })
            .await;

        let request = WeatherRequest {
            services: vec!["currentconditions".to_string()],
            unit: WeatherUnit::Imperial,
            ..WeatherRequest::default()
        };
        let weather = client_for(&server).get_weather(&request).await.unwrap();
        mock.assert_async().await;
        assert!(weather.fields.contains_key("currentconditions"));
    }

    #[tokio::test]
    async fn test_with_api_base_switches_host() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/emulator/version.json");
                then.status(200).json_body(json!({"version": "9"}));
            })
            .await;

        let client = PortalClient::new(&Config::default())
            .unwrap()
            .with_api_base(&format!("{}/emulator/", server.base_url()))
            .unwrap();
        let version = client.get_api_version().await.unwrap();
        mock.assert_async().await;
        assert_eq!(version.version.as_deref(), Some("9"));
    }

    #[tokio::test]
    async fn test_concurrent_calls_are_independent() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v1/flight-information-svc/flight-information");
                then.status(200).json_body(json!({"flightNumber": "BA117"}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/inventory-svc/inventory");
                then.status(200).json_body(json!({"key": "inv-1"}));
            })
            .await;

        let client = client_for(&server);
        let (flight, inventory) =
            tokio::join!(client.get_flight_information(), client.get_wifi_inventory());
        assert_eq!(flight.unwrap().flight_number.as_deref(), Some("BA117"));
        assert_eq!(inventory.unwrap().key.as_deref(), Some("inv-1"));
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let err = unreachable_client()
            .get_flight_information()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[tokio::test]
    async fn test_is_in_flight() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/version.json");
                then.status(200)
                    .header("content-type", "application/json; charset=utf-8")
                    .body(r#"{"version":"1.0.0"}"#);
            })
            .await;

        assert!(client_for(&server).is_in_flight().await);
    }

    #[tokio::test]
    async fn test_is_in_flight_needs_json() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/version.json");
                then.status(200)
                    .header("content-type", "text/html")
                    .body("<html>login</html>");
            })
            .await;

        assert!(!client_for(&server).is_in_flight().await);
    }

    #[tokio::test]
    async fn test_is_in_flight_needs_success_status() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/version.json");
                then.status(500)
                    .header("content-type", "application/json")
                    .body(r#"{"error":"down"}"#);
            })
            .await;

        assert!(!client_for(&server).is_in_flight().await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_is_in_flight_does_not_follow_redirects() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/version.json");
                then.status(302).header("location", "/captive/version.json");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/captive/version.json");
                then.status(200)
                    .header("content-type", "application/json")
                    .body("{}");
            })
            .await;

        assert!(!client_for(&server).is_in_flight().await);
    }

    #[tokio::test]
    async fn test_is_in_flight_swallows_transport_errors() {
        assert!(!unreachable_client().is_in_flight().await);

        let config = Config {
            endpoints: EndpointsConfig {
                api_base_url: "http://127.0.0.1:1/".to_string(),
                ..EndpointsConfig::default()
            },
            ..Config::default()
        };
        assert!(!PortalClient::new(&config).unwrap().is_in_flight().await);
    }

    #[test]
    fn test_cache_busted_url() {
        let base = Url::parse("https://shop.ba.com").unwrap();
        let url = cache_busted(&base, "config/env/manufacturer.json").unwrap();
        assert_eq!(url.path(), "/config/env/manufacturer.json");
        let (key, value) = url.query_pairs().next().unwrap();
        assert_eq!(key, "t");
        assert!(value.parse::<u128>().unwrap() > 0);
    }
}
