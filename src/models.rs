//! Data models for portal responses
//!
//! Every field is optional and anything not declared here lands in `extra`,
//! so a response is never truncated on its way to the caller.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::parser;
use crate::schema::{self, ResponseSchema, Validated};

macro_rules! validated {
    ($($model:ty => $schema:ident),* $(,)?) => {
        $(
            impl Validated for $model {
                fn schema() -> &'static ResponseSchema {
                    &schema::$schema
                }
            }
        )*
    };
}

validated! {
    User => USER,
    ManufacturerConfig => MANUFACTURER_CONFIG,
    FlightInformation => FLIGHT_INFORMATION,
    PortalConfig => PORTAL_CONFIG,
    DeviceInfo => DEVICE_INFO,
    WifiInventory => WIFI_INVENTORY,
    ApiVersion => API_VERSION,
    RegisterDeviceResult => REGISTER_DEVICE,
    SessionInfo => SESSION_INFO,
    InternetProvision => INTERNET_PROVISION,
    AirportInformation => AIRPORT_INFORMATION,
    Weather => WEATHER,
}

/// Read a key that is present as `Some`, even when its value is `null`
///
/// With `#[serde(default)]` an absent key stays `None`, so `null` on a
/// nullish field reads as `Some(None)` and on an untyped one as
/// `Some(Value::Null)`. Both serialize back to `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Someone acting on a record, only ever seen embedded
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "$$type", skip_serializing_if = "Option::is_none")]
    pub type_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response from config/env/manufacturer.json
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManufacturerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    /// Base URL of the on-board API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emulator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wisp_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opco: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deploy_environment: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Timezone offset, sent either as a number or as a string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimezoneOffset {
    Numeric(f64),
    Textual(String),
}

impl TimezoneOffset {
    /// Offset in hours, if the textual form holds a number
    pub fn hours(&self) -> Option<f64> {
        match self {
            TimezoneOffset::Numeric(hours) => Some(*hours),
            TimezoneOffset::Textual(text) => text.trim().parse().ok(),
        }
    }
}

/// Response from v1/flight-information-svc/flight-information
///
/// Nullish fields are `Option<Option<_>>`: `None` when the key is absent,
/// `Some(None)` when it was sent as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightInformation {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub actual_arrival_time: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub actual_departure_time: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aircraft_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_timezone_offset_hrs: Option<TimezoneOffset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_timezone_offset_hrs: Option<TimezoneOffset>,
    #[serde(rename = "destinationIATA", skip_serializing_if = "Option::is_none")]
    pub destination_iata: Option<String>,
    #[serde(rename = "destinationICAO", skip_serializing_if = "Option::is_none")]
    pub destination_icao: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub destination_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub distance_to_destination: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_arrival_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_number_ending_number: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub flight_open: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub flight_route: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ground_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icao: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internet_status: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub isat_connection_status: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub isat_internet_status: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub origin_name: Option<Option<String>>,
    #[serde(rename = "originIATA", skip_serializing_if = "Option::is_none")]
    pub origin_iata: Option<String>,
    #[serde(rename = "originICAO", skip_serializing_if = "Option::is_none")]
    pub origin_icao: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub outside_air_temperature: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub phase: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub scheduled_departure_time: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tail_number: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub takeoff_date_time: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub time_at_destination: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub time_at_origin: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_destination_minutes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_flight_time_minutes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_tags: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub true_heading: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_on_wheels: Option<bool>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub wind_direction: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restricted_internet: Option<bool>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub latitude: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub longitude: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Auth0Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response from config/env/portal-config.json
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ground_service_base_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub air_service_base_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_entitlements: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth0: Option<Auth0Config>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apple_pay_merchant_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Headers the captive portal saw on our request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForwardedHeaders {
    #[serde(rename = "Host", skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(rename = "X-Forwarded-For", skip_serializing_if = "Option::is_none")]
    pub forwarded_for: Option<String>,
    #[serde(flatten)]
    pub other: BTreeMap<String, String>,
}

/// Response from ac/device/info on the provisioning service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(rename = "HTTPHeaders", skip_serializing_if = "Option::is_none")]
    pub http_headers: Option<ForwardedHeaders>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_content: Option<String>,
    /// Same as the `X-Forwarded-For` header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Order details carried JSON-encoded in `additional_content`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalContent {
    pub order_key: Option<String>,
    pub order_item_key: Option<String>,
    pub plan_id: Option<String>,
    pub device_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeviceInfo {
    /// Decode `additional_content`, if present and well formed
    pub fn additional_content(&self) -> Option<AdditionalContent> {
        let raw = self.additional_content.as_deref()?;
        serde_json::from_str(raw.trim()).ok()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryState {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Revision bookkeeping attached to stored records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevisionMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response from v1/inventory-svc/inventory?type=WIFI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WifiInventory {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,
    #[serde(rename = "$$type", skip_serializing_if = "Option::is_none")]
    pub type_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_catalogue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_opened_by: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tail_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory_state: Option<Vec<InventoryState>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avios_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<RevisionMeta>,
    #[serde(rename = "$loki", skip_serializing_if = "Option::is_none")]
    pub loki: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_information: Option<FlightInformation>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response from version.json
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiVersion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// ISO-8601
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response from the register-device call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDeviceResult {
    /// Bearer credential for provisioning calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_token: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    Active,
    Closed,
    Expired,
    Inactive,
    IpReleased,
    New,
    Paused,
    Subscribed,
    Unknown,
    Whitelisted,
}

/// Usage of one connectivity session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<SessionState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub natted_ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_bytes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_bytes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_bytes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_pkts: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_pkts: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_session_time_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_time_secs: Option<f64>,
    /// Epoch milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_mac: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageTitles {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    /// Locale to title, e.g. `en_GB` => "Flight pass"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_titles: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_titles: Option<BTreeMap<String, String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response from v2/internet-svc/internet-provision
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternetProvision {
    #[serde(rename = "$$type", skip_serializing_if = "Option::is_none")]
    pub type_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_item_key: Option<String>,
    /// JWT whose payload carries the device MAC address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioned_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_titles: Option<PackageTitles>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wisp_package_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_full_flight_package: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_session_time_secs: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_info: Option<Vec<SessionInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<RevisionMeta>,
    #[serde(rename = "$loki", skip_serializing_if = "Option::is_none")]
    pub loki: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InternetProvision {
    /// Unverified claims of `device_token`
    pub fn device_token_claims(&self) -> Option<DeviceTokenClaims> {
        parser::parse_device_token(self.device_token.as_deref()?)
    }

    pub fn provisioned_username(&self) -> Option<parser::ProvisionedUsername> {
        parser::ProvisionedUsername::parse(self.provisioned_username.as_deref()?)
    }
}

/// Payload of a device token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceTokenClaims {
    pub mac_address: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response from v1/airport-information-svc
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AirportInformation {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Response from v1/weather-svc/weather
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherUnit {
    #[default]
    Metric,
    Imperial,
}

/// Body of a weather lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRequest {
    pub languages: Vec<String>,
    pub services: Vec<String>,
    pub unit: WeatherUnit,
}

impl Default for WeatherRequest {
    fn default() -> Self {
        Self {
            languages: vec!["en-GB".to_string()],
            services: vec!["currentconditions".to_string(), "forecast5days".to_string()],
            unit: WeatherUnit::Metric,
        }
    }
}
