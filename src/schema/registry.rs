//! Schemas of every portal response
//!
//! Upstream services add and rename fields without notice, so only what
//! callers rely on is declared here.

use std::sync::LazyLock;

use serde_json::{json, Map, Value};

use super::{ResponseSchema, ISO_TIMESTAMP_FORMAT};

/// Every state a provisioning session has been seen in
pub const SESSION_STATES: &[&str] = &[
    "ACTIVE",
    "CLOSED",
    "EXPIRED",
    "INACTIVE",
    "IP_RELEASED",
    "NEW",
    "PAUSED",
    "SUBSCRIBED",
    "UNKNOWN",
    "WHITELISTED",
];

/// Object with the given properties, none required, extras allowed
fn object<const N: usize>(properties: [(&str, Value); N]) -> Value {
    let properties: Map<String, Value> = properties
        .into_iter()
        .map(|(name, schema)| (name.to_string(), schema))
        .collect();
    json!({"type": "object", "properties": properties})
}

fn string() -> Value {
    json!({"type": "string"})
}

fn number() -> Value {
    json!({"type": "number"})
}

fn boolean() -> Value {
    json!({"type": "boolean"})
}

/// Any value, `null` included
fn unknown() -> Value {
    json!({})
}

fn nullable(kind: &str) -> Value {
    json!({"type": [kind, "null"]})
}

fn literal(tag: &str) -> Value {
    json!({"const": tag})
}

fn iso_timestamp() -> Value {
    json!({"type": "string", "format": ISO_TIMESTAMP_FORMAT})
}

/// Milliseconds since the epoch
fn timestamp() -> Value {
    number()
}

fn array(items: Value) -> Value {
    json!({"type": "array", "items": items})
}

fn record(values: Value) -> Value {
    json!({"type": "object", "additionalProperties": values})
}

fn revision_meta() -> Value {
    object([
        ("revision", number()),
        ("created", timestamp()),
        ("version", number()),
        ("updated", timestamp()),
    ])
}

fn user() -> Value {
    object([
        ("$$type", literal("User")),
        // Sometimes just "first.last"
        ("identity", string()),
        ("username", string()),
        ("firstName", string()),
        ("lastName", string()),
    ])
}

fn flight_information() -> Value {
    let offset = json!({"anyOf": [number(), string()]});

    object([
        ("actualArrivalTime", nullable("string")),
        ("actualDepartureTime", nullable("string")),
        ("aircraftType", string()),
        ("altitude", number()),
        ("arrivalTimezoneOffsetHrs", offset.clone()),
        ("connectionStatus", string()),
        ("departureTimezoneOffsetHrs", offset),
        ("destinationIATA", string()),
        ("destinationICAO", string()),
        ("destinationName", nullable("string")),
        ("distanceToDestination", unknown()),
        ("estimatedArrivalTime", string()),
        ("flightNumber", string()),
        ("flightNumberEndingNumber", string()),
        ("flightOpen", unknown()),
        ("flightRoute", unknown()),
        ("groundSpeed", number()),
        ("icao", string()),
        ("internetStatus", string()),
        ("isatConnectionStatus", nullable("string")),
        ("isatInternetStatus", nullable("string")),
        ("originName", nullable("string")),
        ("originIATA", string()),
        ("originICAO", string()),
        ("outsideAirTemperature", nullable("number")),
        ("phase", unknown()),
        ("scheduledDepartureTime", nullable("string")),
        ("state", string()),
        ("tailNumber", string()),
        ("takeoffDateTime", nullable("string")),
        ("timeAtDestination", unknown()),
        ("timeAtOrigin", unknown()),
        ("timeToDestinationMinutes", number()),
        ("totalFlightTimeMinutes", number()),
        ("routeTags", array(unknown())),
        ("trueHeading", nullable("number")),
        ("weightOnWheels", boolean()),
        ("windDirection", nullable("number")),
        ("windSpeed", nullable("number")),
        ("restrictedInternet", boolean()),
        ("latitude", unknown()),
        ("longitude", unknown()),
    ])
}

fn session_info() -> Value {
    object([
        // Address on the cabin network, usually 172.x.x.x
        ("ipAddress", string()),
        ("state", json!({"type": "string", "enum": SESSION_STATES})),
        ("nattedIpAddress", string()),
        ("vlanName", string()),
        ("inBytes", number()),
        ("outBytes", number()),
        ("allBytes", number()),
        ("inPkts", number()),
        ("outPkts", number()),
        ("allowedSessionTimeSecs", number()),
        ("remainingTimeSecs", number()),
        ("start", timestamp()),
        ("serviceType", string()),
        ("userMac", string()),
    ])
}

pub static USER: LazyLock<ResponseSchema> =
    LazyLock::new(|| ResponseSchema::compile("User", user()));

pub static MANUFACTURER_CONFIG: LazyLock<ResponseSchema> = LazyLock::new(|| {
    ResponseSchema::compile(
        "ManufacturerConfig",
        object([
            ("manufacturer", string()),
            ("emulator", string()),
            ("provisioningService", string()),
            ("wispUrl", string()),
            ("opco", string()),
            ("deployEnvironment", string()),
        ]),
    )
});

pub static FLIGHT_INFORMATION: LazyLock<ResponseSchema> =
    LazyLock::new(|| ResponseSchema::compile("FlightInformation", flight_information()));

pub static PORTAL_CONFIG: LazyLock<ResponseSchema> = LazyLock::new(|| {
    ResponseSchema::compile(
        "PortalConfig",
        object([
            ("groundServiceBasePath", string()),
            ("airServiceBasePath", string()),
            ("title", string()),
            ("iconPath", string()),
            ("enableEntitlements", boolean()),
            ("auth0", object([("clientId", string()), ("domain", string())])),
            ("applePayMerchantId", string()),
        ]),
    )
});

pub static DEVICE_INFO: LazyLock<ResponseSchema> = LazyLock::new(|| {
    ResponseSchema::compile(
        "DeviceInfo",
        object([
            (
                "HTTPHeaders",
                json!({
                    "type": "object",
                    "properties": {"Host": string(), "X-Forwarded-For": string()},
                    "additionalProperties": string(),
                }),
            ),
            // JSON encoded as a string
            ("additional_content", string()),
            ("ip", string()),
            ("mac", string()),
            ("mac_updated_at", string()),
            ("status", string()),
            ("status_reason", string()),
            ("user_agent", string()),
            ("wait_updated_at", string()),
        ]),
    )
});

pub static WIFI_INVENTORY: LazyLock<ResponseSchema> = LazyLock::new(|| {
    let inventory_state = object([
        ("type", string()),
        ("status", string()),
        ("paused", boolean()),
        ("closing", boolean()),
    ]);
    let meta = object([
        ("revision", number()),
        ("created", number()),
        ("version", number()),
    ]);

    ResponseSchema::compile(
        "WifiInventory",
        object([
            ("paused", boolean()),
            ("$$type", literal("FLIGHT_INVENTORY")),
            ("key", string()),
            ("status", string()),
            ("standardCatalogue", string()),
            ("flightOpenedBy", user()),
            ("modified", string()),
            ("created", string()),
            ("flightOrigin", string()),
            ("flightDestination", string()),
            ("tailNumber", string()),
            ("inventoryState", array(inventory_state)),
            ("source", string()),
            ("closing", boolean()),
            ("aviosRate", number()),
            ("meta", meta),
            ("$loki", number()),
            ("flightInformation", flight_information()),
            ("type", literal("WIFI")),
        ]),
    )
});

pub static API_VERSION: LazyLock<ResponseSchema> = LazyLock::new(|| {
    ResponseSchema::compile(
        "ApiVersion",
        object([("version", string()), ("createdAt", iso_timestamp())]),
    )
});

pub static REGISTER_DEVICE: LazyLock<ResponseSchema> = LazyLock::new(|| {
    ResponseSchema::compile("RegisterDeviceResult", object([("deviceToken", string())]))
});

pub static SESSION_INFO: LazyLock<ResponseSchema> =
    LazyLock::new(|| ResponseSchema::compile("SessionInfo", session_info()));

pub static INTERNET_PROVISION: LazyLock<ResponseSchema> = LazyLock::new(|| {
    let package_titles = object([
        ("sku", string()),
        ("itemTitles", record(string())),
        ("categoryTitles", record(string())),
    ]);

    ResponseSchema::compile(
        "InternetProvision",
        object([
            ("$$type", literal("InternetProvision")),
            ("key", string()),
            ("user", user()),
            ("orderKey", string()),
            ("orderItemKey", string()),
            ("deviceToken", string()),
            ("provisionedUsername", string()),
            ("serviceType", string()),
            ("packageTitles", package_titles),
            ("wispPackageType", string()),
            ("isFullFlightPackage", boolean()),
            // Boolean here, unlike the per-session field of the same name
            ("allowedSessionTimeSecs", boolean()),
            ("sessionInfo", array(session_info())),
            ("modified", iso_timestamp()),
            ("created", iso_timestamp()),
            ("provider", string()),
            ("priority", number()),
            ("meta", revision_meta()),
            ("$loki", number()),
        ]),
    )
});

pub static AIRPORT_INFORMATION: LazyLock<ResponseSchema> =
    LazyLock::new(|| ResponseSchema::compile("AirportInformation", object([])));

pub static WEATHER: LazyLock<ResponseSchema> =
    LazyLock::new(|| ResponseSchema::compile("Weather", object([])));
