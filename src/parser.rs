//! Parsing of structured strings embedded in provisioning records

use std::sync::LazyLock;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use regex::Regex;

use crate::models::DeviceTokenClaims;

static PROVISIONED_USERNAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^-]+)--([0-9A-Fa-f]{32})--([^-]+)--(.+)$")
        .expect("provisioned username pattern compiles")
});

/// Parts of a `XXX--<orderItemKey>--SSSS--sss` username
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedUsername {
    pub prefix: String,
    pub order_item_key: String,
    /// Same as the session's `serviceType`
    pub service_type: String,
    /// Close to, but not always equal to, the service type (e.g. `free_strm`)
    pub package: String,
}

impl ProvisionedUsername {
    pub fn parse(raw: &str) -> Option<Self> {
        let caps = PROVISIONED_USERNAME.captures(raw.trim())?;
        let part = |i: usize| caps.get(i).map(|m| m.as_str().to_string());

        Some(Self {
            prefix: part(1)?,
            order_item_key: part(2)?,
            service_type: part(3)?,
            package: part(4)?,
        })
    }
}

/// Decode the payload of a device token without checking its signature
pub fn parse_device_token(token: &str) -> Option<DeviceTokenClaims> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}
