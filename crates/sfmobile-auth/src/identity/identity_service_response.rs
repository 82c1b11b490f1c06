use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{BiometricAuthPolicy, ScreenLockPolicy};

/// Custom permission that restricts login to MDM managed installs.
pub const MUST_BE_MANAGED_APP_PERM: &str = "must_be_managed_app";
/// Custom attribute enabling the biometric prompt.
pub const BIOMETRIC_AUTHENTICATION: &str = "ENABLE_BIOMETRIC_AUTHENTICATION";
/// Custom attribute holding the biometric timeout, in minutes.
pub const BIOMETRIC_AUTHENTICATION_TIMEOUT: &str = "BIOMETRIC_AUTHENTICATION_TIMEOUT";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[allow(missing_docs)]
pub struct IdentityPhotos {
    pub picture: Option<String>,
    pub thumbnail: Option<String>,
}

/// Mobile policy configured on the connected app.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MobilePolicy {
    /// Minutes of inactivity before the screen locks.
    pub screen_lock: Option<u32>,
    /// Required PIN length.
    pub pin_length: Option<u32>,
}

/// Attributes of the authenticated user as returned by the identity service.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct IdentityServiceResponse {
    /// The identity URL this response was fetched from.
    #[serde(rename = "id")]
    pub id_url: Option<String>,
    #[allow(missing_docs)]
    pub user_id: Option<String>,
    #[serde(rename = "organization_id")]
    #[allow(missing_docs)]
    pub org_id: Option<String>,
    #[allow(missing_docs)]
    pub username: Option<String>,
    #[allow(missing_docs)]
    pub email: Option<String>,
    #[allow(missing_docs)]
    pub first_name: Option<String>,
    #[allow(missing_docs)]
    pub last_name: Option<String>,
    #[allow(missing_docs)]
    pub display_name: Option<String>,
    #[allow(missing_docs)]
    pub language: Option<String>,
    #[allow(missing_docs)]
    pub locale: Option<String>,
    /// License type of the user, e.g. `STANDARD`.
    pub user_type: Option<String>,
    #[allow(missing_docs)]
    pub photos: Option<IdentityPhotos>,
    /// Service URLs keyed by name (`rest`, `sobjects`, `profile`, ...).
    pub urls: BTreeMap<String, String>,
    #[allow(missing_docs)]
    pub mobile_policy: Option<MobilePolicy>,
    /// Connected app custom permissions.
    pub custom_permissions: BTreeMap<String, Value>,
    /// Connected app custom attributes.
    pub custom_attributes: BTreeMap<String, Value>,
}

impl IdentityServiceResponse {
    /// Parses an identity service JSON payload.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Whether the connected app only allows logins from managed installs.
    pub fn must_be_managed_app(&self) -> bool {
        self.custom_permissions
            .get(MUST_BE_MANAGED_APP_PERM)
            .and_then(value_as_bool)
            .unwrap_or(false)
    }

    #[allow(missing_docs)]
    pub fn picture_url(&self) -> Option<&str> {
        self.photos.as_ref()?.picture.as_deref()
    }

    #[allow(missing_docs)]
    pub fn thumbnail_url(&self) -> Option<&str> {
        self.photos.as_ref()?.thumbnail.as_deref()
    }

    /// The screen lock policy, if the connected app has one with a non-zero timeout.
    pub fn screen_lock_policy(&self) -> Option<ScreenLockPolicy> {
        let policy = self.mobile_policy?;
        match policy.screen_lock? {
            0 => None,
            timeout_minutes => Some(ScreenLockPolicy {
                timeout_minutes,
                pin_length: policy.pin_length.unwrap_or(0),
            }),
        }
    }

    /// The biometric authentication policy, if the connected app sets one.
    pub fn biometric_auth_policy(&self) -> Option<BiometricAuthPolicy> {
        let enabled = self
            .custom_attributes
            .get(BIOMETRIC_AUTHENTICATION)
            .and_then(value_as_bool)?;
        let timeout_minutes = self
            .custom_attributes
            .get(BIOMETRIC_AUTHENTICATION_TIMEOUT)
            .and_then(value_as_u32);

        Some(BiometricAuthPolicy {
            enabled,
            timeout_minutes,
        })
    }
}

// Connected app attributes are configured as formulas, so booleans and numbers frequently arrive
// as strings.
fn value_as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().to_ascii_lowercase().parse().ok(),
        _ => None,
    }
}

fn value_as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
