//! Identity service models.
//!
//! The identity service (`/id/<orgId>/<userId>`) describes the authenticated user and carries the
//! connected app policies that must be applied after login.

mod identity_service_response;

pub use identity_service_response::{
    IdentityPhotos, IdentityServiceResponse, MobilePolicy, BIOMETRIC_AUTHENTICATION,
    BIOMETRIC_AUTHENTICATION_TIMEOUT, MUST_BE_MANAGED_APP_PERM,
};
use reqwest::StatusCode;

/// Screen lock requirements of the connected app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLockPolicy {
    /// Minutes of inactivity before the app locks.
    pub timeout_minutes: u32,
    /// Required PIN length, `0` if unspecified.
    pub pin_length: u32,
}

/// Biometric authentication requirements of the connected app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BiometricAuthPolicy {
    /// Whether the biometric prompt is required.
    pub enabled: bool,
    /// Minutes before the biometric prompt is shown again.
    pub timeout_minutes: Option<u32>,
}

/// Errors from calls to the identity service.
#[derive(Debug, thiserror::Error)]
pub enum IdentityServiceError {
    #[error(transparent)]
    #[allow(missing_docs)]
    Api(#[from] reqwest::Error),

    #[error(transparent)]
    #[allow(missing_docs)]
    Json(#[from] serde_json::Error),

    #[error("Received error message from identity service: [{status}] {message}")]
    #[allow(missing_docs)]
    Response { status: StatusCode, message: String },
}
