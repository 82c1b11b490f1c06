use serde::{Deserialize, Serialize};

/// OAuth client settings of the host application. These settings describe which login server to
/// authenticate against and which connected app to authenticate as.
///
/// Defaults to
///
/// ```
/// # use sfmobile_auth::OAuthSettings;
/// let settings = OAuthSettings {
///     login_server: "https://login.salesforce.com".to_string(),
///     consumer_key: String::new(),
///     redirect_uri: "sfdc://success".to_string(),
///     scopes: vec![],
///     user_agent: "SalesforceMobileSDK Rust".to_string(),
///     additional_oauth_keys: vec![],
/// };
/// let default = OAuthSettings::default();
/// # assert_eq!(settings, default);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct OAuthSettings {
    /// Login server, e.g. `https://login.salesforce.com` or a My Domain URL.
    pub login_server: String,
    /// Connected app consumer key, sent as the OAuth `client_id`.
    pub consumer_key: String,
    /// Connected app callback URL.
    pub redirect_uri: String,
    /// Requested scopes. An empty list lets the connected app decide.
    pub scopes: Vec<String>,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Extra token endpoint fields to keep on the account, e.g. custom connected app attributes.
    pub additional_oauth_keys: Vec<String>,
}

impl Default for OAuthSettings {
    fn default() -> Self {
        Self {
            login_server: "https://login.salesforce.com".into(),
            consumer_key: String::new(),
            redirect_uri: "sfdc://success".into(),
            scopes: Vec::new(),
            user_agent: "SalesforceMobileSDK Rust".into(),
            additional_oauth_keys: Vec::new(),
        }
    }
}

/// Runtime configuration provided by the device management layer (MDM).
pub trait RuntimeConfig: Send + Sync {
    /// Whether the app is installed and managed by an MDM provider.
    fn is_managed_app(&self) -> bool;
}

/// A [`RuntimeConfig`] read once from configuration, for hosts without a live MDM integration.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct StaticRuntimeConfig {
    /// See [`RuntimeConfig::is_managed_app`].
    pub managed_app: bool,
}

impl RuntimeConfig for StaticRuntimeConfig {
    fn is_managed_app(&self) -> bool {
        self.managed_app
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_deserialize_with_defaults() {
        let settings: OAuthSettings = serde_json::from_str(
            r#"{"consumerKey": "3MVG9", "scopes": ["api", "web"], "additionalOauthKeys": ["org_type"]}"#,
        )
        .unwrap();

        assert_eq!(settings.login_server, "https://login.salesforce.com");
        assert_eq!(settings.consumer_key, "3MVG9");
        assert_eq!(settings.scopes, vec!["api", "web"]);
        assert_eq!(settings.additional_oauth_keys, vec!["org_type"]);
    }

    #[test]
    fn test_settings_reject_unknown_fields() {
        let result = serde_json::from_str::<OAuthSettings>(r#"{"clientSecret": "nope"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_static_runtime_config() {
        let config: StaticRuntimeConfig = serde_json::from_str(r#"{"managedApp": true}"#).unwrap();
        assert!(config.is_managed_app());
        assert!(!StaticRuntimeConfig::default().is_managed_app());
    }
}
