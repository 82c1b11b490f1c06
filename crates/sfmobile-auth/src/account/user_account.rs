use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{identity::IdentityServiceResponse, oauth2::TokenEndpointResponse};

/// A user session created by a completed authentication flow.
///
/// Accounts are built with [`UserAccountBuilder`] and compared by value: two flows with identical
/// inputs produce equal accounts.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
#[allow(missing_docs)]
pub struct UserAccount {
    /// Key of the account in the account store.
    pub account_name: String,
    pub username: Option<String>,
    pub user_id: Option<String>,
    pub org_id: Option<String>,
    pub community_id: Option<String>,
    pub community_url: Option<String>,
    pub instance_server: String,
    pub login_server: String,
    pub id_url: String,
    pub auth_token: String,
    pub refresh_token: Option<String>,
    /// Consumer key of the connected app that issued the tokens.
    pub client_id: String,
    pub csrf_token: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub language: Option<String>,
    pub locale: Option<String>,
    pub lightning_domain: Option<String>,
    pub lightning_sid: Option<String>,
    pub vf_domain: Option<String>,
    pub vf_sid: Option<String>,
    pub content_domain: Option<String>,
    pub content_sid: Option<String>,
    pub cookie_client_src: Option<String>,
    pub cookie_sid_client: Option<String>,
    pub sid_cookie_name: Option<String>,
    pub parent_sid: Option<String>,
    pub token_format: Option<String>,
    pub beacon_child_consumer_key: Option<String>,
    /// Whether the session was created by native (headless) login.
    pub native_login: bool,
    pub additional_oauth_values: BTreeMap<String, String>,
}

impl UserAccount {
    /// Returns `true` if both accounts belong to the same user of the same org.
    pub fn is_same_user(&self, other: &UserAccount) -> bool {
        self.user_id.is_some() && self.user_id == other.user_id && self.org_id == other.org_id
    }
}

// Session ids and tokens are left out so they never end up in logs.
impl fmt::Debug for UserAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserAccount")
            .field("account_name", &self.account_name)
            .field("username", &self.username)
            .field("user_id", &self.user_id)
            .field("org_id", &self.org_id)
            .field("instance_server", &self.instance_server)
            .field("login_server", &self.login_server)
            .field("community_url", &self.community_url)
            .field("native_login", &self.native_login)
            .finish_non_exhaustive()
    }
}

/// Default account name, `"<username> (<instance server>)"`.
pub fn default_account_name(username: Option<&str>, instance_server: Option<&str>) -> String {
    match (username, instance_server) {
        (Some(username), Some(server)) => format!("{username} ({server})"),
        (Some(username), None) => username.to_owned(),
        (None, Some(server)) => format!("({server})"),
        (None, None) => String::new(),
    }
}

/// Builds a [`UserAccount`] from a token response, overlaid with the identity response if one
/// is available.
///
/// ```
/// # use sfmobile_auth::{account::UserAccountBuilder, oauth2::TokenEndpointResponse};
/// let token = TokenEndpointResponse::new(
///     "token",
///     "https://na1.salesforce.com",
///     "https://login.salesforce.com/id/00D000000000001/005000000000001",
/// );
/// let account = UserAccountBuilder::from_token_endpoint_response(&token)
///     .login_server("https://login.salesforce.com")
///     .client_id("consumer_key")
///     .build();
///
/// assert_eq!(account.user_id.as_deref(), Some("005000000000001"));
/// assert_eq!(account.account_name, "(https://na1.salesforce.com)");
/// ```
#[derive(Clone, Debug)]
#[must_use]
pub struct UserAccountBuilder {
    account: UserAccount,
    account_name: Option<String>,
}

impl UserAccountBuilder {
    /// Starts a builder with every field the token response provides.
    pub fn from_token_endpoint_response(token: &TokenEndpointResponse) -> Self {
        let account = UserAccount {
            account_name: String::new(),
            username: None,
            user_id: token.user_id(),
            org_id: token.org_id(),
            community_id: token.community_id.clone(),
            community_url: token.community_url.clone(),
            instance_server: token.instance_url.clone(),
            login_server: String::new(),
            id_url: token.id_url.clone(),
            auth_token: token.access_token.clone(),
            refresh_token: token.refresh_token.clone(),
            client_id: String::new(),
            csrf_token: token.csrf_token.clone(),
            first_name: None,
            last_name: None,
            display_name: None,
            email: None,
            photo_url: None,
            thumbnail_url: None,
            language: None,
            locale: None,
            lightning_domain: token.lightning_domain.clone(),
            lightning_sid: token.lightning_sid.clone(),
            vf_domain: token.vf_domain.clone(),
            vf_sid: token.vf_sid.clone(),
            content_domain: token.content_domain.clone(),
            content_sid: token.content_sid.clone(),
            cookie_client_src: token.cookie_client_src.clone(),
            cookie_sid_client: token.cookie_sid_client.clone(),
            sid_cookie_name: token.sid_cookie_name.clone(),
            parent_sid: token.parent_sid.clone(),
            token_format: token.token_format.clone(),
            beacon_child_consumer_key: token.beacon_child_consumer_key.clone(),
            native_login: false,
            additional_oauth_values: token.additional_oauth_values.clone(),
        };

        Self {
            account,
            account_name: None,
        }
    }

    /// Overlays the identity attributes. `None` leaves the token derived fields untouched.
    pub fn identity(mut self, identity: Option<&IdentityServiceResponse>) -> Self {
        let Some(identity) = identity else {
            return self;
        };

        let account = &mut self.account;
        account.username = identity.username.clone();
        account.email = identity.email.clone();
        account.first_name = identity.first_name.clone();
        account.last_name = identity.last_name.clone();
        account.display_name = identity.display_name.clone();
        account.photo_url = identity.picture_url().map(str::to_owned);
        account.thumbnail_url = identity.thumbnail_url().map(str::to_owned);
        account.language = identity.language.clone();
        account.locale = identity.locale.clone();
        if identity.user_id.is_some() {
            account.user_id = identity.user_id.clone();
        }
        if identity.org_id.is_some() {
            account.org_id = identity.org_id.clone();
        }
        self
    }

    #[allow(missing_docs)]
    pub fn login_server(mut self, login_server: impl Into<String>) -> Self {
        self.account.login_server = login_server.into();
        self
    }

    #[allow(missing_docs)]
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.account.client_id = client_id.into();
        self
    }

    #[allow(missing_docs)]
    pub fn native_login(mut self, native_login: bool) -> Self {
        self.account.native_login = native_login;
        self
    }

    /// Sets the account name. Defaults to [`default_account_name`].
    pub fn account_name(mut self, account_name: impl Into<String>) -> Self {
        self.account_name = Some(account_name.into());
        self
    }

    /// The username the account name should be derived from, if known yet.
    pub fn username(&self) -> Option<&str> {
        self.account.username.as_deref()
    }

    /// The instance server the account name should be derived from.
    pub fn instance_server(&self) -> &str {
        &self.account.instance_server
    }

    #[allow(missing_docs)]
    pub fn build(self) -> UserAccount {
        let mut account = self.account;
        account.account_name = self.account_name.unwrap_or_else(|| {
            default_account_name(account.username.as_deref(), Some(&account.instance_server))
        });
        account
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> TokenEndpointResponse {
        TokenEndpointResponse {
            refresh_token: Some("refresh".to_string()),
            scope: Some("refresh_token id".to_string()),
            community_url: Some("https://community.force.com".to_string()),
            lightning_sid: Some("lsid".to_string()),
            additional_oauth_values: BTreeMap::from([("k".to_string(), "v".to_string())]),
            ..TokenEndpointResponse::new(
                "tok",
                "https://test.salesforce.com",
                "https://test.salesforce.com/id/00D000000000001/005000000000001",
            )
        }
    }

    fn identity() -> IdentityServiceResponse {
        IdentityServiceResponse::from_json(
            r#"{
                "user_id": "005000000000002",
                "organization_id": "00D000000000002",
                "username": "test@example.com",
                "email": "test@example.com",
                "first_name": "Test",
                "last_name": "User",
                "display_name": "Test User",
                "language": "en_US",
                "locale": "en_US",
                "photos": {"picture": "https://p", "thumbnail": "https://t"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_build_from_token_only() {
        let account = UserAccountBuilder::from_token_endpoint_response(&token())
            .login_server("https://login.salesforce.com")
            .client_id("key")
            .native_login(true)
            .identity(None)
            .build();

        assert_eq!(account.username, None);
        assert_eq!(account.user_id.as_deref(), Some("005000000000001"));
        assert_eq!(account.org_id.as_deref(), Some("00D000000000001"));
        assert_eq!(account.auth_token, "tok");
        assert_eq!(account.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(account.community_url.as_deref(), Some("https://community.force.com"));
        assert_eq!(account.lightning_sid.as_deref(), Some("lsid"));
        assert_eq!(account.login_server, "https://login.salesforce.com");
        assert_eq!(account.client_id, "key");
        assert!(account.native_login);
        assert_eq!(account.additional_oauth_values.get("k").map(String::as_str), Some("v"));
        assert_eq!(account.account_name, "(https://test.salesforce.com)");
    }

    #[test]
    fn test_identity_overlays_token_fields() {
        let identity = identity();
        let account = UserAccountBuilder::from_token_endpoint_response(&token())
            .identity(Some(&identity))
            .build();

        assert_eq!(account.username.as_deref(), Some("test@example.com"));
        assert_eq!(account.user_id.as_deref(), Some("005000000000002"));
        assert_eq!(account.org_id.as_deref(), Some("00D000000000002"));
        assert_eq!(account.display_name.as_deref(), Some("Test User"));
        assert_eq!(account.photo_url.as_deref(), Some("https://p"));
        assert_eq!(account.thumbnail_url.as_deref(), Some("https://t"));
        assert_eq!(account.account_name, "test@example.com (https://test.salesforce.com)");
    }

    #[test]
    fn test_identity_without_ids_keeps_token_ids() {
        let identity = IdentityServiceResponse::from_json(r#"{"username": "u"}"#).unwrap();
        let account = UserAccountBuilder::from_token_endpoint_response(&token())
            .identity(Some(&identity))
            .build();

        assert_eq!(account.user_id.as_deref(), Some("005000000000001"));
        assert_eq!(account.org_id.as_deref(), Some("00D000000000001"));
    }

    #[test]
    fn test_explicit_account_name() {
        let account = UserAccountBuilder::from_token_endpoint_response(&token())
            .account_name("custom")
            .build();

        assert_eq!(account.account_name, "custom");
    }

    #[test]
    fn test_build_is_deterministic() {
        let identity = identity();
        let build = || {
            UserAccountBuilder::from_token_endpoint_response(&token())
                .identity(Some(&identity))
                .login_server("https://login.salesforce.com")
                .client_id("key")
                .build()
        };

        assert_eq!(build(), build());
    }

    #[test]
    fn test_is_same_user() {
        let a = UserAccountBuilder::from_token_endpoint_response(&token()).build();
        let b = UserAccountBuilder::from_token_endpoint_response(&token())
            .account_name("other")
            .build();
        let no_ids = UserAccountBuilder::from_token_endpoint_response(&TokenEndpointResponse::new(
            "tok",
            "https://test.salesforce.com",
            "bogus",
        ))
        .build();

        assert!(a.is_same_user(&b));
        assert!(!no_ids.is_same_user(&no_ids));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let account = UserAccountBuilder::from_token_endpoint_response(&token()).build();
        let debug = format!("{account:?}");

        assert!(!debug.contains("refresh"));
        assert!(!debug.contains("lsid"));
    }

    #[test]
    fn test_serde_round_trip() {
        let identity = identity();
        let account = UserAccountBuilder::from_token_endpoint_response(&token())
            .identity(Some(&identity))
            .build();

        let json = serde_json::to_string(&account).unwrap();
        let parsed: UserAccount = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, account);
    }

    #[test]
    fn test_default_account_name() {
        assert_eq!(default_account_name(Some("u"), Some("s")), "u (s)");
        assert_eq!(default_account_name(Some("u"), None), "u");
        assert_eq!(default_account_name(None, Some("s")), "(s)");
        assert_eq!(default_account_name(None, None), "");
    }
}
