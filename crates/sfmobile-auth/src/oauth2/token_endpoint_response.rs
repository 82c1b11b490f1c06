use std::{
    collections::{BTreeMap, HashMap},
    fmt,
};

use serde::Deserialize;
use serde_json::Value;

use crate::scope::ScopeParser;

/// Raw token endpoint payload. Salesforce adds a number of non-standard fields to the OAuth 2.0
/// token response, all of which are optional.
#[derive(Deserialize, Debug)]
pub(crate) struct TokenEndpointApiResponse {
    access_token: String,
    refresh_token: Option<String>,
    instance_url: String,
    id: String,
    scope: Option<String>,
    issued_at: Option<String>,
    sfdc_community_id: Option<String>,
    sfdc_community_url: Option<String>,
    lightning_domain: Option<String>,
    lightning_sid: Option<String>,
    visualforce_domain: Option<String>,
    visualforce_sid: Option<String>,
    content_domain: Option<String>,
    content_sid: Option<String>,
    csrf_token: Option<String>,
    #[serde(rename = "cookie-clientSrc")]
    cookie_client_src: Option<String>,
    #[serde(rename = "cookie-sidClient")]
    cookie_sid_client: Option<String>,
    #[serde(rename = "sidCookieName")]
    sid_cookie_name: Option<String>,
    parent_sid: Option<String>,
    token_format: Option<String>,
    beacon_child_consumer_key: Option<String>,

    /// Stores unknown api response fields
    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

impl TokenEndpointApiResponse {
    /// Converts the payload, keeping the `additional_oauth_keys` found among the unknown fields.
    pub(crate) fn into_response(self, additional_oauth_keys: &[String]) -> TokenEndpointResponse {
        let additional_oauth_values = additional_oauth_keys
            .iter()
            .filter_map(|key| {
                let value = match self.extra.get(key)? {
                    Value::Null => return None,
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                Some((key.clone(), value))
            })
            .collect();

        TokenEndpointResponse {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            instance_url: self.instance_url,
            id_url: self.id,
            scope: self.scope,
            issued_at: self.issued_at,
            community_id: self.sfdc_community_id,
            community_url: self.sfdc_community_url,
            lightning_domain: self.lightning_domain,
            lightning_sid: self.lightning_sid,
            vf_domain: self.visualforce_domain,
            vf_sid: self.visualforce_sid,
            content_domain: self.content_domain,
            content_sid: self.content_sid,
            csrf_token: self.csrf_token,
            cookie_client_src: self.cookie_client_src,
            cookie_sid_client: self.cookie_sid_client,
            sid_cookie_name: self.sid_cookie_name,
            parent_sid: self.parent_sid,
            token_format: self.token_format,
            beacon_child_consumer_key: self.beacon_child_consumer_key,
            additional_oauth_values,
        }
    }
}

/// The result of an authorization code exchange, a refresh, or a front door bridge.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TokenEndpointResponse {
    /// The access token.
    pub access_token: String,
    /// The refresh token, absent on refresh responses.
    pub refresh_token: Option<String>,
    /// Instance the user's org lives on, e.g. `https://na1.salesforce.com`.
    pub instance_url: String,
    /// Identity service URL, `https://login.salesforce.com/id/<orgId>/<userId>`.
    pub id_url: String,
    /// Space delimited list of granted scopes.
    pub scope: Option<String>,
    /// Issue time in milliseconds since the epoch, as sent by the server.
    pub issued_at: Option<String>,
    #[allow(missing_docs)]
    pub community_id: Option<String>,
    #[allow(missing_docs)]
    pub community_url: Option<String>,
    #[allow(missing_docs)]
    pub lightning_domain: Option<String>,
    #[allow(missing_docs)]
    pub lightning_sid: Option<String>,
    #[allow(missing_docs)]
    pub vf_domain: Option<String>,
    #[allow(missing_docs)]
    pub vf_sid: Option<String>,
    #[allow(missing_docs)]
    pub content_domain: Option<String>,
    #[allow(missing_docs)]
    pub content_sid: Option<String>,
    #[allow(missing_docs)]
    pub csrf_token: Option<String>,
    #[allow(missing_docs)]
    pub cookie_client_src: Option<String>,
    #[allow(missing_docs)]
    pub cookie_sid_client: Option<String>,
    #[allow(missing_docs)]
    pub sid_cookie_name: Option<String>,
    #[allow(missing_docs)]
    pub parent_sid: Option<String>,
    #[allow(missing_docs)]
    pub token_format: Option<String>,
    #[allow(missing_docs)]
    pub beacon_child_consumer_key: Option<String>,
    /// Values of the configured additional OAuth keys present in the response.
    pub additional_oauth_values: BTreeMap<String, String>,
}

impl TokenEndpointResponse {
    /// Creates a response carrying only the required fields.
    pub fn new(
        access_token: impl Into<String>,
        instance_url: impl Into<String>,
        id_url: impl Into<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            instance_url: instance_url.into(),
            id_url: id_url.into(),
            ..Default::default()
        }
    }

    /// Parses a token endpoint JSON payload, keeping the values of `additional_oauth_keys`.
    pub fn from_json(
        json: &str,
        additional_oauth_keys: &[String],
    ) -> Result<Self, serde_json::Error> {
        let response: TokenEndpointApiResponse = serde_json::from_str(json)?;
        Ok(response.into_response(additional_oauth_keys))
    }

    /// The granted scopes.
    pub fn scopes(&self) -> ScopeParser {
        ScopeParser::new(self.scope.as_deref())
    }

    /// The org id, taken from the identity URL.
    pub fn org_id(&self) -> Option<String> {
        self.id_url_segments().map(|(org_id, _)| org_id)
    }

    /// The user id, taken from the identity URL.
    pub fn user_id(&self) -> Option<String> {
        self.id_url_segments().map(|(_, user_id)| user_id)
    }

    fn id_url_segments(&self) -> Option<(String, String)> {
        let url = url::Url::parse(&self.id_url).ok()?;
        let mut segments = url.path_segments()?.filter(|s| !s.is_empty()).rev();
        let user_id = segments.next()?.to_owned();
        let org_id = segments.next()?.to_owned();
        Some((org_id, user_id))
    }
}

// Tokens are left out so they never end up in logs.
impl fmt::Debug for TokenEndpointResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenEndpointResponse")
            .field("instance_url", &self.instance_url)
            .field("id_url", &self.id_url)
            .field("scope", &self.scope)
            .field("community_url", &self.community_url)
            .field("has_refresh_token", &self.refresh_token.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{
        "access_token": "00Dxx!AQ0AQ",
        "refresh_token": "5Aep861",
        "signature": "abc=",
        "scope": "refresh_token id api web",
        "instance_url": "https://na1.salesforce.com",
        "id": "https://login.salesforce.com/id/00Dxx0000001gPL/005xx000001Sv6e",
        "token_type": "Bearer",
        "issued_at": "1700000000000",
        "sfdc_community_url": "https://community.force.com/site",
        "sfdc_community_id": "0DBxx",
        "lightning_domain": "acme.lightning.force.com",
        "lightning_sid": "lsid",
        "visualforce_domain": "acme--c.vf.force.com",
        "visualforce_sid": "vsid",
        "content_domain": "acme--c.content.force.com",
        "content_sid": "csid",
        "csrf_token": "csrf",
        "cookie-clientSrc": "10.0.0.1",
        "cookie-sidClient": "sidc",
        "sidCookieName": "sid",
        "org_type": "sandbox",
        "region": 42
    }"#;

    #[test]
    fn test_parse_full_response() {
        let keys = vec!["org_type".to_string(), "region".to_string(), "missing".to_string()];
        let response = TokenEndpointResponse::from_json(RESPONSE, &keys).unwrap();

        assert_eq!(response.access_token, "00Dxx!AQ0AQ");
        assert_eq!(response.refresh_token.as_deref(), Some("5Aep861"));
        assert_eq!(response.instance_url, "https://na1.salesforce.com");
        assert_eq!(response.community_id.as_deref(), Some("0DBxx"));
        assert_eq!(response.lightning_sid.as_deref(), Some("lsid"));
        assert_eq!(response.vf_domain.as_deref(), Some("acme--c.vf.force.com"));
        assert_eq!(response.cookie_client_src.as_deref(), Some("10.0.0.1"));
        assert_eq!(response.sid_cookie_name.as_deref(), Some("sid"));
        assert_eq!(
            response.additional_oauth_values,
            BTreeMap::from([
                ("org_type".to_string(), "sandbox".to_string()),
                ("region".to_string(), "42".to_string()),
            ])
        );
    }

    #[test]
    fn test_parse_minimal_response() {
        let response = TokenEndpointResponse::from_json(
            r#"{"access_token": "tok", "instance_url": "https://test.salesforce.com", "id": "https://test.salesforce.com/id/00D/005"}"#,
            &[],
        )
        .unwrap();

        assert_eq!(response.refresh_token, None);
        assert!(response.scopes().is_empty());
        assert!(response.additional_oauth_values.is_empty());
    }

    #[test]
    fn test_parse_missing_access_token_fails() {
        let result = TokenEndpointResponse::from_json(
            r#"{"instance_url": "https://test.salesforce.com", "id": "https://test.salesforce.com/id/00D/005"}"#,
            &[],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_ids_from_identity_url() {
        let response = TokenEndpointResponse::new(
            "tok",
            "https://na1.salesforce.com",
            "https://login.salesforce.com/id/00Dxx0000001gPL/005xx000001Sv6e",
        );

        assert_eq!(response.org_id().as_deref(), Some("00Dxx0000001gPL"));
        assert_eq!(response.user_id().as_deref(), Some("005xx000001Sv6e"));
    }

    #[test]
    fn test_ids_from_malformed_identity_url() {
        let response = TokenEndpointResponse::new("tok", "https://na1.salesforce.com", "not a url");

        assert_eq!(response.org_id(), None);
        assert_eq!(response.user_id(), None);
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let response = TokenEndpointResponse::from_json(RESPONSE, &[]).unwrap();
        let debug = format!("{response:?}");

        assert!(!debug.contains("00Dxx!AQ0AQ"));
        assert!(!debug.contains("5Aep861"));
        assert!(debug.contains("https://na1.salesforce.com"));
    }
}
