use reqwest::header;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::{
    identity::{IdentityServiceError, IdentityServiceResponse},
    oauth2::{OAuthFailureResponse, TokenEndpointError, TokenEndpointResponse},
    scope::ScopeParser,
    settings::OAuthSettings,
};

/// Path of the authorization endpoint, relative to the login server.
pub const AUTHORIZE_PATH: &str = "/services/oauth2/authorize";
/// Path of the token endpoint, relative to the login server.
pub const TOKEN_PATH: &str = "/services/oauth2/token";
/// Path of the revoke endpoint, relative to the login server.
pub const REVOKE_PATH: &str = "/services/oauth2/revoke";

/// Client for the OAuth 2.0 endpoints of a Salesforce login server and for the identity service.
///
/// The client performs no retries and sets no timeouts of its own, configure them on the
/// [`reqwest::Client`] passed to [`OAuth2Client::with_http_client`] if needed.
#[derive(Clone, Debug)]
pub struct OAuth2Client {
    settings: OAuthSettings,
    http: reqwest::Client,
}

impl OAuth2Client {
    /// Creates a client with a default HTTP client.
    pub fn new(settings: OAuthSettings) -> Self {
        Self::with_http_client(settings, reqwest::Client::new())
    }

    /// Creates a client sharing an existing HTTP client.
    pub fn with_http_client(settings: OAuthSettings, http: reqwest::Client) -> Self {
        Self { settings, http }
    }

    #[allow(missing_docs)]
    pub fn settings(&self) -> &OAuthSettings {
        &self.settings
    }

    /// Builds the URL of the login page for the web server flow.
    pub fn authorization_url(&self, code_challenge: Option<&str>) -> Result<Url, TokenEndpointError> {
        let mut url = self.endpoint(AUTHORIZE_PATH)?;
        let scope = ScopeParser::compute_scope_parameter(&self.settings.scopes);

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("display", "touch")
                .append_pair("response_type", "code")
                .append_pair("client_id", &self.settings.consumer_key)
                .append_pair("redirect_uri", &self.settings.redirect_uri);
            if !scope.is_empty() {
                query.append_pair("scope", &scope);
            }
            if let Some(code_challenge) = code_challenge {
                query.append_pair("code_challenge", code_challenge);
            }
        }

        Ok(url)
    }

    /// Exchanges an authorization code for tokens.
    #[instrument(skip_all)]
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<TokenEndpointResponse, TokenEndpointError> {
        let mut params = vec![
            ("grant_type", "authorization_code"),
            ("client_id", self.settings.consumer_key.as_str()),
            ("redirect_uri", self.settings.redirect_uri.as_str()),
            ("format", "json"),
            ("code", code),
        ];
        if let Some(code_verifier) = code_verifier {
            params.push(("code_verifier", code_verifier));
        }

        self.send_token_request(&params).await
    }

    /// Obtains a new access token using a refresh token.
    #[instrument(skip_all)]
    pub async fn refresh_auth_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenEndpointResponse, TokenEndpointError> {
        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", self.settings.consumer_key.as_str()),
            ("format", "json"),
            ("refresh_token", refresh_token),
        ];

        let mut response = self.send_token_request(&params).await?;
        // Refresh responses don't echo the refresh token back.
        if response.refresh_token.is_none() {
            response.refresh_token = Some(refresh_token.to_owned());
        }
        Ok(response)
    }

    /// Revokes a refresh token, ending the session on the server.
    #[instrument(skip_all)]
    pub async fn revoke_refresh_token(&self, refresh_token: &str) -> Result<(), TokenEndpointError> {
        let response = self
            .http
            .post(self.endpoint(REVOKE_PATH)?)
            .header(header::USER_AGENT, &self.settings.user_agent)
            .form(&[("token", refresh_token)])
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await?;
        warn!(%status, "Token revocation failed");
        Err(failure_from_body(status, body))
    }

    /// Fetches the identity of the user owning `token`.
    #[instrument(skip_all)]
    pub async fn fetch_identity(
        &self,
        token: &TokenEndpointResponse,
    ) -> Result<IdentityServiceResponse, IdentityServiceError> {
        let response = self
            .http
            .get(&token.id_url)
            .bearer_auth(&token.access_token)
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, &self.settings.user_agent)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!(%status, "Identity service request failed");
            return Err(IdentityServiceError::Response {
                status,
                message: body,
            });
        }

        Ok(IdentityServiceResponse::from_json(&body)?)
    }

    async fn send_token_request(
        &self,
        params: &[(&str, &str)],
    ) -> Result<TokenEndpointResponse, TokenEndpointError> {
        let response = self
            .http
            .post(self.endpoint(TOKEN_PATH)?)
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, &self.settings.user_agent)
            .form(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            debug!("Token endpoint request succeeded");
            return Ok(TokenEndpointResponse::from_json(
                &body,
                &self.settings.additional_oauth_keys,
            )?);
        }

        warn!(%status, "Token endpoint request failed");
        Err(failure_from_body(status, body))
    }

    fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        Url::parse(&self.settings.login_server)?.join(path)
    }
}

fn failure_from_body(status: reqwest::StatusCode, body: String) -> TokenEndpointError {
    match serde_json::from_str::<OAuthFailureResponse>(&body) {
        Ok(response) => TokenEndpointError::Response { status, response },
        Err(_) => TokenEndpointError::UnexpectedResponse {
            status,
            message: body,
        },
    }
}
