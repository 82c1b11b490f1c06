//! OAuth 2.0 token endpoint models and the REST client used to talk to the login server.

mod client;
mod token_endpoint_error;
mod token_endpoint_response;

pub use client::{OAuth2Client, AUTHORIZE_PATH, REVOKE_PATH, TOKEN_PATH};
pub use token_endpoint_error::{OAuthFailureResponse, TokenEndpointError};
pub use token_endpoint_response::TokenEndpointResponse;
