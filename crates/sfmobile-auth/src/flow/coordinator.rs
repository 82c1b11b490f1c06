use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::{
    AuthFlowCollaborators, AuthFlowError, AuthFlowOutcome, AuthFlowRejection, AuthFlowStep,
    CollaboratorError,
};
use crate::{
    account::{AccountManagerError, UserAccount, UserAccountBuilder, UserAccountManager},
    identity::IdentityServiceResponse,
    oauth2::TokenEndpointResponse,
    settings::{OAuthSettings, RuntimeConfig},
};

/// Per flow inputs of [`AuthFlowCoordinator::on_auth_flow_complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthFlowRequest {
    /// Login server the tokens were obtained from.
    pub login_server: String,
    /// Consumer key of the connected app.
    pub consumer_key: String,
    /// Whether the tokens were obtained by native (headless) login.
    pub native_login: bool,
    /// Reject the flow because the user is an integration user and the app blocks those. The
    /// host resolves this before completing the flow.
    pub block_integration_user: bool,
}

impl AuthFlowRequest {
    /// A request for a web login against the configured login server.
    pub fn new(settings: &OAuthSettings) -> Self {
        Self {
            login_server: settings.login_server.clone(),
            consumer_key: settings.consumer_key.clone(),
            native_login: false,
            block_integration_user: false,
        }
    }
}

/// Turns a token endpoint response into an activated, policy compliant session.
///
/// The flow runs in phases:
///
/// 1. integration user gate, before any network call
/// 2. identity resolution, if the token carries the `id` scope
/// 3. managed app gate
/// 4. account materialization
/// 5. persistence and activation
/// 6. policy application
/// 7. completion
///
/// Identity resolution is the only await point, so dropping the returned future before it
/// resolves never leaves a partially stored account behind. Flows for the same account must be
/// serialized by the caller.
#[derive(Clone)]
pub struct AuthFlowCoordinator {
    account_manager: Arc<dyn UserAccountManager>,
    runtime_config: Arc<dyn RuntimeConfig>,
    collaborators: Arc<dyn AuthFlowCollaborators>,
}

impl AuthFlowCoordinator {
    #[allow(missing_docs)]
    pub fn new(
        account_manager: Arc<dyn UserAccountManager>,
        runtime_config: Arc<dyn RuntimeConfig>,
        collaborators: Arc<dyn AuthFlowCollaborators>,
    ) -> Self {
        Self {
            account_manager,
            runtime_config,
            collaborators,
        }
    }

    /// Completes an authentication flow.
    ///
    /// Policy rejections are reported to
    /// [`on_auth_flow_error`](AuthFlowCollaborators::on_auth_flow_error) and returned as
    /// [`AuthFlowOutcome::Rejected`]. Any other failure is returned as an [`AuthFlowError`]
    /// without invoking the error callback.
    #[instrument(skip_all, fields(login_server = %request.login_server))]
    pub async fn on_auth_flow_complete(
        &self,
        token: &TokenEndpointResponse,
        request: &AuthFlowRequest,
    ) -> Result<AuthFlowOutcome, AuthFlowError> {
        if request.block_integration_user {
            return Ok(self.reject(AuthFlowRejection::IntegrationUserBlocked));
        }

        let identity = self.resolve_identity(token).await?;
        let identity = identity.as_ref();

        if let Some(rejection) = self.check_managed_app(identity) {
            return Ok(self.reject(rejection));
        }

        let account = self.build_account(token, identity, request);
        self.activate_account(&account, identity)?;
        self.apply_policies(&account, identity)?;

        step(AuthFlowStep::StartMainActivity, self.collaborators.start_main_activity())?;
        info!(account_name = %account.account_name, "Authentication flow completed");
        self.collaborators.on_auth_flow_success(&account);

        Ok(AuthFlowOutcome::Completed(account))
    }

    async fn resolve_identity(
        &self,
        token: &TokenEndpointResponse,
    ) -> Result<Option<IdentityServiceResponse>, AuthFlowError> {
        if !token.scopes().has_identity_scope() {
            debug!("Token has no identity scope, skipping identity fetch");
            return Ok(None);
        }

        let identity = self.collaborators.fetch_user_identity(token).await?;
        if identity.is_none() {
            debug!("No identity returned for token");
        }
        Ok(identity)
    }

    fn reject(&self, rejection: AuthFlowRejection) -> AuthFlowOutcome {
        warn!(?rejection, "Authentication flow rejected");
        self.collaborators
            .on_auth_flow_error(rejection.kind(), Some(rejection.message()), None);
        AuthFlowOutcome::Rejected(rejection)
    }

    fn check_managed_app(
        &self,
        identity: Option<&IdentityServiceResponse>,
    ) -> Option<AuthFlowRejection> {
        let must_be_managed_app = identity.is_some_and(IdentityServiceResponse::must_be_managed_app);
        if must_be_managed_app && !self.runtime_config.is_managed_app() {
            return Some(AuthFlowRejection::ManagedAppRequired);
        }

        None
    }

    fn build_account(
        &self,
        token: &TokenEndpointResponse,
        identity: Option<&IdentityServiceResponse>,
        request: &AuthFlowRequest,
    ) -> UserAccount {
        let builder = UserAccountBuilder::from_token_endpoint_response(token)
            .identity(identity)
            .login_server(&request.login_server)
            .client_id(&request.consumer_key)
            .native_login(request.native_login);

        let account_name = self
            .collaborators
            .build_account_name(builder.username(), Some(builder.instance_server()));

        builder.account_name(account_name).build()
    }

    fn activate_account(
        &self,
        account: &UserAccount,
        identity: Option<&IdentityServiceResponse>,
    ) -> Result<(), AuthFlowError> {
        let collaborators = &self.collaborators;

        store(AuthFlowStep::CreateAccount, self.account_manager.create_account(account))?;
        store(AuthFlowStep::SwitchToUser, self.account_manager.switch_to_user(account))?;
        debug!(account_name = %account.account_name, "Account stored and activated");

        step(
            AuthFlowStep::SetAdministratorPrefs,
            collaborators.set_administrator_prefs(identity, account),
        )?;
        step(
            AuthFlowStep::HandleDuplicateUserAccount,
            collaborators.handle_duplicate_user_account(
                self.account_manager.as_ref(),
                account,
                identity,
            ),
        )?;
        step(AuthFlowStep::AddAccount, collaborators.add_account(account))?;
        step(
            AuthFlowStep::UpdateLoggingPrefs,
            collaborators.update_logging_prefs(account),
        )
    }

    fn apply_policies(
        &self,
        account: &UserAccount,
        identity: Option<&IdentityServiceResponse>,
    ) -> Result<(), AuthFlowError> {
        step(
            AuthFlowStep::HandleScreenLockPolicy,
            self.collaborators.handle_screen_lock_policy(identity, account),
        )?;
        step(
            AuthFlowStep::HandleBiometricAuthPolicy,
            self.collaborators
                .handle_biometric_auth_policy(identity, account),
        )
    }
}

fn store(step: AuthFlowStep, result: Result<(), AccountManagerError>) -> Result<(), AuthFlowError> {
    result.map_err(|source| AuthFlowError::AccountManager { step, source })
}

fn step(step: AuthFlowStep, result: Result<(), CollaboratorError>) -> Result<(), AuthFlowError> {
    result.map_err(|source| AuthFlowError::Collaborator { step, source })
}
