use crate::{
    account::{default_account_name, remove_duplicate_account, UserAccount, UserAccountManager},
    identity::{IdentityServiceError, IdentityServiceResponse},
    oauth2::TokenEndpointResponse,
};

/// Error returned by host provided callbacks.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

/// Host application hooks invoked by the
/// [`AuthFlowCoordinator`](crate::flow::AuthFlowCoordinator).
///
/// Only identity resolution is asynchronous. Every other hook runs after the account has been
/// built and must not block on I/O for long; they are called in this order:
///
/// 1. [`set_administrator_prefs`](Self::set_administrator_prefs)
/// 2. [`handle_duplicate_user_account`](Self::handle_duplicate_user_account)
/// 3. [`add_account`](Self::add_account)
/// 4. [`update_logging_prefs`](Self::update_logging_prefs)
/// 5. [`handle_screen_lock_policy`](Self::handle_screen_lock_policy)
/// 6. [`handle_biometric_auth_policy`](Self::handle_biometric_auth_policy)
/// 7. [`start_main_activity`](Self::start_main_activity)
/// 8. [`on_auth_flow_success`](Self::on_auth_flow_success)
#[async_trait::async_trait]
pub trait AuthFlowCollaborators: Send + Sync {
    /// Fetches the identity of the user owning `token`. Only called when the token carries the
    /// `id` scope. `Ok(None)` means no identity is available, which is not an error.
    async fn fetch_user_identity(
        &self,
        token: &TokenEndpointResponse,
    ) -> Result<Option<IdentityServiceResponse>, IdentityServiceError>;

    /// Builds the account name. `username` is `None` when no identity is available.
    fn build_account_name(&self, username: Option<&str>, instance_server: Option<&str>) -> String {
        default_account_name(username, instance_server)
    }

    /// Stores administrator preferences (custom attributes) for the account.
    fn set_administrator_prefs(
        &self,
        _identity: Option<&IdentityServiceResponse>,
        _account: &UserAccount,
    ) -> Result<(), CollaboratorError> {
        Ok(())
    }

    /// Reconciles a previously stored account of the same user. Removes the stale account by
    /// default.
    fn handle_duplicate_user_account(
        &self,
        account_manager: &dyn UserAccountManager,
        account: &UserAccount,
        _identity: Option<&IdentityServiceResponse>,
    ) -> Result<(), CollaboratorError> {
        remove_duplicate_account(account_manager, account)?;
        Ok(())
    }

    /// Platform bookkeeping for a new account, e.g. registering it with the OS account store.
    fn add_account(&self, _account: &UserAccount) -> Result<(), CollaboratorError> {
        Ok(())
    }

    /// Applies org level logging preferences.
    fn update_logging_prefs(&self, _account: &UserAccount) -> Result<(), CollaboratorError> {
        Ok(())
    }

    /// Applies the connected app screen lock policy, see
    /// [`IdentityServiceResponse::screen_lock_policy`].
    fn handle_screen_lock_policy(
        &self,
        _identity: Option<&IdentityServiceResponse>,
        _account: &UserAccount,
    ) -> Result<(), CollaboratorError> {
        Ok(())
    }

    /// Applies the connected app biometric policy, see
    /// [`IdentityServiceResponse::biometric_auth_policy`].
    fn handle_biometric_auth_policy(
        &self,
        _identity: Option<&IdentityServiceResponse>,
        _account: &UserAccount,
    ) -> Result<(), CollaboratorError> {
        Ok(())
    }

    /// Hands control back to the UI.
    fn start_main_activity(&self) -> Result<(), CollaboratorError> {
        Ok(())
    }

    /// Called once when the flow is rejected by local policy.
    fn on_auth_flow_error(
        &self,
        kind: &str,
        message: Option<&str>,
        cause: Option<&(dyn std::error::Error + 'static)>,
    );

    /// Called once with the activated account.
    fn on_auth_flow_success(&self, account: &UserAccount);
}
