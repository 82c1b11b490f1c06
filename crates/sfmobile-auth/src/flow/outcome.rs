use std::fmt;

use super::CollaboratorError;
use crate::{
    account::{AccountManagerError, UserAccount},
    identity::IdentityServiceError,
};

/// Error kind reported to [`on_auth_flow_error`](super::AuthFlowCollaborators::on_auth_flow_error)
/// for policy rejections.
pub const AUTH_FLOW_ERROR_KIND: &str = "Error";

/// A flow vetoed by local policy before any account was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{}", self.message())]
pub enum AuthFlowRejection {
    /// The user is an integration user and the app blocks those.
    IntegrationUserBlocked,
    /// The connected app requires a managed install and the app is not managed.
    ManagedAppRequired,
}

impl AuthFlowRejection {
    /// The error kind passed to the error callback.
    pub fn kind(&self) -> &'static str {
        AUTH_FLOW_ERROR_KIND
    }

    /// The user facing message passed to the error callback.
    pub fn message(&self) -> &'static str {
        match self {
            AuthFlowRejection::IntegrationUserBlocked => {
                "Salesforce Integration users are prohibited from successfully authenticating."
            }
            AuthFlowRejection::ManagedAppRequired => {
                "Authentication only allowed from managed device."
            }
        }
    }
}

/// Result of a flow that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFlowOutcome {
    /// The account was stored and activated.
    Completed(UserAccount),
    /// The flow was rejected, the error callback has been invoked.
    Rejected(AuthFlowRejection),
}

/// A step of the flow performed after the account is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum AuthFlowStep {
    CreateAccount,
    SwitchToUser,
    SetAdministratorPrefs,
    HandleDuplicateUserAccount,
    AddAccount,
    UpdateLoggingPrefs,
    HandleScreenLockPolicy,
    HandleBiometricAuthPolicy,
    StartMainActivity,
}

impl fmt::Display for AuthFlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthFlowStep::CreateAccount => "create account",
            AuthFlowStep::SwitchToUser => "switch to user",
            AuthFlowStep::SetAdministratorPrefs => "set administrator prefs",
            AuthFlowStep::HandleDuplicateUserAccount => "handle duplicate user account",
            AuthFlowStep::AddAccount => "add account",
            AuthFlowStep::UpdateLoggingPrefs => "update logging prefs",
            AuthFlowStep::HandleScreenLockPolicy => "handle screen lock policy",
            AuthFlowStep::HandleBiometricAuthPolicy => "handle biometric auth policy",
            AuthFlowStep::StartMainActivity => "start main activity",
        };
        f.write_str(name)
    }
}

/// Unexpected failures of the flow. These are not reported to the error callback and no
/// rollback of earlier steps is attempted.
#[derive(Debug, thiserror::Error)]
pub enum AuthFlowError {
    /// The identity service could not be reached or rejected the token. No account was created.
    #[error("Identity service request failed: {0}")]
    IdentityFetch(#[from] IdentityServiceError),

    /// The account store failed.
    #[error("Account manager failed to {step}: {source}")]
    AccountManager {
        #[allow(missing_docs)]
        step: AuthFlowStep,
        #[allow(missing_docs)]
        source: AccountManagerError,
    },

    /// A host callback failed.
    #[error("Failed to {step}: {source}")]
    Collaborator {
        #[allow(missing_docs)]
        step: AuthFlowStep,
        #[allow(missing_docs)]
        source: CollaboratorError,
    },
}

impl AuthFlowError {
    /// The step that failed, `None` for identity resolution.
    pub fn step(&self) -> Option<AuthFlowStep> {
        match self {
            AuthFlowError::IdentityFetch(_) => None,
            AuthFlowError::AccountManager { step, .. } | AuthFlowError::Collaborator { step, .. } => {
                Some(*step)
            }
        }
    }
}
