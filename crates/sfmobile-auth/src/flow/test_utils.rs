use std::sync::{Arc, Mutex};

use reqwest::StatusCode;

use super::{AuthFlowCollaborators, CollaboratorError};
use crate::{
    account::{
        remove_duplicate_account, AccountManagerError, InMemoryUserAccountManager, UserAccount,
        UserAccountManager,
    },
    identity::{IdentityServiceError, IdentityServiceResponse},
    oauth2::TokenEndpointResponse,
};

pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

fn record(log: &CallLog, call: impl Into<String>) {
    log.lock().unwrap().push(call.into());
}

/// An in-memory account manager that logs its calls into a shared log.
pub struct RecordingAccountManager {
    pub log: CallLog,
    pub inner: InMemoryUserAccountManager,
}

impl RecordingAccountManager {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            inner: InMemoryUserAccountManager::new(),
        }
    }
}

impl UserAccountManager for RecordingAccountManager {
    fn create_account(&self, account: &UserAccount) -> Result<(), AccountManagerError> {
        record(&self.log, "create_account");
        self.inner.create_account(account)
    }

    fn switch_to_user(&self, account: &UserAccount) -> Result<(), AccountManagerError> {
        record(&self.log, "switch_to_user");
        self.inner.switch_to_user(account)
    }

    fn remove_account(&self, account: &UserAccount) -> Result<(), AccountManagerError> {
        record(&self.log, "remove_account");
        self.inner.remove_account(account)
    }

    fn authenticated_users(&self) -> Vec<UserAccount> {
        self.inner.authenticated_users()
    }

    fn current_user(&self) -> Option<UserAccount> {
        self.inner.current_user()
    }
}

pub enum IdentityBehavior {
    Return(Option<IdentityServiceResponse>),
    Fail,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedError {
    pub kind: String,
    pub message: Option<String>,
    pub has_cause: bool,
}

/// Collaborators recording every callback into a shared log.
pub struct RecordingCollaborators {
    pub log: CallLog,
    pub identity: IdentityBehavior,
    pub fail_step: Option<&'static str>,
    pub errors: Mutex<Vec<RecordedError>>,
    pub successes: Mutex<Vec<UserAccount>>,
}

impl RecordingCollaborators {
    pub fn new(log: CallLog, identity: IdentityBehavior) -> Self {
        Self {
            log,
            identity,
            fail_step: None,
            errors: Mutex::new(Vec::new()),
            successes: Mutex::new(Vec::new()),
        }
    }

    pub fn errors(&self) -> Vec<RecordedError> {
        self.errors.lock().unwrap().clone()
    }

    pub fn successes(&self) -> Vec<UserAccount> {
        self.successes.lock().unwrap().clone()
    }

    fn step(&self, name: &'static str) -> Result<(), CollaboratorError> {
        record(&self.log, name);
        if self.fail_step == Some(name) {
            return Err(format!("{name} exploded").into());
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl AuthFlowCollaborators for RecordingCollaborators {
    async fn fetch_user_identity(
        &self,
        _token: &TokenEndpointResponse,
    ) -> Result<Option<IdentityServiceResponse>, IdentityServiceError> {
        record(&self.log, "fetch_user_identity");
        match &self.identity {
            IdentityBehavior::Return(identity) => Ok(identity.clone()),
            IdentityBehavior::Fail => Err(IdentityServiceError::Response {
                status: StatusCode::FORBIDDEN,
                message: "Bad_OAuth_Token".to_string(),
            }),
            IdentityBehavior::Pending => std::future::pending().await,
        }
    }

    fn build_account_name(&self, username: Option<&str>, instance_server: Option<&str>) -> String {
        test_account_name(username, instance_server)
    }

    fn set_administrator_prefs(
        &self,
        _identity: Option<&IdentityServiceResponse>,
        _account: &UserAccount,
    ) -> Result<(), CollaboratorError> {
        self.step("set_administrator_prefs")
    }

    fn handle_duplicate_user_account(
        &self,
        account_manager: &dyn UserAccountManager,
        account: &UserAccount,
        _identity: Option<&IdentityServiceResponse>,
    ) -> Result<(), CollaboratorError> {
        self.step("handle_duplicate_user_account")?;
        remove_duplicate_account(account_manager, account)?;
        Ok(())
    }

    fn add_account(&self, _account: &UserAccount) -> Result<(), CollaboratorError> {
        self.step("add_account")
    }

    fn update_logging_prefs(&self, _account: &UserAccount) -> Result<(), CollaboratorError> {
        self.step("update_logging_prefs")
    }

    fn handle_screen_lock_policy(
        &self,
        _identity: Option<&IdentityServiceResponse>,
        _account: &UserAccount,
    ) -> Result<(), CollaboratorError> {
        self.step("handle_screen_lock_policy")
    }

    fn handle_biometric_auth_policy(
        &self,
        _identity: Option<&IdentityServiceResponse>,
        _account: &UserAccount,
    ) -> Result<(), CollaboratorError> {
        self.step("handle_biometric_auth_policy")
    }

    fn start_main_activity(&self) -> Result<(), CollaboratorError> {
        self.step("start_main_activity")
    }

    fn on_auth_flow_error(
        &self,
        kind: &str,
        message: Option<&str>,
        cause: Option<&(dyn std::error::Error + 'static)>,
    ) {
        record(&self.log, "on_auth_flow_error");
        self.errors.lock().unwrap().push(RecordedError {
            kind: kind.to_string(),
            message: message.map(str::to_string),
            has_cause: cause.is_some(),
        });
    }

    fn on_auth_flow_success(&self, account: &UserAccount) {
        record(&self.log, "on_auth_flow_success");
        self.successes.lock().unwrap().push(account.clone());
    }
}

pub fn test_account_name(username: Option<&str>, instance_server: Option<&str>) -> String {
    format!(
        "{} ({})",
        username.unwrap_or("<none>"),
        instance_server.unwrap_or("<none>")
    )
}
