use std::{collections::BTreeMap, sync::RwLock};

use tracing::info;

use super::UserAccount;

/// An error reported by a [`UserAccountManager`].
#[derive(thiserror::Error, Debug)]
pub enum AccountManagerError {
    /// The account is not stored.
    #[error("Account not found: {0}")]
    NotFound(String),

    /// An internal unspecified error of the backing store.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// The store of authenticated accounts and of the active session.
///
/// Implementations must be safe to share with other parts of the host application.
pub trait UserAccountManager: Send + Sync {
    /// Stores the account, replacing any account stored under the same account name.
    fn create_account(&self, account: &UserAccount) -> Result<(), AccountManagerError>;

    /// Makes `account` the active session.
    fn switch_to_user(&self, account: &UserAccount) -> Result<(), AccountManagerError>;

    /// Removes the account. Removing the active account leaves no active session.
    fn remove_account(&self, account: &UserAccount) -> Result<(), AccountManagerError>;

    /// All stored accounts.
    fn authenticated_users(&self) -> Vec<UserAccount>;

    /// The active session, if any.
    fn current_user(&self) -> Option<UserAccount>;
}

/// Returns a stored account for the same user and org as `account`, stored under a different
/// account name. This happens when a user logs in again through another login server.
pub fn find_duplicate_account(
    manager: &dyn UserAccountManager,
    account: &UserAccount,
) -> Option<UserAccount> {
    manager
        .authenticated_users()
        .into_iter()
        .find(|other| other.account_name != account.account_name && other.is_same_user(account))
}

/// Removes the stale duplicate of `account`, if any, and returns it.
pub fn remove_duplicate_account(
    manager: &dyn UserAccountManager,
    account: &UserAccount,
) -> Result<Option<UserAccount>, AccountManagerError> {
    let Some(duplicate) = find_duplicate_account(manager, account) else {
        return Ok(None);
    };

    info!(account_name = %duplicate.account_name, "Removing duplicate account");
    manager.remove_account(&duplicate)?;
    Ok(Some(duplicate))
}

/// A [`UserAccountManager`] keeping accounts in memory.
#[derive(Debug, Default)]
pub struct InMemoryUserAccountManager {
    inner: RwLock<InMemoryUserAccountManagerInner>,
}

#[derive(Debug, Default)]
struct InMemoryUserAccountManagerInner {
    accounts: BTreeMap<String, UserAccount>,
    current: Option<String>,
}

impl InMemoryUserAccountManager {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserAccountManager for InMemoryUserAccountManager {
    fn create_account(&self, account: &UserAccount) -> Result<(), AccountManagerError> {
        let mut inner = self.inner.write().expect("RwLock is not poisoned");
        inner
            .accounts
            .insert(account.account_name.clone(), account.clone());
        Ok(())
    }

    fn switch_to_user(&self, account: &UserAccount) -> Result<(), AccountManagerError> {
        let mut inner = self.inner.write().expect("RwLock is not poisoned");
        if !inner.accounts.contains_key(&account.account_name) {
            return Err(AccountManagerError::NotFound(account.account_name.clone()));
        }
        inner.current = Some(account.account_name.clone());
        Ok(())
    }

    fn remove_account(&self, account: &UserAccount) -> Result<(), AccountManagerError> {
        let mut inner = self.inner.write().expect("RwLock is not poisoned");
        if inner.accounts.remove(&account.account_name).is_none() {
            return Err(AccountManagerError::NotFound(account.account_name.clone()));
        }
        if inner.current.as_ref() == Some(&account.account_name) {
            inner.current = None;
        }
        Ok(())
    }

    fn authenticated_users(&self) -> Vec<UserAccount> {
        let inner = self.inner.read().expect("RwLock is not poisoned");
        inner.accounts.values().cloned().collect()
    }

    fn current_user(&self) -> Option<UserAccount> {
        let inner = self.inner.read().expect("RwLock is not poisoned");
        let name = inner.current.as_ref()?;
        inner.accounts.get(name).cloned()
    }
}
