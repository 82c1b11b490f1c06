//! User accounts and the account store.

mod account_manager;
mod user_account;

pub use account_manager::{
    find_duplicate_account, remove_duplicate_account, AccountManagerError,
    InMemoryUserAccountManager, UserAccountManager,
};
pub use user_account::{default_account_name, UserAccount, UserAccountBuilder};
