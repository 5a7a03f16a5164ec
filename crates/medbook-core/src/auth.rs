// Account lifecycle over the local store
use std::sync::Arc;

use medbook_store::{LocalStore, UserAccount};
use tracing::info;

use crate::{
    validation::{is_valid_email, password_issues},
    Error, Result,
};

/// Local account management: sign-up, login, logout, deletion
///
/// Passwords are stored opaque, exactly as entered. This mirrors the
/// upstream behavior; hardening credential storage is out of scope.
pub struct Accounts {
    store: Arc<LocalStore>,
}

impl Accounts {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self { store }
    }

    /// Validate credentials and create the account, logged in
    pub fn sign_up(&self, email: &str, password: &str) -> Result<UserAccount> {
        if !is_valid_email(email) {
            return Err(Error::Validation(format!("'{}' is not a valid email", email)));
        }

        let issues = password_issues(password);
        if !issues.is_empty() {
            let wanted: Vec<&str> = issues.iter().map(|rule| rule.describe()).collect();
            return Err(Error::Validation(format!(
                "password needs {}",
                wanted.join(", ")
            )));
        }

        if !self.store.save_user(email, password)? {
            return Err(Error::DuplicateAccount(email.to_lowercase()));
        }

        info!("Signed up {}", email.to_lowercase());
        self.fetch_existing(email)
    }

    /// Check the password and flip the login flag on
    pub fn log_in(&self, email: &str, password: &str) -> Result<UserAccount> {
        let user = self.fetch_existing(email)?;
        if user.password != password {
            return Err(Error::InvalidCredentials);
        }

        self.store.set_logged_in(email, true)?;
        info!("Logged in {}", user.email);
        self.fetch_existing(email)
    }

    pub fn log_out(&self, email: &str) -> Result<()> {
        self.store.set_logged_in(email, false)?;
        info!("Logged out {}", email.to_lowercase());
        Ok(())
    }

    pub fn delete_account(&self, email: &str) -> Result<()> {
        self.fetch_existing(email)?;
        self.store.delete_user(email)?;
        info!("Deleted account {}", email.to_lowercase());
        Ok(())
    }

    pub fn fetch(&self, email: &str) -> Result<Option<UserAccount>> {
        Ok(self.store.fetch_user(email)?)
    }

    fn fetch_existing(&self, email: &str) -> Result<UserAccount> {
        self.store
            .fetch_user(email)?
            .ok_or_else(|| Error::AccountNotFound(email.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accounts() -> Accounts {
        Accounts::new(Arc::new(LocalStore::in_memory().unwrap()))
    }

    #[test]
    fn test_sign_up_and_log_in() {
        let accounts = accounts();

        let user = accounts.sign_up("Reader@Example.com", "Secret#1x").unwrap();
        assert_eq!(user.email, "reader@example.com");
        assert!(user.logged_in);

        accounts.log_out("reader@example.com").unwrap();
        let user = accounts.log_in("reader@example.com", "Secret#1x").unwrap();
        assert!(user.logged_in);
    }

    #[test]
    fn test_sign_up_rejects_bad_credentials() {
        let accounts = accounts();

        assert!(matches!(
            accounts.sign_up("not-an-email", "Secret#1x"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            accounts.sign_up("reader@example.com", "weak"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_duplicate_email_rejected_case_insensitively() {
        let accounts = accounts();

        accounts.sign_up("A@B.com", "Secret#1x").unwrap();
        assert!(matches!(
            accounts.sign_up("a@b.com", "Other#2yz"),
            Err(Error::DuplicateAccount(_))
        ));
    }

    #[test]
    fn test_log_in_wrong_password() {
        let accounts = accounts();
        accounts.sign_up("reader@example.com", "Secret#1x").unwrap();

        assert!(matches!(
            accounts.log_in("reader@example.com", "Wrong#1xx"),
            Err(Error::InvalidCredentials)
        ));
    }

    #[test]
    fn test_log_in_unknown_account() {
        let accounts = accounts();
        assert!(matches!(
            accounts.log_in("ghost@example.com", "Secret#1x"),
            Err(Error::AccountNotFound(_))
        ));
    }

    #[test]
    fn test_delete_account() {
        let accounts = accounts();
        accounts.sign_up("reader@example.com", "Secret#1x").unwrap();
        accounts.delete_account("reader@example.com").unwrap();
        assert!(accounts.fetch("reader@example.com").unwrap().is_none());
    }
}
