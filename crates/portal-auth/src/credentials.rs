use portal_db::Stores;
use portal_db::accounts::NewAccount;
use portal_db::models::AccountRow;
use portal_types::api::AccountStatus;
use portal_types::{AuthError, Error, Result};
use tracing::debug;

use crate::password::{hash_password, verify_password};
use crate::token::TokenService;

/// Social ids are fixed-length numeric strings.
pub fn valid_social_id(s: &str) -> bool {
    s.len() == 7 && s.bytes().all(|b| b.is_ascii_digit())
}

/// Register / authenticate / change-password against the account store.
/// Never stores or logs a raw password, and every authentication failure
/// collapses to `InvalidCredentials` so callers cannot probe which check
/// tripped.
pub struct Credentials<'a> {
    stores: &'a Stores,
    tokens: &'a TokenService,
}

impl<'a> Credentials<'a> {
    pub fn new(stores: &'a Stores, tokens: &'a TokenService) -> Self {
        Self { stores, tokens }
    }

    pub fn register(
        &self,
        login: &str,
        password: &str,
        email: &str,
        social_id: &str,
    ) -> Result<AccountRow> {
        if login.len() < 3 || login.len() > 16 {
            return Err(Error::validation("login must be 3 to 16 characters"));
        }
        if password.len() < 8 {
            return Err(Error::validation("password must be at least 8 characters"));
        }
        if !valid_social_id(social_id) {
            return Err(Error::validation("social_id must be exactly 7 digits"));
        }
        if email.is_empty() || !email.contains('@') {
            return Err(Error::validation("email is not valid"));
        }

        let digest = hash_password(password)?;
        self.stores.accounts().create(NewAccount {
            login,
            password_hash: &digest,
            social_id,
            email,
        })
    }

    /// Unknown login, wrong password and banned account are all the same
    /// `InvalidCredentials` outcome.
    pub fn authenticate(&self, login: &str, password: &str) -> Result<String> {
        let account = self
            .stores
            .accounts()
            .get_by_login(login)?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &account.password) {
            return Err(AuthError::InvalidCredentials.into());
        }
        if AccountStatus::parse(&account.status) != Some(AccountStatus::Ok) {
            debug!(account_id = account.id, "login refused for inactive account");
            return Err(AuthError::InvalidCredentials.into());
        }

        self.tokens.issue(account.id)
    }

    pub fn change_password(
        &self,
        account_id: i64,
        old_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let accounts = self.stores.accounts();
        let account = accounts
            .get(account_id)
            .map_err(|_| AuthError::InvalidCredentials)?;

        if !verify_password(old_password, &account.password) {
            return Err(AuthError::InvalidCredentials.into());
        }
        if new_password.len() < 8 {
            return Err(Error::validation("password must be at least 8 characters"));
        }

        let digest = hash_password(new_password)?;
        accounts.update_password(account_id, &digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Stores, TokenService) {
        (Stores::open_in_memory().unwrap(), TokenService::new("test-secret", 30))
    }

    #[test]
    fn register_then_authenticate_round_trips() {
        let (stores, tokens) = setup();
        let creds = Credentials::new(&stores, &tokens);

        let account = creds
            .register("alice", "correct-horse", "alice@example.com", "1234567")
            .unwrap();
        let token = creds.authenticate("alice", "correct-horse").unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), account.id);
    }

    #[test]
    fn register_rejects_bad_social_id() {
        let (stores, tokens) = setup();
        let creds = Credentials::new(&stores, &tokens);

        for bad in ["123456", "12345678", "12a4567", ""] {
            let err = creds
                .register("alice", "correct-horse", "alice@example.com", bad)
                .unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "social_id {bad:?} accepted");
        }
    }

    #[test]
    fn duplicate_login_rejected() {
        let (stores, tokens) = setup();
        let creds = Credentials::new(&stores, &tokens);
        creds.register("alice", "correct-horse", "a@example.com", "1234567").unwrap();

        let err = creds
            .register("alice", "other-password", "b@example.com", "7654321")
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn banned_account_cannot_authenticate_even_with_right_password() {
        let (stores, tokens) = setup();
        let creds = Credentials::new(&stores, &tokens);
        let account = creds
            .register("alice", "correct-horse", "a@example.com", "1234567")
            .unwrap();
        stores.accounts().set_status(account.id, AccountStatus::Banned).unwrap();

        let err = creds.authenticate("alice", "correct-horse").unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::InvalidCredentials)));
    }

    #[test]
    fn wrong_and_unknown_credentials_look_identical() {
        let (stores, tokens) = setup();
        let creds = Credentials::new(&stores, &tokens);
        creds.register("alice", "correct-horse", "a@example.com", "1234567").unwrap();

        let wrong = creds.authenticate("alice", "wrong").unwrap_err();
        let unknown = creds.authenticate("nobody", "whatever").unwrap_err();
        assert!(matches!(wrong, Error::Auth(AuthError::InvalidCredentials)));
        assert!(matches!(unknown, Error::Auth(AuthError::InvalidCredentials)));
    }

    #[test]
    fn change_password_requires_old_password() {
        let (stores, tokens) = setup();
        let creds = Credentials::new(&stores, &tokens);
        let account = creds
            .register("alice", "correct-horse", "a@example.com", "1234567")
            .unwrap();

        let err = creds
            .change_password(account.id, "wrong-old", "new-password-1")
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::InvalidCredentials)));

        creds.change_password(account.id, "correct-horse", "new-password-1").unwrap();
        creds.authenticate("alice", "new-password-1").unwrap();
        assert!(creds.authenticate("alice", "correct-horse").is_err());
    }
}
