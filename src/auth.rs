// Password hashing and the bounded-attempt login flow.
// The flow only talks to a `CredentialPrompt`, so the terminal UI and tests
// drive the same loop.

use crate::actions::Account;
use crate::store::{Database, StoreError};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{info, warn};

pub const MAX_ATTEMPTS: u32 = 5;

pub const EMPTY_CREDENTIALS: &str = "username and password can not be empty.";
pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Exceeded maximum login attempts. Try again later.")]
    AttemptsExceeded,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to read credentials: {0}")]
    Prompt(#[source] std::io::Error),
}

/// Source of login credentials.
pub trait CredentialPrompt {
    fn username(&mut self) -> std::io::Result<String>;

    /// Read the password without echoing it.
    fn password(&mut self) -> std::io::Result<String>;

    /// Report a failed attempt to the person logging in.
    fn reject(&mut self, message: &str);
}

/// SHA-256 of the UTF-8 password, lowercase hex.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn verify_password(password: &str, digest: &str) -> bool {
    hash_password(password) == digest
}

/// Run the login loop. Every attempt, including one with empty input,
/// counts against `MAX_ATTEMPTS`.
pub fn login<P: CredentialPrompt>(db: &Database, prompt: &mut P) -> Result<Account, AuthError> {
    for attempt in 1..=MAX_ATTEMPTS {
        let username = prompt.username().map_err(AuthError::Prompt)?;
        let password = prompt.password().map_err(AuthError::Prompt)?;

        if username.is_empty() || password.is_empty() {
            prompt.reject(EMPTY_CREDENTIALS);
            continue;
        }

        match db.read_user_by_username(&username)? {
            Some(user) if verify_password(&password, &user.password) => {
                info!(username = %user.username, role = %user.role, "login succeeded");
                return Ok(Account::from(user));
            }
            _ => {
                warn!(%username, attempt, "login failed");
                prompt.reject(INVALID_CREDENTIALS);
            }
        }
    }

    warn!("login attempts exhausted");
    Err(AuthError::AttemptsExceeded)
}
