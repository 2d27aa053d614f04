use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

use super::error::SessionError;

pub const MIN_PASSWORD_LEN: usize = 8;

/// A salted Argon2 hash held in PHC string form. The plaintext is never kept.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    pub fn from_plain(plain: &str) -> anyhow::Result<Self> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "credential hashing failed");
                anyhow::anyhow!("hash credential: {e}")
            })?
            .to_string();
        Ok(Self(phc))
    }

    /// `Ok(false)` only for a wrong password; a corrupt hash is an error.
    pub fn matches(&self, plain: &str) -> anyhow::Result<bool> {
        let parsed = PasswordHash::new(&self.0)
            .map_err(|e| anyhow::anyhow!("stored credential unreadable: {e}"))?;
        match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => {
                error!(error = %e, "credential verification failed");
                Err(anyhow::anyhow!("verify credential: {e}"))
            }
        }
    }
}

/// Rules a replacement password must meet before it is hashed. Length is
/// counted in characters, not bytes.
pub fn check_new_password(new: &str, confirm: &str) -> Result<(), SessionError> {
    if new != confirm {
        return Err(SessionError::PasswordMismatch);
    }
    if new.chars().count() < MIN_PASSWORD_LEN {
        return Err(SessionError::PasswordTooShort(MIN_PASSWORD_LEN));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_matches_only_its_password() {
        let credential = Credential::from_plain("password123").expect("hash");
        assert!(credential.matches("password123").unwrap());
        assert!(!credential.matches("password124").unwrap());
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = Credential::from_plain("password123").unwrap();
        let b = Credential::from_plain("password123").unwrap();
        assert_ne!(a.0, b.0);
    }

    #[test]
    fn corrupt_credential_is_an_error_not_a_mismatch() {
        let credential = Credential("plaintext-secret".into());
        assert!(credential.matches("plaintext-secret").is_err());
    }

    #[test]
    fn new_password_rules() {
        assert!(matches!(
            check_new_password("abcdefgh", "abcdefgx"),
            Err(SessionError::PasswordMismatch)
        ));
        // Seven characters, fourteen bytes.
        assert!(matches!(
            check_new_password("ééééééé", "ééééééé"),
            Err(SessionError::PasswordTooShort(MIN_PASSWORD_LEN))
        ));
        assert!(check_new_password("longenough", "longenough").is_ok());
    }
}
