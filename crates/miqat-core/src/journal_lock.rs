//! Password lock for the daily-review journal.
//!
//! Only an Argon2id PHC string is ever stored; the plaintext never leaves the
//! request that carried it.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JournalLockError {
    #[error("journal is locked, password required")]
    PasswordRequired,

    #[error("wrong journal password")]
    WrongPassword,

    #[error("stored journal password hash is unreadable: {0}")]
    CorruptHash(String),
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// `Ok(false)` on mismatch; `Err` only when `hash` is not a valid PHC string.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(error) => Err(error),
    }
}

pub struct JournalAccess;

impl JournalAccess {
    /// No stored hash means the journal is open to anyone.
    pub fn check(stored_hash: Option<&str>, attempt: Option<&str>) -> Result<(), JournalLockError> {
        let Some(hash) = stored_hash else {
            return Ok(());
        };

        let attempt = attempt
            .filter(|value| !value.is_empty())
            .ok_or(JournalLockError::PasswordRequired)?;

        match verify_password(attempt, hash) {
            Ok(true) => Ok(()),
            Ok(false) => Err(JournalLockError::WrongPassword),
            Err(error) => Err(JournalLockError::CorruptHash(error.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_salted_argon2id() {
        let first = hash_password("open sesame").unwrap();
        let second = hash_password("open sesame").unwrap();

        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, second);
        assert!(verify_password("open sesame", &first).unwrap());
        assert!(verify_password("open sesame", &second).unwrap());
    }

    #[test]
    fn wrong_password_does_not_verify() {
        let hash = hash_password("right").unwrap();

        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn open_journal_needs_no_password() {
        assert_eq!(JournalAccess::check(None, None), Ok(()));
        assert_eq!(JournalAccess::check(None, Some("anything")), Ok(()));
    }

    #[test]
    fn locked_journal_checks_attempt() {
        let hash = hash_password("diary").unwrap();

        assert_eq!(
            JournalAccess::check(Some(&hash), None),
            Err(JournalLockError::PasswordRequired)
        );
        assert_eq!(
            JournalAccess::check(Some(&hash), Some("")),
            Err(JournalLockError::PasswordRequired)
        );
        assert_eq!(
            JournalAccess::check(Some(&hash), Some("nope")),
            Err(JournalLockError::WrongPassword)
        );
        assert_eq!(JournalAccess::check(Some(&hash), Some("diary")), Ok(()));
    }

    #[test]
    fn garbage_hash_is_reported() {
        assert!(matches!(
            JournalAccess::check(Some("plaintext"), Some("plaintext")),
            Err(JournalLockError::CorruptHash(_))
        ));
    }
}
