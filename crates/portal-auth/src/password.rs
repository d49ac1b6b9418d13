use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use portal_types::{Error, Result};

/// Argon2id with a fresh random salt. Only the digest is ever stored.
pub fn hash_password(raw: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(raw.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| Error::Storage(format!("password hashing failed: {e}")))
}

/// An unparseable digest verifies as false rather than erroring; the
/// caller only ever learns "credentials invalid".
pub fn verify_password(raw: &str, digest: &str) -> bool {
    PasswordHash::new(digest)
        .map(|parsed| Argon2::default().verify_password(raw.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let digest = hash_password("hunter22").unwrap();
        assert!(verify_password("hunter22", &digest));
        assert!(!verify_password("hunter23", &digest));
    }

    #[test]
    fn digest_is_salted() {
        let a = hash_password("hunter22").unwrap();
        let b = hash_password("hunter22").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_digest_never_verifies() {
        assert!(!verify_password("hunter22", "not-a-digest"));
    }
}
