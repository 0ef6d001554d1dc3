//! Password handling on [`User`].
//!
//! Plaintext only ever lives in `Vec<u8>` buffers that are zeroed as soon as
//! they have been used, whatever the outcome.

use zeroize::Zeroize;

use crate::error::{AppError, Result};
use crate::models::User;
use crate::traits::CredentialHasher;

impl User {
    /// Replaces the plaintext password with a salted hash and wipes the
    /// plaintext buffer.
    pub fn hash_password(&mut self, hasher: &dyn CredentialHasher) -> Result<()> {
        if self.password.is_empty() {
            return Err(AppError::PreconditionFailed("User has no password.".into()));
        }

        let hash = hasher.hash(&self.password)?;
        self.password_hash = Some(hash);
        self.password.zeroize();
        Ok(())
    }

    /// Checks `candidate` against the stored hash. The candidate is zeroed
    /// on every path, including early failures.
    pub fn verify_password(
        &self,
        hasher: &dyn CredentialHasher,
        candidate: &mut Vec<u8>,
    ) -> Result<()> {
        let outcome = self.check_candidate(hasher, candidate);
        candidate.zeroize();
        outcome
    }

    fn check_candidate(&self, hasher: &dyn CredentialHasher, candidate: &[u8]) -> Result<()> {
        let hash = match self.password_hash.as_deref() {
            Some(h) if !h.is_empty() => h,
            _ => {
                return Err(AppError::PreconditionFailed(
                    "User has no password hash.".into(),
                ))
            }
        };

        if candidate.is_empty() {
            return Err(AppError::PreconditionFailed("No password was given.".into()));
        }

        if hasher.verify(candidate, hash)? {
            Ok(())
        } else {
            Err(AppError::Unauthorized("password does not match".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockCredentialHasher;
    use mockall::predicate::*;

    fn hashed_user() -> User {
        User {
            id: 1,
            username: "test".into(),
            email: "test@test.com".into(),
            password: Vec::new(),
            password_hash: Some("$stub$hash".into()),
        }
    }

    #[test]
    fn hash_password_stores_hash_and_wipes_plaintext() {
        let mut hasher = MockCredentialHasher::new();
        hasher
            .expect_hash()
            .with(eq(b"hunter2".as_slice()))
            .times(1)
            .returning(|_| Ok("$stub$hunter2".into()));

        let mut user = User::new();
        user.password = b"hunter2".to_vec();
        user.hash_password(&hasher).unwrap();

        assert_eq!(user.password_hash.as_deref(), Some("$stub$hunter2"));
        assert!(user.password.is_empty());
    }

    #[test]
    fn hash_password_without_plaintext_is_a_precondition_failure() {
        let mut hasher = MockCredentialHasher::new();
        hasher.expect_hash().never();

        let mut user = User::new();
        let err = user.hash_password(&hasher).unwrap_err();
        assert!(matches!(err, AppError::PreconditionFailed(_)));
        assert!(user.password_hash.is_none());
    }

    #[test]
    fn hasher_failure_keeps_plaintext_for_retry() {
        let mut hasher = MockCredentialHasher::new();
        hasher
            .expect_hash()
            .returning(|_| Err(AppError::Internal("out of memory".into())));

        let mut user = User::new();
        user.password = b"pw".to_vec();
        assert!(user.hash_password(&hasher).is_err());
        assert!(user.password_hash.is_none());
        assert_eq!(user.password, b"pw");
    }

    #[test]
    fn verify_password_accepts_match_and_wipes_candidate() {
        let mut hasher = MockCredentialHasher::new();
        hasher
            .expect_verify()
            .with(eq(b"secret".as_slice()), eq("$stub$hash"))
            .returning(|_, _| Ok(true));

        let mut candidate = b"secret".to_vec();
        hashed_user().verify_password(&hasher, &mut candidate).unwrap();
        assert!(candidate.is_empty());
    }

    #[test]
    fn verify_password_mismatch_is_unauthorized() {
        let mut hasher = MockCredentialHasher::new();
        hasher.expect_verify().returning(|_, _| Ok(false));

        let mut candidate = b"wrong".to_vec();
        let err = hashed_user().verify_password(&hasher, &mut candidate).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        assert!(candidate.is_empty());
    }

    #[test]
    fn verify_password_requires_hash_and_candidate() {
        let mut hasher = MockCredentialHasher::new();
        hasher.expect_verify().never();

        let mut candidate = b"secret".to_vec();
        let err = User::new().verify_password(&hasher, &mut candidate).unwrap_err();
        assert!(matches!(err, AppError::PreconditionFailed(_)));
        assert!(candidate.is_empty());

        let mut empty = Vec::new();
        let err = hashed_user().verify_password(&hasher, &mut empty).unwrap_err();
        assert!(matches!(err, AppError::PreconditionFailed(_)));
    }
}
