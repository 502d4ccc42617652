use crate::application_port::*;
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

/// Argon2id over PHC strings. Hashing uses the configured cost; verifying
/// uses whatever cost is embedded in the stored digest.
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    pub fn try_new(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, CommunityError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| CommunityError::Internal(format!("argon2 params: {e}")))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

async fn run_blocking<T: Send + 'static>(
    work: impl FnOnce() -> Result<T, CommunityError> + Send + 'static,
) -> Result<T, CommunityError> {
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| CommunityError::Internal(format!("hasher task: {e}")))?
}

#[async_trait::async_trait]
impl CredentialHasher for Argon2PasswordHasher {
    async fn hash_password(&self, password: &str) -> Result<String, CommunityError> {
        let argon2 = self.argon2.clone();
        let password = password.to_owned();
        run_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            let hash = argon2
                .hash_password(password.as_bytes(), &salt)
                .map_err(|e| CommunityError::Internal(e.to_string()))?
                .to_string();
            Ok(hash)
        })
        .await
    }

    async fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, CommunityError> {
        let argon2 = self.argon2.clone();
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();
        run_blocking(move || {
            let parsed = PasswordHash::new(&password_hash)
                .map_err(|e| CommunityError::Internal(format!("invalid PHC hash: {e}")))?;

            match argon2.verify_password(password.as_bytes(), &parsed) {
                Ok(_) => Ok(true),
                Err(argon2::password_hash::Error::Password) => Ok(false),
                Err(e) => Err(CommunityError::Internal(format!("verify error: {e}"))),
            }
        })
        .await
    }
}
