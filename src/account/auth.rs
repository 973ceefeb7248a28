//! Password verification and password-based encryption of secrets

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::config::SecurityConfig;

const NONCE_LEN: usize = 12;
const SALT_LEN: usize = 16;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid password")]
    InvalidPassword,
    #[error("Invalid KDF parameters: {0}")]
    InvalidParams(String),
    #[error("Encryption failed")]
    EncryptionFailed,
    #[error("Decryption failed")]
    DecryptionFailed,
    #[error("Malformed sealed secret")]
    Malformed,
}

/// Hash a password using Argon2id with the configured cost
pub fn hash_password(password: &str, security: &SecurityConfig) -> Result<String, AuthError> {
    let params = Params::new(
        security.argon2_memory_kib,
        security.argon2_iterations,
        1,
        None,
    )
    .map_err(|e| AuthError::InvalidParams(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::InvalidParams(e.to_string()))?
        .to_string();
    Ok(hash)
}

/// Verify a password against a PHC hash string. Cost parameters come from
/// the hash itself.
pub fn verify_password(password: &str, password_hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(password_hash).map_err(|_| AuthError::Malformed)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidPassword)
}

/// Derive an encryption key from a password and salt
pub fn derive_encryption_key(password: &str, salt: &[u8], rounds: u32) -> Zeroizing<[u8; 32]> {
    use hmac::Hmac;
    use pbkdf2::pbkdf2;

    let mut key = Zeroizing::new([0u8; 32]);
    pbkdf2::<Hmac<Sha256>>(password.as_bytes(), salt, rounds, &mut key[..]);
    key
}

/// Encrypt data using AES-256-GCM. Output is nonce || ciphertext.
pub fn encrypt_data(
    data: &[u8],
    password: &str,
    salt: &[u8],
    rounds: u32,
) -> Result<Vec<u8>, AuthError> {
    let key = derive_encryption_key(password, salt, rounds);
    let cipher = Aes256Gcm::new_from_slice(&key[..]).map_err(|_| AuthError::EncryptionFailed)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, data)
        .map_err(|_| AuthError::EncryptionFailed)?;

    let mut result = nonce_bytes.to_vec();
    result.extend_from_slice(&ciphertext);
    Ok(result)
}

/// Decrypt data produced by [`encrypt_data`]
pub fn decrypt_data(
    encrypted: &[u8],
    password: &str,
    salt: &[u8],
    rounds: u32,
) -> Result<Zeroizing<Vec<u8>>, AuthError> {
    if encrypted.len() < NONCE_LEN {
        return Err(AuthError::Malformed);
    }

    let key = derive_encryption_key(password, salt, rounds);
    let cipher = Aes256Gcm::new_from_slice(&key[..]).map_err(|_| AuthError::DecryptionFailed)?;

    let nonce = Nonce::from_slice(&encrypted[..NONCE_LEN]);
    let ciphertext = &encrypted[NONCE_LEN..];

    cipher
        .decrypt(nonce, ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| AuthError::DecryptionFailed)
}

/// A secret encrypted under the wallet password, with everything needed to
/// open it again except the password.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SealedSecret {
    /// hex(nonce || AES-GCM ciphertext+tag)
    pub ciphertext: String,
    /// hex PBKDF2 salt
    pub salt: String,
    /// PBKDF2 rounds
    pub rounds: u32,
}

impl SealedSecret {
    pub fn seal(plaintext: &[u8], password: &str, rounds: u32) -> Result<Self, AuthError> {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);

        let ciphertext = encrypt_data(plaintext, password, &salt, rounds)?;
        Ok(SealedSecret {
            ciphertext: hex::encode(ciphertext),
            salt: hex::encode(salt),
            rounds,
        })
    }

    pub fn open(&self, password: &str) -> Result<Zeroizing<Vec<u8>>, AuthError> {
        let ciphertext = hex::decode(&self.ciphertext).map_err(|_| AuthError::Malformed)?;
        let salt = hex::decode(&self.salt).map_err(|_| AuthError::Malformed)?;
        decrypt_data(&ciphertext, password, &salt, self.rounds)
    }

    /// Decrypt with `old` and seal the same plaintext under `new`
    pub fn reseal(&self, old: &str, new: &str, rounds: u32) -> Result<Self, AuthError> {
        let plaintext = self.open(old)?;
        Self::seal(&plaintext, new, rounds)
    }
}
