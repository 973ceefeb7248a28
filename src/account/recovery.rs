//! Account recovery using BIP39 mnemonic seed phrases

use bip39::{Language, Mnemonic};
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;
use tiny_hderive::bip32::ExtendedPrivKey;
use zeroize::Zeroizing;

use crate::config::MAX_DERIVATION_LIMIT;
use crate::crypto::KeyPair;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecoveryError {
    #[error("Invalid recovery phrase")]
    InvalidMnemonic,
    #[error("Key derivation failed at index {0}")]
    KeyDerivationFailed(u32),
}

/// Recovery phrase all derived accounts hang off
pub struct RecoveryKey {
    mnemonic: Mnemonic,
}

impl RecoveryKey {
    /// Generate a new 12-word recovery phrase
    pub fn generate() -> Result<Self, RecoveryError> {
        let mut entropy = Zeroizing::new([0u8; 16]);
        OsRng.fill_bytes(entropy.as_mut_slice());

        let mnemonic = Mnemonic::from_entropy_in(Language::English, entropy.as_slice())
            .map_err(|_| RecoveryError::InvalidMnemonic)?;
        Ok(Self { mnemonic })
    }

    /// Create from existing mnemonic phrase
    pub fn from_phrase(phrase: &str) -> Result<Self, RecoveryError> {
        let normalized = phrase.split_whitespace().collect::<Vec<_>>().join(" ");
        let mnemonic = Mnemonic::parse_in_normalized(Language::English, &normalized)
            .map_err(|_| RecoveryError::InvalidMnemonic)?;
        Ok(Self { mnemonic })
    }

    pub fn to_phrase(&self) -> Zeroizing<String> {
        Zeroizing::new(self.mnemonic.words().collect::<Vec<&str>>().join(" "))
    }

    /// Derive the account key at BIP44 path m/44'/60'/0'/0/{index}.
    /// Hardened indices are refused.
    pub fn derive_keypair(&self, index: u32) -> Result<KeyPair, RecoveryError> {
        if index >= MAX_DERIVATION_LIMIT {
            return Err(RecoveryError::KeyDerivationFailed(index));
        }
        let seed = Zeroizing::new(self.mnemonic.to_seed(""));
        let path = format!("m/44'/60'/0'/0/{}", index);

        let ext_key = ExtendedPrivKey::derive(seed.as_slice(), path.as_str())
            .map_err(|_| RecoveryError::KeyDerivationFailed(index))?;
        let secret = Zeroizing::new(ext_key.secret());

        KeyPair::from_bytes(secret.as_slice()).map_err(|_| RecoveryError::KeyDerivationFailed(index))
    }
}
