use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use sha3::{Digest, Keccak256};
use thiserror::Error;
use zeroize::Zeroizing;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Private key must be 32 bytes of hex, optionally 0x-prefixed")]
    InvalidHex,
    #[error("Private key is not a valid secp256k1 scalar")]
    InvalidScalar,
}

/// A secp256k1 key pair addressed the Ethereum way
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a fresh random key pair
    pub fn generate() -> Self {
        KeyPair {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Build from raw 32-byte secret
    pub fn from_bytes(secret: &[u8]) -> Result<Self, KeyError> {
        if secret.len() != 32 {
            return Err(KeyError::InvalidHex);
        }
        let signing_key = SigningKey::from_slice(secret).map_err(|_| KeyError::InvalidScalar)?;
        Ok(KeyPair { signing_key })
    }

    /// Parse a user-supplied hex secret. Surrounding whitespace and a `0x`
    /// prefix are accepted.
    pub fn from_hex(input: &str) -> Result<Self, KeyError> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.len() != 64 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(KeyError::InvalidHex);
        }
        let bytes = Zeroizing::new(hex::decode(digits).map_err(|_| KeyError::InvalidHex)?);
        Self::from_bytes(&bytes)
    }

    pub fn secret_bytes(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.signing_key.to_bytes().to_vec())
    }

    /// `0x`-prefixed lowercase hex of the secret
    pub fn secret_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(format!("0x{}", hex::encode(self.signing_key.to_bytes())))
    }

    /// EIP-55 checksummed address of this key
    pub fn address(&self) -> String {
        let public = k256::PublicKey::from(self.signing_key.verifying_key()).to_encoded_point(false);
        let hash = Keccak256::digest(&public.as_bytes()[1..]);
        to_checksum_address(&hash[12..])
    }
}

/// Apply the EIP-55 mixed-case checksum to a 20-byte address
pub fn to_checksum_address(address: &[u8]) -> String {
    let lower = hex::encode(address);
    let hash = Keccak256::digest(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = if i % 2 == 0 { hash[i / 2] >> 4 } else { hash[i / 2] & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Compare two addresses ignoring checksum case
pub fn same_address(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}
