//! Wallet account subsystem
//!
//! - Ordered account list in secure storage
//! - Password-sealed private keys (PBKDF2 + AES-256-GCM)
//! - Argon2id password verifier
//! - BIP39 recovery phrase with BIP44 Ethereum derivation

pub mod types;
pub mod store;
pub mod auth;
pub mod recovery;

pub use types::{Account, AccountOrigin};
pub use store::{AccountStore, AccountStoreError};
pub use auth::{AuthError, SealedSecret};
pub use recovery::{RecoveryError, RecoveryKey};
