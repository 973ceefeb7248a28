//! Account records as persisted in the wallet store

use serde::{Deserialize, Serialize};

use super::auth::SealedSecret;

/// Prefix given to accounts created by key import
pub const IMPORTED_PREFIX: &str = "Imported Account";
/// Prefix given to accounts derived from the recovery phrase
pub const DERIVED_PREFIX: &str = "Account";

/// Where an account's key came from
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AccountOrigin {
    /// Derived from the recovery phrase at m/44'/60'/0'/0/{index}
    Derived { index: u32 },
    /// Imported from a raw private key
    Imported,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// User-editable display label
    pub name: String,
    /// EIP-55 checksummed address of the key
    pub address: String,
    pub encrypted_private_key: SealedSecret,
    pub origin: AccountOrigin,
    /// Creation time, unix millis
    pub created_at: u64,
}

impl Account {
    pub fn is_imported(&self) -> bool {
        matches!(self.origin, AccountOrigin::Imported)
    }

    pub fn derivation_index(&self) -> Option<u32> {
        match self.origin {
            AccountOrigin::Derived { index } => Some(index),
            AccountOrigin::Imported => None,
        }
    }
}

/// Name for the account derived at `index`
pub fn derived_name(index: u32) -> String {
    format!("{} {}", DERIVED_PREFIX, index as u64 + 1)
}

/// Next free `Imported Account N` label: one past the highest N in use.
/// `None` once a name already carries `u64::MAX`.
pub fn next_imported_name(accounts: &[Account]) -> Option<String> {
    let highest = accounts
        .iter()
        .filter_map(|a| a.name.strip_prefix(IMPORTED_PREFIX))
        .filter_map(|rest| rest.trim().parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    let next = highest.checked_add(1)?;
    Some(format!("{} {}", IMPORTED_PREFIX, next))
}
