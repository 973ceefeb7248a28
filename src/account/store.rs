//! Account storage and management

use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use super::auth::{hash_password, verify_password, AuthError, SealedSecret};
use super::recovery::{RecoveryError, RecoveryKey};
use super::types::{derived_name, next_imported_name, Account, AccountOrigin};
use crate::config::SecurityConfig;
use crate::crypto::{same_address, KeyError, KeyPair};
use crate::storage::{
    SecureStore, StorageError, ACCOUNTS_KEY, MNEMONIC_KEY, NEXT_INDEX_KEY, PASSWORD_KEY,
    SCHEMA_VERSION_KEY, WALLET_KEYS,
};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum AccountStoreError {
    #[error("Invalid private key format: {0}")]
    InvalidFormat(#[from] KeyError),
    #[error("Account {0} already exists")]
    AlreadyExists(String),
    #[error("No account at index {0}")]
    NotFound(usize),
    #[error("Incorrect password")]
    WrongPassword,
    #[error("Password must be at least {0} characters")]
    WeakPassword(usize),
    #[error("Account name must not be empty")]
    InvalidName,
    #[error("Account name '{0}' is already in use")]
    NameTaken(String),
    #[error("Wallet is not initialized")]
    NotInitialized,
    #[error("Wallet is already initialized")]
    AlreadyInitialized,
    #[error("No free imported account name left")]
    ImportNamesExhausted,
    #[error("All {0} derivable accounts have already been created")]
    DerivationExhausted(u32),
    #[error("Decrypted key does not match stored address {0}")]
    IntegrityMismatch(String),
    #[error("Stored data is corrupt: {0}")]
    Corrupt(String),
    #[error("Unsupported wallet schema version {0}")]
    UnsupportedSchema(u32),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Recovery(#[from] RecoveryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Write lock poisoned")]
    Poisoned,
}

/// Password-protected, ordered account list persisted in a [`SecureStore`].
///
/// Every mutation holds `write_lock` across its read-modify-write, and writes
/// that touch more than one key go through [`SecureStore::set_items`].
pub struct AccountStore {
    storage: Arc<dyn SecureStore>,
    security: SecurityConfig,
    write_lock: Mutex<()>,
}

impl AccountStore {
    /// Open a store, stamping the schema version on first use
    pub fn open(
        storage: Arc<dyn SecureStore>,
        security: SecurityConfig,
    ) -> Result<Self, AccountStoreError> {
        match storage.get_item(SCHEMA_VERSION_KEY)? {
            Some(raw) => {
                let version: u32 = raw
                    .trim()
                    .parse()
                    .map_err(|_| AccountStoreError::Corrupt(format!("{} = {:?}", SCHEMA_VERSION_KEY, raw)))?;
                if version > SCHEMA_VERSION {
                    return Err(AccountStoreError::UnsupportedSchema(version));
                }
            }
            None => storage.set_item(SCHEMA_VERSION_KEY, &SCHEMA_VERSION.to_string())?,
        }

        Ok(Self {
            storage,
            security,
            write_lock: Mutex::new(()),
        })
    }

    /// Whether a wallet password has been set
    pub fn is_initialized(&self) -> Result<bool, AccountStoreError> {
        Ok(self.storage.get_item(PASSWORD_KEY)?.is_some())
    }

    /// Set the wallet password, seal the recovery phrase and create the
    /// first account. Generates a phrase when none is given. Returns the
    /// phrase so the caller can show it for backup.
    pub fn initialize(
        &self,
        password: &str,
        phrase: Option<&str>,
    ) -> Result<(Zeroizing<String>, Account), AccountStoreError> {
        let _guard = self.lock()?;

        if self.storage.get_item(PASSWORD_KEY)?.is_some() {
            return Err(AccountStoreError::AlreadyInitialized);
        }
        if password.chars().count() < self.security.min_password_len {
            return Err(AccountStoreError::WeakPassword(self.security.min_password_len));
        }

        let recovery = match phrase {
            Some(p) => RecoveryKey::from_phrase(p)?,
            None => RecoveryKey::generate()?,
        };
        let phrase = recovery.to_phrase();

        let password_hash = hash_password(password, &self.security)?;
        let sealed_phrase = SealedSecret::seal(phrase.as_bytes(), password, self.security.kdf_rounds)?;

        let keypair = recovery.derive_keypair(0)?;
        let account = self.seal_account(&keypair, password, derived_name(0), AccountOrigin::Derived { index: 0 })?;

        let accounts_json = encode_accounts(std::slice::from_ref(&account))?;
        let phrase_json = encode_json(&sealed_phrase)?;
        self.storage.set_items(&[
            (PASSWORD_KEY, Some(password_hash.as_str())),
            (MNEMONIC_KEY, Some(phrase_json.as_str())),
            (ACCOUNTS_KEY, Some(accounts_json.as_str())),
            (NEXT_INDEX_KEY, Some("1")),
        ])?;

        info!("Wallet initialized with first account {}", account.address);
        Ok((phrase, account))
    }

    /// All accounts in creation order
    pub fn accounts(&self) -> Result<Vec<Account>, AccountStoreError> {
        self.load_accounts()
    }

    pub fn account(&self, index: usize) -> Result<Account, AccountStoreError> {
        self.load_accounts()?
            .into_iter()
            .nth(index)
            .ok_or(AccountStoreError::NotFound(index))
    }

    /// Look up an account by address, ignoring checksum case
    pub fn find_by_address(&self, address: &str) -> Result<Option<(usize, Account)>, AccountStoreError> {
        Ok(self
            .load_accounts()?
            .into_iter()
            .enumerate()
            .find(|(_, a)| same_address(&a.address, address)))
    }

    /// Derive the next account from the recovery phrase and append it.
    /// Returns the new account with its position in the list.
    pub fn create_account(&self, password: &str) -> Result<(usize, Account), AccountStoreError> {
        let _guard = self.lock()?;
        self.check_password(password)?;

        let index = self.next_index()?;
        let limit = self.security.max_derived_accounts();
        if index >= limit {
            return Err(AccountStoreError::DerivationExhausted(limit));
        }

        let recovery = self.open_recovery(password)?;
        let keypair = recovery.derive_keypair(index)?;
        let address = keypair.address();

        let mut accounts = self.load_accounts()?;
        if accounts.iter().any(|a| same_address(&a.address, &address)) {
            warn!("Derived account {} is already in the wallet", address);
            return Err(AccountStoreError::AlreadyExists(address));
        }

        let account = self.seal_account(&keypair, password, derived_name(index), AccountOrigin::Derived { index })?;
        accounts.push(account.clone());

        let accounts_json = encode_accounts(&accounts)?;
        let next = (index + 1).to_string();
        self.storage.set_items(&[
            (ACCOUNTS_KEY, Some(accounts_json.as_str())),
            (NEXT_INDEX_KEY, Some(next.as_str())),
        ])?;

        info!("Created account '{}' ({}) at index {}", account.name, account.address, index);
        Ok((accounts.len() - 1, account))
    }

    /// Import a raw hex private key as `Imported Account N`
    pub fn import_account(&self, secret: &str, password: &str) -> Result<(usize, Account), AccountStoreError> {
        let keypair = KeyPair::from_hex(secret)?;

        let _guard = self.lock()?;
        self.check_password(password)?;

        let address = keypair.address();
        let mut accounts = self.load_accounts()?;
        if accounts.iter().any(|a| same_address(&a.address, &address)) {
            return Err(AccountStoreError::AlreadyExists(address));
        }

        let name = next_imported_name(&accounts).ok_or(AccountStoreError::ImportNamesExhausted)?;
        let account = self.seal_account(&keypair, password, name, AccountOrigin::Imported)?;
        accounts.push(account.clone());
        self.save_accounts(&accounts)?;

        info!("Imported account '{}' ({})", account.name, account.address);
        Ok((accounts.len() - 1, account))
    }

    /// Decrypt the private key of the account at `index` after checking the
    /// wallet password. Returns `0x`-prefixed hex.
    pub fn reveal_private_key(
        &self,
        index: usize,
        password: &str,
    ) -> Result<Zeroizing<String>, AccountStoreError> {
        let _guard = self.lock()?;
        self.check_password(password)?;
        let account = self.account(index)?;

        let secret = account
            .encrypted_private_key
            .open(password)
            .map_err(|_| AccountStoreError::IntegrityMismatch(account.address.clone()))?;
        let keypair = KeyPair::from_bytes(&secret)
            .map_err(|_| AccountStoreError::IntegrityMismatch(account.address.clone()))?;
        if keypair.address() != account.address {
            warn!("Integrity check failed for account {}", account.address);
            return Err(AccountStoreError::IntegrityMismatch(account.address));
        }

        debug!("Revealed private key of account {}", account.address);
        Ok(keypair.secret_hex())
    }

    /// Decrypt the recovery phrase
    pub fn reveal_mnemonic(&self, password: &str) -> Result<Zeroizing<String>, AccountStoreError> {
        let _guard = self.lock()?;
        self.check_password(password)?;
        Ok(self.open_recovery(password)?.to_phrase())
    }

    pub fn rename_account(&self, index: usize, new_name: &str) -> Result<Account, AccountStoreError> {
        let name = new_name.trim();
        if name.is_empty() {
            return Err(AccountStoreError::InvalidName);
        }

        let _guard = self.lock()?;
        let mut accounts = self.load_accounts()?;
        if index >= accounts.len() {
            return Err(AccountStoreError::NotFound(index));
        }
        if accounts
            .iter()
            .enumerate()
            .any(|(i, a)| i != index && a.name == name)
        {
            return Err(AccountStoreError::NameTaken(name.to_string()));
        }

        let old = std::mem::replace(&mut accounts[index].name, name.to_string());
        self.save_accounts(&accounts)?;

        info!("Renamed account '{}' to '{}'", old, name);
        Ok(accounts.swap_remove(index))
    }

    pub fn verify_password(&self, password: &str) -> Result<(), AccountStoreError> {
        self.check_password(password)
    }

    /// Re-seal every key and the recovery phrase under a new password
    pub fn change_password(&self, old: &str, new: &str) -> Result<(), AccountStoreError> {
        let _guard = self.lock()?;
        self.check_password(old)?;
        if new.chars().count() < self.security.min_password_len {
            return Err(AccountStoreError::WeakPassword(self.security.min_password_len));
        }

        let rounds = self.security.kdf_rounds;
        let mut accounts = self.load_accounts()?;
        for account in accounts.iter_mut() {
            account.encrypted_private_key = account
                .encrypted_private_key
                .reseal(old, new, rounds)
                .map_err(|_| AccountStoreError::IntegrityMismatch(account.address.clone()))?;
        }
        let phrase = self
            .load_sealed_phrase()?
            .reseal(old, new, rounds)
            .map_err(|_| AccountStoreError::Corrupt(MNEMONIC_KEY.to_string()))?;

        let password_hash = hash_password(new, &self.security)?;
        let accounts_json = encode_accounts(&accounts)?;
        let phrase_json = encode_json(&phrase)?;
        self.storage.set_items(&[
            (PASSWORD_KEY, Some(password_hash.as_str())),
            (MNEMONIC_KEY, Some(phrase_json.as_str())),
            (ACCOUNTS_KEY, Some(accounts_json.as_str())),
        ])?;

        info!("Wallet password changed, {} account(s) re-encrypted", accounts.len());
        Ok(())
    }

    /// Remove every wallet key. The store is usable again after
    /// [`initialize`](Self::initialize).
    pub fn reset(&self) -> Result<(), AccountStoreError> {
        let _guard = self.lock()?;
        let schema = SCHEMA_VERSION.to_string();
        let mut changes: Vec<(&str, Option<&str>)> = WALLET_KEYS
            .iter()
            .filter(|k| **k != SCHEMA_VERSION_KEY)
            .map(|k| (*k, None))
            .collect();
        changes.push((SCHEMA_VERSION_KEY, Some(schema.as_str())));
        self.storage.set_items(&changes)?;

        warn!("Wallet reset: all accounts and the password were removed");
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, AccountStoreError> {
        self.write_lock.lock().map_err(|_| AccountStoreError::Poisoned)
    }

    fn check_password(&self, password: &str) -> Result<(), AccountStoreError> {
        let hash = self
            .storage
            .get_item(PASSWORD_KEY)?
            .ok_or(AccountStoreError::NotInitialized)?;
        verify_password(password, &hash).map_err(|e| match e {
            AuthError::InvalidPassword => AccountStoreError::WrongPassword,
            other => AccountStoreError::Auth(other),
        })
    }

    fn seal_account(
        &self,
        keypair: &KeyPair,
        password: &str,
        name: String,
        origin: AccountOrigin,
    ) -> Result<Account, AccountStoreError> {
        let sealed = SealedSecret::seal(&keypair.secret_bytes(), password, self.security.kdf_rounds)?;
        Ok(Account {
            name,
            address: keypair.address(),
            encrypted_private_key: sealed,
            origin,
            created_at: current_timestamp(),
        })
    }

    fn load_accounts(&self) -> Result<Vec<Account>, AccountStoreError> {
        match self.storage.get_item(ACCOUNTS_KEY)? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| AccountStoreError::Corrupt(format!("{}: {}", ACCOUNTS_KEY, e))),
            None => Ok(Vec::new()),
        }
    }

    fn save_accounts(&self, accounts: &[Account]) -> Result<(), AccountStoreError> {
        let json = encode_accounts(accounts)?;
        self.storage.set_item(ACCOUNTS_KEY, &json)?;
        Ok(())
    }

    fn next_index(&self) -> Result<u32, AccountStoreError> {
        match self.storage.get_item(NEXT_INDEX_KEY)? {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| AccountStoreError::Corrupt(format!("{} = {:?}", NEXT_INDEX_KEY, raw))),
            None => Ok(0),
        }
    }

    fn load_sealed_phrase(&self) -> Result<SealedSecret, AccountStoreError> {
        let raw = self
            .storage
            .get_item(MNEMONIC_KEY)?
            .ok_or(AccountStoreError::NotInitialized)?;
        serde_json::from_str(&raw).map_err(|e| AccountStoreError::Corrupt(format!("{}: {}", MNEMONIC_KEY, e)))
    }

    fn open_recovery(&self, password: &str) -> Result<RecoveryKey, AccountStoreError> {
        let phrase = self
            .load_sealed_phrase()?
            .open(password)
            .map_err(|_| AccountStoreError::WrongPassword)?;
        let phrase = std::str::from_utf8(&phrase)
            .map_err(|_| AccountStoreError::Corrupt(MNEMONIC_KEY.to_string()))?;
        Ok(RecoveryKey::from_phrase(phrase)?)
    }
}

fn encode_accounts(accounts: &[Account]) -> Result<String, AccountStoreError> {
    encode_json(&accounts)
}

fn encode_json<T: serde::Serialize>(value: &T) -> Result<String, AccountStoreError> {
    serde_json::to_string(value).map_err(|e| AccountStoreError::Corrupt(e.to_string()))
}

fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    const PASSWORD: &str = "correct horse battery";
    const PHRASE: &str = "test test test test test test test test test test test junk";
    const SECRET: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
    const SECRET_ADDRESS: &str = "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23";

    fn fresh() -> AccountStore {
        AccountStore::open(Arc::new(MemoryStore::new()), SecurityConfig::insecure_for_tests()).unwrap()
    }

    fn initialized() -> AccountStore {
        let store = fresh();
        store.initialize(PASSWORD, Some(PHRASE)).unwrap();
        store
    }

    #[test]
    fn test_initialize_creates_first_account() {
        let store = fresh();
        assert!(!store.is_initialized().unwrap());

        let (phrase, account) = store.initialize(PASSWORD, Some(PHRASE)).unwrap();
        assert_eq!(phrase.as_str(), PHRASE);
        assert_eq!(account.name, "Account 1");
        assert_eq!(account.address, "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        assert!(store.is_initialized().unwrap());
        assert_eq!(store.accounts().unwrap(), vec![account]);

        assert!(matches!(
            store.initialize(PASSWORD, None),
            Err(AccountStoreError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_initialize_rejects_short_password_and_bad_phrase() {
        let store = fresh();
        assert!(matches!(
            store.initialize("short", None),
            Err(AccountStoreError::WeakPassword(8))
        ));
        assert!(matches!(
            store.initialize(PASSWORD, Some("not a phrase")),
            Err(AccountStoreError::Recovery(RecoveryError::InvalidMnemonic))
        ));
        assert!(!store.is_initialized().unwrap());
    }

    #[test]
    fn test_create_account_advances_index() {
        let store = initialized();
        let (position, second) = store.create_account(PASSWORD).unwrap();
        assert_eq!(position, 1);
        assert_eq!(second.name, "Account 2");
        assert_eq!(second.address, "0x70997970C51812dc3A010C7d01b50e0d17dc79C8");
        assert_eq!(second.derivation_index(), Some(1));

        let (position, third) = store.create_account(PASSWORD).unwrap();
        assert_eq!(position, 2);
        assert_eq!(third.name, "Account 3");
        assert_eq!(store.accounts().unwrap().len(), 3);
    }

    #[test]
    fn test_create_account_wrong_password() {
        let store = initialized();
        assert!(matches!(
            store.create_account("nope nope nope"),
            Err(AccountStoreError::WrongPassword)
        ));
        assert_eq!(store.accounts().unwrap().len(), 1);
    }

    #[test]
    fn test_create_account_limit() {
        let security = SecurityConfig {
            derivation_limit: 2,
            ..SecurityConfig::insecure_for_tests()
        };
        let store = AccountStore::open(Arc::new(MemoryStore::new()), security).unwrap();
        store.initialize(PASSWORD, Some(PHRASE)).unwrap();
        store.create_account(PASSWORD).unwrap();
        assert!(matches!(
            store.create_account(PASSWORD),
            Err(AccountStoreError::DerivationExhausted(2))
        ));
    }

    #[test]
    fn test_create_account_refuses_already_imported_key() {
        let store = initialized();
        // import the key that index 1 would derive
        let recovery = RecoveryKey::from_phrase(PHRASE).unwrap();
        let next = recovery.derive_keypair(1).unwrap();
        store.import_account(&next.secret_hex(), PASSWORD).unwrap();

        assert!(matches!(
            store.create_account(PASSWORD),
            Err(AccountStoreError::AlreadyExists(_))
        ));
        assert_eq!(store.accounts().unwrap().len(), 2);
    }

    #[test]
    fn test_import_account() {
        let store = initialized();
        let (position, account) = store.import_account(SECRET, PASSWORD).unwrap();
        assert_eq!(position, 1);
        assert_eq!(account.name, "Imported Account 1");
        assert_eq!(account.address, SECRET_ADDRESS);
        assert!(account.is_imported());

        let other = KeyPair::generate();
        let (_, second) = store.import_account(&other.secret_hex(), PASSWORD).unwrap();
        assert_eq!(second.name, "Imported Account 2");

        let listed = store.accounts().unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[1].address, SECRET_ADDRESS);
        assert_eq!(listed[2].address, other.address());
    }

    #[test]
    fn test_import_numbering_survives_rename() {
        let store = initialized();
        store.import_account(SECRET, PASSWORD).unwrap();
        store.import_account(&KeyPair::generate().secret_hex(), PASSWORD).unwrap();
        store.rename_account(1, "Cold storage").unwrap();

        let (_, third) = store.import_account(&KeyPair::generate().secret_hex(), PASSWORD).unwrap();
        assert_eq!(third.name, "Imported Account 3");
    }

    #[test]
    fn test_import_refuses_when_names_run_out() {
        let store = initialized();
        store
            .rename_account(0, &format!("Imported Account {}", u64::MAX))
            .unwrap();

        assert!(matches!(
            store.import_account(SECRET, PASSWORD),
            Err(AccountStoreError::ImportNamesExhausted)
        ));
        assert_eq!(store.accounts().unwrap().len(), 1);
    }

    #[test]
    fn test_derivation_limit_stays_below_hardened_range() {
        let security = SecurityConfig {
            derivation_limit: u32::MAX,
            ..SecurityConfig::insecure_for_tests()
        };
        let store = AccountStore::open(Arc::new(MemoryStore::new()), security).unwrap();
        store.initialize(PASSWORD, Some(PHRASE)).unwrap();
        store
            .storage
            .set_item(NEXT_INDEX_KEY, &crate::config::MAX_DERIVATION_LIMIT.to_string())
            .unwrap();

        assert!(matches!(
            store.create_account(PASSWORD),
            Err(AccountStoreError::DerivationExhausted(limit)) if limit == crate::config::MAX_DERIVATION_LIMIT
        ));
    }

    #[test]
    fn test_import_rejects_duplicates_and_bad_format() {
        let store = initialized();
        store.import_account(SECRET, PASSWORD).unwrap();

        let upper = SECRET.to_uppercase().replacen("0X", "0x", 1);
        assert!(matches!(
            store.import_account(&upper, PASSWORD),
            Err(AccountStoreError::AlreadyExists(addr)) if addr == SECRET_ADDRESS
        ));
        assert!(matches!(
            store.import_account("0xdeadbeef", PASSWORD),
            Err(AccountStoreError::InvalidFormat(KeyError::InvalidHex))
        ));
        assert!(matches!(
            store.import_account(&"00".repeat(32), PASSWORD),
            Err(AccountStoreError::InvalidFormat(KeyError::InvalidScalar))
        ));
        assert_eq!(store.accounts().unwrap().len(), 2);
    }

    #[test]
    fn test_import_requires_initialized_wallet() {
        let store = fresh();
        assert!(matches!(
            store.import_account(SECRET, PASSWORD),
            Err(AccountStoreError::NotInitialized)
        ));
    }

    #[test]
    fn test_reveal_private_key() {
        let store = initialized();
        store.import_account(SECRET, PASSWORD).unwrap();

        let revealed = store.reveal_private_key(1, PASSWORD).unwrap();
        assert_eq!(revealed.as_str(), SECRET);

        assert!(matches!(
            store.reveal_private_key(1, "wrong password"),
            Err(AccountStoreError::WrongPassword)
        ));
        assert!(matches!(
            store.reveal_private_key(9, PASSWORD),
            Err(AccountStoreError::NotFound(9))
        ));
    }

    #[test]
    fn test_reveal_detects_swapped_key() {
        let store = initialized();
        store.import_account(SECRET, PASSWORD).unwrap();

        // point account 0's address at account 1's ciphertext
        let mut accounts = store.accounts().unwrap();
        accounts[0].encrypted_private_key = accounts[1].encrypted_private_key.clone();
        store.save_accounts(&accounts).unwrap();

        assert!(matches!(
            store.reveal_private_key(0, PASSWORD),
            Err(AccountStoreError::IntegrityMismatch(_))
        ));
    }

    #[test]
    fn test_reveal_mnemonic() {
        let store = initialized();
        assert_eq!(store.reveal_mnemonic(PASSWORD).unwrap().as_str(), PHRASE);
        assert!(matches!(
            store.reveal_mnemonic("wrong password"),
            Err(AccountStoreError::WrongPassword)
        ));
    }

    #[test]
    fn test_rename_account() {
        let store = initialized();
        store.create_account(PASSWORD).unwrap();

        let renamed = store.rename_account(0, "  Savings ").unwrap();
        assert_eq!(renamed.name, "Savings");
        assert_eq!(store.account(0).unwrap().name, "Savings");
        assert_eq!(store.account(1).unwrap().name, "Account 2");

        assert!(matches!(
            store.rename_account(5, "x"),
            Err(AccountStoreError::NotFound(5))
        ));
        assert!(matches!(
            store.rename_account(1, "   "),
            Err(AccountStoreError::InvalidName)
        ));
        assert!(matches!(
            store.rename_account(1, "Savings"),
            Err(AccountStoreError::NameTaken(_))
        ));
        // keeping your own name is fine
        store.rename_account(0, "Savings").unwrap();
    }

    #[test]
    fn test_find_by_address() {
        let store = initialized();
        store.import_account(SECRET, PASSWORD).unwrap();
        let (index, account) = store
            .find_by_address(&SECRET_ADDRESS.to_lowercase())
            .unwrap()
            .unwrap();
        assert_eq!(index, 1);
        assert_eq!(account.address, SECRET_ADDRESS);
        assert!(store.find_by_address("0x0000000000000000000000000000000000000000").unwrap().is_none());
    }

    #[test]
    fn test_change_password() {
        let store = initialized();
        store.import_account(SECRET, PASSWORD).unwrap();
        let new_password = "a much better password";

        assert!(matches!(
            store.change_password("wrong password", new_password),
            Err(AccountStoreError::WrongPassword)
        ));
        assert!(matches!(
            store.change_password(PASSWORD, "short"),
            Err(AccountStoreError::WeakPassword(_))
        ));

        store.change_password(PASSWORD, new_password).unwrap();
        assert!(matches!(
            store.verify_password(PASSWORD),
            Err(AccountStoreError::WrongPassword)
        ));
        assert_eq!(store.reveal_private_key(1, new_password).unwrap().as_str(), SECRET);
        assert_eq!(store.reveal_mnemonic(new_password).unwrap().as_str(), PHRASE);
        store.create_account(new_password).unwrap();
    }

    #[test]
    fn test_reset() {
        let store = initialized();
        store.reset().unwrap();
        assert!(!store.is_initialized().unwrap());
        assert!(store.accounts().unwrap().is_empty());

        let (_, account) = store.initialize(PASSWORD, None).unwrap();
        assert_eq!(account.name, "Account 1");
    }

    #[test]
    fn test_rejects_newer_schema() {
        let storage = Arc::new(MemoryStore::new());
        storage.set_item(SCHEMA_VERSION_KEY, "2").unwrap();
        assert!(matches!(
            AccountStore::open(storage, SecurityConfig::insecure_for_tests()),
            Err(AccountStoreError::UnsupportedSchema(2))
        ));
    }

    #[test]
    fn test_corrupt_account_list() {
        let storage = Arc::new(MemoryStore::new());
        storage.set_item(ACCOUNTS_KEY, "{not json").unwrap();
        let store = AccountStore::open(storage, SecurityConfig::insecure_for_tests()).unwrap();
        assert!(matches!(store.accounts(), Err(AccountStoreError::Corrupt(_))));
    }
}
