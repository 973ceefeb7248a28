use thiserror::Error;

use crate::account::AccountStoreError;
use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Account(#[from] AccountStoreError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Input(String),
}
