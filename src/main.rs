use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ccwallet::account::AccountStore;
use ccwallet::cli::{self, Cli, Prompter};
use ccwallet::config::{StorageBackend, WalletConfig};
use ccwallet::storage::{MemoryStore, SecureStore, SledStore};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match WalletConfig::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    info!("Using config '{}'", cli.config);

    let storage: Arc<dyn SecureStore> = match config.storage.backend {
        StorageBackend::Sled => {
            info!("Opening wallet store at '{}'", config.storage.path);
            Arc::new(SledStore::open(&config.storage.path)?)
        }
        StorageBackend::Memory => {
            info!("Using in-memory wallet store, nothing will be persisted");
            Arc::new(MemoryStore::new())
        }
    };
    let store = AccountStore::open(storage, config.security.clone())?;

    let mut prompt = Prompter::stdin(cli.password);
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = cli::wallet::run(cli.command, &store, &mut prompt, &mut stdout) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
