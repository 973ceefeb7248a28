use std::io::{BufRead, Write};

use clap::Subcommand;
use tracing::info;

use super::{Commands, Prompter};
use crate::account::{Account, AccountOrigin, AccountStore};
use crate::error::WalletError;

#[derive(Subcommand)]
pub enum AccountCommands {
    /// List all accounts in creation order
    List,
    /// Derive the next account from the recovery phrase
    Create,
    /// Import an account from a raw private key
    Import {
        /// Hex private key. Prompted for when absent.
        #[arg(long)]
        key: Option<String>,
    },
    /// Change an account's display name
    Rename {
        #[arg(long)]
        index: usize,
        #[arg(long)]
        name: String,
    },
    /// Show an account's private key
    Reveal {
        #[arg(long)]
        index: usize,
    },
}

#[derive(Subcommand)]
pub enum MnemonicCommands {
    /// Show the recovery phrase
    Reveal,
}

#[derive(Subcommand)]
pub enum PasswordCommands {
    /// Re-encrypt the wallet under a new password
    Change {
        #[arg(long, env = "CCWALLET_NEW_PASSWORD", hide_env_values = true)]
        new_password: Option<String>,
    },
}

/// Dispatch one parsed command against the store
pub fn run<R: BufRead>(
    command: Commands,
    store: &AccountStore,
    prompt: &mut Prompter<R>,
    out: &mut dyn Write,
) -> Result<(), WalletError> {
    match command {
        Commands::Init { mnemonic } => handle_init(mnemonic, store, prompt, out),
        Commands::Account { cmd } => handle_account_command(cmd, store, prompt, out),
        Commands::Mnemonic { cmd } => handle_mnemonic_command(cmd, store, prompt, out),
        Commands::Password { cmd } => handle_password_command(cmd, store, prompt, out),
        Commands::Reset { yes } => {
            if !yes {
                return Err(WalletError::Input(
                    "Refusing to reset without --yes. This deletes every key.".to_string(),
                ));
            }
            store.reset()?;
            writeln!(out, "Wallet reset.")?;
            Ok(())
        }
    }
}

pub fn handle_init<R: BufRead>(
    mnemonic: Option<String>,
    store: &AccountStore,
    prompt: &mut Prompter<R>,
    out: &mut dyn Write,
) -> Result<(), WalletError> {
    if store.is_initialized()? {
        return Err(WalletError::Input("Wallet is already initialized".to_string()));
    }
    let password = match prompt.password_if_preset() {
        Some(p) => p,
        None => prompt.new_password("Choose wallet password: ")?,
    };

    let restoring = mnemonic.is_some();
    let (phrase, account) = store.initialize(&password, mnemonic.as_deref())?;

    writeln!(out, "Wallet initialized.")?;
    print_account(out, 0, &account)?;
    if !restoring {
        writeln!(out, "\n[RECOVERY PHRASE] - Write this down securely and NEVER share it:")?;
        writeln!(out, "---------------------------------------------------------------")?;
        writeln!(out, "{}", phrase.as_str())?;
        writeln!(out, "---------------------------------------------------------------")?;
    }
    Ok(())
}

pub fn handle_account_command<R: BufRead>(
    cmd: AccountCommands,
    store: &AccountStore,
    prompt: &mut Prompter<R>,
    out: &mut dyn Write,
) -> Result<(), WalletError> {
    match cmd {
        AccountCommands::List => {
            let accounts = store.accounts()?;
            if accounts.is_empty() {
                writeln!(out, "No accounts. Run `ccwallet init` first.")?;
            }
            for (index, account) in accounts.iter().enumerate() {
                print_account(out, index, account)?;
            }
        }
        AccountCommands::Create => {
            let password = prompt.password("Wallet password: ")?;
            let (index, account) = store.create_account(&password)?;
            writeln!(out, "Account created.")?;
            print_account(out, index, &account)?;
        }
        AccountCommands::Import { key } => {
            let key = match key {
                Some(k) => zeroize::Zeroizing::new(k),
                None => prompt.line("Private key: ")?,
            };
            let password = prompt.password("Wallet password: ")?;
            let (index, account) = store.import_account(&key, &password)?;
            writeln!(out, "Account imported and stored successfully.")?;
            print_account(out, index, &account)?;
        }
        AccountCommands::Rename { index, name } => {
            let account = store.rename_account(index, &name)?;
            print_account(out, index, &account)?;
        }
        AccountCommands::Reveal { index } => {
            let password = prompt.password("Wallet password: ")?;
            let secret = store.reveal_private_key(index, &password)?;
            info!("Private key of account #{} shown on terminal", index);
            writeln!(out, "{}", secret.as_str())?;
        }
    }
    Ok(())
}

pub fn handle_mnemonic_command<R: BufRead>(
    cmd: MnemonicCommands,
    store: &AccountStore,
    prompt: &mut Prompter<R>,
    out: &mut dyn Write,
) -> Result<(), WalletError> {
    match cmd {
        MnemonicCommands::Reveal => {
            let password = prompt.password("Wallet password: ")?;
            let phrase = store.reveal_mnemonic(&password)?;
            writeln!(out, "{}", phrase.as_str())?;
        }
    }
    Ok(())
}

pub fn handle_password_command<R: BufRead>(
    cmd: PasswordCommands,
    store: &AccountStore,
    prompt: &mut Prompter<R>,
    out: &mut dyn Write,
) -> Result<(), WalletError> {
    match cmd {
        PasswordCommands::Change { new_password } => {
            let old = prompt.password("Current password: ")?;
            store.verify_password(&old)?;
            let new = match new_password {
                Some(p) => zeroize::Zeroizing::new(p),
                None => prompt.new_password("New password: ")?,
            };
            store.change_password(&old, &new)?;
            writeln!(out, "Password changed.")?;
        }
    }
    Ok(())
}

fn print_account(out: &mut dyn Write, index: usize, account: &Account) -> Result<(), WalletError> {
    let origin = match account.origin {
        AccountOrigin::Derived { index } => format!("derived #{}", index),
        AccountOrigin::Imported => "imported".to_string(),
    };
    writeln!(out, "[{}] {}\t{}\t({})", index, account.name, account.address, origin)?;
    Ok(())
}
