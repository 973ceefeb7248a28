pub mod wallet;

use std::io::{self, BufRead, Write};

use clap::{Parser, Subcommand};
use zeroize::Zeroizing;

use crate::error::WalletError;

#[derive(Parser)]
#[command(name = "ccwallet")]
#[command(about = "CC Wallet account keystore", long_about = None)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true, default_value = "wallet.toml")]
    pub config: String,

    /// Wallet password. Prompted for when absent.
    #[arg(long, global = true, env = "CCWALLET_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set the wallet password and create the first account
    Init {
        /// Restore from an existing recovery phrase instead of generating one
        #[arg(long)]
        mnemonic: Option<String>,
    },
    /// Account management
    Account {
        #[command(subcommand)]
        cmd: wallet::AccountCommands,
    },
    /// Recovery phrase operations
    Mnemonic {
        #[command(subcommand)]
        cmd: wallet::MnemonicCommands,
    },
    /// Password operations
    Password {
        #[command(subcommand)]
        cmd: wallet::PasswordCommands,
    },
    /// Delete every account, the recovery phrase and the password
    Reset {
        #[arg(long)]
        yes: bool,
    },
}

/// Reads secrets either from a preset value or line by line from a reader
pub struct Prompter<R: BufRead> {
    preset: Option<Zeroizing<String>>,
    input: R,
}

impl Prompter<io::StdinLock<'static>> {
    pub fn stdin(preset: Option<String>) -> Self {
        Self::new(preset, io::stdin().lock())
    }
}

impl<R: BufRead> Prompter<R> {
    pub fn new(preset: Option<String>, input: R) -> Self {
        Prompter {
            preset: preset.map(Zeroizing::new),
            input,
        }
    }

    /// The preset password, or one line read after printing `label`
    pub fn password(&mut self, label: &str) -> Result<Zeroizing<String>, WalletError> {
        if let Some(p) = &self.preset {
            return Ok(p.clone());
        }
        self.line(label)
    }

    pub fn password_if_preset(&self) -> Option<Zeroizing<String>> {
        self.preset.clone()
    }

    /// Ask twice and require both answers to match
    pub fn new_password(&mut self, label: &str) -> Result<Zeroizing<String>, WalletError> {
        let first = self.line(label)?;
        let second = self.line("Repeat password: ")?;
        if first != second {
            return Err(WalletError::Input("Passwords do not match".to_string()));
        }
        Ok(first)
    }

    pub fn line(&mut self, label: &str) -> Result<Zeroizing<String>, WalletError> {
        eprint!("{}", label);
        io::stderr().flush()?;

        let mut buf = Zeroizing::new(String::new());
        if self.input.read_line(&mut buf)? == 0 {
            return Err(WalletError::Input("Unexpected end of input".to_string()));
        }
        Ok(Zeroizing::new(buf.trim_end_matches(&['\r', '\n'][..]).to_string()))
    }
}
