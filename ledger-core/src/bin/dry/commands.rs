use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dry_ledger::{Account, Config, ReplayMode, State, Tx};
use std::fmt::Write;
use std::path::PathBuf;

/// Don't Repeat Yourself ledger CLI
#[derive(Debug, Parser)]
#[clap(name = "dry", version)]
pub struct Cli {
    /// Log verbosity [options: 0, 1, 2]
    #[clap(default_value = "0", short, long, global = true)]
    pub verbosity: u8,
    /// TOML config file; flags below override it
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
    /// Directory holding genesis.json and tx.db
    #[clap(long, global = true)]
    pub data_dir: Option<PathBuf>,
    /// Skip malformed log records instead of failing
    #[clap(long, global = true)]
    pub tolerant_replay: bool,
    #[clap(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Resolve the ledger configuration from the file and flags.
    pub fn ledger_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        if let Some(data_dir) = &self.data_dir {
            config.data_dir = data_dir.clone();
        }
        if self.tolerant_replay {
            config.replay = ReplayMode::Tolerant;
        }
        Ok(config)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interact with balances
    #[clap(subcommand)]
    Balances(Balances),
    /// Interact with transactions
    #[clap(subcommand)]
    Tx(Transactions),
    /// Print the version
    Version,
}

impl Command {
    /// Runs the command against the configured ledger.
    pub fn parse(self, config: &Config) -> Result<String> {
        match self {
            Self::Balances(command) => command.parse(config),
            Self::Tx(command) => command.parse(config),
            Self::Version => Ok(format!("Version: {}", env!("CARGO_PKG_VERSION"))),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Balances {
    /// List all balances
    List,
}

impl Balances {
    fn parse(self, config: &Config) -> Result<String> {
        match self {
            Self::List => {
                let mut state = open_state(config)?;

                let mut output = String::from("Accounts balances:\n__________________\n");
                for (account, balance) in state.balances() {
                    writeln!(output, "{account}: {balance}")?;
                }
                state.close();

                Ok(output.trim_end().to_string())
            }
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Transactions {
    /// Add a transaction and persist it
    Add(AddTx),
}

impl Transactions {
    fn parse(self, config: &Config) -> Result<String> {
        match self {
            Self::Add(command) => command.parse(config),
        }
    }
}

#[derive(Debug, Args)]
pub struct AddTx {
    /// Account to send tokens from
    #[clap(long)]
    pub from: String,
    /// Account to send tokens to
    #[clap(long)]
    pub to: String,
    /// How many tokens to send
    #[clap(long)]
    pub value: u64,
    /// Possible values: 'reward'
    #[clap(long, default_value = "")]
    pub data: String,
}

impl AddTx {
    fn parse(self, config: &Config) -> Result<String> {
        let tx = Tx::new(
            Account::new(self.from),
            Account::new(self.to),
            self.value,
            self.data,
        );

        let mut state = open_state(config)?;
        state.add(tx).context("Transaction rejected")?;
        let snapshot = state.persist().context("Failed to persist transaction")?;
        state.close();

        Ok(format!(
            "TX successfully added to the ledger\nSnapshot: {snapshot}"
        ))
    }
}

fn open_state(config: &Config) -> Result<State> {
    State::new_from_disk(config).with_context(|| {
        format!("Failed to open ledger in {}", config.data_dir.display())
    })
}
