pub mod accounts;
pub mod categorize;
pub mod export;
pub mod import;
pub mod init;
pub mod load;
pub mod rules;
pub mod status;
pub mod transactions;

use clap::{Args, Parser, Subcommand};

use crate::reports::TransactionFilter;

#[derive(Parser)]
#[command(name = "bankreco", about = "Bank statement import and reconciliation for small businesses.")]
pub struct Cli {
    /// Show debug logging on stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up bankreco: choose a data directory and initialize the database.
    Init {
        /// Path for bankreco data (default: ~/Documents/bankreco)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Company name shown in status output
        #[arg(long)]
        company: Option<String>,
    },
    /// Switch to an existing bankreco data directory.
    Load {
        /// Path to data directory containing bankreco.db
        path: String,
    },
    /// Manage bank accounts.
    Accounts {
        #[command(subcommand)]
        command: AccountsCommands,
    },
    /// Import a bank statement (XLSX/XLS/ODS or CSV) into an account.
    Import {
        /// Path to the statement file
        file: String,
        /// Account name to import into (default: primary account)
        #[arg(long)]
        account: Option<String>,
        /// Statement format: icici or janata (default: account setting, then auto-detect)
        #[arg(long)]
        format: Option<String>,
    },
    /// Re-apply classification rules to transactions missing an expense head or vendor.
    Categorize,
    /// Manage classification rules.
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },
    /// Review and edit stored transactions.
    Transactions {
        #[command(subcommand)]
        command: TransactionsCommands,
    },
    /// Export filtered transactions to CSV.
    Export {
        #[command(flatten)]
        filter: FilterArgs,
        /// Output file path (default: <data_dir>/exports/bank-transactions-YYYY-MM-DD.csv)
        #[arg(long)]
        output: Option<String>,
    },
    /// Show current database and summary statistics.
    Status,
}

#[derive(Args, Clone, Default)]
pub struct FilterArgs {
    /// Only transactions of this account
    #[arg(long)]
    pub account: Option<String>,
    /// Month filter: YYYY-MM
    #[arg(long)]
    pub month: Option<String>,
    /// Only transactions for this vendor
    #[arg(long)]
    pub vendor: Option<String>,
}

impl From<FilterArgs> for TransactionFilter {
    fn from(args: FilterArgs) -> Self {
        Self {
            account: args.account,
            month: args.month,
            vendor: args.vendor,
        }
    }
}

#[derive(Subcommand)]
pub enum AccountsCommands {
    /// Add a new bank account.
    Add {
        /// Account name, e.g. 'ICICI Current'
        name: String,
        /// Account number
        #[arg(long)]
        number: Option<String>,
        /// Account type: Current or Savings
        #[arg(long = "type", default_value = "Current")]
        account_type: String,
        /// Statement format: icici or janata (default: guessed from the name)
        #[arg(long)]
        format: Option<String>,
    },
    /// List all bank accounts.
    List,
    /// Make an account the primary (default import) account.
    Primary {
        name: String,
    },
    /// Mark an account active.
    Activate {
        name: String,
    },
    /// Mark an account inactive.
    Deactivate {
        name: String,
    },
}

#[derive(Subcommand)]
pub enum RulesCommands {
    /// Add a classification rule.
    Add {
        /// Text to look for in transaction descriptions (case-insensitive)
        pattern: String,
        /// Expense head to assign
        #[arg(long = "expense-head")]
        expense_head: String,
        /// Vendor to assign
        #[arg(long)]
        vendor: String,
        /// Match type: contains, starts_with, regex
        #[arg(long = "match-type", default_value = "contains")]
        match_type: String,
        /// Rule priority (higher is tried first)
        #[arg(long, default_value = "0")]
        priority: i64,
    },
    /// List active classification rules in match order.
    List,
    /// Delete (deactivate) a rule by ID.
    Delete {
        /// Rule ID (shown in `bankreco rules list`)
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum TransactionsCommands {
    /// List stored transactions, newest first.
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// List months that have transactions.
    Months,
    /// List known vendors.
    Vendors,
    /// Set the expense head, vendor or remark of a transaction. Pass '' to clear.
    Edit {
        id: i64,
        #[arg(long = "expense-head")]
        expense_head: Option<String>,
        #[arg(long)]
        vendor: Option<String>,
        #[arg(long)]
        remark: Option<String>,
    },
    /// Delete a transaction.
    Delete {
        id: i64,
    },
}
