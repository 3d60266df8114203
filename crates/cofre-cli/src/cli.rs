//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Cofre - Personal finance ledger with vaults, recurring rules and FIRE projection
#[derive(Parser)]
#[command(name = "cofre")]
#[command(about = "Self-hosted personal finance ledger", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, env = "COFRE_DB", default_value = "cofre.db", global = true)]
    pub db: PathBuf,

    /// Settings file (defaults to the data dir override, then built-in defaults)
    #[arg(long, env = "COFRE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and seed default categories
    Init,

    /// Manage categories (list, add, delete, budgets)
    Categories {
        #[command(subcommand)]
        action: Option<CategoriesAction>,
    },

    /// Record an income or expense (sign follows the category)
    Add {
        /// Amount in major units (e.g. 12.50); the sign is ignored
        #[arg(allow_hyphen_values = true)]
        amount: String,

        /// What the movement was for
        description: String,

        /// Category name or ID (uncategorized movements are expenses)
        #[arg(short, long)]
        category: Option<String>,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },

    /// List or delete movements
    Movements {
        #[command(subcommand)]
        action: Option<MovementsAction>,
    },

    /// Vault balances, deposits and withdrawals
    Vault {
        #[command(subcommand)]
        action: Option<VaultAction>,
    },

    /// Manage recurring rules
    Recurring {
        #[command(subcommand)]
        action: Option<RecurringAction>,
    },

    /// Savings goals and their progress
    Goals {
        #[command(subcommand)]
        action: Option<GoalsAction>,
    },

    /// Period report: flow, distribution, weekly rhythm, top expenses
    Report {
        /// Period: 7D, 30D, 90D, 12M or ALL
        #[arg(short, long, default_value = "30D")]
        period: String,

        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the current month's dashboard
    Dashboard {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Month-over-month insights
    Insights,

    /// Financial independence projection
    Fire {
        /// Expected annual return in percent
        #[arg(long)]
        expected_return: Option<f64>,

        /// Safe withdrawal rate in percent
        #[arg(long)]
        withdrawal_rate: Option<f64>,

        /// Current age
        #[arg(long)]
        age: Option<u32>,

        /// Current net worth in major units (defaults to the vault total)
        #[arg(long)]
        net_worth: Option<String>,

        /// Print the projection as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export movements to CSV
    Export {
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Show or change ledger settings (opening balance, currency)
    Settings {
        /// Cash on hand before the first movement, in major units
        #[arg(long, allow_hyphen_values = true)]
        opening_balance: Option<String>,

        /// Three-letter currency code
        #[arg(long)]
        currency: Option<String>,
    },

    /// Start the web server
    Serve {
        /// Port to listen on (defaults to the settings file)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to the settings file)
        #[arg(long)]
        host: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum CategoriesAction {
    /// List categories
    List,

    /// Add a category
    Add {
        /// Category name
        name: String,

        /// Nature: income or expense
        #[arg(long, default_value = "expense")]
        nature: String,

        /// Vault kind: none, investment or emergency
        #[arg(long, default_value = "none")]
        vault: String,

        /// Monthly spending limit in major units
        #[arg(long)]
        limit: Option<String>,

        /// Optional color (e.g., "#10b981")
        #[arg(long)]
        color: Option<String>,

        /// Optional icon name
        #[arg(long)]
        icon: Option<String>,
    },

    /// Delete a category without movements
    Delete {
        /// Category name or ID
        category: String,
    },

    /// Budget usage for the current month
    Budgets,
}

#[derive(Subcommand)]
pub enum MovementsAction {
    /// List recent movements
    List {
        /// Number of movements to show
        #[arg(short, long, default_value = "20")]
        limit: i64,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Category name or ID
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Delete a movement
    Delete {
        /// Movement ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum VaultAction {
    /// Balances of every vault
    Status,

    /// Move money into a vault
    Deposit {
        /// Vault category name or ID
        vault: String,

        /// Amount in major units
        amount: String,

        /// Description
        #[arg(short, long, default_value = "Vault deposit")]
        description: String,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },

    /// Take money out of a vault (refused when the balance is too low)
    Withdraw {
        /// Vault category name or ID
        vault: String,

        /// Amount in major units
        amount: String,

        /// Description
        #[arg(short, long, default_value = "Vault withdrawal")]
        description: String,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum RecurringAction {
    /// List active rules with their state this month
    List,

    /// Add a rule
    Add {
        /// Description (copied verbatim to confirmed movements)
        description: String,

        /// Amount in major units; the sign follows the category
        #[arg(allow_hyphen_values = true)]
        amount: String,

        /// Day of month (1-31, clamped in shorter months)
        #[arg(long)]
        day: u32,

        /// Category name or ID
        #[arg(short, long)]
        category: Option<String>,

        /// Let the scheduler record it automatically when due
        #[arg(long)]
        auto: bool,
    },

    /// Record this month's movement for a due rule
    Confirm {
        /// Rule ID
        id: i64,
    },

    /// Record every due automatic rule now
    Process,

    /// Pause a rule
    Pause {
        /// Rule ID
        id: i64,
    },

    /// Resume a paused rule
    Resume {
        /// Rule ID
        id: i64,
    },

    /// Delete a rule
    Delete {
        /// Rule ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum GoalsAction {
    /// List goals with progress and the monthly saving they need
    List,

    /// Add a goal
    Add {
        /// Goal name
        name: String,

        /// Target amount in major units
        target: String,

        /// Target date (YYYY-MM-DD)
        #[arg(long)]
        by: String,

        /// Amount already saved, in major units
        #[arg(long)]
        saved: Option<String>,
    },

    /// Add money to a goal (negative to take some out)
    Contribute {
        /// Goal ID
        id: i64,

        /// Amount in major units
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },

    /// Change a goal's name, target, saved amount or date
    Update {
        /// Goal ID
        id: i64,

        #[arg(long)]
        name: Option<String>,

        /// Target amount in major units
        #[arg(long)]
        target: Option<String>,

        /// Saved amount in major units
        #[arg(long)]
        saved: Option<String>,

        /// Target date (YYYY-MM-DD)
        #[arg(long)]
        by: Option<String>,
    },

    /// Delete a goal
    Delete {
        /// Goal ID
        id: i64,
    },
}
