//! Cofre CLI - Personal finance ledger
//!
//! Usage:
//!   cofre init                          Initialize database
//!   cofre add 12.50 "Lunch" -c Food     Record a movement
//!   cofre vault deposit Reserve 100     Move money into a vault
//!   cofre recurring list                Show this month's recurring rules
//!   cofre goals add Trip 3000 --by 2025-06-30  Track a savings goal
//!   cofre serve --port 3000             Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use clap::Parser;
use cofre_core::config::Settings;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    tracing::debug!(db = %cli.db.display(), "Settings loaded");

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Categories { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                None | Some(CategoriesAction::List) => commands::cmd_categories_list(&db),
                Some(CategoriesAction::Add {
                    name,
                    nature,
                    vault,
                    limit,
                    color,
                    icon,
                }) => commands::cmd_categories_add(
                    &db,
                    &name,
                    &nature,
                    &vault,
                    limit.as_deref(),
                    color,
                    icon,
                ),
                Some(CategoriesAction::Delete { category }) => {
                    commands::cmd_categories_delete(&db, &category)
                }
                Some(CategoriesAction::Budgets) => {
                    commands::cmd_categories_budgets(&db, commands::today())
                }
            }
        }
        Commands::Add {
            amount,
            description,
            category,
            date,
        } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_add(
                &db,
                &amount,
                &description,
                category.as_deref(),
                date.as_deref(),
            )
        }
        Commands::Movements { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                None => commands::cmd_movements_list(&db, 20, None, None, None),
                Some(MovementsAction::List {
                    limit,
                    from,
                    to,
                    category,
                }) => commands::cmd_movements_list(
                    &db,
                    limit,
                    from.as_deref(),
                    to.as_deref(),
                    category.as_deref(),
                ),
                Some(MovementsAction::Delete { id }) => commands::cmd_movements_delete(&db, id),
            }
        }
        Commands::Vault { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                None | Some(VaultAction::Status) => commands::cmd_vault_status(&db),
                Some(VaultAction::Deposit {
                    vault,
                    amount,
                    description,
                    date,
                }) => commands::cmd_vault_deposit(
                    &db,
                    &vault,
                    &amount,
                    &description,
                    date.as_deref(),
                ),
                Some(VaultAction::Withdraw {
                    vault,
                    amount,
                    description,
                    date,
                }) => commands::cmd_vault_withdraw(
                    &db,
                    &vault,
                    &amount,
                    &description,
                    date.as_deref(),
                ),
            }
        }
        Commands::Recurring { action } => {
            let db = commands::open_db(&cli.db)?;
            let today = commands::today();
            match action {
                None | Some(RecurringAction::List) => commands::cmd_recurring_list(&db, today),
                Some(RecurringAction::Add {
                    description,
                    amount,
                    day,
                    category,
                    auto,
                }) => commands::cmd_recurring_add(
                    &db,
                    &description,
                    &amount,
                    day,
                    category.as_deref(),
                    auto,
                ),
                Some(RecurringAction::Confirm { id }) => {
                    commands::cmd_recurring_confirm(&db, id, today)
                }
                Some(RecurringAction::Process) => commands::cmd_recurring_process(&db, today),
                Some(RecurringAction::Pause { id }) => {
                    commands::cmd_recurring_set_active(&db, id, false)
                }
                Some(RecurringAction::Resume { id }) => {
                    commands::cmd_recurring_set_active(&db, id, true)
                }
                Some(RecurringAction::Delete { id }) => commands::cmd_recurring_delete(&db, id),
            }
        }
        Commands::Goals { action } => {
            let db = commands::open_db(&cli.db)?;
            let today = commands::today();
            match action {
                None | Some(GoalsAction::List) => commands::cmd_goals_list(&db, today),
                Some(GoalsAction::Add {
                    name,
                    target,
                    by,
                    saved,
                }) => commands::cmd_goals_add(&db, &name, &target, &by, saved.as_deref()),
                Some(GoalsAction::Contribute { id, amount }) => {
                    commands::cmd_goals_contribute(&db, id, &amount, today)
                }
                Some(GoalsAction::Update {
                    id,
                    name,
                    target,
                    saved,
                    by,
                }) => commands::cmd_goals_update(
                    &db,
                    id,
                    name.as_deref(),
                    target.as_deref(),
                    saved.as_deref(),
                    by.as_deref(),
                ),
                Some(GoalsAction::Delete { id }) => commands::cmd_goals_delete(&db, id),
            }
        }
        Commands::Report { period, json } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_report(&db, &period, commands::today(), json)
        }
        Commands::Dashboard { json } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_dashboard(&db, commands::today(), json)
        }
        Commands::Insights => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_insights(&db, commands::today())
        }
        Commands::Fire {
            expected_return,
            withdrawal_rate,
            age,
            net_worth,
            json,
        } => {
            let db = commands::open_db(&cli.db)?;
            let overrides = commands::fire_overrides(
                expected_return,
                withdrawal_rate,
                age,
                net_worth.as_deref(),
            )?;
            commands::cmd_fire(&db, &settings, &overrides, commands::today(), json)
        }
        Commands::Export { output, from, to } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_export(&db, output, from.as_deref(), to.as_deref())
        }
        Commands::Settings {
            opening_balance,
            currency,
        } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_settings(&db, opening_balance.as_deref(), currency.as_deref())
        }
        Commands::Serve { port, host } => {
            let mut settings = settings;
            if let Some(port) = port {
                settings.server.port = port;
            }
            if let Some(host) = host {
                settings.server.host = host;
            }
            commands::cmd_serve(&cli.db, settings).await
        }
    }
}
