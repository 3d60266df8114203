//! Ledger settings stored as key/value rows

use rusqlite::{params, OptionalExtension};

use super::Database;
use crate::error::{Error, Result};
use crate::models::LedgerSettings;

const OPENING_BALANCE: &str = "opening_balance";
const CURRENCY: &str = "currency";

impl Database {
    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO settings (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = CURRENT_TIMESTAMP
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// Current ledger settings, defaults for anything never set
    pub fn get_ledger_settings(&self) -> Result<LedgerSettings> {
        let mut settings = LedgerSettings::default();

        if let Some(raw) = self.get_setting(OPENING_BALANCE)? {
            settings.opening_balance = raw.parse().map_err(|_| {
                Error::InvalidData(format!("stored opening balance '{}' is not an integer", raw))
            })?;
        }
        if let Some(currency) = self.get_setting(CURRENCY)? {
            settings.currency = currency;
        }

        Ok(settings)
    }

    /// Replace the ledger settings
    pub fn update_ledger_settings(&self, settings: &LedgerSettings) -> Result<LedgerSettings> {
        let currency = settings.currency.trim().to_uppercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::InvalidData(format!(
                "currency must be a three-letter code, got '{}'",
                settings.currency
            )));
        }

        self.set_setting(OPENING_BALANCE, &settings.opening_balance.to_string())?;
        self.set_setting(CURRENCY, &currency)?;
        self.get_ledger_settings()
    }
}
