//! CSV export of movements

use std::io::Write;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::Result;
use crate::models::{Category, Movement};
use crate::money::format_amount;
use crate::normalize::tag_movements;

/// Options for movement export
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Start date filter (inclusive)
    pub from: Option<NaiveDate>,
    /// End date filter (inclusive)
    pub to: Option<NaiveDate>,
}

impl ExportOptions {
    fn includes(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |f| date >= f) && self.to.map_or(true, |t| date <= t)
    }
}

/// One CSV row
#[derive(Debug, Serialize)]
struct MovementRow<'a> {
    id: i64,
    date: NaiveDate,
    description: &'a str,
    /// Decimal major units, signed
    amount: String,
    category: &'a str,
    kind: &'static str,
}

/// Write movements as CSV, oldest first; returns the number of rows written
pub fn write_movements_csv<W: Write>(
    writer: W,
    movements: &[Movement],
    categories: &[Category],
    opts: &ExportOptions,
) -> Result<usize> {
    let mut tagged = tag_movements(movements, categories);
    tagged.retain(|t| opts.includes(t.movement.date));
    tagged.sort_by_key(|t| (t.movement.date, t.movement.id));

    let mut csv = csv::Writer::from_writer(writer);
    for t in &tagged {
        csv.serialize(MovementRow {
            id: t.movement.id,
            date: t.movement.date,
            description: &t.movement.description,
            amount: format_amount(t.movement.amount),
            category: if t.category.is_some() {
                t.category_name()
            } else {
                ""
            },
            kind: t.kind.as_str(),
        })?;
    }
    csv.flush()?;

    tracing::info!(rows = tagged.len(), "Exported movements");
    Ok(tagged.len())
}

/// Same as [`write_movements_csv`] into a string
pub fn movements_csv(
    movements: &[Movement],
    categories: &[Category],
    opts: &ExportOptions,
) -> Result<String> {
    let mut buf = Vec::new();
    write_movements_csv(&mut buf, movements, categories, opts)?;
    String::from_utf8(buf).map_err(|e| crate::error::Error::InvalidData(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Nature, VaultKind};
    use crate::test_utils::{category, date, movement};

    #[test]
    fn test_export_rows_and_header() {
        let cats = vec![
            category(1, "Salary", Nature::Income, VaultKind::None),
            category(2, "Emergency", Nature::Expense, VaultKind::Emergency),
        ];
        let movements = vec![
            movement(2, -1_250, "Coffee, large", None, "2024-03-02"),
            movement(1, 250_000, "Pay", Some(1), "2024-03-01"),
            movement(3, 10_000, "Save", Some(2), "2024-03-03"),
        ];

        let out = movements_csv(&movements, &cats, &ExportOptions::default()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "id,date,description,amount,category,kind");
        assert_eq!(lines[1], "1,2024-03-01,Pay,2500.00,Salary,income");
        assert_eq!(lines[2], "2,2024-03-02,\"Coffee, large\",-12.50,,expense");
        assert_eq!(lines[3], "3,2024-03-03,Save,100.00,Emergency,vault_deposit");
    }

    #[test]
    fn test_export_date_filter() {
        let movements = vec![
            movement(1, -100, "a", None, "2024-01-31"),
            movement(2, -100, "b", None, "2024-02-01"),
        ];
        let opts = ExportOptions {
            from: Some(date("2024-02-01")),
            to: None,
        };
        let mut buf = Vec::new();
        let rows = write_movements_csv(&mut buf, &movements, &[], &opts).unwrap();
        assert_eq!(rows, 1);
    }
}
