//! Export command implementation

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use cofre_core::db::Database;
use cofre_core::export::{write_movements_csv, ExportOptions};

use super::parse_optional_date;

pub fn cmd_export(
    db: &Database,
    output: Option<PathBuf>,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<()> {
    let opts = ExportOptions {
        from: parse_optional_date(from, "--from")?,
        to: parse_optional_date(to, "--to")?,
    };
    let (categories, movements) = db.load_ledger()?;

    match output {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let rows = write_movements_csv(BufWriter::new(file), &movements, &categories, &opts)?;
            println!("✅ Exported {} movement(s) to {}", rows, path.display());
        }
        None => {
            write_movements_csv(io::stdout().lock(), &movements, &categories, &opts)?;
        }
    }

    Ok(())
}
