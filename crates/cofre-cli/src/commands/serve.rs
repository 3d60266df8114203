//! Server command implementation

use std::path::Path;

use anyhow::Result;
use cofre_core::config::Settings;

use super::open_db;

pub async fn cmd_serve(db_path: &Path, settings: Settings) -> Result<()> {
    println!("🚀 Starting Cofre web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}", settings.bind_addr());
    println!("   Cache TTL: {}s", settings.cache_ttl.as_secs());
    match settings.recurring_interval {
        Some(interval) => println!(
            "   Recurring scheduler: every {} min",
            interval.as_secs() / 60
        ),
        None => println!("   Recurring scheduler: disabled"),
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path)?;
    cofre_server::serve_with_config(db, settings).await?;

    Ok(())
}
