//! Audit log

use rusqlite::params;

use super::Database;
use crate::error::Result;

/// Audit log entry
#[derive(Debug, Clone, serde::Serialize)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: String,
    pub actor: String,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<i64>,
    pub details: Option<String>,
}

impl Database {
    /// Log an audit event
    pub fn log_audit(
        &self,
        actor: &str,
        action: &str,
        entity_type: Option<&str>,
        entity_id: Option<i64>,
        details: Option<&str>,
    ) -> Result<i64> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO audit_log (actor, action, entity_type, entity_id, details)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![actor, action, entity_type, entity_id, details],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// List audit log entries, newest first
    pub fn list_audit_log(&self, limit: i64) -> Result<Vec<AuditEntry>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, timestamp, actor, action, entity_type, entity_id, details
            FROM audit_log
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )?;

        let entries = stmt
            .query_map(params![limit], |row| {
                Ok(AuditEntry {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    actor: row.get(2)?,
                    action: row.get(3)?,
                    entity_type: row.get(4)?,
                    entity_id: row.get(5)?,
                    details: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}
