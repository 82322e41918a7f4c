//! Lead store: migrations, SQLite path handling, and the persistence gateway.

use crate::error::Result;
use crate::extract::{FieldKey, FieldKind};
use crate::models::lead::{db_lead::DbLead, lead::ColumnValue, lead::Lead};
use crate::models::log::log_entry::LogEntry;
use chrono::Utc;
use once_cell::sync::Lazy;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use uuid::Uuid;

/// Extracted-field columns, in `FieldKey::ALL` order.
static FIELD_COLUMNS: Lazy<Vec<&'static str>> =
    Lazy::new(|| FieldKey::ALL.iter().map(|k| k.column()).collect());

static SELECT_LEAD: Lazy<String> = Lazy::new(|| {
    format!(
        "SELECT id, {}, source, raw, received_at FROM leads",
        FIELD_COLUMNS.join(", ")
    )
});

static INSERT_LEAD: Lazy<String> = Lazy::new(|| {
    format!(
        "INSERT OR IGNORE INTO leads (id, {}, source, raw, received_at) VALUES (?, {}, ?, ?, ?)",
        FIELD_COLUMNS.join(", "),
        vec!["?"; FIELD_COLUMNS.len()].join(", ")
    )
});

/// Run SQLite migrations to create tables if absent.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let field_ddl: Vec<String> = FieldKey::ALL
        .iter()
        .map(|k| match k.kind() {
            FieldKind::Text => format!("{} TEXT NULL", k.column()),
            FieldKind::Flag => format!("{} INTEGER NULL", k.column()),
        })
        .collect();
    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS leads (
            id BLOB PRIMARY KEY,
            {},
            source TEXT NOT NULL,
            raw TEXT NOT NULL,
            received_at TEXT NOT NULL
        )",
        field_ddl.join(",\n            ")
    ))
    .execute(pool)
    .await?;

    // Dedup identity. NULL contact fields compare equal through coalesce.
    sqlx::query(
        r#"CREATE UNIQUE INDEX IF NOT EXISTS leads_identity
            ON leads (coalesce(email, ''), coalesce(number, ''), received_at)"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            ts TEXT NOT NULL,
            level TEXT NOT NULL,
            outcome TEXT NOT NULL,
            source TEXT NOT NULL,
            detail TEXT NULL
        )"#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Ensure the SQLite file and its parent folder exist for a given sqlx URL.
pub fn ensure_sqlite_path(db_url: &str) -> Result<()> {
    let Some(rest) = db_url
        .strip_prefix("sqlite://")
        .or_else(|| db_url.strip_prefix("sqlite:"))
    else {
        return Ok(());
    };
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return Ok(());
    }
    let p = Path::new(path);
    if let Some(parent) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::OpenOptions::new().create(true).append(true).open(p)?;
    Ok(())
}

/// Open a pool for `db_url` and migrate it.
///
/// An in-memory database lives in a single connection, so the pool is pinned
/// to one connection that is never recycled.
pub async fn connect(db_url: &str) -> Result<SqlitePool> {
    ensure_sqlite_path(db_url)?;
    let options = if db_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };
    let pool = options.connect(db_url).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

/// Result of handing a lead to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Inserted(Uuid),
    /// A lead with the same (email, number, received_at) is already stored.
    Duplicate,
}

#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub q: Option<String>,
}

impl ListParams {
    /// (limit, offset, LIKE pattern)
    fn resolve(&self) -> (u32, u32, Option<String>) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(50).clamp(1, 200);
        let like = self
            .q
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{s}%"));
        (limit, (page - 1) * limit, like)
    }
}

/// Persistence handle. Owned by the caller, cloned cheaply into tasks.
#[derive(Clone)]
pub struct LeadStore {
    pool: SqlitePool,
}

impl LeadStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert-or-ignore keyed on the dedup identity.
    pub async fn save(&self, lead: &Lead) -> Result<SaveOutcome> {
        let id = Uuid::new_v4();
        let mut query = sqlx::query(INSERT_LEAD.as_str()).bind(id);
        for key in FieldKey::ALL {
            query = match lead.fields.column_value(key) {
                ColumnValue::Text(v) => query.bind(v),
                ColumnValue::Flag(v) => query.bind(v),
            };
        }
        let done = query
            .bind(&lead.source)
            .bind(&lead.raw)
            .bind(lead.received_at)
            .execute(&self.pool)
            .await?;
        if done.rows_affected() == 0 {
            Ok(SaveOutcome::Duplicate)
        } else {
            Ok(SaveOutcome::Inserted(id))
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<DbLead>> {
        let sql = format!("{} WHERE id = ?", SELECT_LEAD.as_str());
        let row = sqlx::query_as::<_, DbLead>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Newest first.
    pub async fn list(&self, params: &ListParams) -> Result<Vec<DbLead>> {
        let (limit, offset, like) = params.resolve();
        let filter = if like.is_some() {
            " WHERE coalesce(name,'') LIKE ? OR coalesce(email,'') LIKE ? OR coalesce(number,'') LIKE ? OR source LIKE ?"
        } else {
            ""
        };
        let sql = format!(
            "{}{} ORDER BY received_at DESC LIMIT ? OFFSET ?",
            SELECT_LEAD.as_str(),
            filter
        );
        let mut query = sqlx::query_as::<_, DbLead>(&sql);
        if let Some(like) = like.as_ref() {
            query = query.bind(like).bind(like).bind(like).bind(like);
        }
        let rows = query
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn log(
        &self,
        level: &str,
        outcome: &str,
        source: &str,
        detail: Option<&str>,
    ) -> Result<()> {
        sqlx::query("INSERT INTO logs (ts, level, outcome, source, detail) VALUES (?, ?, ?, ?, ?)")
            .bind(Utc::now())
            .bind(level)
            .bind(outcome)
            .bind(source)
            .bind(detail)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Most recent `limit` entries, oldest first.
    pub async fn recent_logs(&self, limit: u32) -> Result<Vec<LogEntry>> {
        let mut logs: Vec<LogEntry> = sqlx::query_as(
            "SELECT id, ts, level, outcome, source, detail FROM logs ORDER BY id DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        logs.reverse();
        Ok(logs)
    }
}
