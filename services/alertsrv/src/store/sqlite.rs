//! SQLite-backed alert store

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    QueryBuilder, Sqlite, SqlitePool,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{
    fold_country, Alert, AlertFilter, AlertPage, AlertPatch, NewAlert, PageRequest,
};
use crate::error::{AlertError, Result};
use crate::store::AlertStore;

/// Schema statements, applied in order on connect
///
/// The CHECK constraints mirror the closed enum sets and the non-blank text
/// rule so rows written outside this crate cannot break them either.
/// `country_folded` holds the Unicode lower-cased country; SQLite's own
/// `lower()` only folds ASCII.
const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS alerts (
        seq        INTEGER PRIMARY KEY AUTOINCREMENT,
        id         TEXT NOT NULL UNIQUE,
        country    TEXT NOT NULL CHECK (length(trim(country)) > 0),
        country_folded TEXT NOT NULL,
        city       TEXT NOT NULL CHECK (length(trim(city)) > 0),
        visa_type  TEXT NOT NULL CHECK (visa_type IN ('Tourist', 'Business', 'Student')),
        status     TEXT NOT NULL DEFAULT 'Active' CHECK (status IN ('Active', 'Booked', 'Expired')),
        created_at TEXT NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_alerts_country_status ON alerts (country_folded, status)",
    "CREATE INDEX IF NOT EXISTS idx_alerts_created_at ON alerts (created_at DESC, seq DESC)",
];

const SELECT_COLUMNS: &str = "SELECT id, country, city, visa_type, status, created_at FROM alerts";

#[derive(Debug, sqlx::FromRow)]
struct AlertRow {
    id: String,
    country: String,
    city: String,
    visa_type: String,
    status: String,
    created_at: String,
}

impl TryFrom<AlertRow> for Alert {
    type Error = AlertError;

    fn try_from(row: AlertRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| AlertError::store(format!("corrupt alert id '{}': {}", row.id, e)))?;
        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|e| {
                AlertError::store(format!("corrupt created_at '{}': {}", row.created_at, e))
            })?
            .with_timezone(&Utc);
        let visa_type = row
            .visa_type
            .parse()
            .map_err(|_| AlertError::store(format!("corrupt visa_type '{}'", row.visa_type)))?;
        let status = row
            .status
            .parse()
            .map_err(|_| AlertError::store(format!("corrupt status '{}'", row.status)))?;

        Ok(Alert {
            id,
            country: row.country,
            city: row.city,
            visa_type,
            status,
            created_at,
        })
    }
}

/// Fixed-width RFC 3339 so text ordering equals time ordering
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &AlertFilter) {
    builder.push(" WHERE 1 = 1");
    if let Some(country) = &filter.country {
        builder
            .push(" AND instr(country_folded, ")
            .push_bind(fold_country(country))
            .push(") > 0");
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status.as_str());
    }
}

/// SQLite alert store
pub struct SqliteAlertStore {
    pool: SqlitePool,
}

impl SqliteAlertStore {
    /// Connect to `url` (`sqlite://path`, `sqlite:path` or `sqlite::memory:`) and
    /// apply the schema
    pub async fn connect(url: &str) -> Result<Self> {
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");

        let mut options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));
        if !in_memory {
            options = options
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal);
        }

        // Each connection to an in-memory database sees its own database, so
        // pin a single connection that never expires
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(10)
        };

        let pool = pool_options.connect_with(options).await?;
        let store = Self::from_pool(pool).await?;
        info!("SQLite alert store ready: {}", url);
        Ok(store)
    }

    /// Wrap an existing pool and apply the schema
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl AlertStore for SqliteAlertStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn list(&self, filter: &AlertFilter, page: PageRequest) -> Result<AlertPage> {
        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM alerts");
        push_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut query = QueryBuilder::<Sqlite>::new(SELECT_COLUMNS);
        push_filter(&mut query, filter);
        query
            .push(" ORDER BY created_at DESC, seq DESC LIMIT ")
            .push_bind(i64::from(page.limit()))
            .push(" OFFSET ")
            .push_bind(i64::try_from(page.offset()).unwrap_or(i64::MAX));

        let rows: Vec<AlertRow> = query.build_query_as().fetch_all(&self.pool).await?;
        let alerts = rows
            .into_iter()
            .map(Alert::try_from)
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Listed {} of {} alerts (page {}, limit {})",
            alerts.len(),
            total,
            page.page(),
            page.limit()
        );
        Ok(AlertPage {
            alerts,
            total: total as u64,
        })
    }

    async fn get(&self, id: Uuid) -> Result<Alert> {
        let row: Option<AlertRow> = sqlx::query_as(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.ok_or_else(|| AlertError::not_found(id))?.try_into()
    }

    async fn create(&self, input: NewAlert) -> Result<Alert> {
        let alert = Alert::new(input.validate()?);

        sqlx::query(
            "INSERT INTO alerts (id, country, country_folded, city, visa_type, status, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(alert.id.to_string())
        .bind(alert.country.as_str())
        .bind(fold_country(&alert.country))
        .bind(alert.city.as_str())
        .bind(alert.visa_type.as_str())
        .bind(alert.status.as_str())
        .bind(format_timestamp(&alert.created_at))
        .execute(&self.pool)
        .await?;

        Ok(alert)
    }

    async fn update(&self, id: Uuid, patch: AlertPatch) -> Result<Alert> {
        if patch.is_empty() {
            return self.get(id).await;
        }
        let patch = patch.validate()?;
        let country_folded = patch.country.as_deref().map(fold_country);

        // Single statement: concurrent updates to one alert are last-write-wins
        let row: Option<AlertRow> = sqlx::query_as(
            "UPDATE alerts SET \
                status = COALESCE(?, status), \
                country = COALESCE(?, country), \
                country_folded = COALESCE(?, country_folded), \
                city = COALESCE(?, city), \
                visa_type = COALESCE(?, visa_type) \
             WHERE id = ? \
             RETURNING id, country, city, visa_type, status, created_at",
        )
        .bind(patch.status.map(|s| s.as_str()))
        .bind(patch.country)
        .bind(country_folded)
        .bind(patch.city)
        .bind(patch.visa_type.map(|v| v.as_str()))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| AlertError::not_found(id))?.try_into()
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM alerts WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AlertError::not_found(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_schema_has_country_status_index() {
        let store = SqliteAlertStore::connect("sqlite::memory:").await.unwrap();
        let name: Option<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'index' AND name = 'idx_alerts_country_status'",
        )
        .fetch_optional(store.pool())
        .await
        .unwrap();
        assert_eq!(name.as_deref(), Some("idx_alerts_country_status"));
    }

    #[tokio::test]
    async fn test_check_constraints_reject_bad_rows() {
        let store = SqliteAlertStore::connect("sqlite::memory:").await.unwrap();
        let result = sqlx::query(
            "INSERT INTO alerts (id, country, country_folded, city, visa_type, status, created_at) \
             VALUES ('x', 'France', 'france', 'Paris', 'Tourist', 'Cancelled', '2026-01-01T00:00:00.000Z')",
        )
        .execute(store.pool())
        .await;
        assert!(result.is_err());

        let result = sqlx::query(
            "INSERT INTO alerts (id, country, country_folded, city, visa_type, created_at) \
             VALUES ('y', '   ', '   ', 'Paris', 'Tourist', '2026-01-01T00:00:00.000Z')",
        )
        .execute(store.pool())
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_file_database_survives_reconnect() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("alerts.db").display());

        let created = {
            let store = SqliteAlertStore::connect(&url).await.unwrap();
            let alert = store
                .create(NewAlert::new("Italy", "Rome", "Business"))
                .await
                .unwrap();
            store.pool().close().await;
            alert
        };

        let store = SqliteAlertStore::connect(&url).await.unwrap();
        assert_eq!(store.get(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_country_folded_follows_updates() {
        let store = SqliteAlertStore::connect("sqlite::memory:").await.unwrap();
        let alert = store
            .create(NewAlert::new("ÉIRE", "Dublin", "Student"))
            .await
            .unwrap();

        let folded: String = sqlx::query_scalar("SELECT country_folded FROM alerts WHERE id = ?")
            .bind(alert.id.to_string())
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(folded, "éire");

        let patch = AlertPatch {
            country: Some("Ísland".to_string()),
            ..Default::default()
        };
        store.update(alert.id, patch).await.unwrap();
        let folded: String = sqlx::query_scalar("SELECT country_folded FROM alerts WHERE id = ?")
            .bind(alert.id.to_string())
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(folded, "ísland");
    }

    #[test]
    fn test_timestamp_format_is_fixed_width() {
        let ts = DateTime::parse_from_rfc3339("2026-10-18T09:05:03Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_timestamp(&ts), "2026-10-18T09:05:03.000Z");
    }

    #[test]
    fn test_corrupt_row_is_a_store_error() {
        let row = AlertRow {
            id: Uuid::new_v4().to_string(),
            country: "France".to_string(),
            city: "Paris".to_string(),
            visa_type: "Tourist".to_string(),
            status: "Archived".to_string(),
            created_at: "2026-10-18T09:05:03.000Z".to_string(),
        };
        let err = Alert::try_from(row).unwrap_err();
        assert!(matches!(err, AlertError::Store(_)));
    }
}
