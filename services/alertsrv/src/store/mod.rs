//! Alert persistence
//!
//! Implementations:
//! - `SqliteAlertStore`: production SQLite backend
//! - `MemoryAlertStore`: in-memory backend for tests and throwaway runs
//!
//! Every implementation validates writes through the domain module, so the
//! data model invariants hold regardless of the caller.

pub mod memory;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Alert, AlertFilter, AlertPage, AlertPatch, NewAlert, PageRequest};
use crate::error::{AlertError, Result};

pub use memory::MemoryAlertStore;
pub use sqlite::SqliteAlertStore;

/// URL scheme selecting the in-memory backend
pub const MEMORY_URL: &str = "memory://";

/// Alert storage interface
///
/// Listings are ordered by `created_at` descending; alerts created within the
/// same millisecond come back most recently inserted first.
#[async_trait]
pub trait AlertStore: Send + Sync + 'static {
    /// Short backend name for logs
    fn backend(&self) -> &'static str;

    /// One page of matching alerts and the total match count
    async fn list(&self, filter: &AlertFilter, page: PageRequest) -> Result<AlertPage>;

    /// Fetch a single alert
    async fn get(&self, id: Uuid) -> Result<Alert>;

    /// Validate and persist a new alert; status is always `Active`
    async fn create(&self, input: NewAlert) -> Result<Alert>;

    /// Validate and apply the supplied fields of `patch`
    async fn update(&self, id: Uuid, patch: AlertPatch) -> Result<Alert>;

    /// Hard delete
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Open the store selected by `url`
///
/// - `memory://` opens an empty in-memory store
/// - `sqlite:...` opens (and creates if missing) a SQLite database
pub async fn open_store(url: &str) -> Result<Arc<dyn AlertStore>> {
    let url = url.trim();
    if url == MEMORY_URL {
        return Ok(Arc::new(MemoryAlertStore::new()));
    }
    if url.starts_with("sqlite:") {
        return Ok(Arc::new(SqliteAlertStore::connect(url).await?));
    }
    Err(AlertError::config(format!(
        "unsupported storage url '{}': expected '{}' or 'sqlite:...'",
        url, MEMORY_URL
    )))
}
