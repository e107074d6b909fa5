use async_trait::async_trait;
use thiserror::Error;

use crate::models::registrant::{NewRegistrant, Registrant};

pub mod memory;
pub mod postgres;
pub mod sheet;

pub use memory::InMemoryRegistrantStore;
pub use postgres::PgRegistrantStore;
pub use sheet::SheetRegistrantStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate email")]
    DuplicateEmail,

    #[error("store failure: {0}")]
    Failure(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateEmail,
            _ => StoreError::Failure(e.to_string()),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Failure(e.to_string())
    }
}

/// A backing store for registrants.
#[async_trait]
pub trait RegistrantStore: Send + Sync {
    /// Short label used in logs.
    fn backend(&self) -> &'static str;

    async fn find_by_email(&self, email: &str) -> Result<Option<Registrant>, StoreError>;

    /// Writes the record, letting the store assign `id` and `created_at`.
    async fn insert(&self, record: NewRegistrant) -> Result<Registrant, StoreError>;

    /// Inserts unless a registrant with the same email already exists.
    ///
    /// The default performs the lookup and the insert as two separate
    /// operations; stores that can make the pair atomic override it.
    async fn submit(&self, record: NewRegistrant) -> Result<Registrant, StoreError> {
        if self.find_by_email(&record.email).await?.is_some() {
            return Err(StoreError::DuplicateEmail);
        }
        self.insert(record).await
    }
}
