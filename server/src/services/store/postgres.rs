use async_trait::async_trait;
use sqlx::PgPool;

use super::{RegistrantStore, StoreError};
use crate::models::registrant::{NewRegistrant, Registrant};

const REGISTRANT_COLUMNS: &str =
    "id, name, organization, phone, email, position, work_area, purpose, created_at";

/// `registrants` table store. The table carries a UNIQUE constraint on
/// `email`, so a concurrent insert that slips past the lookup still comes
/// back as [`StoreError::DuplicateEmail`].
#[derive(Clone)]
pub struct PgRegistrantStore {
    pool: PgPool,
}

impl PgRegistrantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegistrantStore for PgRegistrantStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Registrant>, StoreError> {
        let query = format!("SELECT {REGISTRANT_COLUMNS} FROM registrants WHERE email = $1");
        let existing = sqlx::query_as::<_, Registrant>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(existing)
    }

    async fn insert(&self, record: NewRegistrant) -> Result<Registrant, StoreError> {
        let query = format!(
            "INSERT INTO registrants \
             (name, organization, phone, email, position, work_area, purpose) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {REGISTRANT_COLUMNS}"
        );
        let stored = sqlx::query_as::<_, Registrant>(&query)
            .bind(&record.name)
            .bind(&record.organization)
            .bind(&record.phone)
            .bind(&record.email)
            .bind(&record.position)
            .bind(&record.work_area)
            .bind(&record.purpose)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(id = %stored.id, "Registrant row inserted");
        Ok(stored)
    }
}
