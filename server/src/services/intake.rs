use std::sync::Arc;

use thiserror::Error;

use crate::models::registrant::{Registrant, RegistrationRequest};
use crate::services::notifier::{dispatch, Notifier};
use crate::services::store::{RegistrantStore, StoreError};
use crate::services::validator::{validate, ValidationError};

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("duplicate email")]
    DuplicateEmail,

    #[error("{0}")]
    Store(String),
}

impl From<StoreError> for IntakeError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => IntakeError::DuplicateEmail,
            StoreError::Failure(message) => IntakeError::Store(message),
        }
    }
}

/// Validate, de-duplicate, persist, then notify best-effort.
///
/// Host bindings translate their request shape into a
/// [`RegistrationRequest`] and map the result back out; nothing here knows
/// about HTTP.
#[derive(Clone)]
pub struct IntakeService {
    store: Arc<dyn RegistrantStore>,
    notifier: Arc<dyn Notifier>,
}

impl IntakeService {
    pub fn new(store: Arc<dyn RegistrantStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Returns as soon as the record is persisted. The admin notification
    /// runs on a detached task and cannot affect the result.
    pub async fn submit(&self, request: RegistrationRequest) -> Result<Registrant, IntakeError> {
        let record = validate(&request).inspect_err(|e| {
            tracing::info!(field = e.field(), reason = %e, "Submission rejected");
        })?;

        let stored = self.store.submit(record).await.inspect_err(|e| match e {
            StoreError::DuplicateEmail => {
                tracing::info!(backend = self.store.backend(), "Duplicate email submitted");
            }
            StoreError::Failure(message) => {
                tracing::debug!(backend = self.store.backend(), error = %message, "Store write failed");
            }
        })?;

        tracing::info!(
            backend = self.store.backend(),
            id = %stored.id,
            "Registrant stored"
        );

        dispatch(self.notifier.clone(), stored.clone());

        Ok(stored)
    }
}
