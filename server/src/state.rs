use std::sync::Arc;

use crate::services::intake::IntakeService;
use crate::services::notifier::Notifier;
use crate::services::store::RegistrantStore;

/// Shared handler state. Everything in here is immutable after startup.
#[derive(Clone)]
pub struct AppState {
    /// Table-backed intake behind `/api/submit`.
    pub table_intake: IntakeService,
    /// Spreadsheet-backed intake behind `/sheet/submit`.
    pub sheet_intake: IntakeService,
    pub notifier: Arc<dyn Notifier>,
    pub chat_link: Arc<str>,
}

impl AppState {
    pub fn new(
        table_store: Arc<dyn RegistrantStore>,
        sheet_store: Arc<dyn RegistrantStore>,
        notifier: Arc<dyn Notifier>,
        chat_link: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            table_intake: IntakeService::new(table_store, notifier.clone()),
            sheet_intake: IntakeService::new(sheet_store, notifier.clone()),
            notifier,
            chat_link: chat_link.into(),
        }
    }
}
