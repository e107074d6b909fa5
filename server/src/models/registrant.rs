use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A stored registrant, as returned by every store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Registrant {
    pub id: Uuid,
    pub name: String,
    pub organization: String,
    pub phone: String,
    pub email: String,
    pub position: Option<String>,
    pub work_area: Option<String>,
    pub purpose: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Raw intake form body. Every field is optional here so that missing
/// values surface as validation errors rather than JSON rejections.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub name: Option<String>,
    pub organization: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub position: Option<String>,
    pub work_area: Option<String>,
    pub purpose: Option<String>,
}

/// A validated submission ready to be written. Optional fields are `None`
/// when absent or blank.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRegistrant {
    pub name: String,
    pub organization: String,
    pub phone: String,
    pub email: String,
    pub position: Option<String>,
    pub work_area: Option<String>,
    pub purpose: Option<String>,
}

impl NewRegistrant {
    /// Completes the record with store-assigned identity and timestamp.
    pub fn into_registrant(self, id: Uuid, created_at: DateTime<Utc>) -> Registrant {
        Registrant {
            id,
            name: self.name,
            organization: self.organization,
            phone: self.phone,
            email: self.email,
            position: self.position,
            work_area: self.work_area,
            purpose: self.purpose,
            created_at,
        }
    }
}

/// Public part of a successful registration response.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationSummary {
    pub id: Uuid,
    pub name: String,
}

impl From<&Registrant> for RegistrationSummary {
    fn from(registrant: &Registrant) -> Self {
        Self {
            id: registrant.id,
            name: registrant.name.clone(),
        }
    }
}

/// Row delivered by a database webhook. Every field is read leniently: the
/// sending table may use integer ids and Postgres-style timestamps, and only
/// name and email are required to produce a notification.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookRecord {
    pub id: Option<Value>,
    pub name: Option<String>,
    pub organization: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub position: Option<String>,
    pub work_area: Option<String>,
    pub purpose: Option<String>,
    pub created_at: Option<Value>,
}

impl WebhookRecord {
    /// The hosting platform either wraps the inserted row in `record` or
    /// posts the row itself.
    pub fn from_payload(payload: Value) -> Result<Self, serde_json::Error> {
        match payload {
            Value::Object(mut envelope) if envelope.get("record").is_some_and(Value::is_object) => {
                let record = envelope.remove("record").unwrap_or_default();
                serde_json::from_value(record)
            }
            row => serde_json::from_value(row),
        }
    }

    /// Source row id as display text, whatever its JSON type.
    pub fn id_text(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::Null => None,
            Value::String(id) => Some(id.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Only name and email are required. A non-UUID id is replaced and an
    /// unreadable timestamp falls back to now.
    pub fn into_registrant(self) -> Option<Registrant> {
        let id = self
            .id_text()
            .and_then(|id| Uuid::parse_str(&id).ok())
            .unwrap_or_else(Uuid::new_v4);
        let created_at = self
            .created_at
            .as_ref()
            .and_then(Value::as_str)
            .and_then(parse_store_timestamp)
            .unwrap_or_else(Utc::now);

        let name = self.name.filter(|v| !v.trim().is_empty())?;
        let email = self.email.filter(|v| !v.trim().is_empty())?;

        Some(Registrant {
            id,
            name,
            organization: self.organization.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
            email,
            position: self.position,
            work_area: self.work_area,
            purpose: self.purpose,
            created_at,
        })
    }
}

/// Accepts RFC 3339 and the Postgres text form (`2025-01-05 06:04:05.123+00`).
pub fn parse_store_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z"))
        .map(|at| at.with_timezone(&Utc))
        .ok()
}
