use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::models::registrant::{NewRegistrant, RegistrationRequest};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

// Applied after hyphens are stripped: 01X + 3-4 digits + 4 digits.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^01[0-9][0-9]{3,4}[0-9]{4}$").expect("phone pattern"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid email format")]
    InvalidEmail,

    #[error("invalid phone number format")]
    InvalidPhone,
}

impl ValidationError {
    /// Form field the error belongs to, for inline display.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingField(field) => field,
            ValidationError::InvalidEmail => "email",
            ValidationError::InvalidPhone => "phone",
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(&phone.replace('-', ""))
}

/// Checks a raw submission and normalizes it into a [`NewRegistrant`].
///
/// Checks run in a fixed order and the first failure wins: presence of
/// name, organization, phone and email, then email shape, then phone shape.
pub fn validate(request: &RegistrationRequest) -> Result<NewRegistrant, ValidationError> {
    let name = required(&request.name, "name")?;
    let organization = required(&request.organization, "organization")?;
    let phone = required(&request.phone, "phone")?;
    let email = required(&request.email, "email")?;

    if !is_valid_email(&email) {
        return Err(ValidationError::InvalidEmail);
    }
    if !is_valid_phone(&phone) {
        return Err(ValidationError::InvalidPhone);
    }

    Ok(NewRegistrant {
        name,
        organization,
        phone,
        email,
        position: optional(&request.position),
        work_area: optional(&request.work_area),
        purpose: optional(&request.purpose),
    })
}

fn required(value: &Option<String>, field: &'static str) -> Result<String, ValidationError> {
    optional(value).ok_or(ValidationError::MissingField(field))
}

fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
