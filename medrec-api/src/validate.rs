//! Validation of the record and login forms before they are sent to the API.
//!
//! The checks run in two passes, the way the admin forms do: first every required field must
//! be filled in; only then are the field formats (email, phone) checked.

mod email;
mod phone;

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

pub use self::email::EmailValidator;
pub use self::phone::PhoneNumberValidator;
use crate::error::{ApiError, ApiResult};
use crate::kind::ResourceKind;
use crate::record::Record;

/// Summary when a required field is blank.
pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill in all required fields";
/// Summary when a field has an invalid format.
pub const INVALID_FIELDS_MESSAGE: &str = "Please fix the validation errors below";
const REQUIRED_FIELD_MESSAGE: &str = "This field is required";

const MIN_PASSWORD_LEN: usize = 6;

/// Trait for validating a field value.
pub trait Validate {
    /// Validates the given value, returning the message to show next to the field on error.
    fn validate(&self, value: &str) -> Result<(), &'static str>;
}

/// A validator for the minimum length of a string, in characters.
pub struct MinStrlenValidator {
    pub min_len: usize,
    pub message: &'static str,
}

impl Validate for MinStrlenValidator {
    fn validate(&self, value: &str) -> Result<(), &'static str> {
        if value.chars().count() < self.min_len {
            Err(self.message)
        } else {
            Ok(())
        }
    }
}

/// Per-field errors of a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    summary: &'static str,
    fields: BTreeMap<String, &'static str>,
}

impl ValidationErrors {
    /// Message to show at the top of the form.
    pub fn summary(&self) -> &'static str {
        self.summary
    }

    /// Returns the error of the given field, if any.
    pub fn field(&self, name: &str) -> Option<&'static str> {
        self.fields.get(name).copied()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &'static str)> {
        self.fields
            .iter()
            .map(|(name, message)| (name.as_str(), *message))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn add(&mut self, field: &str, message: &'static str) {
        self.fields.entry(field.to_string()).or_insert(message);
    }

    fn into_result(mut self, summary: &'static str) -> ApiResult<()> {
        if self.is_empty() {
            return Ok(());
        }
        self.summary = summary;
        Err(ApiError::Validation(self))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.summary)?;
        for (index, (field, message)) in self.fields().enumerate() {
            let separator = if index == 0 { ": " } else { "; " };
            write!(f, "{separator}{field}: {message}")?;
        }
        Ok(())
    }
}

/// Returns the fields the form of `kind` requires.
pub const fn required_fields(kind: ResourceKind) -> &'static [&'static str] {
    match kind {
        ResourceKind::Doctors => &["first_name", "last_name", "email", "phone", "specialisation"],
        ResourceKind::Patients => &["first_name", "last_name", "email", "phone"],
        ResourceKind::Appointments => &["doctor_id", "patient_id", "appointment_date"],
        ResourceKind::Diagnoses => &["patient_id", "condition", "diagnosis_date"],
        ResourceKind::Prescriptions => {
            &["patient_id", "doctor_id", "medication", "dosage", "start_date"]
        }
    }
}

/// Validates a complete record of `kind`, as submitted by its create form.
pub fn validate_record(kind: ResourceKind, record: &Record) -> ApiResult<()> {
    let mut errors = ValidationErrors::default();
    for field in required_fields(kind) {
        if !is_filled(record.get(field)) {
            errors.add(field, REQUIRED_FIELD_MESSAGE);
        }
    }
    errors.into_result(REQUIRED_FIELDS_MESSAGE)?;

    check_formats(kind, record)
}

/// Validates the fields present in a partial update of a record of `kind`.
///
/// A required field may be omitted, but not blanked.
pub fn validate_patch(kind: ResourceKind, patch: &Record) -> ApiResult<()> {
    let mut errors = ValidationErrors::default();
    for field in required_fields(kind) {
        if let Some(value) = patch.get(field)
            && !is_filled(Some(value))
        {
            errors.add(field, REQUIRED_FIELD_MESSAGE);
        }
    }
    errors.into_result(REQUIRED_FIELDS_MESSAGE)?;

    check_formats(kind, patch)
}

/// Validates the login form.
pub fn validate_login(email: &str, password: &str) -> ApiResult<()> {
    let mut errors = ValidationErrors::default();
    if let Err(message) = EmailValidator.validate(email) {
        errors.add("email", message);
    }
    let password_validator = MinStrlenValidator {
        min_len: MIN_PASSWORD_LEN,
        message: "Password must be at least 6 characters",
    };
    if let Err(message) = password_validator.validate(password) {
        errors.add("password", message);
    }
    errors.into_result(INVALID_FIELDS_MESSAGE)
}

fn check_formats(kind: ResourceKind, record: &Record) -> ApiResult<()> {
    let phone = match kind {
        ResourceKind::Doctors => Some(PhoneNumberValidator::DOCTOR),
        ResourceKind::Patients => Some(PhoneNumberValidator::PATIENT),
        _ => None,
    };
    let mut errors = ValidationErrors::default();
    if let Some(validator) = phone {
        check_field(&mut errors, record, "phone", &validator);
        check_field(&mut errors, record, "email", &EmailValidator);
    }
    errors.into_result(INVALID_FIELDS_MESSAGE)
}

/// Checks `field` with `validator` if it is filled in.
fn check_field(
    errors: &mut ValidationErrors,
    record: &Record,
    field: &str,
    validator: &impl Validate,
) {
    let value = match record.get(field) {
        Some(Value::String(text)) if !text.trim().is_empty() => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        _ => return,
    };
    if let Err(message) = validator.validate(&value) {
        errors.add(field, message);
    }
}

fn is_filled(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(text)) => !text.trim().is_empty(),
        Some(_) => true,
    }
}
