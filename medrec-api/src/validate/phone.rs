use lazy_regex::{Lazy, Regex, lazy_regex};

use super::Validate;

static DIGITS_REGEX: Lazy<Regex> = lazy_regex!(r"^\d+$");

/// A validator for the phone numbers of the record forms.
///
/// Numbers are at most [`PhoneNumberValidator::max_len`] characters long; the doctor form
/// additionally requires digits only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhoneNumberValidator {
    pub max_len: usize,
    pub digits_only: bool,
    too_long: &'static str,
}

impl PhoneNumberValidator {
    /// Phone of a doctor: up to 10 digits.
    pub const DOCTOR: Self = Self {
        max_len: 10,
        digits_only: true,
        too_long: "Phone number must be 10 digits or less",
    };

    /// Phone of a patient: up to 10 characters.
    pub const PATIENT: Self = Self {
        max_len: 10,
        digits_only: false,
        too_long: "Phone number must be at most 10 characters",
    };
}

impl Validate for PhoneNumberValidator {
    fn validate(&self, value: &str) -> Result<(), &'static str> {
        let value = value.trim();
        if value.chars().count() > self.max_len {
            return Err(self.too_long);
        }
        if self.digits_only && !DIGITS_REGEX.is_match(value) {
            return Err("Phone number must contain only digits");
        }
        Ok(())
    }
}
