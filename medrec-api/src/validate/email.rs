use lazy_regex::{Lazy, Regex, lazy_regex};

use super::Validate;

static EMAIL_REGEX: Lazy<Regex> =
    lazy_regex!(r"^[A-Za-z0-9]{1}[A-Za-z0-9._%+-]*@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$");

/// A validator for email addresses.
///
/// ```rust
/// use medrec_api::prelude::{EmailValidator, Validate};
///
/// assert!(EmailValidator.validate("ada@clinic.ie").is_ok());
/// assert!(EmailValidator.validate("ada@clinic").is_err());
/// ```
pub struct EmailValidator;

impl Validate for EmailValidator {
    fn validate(&self, value: &str) -> Result<(), &'static str> {
        if EMAIL_REGEX.is_match(value.trim()) {
            Ok(())
        } else {
            Err("Please enter a valid email address")
        }
    }
}
