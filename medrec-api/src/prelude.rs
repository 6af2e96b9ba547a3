//! Prelude exposes all the types for `medrec-api` crate.

pub use crate::credentials::{
    BearerToken, CredentialStore, MemoryCredentialStore, Session, UserProfile, require_token,
};
pub use crate::delete::DeleteBehavior;
pub use crate::error::{ApiError, ApiResult};
pub use crate::kind::ResourceKind;
pub use crate::record::{Record, RecordId};
pub use crate::relation::{ForeignKey, RELATION_RULES, Relation, referencing_relations};
pub use crate::validate::{
    EmailValidator, MinStrlenValidator, PhoneNumberValidator, Validate, ValidationErrors,
    required_fields, validate_login, validate_patch, validate_record,
};
