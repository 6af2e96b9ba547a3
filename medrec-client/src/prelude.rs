//! Prelude module for medrec-client

pub use medrec_api::prelude::{
    BearerToken, CredentialStore, DeleteBehavior, ForeignKey, MemoryCredentialStore, Record,
    RecordId, Relation, ResourceKind, Session, UserProfile, ValidationErrors, require_token,
};

#[cfg(feature = "memory")]
pub use crate::client::{ClientCall, MemoryClient};
pub use crate::client::{Client, HttpClient};
pub use crate::config::ClientConfig;
pub use crate::errors::{ClientError, ClientResult};
pub use crate::holidays::{DEFAULT_COUNTRY_CODE, Holiday, HolidayClient};
