#![crate_name = "medrec_api"]
#![crate_type = "lib"]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Medrec API
//!
//! This crate exposes all the types shared between the medrec remote client and the
//! relational integrity layer built on top of it.
//!
//! You can import all the useful types and traits by using the prelude module:
//!
//! ```rust
//! use medrec_api::prelude::*;
//! ```
//!
//! ## Types
//!
//! ### Resources
//!
//! - [`ResourceKind`](crate::prelude::ResourceKind)
//! - [`Record`](crate::prelude::Record)
//! - [`RecordId`](crate::prelude::RecordId)
//!
//! ### Relations
//!
//! - [`DeleteBehavior`](crate::prelude::DeleteBehavior)
//! - [`ForeignKey`](crate::prelude::ForeignKey)
//! - [`Relation`](crate::prelude::Relation)
//! - [`RELATION_RULES`](crate::prelude::RELATION_RULES)
//! - [`referencing_relations`](crate::prelude::referencing_relations)
//!
//! ### Credentials
//!
//! - [`BearerToken`](crate::prelude::BearerToken)
//! - [`CredentialStore`](crate::prelude::CredentialStore)
//! - [`MemoryCredentialStore`](crate::prelude::MemoryCredentialStore)
//! - [`Session`](crate::prelude::Session)
//! - [`UserProfile`](crate::prelude::UserProfile)
//!
//! ### Validation
//!
//! - [`Validate`](crate::prelude::Validate)
//! - [`EmailValidator`](crate::prelude::EmailValidator)
//! - [`MinStrlenValidator`](crate::prelude::MinStrlenValidator)
//! - [`PhoneNumberValidator`](crate::prelude::PhoneNumberValidator)
//! - [`ValidationErrors`](crate::prelude::ValidationErrors)
//! - [`validate_record`](crate::prelude::validate_record)
//! - [`validate_patch`](crate::prelude::validate_patch)
//! - [`validate_login`](crate::prelude::validate_login)
//!
//! ### Errors
//!
//! - [`ApiError`](crate::prelude::ApiError)
//! - [`ApiResult`](crate::prelude::ApiResult)
//!

// makes the crate accessible as `medrec_api` in doc tests and fixtures
extern crate self as medrec_api;

mod credentials;
mod delete;
mod error;
mod kind;
pub mod prelude;
mod record;
mod relation;
mod validate;
