//! # Medrec Core
//!
//! Relational integrity for the medical-records admin front end.
//!
//! The remote API doesn't enforce referential integrity: deleting a doctor leaves its
//! appointments and prescriptions pointing at nothing. The [`RelatedRecordsResolver`]
//! knows which collections reference which (see [`RELATION_RULES`]) and can either
//! gather the related records for display or delete them before their parent.
//!
//! ```rust
//! use medrec_core::prelude::*;
//! ```
//!
//! - [`RelatedRecordsResolver`](crate::prelude::RelatedRecordsResolver)
//! - [`CascadeResult`](crate::prelude::CascadeResult)
//! - [`CascadePhase`](crate::prelude::CascadePhase)
//! - [`RelationsError`](crate::prelude::RelationsError)
//! - [`ListView`](crate::prelude::ListView)
//! - [`Statistics`](crate::prelude::Statistics)
//!
//! [`RelatedRecordsResolver`]: crate::prelude::RelatedRecordsResolver
//! [`RELATION_RULES`]: medrec_api::prelude::RELATION_RULES

mod aggregate;
mod error;
mod listing;
pub mod prelude;
mod resolver;
mod stats;
