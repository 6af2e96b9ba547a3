//! # Medrec Client
//!
//! This crate exposes the client used to talk to the remote medical-records REST API,
//! which owns the doctors, patients, appointments, diagnoses and prescriptions collections.
//!
//! You can import all the useful types and traits by using the prelude module:
//!
//! ```rust
//! use medrec_client::prelude::*;
//! ```
//!
//! ### Clients
//!
//! - [`Client`](crate::prelude::Client)
//! - [`HttpClient`](crate::prelude::HttpClient)
//! - [`MemoryClient`](crate::prelude::MemoryClient) (feature `memory`)
//! - [`HolidayClient`](crate::prelude::HolidayClient)
//!
//! ### Configuration
//!
//! - [`ClientConfig`](crate::prelude::ClientConfig)
//!
//! ## Interact with the API
//!
//! ```rust,no_run
//! use medrec_client::prelude::*;
//!
//! # async fn run() -> ClientResult<()> {
//! let client = HttpClient::new(ClientConfig::default())?;
//! let session = client.login("ada@clinic.ie", "secret").await?;
//! let doctors = client.list(ResourceKind::Doctors).await?;
//! client
//!     .delete(ResourceKind::Appointments, 3, &session.token)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!

#![cfg_attr(docsrs, feature(doc_cfg))]

mod client;
mod config;
mod errors;
mod holidays;
pub mod prelude;
mod utils;
