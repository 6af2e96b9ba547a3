//! Prelude exposes all the types for `medrec-core` crate.

pub use medrec_api::prelude::*;
pub use medrec_client::prelude::{Client, ClientConfig, ClientError, ClientResult, HttpClient};

pub use crate::aggregate::{
    AppointmentDetails, DoctorPrescriptions, PatientRecords, PrescriptionDetails,
};
pub use crate::error::{RelationsError, RelationsResult};
pub use crate::listing::{DEFAULT_SORT_FIELD, ListView, SortOrder};
pub use crate::resolver::{CascadePhase, CascadeResult, RecordCounts, RelatedRecordsResolver};
pub use crate::stats::{Overview, Statistics, appointment_day};
