use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::relation::{RELATION_RULES, Relation};

/// The collections exposed by the remote medical-records API.
///
/// The serialized form is the collection name, which is also the REST path segment
/// (e.g. `/doctors/7`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Doctors,
    Patients,
    Appointments,
    Diagnoses,
    Prescriptions,
}

impl ResourceKind {
    /// All the resource kinds, in the order the admin UI lists them.
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Doctors,
        ResourceKind::Patients,
        ResourceKind::Appointments,
        ResourceKind::Diagnoses,
        ResourceKind::Prescriptions,
    ];

    /// Returns the collection name (e.g. `"doctors"`).
    pub const fn collection(&self) -> &'static str {
        match self {
            ResourceKind::Doctors => "doctors",
            ResourceKind::Patients => "patients",
            ResourceKind::Appointments => "appointments",
            ResourceKind::Diagnoses => "diagnoses",
            ResourceKind::Prescriptions => "prescriptions",
        }
    }

    /// Returns the singular, lowercase noun for a record of this kind (e.g. `"diagnosis"`).
    pub const fn singular(&self) -> &'static str {
        match self {
            ResourceKind::Doctors => "doctor",
            ResourceKind::Patients => "patient",
            ResourceKind::Appointments => "appointment",
            ResourceKind::Diagnoses => "diagnosis",
            ResourceKind::Prescriptions => "prescription",
        }
    }

    /// Returns `"1 appointment"`, `"2 appointments"`, ...
    pub fn count_noun(&self, count: u64) -> String {
        if count == 1 {
            format!("{count} {}", self.singular())
        } else {
            format!("{count} {}", self.collection())
        }
    }

    /// Returns the relations which must be deleted before a record of this kind.
    ///
    /// Kinds without dependents return an empty slice.
    pub fn dependents(&self) -> &'static [Relation] {
        RELATION_RULES
            .iter()
            .find(|(parent, _)| parent == self)
            .map(|(_, relations)| *relations)
            .unwrap_or(&[])
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

impl FromStr for ResourceKind {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.collection() == s)
            .ok_or_else(|| ApiError::UnknownResourceKind(s.to_string()))
    }
}
