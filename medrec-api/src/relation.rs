use std::fmt;

use serde::{Deserialize, Serialize};

use crate::kind::ResourceKind;

/// A foreign-key field carried by a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForeignKey {
    DoctorId,
    PatientId,
    DiagnosisId,
}

impl ForeignKey {
    /// Name of the field holding the key (e.g. `"doctor_id"`).
    pub const fn column(&self) -> &'static str {
        match self {
            ForeignKey::DoctorId => "doctor_id",
            ForeignKey::PatientId => "patient_id",
            ForeignKey::DiagnosisId => "diagnosis_id",
        }
    }

    /// The kind of record the key points to.
    pub const fn references(&self) -> ResourceKind {
        match self {
            ForeignKey::DoctorId => ResourceKind::Doctors,
            ForeignKey::PatientId => ResourceKind::Patients,
            ForeignKey::DiagnosisId => ResourceKind::Diagnoses,
        }
    }
}

impl fmt::Display for ForeignKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// A (child collection, foreign key) pair: records of `child` whose `foreign_key`
/// field holds the id of a parent record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Relation {
    /// Collection holding the referencing records.
    pub child: ResourceKind,
    /// Field of the child records which holds the parent id.
    pub foreign_key: ForeignKey,
}

impl Relation {
    pub const fn new(child: ResourceKind, foreign_key: ForeignKey) -> Self {
        Self { child, foreign_key }
    }

    /// The parent kind this relation points to.
    pub const fn parent(&self) -> ResourceKind {
        self.foreign_key.references()
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.child, self.foreign_key)
    }
}

/// Relations which must be deleted before their parent, keyed by parent kind.
///
/// Kinds which don't appear here have no dependents.
pub const RELATION_RULES: &[(ResourceKind, &[Relation])] = &[
    (
        ResourceKind::Doctors,
        &[
            Relation::new(ResourceKind::Appointments, ForeignKey::DoctorId),
            Relation::new(ResourceKind::Prescriptions, ForeignKey::DoctorId),
        ],
    ),
    (
        ResourceKind::Patients,
        &[
            Relation::new(ResourceKind::Appointments, ForeignKey::PatientId),
            Relation::new(ResourceKind::Prescriptions, ForeignKey::PatientId),
            Relation::new(ResourceKind::Diagnoses, ForeignKey::PatientId),
        ],
    ),
];

/// Foreign keys carried by each collection of the remote API.
const FOREIGN_KEYS: &[(ResourceKind, &[ForeignKey])] = &[
    (ResourceKind::Doctors, &[]),
    (ResourceKind::Patients, &[]),
    (
        ResourceKind::Appointments,
        &[ForeignKey::DoctorId, ForeignKey::PatientId],
    ),
    (ResourceKind::Diagnoses, &[ForeignKey::PatientId]),
    (
        ResourceKind::Prescriptions,
        &[
            ForeignKey::PatientId,
            ForeignKey::DoctorId,
            ForeignKey::DiagnosisId,
        ],
    ),
];

/// Returns every relation whose foreign key points at `target`, whether or not it takes
/// part in a cascade delete.
///
/// Example:
///
/// Calling `referencing_relations(ResourceKind::Diagnoses)` returns
/// `[prescriptions.diagnosis_id]`, even though deleting a diagnosis doesn't cascade.
pub fn referencing_relations(target: ResourceKind) -> Vec<Relation> {
    FOREIGN_KEYS
        .iter()
        .flat_map(|(child, keys)| {
            keys.iter()
                .filter(|fk| fk.references() == target)
                .map(|fk| Relation::new(*child, *fk))
        })
        .collect()
}
