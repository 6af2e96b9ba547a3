use medrec_api::prelude::{ApiError, RecordId, Relation, ResourceKind};
use medrec_client::prelude::ClientError;
use thiserror::Error;

use crate::resolver::{CascadePhase, CascadeResult, RecordCounts};

/// Result type for the relational integrity layer.
pub type RelationsResult<T> = Result<T, RelationsError>;

/// Errors raised while resolving or deleting related records.
#[derive(Debug, Error)]
pub enum RelationsError {
    /// A mutating operation was attempted without a usable bearer token; nothing was sent.
    #[error("No authentication token found. Please log in.")]
    MissingCredential,
    #[error("Invalid record id: {0}")]
    InvalidId(RecordId),
    #[error("{relation} does not reference {kind}")]
    InvalidRelation {
        kind: ResourceKind,
        relation: Relation,
    },
    #[error(transparent)]
    Client(#[from] ClientError),
    /// The cascade failed before anything was deleted.
    #[error("Deleting {} #{id} failed while {phase}: {source}", singular(.kind))]
    Cascade {
        kind: ResourceKind,
        id: RecordId,
        phase: CascadePhase,
        source: ClientError,
    },
    /// The cascade failed after some related records were deleted; they stay deleted.
    #[error(
        "Deleting {} #{id} failed while {phase} after removing {}: {source}",
        singular(.kind),
        deleted_counts(.deleted)
    )]
    PartialCascade {
        kind: ResourceKind,
        id: RecordId,
        phase: CascadePhase,
        deleted: CascadeResult,
        source: ClientError,
    },
    /// A restricted delete found records still referencing the root.
    #[error("{} #{id} is still referenced by {dependents}", singular(.kind))]
    Restricted {
        kind: ResourceKind,
        id: RecordId,
        dependents: RecordCounts,
    },
}

impl From<ApiError> for RelationsError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::MissingCredential => RelationsError::MissingCredential,
            other => RelationsError::Client(ClientError::from(other)),
        }
    }
}

impl RelationsError {
    /// Returns whether the failure comes from a record which doesn't exist, e.g. deleting
    /// an already-deleted root.
    pub fn is_not_found(&self) -> bool {
        match self {
            RelationsError::Client(source)
            | RelationsError::Cascade { source, .. }
            | RelationsError::PartialCascade { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// Returns the cascade phase the failure happened in, if it happened during a cascade.
    pub fn phase(&self) -> Option<CascadePhase> {
        match self {
            RelationsError::Cascade { phase, .. } | RelationsError::PartialCascade { phase, .. } => {
                Some(*phase)
            }
            _ => None,
        }
    }

    /// Returns what was deleted before a partial cascade failure.
    pub fn deleted(&self) -> Option<&CascadeResult> {
        match self {
            RelationsError::PartialCascade { deleted, .. } => Some(deleted),
            _ => None,
        }
    }

    /// Returns the message to show to the user.
    pub fn user_message(&self) -> String {
        match self {
            RelationsError::MissingCredential => {
                "No authentication token found. Please log in.".to_string()
            }
            RelationsError::Client(source) | RelationsError::Cascade { source, .. } => {
                source.user_message()
            }
            RelationsError::PartialCascade {
                deleted, source, ..
            } => format!(
                "{} Some related records were removed before the error occurred ({}).",
                source.user_message(),
                deleted.deleted_counts()
            ),
            RelationsError::Restricted {
                kind, dependents, ..
            } => format!(
                "Cannot delete this {}: it is still referenced by {dependents}.",
                kind.singular()
            ),
            RelationsError::InvalidId(_) | RelationsError::InvalidRelation { .. } => {
                self.to_string()
            }
        }
    }
}

fn singular(kind: &ResourceKind) -> &'static str {
    kind.singular()
}

fn deleted_counts(deleted: &CascadeResult) -> &RecordCounts {
    deleted.deleted_counts()
}
