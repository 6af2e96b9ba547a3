use serde::{Deserialize, Serialize};

/// Defines the behavior for delete operations regarding records which reference the deleted one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeleteBehavior {
    /// Refuse to delete a record which is still referenced.
    Restrict,
    /// Delete the referencing records first, then the record itself.
    #[default]
    Cascade,
}
