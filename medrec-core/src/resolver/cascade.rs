use std::collections::BTreeMap;
use std::fmt;

use futures::future::{join_all, try_join_all};
use medrec_api::prelude::{BearerToken, DeleteBehavior, Record, RecordId, Relation, ResourceKind};
use medrec_client::prelude::{Client, ClientError};

use super::{RelatedRecordsResolver, validate_id};
use crate::error::{RelationsError, RelationsResult};

/// Phases of a cascade delete.
///
/// A cascade goes `FetchingChildren -> DeletingChildren -> DeletingRoot`; a failure in any
/// phase ends it, and nothing is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadePhase {
    FetchingChildren,
    DeletingChildren,
    DeletingRoot,
}

impl fmt::Display for CascadePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CascadePhase::FetchingChildren => "fetching related records",
            CascadePhase::DeletingChildren => "deleting related records",
            CascadePhase::DeletingRoot => "deleting the record",
        })
    }
}

/// Number of records per kind.
///
/// Only kinds with at least one record appear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordCounts(BTreeMap<ResourceKind, u64>);

impl RecordCounts {
    /// Returns the count for the given kind, `0` if absent.
    pub fn get(&self, kind: ResourceKind) -> u64 {
        self.0.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, u64)> + '_ {
        self.0.iter().map(|(kind, count)| (*kind, *count))
    }

    fn add(&mut self, kind: ResourceKind, count: u64) {
        if count > 0 {
            *self.0.entry(kind).or_default() += count;
        }
    }
}

impl FromIterator<(ResourceKind, u64)> for RecordCounts {
    fn from_iter<T: IntoIterator<Item = (ResourceKind, u64)>>(iter: T) -> Self {
        let mut counts = Self::default();
        for (kind, count) in iter {
            counts.add(kind, count);
        }
        counts
    }
}

impl fmt::Display for RecordCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(kind, count)| kind.count_noun(count))
            .collect();
        match parts.as_slice() {
            [] => f.write_str("no related records"),
            [only] => f.write_str(only),
            [init @ .., last] => write!(f, "{} and {last}", init.join(", ")),
        }
    }
}

/// Outcome of a cascade delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeResult {
    kind: ResourceKind,
    id: RecordId,
    deleted_counts: RecordCounts,
    root_deleted: bool,
}

impl CascadeResult {
    /// Kind of the root record.
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Id of the root record.
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Related records deleted before the root, per kind.
    pub fn deleted_counts(&self) -> &RecordCounts {
        &self.deleted_counts
    }

    pub fn root_deleted(&self) -> bool {
        self.root_deleted
    }

    /// Message summarizing the cascade for the user.
    pub fn summary(&self) -> String {
        let noun = capitalize(self.kind.singular());
        match (self.root_deleted, self.deleted_counts.is_empty()) {
            (true, true) => format!("{noun} deleted successfully!"),
            (true, false) => format!("{noun} deleted along with {}.", self.deleted_counts),
            (false, _) => format!(
                "{noun} was not deleted; {} removed.",
                self.deleted_counts
            ),
        }
    }
}

impl<C> RelatedRecordsResolver<'_, C>
where
    C: Client,
{
    /// Deletes the root record with the given [`DeleteBehavior`].
    ///
    /// With [`DeleteBehavior::Restrict`] the root is deleted only if nothing references it,
    /// otherwise [`RelationsError::Restricted`] is returned and nothing is deleted.
    pub async fn delete(
        &self,
        kind: ResourceKind,
        id: RecordId,
        behavior: DeleteBehavior,
        token: &BearerToken,
    ) -> RelationsResult<CascadeResult> {
        match behavior {
            DeleteBehavior::Cascade => self.cascade_delete(kind, id, token).await,
            DeleteBehavior::Restrict => self.restricted_delete(kind, id, token).await,
        }
    }

    /// Deletes every record depending on the root (see
    /// [`medrec_api::prelude::RELATION_RULES`]), then the root itself.
    ///
    /// Deletion is not transactional: if the cascade fails, the related records deleted so far
    /// stay deleted and [`RelationsError::PartialCascade`] reports them. The root is never
    /// deleted unless all its dependents were.
    pub async fn cascade_delete(
        &self,
        kind: ResourceKind,
        id: RecordId,
        token: &BearerToken,
    ) -> RelationsResult<CascadeResult> {
        check_preconditions(id, token)?;
        let mut result = CascadeResult {
            kind,
            id,
            deleted_counts: RecordCounts::default(),
            root_deleted: false,
        };

        tracing::debug!(%kind, id, "fetching related records");
        let children = self
            .fetch_dependents(kind, id)
            .await
            .map_err(|source| fail(&result, CascadePhase::FetchingChildren, source))?;

        tracing::debug!(%kind, id, children = children.len(), "deleting related records");
        let (deleted_counts, error) = self.delete_children(&children, token).await;
        result.deleted_counts = deleted_counts;
        if let Some(source) = error {
            return Err(fail(&result, CascadePhase::DeletingChildren, source));
        }

        tracing::debug!(%kind, id, "deleting root record");
        self.client
            .delete(kind, id, token)
            .await
            .map_err(|source| fail(&result, CascadePhase::DeletingRoot, source))?;
        result.root_deleted = true;

        tracing::info!(%kind, id, deleted = %result.deleted_counts, "cascade delete completed");
        Ok(result)
    }

    async fn restricted_delete(
        &self,
        kind: ResourceKind,
        id: RecordId,
        token: &BearerToken,
    ) -> RelationsResult<CascadeResult> {
        check_preconditions(id, token)?;
        let mut result = CascadeResult {
            kind,
            id,
            deleted_counts: RecordCounts::default(),
            root_deleted: false,
        };

        let children = self
            .fetch_dependents(kind, id)
            .await
            .map_err(|source| fail(&result, CascadePhase::FetchingChildren, source))?;
        if !children.is_empty() {
            let dependents: RecordCounts =
                children.iter().map(|(child, _)| (*child, 1)).collect();
            tracing::warn!(%kind, id, %dependents, "delete restricted by related records");
            return Err(RelationsError::Restricted {
                kind,
                id,
                dependents,
            });
        }

        self.client
            .delete(kind, id, token)
            .await
            .map_err(|source| fail(&result, CascadePhase::DeletingRoot, source))?;
        result.root_deleted = true;

        tracing::info!(%kind, id, "record deleted");
        Ok(result)
    }

    /// Fetches the dependents of the root according to its relation rules, as
    /// `(kind, id)` pairs.
    ///
    /// The child collections are fetched concurrently; if any fetch fails, the whole
    /// operation fails.
    async fn fetch_dependents(
        &self,
        kind: ResourceKind,
        id: RecordId,
    ) -> Result<Vec<(ResourceKind, RecordId)>, ClientError> {
        let relations = kind.dependents();
        if relations.is_empty() {
            return Ok(Vec::new());
        }

        let related = try_join_all(
            relations
                .iter()
                .map(|relation| self.fetch_related(id, *relation)),
        )
        .await?;

        let mut children = Vec::new();
        for (relation, records) in relations.iter().zip(related) {
            for record in records {
                children.push((relation.child, child_id(relation, &record)?));
            }
        }
        Ok(children)
    }

    /// Deletes the given records concurrently.
    ///
    /// Every delete is awaited, so the returned counts cover every confirmed deletion; the
    /// first error, in dispatch order, is returned alongside them.
    async fn delete_children(
        &self,
        children: &[(ResourceKind, RecordId)],
        token: &BearerToken,
    ) -> (RecordCounts, Option<ClientError>) {
        let outcomes = join_all(children.iter().map(|(child, id)| async move {
            (*child, self.client.delete(*child, *id, token).await)
        }))
        .await;

        let mut counts = RecordCounts::default();
        let mut error = None;
        for (child, outcome) in outcomes {
            match outcome {
                Ok(()) => counts.add(child, 1),
                Err(err) if error.is_none() => error = Some(err),
                Err(err) => tracing::warn!(%child, "further related delete failed: {err}"),
            }
        }
        (counts, error)
    }
}

fn check_preconditions(id: RecordId, token: &BearerToken) -> RelationsResult<()> {
    if token.is_blank() {
        return Err(RelationsError::MissingCredential);
    }
    validate_id(id)
}

fn child_id(relation: &Relation, record: &Record) -> Result<RecordId, ClientError> {
    record.id().ok_or_else(|| {
        ClientError::InvalidRecord(format!("{} record without an id", relation.child))
    })
}

/// Builds the error for a cascade which failed in `phase`.
///
/// It is a partial failure if some related records were already deleted.
fn fail(result: &CascadeResult, phase: CascadePhase, source: ClientError) -> RelationsError {
    tracing::warn!(
        kind = %result.kind,
        id = result.id,
        %phase,
        deleted = %result.deleted_counts,
        "cascade delete failed: {source}"
    );
    if result.deleted_counts.is_empty() {
        RelationsError::Cascade {
            kind: result.kind,
            id: result.id,
            phase,
            source,
        }
    } else {
        RelationsError::PartialCascade {
            kind: result.kind,
            id: result.id,
            phase,
            deleted: result.clone(),
            source,
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
