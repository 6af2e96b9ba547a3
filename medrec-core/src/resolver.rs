//! This module exposes the [`RelatedRecordsResolver`], which finds the records referencing
//! a given root record and deletes them when the root is deleted.

mod cascade;

use medrec_api::prelude::{Record, RecordId, Relation, ResourceKind};
use medrec_client::prelude::{Client, ClientResult};

pub use self::cascade::{CascadePhase, CascadeResult, RecordCounts};
use crate::error::{RelationsError, RelationsResult};

/// Resolves the records related to a root record through the foreign keys of the remote API.
///
/// The resolver holds no state besides the client: every call re-fetches the collections it
/// needs, since the remote API is the source of truth.
///
/// - [`RelatedRecordsResolver::find_related`] - Records of a collection referencing the root.
/// - [`RelatedRecordsResolver::cascade_delete`] - Delete the root and every dependent record.
/// - [`RelatedRecordsResolver::delete`] - Delete the root with the given
///   [`medrec_api::prelude::DeleteBehavior`].
#[derive(Debug)]
pub struct RelatedRecordsResolver<'a, C>
where
    C: Client,
{
    client: &'a C,
}

impl<C> Clone for RelatedRecordsResolver<'_, C>
where
    C: Client,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for RelatedRecordsResolver<'_, C> where C: Client {}

impl<'a, C> RelatedRecordsResolver<'a, C>
where
    C: Client,
{
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Returns the underlying client.
    pub fn client(&self) -> &'a C {
        self.client
    }

    /// Returns the records of `relation.child` whose `relation.foreign_key` holds `id`,
    /// in the order the API returned them.
    ///
    /// `relation` may be any relation pointing at `kind`, whether or not it takes part in a
    /// cascade delete (e.g. the prescriptions referencing a diagnosis).
    ///
    /// Foreign keys are compared by numeric value, so a key stored as `"7"` matches `7`.
    pub async fn find_related(
        &self,
        kind: ResourceKind,
        id: RecordId,
        relation: Relation,
    ) -> RelationsResult<Vec<Record>> {
        validate_id(id)?;
        if relation.parent() != kind {
            return Err(RelationsError::InvalidRelation { kind, relation });
        }

        Ok(self.fetch_related(id, relation).await?)
    }

    /// Fetches the whole child collection and keeps the records referencing `id`.
    async fn fetch_related(&self, id: RecordId, relation: Relation) -> ClientResult<Vec<Record>> {
        let records = self.client.list(relation.child).await?;
        let total = records.len();
        let related: Vec<Record> = records
            .into_iter()
            .filter(|record| record.references(relation.foreign_key, id))
            .collect();
        tracing::debug!(
            %relation,
            id,
            total,
            matched = related.len(),
            "filtered related records"
        );

        Ok(related)
    }
}

/// Record ids are positive integers.
fn validate_id(id: RecordId) -> RelationsResult<()> {
    if id == 0 {
        Err(RelationsError::InvalidId(id))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {

    use medrec_api::prelude::ForeignKey;
    use medrec_client::prelude::{ClientCall, ClientError, MemoryClient};

    use super::*;
    use crate::tests::fixtures_client;

    #[tokio::test]
    async fn test_should_find_related_records_in_order() {
        let client = fixtures_client();
        let resolver = RelatedRecordsResolver::new(&client);

        let appointments = resolver
            .find_related(
                ResourceKind::Doctors,
                1,
                Relation::new(ResourceKind::Appointments, ForeignKey::DoctorId),
            )
            .await
            .expect("should find appointments");

        let ids: Vec<_> = appointments.iter().filter_map(Record::id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_should_match_numeric_string_foreign_keys() {
        let client = MemoryClient::from_json(serde_json::json!({
            "prescriptions": [
                {"id": 1, "doctor_id": "4"},
                {"id": 2, "doctor_id": 4},
                {"id": 3, "doctor_id": "44"},
                {"id": 4, "doctor_id": null},
                {"id": 5}
            ]
        }))
        .unwrap();
        let resolver = RelatedRecordsResolver::new(&client);

        let prescriptions = resolver
            .find_related(
                ResourceKind::Doctors,
                4,
                Relation::new(ResourceKind::Prescriptions, ForeignKey::DoctorId),
            )
            .await
            .unwrap();
        let ids: Vec<_> = prescriptions.iter().filter_map(Record::id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_should_return_empty_when_nothing_matches() {
        let client = fixtures_client();
        let resolver = RelatedRecordsResolver::new(&client);

        let diagnoses = resolver
            .find_related(
                ResourceKind::Patients,
                999,
                Relation::new(ResourceKind::Diagnoses, ForeignKey::PatientId),
            )
            .await
            .unwrap();
        assert!(diagnoses.is_empty());
    }

    #[tokio::test]
    async fn test_should_accept_display_only_relation() {
        let client = fixtures_client();
        let resolver = RelatedRecordsResolver::new(&client);

        let prescriptions = resolver
            .find_related(
                ResourceKind::Diagnoses,
                1,
                Relation::new(ResourceKind::Prescriptions, ForeignKey::DiagnosisId),
            )
            .await
            .unwrap();
        assert_eq!(prescriptions.len(), 1);
    }

    #[tokio::test]
    async fn test_should_reject_relation_to_another_kind() {
        let client = fixtures_client();
        let resolver = RelatedRecordsResolver::new(&client);

        let result = resolver
            .find_related(
                ResourceKind::Doctors,
                1,
                Relation::new(ResourceKind::Appointments, ForeignKey::PatientId),
            )
            .await;
        assert!(matches!(
            result,
            Err(RelationsError::InvalidRelation {
                kind: ResourceKind::Doctors,
                ..
            })
        ));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_should_reject_zero_id() {
        let client = fixtures_client();
        let resolver = RelatedRecordsResolver::new(&client);

        let result = resolver
            .find_related(
                ResourceKind::Doctors,
                0,
                Relation::new(ResourceKind::Appointments, ForeignKey::DoctorId),
            )
            .await;
        assert!(matches!(result, Err(RelationsError::InvalidId(0))));
    }

    #[tokio::test]
    async fn test_should_propagate_fetch_failure() {
        let client = fixtures_client();
        client.fail_list(ResourceKind::Appointments);
        let resolver = RelatedRecordsResolver::new(&client);

        let result = resolver
            .find_related(
                ResourceKind::Patients,
                1,
                Relation::new(ResourceKind::Appointments, ForeignKey::PatientId),
            )
            .await;
        assert!(matches!(
            result,
            Err(RelationsError::Client(ClientError::Server { status: 503, .. }))
        ));
        assert_eq!(
            client.calls(),
            vec![ClientCall::List(ResourceKind::Appointments)]
        );
    }
}
