//! In-memory implementation of [`Client`], standing in for the remote API in tests and demos.
//!
//! Every call is recorded in a call log, and failures can be injected per record
//! ([`MemoryClient::fail_delete`]) or per collection ([`MemoryClient::fail_list`]).

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use medrec_api::prelude::{BearerToken, Record, RecordId, ResourceKind};
use serde_json::Value;

use crate::client::Client;
use crate::errors::{ClientError, ClientResult};

/// Status reported by injected failures.
const SIMULATED_FAILURE_STATUS: u16 = 503;

/// A call received by the [`MemoryClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCall {
    List(ResourceKind),
    Get(ResourceKind, RecordId),
    Create(ResourceKind),
    Update(ResourceKind, RecordId),
    Delete(ResourceKind, RecordId),
}

#[derive(Debug, Default)]
struct State {
    collections: BTreeMap<ResourceKind, Vec<Record>>,
    calls: Vec<ClientCall>,
    failing_deletes: HashSet<(ResourceKind, RecordId)>,
    failing_lists: HashSet<ResourceKind>,
}

impl State {
    fn collection(&self, kind: ResourceKind) -> &[Record] {
        self.collections.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    fn position(&self, kind: ResourceKind, id: RecordId) -> Option<usize> {
        self.collection(kind)
            .iter()
            .position(|record| record.id() == Some(id))
    }

    fn next_id(&self, kind: ResourceKind) -> RecordId {
        self.collection(kind)
            .iter()
            .filter_map(Record::id)
            .max()
            .unwrap_or(0)
            + 1
    }
}

/// [`Client`] which keeps the collections in memory.
#[derive(Debug, Default)]
pub struct MemoryClient {
    state: Mutex<State>,
}

impl MemoryClient {
    /// Creates an empty client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the client from a JSON object keyed by collection name, e.g.
    /// `{"doctors": [{"id": 1}], "appointments": []}`.
    pub fn from_json(fixtures: Value) -> ClientResult<Self> {
        let Value::Object(collections) = fixtures else {
            return Err(ClientError::InvalidRecord(
                "fixtures must be an object keyed by collection".to_string(),
            ));
        };

        let client = Self::new();
        for (name, records) in collections {
            let kind = name.parse::<ResourceKind>()?;
            let records: Vec<Record> = serde_json::from_value(records)?;
            client.extend(kind, records);
        }
        Ok(client)
    }

    /// Adds the given records to a collection.
    pub fn extend(&self, kind: ResourceKind, records: impl IntoIterator<Item = Record>) {
        self.lock()
            .collections
            .entry(kind)
            .or_default()
            .extend(records);
    }

    /// Returns a snapshot of the given collection, without recording a call.
    pub fn records(&self, kind: ResourceKind) -> Vec<Record> {
        self.lock().collection(kind).to_vec()
    }

    /// Returns whether the given record exists, without recording a call.
    pub fn contains(&self, kind: ResourceKind, id: RecordId) -> bool {
        self.lock().position(kind, id).is_some()
    }

    /// Returns the calls received so far, in order.
    pub fn calls(&self) -> Vec<ClientCall> {
        self.lock().calls.clone()
    }

    /// Returns how many calls matched the given predicate.
    pub fn count_calls(&self, predicate: impl Fn(&ClientCall) -> bool) -> usize {
        self.lock().calls.iter().filter(|call| predicate(call)).count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Makes every delete of the given record fail with a simulated server error.
    pub fn fail_delete(&self, kind: ResourceKind, id: RecordId) {
        self.lock().failing_deletes.insert((kind, id));
    }

    /// Makes every list of the given collection fail with a simulated server error.
    pub fn fail_list(&self, kind: ResourceKind) {
        self.lock().failing_lists.insert(kind);
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn simulated_failure(call: ClientCall) -> ClientError {
        ClientError::Server {
            status: SIMULATED_FAILURE_STATUS,
            message: format!("simulated failure on {call:?}"),
        }
    }
}

impl Client for MemoryClient {
    async fn list(&self, kind: ResourceKind) -> ClientResult<Vec<Record>> {
        let mut state = self.lock();
        let call = ClientCall::List(kind);
        state.calls.push(call);
        if state.failing_lists.contains(&kind) {
            return Err(Self::simulated_failure(call));
        }
        Ok(state.collection(kind).to_vec())
    }

    async fn get(&self, kind: ResourceKind, id: RecordId) -> ClientResult<Record> {
        let mut state = self.lock();
        state.calls.push(ClientCall::Get(kind, id));
        state
            .position(kind, id)
            .map(|index| state.collection(kind)[index].clone())
            .ok_or(ClientError::NotFound { kind, id })
    }

    async fn create(
        &self,
        kind: ResourceKind,
        mut data: Record,
        token: &BearerToken,
    ) -> ClientResult<Record> {
        token.usable()?;
        let mut state = self.lock();
        state.calls.push(ClientCall::Create(kind));
        let id = state.next_id(kind);
        data.insert("id", id);
        state.collections.entry(kind).or_default().push(data.clone());
        Ok(data)
    }

    async fn update(
        &self,
        kind: ResourceKind,
        id: RecordId,
        mut data: Record,
        token: &BearerToken,
    ) -> ClientResult<Record> {
        token.usable()?;
        let mut state = self.lock();
        state.calls.push(ClientCall::Update(kind, id));
        let index = state
            .position(kind, id)
            .ok_or(ClientError::NotFound { kind, id })?;
        // the id is not updatable
        data.insert("id", id);
        let record = &mut state.collections.entry(kind).or_default()[index];
        record.merge(data);
        Ok(record.clone())
    }

    async fn delete(
        &self,
        kind: ResourceKind,
        id: RecordId,
        token: &BearerToken,
    ) -> ClientResult<()> {
        token.usable()?;
        let mut state = self.lock();
        let call = ClientCall::Delete(kind, id);
        state.calls.push(call);
        if state.failing_deletes.contains(&(kind, id)) {
            return Err(Self::simulated_failure(call));
        }
        let index = state
            .position(kind, id)
            .ok_or(ClientError::NotFound { kind, id })?;
        state.collections.entry(kind).or_default().remove(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {

    use serde_json::json;

    use super::*;

    fn token() -> BearerToken {
        BearerToken::new("test-token")
    }

    fn client() -> MemoryClient {
        MemoryClient::from_json(json!({
            "doctors": [
                {"id": 1, "first_name": "Aoife", "specialisation": "Cardiology"},
                {"id": 2, "first_name": "Brian"}
            ],
            "appointments": [{"id": 1, "doctor_id": 1, "patient_id": "3"}]
        }))
        .expect("valid fixtures")
    }

    #[tokio::test]
    async fn test_should_list_and_get_records() {
        let client = client();
        let doctors = client.list(ResourceKind::Doctors).await.unwrap();
        assert_eq!(doctors.len(), 2);
        assert!(client.list(ResourceKind::Patients).await.unwrap().is_empty());

        let doctor = client.get(ResourceKind::Doctors, 2).await.unwrap();
        assert_eq!(doctor.get_str("first_name"), Some("Brian"));

        let err = client.get(ResourceKind::Doctors, 9).await.unwrap_err();
        assert!(err.is_not_found());

        assert_eq!(
            client.calls(),
            vec![
                ClientCall::List(ResourceKind::Doctors),
                ClientCall::List(ResourceKind::Patients),
                ClientCall::Get(ResourceKind::Doctors, 2),
                ClientCall::Get(ResourceKind::Doctors, 9),
            ]
        );
    }

    #[tokio::test]
    async fn test_should_create_with_next_id() {
        let client = client();
        let created = client
            .create(
                ResourceKind::Doctors,
                Record::new().with("first_name", "Ciara"),
                &token(),
            )
            .await
            .unwrap();
        assert_eq!(created.id(), Some(3));
        assert!(client.contains(ResourceKind::Doctors, 3));
    }

    #[tokio::test]
    async fn test_should_update_record() {
        let client = client();
        let updated = client
            .update(
                ResourceKind::Doctors,
                1,
                Record::new().with("specialisation", "Oncology").with("id", 99),
                &token(),
            )
            .await
            .unwrap();
        assert_eq!(updated.id(), Some(1));
        assert_eq!(updated.get_str("specialisation"), Some("Oncology"));
        assert_eq!(updated.get_str("first_name"), Some("Aoife"));
    }

    #[tokio::test]
    async fn test_should_delete_record() {
        let client = client();
        client
            .delete(ResourceKind::Appointments, 1, &token())
            .await
            .unwrap();
        assert!(!client.contains(ResourceKind::Appointments, 1));

        let err = client
            .delete(ResourceKind::Appointments, 1, &token())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_should_require_token_on_mutations() {
        let client = client();
        let blank = BearerToken::new("");
        assert!(matches!(
            client.delete(ResourceKind::Doctors, 1, &blank).await,
            Err(ClientError::MissingCredential)
        ));
        assert!(matches!(
            client
                .create(ResourceKind::Doctors, Record::new(), &blank)
                .await,
            Err(ClientError::MissingCredential)
        ));
        assert!(client.calls().is_empty());
        assert!(client.contains(ResourceKind::Doctors, 1));
    }

    #[tokio::test]
    async fn test_should_inject_failures() {
        let client = client();
        client.fail_delete(ResourceKind::Doctors, 1);
        client.fail_list(ResourceKind::Appointments);

        let err = client
            .delete(ResourceKind::Doctors, 1, &token())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Server { status: 503, .. }));
        assert!(client.contains(ResourceKind::Doctors, 1));

        assert!(client.list(ResourceKind::Appointments).await.is_err());
    }

    #[test]
    fn test_should_reject_invalid_fixtures() {
        assert!(MemoryClient::from_json(json!([])).is_err());
        assert!(MemoryClient::from_json(json!({"nurses": []})).is_err());
        assert!(MemoryClient::from_json(json!({"doctors": [1, 2]})).is_err());
    }
}
