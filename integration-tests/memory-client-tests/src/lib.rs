use medrec_api::prelude::{BearerToken, Record, RecordId, ResourceKind};
use medrec_client::prelude::{Client as _, MemoryClient};
use serde_json::{Value, json};

/// A clinic seeded through the client API, as the admin front end would.
pub struct TestEnv {
    pub client: MemoryClient,
    pub admin: BearerToken,
    /// Dr. House: appointments with Alice and Bob, one prescription for Alice.
    pub house: RecordId,
    /// Dr. Wilson: one appointment with Alice.
    pub wilson: RecordId,
    pub alice: RecordId,
    pub bob: RecordId,
    /// Carol has nothing recorded.
    pub carol: RecordId,
    /// Alice's diagnosis, referenced by House's prescription.
    pub migraine: RecordId,
}

impl TestEnv {
    pub async fn new() -> Self {
        let client = MemoryClient::new();
        let admin = BearerToken::new("admin-token");

        let house = insert(
            &client,
            &admin,
            ResourceKind::Doctors,
            json!({"first_name": "Gregory", "last_name": "House", "specialisation": "Diagnostics"}),
        )
        .await;
        let wilson = insert(
            &client,
            &admin,
            ResourceKind::Doctors,
            json!({"first_name": "James", "last_name": "Wilson", "specialisation": "Oncology"}),
        )
        .await;
        let alice = insert(
            &client,
            &admin,
            ResourceKind::Patients,
            json!({"first_name": "Alice", "last_name": "Murphy", "email": "alice@example.com"}),
        )
        .await;
        let bob = insert(
            &client,
            &admin,
            ResourceKind::Patients,
            json!({"first_name": "Bob", "last_name": "Quinn", "email": "bob@example.com"}),
        )
        .await;
        let carol = insert(
            &client,
            &admin,
            ResourceKind::Patients,
            json!({"first_name": "Carol", "last_name": "Hayes", "email": "carol@example.com"}),
        )
        .await;

        for (doctor, patient, date) in [
            (json!(house), json!(alice), json!("2025-03-10T09:00:00Z")),
            (json!(house.to_string()), json!(bob), json!(1741860000)),
            (json!(wilson), json!(alice.to_string()), json!("2025-04-01")),
        ] {
            insert(
                &client,
                &admin,
                ResourceKind::Appointments,
                json!({"doctor_id": doctor, "patient_id": patient, "appointment_date": date}),
            )
            .await;
        }

        let migraine = insert(
            &client,
            &admin,
            ResourceKind::Diagnoses,
            json!({"patient_id": alice, "condition": "Migraine"}),
        )
        .await;
        insert(
            &client,
            &admin,
            ResourceKind::Prescriptions,
            json!({
                "doctor_id": house,
                "patient_id": alice,
                "diagnosis_id": migraine,
                "medication": "Sumatriptan"
            }),
        )
        .await;

        client.clear_calls();
        Self {
            client,
            admin,
            house,
            wilson,
            alice,
            bob,
            carol,
            migraine,
        }
    }

    /// Number of records left in a collection.
    pub fn count(&self, kind: ResourceKind) -> usize {
        self.client.records(kind).len()
    }
}

async fn insert(
    client: &MemoryClient,
    token: &BearerToken,
    kind: ResourceKind,
    data: Value,
) -> RecordId {
    let data = Record::try_from(data).expect("fixture must be an object");
    client
        .create(kind, data, token)
        .await
        .expect("failed to insert fixture")
        .id()
        .expect("created record must have an id")
}
