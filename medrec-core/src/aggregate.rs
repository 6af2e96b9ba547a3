//! Detail views gathering a record together with the records around it.

use std::collections::{BTreeMap, BTreeSet};

use futures::future::try_join_all;
use medrec_api::prelude::{ForeignKey, Record, RecordId, Relation, ResourceKind};
use medrec_client::prelude::{Client, ClientError};

use crate::error::RelationsResult;
use crate::resolver::RelatedRecordsResolver;

/// A patient with everything recorded about it.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientRecords {
    pub patient: Record,
    pub appointments: Vec<Record>,
    pub prescriptions: Vec<Record>,
    pub diagnoses: Vec<Record>,
    /// Doctors seen in the patient's appointments, by id.
    pub doctors: BTreeMap<RecordId, Record>,
}

/// A doctor with the prescriptions it issued.
#[derive(Debug, Clone, PartialEq)]
pub struct DoctorPrescriptions {
    pub doctor: Record,
    pub prescriptions: Vec<Record>,
    /// Patients the prescriptions were issued to, by id.
    pub patients: BTreeMap<RecordId, Record>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentDetails {
    pub appointment: Record,
    pub doctor: Record,
    pub patient: Record,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrescriptionDetails {
    pub prescription: Record,
    pub doctor: Record,
    pub patient: Record,
    /// `None` when the prescription isn't linked to a diagnosis.
    pub diagnosis: Option<Record>,
}

impl<C> RelatedRecordsResolver<'_, C>
where
    C: Client,
{
    /// Fetches the patient, its appointments, prescriptions and diagnoses, then the doctors of
    /// its appointments.
    pub async fn patient_records(&self, id: RecordId) -> RelationsResult<PatientRecords> {
        let kind = ResourceKind::Patients;
        let (patient, appointments, prescriptions, diagnoses) = futures::try_join!(
            self.get(kind, id),
            self.find_related(
                kind,
                id,
                Relation::new(ResourceKind::Appointments, ForeignKey::PatientId)
            ),
            self.find_related(
                kind,
                id,
                Relation::new(ResourceKind::Prescriptions, ForeignKey::PatientId)
            ),
            self.find_related(
                kind,
                id,
                Relation::new(ResourceKind::Diagnoses, ForeignKey::PatientId)
            ),
        )?;
        let doctors = self
            .resolve_references(&appointments, ForeignKey::DoctorId)
            .await?;

        Ok(PatientRecords {
            patient,
            appointments,
            prescriptions,
            diagnoses,
            doctors,
        })
    }

    /// Fetches the doctor and its prescriptions, then the patients they were issued to.
    pub async fn doctor_prescriptions(&self, id: RecordId) -> RelationsResult<DoctorPrescriptions> {
        let kind = ResourceKind::Doctors;
        let (doctor, prescriptions) = futures::try_join!(
            self.get(kind, id),
            self.find_related(
                kind,
                id,
                Relation::new(ResourceKind::Prescriptions, ForeignKey::DoctorId)
            ),
        )?;
        let patients = self
            .resolve_references(&prescriptions, ForeignKey::PatientId)
            .await?;

        Ok(DoctorPrescriptions {
            doctor,
            prescriptions,
            patients,
        })
    }

    pub async fn appointment_details(&self, id: RecordId) -> RelationsResult<AppointmentDetails> {
        let appointment = self.get(ResourceKind::Appointments, id).await?;
        let (doctor, patient) = futures::try_join!(
            self.get_referenced(&appointment, ForeignKey::DoctorId),
            self.get_referenced(&appointment, ForeignKey::PatientId),
        )?;

        Ok(AppointmentDetails {
            appointment,
            doctor,
            patient,
        })
    }

    pub async fn prescription_details(
        &self,
        id: RecordId,
    ) -> RelationsResult<PrescriptionDetails> {
        let prescription = self.get(ResourceKind::Prescriptions, id).await?;
        let diagnosis = async {
            match prescription.foreign_key(ForeignKey::DiagnosisId) {
                Some(diagnosis_id) => self
                    .get(ResourceKind::Diagnoses, diagnosis_id)
                    .await
                    .map(Some),
                None => Ok(None),
            }
        };
        let (doctor, patient, diagnosis) = futures::try_join!(
            self.get_referenced(&prescription, ForeignKey::DoctorId),
            self.get_referenced(&prescription, ForeignKey::PatientId),
            diagnosis,
        )?;

        Ok(PrescriptionDetails {
            prescription,
            doctor,
            patient,
            diagnosis,
        })
    }

    /// Fetches the distinct records referenced through `fk` by the given records.
    ///
    /// Records without a usable key are skipped. The referenced records are fetched
    /// concurrently, in first-seen order; if any fetch fails, the whole operation fails.
    pub async fn resolve_references(
        &self,
        records: &[Record],
        fk: ForeignKey,
    ) -> RelationsResult<BTreeMap<RecordId, Record>> {
        let mut seen = BTreeSet::new();
        let ids: Vec<RecordId> = records
            .iter()
            .filter_map(|record| record.foreign_key(fk))
            .filter(|id| seen.insert(*id))
            .collect();

        let kind = fk.references();
        let referenced = try_join_all(ids.iter().map(|id| self.get(kind, *id))).await?;
        tracing::debug!(%kind, count = referenced.len(), "resolved references");

        Ok(ids.into_iter().zip(referenced).collect())
    }

    async fn get(&self, kind: ResourceKind, id: RecordId) -> RelationsResult<Record> {
        Ok(self.client().get(kind, id).await?)
    }

    /// Fetches the record `record` references through `fk`, which must be set.
    async fn get_referenced(&self, record: &Record, fk: ForeignKey) -> RelationsResult<Record> {
        let id = record.foreign_key(fk).ok_or_else(|| {
            ClientError::InvalidRecord(format!(
                "record #{} has no {}",
                record.id().unwrap_or_default(),
                fk.column()
            ))
        })?;
        self.get(fk.references(), id).await
    }
}

#[cfg(test)]
mod tests {

    use medrec_client::prelude::{ClientCall, MemoryClient};

    use super::*;
    use crate::error::RelationsError;
    use crate::tests::fixtures_client;

    fn ids(records: &[Record]) -> Vec<RecordId> {
        records.iter().filter_map(Record::id).collect()
    }

    #[tokio::test]
    async fn test_should_gather_patient_records() {
        let client = fixtures_client();
        let resolver = RelatedRecordsResolver::new(&client);

        let records = resolver.patient_records(1).await.unwrap();

        assert_eq!(records.patient.get_str("first_name"), Some("Dara"));
        assert_eq!(ids(&records.appointments), vec![1, 3]);
        assert_eq!(ids(&records.prescriptions), vec![1, 3]);
        assert_eq!(ids(&records.diagnoses), vec![1, 3]);
        assert_eq!(records.doctors.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_should_report_missing_patient() {
        let client = fixtures_client();
        let resolver = RelatedRecordsResolver::new(&client);

        let err = resolver.patient_records(999).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_should_gather_doctor_prescriptions() {
        let client = fixtures_client();
        let resolver = RelatedRecordsResolver::new(&client);

        let view = resolver.doctor_prescriptions(2).await.unwrap();

        assert_eq!(ids(&view.prescriptions), vec![2, 3]);
        assert_eq!(view.patients.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(view.patients[&2].get_str("first_name"), Some("Eimear"));
    }

    #[tokio::test]
    async fn test_should_fetch_each_reference_once() {
        let client = fixtures_client();
        let resolver = RelatedRecordsResolver::new(&client);
        let diagnoses = client.records(ResourceKind::Diagnoses);

        let patients = resolver
            .resolve_references(&diagnoses, ForeignKey::PatientId)
            .await
            .unwrap();

        assert_eq!(patients.len(), 2);
        assert_eq!(
            client.calls(),
            vec![
                ClientCall::Get(ResourceKind::Patients, 1),
                ClientCall::Get(ResourceKind::Patients, 2),
            ]
        );
    }

    #[tokio::test]
    async fn test_should_fail_when_a_reference_is_dangling() {
        let client = MemoryClient::from_json(serde_json::json!({
            "doctors": [{"id": 1}],
            "appointments": [
                {"id": 1, "doctor_id": 1},
                {"id": 2, "doctor_id": 8}
            ]
        }))
        .unwrap();
        let resolver = RelatedRecordsResolver::new(&client);
        let appointments = client.records(ResourceKind::Appointments);

        let err = resolver
            .resolve_references(&appointments, ForeignKey::DoctorId)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_should_gather_appointment_details() {
        let client = fixtures_client();
        let resolver = RelatedRecordsResolver::new(&client);

        let details = resolver.appointment_details(2).await.unwrap();

        assert_eq!(details.appointment.id(), Some(2));
        assert_eq!(details.doctor.get_str("last_name"), Some("Kelly"));
        assert_eq!(details.patient.get_str("last_name"), Some("Doyle"));
    }

    #[tokio::test]
    async fn test_should_gather_prescription_details() {
        let client = fixtures_client();
        let resolver = RelatedRecordsResolver::new(&client);

        let linked = resolver.prescription_details(1).await.unwrap();
        assert_eq!(
            linked.diagnosis.as_ref().and_then(|d| d.get_str("condition")),
            Some("Hypertension")
        );

        let unlinked = resolver.prescription_details(3).await.unwrap();
        assert_eq!(unlinked.doctor.id(), Some(2));
        assert!(unlinked.diagnosis.is_none());
    }

    #[tokio::test]
    async fn test_should_reject_record_without_reference() {
        let client = MemoryClient::from_json(serde_json::json!({
            "patients": [{"id": 1}],
            "appointments": [{"id": 4, "patient_id": 1}]
        }))
        .unwrap();
        let resolver = RelatedRecordsResolver::new(&client);

        let err = resolver.appointment_details(4).await.unwrap_err();
        assert!(matches!(
            err,
            RelationsError::Client(ClientError::InvalidRecord(_))
        ));
    }
}
