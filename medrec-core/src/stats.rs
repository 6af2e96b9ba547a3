//! Dashboard statistics computed from the five collections.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike as _, NaiveDate, NaiveDateTime, Utc};
use medrec_api::prelude::{Record, ResourceKind};
use medrec_client::prelude::Client;
use serde::Serialize;
use serde_json::Value;

use crate::error::RelationsResult;

/// Field holding the date of an appointment.
const APPOINTMENT_DATE_FIELD: &str = "appointment_date";
/// Digit strings longer than this are unix timestamps rather than compact dates.
const TIMESTAMP_MIN_DIGITS: usize = 6;
const DEFAULT_SPECIALISATION: &str = "General";
const DEFAULT_CONDITION: &str = "Other";

/// Totals shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub patients: usize,
    pub doctors: usize,
    pub appointments: usize,
    pub prescriptions: usize,
    pub diagnoses: usize,
}

/// A snapshot of every collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    collections: BTreeMap<ResourceKind, Vec<Record>>,
}

impl Statistics {
    /// Fetches the five collections concurrently. If any fetch fails, the whole operation fails.
    pub async fn collect(client: &impl Client) -> RelationsResult<Self> {
        let (doctors, patients, appointments, diagnoses, prescriptions) = futures::try_join!(
            client.list(ResourceKind::Doctors),
            client.list(ResourceKind::Patients),
            client.list(ResourceKind::Appointments),
            client.list(ResourceKind::Diagnoses),
            client.list(ResourceKind::Prescriptions),
        )?;

        Ok(Self::from_collections([
            (ResourceKind::Doctors, doctors),
            (ResourceKind::Patients, patients),
            (ResourceKind::Appointments, appointments),
            (ResourceKind::Diagnoses, diagnoses),
            (ResourceKind::Prescriptions, prescriptions),
        ]))
    }

    pub fn from_collections(
        collections: impl IntoIterator<Item = (ResourceKind, Vec<Record>)>,
    ) -> Self {
        Self {
            collections: collections.into_iter().collect(),
        }
    }

    pub fn records(&self, kind: ResourceKind) -> &[Record] {
        self.collections
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn overview(&self) -> Overview {
        Overview {
            patients: self.records(ResourceKind::Patients).len(),
            doctors: self.records(ResourceKind::Doctors).len(),
            appointments: self.records(ResourceKind::Appointments).len(),
            prescriptions: self.records(ResourceKind::Prescriptions).len(),
            diagnoses: self.records(ResourceKind::Diagnoses).len(),
        }
    }

    /// Number of doctors per specialisation, sorted by name.
    pub fn specialisations(&self) -> Vec<(String, usize)> {
        count_by(
            self.records(ResourceKind::Doctors),
            "specialisation",
            DEFAULT_SPECIALISATION,
        )
        .into_iter()
        .collect()
    }

    /// The `limit` most frequent conditions, by count then name.
    pub fn top_diagnoses(&self, limit: usize) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = count_by(
            self.records(ResourceKind::Diagnoses),
            "condition",
            DEFAULT_CONDITION,
        )
        .into_iter()
        .collect();
        // stable: ties keep the name order
        counts.sort_by(|(_, a), (_, b)| b.cmp(a));
        counts.truncate(limit);
        counts
    }

    /// Appointments falling on the given UTC day.
    pub fn appointments_on(&self, date: NaiveDate) -> Vec<&Record> {
        self.records(ResourceKind::Appointments)
            .iter()
            .filter(|appointment| appointment_day(appointment) == Some(date))
            .collect()
    }

    /// Days with at least one appointment, in order.
    pub fn appointment_dates(&self) -> Vec<NaiveDate> {
        self.records(ResourceKind::Appointments)
            .iter()
            .filter_map(appointment_day)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Appointments per `(year, month)` for the last `last_n` months with any appointment,
    /// oldest first.
    pub fn appointments_by_month(&self, last_n: usize) -> Vec<(i32, u32, usize)> {
        let mut months: BTreeMap<(i32, u32), usize> = BTreeMap::new();
        for day in self
            .records(ResourceKind::Appointments)
            .iter()
            .filter_map(appointment_day)
        {
            *months.entry((day.year(), day.month())).or_default() += 1;
        }

        let skip = months.len().saturating_sub(last_n);
        months
            .into_iter()
            .skip(skip)
            .map(|((year, month), count)| (year, month, count))
            .collect()
    }
}

/// Returns the UTC day of an appointment.
///
/// The date is either a unix timestamp in seconds, as a number or a digit string, or a
/// string in RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` (taken as UTC) or `YYYY-MM-DD` format.
/// Returns `None` when the date is missing or can't be parsed.
pub fn appointment_day(appointment: &Record) -> Option<NaiveDate> {
    match appointment.get(APPOINTMENT_DATE_FIELD)? {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|secs| secs.trunc() as i64))
            .and_then(day_of_timestamp),
        Value::String(text) => parse_day(text.trim()),
        _ => None,
    }
}

fn parse_day(text: &str) -> Option<NaiveDate> {
    if text.len() > TIMESTAMP_MIN_DIGITS && text.bytes().all(|b| b.is_ascii_digit()) {
        return text.parse().ok().and_then(day_of_timestamp);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Some(datetime.with_timezone(&Utc).date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|datetime| datetime.date())
        .or_else(|| NaiveDate::parse_from_str(text, "%Y-%m-%d").ok())
}

fn day_of_timestamp(secs: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(secs, 0).map(|datetime| datetime.date_naive())
}

/// Counts the records per value of `field`; blank or missing values count as `fallback`.
fn count_by(records: &[Record], field: &str, fallback: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        let label = record
            .get_str(field)
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .unwrap_or(fallback);
        *counts.entry(label.to_string()).or_default() += 1;
    }
    counts
}

#[cfg(test)]
mod tests {

    use medrec_client::prelude::ClientError;
    use serde_json::json;

    use super::*;
    use crate::error::RelationsError;
    use crate::tests::fixtures_client;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn appointment(date: Value) -> Record {
        Record::new().with("id", 1).with(APPOINTMENT_DATE_FIELD, date)
    }

    #[tokio::test]
    async fn test_should_collect_overview() {
        let client = fixtures_client();
        let stats = Statistics::collect(&client).await.unwrap();

        assert_eq!(
            stats.overview(),
            Overview {
                patients: 3,
                doctors: 3,
                appointments: 3,
                prescriptions: 3,
                diagnoses: 3,
            }
        );
    }

    #[tokio::test]
    async fn test_should_fail_collect_if_any_list_fails() {
        let client = fixtures_client();
        client.fail_list(ResourceKind::Diagnoses);

        let err = Statistics::collect(&client).await.unwrap_err();
        assert!(matches!(
            err,
            RelationsError::Client(ClientError::Server { .. })
        ));
    }

    #[tokio::test]
    async fn test_should_count_specialisations() {
        let stats = Statistics::collect(&fixtures_client()).await.unwrap();
        assert_eq!(
            stats.specialisations(),
            vec![
                ("Cardiology".to_string(), 1),
                ("Dermatology".to_string(), 1),
                ("General".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_should_rank_top_diagnoses() {
        let diagnoses = serde_json::from_value(json!([
            {"id": 1, "condition": "Flu"},
            {"id": 2, "condition": "Asthma"},
            {"id": 3, "condition": "Flu"},
            {"id": 4},
            {"id": 5, "condition": "  "},
            {"id": 6, "condition": "Migraine"}
        ]))
        .unwrap();
        let stats = Statistics::from_collections([(ResourceKind::Diagnoses, diagnoses)]);

        assert_eq!(
            stats.top_diagnoses(3),
            vec![
                ("Flu".to_string(), 2),
                ("Other".to_string(), 2),
                ("Asthma".to_string(), 1),
            ]
        );
        assert!(stats.top_diagnoses(0).is_empty());
    }

    #[tokio::test]
    async fn test_should_group_appointments_by_day() {
        let stats = Statistics::collect(&fixtures_client()).await.unwrap();

        let ids: Vec<_> = stats
            .appointments_on(date(2025, 1, 15))
            .into_iter()
            .filter_map(Record::id)
            .collect();
        assert_eq!(ids, vec![2]);
        assert_eq!(
            stats.appointment_dates(),
            vec![date(2025, 1, 1), date(2025, 1, 15), date(2025, 2, 3)]
        );
        assert!(stats.appointments_on(date(2025, 3, 1)).is_empty());
    }

    #[tokio::test]
    async fn test_should_count_appointments_by_month() {
        let stats = Statistics::collect(&fixtures_client()).await.unwrap();

        assert_eq!(
            stats.appointments_by_month(6),
            vec![(2025, 1, 2), (2025, 2, 1)]
        );
        assert_eq!(stats.appointments_by_month(1), vec![(2025, 2, 1)]);
    }

    #[test]
    fn test_should_parse_appointment_dates() {
        assert_eq!(
            appointment_day(&appointment(json!(1735725600))),
            Some(date(2025, 1, 1))
        );
        assert_eq!(
            appointment_day(&appointment(json!("1735725600"))),
            Some(date(2025, 1, 1))
        );
        assert_eq!(
            appointment_day(&appointment(json!("2025-01-01T23:30:00-02:00"))),
            Some(date(2025, 1, 2))
        );
        assert_eq!(
            appointment_day(&appointment(json!("2025-03-04T10:15"))),
            Some(date(2025, 3, 4))
        );
        assert_eq!(
            appointment_day(&appointment(json!("2025-03-04"))),
            Some(date(2025, 3, 4))
        );
        assert_eq!(appointment_day(&appointment(json!("tomorrow"))), None);
        assert_eq!(appointment_day(&appointment(json!(null))), None);
        assert_eq!(appointment_day(&Record::new()), None);
    }
}
