use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::relation::ForeignKey;

/// Identifier of a record, unique within its [`crate::prelude::ResourceKind`].
pub type RecordId = u64;

/// A record fetched from the remote API.
///
/// Records are opaque JSON objects; only the `id` and the foreign-key fields
/// have a meaning for the relational layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record id, coerced the same way as foreign keys.
    pub fn id(&self) -> Option<RecordId> {
        self.0.get("id").and_then(coerce_id)
    }

    /// Returns the value of the given foreign key.
    ///
    /// The API returns keys either as JSON numbers or as numeric strings; both are accepted.
    /// Absent, `null`, negative, fractional and non-numeric values yield `None`.
    pub fn foreign_key(&self, fk: ForeignKey) -> Option<RecordId> {
        self.0.get(fk.column()).and_then(coerce_id)
    }

    /// Returns whether `fk` holds `id`, comparing numeric values after coercion.
    pub fn references(&self, fk: ForeignKey, id: RecordId) -> bool {
        self.foreign_key(fk) == Some(id)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns the field as a string slice, if it is a JSON string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Sets a field, returning the record for chaining.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    /// Iterates over the record fields.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Merges `patch` into this record, overwriting existing fields.
    pub fn merge(&mut self, patch: Record) {
        self.0.extend(patch.0);
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Record {
    type Error = ApiError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(ApiError::NotAnObject),
        }
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Object(record.0)
    }
}

/// Coerces a JSON number or numeric string to a [`RecordId`].
fn coerce_id(value: &Value) -> Option<RecordId> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().and_then(integral_f64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<RecordId>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral_f64))
        }
        _ => None,
    }
}

fn integral_f64(value: f64) -> Option<RecordId> {
    (value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64)
        .then_some(value as RecordId)
}

#[cfg(test)]
mod tests {

    use serde_json::json;

    use super::*;

    fn record(value: Value) -> Record {
        Record::try_from(value).expect("should be an object")
    }

    #[test]
    fn test_should_coerce_numeric_foreign_keys() {
        assert_eq!(
            record(json!({"doctor_id": 7})).foreign_key(ForeignKey::DoctorId),
            Some(7)
        );
        assert_eq!(
            record(json!({"doctor_id": "7"})).foreign_key(ForeignKey::DoctorId),
            Some(7)
        );
        assert_eq!(
            record(json!({"doctor_id": " 7 "})).foreign_key(ForeignKey::DoctorId),
            Some(7)
        );
        assert_eq!(
            record(json!({"doctor_id": 7.0})).foreign_key(ForeignKey::DoctorId),
            Some(7)
        );
    }

    #[test]
    fn test_should_reject_non_numeric_foreign_keys() {
        for value in [
            json!("7a"),
            json!(-7),
            json!(7.5),
            json!(null),
            json!(""),
            json!(true),
            json!([7]),
        ] {
            let record = record(json!({ "patient_id": value }));
            assert_eq!(record.foreign_key(ForeignKey::PatientId), None);
        }
        assert_eq!(record(json!({})).foreign_key(ForeignKey::PatientId), None);
    }

    #[test]
    fn test_should_compare_references_numerically() {
        let by_number = record(json!({"id": 1, "patient_id": 12}));
        let by_string = record(json!({"id": "2", "patient_id": "12"}));
        assert!(by_number.references(ForeignKey::PatientId, 12));
        assert!(by_string.references(ForeignKey::PatientId, 12));
        assert!(!by_string.references(ForeignKey::PatientId, 1));
        assert!(!by_string.references(ForeignKey::DoctorId, 12));
        assert_eq!(by_string.id(), Some(2));
    }

    #[test]
    fn test_should_reject_non_object_values() {
        assert_eq!(Record::try_from(json!([1, 2])), Err(ApiError::NotAnObject));
    }

    #[test]
    fn test_should_merge_records() {
        let mut base = Record::new().with("id", 1).with("city", "Dublin");
        base.merge(Record::new().with("city", "Cork").with("email", "a@b.ie"));
        assert_eq!(base.get_str("city"), Some("Cork"));
        assert_eq!(base.get_str("email"), Some("a@b.ie"));
        assert_eq!(base.id(), Some(1));
    }
}
