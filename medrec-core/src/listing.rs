//! Search and sorting of the records shown in a list page.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use medrec_api::prelude::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The field list pages sort by unless told otherwise.
pub const DEFAULT_SORT_FIELD: &str = "name";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Returns the opposite order, as toggled by clicking a column header twice.
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        })
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("invalid sort order: {other}")),
        }
    }
}

/// Search term and sorting of a list page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListView {
    pub search: String,
    pub sort_field: String,
    pub sort_order: SortOrder,
}

impl Default for ListView {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort_field: DEFAULT_SORT_FIELD.to_string(),
            sort_order: SortOrder::Asc,
        }
    }
}

impl ListView {
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn sorted_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_field = field.into();
        self.sort_order = order;
        self
    }

    /// Sorts by `field`, toggling the order if the view is already sorted by it.
    pub fn sort_by(&mut self, field: &str) {
        if self.sort_field == field {
            self.sort_order = self.sort_order.toggled();
        } else {
            self.sort_field = field.to_string();
            self.sort_order = SortOrder::Asc;
        }
    }

    /// Keeps the records matching the search term, sorted by the sort field.
    ///
    /// The search is a case-insensitive substring match on every string and number field.
    /// The sort is stable; records missing the sort field come last in either order.
    pub fn apply(&self, records: Vec<Record>) -> Vec<Record> {
        let needle = self.search.trim().to_lowercase();
        let mut records: Vec<Record> = records
            .into_iter()
            .filter(|record| needle.is_empty() || matches_search(record, &needle))
            .collect();

        records.sort_by(|a, b| {
            match (
                SortKey::of(a.get(&self.sort_field)),
                SortKey::of(b.get(&self.sort_field)),
            ) {
                (Some(a), Some(b)) => match self.sort_order {
                    SortOrder::Asc => a.compare(&b),
                    SortOrder::Desc => b.compare(&a),
                },
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        });
        records
    }
}

fn matches_search(record: &Record, needle: &str) -> bool {
    record.fields().any(|(_, value)| match value {
        Value::String(text) => text.to_lowercase().contains(needle),
        Value::Number(number) => number.to_string().contains(needle),
        _ => false,
    })
}

/// Sortable form of a field value: numbers (and numeric strings) sort before text.
#[derive(Debug, PartialEq)]
enum SortKey {
    Number(f64),
    Text(String),
}

impl SortKey {
    fn of(value: Option<&Value>) -> Option<Self> {
        match value? {
            Value::Number(number) => number.as_f64().map(SortKey::Number),
            Value::String(text) => Some(
                text.trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|number| number.is_finite())
                    .map(SortKey::Number)
                    .unwrap_or_else(|| SortKey::Text(text.to_lowercase())),
            ),
            Value::Bool(flag) => Some(SortKey::Number(f64::from(u8::from(*flag)))),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
        }
    }
}

#[cfg(test)]
mod tests {

    use serde_json::json;

    use super::*;

    fn records() -> Vec<Record> {
        serde_json::from_value(json!([
            {"id": 1, "name": "beta", "age": 40, "city": "Dublin"},
            {"id": 2, "name": "Alpha", "age": "9", "city": "Cork"},
            {"id": 3, "age": 100, "city": "Galway"},
            {"id": 4, "name": "gamma", "age": null, "city": "dublin"}
        ]))
        .unwrap()
    }

    fn ids(records: &[Record]) -> Vec<u64> {
        records.iter().filter_map(Record::id).collect()
    }

    #[test]
    fn test_should_sort_by_name_ascending_by_default() {
        let sorted = ListView::default().apply(records());
        assert_eq!(ids(&sorted), vec![2, 1, 4, 3]);
    }

    #[test]
    fn test_should_keep_missing_values_last_when_descending() {
        let view = ListView::default().sorted_by("name", SortOrder::Desc);
        assert_eq!(ids(&view.apply(records())), vec![4, 1, 2, 3]);
    }

    #[test]
    fn test_should_sort_numeric_strings_numerically() {
        let view = ListView::default().sorted_by("age", SortOrder::Asc);
        assert_eq!(ids(&view.apply(records())), vec![2, 1, 3, 4]);
    }

    #[test]
    fn test_should_search_case_insensitively() {
        let view = ListView::default().with_search("DUBLIN");
        assert_eq!(ids(&view.apply(records())), vec![1, 4]);

        let view = ListView::default().with_search("10");
        assert_eq!(ids(&view.apply(records())), vec![3]);
    }

    #[test]
    fn test_should_toggle_sort_order_on_same_field() {
        let mut view = ListView::default();
        view.sort_by("name");
        assert_eq!(view.sort_order, SortOrder::Desc);
        view.sort_by("city");
        assert_eq!(view.sort_field, "city");
        assert_eq!(view.sort_order, SortOrder::Asc);
    }

    #[test]
    fn test_should_parse_sort_order() {
        assert_eq!("DESC".parse::<SortOrder>(), Ok(SortOrder::Desc));
        assert_eq!(" asc".parse::<SortOrder>(), Ok(SortOrder::Asc));
        assert!("sideways".parse::<SortOrder>().is_err());
    }
}
