//! Untyped caller input.
//!
//! Query options arrive as loosely-typed values. `RawValue` models every
//! shape the validator has to tell apart, including the difference between
//! an absent value (`Undefined`) and an explicit `Null`.

use chrono::{DateTime, NaiveDate, Utc};

/// A single caller-supplied value of unknown shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawValue {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Date(DateTime<Utc>),
    Array(Vec<RawValue>),
    Object(RawOptions),
}

impl RawValue {
    /// Short name of the value's shape, for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            RawValue::Undefined => "undefined",
            RawValue::Null => "null",
            RawValue::Bool(_) => "boolean",
            RawValue::Number(_) => "number",
            RawValue::String(_) => "string",
            RawValue::Date(_) => "date",
            RawValue::Array(_) => "array",
            RawValue::Object(_) => "object",
        }
    }
}

/// An insertion-ordered key/value mapping of caller options.
///
/// Inserting an existing key replaces its value in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawOptions {
    entries: Vec<(String, RawValue)>,
}

impl RawOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for RawOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = RawOptions::new();
        for (k, v) in iter {
            options.insert(k, v);
        }
        options
    }
}

impl From<RawOptions> for RawValue {
    fn from(options: RawOptions) -> Self {
        RawValue::Object(options)
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        RawValue::Bool(b)
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        RawValue::Number(n)
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(impl From<$t> for RawValue {
            fn from(n: $t) -> Self {
                RawValue::Number(n as f64)
            }
        })*
    };
}

impl_from_integer!(i32, i64, u32, u64, usize);

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::String(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::String(s)
    }
}

impl From<DateTime<Utc>> for RawValue {
    fn from(dt: DateTime<Utc>) -> Self {
        RawValue::Date(dt)
    }
}

/// Calendar dates become midnight UTC.
impl From<NaiveDate> for RawValue {
    fn from(date: NaiveDate) -> Self {
        RawValue::Date(date.and_time(chrono::NaiveTime::MIN).and_utc())
    }
}

impl From<Vec<RawValue>> for RawValue {
    fn from(items: Vec<RawValue>) -> Self {
        RawValue::Array(items)
    }
}

/// `None` is an absent value, not `Null`.
impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(RawValue::Undefined, Into::into)
    }
}

impl From<serde_json::Value> for RawValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => RawValue::Null,
            Value::Bool(b) => RawValue::Bool(b),
            Value::Number(n) => n.as_f64().map_or(RawValue::Null, RawValue::Number),
            Value::String(s) => RawValue::String(s),
            Value::Array(items) => RawValue::Array(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => RawValue::Object(map.into_iter().collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_replaces_existing_key_in_place() {
        let options = RawOptions::new().with("page", 1).with("name", "x").with("page", 2);
        let keys: Vec<&str> = options.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["page", "name"]);
        assert_eq!(options.get("page"), Some(&RawValue::Number(2.0)));
    }

    #[test]
    fn none_maps_to_undefined() {
        let value: RawValue = Option::<i64>::None.into();
        assert_eq!(value, RawValue::Undefined);
        let value: RawValue = Some("x").into();
        assert_eq!(value, RawValue::String("x".to_string()));
    }

    #[test]
    fn json_values_convert_structurally() {
        let value: RawValue = json!({"page": 2, "flags": [true], "nothing": null}).into();
        let RawValue::Object(options) = value else {
            panic!("expected object");
        };
        assert_eq!(options.get("page"), Some(&RawValue::Number(2.0)));
        assert_eq!(options.get("flags"), Some(&RawValue::Array(vec![RawValue::Bool(true)])));
        assert_eq!(options.get("nothing"), Some(&RawValue::Null));
    }

    #[test]
    fn naive_date_is_midnight_utc() {
        let date = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let RawValue::Date(dt) = RawValue::from(date) else {
            panic!("expected date");
        };
        assert_eq!(dt.to_rfc3339(), "2023-01-02T00:00:00+00:00");
    }
}
