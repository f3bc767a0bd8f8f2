//! Millisecond timestamps
//!
//! The queue stores every timestamp as milliseconds since the Unix epoch.
//! Tables decode them into RFC 3339 strings (UTC, millisecond precision).

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use queue_client::{Error, Result, Sieve};
use serde_json::{Map, Value, json};

use crate::table::Table;

/// Current time in epoch milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn to_ms(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

/// `None` when `ms` is outside chrono's representable range.
pub fn from_ms(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single()
}

fn decode_value(value: &Value) -> Option<Value> {
    let ms = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64))?,
        _ => return None,
    };
    from_ms(ms).map(|at| Value::String(at.to_rfc3339_opts(SecondsFormat::Millis, true)))
}

/// Rewrite numeric ms values in `columns` as RFC 3339 strings. Nulls and
/// values that are not numbers are left alone.
pub fn decode_timestamp_columns(table: &mut Table, columns: &[&str]) {
    for column in columns {
        table.map_column(column, |value| decode_value(value).unwrap_or_else(|| value.clone()));
    }
}

/// Open or closed interval on a timestamp field.
///
/// Becomes `{"$gt": ms, "$lt": ms}` in a sieve; either bound may be left out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub after: Option<DateTime<Utc>>,
    pub before: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn after(at: DateTime<Utc>) -> Self {
        Self {
            after: Some(at),
            before: None,
        }
    }

    pub fn before(at: DateTime<Utc>) -> Self {
        Self {
            after: None,
            before: Some(at),
        }
    }

    pub fn between(after: DateTime<Utc>, before: DateTime<Utc>) -> Self {
        Self {
            after: Some(after),
            before: Some(before),
        }
    }

    /// The operator map for this range. Fails when both bounds are set and
    /// `after` is not strictly earlier than `before`, or when neither is.
    pub fn to_condition(&self) -> Result<Value> {
        if let (Some(after), Some(before)) = (self.after, self.before) {
            if after >= before {
                return Err(Error::Validation(
                    "$gt argument must be less than $lt if both are used".into(),
                ));
            }
        }

        let mut condition = Map::new();
        if let Some(after) = self.after {
            condition.insert("$gt".into(), json!(to_ms(after)));
        }
        if let Some(before) = self.before {
            condition.insert("$lt".into(), json!(to_ms(before)));
        }
        if condition.is_empty() {
            return Err(Error::Validation("time range has no bounds".into()));
        }
        Ok(Value::Object(condition))
    }

    /// Add this range to `sieve` under `field` (`created`, `opened`, ...).
    pub fn apply(&self, sieve: Sieve, field: &str) -> Result<Sieve> {
        Ok(sieve.with(field, self.to_condition()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: i64) -> DateTime<Utc> {
        from_ms(ms).unwrap()
    }

    #[test]
    fn ms_conversion_is_exact() {
        let t = at(1_650_000_000_123);
        assert_eq!(to_ms(t), 1_650_000_000_123);
        assert!(now_ms() > 1_650_000_000_000);
    }

    #[test]
    fn range_becomes_operator_map() {
        let range = TimeRange::between(at(1_000), at(2_000));
        assert_eq!(range.to_condition().unwrap(), json!({"$gt": 1000, "$lt": 2000}));

        assert_eq!(
            TimeRange::after(at(5)).to_condition().unwrap(),
            json!({"$gt": 5})
        );
        assert_eq!(
            TimeRange::before(at(7)).to_condition().unwrap(),
            json!({"$lt": 7})
        );
    }

    #[test]
    fn inverted_or_empty_range_is_rejected() {
        for range in [
            TimeRange::between(at(2_000), at(1_000)),
            TimeRange::between(at(1_000), at(1_000)),
            TimeRange::default(),
        ] {
            let err = range.to_condition().unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "got: {err:?}");
        }
    }

    #[test]
    fn apply_adds_field_to_sieve() {
        let sieve = TimeRange::after(at(10))
            .apply(Sieve::new().with("namespace", "split"), "closed")
            .unwrap();
        assert_eq!(sieve.get("closed"), Some(&json!({"$gt": 10})));
        assert_eq!(sieve.get("namespace"), Some(&json!("split")));
    }

    #[test]
    fn numeric_values_decode_to_rfc3339() {
        assert_eq!(
            decode_value(&json!(0)),
            Some(json!("1970-01-01T00:00:00.000Z"))
        );
        assert_eq!(
            decode_value(&json!(1_650_000_000_123_i64)),
            Some(json!("2022-04-15T05:20:00.123Z"))
        );
        assert_eq!(decode_value(&Value::Null), None);
        assert_eq!(decode_value(&json!("already text")), None);
    }
}
