//! Record shapes stored in the rollup lists, the day cache and the meter keys.

use crate::energy::units::pulses_to_kwh_all;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
}

impl Resolution {
    pub fn list_name(self) -> &'static str {
        match self {
            Resolution::Seconds => "seconds",
            Resolution::Minutes => "minutes",
            Resolution::Hours => "hours",
            Resolution::Days => "days",
            Resolution::Weeks => "weeks",
            Resolution::Months => "months",
        }
    }

    /// Singular unit name used in descriptions ("3 hours").
    pub fn unit(self) -> &'static str {
        match self {
            Resolution::Seconds => "second",
            Resolution::Minutes => "minute",
            Resolution::Hours => "hour",
            Resolution::Days => "day",
            Resolution::Weeks => "week",
            Resolution::Months => "month",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.list_name())
    }
}

/// Finer grained breakdown of a bucket. Serialized under the field name of
/// its variant, e.g. `"perHour": [...]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Breakdown {
    #[serde(rename = "perSecond")]
    PerSecond(Vec<f64>),
    #[serde(rename = "perMinute")]
    PerMinute(Vec<f64>),
    #[serde(rename = "perHour")]
    PerHour(Vec<f64>),
    #[serde(rename = "perDay")]
    PerDay(Vec<f64>),
}

impl Breakdown {
    pub fn values(&self) -> &[f64] {
        match self {
            Breakdown::PerSecond(v)
            | Breakdown::PerMinute(v)
            | Breakdown::PerHour(v)
            | Breakdown::PerDay(v) => v,
        }
    }

    pub fn into_values(self) -> Vec<f64> {
        match self {
            Breakdown::PerSecond(v)
            | Breakdown::PerMinute(v)
            | Breakdown::PerHour(v)
            | Breakdown::PerDay(v) => v,
        }
    }

    fn map_values(self, f: impl FnOnce(&[f64]) -> Vec<f64>) -> Self {
        match self {
            Breakdown::PerSecond(v) => Breakdown::PerSecond(f(&v)),
            Breakdown::PerMinute(v) => Breakdown::PerMinute(f(&v)),
            Breakdown::PerHour(v) => Breakdown::PerHour(f(&v)),
            Breakdown::PerDay(v) => Breakdown::PerDay(f(&v)),
        }
    }
}

/// One pre-aggregated entry of a rollup list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketRecord {
    #[serde(serialize_with = "flexible_timestamp::serialize")]
    pub timestamp: DateTime<Utc>,
    pub kwh: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watt: Option<f64>,
    /// Raw pulse sum for the period.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    #[serde(flatten)]
    pub breakdown: Option<Breakdown>,
}

impl BucketRecord {
    pub fn new(timestamp: DateTime<Utc>, kwh: f64) -> Self {
        Self {
            timestamp,
            kwh,
            watt: None,
            total: None,
            breakdown: None,
        }
    }

    /// Decode a stored JSON document and migrate it to the current shape for
    /// `resolution`.
    pub fn decode(raw: &str, resolution: Resolution) -> Result<Self> {
        let stored: StoredBucket = serde_json::from_str(raw)?;
        Ok(stored.migrate(resolution))
    }

    /// Breakdown values are stored as pulse counts; convert them to kWh.
    pub fn breakdown_to_kwh(mut self) -> Self {
        self.breakdown = self.breakdown.map(|b| b.map_values(pulses_to_kwh_all));
        self
    }
}

/// Every field a bucket has been written with across format versions.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredBucket {
    #[serde(with = "flexible_timestamp")]
    timestamp: DateTime<Utc>,
    kwh: f64,
    watt: Option<f64>,
    total: Option<i64>,
    per_second: Option<Vec<f64>>,
    per_minute: Option<Vec<f64>>,
    per_hour: Option<Vec<f64>>,
    per_day: Option<Vec<f64>>,
}

impl StoredBucket {
    /// Older writers stored the day, week and month breakdowns under
    /// `perMinute`; those are renamed to the resolution's field here.
    fn migrate(self, resolution: Resolution) -> BucketRecord {
        let StoredBucket {
            timestamp,
            kwh,
            watt,
            total,
            per_second,
            per_minute,
            per_hour,
            per_day,
        } = self;

        let breakdown = match resolution {
            Resolution::Seconds => None,
            Resolution::Minutes => per_second.map(Breakdown::PerSecond),
            Resolution::Hours => per_minute.map(Breakdown::PerMinute),
            Resolution::Days => per_hour.or(per_minute).map(Breakdown::PerHour),
            Resolution::Weeks | Resolution::Months => {
                per_day.or(per_minute).map(Breakdown::PerDay)
            }
        };

        BucketRecord {
            timestamp,
            kwh,
            watt,
            total,
            breakdown,
        }
    }
}

/// A `days` record as served by date lookups and kept in the day cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRecord {
    #[serde(with = "flexible_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub kwh: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watt: Option<f64>,
    #[serde(default, alias = "perMinute")]
    pub per_hour: Vec<f64>,
    #[serde(default)]
    pub description: String,
}

/// The absolute meter register reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeterTotal {
    pub value: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredMeterTotal {
    Record {
        value: f64,
        #[serde(default, deserialize_with = "optional_timestamp::deserialize")]
        timestamp: Option<DateTime<Utc>>,
    },
    Bare(f64),
    Text(String),
}

impl MeterTotal {
    /// Accepts the current `{value, timestamp}` document as well as the
    /// bare number older versions stored.
    pub fn decode(raw: &str) -> Result<Self> {
        let stored: StoredMeterTotal = serde_json::from_str(raw).or_else(|_| {
            // Unquoted legacy values that are not valid JSON numbers
            serde_json::from_value(serde_json::Value::String(raw.trim().to_string()))
        })?;

        match stored {
            StoredMeterTotal::Record { value, timestamp } => Ok(Self { value, timestamp }),
            StoredMeterTotal::Bare(value) => Ok(Self {
                value,
                timestamp: None,
            }),
            StoredMeterTotal::Text(text) => {
                let value = text.trim().parse::<f64>().map_err(|_| {
                    crate::error::AppError::Upstream(format!(
                        "meter total is not a number: {:?}",
                        text
                    ))
                })?;
                Ok(Self {
                    value,
                    timestamp: None,
                })
            }
        }
    }

    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// One entry of the meter update audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterUpdate {
    #[serde(with = "flexible_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub old_value: Option<f64>,
    pub new_value: f64,
    pub delta: Option<f64>,
}

/// Timestamps have been written both as epoch milliseconds and as
/// RFC 3339 strings. Always written back as RFC 3339.
pub(crate) mod flexible_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    pub(super) enum Raw {
        Millis(i64),
        Fractional(f64),
        Text(String),
    }

    impl Raw {
        pub(super) fn into_datetime(self) -> Option<DateTime<Utc>> {
            match self {
                Raw::Millis(ms) => DateTime::from_timestamp_millis(ms),
                Raw::Fractional(ms) => DateTime::from_timestamp_millis(ms.trunc() as i64),
                Raw::Text(text) => DateTime::parse_from_rfc3339(&text)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc))
                    .or_else(|| text.parse::<i64>().ok().and_then(DateTime::from_timestamp_millis)),
            }
        }
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        Raw::deserialize(d)?
            .into_datetime()
            .ok_or_else(|| D::Error::custom("invalid timestamp"))
    }
}

mod optional_timestamp {
    use super::flexible_timestamp::Raw;
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<Raw>::deserialize(d)? {
            None => Ok(None),
            Some(raw) => raw
                .into_datetime()
                .map(Some)
                .ok_or_else(|| D::Error::custom("invalid timestamp")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_current_day_record() {
        let raw = r#"{"timestamp":"2017-03-31T00:00:00.000Z","kwh":77.3696,"total":773696,"perHour":[10000,20000]}"#;
        let record = BucketRecord::decode(raw, Resolution::Days).unwrap();

        assert_eq!(record.kwh, 77.3696);
        assert_eq!(record.total, Some(773_696));
        assert_eq!(
            record.breakdown,
            Some(Breakdown::PerHour(vec![10_000.0, 20_000.0]))
        );
    }

    #[test]
    fn test_decode_renames_legacy_breakdown() {
        let raw = r#"{"timestamp":1490911200000,"kwh":1.5,"perMinute":[5000,10000]}"#;

        let day = BucketRecord::decode(raw, Resolution::Days).unwrap();
        assert_eq!(day.breakdown, Some(Breakdown::PerHour(vec![5_000.0, 10_000.0])));
        assert_eq!(
            day.timestamp,
            Utc.with_ymd_and_hms(2017, 3, 30, 22, 0, 0).unwrap()
        );

        let month = BucketRecord::decode(raw, Resolution::Months).unwrap();
        assert_eq!(month.breakdown, Some(Breakdown::PerDay(vec![5_000.0, 10_000.0])));

        // perMinute is the real field name for hours
        let hour = BucketRecord::decode(raw, Resolution::Hours).unwrap();
        assert_eq!(hour.breakdown, Some(Breakdown::PerMinute(vec![5_000.0, 10_000.0])));
    }

    #[test]
    fn test_decode_prefers_current_field_over_legacy() {
        let raw = r#"{"timestamp":0,"kwh":1.0,"perMinute":[1],"perHour":[2]}"#;
        let day = BucketRecord::decode(raw, Resolution::Days).unwrap();
        assert_eq!(day.breakdown, Some(Breakdown::PerHour(vec![2.0])));
    }

    #[test]
    fn test_decode_rejects_malformed_record() {
        assert!(BucketRecord::decode("not json", Resolution::Hours).is_err());
        assert!(BucketRecord::decode(r#"{"kwh":1.0}"#, Resolution::Hours).is_err());
    }

    #[test]
    fn test_serialize_uses_breakdown_field_name() {
        let record = BucketRecord {
            timestamp: Utc.with_ymd_and_hms(2017, 3, 31, 0, 0, 0).unwrap(),
            kwh: 2.0,
            watt: None,
            total: None,
            breakdown: Some(Breakdown::PerDay(vec![1.0, 1.0])),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["perDay"], serde_json::json!([1.0, 1.0]));
        assert!(json.get("total").is_none());
        assert!(json.get("watt").is_none());
    }

    #[test]
    fn test_breakdown_to_kwh() {
        let mut record = BucketRecord::new(Utc::now(), 1.0);
        record.breakdown = Some(Breakdown::PerHour(vec![10_000.0, 2_500.0]));
        let record = record.breakdown_to_kwh();
        assert_eq!(record.breakdown.unwrap().values(), &[1.0, 0.25]);
    }

    #[test]
    fn test_day_record_accepts_legacy_field_and_millis() {
        let raw = r#"{"timestamp":1490911200000,"kwh":3.0,"perMinute":[0.5],"description":"x"}"#;
        let day: DayRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(day.per_hour, vec![0.5]);

        let out = serde_json::to_value(&day).unwrap();
        assert_eq!(out["timestamp"], "2017-03-30T22:00:00.000Z");
        assert!(out.get("perHour").is_some());
    }

    #[test]
    fn test_meter_total_decodes_all_versions() {
        let current = MeterTotal::decode(r#"{"value":10000,"timestamp":"2017-03-30T10:00:00Z"}"#)
            .unwrap();
        assert_eq!(current.value, 10_000.0);
        assert!(current.timestamp.is_some());

        let bare = MeterTotal::decode("10000.5").unwrap();
        assert_eq!(bare.value, 10_000.5);
        assert_eq!(bare.timestamp, None);

        let quoted = MeterTotal::decode(r#""42""#).unwrap();
        assert_eq!(quoted.value, 42.0);

        assert!(MeterTotal::decode("garbage").is_err());
    }
}
