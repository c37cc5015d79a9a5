use crate::energy::dates::{described_date, month_name};
use crate::energy::units::SECONDS_PER_RECORD;
use crate::energy::{normalize_date, round4, summarize, summarize_seconds, Level};
use crate::error::{AppError, Result};
use crate::models::records::{BucketRecord, Resolution};
use crate::models::responses::{KwhResponse, KwhSummaryResponse, SecondsResponse, UsageResponse};
use crate::repositories::RollupRepository;
use chrono::{DateTime, Datelike, FixedOffset, Utc};
use std::str::FromStr;
use tracing::debug;

const KWH_TYPES: &str = "seconds, today, hour, day, week, month, year";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KwhType {
    Seconds,
    Today,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl FromStr for KwhType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "seconds" => Ok(KwhType::Seconds),
            "today" => Ok(KwhType::Today),
            "hour" => Ok(KwhType::Hour),
            "day" => Ok(KwhType::Day),
            "week" => Ok(KwhType::Week),
            "month" => Ok(KwhType::Month),
            "year" => Ok(KwhType::Year),
            other => Err(AppError::InvalidArgument(format!(
                "type must be one of the keywords {}; got {:?}",
                KWH_TYPES, other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KwhCount {
    Last(usize),
    /// The current period; only meaningful for months.
    This,
}

impl Default for KwhCount {
    fn default() -> Self {
        KwhCount::Last(1)
    }
}

impl FromStr for KwhCount {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        if s == "this" {
            return Ok(KwhCount::This);
        }
        // Counts end up as a SQL LIMIT, so they must fit in an i64
        s.parse::<i64>()
            .ok()
            .filter(|n| *n > 0)
            .and_then(|n| usize::try_from(n).ok())
            .map(KwhCount::Last)
            .ok_or_else(|| {
                AppError::InvalidArgument(format!(
                    "count must be a positive integer up to {} or the keyword \"this\"; got {:?}",
                    i64::MAX,
                    s
                ))
            })
    }
}

#[derive(Clone)]
pub struct KwhService {
    rollups: RollupRepository,
    tz: FixedOffset,
}

impl KwhService {
    pub fn new(rollups: RollupRepository, tz: FixedOffset) -> Self {
        Self { rollups, tz }
    }

    pub async fn handle_kwh(
        &self,
        kind: &str,
        count: KwhCount,
        now: DateTime<Utc>,
    ) -> Result<KwhResponse> {
        let kind: KwhType = kind.parse()?;
        debug!(?kind, ?count, "kwh query");

        match (kind, count) {
            (KwhType::Today, _) => self.today(now).await.map(KwhResponse::Usage),
            (KwhType::Month, KwhCount::This) => self.current_month(now).await.map(KwhResponse::Usage),
            (KwhType::Year, _) => Err(AppError::NotImplemented(
                "kWh per year is not available yet".into(),
            )),
            (_, KwhCount::This) => Err(AppError::InvalidArgument(
                "the keyword \"this\" is only supported for month".into(),
            )),
            (KwhType::Seconds, KwhCount::Last(n)) => self.seconds(n, now).await.map(KwhResponse::Seconds),
            (KwhType::Hour, KwhCount::Last(n)) => {
                self.last_buckets(Resolution::Hours, n).await.map(KwhResponse::Summary)
            }
            (KwhType::Day, KwhCount::Last(n)) => {
                self.last_buckets(Resolution::Days, n).await.map(KwhResponse::Summary)
            }
            (KwhType::Week, KwhCount::Last(n)) => {
                self.last_buckets(Resolution::Weeks, n).await.map(KwhResponse::Summary)
            }
            (KwhType::Month, KwhCount::Last(n)) => {
                self.last_buckets(Resolution::Months, n).await.map(KwhResponse::Summary)
            }
        }
    }

    async fn seconds(&self, count: usize, now: DateTime<Utc>) -> Result<SecondsResponse> {
        let records = self.rollups.seconds_range_from_end(count).await?;
        let summary = summarize_seconds(&records)?;

        let expected = count.div_ceil(SECONDS_PER_RECORD);
        let found = if records.len() < expected {
            records.len() * SECONDS_PER_RECORD
        } else {
            count
        };

        let mut description = format!("kWh and Watt consumption per second for {} seconds", found);
        if found != count {
            description.push_str(&format!(
                ". {} seconds was asked for, but only {} seconds was found.",
                count, found
            ));
        }

        let list = records
            .into_iter()
            .map(|mut r| {
                r.watt = r.watt.map(f64::trunc);
                r
            })
            .collect();

        Ok(SecondsResponse {
            description,
            count: found,
            requested: count,
            time: now,
            timestamp: now.timestamp_millis(),
            summary,
            list,
        })
    }

    async fn today(&self, now: DateTime<Utc>) -> Result<UsageResponse> {
        Ok(UsageResponse {
            description: "kWh used today from midnight to now.".into(),
            date: now,
            kwh: self.kwh_since_midnight(now).await?,
        })
    }

    /// Sum of the minute records since local midnight.
    async fn kwh_since_midnight(&self, now: DateTime<Utc>) -> Result<f64> {
        let local = now.with_timezone(&self.tz);
        let midnight = normalize_date(&local, Level::Day)?;
        let minutes = ((local - midnight).num_milliseconds() as f64 / 60_000.0).round() as usize;
        if minutes == 0 {
            return Ok(0.0);
        }

        let records = self.rollups.range_from_end(Resolution::Minutes, minutes).await?;
        if records.len() < minutes {
            debug!(
                requested = minutes,
                found = records.len(),
                "fewer minute records than minutes since midnight"
            );
        }
        Ok(round4(records.iter().map(|r| r.kwh).sum()))
    }

    /// Completed days of the current month plus today so far.
    async fn current_month(&self, now: DateTime<Utc>) -> Result<UsageResponse> {
        let today = now.with_timezone(&self.tz).date_naive();
        let completed_days = today.day0() as usize;

        let mut kwh = 0.0;
        if completed_days > 0 {
            let days = self
                .rollups
                .range_from_end(Resolution::Days, completed_days)
                .await?;
            kwh = days
                .iter()
                .filter(|d| {
                    let date = described_date(&d.timestamp, &self.tz);
                    date.year() == today.year() && date.month() == today.month() && date < today
                })
                .map(|d| d.kwh)
                .sum();
        }
        kwh += self.kwh_since_midnight(now).await?;

        Ok(UsageResponse {
            description: format!(
                "kWh used so far this month, {} {}",
                month_name(today.month()),
                today.year()
            ),
            date: now,
            kwh: round4(kwh),
        })
    }

    async fn last_buckets(&self, resolution: Resolution, count: usize) -> Result<KwhSummaryResponse> {
        let records: Vec<BucketRecord> = self
            .rollups
            .range_from_end(resolution, count)
            .await?
            .into_iter()
            .map(BucketRecord::breakdown_to_kwh)
            .collect();

        let summary = summarize(records)?;
        let found = summary.list.len();
        let unit = resolution.unit();

        let mut description = format!("kWh consumption per {} for {} {}s.", unit, found, unit);
        if found != count {
            description.push_str(&format!(
                " {} {}s was asked for, but only {} {}s was found.",
                count, unit, found, unit
            ));
        }

        Ok(KwhSummaryResponse {
            description,
            count: found,
            requested: count,
            stats: summary.stats,
            list: summary.list,
        })
    }
}
