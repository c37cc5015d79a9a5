use crate::energy::dates::{described_date, month_name};
use crate::energy::units::pulses_to_kwh_all;
use crate::error::{AppError, Result};
use crate::models::records::{BucketRecord, DayRecord, Resolution};
use crate::models::responses::MonthResponse;
use crate::repositories::day_cache::day_key;
use crate::repositories::{DayCacheRepository, RollupRepository};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use tracing::{debug, info};

/// Calendar lookups over the `days` and `months` lists. Day results are
/// memoized in the day cache since past days never change.
#[derive(Clone)]
pub struct DateLookupService {
    rollups: RollupRepository,
    cache: DayCacheRepository,
    tz: FixedOffset,
    start_year: i32,
}

impl DateLookupService {
    pub fn new(
        rollups: RollupRepository,
        cache: DayCacheRepository,
        tz: FixedOffset,
        start_year: i32,
    ) -> Self {
        Self {
            rollups,
            cache,
            tz,
            start_year,
        }
    }

    fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.tz).date_naive()
    }

    pub fn validate_year(&self, year: i32, now: DateTime<Utc>) -> Result<()> {
        let current = self.today(now).year();
        if !(1000..=9999).contains(&year) || year < self.start_year || year > current {
            return Err(AppError::OutOfRange(format!(
                "year must be between {} and {}; got {}",
                self.start_year, current, year
            )));
        }
        Ok(())
    }

    /// The current month is allowed; later months are not.
    pub fn validate_month(&self, year: i32, month: u32, now: DateTime<Utc>) -> Result<()> {
        self.validate_year(year, now)?;
        if !(1..=12).contains(&month) {
            return Err(AppError::InvalidArgument(format!(
                "month must be between 1 and 12; got {}",
                month
            )));
        }

        let today = self.today(now);
        if (year, month) > (today.year(), today.month()) {
            return Err(AppError::OutOfRange(format!(
                "{} {} is in the future",
                month_name(month),
                year
            )));
        }
        Ok(())
    }

    /// A day must be a real calendar date strictly before today.
    pub fn validate_day(
        &self,
        year: i32,
        month: u32,
        day: u32,
        now: DateTime<Utc>,
    ) -> Result<NaiveDate> {
        self.validate_month(year, month, now)?;
        if !(1..=31).contains(&day) {
            return Err(AppError::OutOfRange(format!(
                "day must be between 1 and 31; got {}",
                day
            )));
        }

        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            AppError::InvalidArgument(format!("{}-{:02}-{:02} is not a date", year, month, day))
        })?;

        if date >= self.today(now) {
            return Err(AppError::OutOfRange(format!(
                "{} has not finished yet",
                date
            )));
        }
        Ok(date)
    }

    pub async fn find_by_date(
        &self,
        year: i32,
        month: u32,
        day: u32,
        now: DateTime<Utc>,
    ) -> Result<DayRecord> {
        let date = self.validate_day(year, month, day, now)?;

        if let Some(days) = self.cache.get_month(year, month).await? {
            if let Some(record) = days.get(&day_key(day)) {
                debug!(%date, "day cache hit");
                return Ok(record.clone());
            }
        }

        debug!(%date, "day cache miss, scanning days");
        let record = self
            .rollups
            .all(Resolution::Days)
            .await?
            .into_iter()
            .find(|r| described_date(&r.timestamp, &self.tz) == date)
            .ok_or_else(|| AppError::NotFound(format!("no day record for {}", date)))?;

        let record = day_record(record, date);
        self.cache.save_day(year, month, day, &record).await?;
        info!(%date, kwh = record.kwh, "day record cached");

        Ok(record)
    }

    pub async fn get_month_summary(
        &self,
        year: i32,
        month: u32,
        now: DateTime<Utc>,
    ) -> Result<MonthResponse> {
        self.validate_month(year, month, now)?;

        let record = self
            .rollups
            .all(Resolution::Months)
            .await?
            .into_iter()
            .find(|r| {
                let date = described_date(&r.timestamp, &self.tz);
                date.year() == year && date.month() == month
            })
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "no month record for {} {}",
                    month_name(month),
                    year
                ))
            })?;

        Ok(MonthResponse {
            description: format!("kWh usage for {}, {}.", month_name(month), year),
            record: record.breakdown_to_kwh(),
        })
    }
}

fn day_record(record: BucketRecord, date: NaiveDate) -> DayRecord {
    DayRecord {
        timestamp: record.timestamp,
        kwh: record.kwh,
        watt: record.watt,
        per_hour: record
            .breakdown
            .map(|b| pulses_to_kwh_all(b.values()))
            .unwrap_or_default(),
        description: format!("kWh usage for {}", date.format("%a %b %d %Y")),
    }
}
