use crate::energy::units::{kwh_to_watt, round4, SECONDS_PER_RECORD};
use crate::error::{AppError, Result};
use crate::models::records::BucketRecord;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KwhStats {
    pub total: f64,
    pub average: f64,
    pub max: f64,
    pub min: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WattStats {
    pub average: i64,
    pub max: i64,
    pub min: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub stats: KwhStats,
    pub list: Vec<BucketRecord>,
}

/// Per second figures over records of the `seconds` list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecondsSummary {
    pub kwh: KwhStats,
    pub watts: WattStats,
}

fn kwh_stats(values: &[f64]) -> Result<KwhStats> {
    if values.is_empty() {
        return Err(AppError::EmptyAggregate("no kWh values".into()));
    }

    let sum: f64 = values.iter().sum();
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);

    Ok(KwhStats {
        total: round4(sum),
        average: round4(sum / values.len() as f64),
        max,
        min,
    })
}

pub fn summarize(records: Vec<BucketRecord>) -> Result<Summary> {
    let values: Vec<f64> = records.iter().map(|r| r.kwh).collect();
    let stats = kwh_stats(&values)
        .map_err(|_| AppError::EmptyAggregate("no bucket records to summarize".into()))?;
    Ok(Summary {
        stats,
        list: records,
    })
}

/// Each `seconds` record covers `SECONDS_PER_RECORD` seconds, so the average,
/// max and min kWh are scaled down to one second. A record without a stored
/// watt figure gets one derived from its kWh.
pub fn summarize_seconds(records: &[BucketRecord]) -> Result<SecondsSummary> {
    if records.is_empty() {
        return Err(AppError::EmptyAggregate(
            "no seconds records to summarize".into(),
        ));
    }

    let per_record = SECONDS_PER_RECORD as f64;
    let values: Vec<f64> = records.iter().map(|r| r.kwh).collect();
    let stats = kwh_stats(&values)?;
    let kwh = KwhStats {
        total: stats.total,
        average: round4(stats.total / values.len() as f64 / per_record),
        max: round4(stats.max / per_record),
        min: round4(stats.min / per_record),
    };

    let watts = records
        .iter()
        .map(|r| match r.watt {
            Some(w) => Ok(w),
            None => kwh_to_watt(r.kwh, SECONDS_PER_RECORD as u64).map(|w| w as f64),
        })
        .collect::<Result<Vec<f64>>>()?;

    let watt_sum: f64 = watts.iter().sum();
    let watts = WattStats {
        average: (watt_sum / watts.len() as f64).trunc() as i64,
        max: watts.iter().copied().fold(f64::NEG_INFINITY, f64::max).trunc() as i64,
        min: watts.iter().copied().fold(f64::INFINITY, f64::min).trunc() as i64,
    };

    Ok(SecondsSummary { kwh, watts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn records(kwhs: &[f64]) -> Vec<BucketRecord> {
        kwhs.iter().map(|k| BucketRecord::new(Utc::now(), *k)).collect()
    }

    #[test]
    fn test_summarize_basic() {
        let summary = summarize(records(&[1.0, 2.0, 3.0])).unwrap();
        assert_eq!(
            summary.stats,
            KwhStats {
                total: 6.0,
                average: 2.0,
                max: 3.0,
                min: 1.0,
            }
        );
        assert_eq!(summary.list.len(), 3);
    }

    #[test]
    fn test_summarize_rounds_to_four_decimals() {
        let summary = summarize(records(&[0.11111, 0.22222, 0.33333])).unwrap();
        assert_eq!(summary.stats.total, 0.6667);
        assert_eq!(summary.stats.average, 0.2222);
    }

    #[test]
    fn test_summarize_single_record() {
        let summary = summarize(records(&[77.3696])).unwrap();
        assert_eq!(summary.stats.max, 77.3696);
        assert_eq!(summary.stats.min, 77.3696);
        assert_eq!(summary.stats.average, 77.3696);
    }

    #[test]
    fn test_summarize_empty_fails() {
        let err = summarize(Vec::new()).unwrap_err();
        assert!(matches!(err, AppError::EmptyAggregate(_)));
    }

    #[test]
    fn test_summarize_seconds() {
        let mut input = records(&[0.01, 0.02, 0.03]);
        input[0].watt = Some(3600.0);
        input[1].watt = Some(7200.5);
        input[2].watt = Some(10800.0);

        let summary = summarize_seconds(&input).unwrap();
        assert_eq!(summary.kwh.total, 0.06);
        assert_eq!(summary.kwh.average, 0.002);
        assert_eq!(summary.kwh.max, 0.003);
        assert_eq!(summary.kwh.min, 0.001);
        assert_eq!(
            summary.watts,
            WattStats {
                average: 7200,
                max: 10800,
                min: 3600,
            }
        );
    }

    #[test]
    fn test_summarize_seconds_derives_missing_watts() {
        // 0.0025 kWh over ten seconds is 900 W
        let summary = summarize_seconds(&records(&[0.0025])).unwrap();
        assert_eq!(summary.watts.average, 900);
        assert_eq!(summary.watts.max, 900);
    }

    #[test]
    fn test_summarize_seconds_empty_fails() {
        assert!(matches!(
            summarize_seconds(&[]),
            Err(AppError::EmptyAggregate(_))
        ));
    }
}
