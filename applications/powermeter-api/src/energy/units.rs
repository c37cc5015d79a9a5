use crate::error::{AppError, Result};

/// The meter blinks 10 000 times per kWh.
pub const PULSES_PER_KWH: f64 = 10_000.0;

/// Each element of the `seconds` list aggregates this many seconds.
pub const SECONDS_PER_RECORD: usize = 10;

const WATT_SECONDS_PER_KWH: f64 = 3_600_000.0;

/// Round to 4 decimals, the precision every kWh figure is reported with.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

pub fn pulses_to_kwh(raw: f64) -> f64 {
    round4(raw / PULSES_PER_KWH)
}

pub fn pulses_to_kwh_all(raw: &[f64]) -> Vec<f64> {
    raw.iter().copied().map(pulses_to_kwh).collect()
}

/// Average power in watts for `kwh` consumed over `interval_seconds`.
pub fn kwh_to_watt(kwh: f64, interval_seconds: u64) -> Result<i64> {
    if interval_seconds == 0 {
        return Err(AppError::InvalidArgument(
            "interval must be at least one second".into(),
        ));
    }
    Ok((kwh * WATT_SECONDS_PER_KWH / interval_seconds as f64).trunc() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulses_to_kwh() {
        assert_eq!(pulses_to_kwh(10_000.0), 1.0);
        assert_eq!(pulses_to_kwh(0.0), 0.0);
        assert_eq!(pulses_to_kwh(773_696.0), 77.3696);
        assert_eq!(pulses_to_kwh(17.0), 0.0017);
        // 12345.67 pulses is 1.234567 kWh, reported as 1.2346
        assert_eq!(pulses_to_kwh(12_345.67), 1.2346);
    }

    #[test]
    fn test_pulses_to_kwh_is_linear_within_rounding() {
        for raw in [1.0, 250.0, 3_333.0, 10_000.0, 99_999.0] {
            let sum = pulses_to_kwh(raw) + pulses_to_kwh(raw);
            assert!((sum - pulses_to_kwh(raw * 2.0)).abs() <= 0.0001);
        }
    }

    #[test]
    fn test_pulses_to_kwh_all() {
        assert_eq!(
            pulses_to_kwh_all(&[10_000.0, 5_000.0, 1.0]),
            vec![1.0, 0.5, 0.0001]
        );
        assert!(pulses_to_kwh_all(&[]).is_empty());
    }

    #[test]
    fn test_kwh_to_watt() {
        assert_eq!(kwh_to_watt(0.5, 3600).unwrap(), 500);
        assert_eq!(kwh_to_watt(1.0, 3600).unwrap(), 1000);
        assert_eq!(kwh_to_watt(0.0025, 10).unwrap(), 900);
        // truncated, never rounded up
        assert_eq!(kwh_to_watt(0.0001, 7).unwrap(), 51);
    }

    #[test]
    fn test_kwh_to_watt_rejects_zero_interval() {
        assert!(matches!(
            kwh_to_watt(1.0, 0),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_round4() {
        assert_eq!(round4(1.23456), 1.2346);
        assert_eq!(round4(6.0), 6.0);
        assert_eq!(round4(0.1 + 0.2), 0.3);
    }
}
