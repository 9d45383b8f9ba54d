use serde::{Deserialize, Serialize};

use crate::{TradingDate, ValidationError};

/// One trading day of prices for a single company.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DailyValueRecord")]
pub struct DailyValue {
    pub date: TradingDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl DailyValue {
    pub fn new(
        date: TradingDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    ) -> Result<Self, ValidationError> {
        validate_price("open", open)?;
        validate_price("high", high)?;
        validate_price("low", low)?;
        validate_price("close", close)?;

        if high < low {
            return Err(ValidationError::InvalidPriceRange);
        }

        Ok(Self {
            date,
            open,
            high,
            low,
            close,
        })
    }
}

/// Unchecked wire shape; every decoded row goes through [`DailyValue::new`].
#[derive(Deserialize)]
struct DailyValueRecord {
    date: TradingDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

impl TryFrom<DailyValueRecord> for DailyValue {
    type Error = ValidationError;

    fn try_from(record: DailyValueRecord) -> Result<Self, Self::Error> {
        Self::new(record.date, record.open, record.high, record.low, record.close)
    }
}

/// Order values oldest first. Stable, so equal days keep their input order.
pub fn sort_by_date(values: &mut [DailyValue]) {
    values.sort_by_key(|value| value.date);
}

fn validate_price(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(input: &str) -> TradingDate {
        TradingDate::parse(input).expect("valid date")
    }

    #[test]
    fn rejects_inverted_range() {
        let err = DailyValue::new(day("2015-01-02"), 10.0, 9.0, 11.0, 10.0).expect_err("must fail");
        assert_eq!(err, ValidationError::InvalidPriceRange);
    }

    #[test]
    fn rejects_nan_and_negative_prices() {
        assert_eq!(
            DailyValue::new(day("2015-01-02"), f64::NAN, 1.0, 1.0, 1.0),
            Err(ValidationError::NonFiniteValue { field: "open" })
        );
        assert_eq!(
            DailyValue::new(day("2015-01-02"), 1.0, 1.0, 1.0, -0.5),
            Err(ValidationError::NegativeValue { field: "close" })
        );
    }

    #[test]
    fn decoding_applies_the_same_checks() {
        let inverted = r#"{"date":"2015-01-02","open":10.0,"high":9.0,"low":11.0,"close":10.0}"#;
        let err = serde_json::from_str::<DailyValue>(inverted).expect_err("high below low");
        assert!(err.to_string().contains("high must be >= low"));

        let negative = r#"{"date":"2015-01-02","open":-1.0,"high":2.0,"low":1.0,"close":1.5}"#;
        assert!(serde_json::from_str::<DailyValue>(negative).is_err());

        let valid = r#"{"date":"2015-01-02","open":1.0,"high":2.0,"low":1.0,"close":1.5}"#;
        let value: DailyValue = serde_json::from_str(valid).expect("valid row");
        assert_eq!(value.high, 2.0);
    }

    #[test]
    fn sorts_oldest_first() {
        let mut values = vec![
            DailyValue::new(day("2015-03-01"), 1.0, 3.0, 1.0, 2.0).expect("valid"),
            DailyValue::new(day("2015-01-01"), 1.0, 2.0, 1.0, 2.0).expect("valid"),
        ];
        sort_by_date(&mut values);
        assert_eq!(values[0].date, day("2015-01-01"));
    }
}
