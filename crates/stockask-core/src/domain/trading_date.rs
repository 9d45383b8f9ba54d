use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::Date;

use crate::ValidationError;

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const CHART_DATE: &[BorrowedFormatItem<'static>] = format_description!("[day].[month].[year]");

/// Calendar day without time or zone, as emitted by `sys-date` entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TradingDate(Date);

impl TradingDate {
    /// Parse an ISO `YYYY-MM-DD` date.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        Date::parse(input.trim(), ISO_DATE)
            .map(Self)
            .map_err(|_| ValidationError::InvalidDate {
                value: input.to_owned(),
            })
    }

    pub const fn from_date(date: Date) -> Self {
        Self(date)
    }

    pub const fn into_inner(self) -> Date {
        self.0
    }

    /// Days since 1970-01-01; negative before the epoch.
    pub fn epoch_day(self) -> i64 {
        i64::from(self.0.to_julian_day() - UNIX_EPOCH_JULIAN_DAY)
    }

    pub fn format_iso(self) -> String {
        format_or_debug(self.0, ISO_DATE)
    }

    /// `DD.MM.YYYY`, the axis label format.
    pub fn format_chart(self) -> String {
        format_or_debug(self.0, CHART_DATE)
    }
}

const UNIX_EPOCH_JULIAN_DAY: i32 = 2_440_588;

fn format_or_debug(date: Date, format: &[BorrowedFormatItem<'_>]) -> String {
    date.format(format).unwrap_or_else(|_| format!("{date:?}"))
}

impl Display for TradingDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_iso())
    }
}

impl Serialize for TradingDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_iso())
    }
}

impl<'de> Deserialize<'de> for TradingDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_and_formats_for_chart() {
        let date = TradingDate::parse("2015-03-07").expect("valid");
        assert_eq!(date.format_iso(), "2015-03-07");
        assert_eq!(date.format_chart(), "07.03.2015");
    }

    #[test]
    fn epoch_day_matches_unix_epoch() {
        assert_eq!(TradingDate::parse("1970-01-01").expect("valid").epoch_day(), 0);
        assert_eq!(TradingDate::parse("1970-01-11").expect("valid").epoch_day(), 10);
        assert_eq!(TradingDate::parse("1969-12-31").expect("valid").epoch_day(), -1);
    }

    #[test]
    fn rejects_non_iso_input() {
        for input in ["2015", "07.03.2015", "2015-13-01", "XXXX-WXX"] {
            assert!(
                matches!(TradingDate::parse(input), Err(ValidationError::InvalidDate { .. })),
                "{input} should be rejected"
            );
        }
    }
}
