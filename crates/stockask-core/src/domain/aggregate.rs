use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{DailyValue, TradingDate};

/// Statistic a value query asks for, computed over daily highs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregate {
    #[default]
    Maximum,
    Minimum,
    Average,
}

/// Result of folding a series with an [`Aggregate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateValue {
    pub aggregate: Aggregate,
    pub value: f64,
    /// First day the extreme was reached; `None` for averages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurred_on: Option<TradingDate>,
}

impl Aggregate {
    pub const ALL: [Self; 3] = [Self::Maximum, Self::Minimum, Self::Average];

    /// NLU intent that requests this statistic.
    pub const fn intent(self) -> &'static str {
        match self {
            Self::Maximum => "max_value",
            Self::Minimum => "min_value",
            Self::Average => "average_value",
        }
    }

    pub fn from_intent(intent: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|aggregate| aggregate.intent() == intent)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Maximum => "maximum",
            Self::Minimum => "minimum",
            Self::Average => "average",
        }
    }

    /// Fold the daily highs of `values`; `None` when `values` is empty.
    pub fn apply(self, values: &[DailyValue]) -> Option<AggregateValue> {
        let first = values.first()?;

        let (value, occurred_on) = match self {
            Self::Maximum => {
                let best = values
                    .iter()
                    .fold(first, |best, value| if value.high > best.high { value } else { best });
                (best.high, Some(best.date))
            }
            Self::Minimum => {
                let best = values
                    .iter()
                    .fold(first, |best, value| if value.high < best.high { value } else { best });
                (best.high, Some(best.date))
            }
            Self::Average => {
                let sum: f64 = values.iter().map(|value| value.high).sum();
                (sum / values.len() as f64, None)
            }
        };

        Some(AggregateValue {
            aggregate: self,
            value,
            occurred_on,
        })
    }
}

impl Display for Aggregate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(date: &str, high: f64) -> DailyValue {
        DailyValue::new(TradingDate::parse(date).expect("date"), high, high, high, high)
            .expect("value")
    }

    #[test]
    fn maximum_reports_first_day_of_peak() {
        let values = [
            value("2015-01-02", 10.0),
            value("2015-01-05", 12.5),
            value("2015-01-06", 12.5),
            value("2015-01-07", 11.0),
        ];
        let result = Aggregate::Maximum.apply(&values).expect("non-empty");
        assert_eq!(result.value, 12.5);
        assert_eq!(result.occurred_on, Some(TradingDate::parse("2015-01-05").expect("date")));
    }

    #[test]
    fn minimum_and_average_use_highs() {
        let values = [value("2015-01-02", 10.0), value("2015-01-05", 14.0)];
        assert_eq!(Aggregate::Minimum.apply(&values).expect("non-empty").value, 10.0);

        let average = Aggregate::Average.apply(&values).expect("non-empty");
        assert_eq!(average.value, 12.0);
        assert_eq!(average.occurred_on, None);
    }

    #[test]
    fn empty_series_has_no_aggregate() {
        assert_eq!(Aggregate::Maximum.apply(&[]), None);
    }

    #[test]
    fn intents_map_to_aggregates() {
        assert_eq!(Aggregate::from_intent("max_value"), Some(Aggregate::Maximum));
        assert_eq!(Aggregate::from_intent("min_value"), Some(Aggregate::Minimum));
        assert_eq!(Aggregate::from_intent("average_value"), Some(Aggregate::Average));
        assert_eq!(Aggregate::from_intent("greeting"), None);
    }
}
