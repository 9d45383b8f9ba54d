//! Turns NLU output into a validated [`Query`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::nlu::NluResponse;
use crate::{Aggregate, Entity, QueryError, Symbol, TradingDate};

/// Number of `sys-date` entities a query needs: one per end of the range.
pub const REQUIRED_DATES: usize = 2;

/// Validated interpretation of one user question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QueryRecord")]
pub struct Query {
    text: String,
    start: TradingDate,
    end: TradingDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    symbol: Option<Symbol>,
    aggregate: Aggregate,
}

/// Unchecked wire shape of a [`Query`].
#[derive(Deserialize)]
struct QueryRecord {
    text: String,
    start: TradingDate,
    end: TradingDate,
    #[serde(default)]
    symbol: Option<Symbol>,
    #[serde(default)]
    aggregate: Aggregate,
}

impl TryFrom<QueryRecord> for Query {
    type Error = QueryError;

    fn try_from(record: QueryRecord) -> Result<Self, Self::Error> {
        if record.start > record.end {
            return Err(QueryError::unknown(format!(
                "range starts {} after it ends {}",
                record.start, record.end
            )));
        }

        Ok(Self {
            text: record.text,
            start: record.start,
            end: record.end,
            symbol: record.symbol,
            aggregate: record.aggregate,
        })
    }
}

/// A query that names a company and can be answered from stored prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueQuery {
    pub symbol: Symbol,
    pub start: TradingDate,
    pub end: TradingDate,
    pub aggregate: Aggregate,
}

impl Query {
    pub fn from_response(response: &NluResponse) -> Result<Self, QueryError> {
        let raw_dates: Vec<&str> = response.values_of(Entity::Date).collect();
        if raw_dates.len() != REQUIRED_DATES {
            return Err(QueryError::unknown(format!(
                "expected {REQUIRED_DATES} dates, found {}",
                raw_dates.len()
            )));
        }

        let mut dates = raw_dates
            .iter()
            .map(|raw| {
                TradingDate::parse(raw)
                    .map_err(|_| QueryError::unknown(format!("unreadable date '{raw}'")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        dates.sort();
        let (start, end) = (dates[0], dates[1]);

        let symbol = response
            .values_of(Entity::Company)
            .next()
            .map(|raw| {
                Symbol::parse(raw)
                    .map_err(|e| QueryError::unknown(format!("invalid company '{raw}': {e}")))
            })
            .transpose()?;

        let aggregate = requested_aggregate(response);

        debug!(
            %start,
            %end,
            symbol = symbol.as_ref().map(Symbol::as_str),
            %aggregate,
            "query validated"
        );

        Ok(Self {
            text: response.text().to_owned(),
            start,
            end,
            symbol,
            aggregate,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn start(&self) -> TradingDate {
        self.start
    }

    pub const fn end(&self) -> TradingDate {
        self.end
    }

    pub fn symbol(&self) -> Option<&Symbol> {
        self.symbol.as_ref()
    }

    pub const fn aggregate(&self) -> Aggregate {
        self.aggregate
    }

    /// The company-scoped form of this query; fails when no company was named.
    pub fn value_request(&self) -> Result<ValueQuery, QueryError> {
        let symbol = self
            .symbol
            .clone()
            .ok_or_else(|| QueryError::unknown("no company"))?;

        Ok(ValueQuery {
            symbol,
            start: self.start,
            end: self.end,
            aggregate: self.aggregate,
        })
    }
}

/// Highest-confidence intent that names an aggregate; the earliest wins ties.
fn requested_aggregate(response: &NluResponse) -> Aggregate {
    let mut best: Option<(Aggregate, f64)> = None;
    for intent in &response.intents {
        let Some(aggregate) = Aggregate::from_intent(&intent.intent) else {
            continue;
        };
        if best.map_or(true, |(_, confidence)| intent.confidence > confidence) {
            best = Some((aggregate, intent.confidence));
        }
    }
    best.map(|(aggregate, _)| aggregate).unwrap_or_default()
}
