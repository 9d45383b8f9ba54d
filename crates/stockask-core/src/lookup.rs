//! Price retrieval and aggregation for a [`ValueQuery`].

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::query::ValueQuery;
use crate::{sort_by_date, AggregateValue, DailyValue, QueryError, Symbol, TradingDate};

/// Failure reported by a [`ValueStore`] backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("value store failure: {message}")]
pub struct StoreError {
    message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Read side of the price store.
pub trait ValueStore: Send + Sync {
    /// Daily values for `symbol` with `start <= date <= end`.
    fn values_in_range(
        &self,
        symbol: &Symbol,
        start: TradingDate,
        end: TradingDate,
    ) -> Result<Vec<DailyValue>, StoreError>;

    fn company_name(&self, symbol: &Symbol) -> Result<Option<String>, StoreError>;
}

/// Answer to a value query: the aggregate plus the series it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupResult {
    pub symbol: Symbol,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    pub start: TradingDate,
    pub end: TradingDate,
    pub aggregate: AggregateValue,
    pub points: usize,
    /// Oldest first.
    pub values: Vec<DailyValue>,
}

impl LookupResult {
    pub fn display_name(&self) -> &str {
        self.company_name.as_deref().unwrap_or("unknown")
    }
}

/// Fetch the range for `query` and fold it with the requested aggregate.
///
/// Store failures are logged and read as an empty range, so they surface as
/// [`QueryError::NoDataFound`].
pub fn lookup_value(
    store: &dyn ValueStore,
    query: &ValueQuery,
) -> Result<LookupResult, QueryError> {
    let mut values = match store.values_in_range(&query.symbol, query.start, query.end) {
        Ok(values) => values,
        Err(error) => {
            warn!(symbol = %query.symbol, %error, "price lookup failed; treating as empty");
            Vec::new()
        }
    };
    values.retain(|value| value.date >= query.start && value.date <= query.end);
    sort_by_date(&mut values);

    let Some(aggregate) = query.aggregate.apply(&values) else {
        return Err(QueryError::NoDataFound {
            symbol: query.symbol.to_string(),
            start: query.start.to_string(),
            end: query.end.to_string(),
        });
    };

    let company_name = store.company_name(&query.symbol).unwrap_or_else(|error| {
        warn!(symbol = %query.symbol, %error, "company name lookup failed");
        None
    });

    debug!(
        symbol = %query.symbol,
        points = values.len(),
        value = aggregate.value,
        "lookup complete"
    );

    Ok(LookupResult {
        symbol: query.symbol.clone(),
        company_name,
        start: query.start,
        end: query.end,
        aggregate,
        points: values.len(),
        values,
    })
}

/// In-process [`ValueStore`] for tests and fixtures.
#[derive(Debug, Clone, Default)]
pub struct InMemoryValueStore {
    values: BTreeMap<Symbol, Vec<DailyValue>>,
    names: BTreeMap<Symbol, String>,
    failing: bool,
}

impl InMemoryValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every read fails.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn with_values(
        mut self,
        symbol: Symbol,
        values: impl IntoIterator<Item = DailyValue>,
    ) -> Self {
        self.values.entry(symbol).or_default().extend(values);
        self
    }

    pub fn with_company(mut self, symbol: Symbol, name: impl Into<String>) -> Self {
        self.names.insert(symbol, name.into());
        self
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing {
            return Err(StoreError::new("store is offline"));
        }
        Ok(())
    }
}

impl ValueStore for InMemoryValueStore {
    fn values_in_range(
        &self,
        symbol: &Symbol,
        start: TradingDate,
        end: TradingDate,
    ) -> Result<Vec<DailyValue>, StoreError> {
        self.check()?;
        Ok(self
            .values
            .get(symbol)
            .map(|values| {
                values
                    .iter()
                    .filter(|value| value.date >= start && value.date <= end)
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn company_name(&self, symbol: &Symbol) -> Result<Option<String>, StoreError> {
        self.check()?;
        Ok(self.names.get(symbol).cloned())
    }
}
