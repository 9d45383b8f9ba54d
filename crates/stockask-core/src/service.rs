use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::lookup::{lookup_value, LookupResult, ValueStore};
use crate::nlu::NluClient;
use crate::query::{Query, ValueQuery};
use crate::QueryError;

/// Outcome of one question.
///
/// `lookup` is `None` for range queries that name no company.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub query: Query,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup: Option<LookupResult>,
}

/// Runs a question through NLU, validation and, when a company is named,
/// the price lookup.
#[derive(Clone)]
pub struct QueryService {
    nlu: Arc<dyn NluClient>,
    store: Arc<dyn ValueStore>,
}

impl QueryService {
    pub fn new(nlu: Arc<dyn NluClient>, store: Arc<dyn ValueStore>) -> Self {
        Self { nlu, store }
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn ask(&self, text: &str) -> Result<Answer, QueryError> {
        let response = self.nlu.message(text).await?;
        debug!(entities = response.entities.len(), "nlu response received");

        let query = Query::from_response(&response)?;
        let lookup = match query.symbol() {
            Some(_) => {
                let request = query.value_request()?;
                Some(self.lookup(request).await?)
            }
            None => None,
        };

        Ok(Answer { query, lookup })
    }

    /// Store reads block, so they run on the blocking pool.
    async fn lookup(&self, request: ValueQuery) -> Result<LookupResult, QueryError> {
        let no_data = QueryError::NoDataFound {
            symbol: request.symbol.to_string(),
            start: request.start.to_string(),
            end: request.end.to_string(),
        };
        let store = Arc::clone(&self.store);

        match tokio::task::spawn_blocking(move || lookup_value(store.as_ref(), &request)).await {
            Ok(result) => result,
            Err(error) => {
                warn!(%error, "lookup task failed; treating as empty");
                Err(no_data)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::pin::Pin;

    use super::*;
    use crate::lookup::StoreError;
    use crate::nlu::{NluError, NluResponse};
    use crate::{DailyValue, Entity, InMemoryValueStore, Symbol, TradingDate};

    struct FixedNlu(NluResponse);

    impl NluClient for FixedNlu {
        fn message<'a>(
            &'a self,
            _text: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<NluResponse, NluError>> + Send + 'a>> {
            let response = self.0.clone();
            Box::pin(async move { Ok(response) })
        }
    }

    struct PanickingStore;

    impl ValueStore for PanickingStore {
        fn values_in_range(
            &self,
            _symbol: &Symbol,
            _start: TradingDate,
            _end: TradingDate,
        ) -> Result<Vec<DailyValue>, StoreError> {
            panic!("store crashed mid-read");
        }

        fn company_name(&self, _symbol: &Symbol) -> Result<Option<String>, StoreError> {
            Ok(None)
        }
    }

    fn day(input: &str) -> TradingDate {
        TradingDate::parse(input).expect("valid date")
    }

    fn aapl_2015() -> NluResponse {
        NluResponse::new("max of AAPL in 2015")
            .with_entity(Entity::Company, "AAPL")
            .with_entity(Entity::Date, "2015-01-01")
            .with_entity(Entity::Date, "2015-12-31")
    }

    #[tokio::test]
    async fn lookup_runs_against_the_store() {
        let symbol = Symbol::parse("AAPL").expect("symbol");
        let store = InMemoryValueStore::new().with_values(
            symbol,
            [DailyValue::new(day("2015-03-02"), 1.0, 4.0, 1.0, 2.0).expect("valid")],
        );
        let service = QueryService::new(Arc::new(FixedNlu(aapl_2015())), Arc::new(store));

        let answer = service.ask("max of AAPL in 2015").await.expect("answer");

        assert_eq!(answer.lookup.map(|lookup| lookup.aggregate.value), Some(4.0));
    }

    #[tokio::test]
    async fn crashed_store_read_is_no_data_found() {
        let service = QueryService::new(Arc::new(FixedNlu(aapl_2015())), Arc::new(PanickingStore));

        let err = service.ask("max of AAPL in 2015").await.expect_err("store crashed");

        assert_eq!(
            err,
            QueryError::NoDataFound {
                symbol: String::from("AAPL"),
                start: String::from("2015-01-01"),
                end: String::from("2015-12-31"),
            }
        );
    }
}
