use stockask_warehouse::{PriceRecord, Warehouse, WarehouseError};
use tracing::warn;

use crate::lookup::{StoreError, ValueStore};
use crate::{DailyValue, Symbol, TradingDate, ValidationError};

impl From<WarehouseError> for StoreError {
    fn from(error: WarehouseError) -> Self {
        StoreError::new(error.to_string())
    }
}

impl ValueStore for Warehouse {
    fn values_in_range(
        &self,
        symbol: &Symbol,
        start: TradingDate,
        end: TradingDate,
    ) -> Result<Vec<DailyValue>, StoreError> {
        let records =
            self.prices_in_range(symbol.as_str(), &start.format_iso(), &end.format_iso())?;

        Ok(records
            .into_iter()
            .filter_map(|record| match daily_value(&record) {
                Ok(value) => Some(value),
                Err(error) => {
                    warn!(
                        symbol = %record.symbol,
                        date = %record.date,
                        %error,
                        "skipping invalid price row"
                    );
                    None
                }
            })
            .collect())
    }

    fn company_name(&self, symbol: &Symbol) -> Result<Option<String>, StoreError> {
        Ok(Warehouse::company_name(self, symbol.as_str())?)
    }
}

/// Convert a stored row into a validated [`DailyValue`].
pub fn daily_value(record: &PriceRecord) -> Result<DailyValue, ValidationError> {
    DailyValue::new(
        TradingDate::parse(&record.date)?,
        record.open,
        record.high,
        record.low,
        record.close,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_valid_rows_and_rejects_inverted_ones() {
        let mut record = PriceRecord {
            symbol: String::from("AAPL"),
            date: String::from("2015-01-02"),
            open: 111.39,
            high: 111.44,
            low: 107.35,
            close: 109.33,
        };
        let value = daily_value(&record).expect("valid row");
        assert_eq!(value.high, 111.44);

        record.low = 200.0;
        assert_eq!(daily_value(&record), Err(ValidationError::InvalidPriceRange));
    }
}
