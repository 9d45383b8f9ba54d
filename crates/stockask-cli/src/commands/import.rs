//! Load a JSON price file into the warehouse.

use std::fs;

use serde::{Deserialize, Serialize};
use serde_json::json;
use stockask_core::{daily_value, CompanyRecord, PriceRecord, Symbol, Warehouse, WarehouseConfig};
use tracing::warn;

use crate::cli::ImportArgs;
use crate::error::CliError;

use super::{CommandResult, Context};

#[derive(Debug, Default, Deserialize)]
struct ImportFile {
    #[serde(default)]
    companies: Vec<CompanyRecord>,
    #[serde(default)]
    prices: Vec<PriceRecord>,
}

#[derive(Debug, Serialize)]
struct ImportSummary {
    companies: usize,
    prices: usize,
    skipped: usize,
    symbols: Vec<String>,
}

pub fn run(args: &ImportArgs, context: &Context) -> Result<CommandResult, CliError> {
    let raw = fs::read_to_string(&args.file)?;
    let file: ImportFile = serde_json::from_str(&raw)?;
    let warehouse = Warehouse::open(WarehouseConfig::in_home(&context.home))?;

    let (summary, warnings) = import(&warehouse, &args.source, file)?;
    Ok(CommandResult::ok(json!({
        "file": args.file.display().to_string(),
        "imported": serde_json::to_value(summary)?,
    }))
    .with_warnings(warnings))
}

fn import(
    warehouse: &Warehouse,
    source: &str,
    file: ImportFile,
) -> Result<(ImportSummary, Vec<String>), CliError> {
    let mut warnings = Vec::new();

    let mut companies = Vec::with_capacity(file.companies.len());
    for company in file.companies {
        match Symbol::parse(&company.symbol) {
            Ok(symbol) => companies.push(CompanyRecord {
                symbol: symbol.to_string(),
                name: company.name,
            }),
            Err(error) => warnings.push(format!("company '{}' skipped: {error}", company.symbol)),
        }
    }

    let mut prices = Vec::with_capacity(file.prices.len());
    let mut skipped = 0;
    for record in file.prices {
        let checked = Symbol::parse(&record.symbol)
            .map_err(|error| error.to_string())
            .and_then(|symbol| {
                daily_value(&record)
                    .map(|value| (symbol, value))
                    .map_err(|error| error.to_string())
            });
        match checked {
            Ok((symbol, value)) => prices.push(PriceRecord {
                symbol: symbol.to_string(),
                date: value.date.format_iso(),
                ..record
            }),
            Err(reason) => {
                warn!(symbol = %record.symbol, date = %record.date, %reason, "price row skipped");
                warnings.push(format!(
                    "price {} {} skipped: {reason}",
                    record.symbol, record.date
                ));
                skipped += 1;
            }
        }
    }

    let company_count = warehouse.upsert_companies(&companies)?;
    let price_count = warehouse.ingest_prices(source, &prices)?;

    let mut symbols: Vec<String> = prices.iter().map(|row| row.symbol.clone()).collect();
    symbols.sort();
    symbols.dedup();

    Ok((
        ImportSummary {
            companies: company_count,
            prices: price_count,
            skipped,
            symbols,
        },
        warnings,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_symbols_and_skips_invalid_rows() {
        let temp = tempfile::tempdir().expect("tempdir");
        let warehouse = Warehouse::open(WarehouseConfig::in_home(temp.path())).expect("warehouse");
        let file: ImportFile = serde_json::from_str(
            r#"{
                "companies": [{"symbol": "aapl", "name": "Apple Inc."}],
                "prices": [
                    {"symbol": "aapl", "date": "2015-01-02", "open": 111.39, "high": 111.44, "low": 107.35, "close": 109.33},
                    {"symbol": "AAPL", "date": "2015-01-05", "open": 108.29, "high": 100.0, "low": 105.41, "close": 106.25},
                    {"symbol": "", "date": "2015-01-06", "open": 1.0, "high": 1.0, "low": 1.0, "close": 1.0}
                ]
            }"#,
        )
        .expect("valid file");

        let (summary, warnings) = import(&warehouse, "test", file).expect("import");
        assert_eq!(summary.companies, 1);
        assert_eq!(summary.prices, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.symbols, vec![String::from("AAPL")]);
        assert_eq!(warnings.len(), 2);

        assert_eq!(
            warehouse.company_name("AAPL").expect("lookup"),
            Some(String::from("Apple Inc."))
        );
        assert_eq!(
            warehouse
                .prices_in_range("AAPL", "2015-01-01", "2015-01-31")
                .expect("range")
                .len(),
            1
        );
    }
}
