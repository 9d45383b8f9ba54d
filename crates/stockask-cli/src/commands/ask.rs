//! Ask a question and report the answer, optionally drawing a chart.

use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use serde_json::{json, Value};
use stockask_core::{
    Answer, ChartLayout, EnvelopeError, FavouriteStore, QueryError, QueryService, Warehouse,
    WarehouseConfig, WatsonAssistant, WatsonConfig,
};
use tracing::{debug, info, warn};

use crate::cli::{AskArgs, ChartArgs};
use crate::error::CliError;
use crate::spinner::Spinner;

use super::{CommandResult, Context};

pub async fn run(args: &AskArgs, context: &Context) -> Result<CommandResult, CliError> {
    let service = build_service(context)?;
    ask_and_save(service, args, context).await
}

/// Asks the question and, with `--save`, keeps it as a favourite once answered.
async fn ask_and_save(
    service: QueryService,
    args: &AskArgs,
    context: &Context,
) -> Result<CommandResult, CliError> {
    let question = args.question();
    let mut result = ask(service, &question, &args.chart, context.show_progress).await?;
    if !args.save {
        return Ok(result);
    }

    if !result.errors.is_empty() {
        return Ok(result.with_warning("question was not answered; not saved as a favourite"));
    }

    let mut favourites = FavouriteStore::in_home(&context.home)?;
    let index = favourites.add(&question)?;
    favourites.save()?;
    if let Value::Object(data) = &mut result.data {
        data.insert(String::from("saved_as"), json!(index));
    }

    Ok(result)
}

/// NLU adapter from the environment plus the warehouse under the home directory.
pub fn build_service(context: &Context) -> Result<QueryService, CliError> {
    let nlu = WatsonAssistant::new(WatsonConfig::from_env()?)?;
    let warehouse = Warehouse::open(WarehouseConfig::in_home(&context.home))?;
    Ok(QueryService::new(Arc::new(nlu), Arc::new(warehouse)))
}

/// Runs `question` on a background task while the spinner shows progress.
///
/// Unknown queries, missing data and NLU failures all come back as envelope
/// errors.
pub async fn ask(
    service: QueryService,
    question: &str,
    chart: &ChartArgs,
    show_progress: bool,
) -> Result<CommandResult, CliError> {
    let started = Instant::now();
    let loading = Arc::new(AtomicBool::new(false));
    let spinner = Spinner::start(Arc::clone(&loading), show_progress);

    let worker = tokio::spawn({
        let question = question.to_owned();
        async move { service.ask(&question).await }
    });
    let joined = worker.await;
    spinner.stop();

    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    match joined? {
        Ok(answer) => Ok(answered(question, &answer, chart)?.with_latency(latency_ms)),
        Err(error) => {
            if let QueryError::Nlu(cause) = &error {
                warn!(%cause, "nlu service failed");
            } else {
                debug!(code = error.code(), %error, "question could not be answered");
            }
            Ok(CommandResult::ok(json!({ "question": question }))
                .with_errors(vec![EnvelopeError::from(&error)])
                .with_latency(latency_ms))
        }
    }
}

fn answered(question: &str, answer: &Answer, chart: &ChartArgs) -> Result<CommandResult, CliError> {
    let mut warnings = Vec::new();
    let mut chart_path = None;

    if let Some(path) = &chart.chart {
        match &answer.lookup {
            Some(lookup) => {
                let layout = ChartLayout::for_lookup(lookup, chart.size())?;
                write_chart(path, &layout)?;
                info!(path = %path.display(), points = layout.points.len(), "chart written");
                chart_path = Some(path.display().to_string());
            }
            None => warnings.push(String::from("question names no company; chart skipped")),
        }
    }

    let data = json!({
        "question": question,
        "summary": summary(answer),
        "answer": serde_json::to_value(answer)?,
        "chart": chart_path,
    });

    Ok(CommandResult::ok(data).with_warnings(warnings))
}

fn summary(answer: &Answer) -> String {
    let query = &answer.query;
    match &answer.lookup {
        Some(lookup) => {
            let mut line = format!(
                "{} high of {} ({}) between {} and {}: {:.2}",
                lookup.aggregate.aggregate,
                lookup.symbol,
                lookup.display_name(),
                lookup.start,
                lookup.end,
                lookup.aggregate.value
            );
            if let Some(day) = lookup.aggregate.occurred_on {
                line.push_str(&format!(" on {}", day.format_chart()));
            }
            line
        }
        None => format!("date range {} to {}", query.start(), query.end()),
    }
}

fn write_chart(path: &Path, layout: &ChartLayout) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, layout.to_svg())?;
    Ok(())
}
