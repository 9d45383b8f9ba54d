mod ask;
mod favourites;
mod import;

use std::path::PathBuf;

use serde_json::Value;
use stockask_core::{Envelope, EnvelopeError, EnvelopeMeta};
use uuid::Uuid;

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub home: PathBuf,
    pub show_progress: bool,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            home: stockask_warehouse::resolve_stockask_home(),
            show_progress: !cli.quiet,
        }
    }
}

#[derive(Debug)]
pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub latency_ms: u64,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
            latency_ms: 0,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_errors(mut self, errors: Vec<EnvelopeError>) -> Self {
        self.errors.extend(errors);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope<Value>, CliError> {
    let context = Context::from_cli(cli);

    let command_result = match &cli.command {
        Command::Ask(args) => ask::run(args, &context).await?,
        Command::Import(args) => import::run(args, &context)?,
        Command::Favourites(args) => favourites::run(args, &context).await?,
    };

    into_envelope(cli.command.name(), command_result)
}

fn into_envelope(command: &str, result: CommandResult) -> Result<Envelope<Value>, CliError> {
    let CommandResult {
        data,
        warnings,
        errors,
        latency_ms,
    } = result;

    let meta = EnvelopeMeta::new(command, Uuid::new_v4().to_string())?
        .with_latency_ms(latency_ms)
        .with_warnings(warnings);

    Ok(Envelope::new(meta, data).with_errors(errors))
}
