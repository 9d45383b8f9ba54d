use serde_json::Value;
use stockask_core::Envelope;

use crate::cli::OutputFormat;
use crate::error::CliError;

pub fn render(
    envelope: &Envelope<Value>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            println!("{payload}");
        }
        OutputFormat::Table => print!("{}", render_table(envelope)?),
    }

    Ok(())
}

fn render_table(envelope: &Envelope<Value>) -> Result<String, CliError> {
    let mut lines = vec![
        format!("command     : {}", envelope.meta.command),
        format!("request_id  : {}", envelope.meta.request_id),
        format!("schema      : {}", envelope.meta.schema_version),
        format!("generated_at: {}", envelope.meta.generated_at),
        format!("latency_ms  : {}", envelope.meta.latency_ms),
    ];

    if !envelope.meta.warnings.is_empty() {
        lines.push(String::from("warnings:"));
        for warning in &envelope.meta.warnings {
            lines.push(format!("  - {warning}"));
        }
    }

    lines.push(String::from("data:"));
    let pretty_data = serde_json::to_string_pretty(&envelope.data)?;
    for line in pretty_data.lines() {
        lines.push(format!("  {line}"));
    }

    if !envelope.errors.is_empty() {
        lines.push(String::from("errors:"));
        for error in &envelope.errors {
            lines.push(format!("  - {}: {}", error.code, error.message));
        }
    }

    let mut table = lines.join("\n");
    table.push('\n');
    Ok(table)
}
