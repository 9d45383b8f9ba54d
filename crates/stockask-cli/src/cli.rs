//! CLI argument definitions for stockask.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ask` | Ask a question about historical prices |
//! | `import` | Load companies and daily prices from a JSON file |
//! | `favourites` | List, add, remove, or replay saved questions |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--quiet` | `false` | Hide the progress spinner |
//!
//! # Examples
//!
//! ```bash
//! stockask import prices.json
//! stockask ask "What was the maximum value of AAPL in 2015" --chart aapl.svg
//! stockask favourites run 0 --format table
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use stockask_core::chart::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use stockask_core::ChartSize;

/// Ask natural-language questions about historical stock prices.
#[derive(Debug, Parser)]
#[command(
    name = "stockask",
    author,
    version,
    about = "Ask natural-language questions about historical stock prices",
    long_about = "stockask sends a question to a Watson Assistant workspace, reads the dates and \
company it recognises, looks the prices up in a local DuckDB warehouse, and prints the answer. \
Pass --chart to also draw the series as an SVG line chart.\n\
\n\
NLU credentials come from STOCKASK_NLU_URL, STOCKASK_NLU_API_KEY and \
STOCKASK_NLU_WORKSPACE_ID (a .env file is read when present)."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Do not show the progress spinner.
    #[arg(long, short, global = true, default_value_t = false)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ask a question, e.g. "What was the maximum value of AAPL in 2015".
    Ask(AskArgs),
    /// Load companies and daily prices from a JSON file into the warehouse.
    Import(ImportArgs),
    /// Manage saved questions.
    Favourites(FavouritesArgs),
}

impl Command {
    /// Subcommand name recorded in the output envelope.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Ask(_) => "ask",
            Self::Import(_) => "import",
            Self::Favourites(args) => match args.command {
                FavouritesCommand::List => "favourites list",
                FavouritesCommand::Add { .. } => "favourites add",
                FavouritesCommand::Remove { .. } => "favourites remove",
                FavouritesCommand::Run { .. } => "favourites run",
            },
        }
    }
}

#[derive(Debug, Args)]
pub struct AskArgs {
    /// The question; several words are joined with spaces.
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,

    #[command(flatten)]
    pub chart: ChartArgs,

    /// Save the question as a favourite after asking it.
    #[arg(long, default_value_t = false)]
    pub save: bool,
}

impl AskArgs {
    pub fn question(&self) -> String {
        self.text.join(" ")
    }
}

#[derive(Debug, Clone, Args)]
pub struct ChartArgs {
    /// Write the price series as an SVG chart to this path.
    #[arg(long, value_name = "PATH")]
    pub chart: Option<PathBuf>,

    /// Chart width in pixels.
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    pub width: u32,

    /// Chart height in pixels.
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    pub height: u32,
}

impl ChartArgs {
    pub const fn size(&self) -> ChartSize {
        ChartSize {
            width: self.width,
            height: self.height,
        }
    }
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// JSON file with `companies` and `prices` arrays.
    pub file: PathBuf,

    /// Source label stored with every imported price row.
    #[arg(long, default_value = "import")]
    pub source: String,
}

#[derive(Debug, Args)]
pub struct FavouritesArgs {
    #[command(subcommand)]
    pub command: FavouritesCommand,
}

#[derive(Debug, Subcommand)]
pub enum FavouritesCommand {
    /// Show saved questions with their indices.
    List,
    /// Save a question without asking it.
    Add {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Delete the favourite at INDEX.
    Remove { index: usize },
    /// Ask the favourite at INDEX again.
    Run {
        index: usize,

        #[command(flatten)]
        chart: ChartArgs,
    },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ask_joins_words_and_defaults_chart_size() {
        let cli = Cli::try_parse_from([
            "stockask",
            "ask",
            "max",
            "of",
            "AAPL",
            "in",
            "2015",
            "--chart",
            "out.svg",
        ])
        .expect("valid arguments");

        let Command::Ask(args) = cli.command else {
            panic!("expected ask command");
        };
        assert_eq!(args.question(), "max of AAPL in 2015");
        assert_eq!(args.chart.chart, Some(PathBuf::from("out.svg")));
        assert_eq!(args.chart.size(), ChartSize::default());
        assert!(!args.save);
    }

    #[test]
    fn favourites_run_accepts_chart_options() {
        let cli = Cli::try_parse_from([
            "stockask",
            "--format",
            "table",
            "favourites",
            "run",
            "2",
            "--width",
            "640",
        ])
        .expect("valid arguments");

        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.command.name(), "favourites run");
        match cli.command {
            Command::Favourites(FavouritesArgs {
                command: FavouritesCommand::Run { index, chart },
            }) => {
                assert_eq!(index, 2);
                assert_eq!(chart.width, 640);
                assert_eq!(chart.height, DEFAULT_HEIGHT);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
