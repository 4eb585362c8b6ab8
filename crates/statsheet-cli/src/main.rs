use clap::{Parser, Subcommand, ValueEnum};
use statsheet_core::config::Config;
use statsheet_core::{AppError, AppResult, Language};
use std::path::PathBuf;
use std::process;

mod analyze;
mod logging;
mod output;
mod report;
mod request;

#[derive(Parser)]
#[command(name = "statsheet")]
#[command(about = "Statistical analysis of CSV/XLSX sheets with JSON, text and Word reports.")]
struct Cli {
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: String,

    #[arg(long, value_name = "FORMAT", default_value = "text")]
    log_format: String,

    /// Report language; overrides `report.language` from the config.
    #[arg(long, value_name = "LANG")]
    language: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one analysis and emit the JSON response.
    Analyze {
        #[arg(value_name = "SOURCE")]
        source: String,
        #[arg(long = "test", value_name = "KIND")]
        test: String,
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
        #[arg(long)]
        overwrite: bool,
    },
    /// Run one analysis and render it as a document.
    Report {
        #[arg(value_name = "SOURCE")]
        source: String,
        #[arg(long = "test", value_name = "KIND")]
        test: String,
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
        #[arg(long, value_name = "PATH")]
        out: PathBuf,
        #[arg(long, value_enum, default_value_t = ReportFormat::Docx)]
        format: ReportFormat,
        #[arg(long)]
        overwrite: bool,
    },
    /// Render a saved analysis response.
    Render {
        #[arg(value_name = "ANALYSIS_JSON")]
        analysis: PathBuf,
        #[arg(long, value_name = "PATH")]
        out: PathBuf,
        #[arg(long, value_enum, default_value_t = ReportFormat::Docx)]
        format: ReportFormat,
        #[arg(long)]
        overwrite: bool,
    },
    /// List supported analyses and their parameters.
    Tests,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Docx,
    Text,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("{}", err.report_line());
        process::exit(err.exit_code());
    }
}

fn run(cli: Cli) -> AppResult<()> {
    validate_log_level(&cli.log_level)?;
    validate_log_format(&cli.log_format)?;
    logging::init(&cli.log_level, &cli.log_format)?;

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(language) = &cli.language {
        config.report.language = parse_language(language)?;
    }

    match cli.command {
        Commands::Analyze {
            source,
            test,
            params,
            out,
            overwrite,
        } => analyze::analyze_command(&source, &test, &params, out, overwrite, &config),
        Commands::Report {
            source,
            test,
            params,
            out,
            format,
            overwrite,
        } => report::report_command(&source, &test, &params, &out, format, overwrite, &config),
        Commands::Render {
            analysis,
            out,
            format,
            overwrite,
        } => report::render_command(&analysis, &out, format, overwrite, &config),
        Commands::Tests => {
            print!("{}", analyze::list_tests());
            Ok(())
        }
    }
}

fn validate_log_level(value: &str) -> AppResult<()> {
    match value {
        "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
        _ => Err(AppError::usage(format!(
            "invalid --log-level '{value}'; expected error|warn|info|debug|trace"
        ))),
    }
}

fn validate_log_format(value: &str) -> AppResult<()> {
    match value {
        "text" | "json" => Ok(()),
        _ => Err(AppError::usage(format!(
            "invalid --log-format '{value}'; expected text|json"
        ))),
    }
}

fn parse_language(value: &str) -> AppResult<Language> {
    match value.to_ascii_lowercase().as_str() {
        "ar" => Ok(Language::Ar),
        "en" => Ok(Language::En),
        _ => Err(AppError::usage(format!(
            "invalid --language '{value}'; expected ar|en"
        ))),
    }
}
