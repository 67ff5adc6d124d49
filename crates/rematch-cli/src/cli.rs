//! Command dispatch for the `rematch` entrypoint.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use eyre::{Context, Result};
use rematch::{Expression, TextIndex, find_all};
use tracing::{debug, error, info};

use crate::config::{CliConfig, LogLevel, OutputFormat};
use crate::demo::{SAMPLE_EXPRESSIONS, SAMPLE_TEXT};
use crate::error::ConfigError;
use crate::logging::init_logging;
use crate::output::{MatchReport, write_json, write_match, write_rpn};

/// Match boolean word and wildcard expressions against text.
#[derive(Parser, Debug)]
#[command(name = "rematch", author, version, about)]
pub(crate) struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,
    #[command(subcommand)]
    command: Commands,
}

/// Supported commands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Compile an expression and print its RPN form.
    Compile(CompileArgs),
    /// Evaluate expressions against a text.
    Find(FindArgs),
    /// Evaluate the bundled sample expressions against the sample text.
    Demo(DemoArgs),
}

#[derive(Args, Debug)]
pub(crate) struct CompileArgs {
    /// Expression to compile.
    expr: String,
    /// Emit the serialized expression as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct FindArgs {
    /// Expressions to evaluate.
    #[arg(required = true)]
    exprs: Vec<String>,
    /// Text to search; stdin is read when neither this nor `--file` is given.
    #[arg(long, conflicts_with = "file")]
    text: Option<String>,
    /// File holding the text to search.
    #[arg(long)]
    file: Option<PathBuf>,
    /// Emit one JSON object per expression.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Emit one JSON object per expression.
    #[arg(long)]
    json: bool,
}

impl Commands {
    fn format_override(&self) -> Option<OutputFormat> {
        let json = match self {
            Self::Compile(args) => args.json,
            Self::Find(args) => args.json,
            Self::Demo(args) => args.json,
        };
        json.then_some(OutputFormat::Json)
    }
}

fn build_config(cli: &Cli) -> Result<CliConfig, ConfigError> {
    let config = CliConfig::from_env()?;
    Ok(config.apply_overrides(cli.log_level, cli.command.format_override()))
}

/// Configuration used to report a configuration failure.
fn fallback_config(cli: &Cli) -> CliConfig {
    CliConfig::default().with_log_level(cli.log_level.unwrap_or(LogLevel::Error))
}

/// Parse the command line, initialise logging, and run the chosen command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, an expression fails to
/// compile or evaluate, or input cannot be read.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            init_logging(&fallback_config(&cli));
            error!(error = %err, "invalid configuration");
            return Err(err.into());
        }
    };
    init_logging(&config);
    debug!(?config, "configuration loaded");

    let mut stdout = io::stdout().lock();
    execute(&cli.command, config.format, &mut io::stdin().lock(), &mut stdout)?;
    stdout.flush().wrap_err("failed to flush output")
}

fn execute(
    command: &Commands,
    format: OutputFormat,
    input: &mut dyn Read,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Commands::Compile(args) => handle_compile(args, format, out),
        Commands::Find(args) => handle_find(args, format, input, out),
        Commands::Demo(_) => handle_demo(format, out),
    }
}

fn handle_compile(args: &CompileArgs, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    let expr: Expression = args
        .expr
        .parse()
        .wrap_err_with(|| format!("failed to compile expression '{}'", args.expr))?;
    info!(expr = expr.raw(), tokens = expr.rpn().len(), "compiled expression");
    match format {
        OutputFormat::Text => write_rpn(out, &expr),
        OutputFormat::Json => write_json(out, &expr),
    }
}

fn handle_find(
    args: &FindArgs,
    format: OutputFormat,
    input: &mut dyn Read,
    out: &mut dyn Write,
) -> Result<()> {
    let text = TextIndex::new(read_text(args, input)?);
    debug!(words = text.word_count(), "indexed text");
    let exprs: Vec<Expression> = args.exprs.iter().map(Expression::new).collect();
    evaluate_all(&exprs, &text, format, out)
}

fn handle_demo(format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    let text = TextIndex::new(SAMPLE_TEXT);
    let exprs: Vec<Expression> = SAMPLE_EXPRESSIONS
        .iter()
        .map(|(raw, _)| Expression::new(*raw))
        .collect();
    evaluate_all(&exprs, &text, format, out)
}

fn read_text(args: &FindArgs, input: &mut dyn Read) -> Result<String> {
    if let Some(text) = &args.text {
        return Ok(text.clone());
    }
    if let Some(path) = &args.file {
        return fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read text from {}", path.display()));
    }
    let mut text = String::new();
    input
        .read_to_string(&mut text)
        .wrap_err("failed to read text from stdin")?;
    Ok(text)
}

fn evaluate_all(
    exprs: &[Expression],
    text: &TextIndex,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    for expr in exprs {
        let result = find_all(expr, text)
            .wrap_err_with(|| format!("failed to evaluate expression '{}'", expr.raw()))?;
        info!(
            expr = expr.raw(),
            matched = result.matched,
            strings = result.strings.len(),
            "evaluated expression"
        );
        match format {
            OutputFormat::Text => write_match(out, expr, &result)?,
            OutputFormat::Json => write_json(out, &MatchReport::new(expr, &result))?,
        }
    }
    Ok(())
}
