use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cmdargs::value::trim;
use cmdargs::{ParsedResult, RawValue, parse_value};
use serde::Serialize;
use std::io::Write;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "cmdargs")]
#[command(version, about = "Inspect how an argument vector is classified", long_about = None)]
struct Cli {
    /// Print single-line JSON
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a full argument vector (executable, script, tokens...)
    Parse(ParseArgs),

    /// Parse a single option value
    Value(ValueArgs),

    /// Parse this process's own arguments
    Env(EnvArgs),
}

#[derive(Parser)]
struct ParseArgs {
    /// Treat ARGS as tokens only; this binary fills executable and script
    #[arg(long)]
    no_program: bool,

    /// Arguments to classify (put them after `--`)
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    argv: Vec<String>,
}

#[derive(Parser)]
struct ValueArgs {
    /// Raw option value, e.g. `port:3000,secure`
    #[arg(value_name = "RAW", allow_hyphen_values = true)]
    raw: String,
}

#[derive(Parser)]
struct EnvArgs {
    /// Anything; it shows up in the parsed tokens
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    rest: Vec<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse(args) => parse(args, cli.compact),
        Commands::Value(args) => value(args, cli.compact),
        Commands::Env(args) => env(args, cli.compact),
    }
}

fn parse(args: ParseArgs, compact: bool) -> Result<()> {
    tracing::debug!("executing parse command");

    let argv = if args.no_program {
        let exe = std::env::current_exe().context("failed to resolve current executable")?;
        let mut argv = vec![exe.display().to_string(), "parse".to_string()];
        argv.extend(args.argv);
        argv
    } else {
        args.argv
    };

    let parsed = ParsedResult::parse(&argv);
    if let Some(command) = parsed.command() {
        tracing::info!(command, "resolved command");
    }
    print_json(&parsed, compact)
}

fn value(args: ValueArgs, compact: bool) -> Result<()> {
    tracing::debug!("executing value command");
    print_json(&parse_value(RawValue::Text(trim(&args.raw))), compact)
}

fn env(args: EnvArgs, compact: bool) -> Result<()> {
    tracing::debug!(extra = args.rest.len(), "executing env command");
    let argv = from_subcommand(std::env::args().collect(), "env");
    print_json(&ParsedResult::parse(&argv), compact)
}

/// Drop the global flags between the program name and `subcommand`, so the
/// subcommand lands in the script slot.
fn from_subcommand(mut argv: Vec<String>, subcommand: &str) -> Vec<String> {
    if let Some(pos) = argv.iter().skip(1).position(|a| a == subcommand) {
        argv.drain(1..pos + 1);
    }
    argv
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let mut out = std::io::stdout().lock();
    if compact {
        serde_json::to_writer(&mut out, value)
    } else {
        serde_json::to_writer_pretty(&mut out, value)
    }
    .context("failed to encode JSON")?;
    writeln!(out).context("failed to write output")?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn global_flags_before_subcommand_are_dropped() {
        let out = from_subcommand(argv(&["cmdargs", "--compact", "env", "deploy"]), "env");
        assert_eq!(out, ["cmdargs", "env", "deploy"]);
    }

    #[test]
    fn argv_without_globals_is_unchanged() {
        let out = from_subcommand(argv(&["cmdargs", "env", "--compact", "env"]), "env");
        assert_eq!(out, ["cmdargs", "env", "--compact", "env"]);
    }
}
