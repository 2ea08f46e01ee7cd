mod check;
mod definitions;

use anyhow::{Context, Result, bail};
use argot_parse::{ParseOptions, parse, split_command};
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "argot")]
#[command(version, about = "Parse command lines against JSON option definitions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse ARGV and print the result as JSON
    Parse(ParseArgs),

    /// Split a leading command off ARGV
    Split(SplitArgs),

    /// Validate a definitions file
    Check(CheckArgs),
}

#[derive(Parser)]
struct ParseArgs {
    /// Path to the definitions JSON file
    #[arg(short, long, value_name = "FILE")]
    definitions: PathBuf,

    /// Collect unknown options and values into `_unknown`
    #[arg(long)]
    partial: bool,

    /// Pass everything after the first unknown token through to `_unknown`
    #[arg(long)]
    stop_at_first_unknown: bool,

    /// Camel-case option names in the output
    #[arg(long)]
    camel_case: bool,

    /// Match option names and aliases ignoring case
    #[arg(long)]
    case_insensitive: bool,

    /// Arguments to parse
    #[arg(last = true, value_name = "ARGV")]
    argv: Vec<String>,
}

#[derive(Parser)]
struct SplitArgs {
    /// Recognised command name (repeatable)
    #[arg(short, long = "command", value_name = "NAME")]
    commands: Vec<String>,

    /// Accept ARGV that does not start with a command
    #[arg(long)]
    allow_none: bool,

    /// Arguments to split
    #[arg(last = true, value_name = "ARGV")]
    argv: Vec<String>,
}

#[derive(Parser)]
struct CheckArgs {
    /// Path to the definitions JSON file
    #[arg(short, long, value_name = "FILE")]
    definitions: PathBuf,

    /// Output the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse(args) => parse_command(args),
        Commands::Split(args) => split(args),
        Commands::Check(args) => check_command(args),
    }
}

fn parse_command(args: ParseArgs) -> Result<()> {
    tracing::debug!("executing parse command");

    let file = definitions::load(&args.definitions)?;
    let options = ParseOptions {
        partial: args.partial,
        stop_at_first_unknown: args.stop_at_first_unknown,
        camel_case: args.camel_case,
        case_insensitive: args.case_insensitive,
    };

    if file.commands.is_empty() {
        let defs = definitions::option_set(&file, None);
        let result = parse(&defs, &args.argv, &options).context("failed to parse arguments")?;
        print_json(&result.to_json())?;
        return Ok(());
    }

    let mut known: Vec<Option<&str>> = file.command_names().into_iter().map(Some).collect();
    if file.allow_no_command {
        known.push(None);
    }
    let token = split_command(&known, &args.argv).context("failed to resolve command")?;
    let command = match token.command.as_deref() {
        Some(name) => match file.find_command(name) {
            Some(cmd) => Some(cmd),
            None => bail!("command '{name}' has no definition"),
        },
        None => None,
    };
    tracing::debug!(command = ?command.map(|c| &c.name), "resolved command");

    let defs = definitions::option_set(&file, command);
    let result = parse(&defs, &token.argv, &options).context("failed to parse arguments")?;
    print_json(&json!({
        "command": command.map(|c| c.name.clone()),
        "options": result.to_json(),
    }))
}

fn split(args: SplitArgs) -> Result<()> {
    tracing::debug!("executing split command");

    let mut known: Vec<Option<&str>> = args.commands.iter().map(|c| Some(c.as_str())).collect();
    if args.allow_none {
        known.push(None);
    }
    let token = split_command(&known, &args.argv).context("failed to split command")?;
    print_json(&json!({
        "command": token.command,
        "argv": token.argv,
    }))
}

fn check_command(args: CheckArgs) -> Result<()> {
    tracing::debug!("executing check command");

    let file = definitions::load(&args.definitions)?;
    let report = check::check_definitions(&file, &args.definitions.display().to_string());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        eprintln!("Definitions: {}", report.definitions);
        eprintln!("Options: {}", report.options);
        for cmd in &report.commands {
            let status = if cmd.error.is_some() { "invalid" } else { "ok" };
            eprintln!("  {} ({} options): {status}", cmd.name, cmd.options);
        }
        for err in &report.errors {
            eprintln!("  - {err}");
        }
    }

    if !report.valid {
        if args.json {
            std::process::exit(1);
        }
        bail!("definitions file has {} error(s)", report.errors.len());
    }
    if !args.json {
        eprintln!("OK: definitions are valid");
    }
    Ok(())
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
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
