use anyhow::{Context as AnyhowContext, Result};
use chown_audit_engine::AuditConfig;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::io;
use std::path::PathBuf;

use crate::command::{ParseSummary, ReportSummary, RunContext};
use crate::workdir::WorkDir;

mod command;
mod render;
mod workdir;

const DEFAULT_OUTPUT_DIR: &str = "/usr/share/nginx/html/static/root-poisoned";

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "chown-audit")]
#[command(
    about = "Report build jobs and deployments that leave root-owned files on build agents",
    long_about = "Reads the nightly ownership-correction logs of every build agent and reports \
                  which build jobs and deployments left root-owned files behind.\n\n\
                  Typical sequence:\n  \
                  chown-audit --tmp-dir /tmp/ci-health parse\n  \
                  chown-audit --tmp-dir /tmp/ci-health report --output-dir /usr/share/nginx/html/static/root-poisoned"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Working directory for raw reporting data
    #[arg(long, global = true, default_value = "tmp")]
    tmp_dir: PathBuf,

    /// Override today's date (YYMMDD) for back-fill/testing
    #[arg(long, global = true)]
    todays_date: Option<String>,

    /// TOML file overriding the default agent layout and markers
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Local paths listed per build job or deployment before collapsing the rest
    #[arg(long, global = true)]
    max_local_paths: Option<usize>,

    /// Host logs read in parallel (env: CHOWN_AUDIT_READ_CONCURRENCY)
    #[arg(long, global = true)]
    read_concurrency: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse today's agent logs into an event dump in the work dir
    Parse(ParseArgs),

    /// Generate today's HTML report from the event dump
    Report(ReportArgs),

    /// Parse and report in one pass
    Run(RunArgs),
}

#[derive(Args)]
struct ParseArgs {
    /// Directory holding the agent logs (defaults to today's work dir)
    #[arg(long)]
    logs_dir: Option<PathBuf>,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ReportArgs {
    /// Directory the report and its archive are written to
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct RunArgs {
    /// Directory holding the agent logs (defaults to today's work dir)
    #[arg(long)]
    logs_dir: Option<PathBuf>,

    /// Directory the report and its archive are written to
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = resolve_config(&cli)?;
    let work_dir = WorkDir::new(&cli.tmp_dir, cli.todays_date.as_deref())?;
    log::debug!("Temporary reports/data directory is {}", cli.tmp_dir.display());
    log::debug!("Today's date is '{}'", work_dir.todays_date());
    let ctx = RunContext { config, work_dir };

    match cli.command {
        Commands::Parse(args) => {
            let summary = command::run_parse(&ctx, args.logs_dir.as_deref()).await?;
            emit(&summary, args.json, describe_parse)?;
        }
        Commands::Report(args) => {
            let summary = command::run_report(&ctx, &args.output_dir).await?;
            emit(&summary, args.json, describe_report)?;
        }
        Commands::Run(args) => {
            let summary =
                command::run_full(&ctx, args.logs_dir.as_deref(), &args.output_dir).await?;
            emit(&summary, args.json, describe_report)?;
        }
    }

    Ok(())
}

/// Defaults, then `--config`, then the environment, then explicit flags.
fn resolve_config(cli: &Cli) -> Result<AuditConfig> {
    let mut config = match &cli.config {
        Some(path) => AuditConfig::load(path)
            .with_context(|| format!("Invalid config file {}", path.display()))?,
        None => AuditConfig::default(),
    }
    .with_env_overrides();

    if let Some(max) = cli.max_local_paths {
        config.max_local_paths = max;
    }
    if let Some(limit) = cli.read_concurrency {
        config.read_concurrency = limit;
    }
    config.validate()?;
    Ok(config)
}

fn emit<T: Serialize>(summary: &T, json: bool, describe: fn(&T) -> String) -> Result<()> {
    if json {
        print_stdout(&serde_json::to_string_pretty(summary)?)
    } else {
        print_stdout(&describe(summary))
    }
}

fn describe_parse(summary: &ParseSummary) -> String {
    let mut out = format!(
        "Parsed {} log files ({} lines, {} ownership events, {} ignored paths) in '{}'\n",
        summary.stats.files,
        summary.stats.lines,
        summary.stats.events,
        summary.stats.ignored_paths,
        summary.logs_dir.display()
    );
    out.push_str(&format!(
        "Found {} unique build jobs and {} unique deployments\n",
        summary.stats.build_jobs, summary.stats.deployments
    ));
    out.push_str(&format!(
        "Root-poisoning events dumped to '{}'",
        summary.dump_path.display()
    ));
    out
}

fn describe_report(summary: &ReportSummary) -> String {
    format!(
        "Wrote {} rows ({} build jobs, {} deployments) for {} to '{}', '{}' and '{}'",
        summary.rows,
        summary.stats.build_jobs,
        summary.stats.deployments,
        summary.todays_date,
        summary.files.index.display(),
        summary.files.archive_html.display(),
        summary.files.archive_json.display()
    )
}
