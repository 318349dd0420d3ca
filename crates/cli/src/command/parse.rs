use super::RunContext;
use anyhow::{Context, Result};
use chown_audit_engine::{
    aggregate, collect_events, event_dump_path, write_event_dump, Audit, EventDump, HostStats,
    LogScanner, RunStats,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
pub(crate) struct ParseSummary {
    pub todays_date: String,
    pub logs_dir: PathBuf,
    pub dump_path: PathBuf,
    pub stats: RunStats,
    pub hosts: Vec<HostStats>,
}

/// Parse every host log in `logs_dir` (default: today's work dir) into the event dump.
pub(crate) async fn run_parse(ctx: &RunContext, logs_dir: Option<&Path>) -> Result<ParseSummary> {
    ctx.work_dir.ensure()?;
    let logs_dir = logs_dir.unwrap_or(ctx.work_dir.path()).to_path_buf();

    let files = LogScanner::new(&logs_dir, &ctx.config)?.scan()?;
    let collected = collect_events(&files, &ctx.config).await?;

    // Surface integrity failures now instead of at report time.
    let aggregation = aggregate(collected.events.iter().cloned())?;
    let audit = Audit::from_parts(aggregation, collected.hosts.clone());

    let dump_path = event_dump_path(ctx.work_dir.path());
    let dump = EventDump {
        generated_for: ctx.work_dir.todays_date().to_string(),
        hosts: collected.hosts,
        events: collected.events,
    };
    write_event_dump(&dump_path, &dump)
        .await
        .with_context(|| format!("Failed to write {}", dump_path.display()))?;

    Ok(ParseSummary {
        todays_date: dump.generated_for,
        logs_dir,
        dump_path,
        stats: audit.stats,
        hosts: dump.hosts,
    })
}
