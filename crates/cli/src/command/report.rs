use super::RunContext;
use crate::render::{write_report, ReportFiles};
use anyhow::Result;
use chown_audit_engine::{
    aggregate, audit_dir, event_dump_path, project, read_event_dump, Audit, RunStats,
};
use chrono::Utc;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
pub(crate) struct ReportSummary {
    pub todays_date: String,
    pub rows: usize,
    pub stats: RunStats,
    pub files: ReportFiles,
}

/// Render today's event dump into `output_dir`.
pub(crate) async fn run_report(ctx: &RunContext, output_dir: &Path) -> Result<ReportSummary> {
    let dump = read_event_dump(&event_dump_path(ctx.work_dir.path())).await?;
    if dump.generated_for != ctx.work_dir.todays_date() {
        log::warn!(
            "Event dump was generated for '{}' but today's date is '{}'",
            dump.generated_for,
            ctx.work_dir.todays_date()
        );
    }
    let aggregation = aggregate(dump.events)?;
    publish(ctx, Audit::from_parts(aggregation, dump.hosts), output_dir)
}

/// Parse and render in one pass, without an intermediate dump.
pub(crate) async fn run_full(
    ctx: &RunContext,
    logs_dir: Option<&Path>,
    output_dir: &Path,
) -> Result<ReportSummary> {
    let logs_dir = logs_dir.unwrap_or(ctx.work_dir.path());
    let audit = audit_dir(logs_dir, &ctx.config).await?;
    publish(ctx, audit, output_dir)
}

fn publish(ctx: &RunContext, audit: Audit, output_dir: &Path) -> Result<ReportSummary> {
    let rows = project(&audit.aggregation, ctx.config.max_local_paths);
    log::debug!(
        "Found {} unique build jobs and {} unique deployments",
        audit.stats.build_jobs,
        audit.stats.deployments
    );
    let files = write_report(
        output_dir,
        &rows,
        &ctx.config,
        ctx.work_dir.todays_date(),
        Utc::now(),
    )?;
    Ok(ReportSummary {
        todays_date: ctx.work_dir.todays_date().to_string(),
        rows: rows.len(),
        stats: audit.stats,
        files,
    })
}
