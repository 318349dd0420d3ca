mod parse;
mod report;

pub(crate) use parse::{run_parse, ParseSummary};
pub(crate) use report::{run_full, run_report, ReportSummary};

use crate::workdir::WorkDir;
use chown_audit_engine::AuditConfig;

/// Resolved settings shared by every subcommand.
pub(crate) struct RunContext {
    pub config: AuditConfig,
    pub work_dir: WorkDir,
}
