use crate::config::AuditConfig;
use crate::error::{AuditError, Result};
use crate::parser::{inspect_line, LineOutcome};
use crate::stats::HostStats;
use crate::types::OwnershipEvent;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Events parsed from one host's log, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostLog {
    pub host: String,
    pub events: Vec<OwnershipEvent>,
    pub stats: HostStats,
}

/// Derive the short hostname from a log file name of the form
/// `<tag>_<host>{log_file_suffix}`, e.g. `todays_agent-7.example.net_bamboo-home-assets-chowned.log`.
pub fn host_from_log_path(path: &Path, config: &AuditConfig) -> Result<String> {
    let malformed = |reason: &str| AuditError::MalformedLogFileName {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| malformed("file name is not valid UTF-8"))?;
    let stem = file_name
        .strip_suffix(&config.log_file_suffix)
        .ok_or_else(|| malformed(&format!("expected suffix '{}'", config.log_file_suffix)))?;
    let (tag, host) = stem
        .split_once('_')
        .ok_or_else(|| malformed("expected '<tag>_<host>' before the suffix"))?;
    if tag.is_empty() {
        return Err(malformed("empty tag before the hostname"));
    }
    if host.contains('_') {
        return Err(malformed("hostname must not contain '_'"));
    }

    let short = host.split('.').next().unwrap_or_default();
    if short.is_empty() {
        return Err(malformed("empty hostname"));
    }
    Ok(short.to_string())
}

/// Read one host log file. The host is taken from the file name.
pub fn read_host_log(path: &Path, config: &AuditConfig) -> Result<HostLog> {
    let host = host_from_log_path(path, config)?;
    let file = File::open(path)?;
    log::debug!("Parsing {} as host {host}", path.display());
    read_host_lines(BufReader::new(file), &host, config)
}

/// Parse every line of `reader` on behalf of `host`.
pub fn read_host_lines<R: BufRead>(reader: R, host: &str, config: &AuditConfig) -> Result<HostLog> {
    let mut events = Vec::new();
    let mut stats = HostStats::new(host);

    // Paths in chown output are raw bytes; decode lossily instead of failing the file.
    for raw in reader.split(b'\n') {
        let raw = raw?;
        let line = String::from_utf8_lossy(&raw);
        stats.lines += 1;
        match inspect_line(&line, host, config)? {
            LineOutcome::Event(event) => {
                stats.events += 1;
                events.push(event);
            }
            LineOutcome::Irrelevant => stats.irrelevant_lines += 1,
            LineOutcome::Ignored { .. } => stats.ignored_paths += 1,
        }
    }

    log::debug!(
        "Host {host}: {} lines, {} events, {} irrelevant, {} ignored",
        stats.lines,
        stats.events,
        stats.irrelevant_lines,
        stats.ignored_paths
    );
    Ok(HostLog {
        host: host.to_string(),
        events,
        stats,
    })
}
