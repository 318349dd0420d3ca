use crate::aggregate::{aggregate, Aggregation};
use crate::config::AuditConfig;
use crate::error::{AuditError, Result};
use crate::host::{read_host_log, HostLog};
use crate::scanner::LogScanner;
use crate::stats::{HostStats, RunStats};
use crate::types::{IdentityKind, OwnershipEvent};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Events from every host log, in file order then line order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collected {
    pub events: Vec<OwnershipEvent>,
    pub hosts: Vec<HostStats>,
}

/// Result of a complete audit over a log directory.
#[derive(Debug, Clone)]
pub struct Audit {
    pub aggregation: Aggregation,
    pub hosts: Vec<HostStats>,
    pub stats: RunStats,
}

impl Audit {
    pub fn from_parts(aggregation: Aggregation, hosts: Vec<HostStats>) -> Self {
        let mut stats = RunStats::from_hosts(&hosts);
        stats.build_jobs = aggregation.count_kind(IdentityKind::BuildJob);
        stats.deployments = aggregation.count_kind(IdentityKind::Deployment);
        Self {
            aggregation,
            hosts,
            stats,
        }
    }
}

/// Read all host logs, at most `read_concurrency` at a time.
///
/// Merging follows the order of `files`, so the output is the same however reads interleave.
/// The first failing file aborts the remaining reads.
pub async fn collect_events(files: &[PathBuf], config: &AuditConfig) -> Result<Collected> {
    let config = Arc::new(config.clone());
    let permits = Arc::new(Semaphore::new(config.effective_read_concurrency()));

    let mut handles: Vec<JoinHandle<Result<HostLog>>> = Vec::with_capacity(files.len());
    for path in files {
        let path = path.clone();
        let config = Arc::clone(&config);
        let permits = Arc::clone(&permits);
        handles.push(tokio::spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|err| AuditError::ReadTask(err.to_string()))?;
            tokio::task::spawn_blocking(move || read_host_log(&path, &config))
                .await
                .map_err(|err| AuditError::ReadTask(err.to_string()))?
        }));
    }

    let mut collected = Collected::default();
    let mut pending = handles.into_iter();
    while let Some(handle) = pending.next() {
        let joined = handle
            .await
            .map_err(|err| AuditError::ReadTask(err.to_string()))
            .and_then(|result| result);
        match joined {
            Ok(log) => {
                collected.events.extend(log.events);
                collected.hosts.push(log.stats);
            }
            Err(err) => {
                for rest in pending.by_ref() {
                    rest.abort();
                }
                return Err(err);
            }
        }
    }

    log::info!(
        "Collected {} ownership events from {} host logs",
        collected.events.len(),
        collected.hosts.len()
    );
    Ok(collected)
}

/// Scan `logs_dir`, read every host log and aggregate the events.
pub async fn audit_dir(logs_dir: &Path, config: &AuditConfig) -> Result<Audit> {
    config.validate()?;
    let files = LogScanner::new(logs_dir, config)?.scan()?;
    let collected = collect_events(&files, config).await?;
    let aggregation = aggregate(collected.events)?;
    let audit = Audit::from_parts(aggregation, collected.hosts);
    log::info!(
        "Found {} unique build jobs and {} unique deployments",
        audit.stats.build_jobs,
        audit.stats.deployments
    );
    Ok(audit)
}
