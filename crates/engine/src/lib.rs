//! # Chown Audit Engine
//!
//! Finds build jobs and deployments that leave root-owned files behind on build agents.
//!
//! Every agent runs a nightly `chown -v` over its workspace and logs each correction. This crate
//! turns those per-host logs into one record per offending build job or deployment.
//!
//! ## Pipeline
//!
//! ```text
//! Log directory
//!     │
//!     ├──> Log Scanner (*_bamboo-home-assets-chowned.log)
//!     │      └─> One file per agent
//!     │
//!     ├──> Host Log Reader (hostname from file name, bounded parallel reads)
//!     │      └─> Line Parser ──> Path Classifier
//!     │             └─> Ownership events
//!     │
//!     ├──> Aggregator (one record per identity key)
//!     │
//!     └──> Projection
//!            └─> Report rows
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use chown_audit_engine::{audit_dir, project, AuditConfig};
//!
//! #[tokio::main]
//! async fn main() -> chown_audit_engine::Result<()> {
//!     let config = AuditConfig::default();
//!     let audit = audit_dir("/tmp/240404_root-poisoning".as_ref(), &config).await?;
//!
//!     for row in project(&audit.aggregation, config.max_local_paths) {
//!         println!("{} on {}", row.identity_key(), row.hosts.join(", "));
//!     }
//!     Ok(())
//! }
//! ```

mod aggregate;
mod classify;
mod config;
mod dump;
mod error;
mod host;
mod parser;
mod pipeline;
mod report;
mod scanner;
mod stats;
mod types;

pub use aggregate::{aggregate, AggregatedRecord, Aggregation};
pub use classify::{classify, ClassifiedPath};
pub use config::{AuditConfig, READ_CONCURRENCY_ENV};
pub use dump::{
    event_dump_path, read_event_dump, write_event_dump, EventDump, EVENT_DUMP_FILE_NAME,
};
pub use error::{AuditError, Result};
pub use host::{host_from_log_path, read_host_lines, read_host_log, HostLog};
pub use parser::{inspect_line, parse_line, LineOutcome};
pub use pipeline::{audit_dir, collect_events, Audit, Collected};
pub use report::{project, CappedList, ReportRow};
pub use scanner::LogScanner;
pub use stats::{HostStats, RunStats};
pub use types::{hyphen_count, IdentityKind, OwnershipEvent};
