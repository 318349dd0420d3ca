use crate::error::{AuditError, Result};
use crate::types::{hyphen_count, IdentityKind, OwnershipEvent};
use serde::{Deserialize, Serialize};
use std::collections::{btree_map, BTreeMap, BTreeSet};

/// All findings for one identity key across every host and log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedRecord {
    pub identity_key: String,
    pub identity_kind: IdentityKind,
    /// First-seen value; every later event must agree
    pub workspace_relative_path: String,
    /// Equal to `identity_key` for build jobs, otherwise empty
    pub build_job: String,
    /// Equal to `identity_key` for deployments, otherwise empty
    pub deployment: String,
    pub hosts: BTreeSet<String>,
    /// Task-local paths; the identity directory itself is not listed
    pub local_paths: BTreeSet<String>,
}

impl AggregatedRecord {
    fn seed(event: &OwnershipEvent) -> Self {
        let (build_job, deployment) = match event.identity_kind {
            IdentityKind::BuildJob => (event.identity_key.clone(), String::new()),
            IdentityKind::Deployment => (String::new(), event.identity_key.clone()),
            IdentityKind::Unknown => (String::new(), String::new()),
        };
        Self {
            identity_key: event.identity_key.clone(),
            identity_kind: event.identity_kind,
            workspace_relative_path: event.workspace_relative_path.clone(),
            build_job,
            deployment,
            hosts: BTreeSet::new(),
            local_paths: BTreeSet::new(),
        }
    }

    fn absorb(&mut self, event: OwnershipEvent) {
        self.hosts.insert(event.source_host);
        if !event.task_local_path.is_empty() {
            self.local_paths.insert(event.task_local_path);
        }
    }
}

/// Canonical records keyed by identity key.
///
/// Hosts and local paths are kept in sorted sets, so the result does not depend on the order
/// events arrive in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregation {
    records: BTreeMap<String, AggregatedRecord>,
}

impl Aggregation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one event into its record. Keys compare by exact string equality.
    pub fn add(&mut self, event: OwnershipEvent) -> Result<()> {
        if event.identity_kind == IdentityKind::Unknown {
            return Err(AuditError::ClassificationIntegrity {
                hyphens: hyphen_count(&event.identity_key),
                path: format!("{}/{}", event.workspace_relative_path, event.task_local_path),
                identity_key: event.identity_key,
                host: event.source_host,
            });
        }

        match self.records.entry(event.identity_key.clone()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(AggregatedRecord::seed(&event)).absorb(event);
            }
            btree_map::Entry::Occupied(mut slot) => {
                let record = slot.get_mut();
                if record.workspace_relative_path != event.workspace_relative_path {
                    return Err(AuditError::InconsistentWorkspacePath {
                        identity_key: event.identity_key,
                        first: record.workspace_relative_path.clone(),
                        conflicting: event.workspace_relative_path,
                    });
                }
                record.absorb(event);
            }
        }
        Ok(())
    }

    pub fn extend<I>(&mut self, events: I) -> Result<()>
    where
        I: IntoIterator<Item = OwnershipEvent>,
    {
        for event in events {
            self.add(event)?;
        }
        Ok(())
    }

    pub fn get(&self, identity_key: &str) -> Option<&AggregatedRecord> {
        self.records.get(identity_key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in identity-key order.
    pub fn records(&self) -> impl Iterator<Item = &AggregatedRecord> {
        self.records.values()
    }

    pub fn count_kind(&self, kind: IdentityKind) -> usize {
        self.records().filter(|r| r.identity_kind == kind).count()
    }
}

/// Build the canonical record table from a stream of events.
pub fn aggregate<I>(events: I) -> Result<Aggregation>
where
    I: IntoIterator<Item = OwnershipEvent>,
{
    let mut aggregation = Aggregation::new();
    aggregation.extend(events)?;
    Ok(aggregation)
}
