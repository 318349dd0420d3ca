use crate::aggregate::{AggregatedRecord, Aggregation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A list cut to a maximum length, remembering how many items were left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CappedList {
    pub items: Vec<String>,
    pub more: usize,
}

impl CappedList {
    /// Keep the first `max` items in iteration order.
    pub fn capped<I>(items: I, max: usize) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut kept = Vec::new();
        let mut more = 0usize;
        for item in items {
            if kept.len() < max {
                kept.push(item);
            } else {
                more += 1;
            }
        }
        Self { items: kept, more }
    }

    pub fn is_truncated(&self) -> bool {
        self.more > 0
    }
}

impl fmt::Display for CappedList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.items.join(", "))?;
        if self.more > 0 {
            write!(f, "... ({} more)", self.more)?;
        }
        Ok(())
    }
}

/// One output row, columns in report order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    /// Raw identity key or empty
    pub build_job: String,
    /// Raw identity key or empty
    pub deployment: String,
    pub workspace_path: String,
    pub local_paths: CappedList,
    pub hosts: Vec<String>,
}

impl ReportRow {
    fn from_record(record: &AggregatedRecord, max_local_paths: usize) -> Self {
        Self {
            build_job: record.build_job.clone(),
            deployment: record.deployment.clone(),
            workspace_path: record.workspace_relative_path.clone(),
            local_paths: CappedList::capped(record.local_paths.iter().cloned(), max_local_paths),
            hosts: record.hosts.iter().cloned().collect(),
        }
    }

    /// The identity key this row was built from.
    pub fn identity_key(&self) -> &str {
        if self.build_job.is_empty() {
            &self.deployment
        } else {
            &self.build_job
        }
    }
}

/// Project the aggregation into report rows, one per identity key, in key order.
pub fn project(aggregation: &Aggregation, max_local_paths: usize) -> Vec<ReportRow> {
    aggregation
        .records()
        .map(|record| ReportRow::from_record(record, max_local_paths))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::types::{IdentityKind, OwnershipEvent};
    use pretty_assertions::assert_eq;

    fn event(key: &str, host: &str, local: &str) -> OwnershipEvent {
        OwnershipEvent {
            workspace_relative_path: format!("xml-data/build-dir/{key}"),
            identity_key: key.to_string(),
            identity_kind: IdentityKind::from_key(key),
            task_local_path: local.to_string(),
            source_host: host.to_string(),
        }
    }

    #[test]
    fn caps_local_paths_exactly() {
        let events = (0..150).map(|i| event("ABC-DEF-123", "agentA", &format!("f{i:03}")));
        let table = aggregate(events).unwrap();
        let rows = project(&table, 100);
        assert_eq!(rows.len(), 1);

        let paths = &rows[0].local_paths;
        assert_eq!(paths.items.len(), 100);
        assert_eq!(paths.more, 50);
        assert_eq!(paths.items.first().map(String::as_str), Some("f000"));
        assert_eq!(paths.items.last().map(String::as_str), Some("f099"));
        assert!(paths.to_string().ends_with("f099... (50 more)"));
    }

    #[test]
    fn at_cap_is_not_truncated() {
        let list = CappedList::capped(["a", "b"].map(String::from), 2);
        assert!(!list.is_truncated());
        assert_eq!(list.to_string(), "a, b");
    }

    #[test]
    fn rows_carry_raw_identifiers() {
        let table = aggregate(vec![
            event("DEP-456", "agentB", "sub/path.txt"),
            event("ABC-DEF-123", "agentB", "sub/path.txt"),
            event("ABC-DEF-123", "agentA", "sub/path.txt"),
        ])
        .unwrap();
        let rows = project(&table, 100);
        assert_eq!(
            rows,
            vec![
                ReportRow {
                    build_job: "ABC-DEF-123".to_string(),
                    deployment: String::new(),
                    workspace_path: "xml-data/build-dir/ABC-DEF-123".to_string(),
                    local_paths: CappedList {
                        items: vec!["sub/path.txt".to_string()],
                        more: 0,
                    },
                    hosts: vec!["agentA".to_string(), "agentB".to_string()],
                },
                ReportRow {
                    build_job: String::new(),
                    deployment: "DEP-456".to_string(),
                    workspace_path: "xml-data/build-dir/DEP-456".to_string(),
                    local_paths: CappedList {
                        items: vec!["sub/path.txt".to_string()],
                        more: 0,
                    },
                    hosts: vec!["agentB".to_string()],
                },
            ]
        );
        assert_eq!(rows[0].identity_key(), "ABC-DEF-123");
        assert_eq!(rows[1].identity_key(), "DEP-456");
    }
}
