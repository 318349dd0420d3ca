use serde::{Deserialize, Serialize};

/// Line counts for a single host log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostStats {
    /// Short hostname the log belongs to
    pub host: String,

    /// Lines read
    pub lines: usize,

    /// Lines that produced an ownership event
    pub events: usize,

    /// Lines without both marker phrases
    pub irrelevant_lines: usize,

    /// Relevant lines whose path is outside the monitored workspace
    pub ignored_paths: usize,
}

impl HostStats {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }
}

/// Totals for one audit run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub files: usize,
    pub lines: usize,
    pub events: usize,
    pub irrelevant_lines: usize,
    pub ignored_paths: usize,
    pub build_jobs: usize,
    pub deployments: usize,
}

impl RunStats {
    pub fn add_host(&mut self, host: &HostStats) {
        self.files += 1;
        self.lines += host.lines;
        self.events += host.events;
        self.irrelevant_lines += host.irrelevant_lines;
        self.ignored_paths += host.ignored_paths;
    }

    pub fn from_hosts<'a>(hosts: impl IntoIterator<Item = &'a HostStats>) -> Self {
        let mut stats = Self::default();
        for host in hosts {
            stats.add_host(host);
        }
        stats
    }
}
