use crate::config::AuditConfig;
use crate::error::{AuditError, Result};
use globset::{Glob, GlobMatcher};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Finds per-host ownership logs in a directory tree
pub struct LogScanner {
    root: PathBuf,
    matcher: GlobMatcher,
}

impl LogScanner {
    pub fn new(root: impl AsRef<Path>, config: &AuditConfig) -> Result<Self> {
        let pattern = format!("*{}", config.log_file_suffix);
        let matcher = Glob::new(&pattern)
            .map_err(|err| AuditError::InvalidConfig(format!("log file pattern: {err}")))?
            .compile_matcher();
        Ok(Self {
            root: root.as_ref().to_path_buf(),
            matcher,
        })
    }

    /// Scan for log files, sorted by path. Fails when the directory is missing or holds no logs.
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(AuditError::MissingInputDir {
                dir: self.root.clone(),
                hint: "were today's logs retrieved from the agents?".to_string(),
            });
        }

        let mut files = Vec::new();
        for result in WalkDir::new(&self.root).follow_links(true) {
            match result {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    if self.matcher.is_match(entry.file_name()) {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => log::warn!("Failed to read entry: {e}"),
            }
        }
        files.sort();

        if files.is_empty() {
            return Err(AuditError::NoLogFiles {
                dir: self.root.clone(),
            });
        }
        log::info!(
            "Found {} log files to parse in '{}'",
            files.len(),
            self.root.display()
        );
        Ok(files)
    }
}
