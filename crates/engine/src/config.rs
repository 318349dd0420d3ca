use crate::error::{AuditError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

const MAX_READ_CONCURRENCY: usize = 32;
const DEFAULT_READ_CONCURRENCY: usize = 4;

pub const READ_CONCURRENCY_ENV: &str = "CHOWN_AUDIT_READ_CONCURRENCY";

/// Settings for one audit run, passed by reference through every stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Build-agent home; workspace-relative paths are computed against it
    pub agent_home: String,

    /// First segment below `agent_home` that holds build and deploy workspaces
    pub build_subtree: String,

    /// Phrase announcing an ownership change
    pub changed_marker: String,

    /// Phrase stating the change went from root to the service account
    pub ownership_marker: String,

    /// File name suffix shared by all per-host logs
    pub log_file_suffix: String,

    /// Local paths listed per identity before the rest is collapsed into a counter
    pub max_local_paths: usize,

    /// Host logs read in parallel
    pub read_concurrency: usize,

    /// Text the renderer shows in place of `agent_home`
    pub home_placeholder: String,

    /// Optional absolute prefix for build and deployment links
    pub link_base_url: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            agent_home: "/home/bamboo/bamboo-agent-home".to_string(),
            build_subtree: "xml-data".to_string(),
            changed_marker: "changed ownership of ".to_string(),
            ownership_marker: " from root:root to bamboo:bamboo".to_string(),
            log_file_suffix: "_bamboo-home-assets-chowned.log".to_string(),
            max_local_paths: 100,
            read_concurrency: DEFAULT_READ_CONCURRENCY,
            home_placeholder: "$BAMBOO_HOME".to_string(),
            link_base_url: String::new(),
        }
    }
}

impl AuditConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        log::debug!("Loaded audit config from {}", path.display());
        Self::from_toml_str(&raw)
    }

    /// Apply `CHOWN_AUDIT_READ_CONCURRENCY` when it is set.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        let raw = std::env::var(READ_CONCURRENCY_ENV).ok();
        self.read_concurrency = parse_read_concurrency(raw.as_deref(), self.read_concurrency);
        self
    }

    /// Absolute prefix (with trailing slash) every monitored path starts with.
    pub fn workspace_root(&self) -> String {
        format!(
            "{}/{}/",
            self.agent_home.trim_end_matches('/'),
            self.build_subtree.trim_matches('/')
        )
    }

    /// Prefix stripped from monitored paths to get `rel_path`.
    pub fn agent_home_prefix(&self) -> String {
        format!("{}/", self.agent_home.trim_end_matches('/'))
    }

    pub fn effective_read_concurrency(&self) -> usize {
        self.read_concurrency.clamp(1, MAX_READ_CONCURRENCY)
    }

    pub fn validate(&self) -> Result<()> {
        let agent_home = self.agent_home.trim_end_matches('/');
        if agent_home.is_empty() {
            return Err(AuditError::InvalidConfig(
                "agent_home must not be empty".to_string(),
            ));
        }
        if !agent_home.starts_with('/') {
            return Err(AuditError::InvalidConfig(format!(
                "agent_home must be absolute, got '{}'",
                self.agent_home
            )));
        }
        if self.build_subtree.trim_matches('/').is_empty() {
            return Err(AuditError::InvalidConfig(
                "build_subtree must not be empty".to_string(),
            ));
        }
        if self.changed_marker.is_empty() || self.ownership_marker.is_empty() {
            return Err(AuditError::InvalidConfig(
                "changed_marker and ownership_marker must not be empty".to_string(),
            ));
        }
        if self.log_file_suffix.is_empty() {
            return Err(AuditError::InvalidConfig(
                "log_file_suffix must not be empty".to_string(),
            ));
        }
        if self.max_local_paths == 0 {
            return Err(AuditError::InvalidConfig(
                "max_local_paths must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_read_concurrency(raw: Option<&str>, default_value: usize) -> usize {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default_value)
        .clamp(1, MAX_READ_CONCURRENCY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_agent_layout() {
        let config = AuditConfig::default();
        config.validate().expect("defaults are valid");
        assert_eq!(
            config.workspace_root(),
            "/home/bamboo/bamboo-agent-home/xml-data/"
        );
        assert_eq!(
            config.agent_home_prefix(),
            "/home/bamboo/bamboo-agent-home/"
        );
    }

    #[test]
    fn partial_toml_overrides_named_keys_only() {
        let config = AuditConfig::from_toml_str(
            r#"
agent_home = "/srv/agent/"
max_local_paths = 5
"#,
        )
        .expect("config");
        assert_eq!(config.agent_home, "/srv/agent/");
        assert_eq!(config.max_local_paths, 5);
        assert_eq!(config.build_subtree, "xml-data");
        assert_eq!(config.workspace_root(), "/srv/agent/xml-data/");
    }

    #[test]
    fn rejects_invalid_settings() {
        let err = AuditConfig::from_toml_str("max_local_paths = 0").unwrap_err();
        assert!(err.is_configuration_failure());

        let err = AuditConfig::from_toml_str("agent_home = \"relative/home\"").unwrap_err();
        assert!(err.to_string().contains("must be absolute"));

        let err = AuditConfig::from_toml_str("changed_marker = \"\"").unwrap_err();
        assert!(matches!(err, AuditError::InvalidConfig(_)));

        let err = AuditConfig::from_toml_str("max_local_paths = \"many\"").unwrap_err();
        assert!(matches!(err, AuditError::ConfigParse(_)));
    }

    #[test]
    fn parse_read_concurrency_defaults_and_clamps() {
        assert_eq!(parse_read_concurrency(None, 4), 4);
        assert_eq!(parse_read_concurrency(Some("   "), 4), 4);
        assert_eq!(parse_read_concurrency(Some("2"), 4), 2);
        assert_eq!(parse_read_concurrency(Some("0"), 4), 1);
        assert_eq!(parse_read_concurrency(Some("999"), 4), MAX_READ_CONCURRENCY);
        assert_eq!(parse_read_concurrency(Some("abc"), 4), 4);
        assert_eq!(parse_read_concurrency(Some(" 7 "), 4), 7);
    }
}
