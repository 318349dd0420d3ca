use crate::error::{AuditError, Result};
use crate::stats::HostStats;
use crate::types::OwnershipEvent;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const EVENT_DUMP_FILE_NAME: &str = "todays_bamboo-home-assets-chowned.json";

/// Events of one day's logs, persisted between the parse and report stages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDump {
    /// Date tag (`%y%m%d`) the logs were collected for
    pub generated_for: String,
    #[serde(default)]
    pub hosts: Vec<HostStats>,
    pub events: Vec<OwnershipEvent>,
}

pub fn event_dump_path(work_dir: &Path) -> PathBuf {
    work_dir.join(EVENT_DUMP_FILE_NAME)
}

pub async fn write_event_dump(path: &Path, dump: &EventDump) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let bytes = serde_json::to_vec_pretty(dump)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

pub async fn read_event_dump(path: &Path) -> Result<EventDump> {
    if !path.exists() {
        return Err(AuditError::MissingEventDump {
            path: path.to_path_buf(),
            hint: "did you run `chown-audit parse`?".to_string(),
        });
    }
    let bytes = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
