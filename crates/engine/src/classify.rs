use crate::config::AuditConfig;
use crate::types::IdentityKind;

/// Number of leading `rel_path` segments that make up an owning unit's directory:
/// subtree marker, subtree marker, identity key.
const UNIT_DEPTH: usize = 3;
const IDENTITY_SEGMENT: usize = UNIT_DEPTH - 1;

/// A monitored path split into its owning unit and the task-local remainder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedPath {
    pub identity_key: String,
    /// May be `Unknown`; callers must reject it
    pub identity_kind: IdentityKind,
    pub workspace_relative_path: String,
    pub task_local_path: String,
}

/// Split an absolute path under the monitored workspace into identity parts.
///
/// Returns `None` for paths outside `{agent_home}/{build_subtree}/` and for paths too shallow
/// to carry a non-empty identity segment.
#[must_use]
pub fn classify(absolute_path: &str, config: &AuditConfig) -> Option<ClassifiedPath> {
    if !absolute_path.starts_with(&config.workspace_root()) {
        return None;
    }
    let rel_path = absolute_path.strip_prefix(&config.agent_home_prefix())?;

    let mut segments = rel_path.splitn(UNIT_DEPTH + 1, '/');
    let unit: Vec<&str> = segments.by_ref().take(UNIT_DEPTH).collect();
    if unit.len() < UNIT_DEPTH {
        return None;
    }
    let task_local_path = segments.next().unwrap_or_default();
    let identity_key = unit[IDENTITY_SEGMENT];
    if identity_key.is_empty() {
        return None;
    }

    Some(ClassifiedPath {
        identity_key: identity_key.to_string(),
        identity_kind: IdentityKind::from_key(identity_key),
        workspace_relative_path: unit.join("/"),
        task_local_path: task_local_path.to_string(),
    })
}
