use serde::{Deserialize, Serialize};

/// Which kind of owner an identity key names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityKind {
    /// Plan-job key such as `PROJ-PLAN-JOB1`
    BuildJob,
    /// Deployment key such as `121667592-127238147`
    Deployment,
    /// Never leaves classification; see [`IdentityKind::from_key`]
    Unknown,
}

impl IdentityKind {
    /// Classify an identity key by counting its hyphens: one is a deployment, two is a build
    /// job, anything else is unknown.
    ///
    /// This is coupled to the agent's workspace naming. Keys are never checked against a
    /// registry of real plans or environments, so a naming change upstream shows up here as
    /// `Unknown` and has to stay fatal for the caller.
    #[must_use]
    pub fn from_key(identity_key: &str) -> Self {
        match hyphen_count(identity_key) {
            1 => Self::Deployment,
            2 => Self::BuildJob,
            _ => Self::Unknown,
        }
    }
}

#[must_use]
pub fn hyphen_count(identity_key: &str) -> usize {
    identity_key.matches('-').count()
}

/// One ownership correction attributed to a build job or deployment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnershipEvent {
    /// Root directory of the owning unit, relative to the agent home
    pub workspace_relative_path: String,

    pub identity_key: String,

    /// Always `BuildJob` or `Deployment` once the event exists
    pub identity_kind: IdentityKind,

    /// Path below the identity directory; empty for the directory itself
    pub task_local_path: String,

    /// Short hostname of the reporting agent
    pub source_host: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_hyphen_count() {
        assert_eq!(IdentityKind::from_key("DEP-456"), IdentityKind::Deployment);
        assert_eq!(
            IdentityKind::from_key("121667592-127238147"),
            IdentityKind::Deployment
        );
        assert_eq!(IdentityKind::from_key("ABC-DEF-123"), IdentityKind::BuildJob);
        assert_eq!(
            IdentityKind::from_key("BEXP-SAFEAUTO-JOB1"),
            IdentityKind::BuildJob
        );
        assert_eq!(IdentityKind::from_key("NOHYPHEN"), IdentityKind::Unknown);
        assert_eq!(IdentityKind::from_key("A-B-C-D"), IdentityKind::Unknown);
        assert_eq!(IdentityKind::from_key("--"), IdentityKind::BuildJob);
        assert_eq!(IdentityKind::from_key(""), IdentityKind::Unknown);
    }
}
