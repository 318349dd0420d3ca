use crate::classify::classify;
use crate::config::AuditConfig;
use crate::error::{AuditError, Result};
use crate::types::{hyphen_count, IdentityKind, OwnershipEvent};

const PATH_QUOTES: &[char] = &['\'', '‘', '’'];

/// What a single log line amounts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Event(OwnershipEvent),
    /// Missing one of the marker phrases
    Irrelevant,
    /// Relevant line whose path is not part of a build or deploy workspace
    Ignored { path: String },
}

/// Parse one line into an event, dropping irrelevant and ignored lines.
pub fn parse_line(line: &str, host: &str, config: &AuditConfig) -> Result<Option<OwnershipEvent>> {
    match inspect_line(line, host, config)? {
        LineOutcome::Event(event) => Ok(Some(event)),
        LineOutcome::Irrelevant | LineOutcome::Ignored { .. } => Ok(None),
    }
}

/// Parse one line and report why it did not produce an event.
///
/// Fails only when the path is inside the workspace but its identity key has an unexpected
/// hyphen count.
pub fn inspect_line(line: &str, host: &str, config: &AuditConfig) -> Result<LineOutcome> {
    let Some(path) = extract_path(line, config) else {
        log::debug!("Skipped irrelevant line on {host}: {line}");
        return Ok(LineOutcome::Irrelevant);
    };

    let Some(classified) = classify(path, config) else {
        log::warn!("Ignored non-build plan file '{path}' on {host}");
        return Ok(LineOutcome::Ignored {
            path: path.to_string(),
        });
    };

    if classified.identity_kind == IdentityKind::Unknown {
        return Err(AuditError::ClassificationIntegrity {
            hyphens: hyphen_count(&classified.identity_key),
            identity_key: classified.identity_key,
            path: path.to_string(),
            host: host.to_string(),
        });
    }

    Ok(LineOutcome::Event(OwnershipEvent {
        workspace_relative_path: classified.workspace_relative_path,
        identity_key: classified.identity_key,
        identity_kind: classified.identity_kind,
        task_local_path: classified.task_local_path,
        source_host: host.to_string(),
    }))
}

/// Path between the two marker phrases, unquoted.
fn extract_path<'a>(line: &'a str, config: &AuditConfig) -> Option<&'a str> {
    let line = line.trim();
    if !line.contains(&config.changed_marker) || !line.contains(&config.ownership_marker) {
        return None;
    }
    let (_, after_changed) = line.rsplit_once(&config.changed_marker)?;
    let path = after_changed
        .split_once(&config.ownership_marker)
        .map_or(after_changed, |(path, _)| path);
    Some(path.trim_matches(PATH_QUOTES))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn line_for(path: &str) -> String {
        format!("changed ownership of '{path}' from root:root to bamboo:bamboo")
    }

    fn inspect(line: &str) -> Result<LineOutcome> {
        inspect_line(line, "agent-1", &AuditConfig::default())
    }

    #[test]
    fn parses_build_job_line() {
        let line = line_for(
            "/home/bamboo/bamboo-agent-home/xml-data/build-dir/BEXP-SAFEAUTO-JOB1/automation/build/reports",
        );
        let event = parse_line(&line, "agent-1", &AuditConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(
            event,
            OwnershipEvent {
                workspace_relative_path: "xml-data/build-dir/BEXP-SAFEAUTO-JOB1".to_string(),
                identity_key: "BEXP-SAFEAUTO-JOB1".to_string(),
                identity_kind: IdentityKind::BuildJob,
                task_local_path: "automation/build/reports".to_string(),
                source_host: "agent-1".to_string(),
            }
        );
    }

    #[test]
    fn accepts_double_quoted_lines_and_curly_quotes() {
        let line = "\"changed ownership of ‘/home/bamboo/bamboo-agent-home/xml-data/build-dir/121667587-121602106/deployment.vars’ from root:root to bamboo:bamboo\"\n";
        let LineOutcome::Event(event) = inspect(line).unwrap() else {
            panic!("expected event");
        };
        assert_eq!(event.identity_kind, IdentityKind::Deployment);
        assert_eq!(event.task_local_path, "deployment.vars");
    }

    #[test]
    fn lines_missing_a_marker_are_irrelevant() {
        assert_eq!(inspect("").unwrap(), LineOutcome::Irrelevant);
        assert_eq!(
            inspect("ownership of '/home/bamboo/x' retained as bamboo:bamboo").unwrap(),
            LineOutcome::Irrelevant
        );
        assert_eq!(
            inspect("changed ownership of '/home/bamboo/bamboo-agent-home/xml-data/build-dir/A-B/x' from bamboo:root to bamboo:bamboo").unwrap(),
            LineOutcome::Irrelevant
        );
    }

    #[test]
    fn paths_outside_workspace_are_ignored() {
        let outcome = inspect(&line_for("/home/bamboo/.gradle/caches/file.lock")).unwrap();
        assert_eq!(
            outcome,
            LineOutcome::Ignored {
                path: "/home/bamboo/.gradle/caches/file.lock".to_string()
            }
        );
    }

    #[test]
    fn empty_identity_segment_is_ignored_not_fatal() {
        let path = "/home/bamboo/bamboo-agent-home/xml-data/build-dir/";
        assert_eq!(
            inspect(&line_for(path)).unwrap(),
            LineOutcome::Ignored {
                path: path.to_string()
            }
        );
    }

    #[test]
    fn unexpected_hyphen_count_is_fatal() {
        let err = inspect(&line_for(
            "/home/bamboo/bamboo-agent-home/xml-data/build-dir/NOHYPHEN/x",
        ))
        .unwrap_err();
        match err {
            AuditError::ClassificationIntegrity {
                identity_key,
                host,
                hyphens,
                ..
            } => {
                assert_eq!(identity_key, "NOHYPHEN");
                assert_eq!(host, "agent-1");
                assert_eq!(hyphens, 0);
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = inspect(&line_for(
            "/home/bamboo/bamboo-agent-home/xml-data/build-dir/A-B-C-D/x",
        ))
        .unwrap_err();
        assert!(err.is_integrity_failure());
    }

    #[test]
    fn uses_last_changed_marker_and_first_ownership_marker() {
        let line = format!(
            "changed ownership of junk {} from root:root to bamboo:bamboo trailer",
            line_for("/home/bamboo/bamboo-agent-home/xml-data/build-dir/A-B/p")
        );
        let LineOutcome::Event(event) = inspect(&line).unwrap() else {
            panic!("expected event");
        };
        assert_eq!(event.identity_key, "A-B");
        assert_eq!(event.task_local_path, "p");
    }
}
