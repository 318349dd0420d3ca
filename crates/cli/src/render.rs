use anyhow::{Context, Result};
use chown_audit_engine::{AuditConfig, ReportRow};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

const COLUMNS: [&str; 5] = [
    "BUILD_JOB_LINK",
    "DEPLOYMENT_LINK",
    "POISONED_BAMBOO_HOME_PATH",
    "LOCAL_PATH_FOR_BUILD_OR_DEPLOYMENT_TASKS",
    "FOUND_ON_AGENT_HOSTS",
];

/// Files written by one report run.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ReportFiles {
    pub index: PathBuf,
    pub archive_html: PathBuf,
    pub archive_json: PathBuf,
}

pub(crate) fn render_html(rows: &[ReportRow], config: &AuditConfig) -> String {
    let mut html = String::new();
    html.push_str("<table border=\"1\" class=\"dataframe\">\n");
    html.push_str("  <thead>\n    <tr style=\"text-align: right;\">\n");
    for column in COLUMNS {
        html.push_str(&format!("      <th>{column}</th>\n"));
    }
    html.push_str("    </tr>\n  </thead>\n  <tbody>\n");

    for row in rows {
        html.push_str("    <tr>\n");
        for cell in [
            build_job_link(&row.build_job, config),
            deployment_link(&row.deployment, config),
            home_path(&row.workspace_path, config),
            local_paths(row),
            code_list(row.hosts.iter()),
        ] {
            html.push_str(&format!("      <td>{cell}</td>\n"));
        }
        html.push_str("    </tr>\n");
    }

    html.push_str("  </tbody>\n</table>\n");
    html
}

/// Write `index.html` plus timestamped HTML and JSON copies under `archive/`.
pub(crate) fn write_report(
    output_dir: &Path,
    rows: &[ReportRow],
    config: &AuditConfig,
    todays_date: &str,
    now: DateTime<Utc>,
) -> Result<ReportFiles> {
    let html = render_html(rows, config);
    let json = serde_json::to_string_pretty(rows)?;

    let archive_dir = output_dir.join("archive");
    fs::create_dir_all(&archive_dir)
        .with_context(|| format!("Failed to create {}", archive_dir.display()))?;

    let stem = format!(
        "{}_root_poisoned_build_jobs_and_deployments_{todays_date}",
        now.format("%y%m%dT%HZ")
    );
    let files = ReportFiles {
        index: output_dir.join("index.html"),
        archive_html: archive_dir.join(format!("{stem}.html")),
        archive_json: archive_dir.join(format!("{stem}.json")),
    };

    log::info!(
        "Writing report to '{}', '{}' and '{}'",
        files.index.display(),
        files.archive_html.display(),
        files.archive_json.display()
    );
    fs::write(&files.archive_html, &html)?;
    fs::write(&files.archive_json, json)?;
    fs::write(&files.index, html)?;
    Ok(files)
}

fn link_base(config: &AuditConfig) -> &str {
    config.link_base_url.trim_end_matches('/')
}

fn build_job_link(build_job: &str, config: &AuditConfig) -> String {
    if build_job.is_empty() {
        return String::new();
    }
    let key = escape_html(build_job);
    format!(
        "<a href=\"{}/browse/{key}/latest\" target=\"_blank\"><pre>{key}</pre></a>",
        link_base(config)
    )
}

/// Deployment environments are linked by the numeric part after the hyphen.
fn deployment_link(deployment: &str, config: &AuditConfig) -> String {
    let Some((_, id)) = deployment.split_once('-') else {
        return String::new();
    };
    format!(
        "<a href=\"{}/deploy/viewEnvironment.action?id={}\" target=\"_blank\"><pre>{}</pre></a>",
        link_base(config),
        escape_html(id),
        escape_html(deployment)
    )
}

fn home_path(workspace_path: &str, config: &AuditConfig) -> String {
    format!(
        "<pre>{}/{}/</pre>",
        escape_html(&config.home_placeholder),
        escape_html(workspace_path)
    )
}

fn local_paths(row: &ReportRow) -> String {
    let mut cell = code_list(row.local_paths.items.iter());
    if row.local_paths.is_truncated() {
        cell.push_str(&format!("... ({} more)", row.local_paths.more));
    }
    cell
}

fn code_list<'a>(items: impl Iterator<Item = &'a String>) -> String {
    items
        .map(|item| format!("<code>{}</code>", escape_html(item)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
