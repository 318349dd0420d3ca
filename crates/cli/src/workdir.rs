use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};

const DATE_FORMAT: &str = "%y%m%d";

/// Per-day scratch directory: `{tmp_dir}/{todays_date}_root-poisoning`.
#[derive(Debug, Clone)]
pub(crate) struct WorkDir {
    todays_date: String,
    path: PathBuf,
}

impl WorkDir {
    pub(crate) fn new(tmp_dir: &Path, todays_date: Option<&str>) -> Result<Self> {
        let todays_date = match todays_date {
            Some(raw) => parse_todays_date(raw)?,
            None => Local::now().format(DATE_FORMAT).to_string(),
        };
        let path = tmp_dir.join(format!("{todays_date}_root-poisoning"));
        Ok(Self { todays_date, path })
    }

    /// Create the directory if it does not exist yet.
    pub(crate) fn ensure(&self) -> Result<()> {
        std::fs::create_dir_all(&self.path)
            .with_context(|| format!("Failed to create work dir {}", self.path.display()))
    }

    pub(crate) fn todays_date(&self) -> &str {
        &self.todays_date
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

fn parse_todays_date(raw: &str) -> Result<String> {
    let raw = raw.trim();
    if raw.len() != 6 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(anyhow!("--todays-date must look like YYMMDD, got '{raw}'"));
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|err| anyhow!("--todays-date '{raw}' is not a valid date: {err}"))?;
    Ok(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn work_dir_follows_date_convention() {
        let dir = WorkDir::new(Path::new("/tmp/ci"), Some("240404")).unwrap();
        assert_eq!(dir.todays_date(), "240404");
        assert_eq!(dir.path(), Path::new("/tmp/ci/240404_root-poisoning"));
    }

    #[test]
    fn default_date_is_six_digits() {
        let dir = WorkDir::new(Path::new("tmp"), None).unwrap();
        assert_eq!(dir.todays_date().len(), 6);
    }

    #[test]
    fn rejects_bad_dates() {
        assert!(parse_todays_date("2024-04-04").is_err());
        assert!(parse_todays_date("241340").is_err());
        assert!(parse_todays_date("abcdef").is_err());
        assert_eq!(parse_todays_date(" 240229 ").unwrap(), "240229");
    }
}
