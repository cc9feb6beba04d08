// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod demo;
pub mod validation;

pub use demo::{DEMO_COUNT, DEMO_SEED, DemoGenerator, demo_records, project_name};
pub use validation::{
    LoadReport, RecordIssue, RecordProblem, check_record, parse_last_updated, validate_records,
};

use anyhow::{Context, Result, anyhow, bail};
use geodash_app::{Record, RecordId, RecordStatus};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use time::Date;

pub const APP_NAME: &str = "geodash";
pub const DATA_PATH_ENV: &str = "GEODASH_DATA_PATH";

/// Where records come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Demo { count: usize, seed: u64 },
    File(PathBuf),
}

impl DataSource {
    pub fn describe(&self) -> String {
        match self {
            Self::Demo { count, seed } => format!("demo data ({count} records, seed {seed})"),
            Self::File(path) => path.display().to_string(),
        }
    }

    /// Loads every record at once. `today` bounds generated demo dates.
    pub fn load(&self, today: Date) -> Result<LoadReport> {
        let report = match self {
            Self::Demo { count, seed } => {
                validate_records(demo_records(*count, *seed, today)?, Vec::new())
            }
            Self::File(path) => load_json(path)?,
        };
        tracing::info!(
            source = %self.describe(),
            records = report.records.len(),
            problems = report.problems.len(),
            "records loaded"
        );
        Ok(report)
    }
}

pub fn data_path_override() -> Option<PathBuf> {
    env::var_os(DATA_PATH_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

pub fn default_log_path() -> Result<PathBuf> {
    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set [log].path to a writable log file")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("geodash.log"))
}

pub fn validate_data_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("data path must not be empty");
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "data path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("data path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!("data path {path:?} contains '?'; remove query parameters and use a plain file path");
    }

    Ok(())
}

pub fn load_json(path: &Path) -> Result<LoadReport> {
    validate_data_path(&path.to_string_lossy())?;
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read data file {}", path.display()))?;
    parse_records(&contents).with_context(|| format!("parse data file {}", path.display()))
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Document {
    Records(Vec<RawRecord>),
    Page { data: Vec<RawRecord> },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    #[serde(default)]
    id: String,
    #[serde(default, alias = "projectName")]
    name: String,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    last_updated: Option<String>,
}

/// Accepts a bare array of records or a page object with a `data` array.
/// Missing coordinates become NaN and an unknown status becomes `None`, so
/// one bad record never fails the whole load.
pub fn parse_records(json: &str) -> Result<LoadReport> {
    let document: Document =
        serde_json::from_str(json).context("expected a JSON array of project records")?;
    let raw = match document {
        Document::Records(records) | Document::Page { data: records } => records,
    };

    let mut problems = Vec::new();
    let records = raw
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            let status = match raw.status.as_deref() {
                Some(value) => {
                    let parsed = RecordStatus::parse(value);
                    if parsed.is_none() {
                        problems.push(RecordProblem {
                            index,
                            id: raw.id.clone(),
                            issue: RecordIssue::UnknownStatus(value.to_owned()),
                        });
                    }
                    parsed
                }
                None => {
                    problems.push(RecordProblem {
                        index,
                        id: raw.id.clone(),
                        issue: RecordIssue::UnknownStatus(String::new()),
                    });
                    None
                }
            };
            Record {
                id: RecordId::new(raw.id),
                name: raw.name,
                latitude: raw.latitude.unwrap_or(f64::NAN),
                longitude: raw.longitude.unwrap_or(f64::NAN),
                status,
                last_updated: raw.last_updated.unwrap_or_default(),
            }
        })
        .collect::<Vec<_>>();

    Ok(validate_records(records, problems))
}

#[cfg(test)]
mod tests {
    use super::{DataSource, parse_records, validate_data_path};
    use crate::RecordIssue;
    use anyhow::Result;
    use geodash_app::RecordStatus;
    use time::macros::date;

    #[test]
    fn uri_style_paths_are_rejected() {
        assert!(validate_data_path("").is_err());
        assert!(validate_data_path("https://example.com/projects.json").is_err());
        assert!(validate_data_path("file:projects.json").is_err());
        assert!(validate_data_path("projects.json?page=2").is_err());
        assert!(validate_data_path("/srv/geodash/projects.json").is_ok());
        assert!(validate_data_path("C://projects.json").is_err());
    }

    #[test]
    fn parses_original_field_names() -> Result<()> {
        let report = parse_records(
            r#"[{"id":"proj-00001","projectName":"Pipeline East Beta-001",
                 "latitude":12.5,"longitude":-3.25,"status":"On Hold",
                 "lastUpdated":"2022-11-30"}]"#,
        )?;
        assert!(report.problems.is_empty());
        let record = &report.records[0];
        assert_eq!(record.name, "Pipeline East Beta-001");
        assert_eq!(record.status, Some(RecordStatus::OnHold));
        assert_eq!(record.last_updated, "2022-11-30");
        Ok(())
    }

    #[test]
    fn page_documents_are_unwrapped() -> Result<()> {
        let report = parse_records(
            r#"{"data":[{"id":"a","name":"Reservoir","latitude":1,"longitude":2,
                "status":"Active","lastUpdated":"2021-01-01"}],
                "total":1,"page":1,"pageSize":50,"totalPages":1}"#,
        )?;
        assert_eq!(report.records.len(), 1);
        Ok(())
    }

    #[test]
    fn malformed_fields_are_kept_and_reported() -> Result<()> {
        let report = parse_records(
            r#"[{"id":"a","name":"Oil Rig","latitude":null,"longitude":5,
                 "status":"Paused","lastUpdated":"2021-01-01"}]"#,
        )?;
        assert_eq!(report.records.len(), 1);
        assert!(report.records[0].latitude.is_nan());
        assert_eq!(report.records[0].status, None);
        let issues = report
            .problems
            .iter()
            .map(|problem| problem.issue.clone())
            .collect::<Vec<_>>();
        assert_eq!(
            issues,
            vec![
                RecordIssue::UnknownStatus("Paused".to_owned()),
                RecordIssue::NonFiniteCoordinate,
            ]
        );
        Ok(())
    }

    #[test]
    fn non_array_document_fails_with_context() {
        let error = parse_records(r#"{"projects": 3}"#).expect_err("not a record list");
        assert!(format!("{error:#}").contains("expected a JSON array"));
    }

    #[test]
    fn demo_source_loads_requested_count() -> Result<()> {
        let source = DataSource::Demo { count: 120, seed: 9 };
        let report = source.load(date!(2024 - 12 - 31))?;
        assert_eq!(report.records.len(), 120);
        assert!(report.problems.is_empty());
        assert!(source.describe().contains("120 records"));
        Ok(())
    }
}
