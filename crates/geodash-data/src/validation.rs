// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::HashSet;
use std::fmt;

use geodash_app::{LATITUDE_RANGE, LONGITUDE_RANGE, Record, RecordId};
use time::Date;
use time::macros::format_description;

pub const DATE_LAYOUT: &str = "YYYY-MM-DD";

/// Something wrong with one loaded record. None of these abort a load.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordIssue {
    BlankId,
    DuplicateId,
    NonFiniteCoordinate,
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
    UnknownStatus(String),
    InvalidLastUpdated(String),
}

impl fmt::Display for RecordIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlankId => f.write_str("blank id"),
            Self::DuplicateId => f.write_str("duplicate id"),
            Self::NonFiniteCoordinate => f.write_str("missing or non-finite coordinate"),
            Self::LatitudeOutOfRange(value) => {
                write!(f, "latitude {value} outside [-90, 90]")
            }
            Self::LongitudeOutOfRange(value) => {
                write!(f, "longitude {value} outside [-180, 180]")
            }
            Self::UnknownStatus(value) => write!(f, "unknown status {value:?}"),
            Self::InvalidLastUpdated(value) => {
                write!(f, "lastUpdated {value:?} is not a {DATE_LAYOUT} date")
            }
        }
    }
}

impl RecordIssue {
    /// Records with these issues cannot be addressed and are dropped.
    pub fn drops_record(&self) -> bool {
        matches!(self, Self::BlankId | Self::DuplicateId)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordProblem {
    pub index: usize,
    pub id: String,
    pub issue: RecordIssue,
}

impl fmt::Display for RecordProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.id.is_empty() {
            write!(f, "record {}: {}", self.index, self.issue)
        } else {
            write!(f, "record {} ({}): {}", self.index, self.id, self.issue)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub records: Vec<Record>,
    pub problems: Vec<RecordProblem>,
}

impl LoadReport {
    pub fn dropped(&self) -> usize {
        self.problems
            .iter()
            .filter(|problem| problem.issue.drops_record())
            .count()
    }
}

pub fn parse_last_updated(value: &str) -> Option<Date> {
    Date::parse(value.trim(), &format_description!("[year]-[month]-[day]")).ok()
}

pub fn check_record(record: &Record) -> Vec<RecordIssue> {
    let mut issues = Vec::new();
    if record.id.as_str().trim().is_empty() {
        issues.push(RecordIssue::BlankId);
    }
    if !record.point().is_finite() {
        issues.push(RecordIssue::NonFiniteCoordinate);
    } else {
        if !LATITUDE_RANGE.contains(&record.latitude) {
            issues.push(RecordIssue::LatitudeOutOfRange(record.latitude));
        }
        if !LONGITUDE_RANGE.contains(&record.longitude) {
            issues.push(RecordIssue::LongitudeOutOfRange(record.longitude));
        }
    }
    if parse_last_updated(&record.last_updated).is_none() {
        issues.push(RecordIssue::InvalidLastUpdated(record.last_updated.clone()));
    }
    issues
}

/// Checks every record in load order. Blank and repeated ids are dropped
/// (the first occurrence of an id wins); every other issue is reported and
/// the record is kept so the engine can sort it last.
pub fn validate_records(
    records: Vec<Record>,
    mut problems: Vec<RecordProblem>,
) -> LoadReport {
    let mut seen = HashSet::<RecordId>::with_capacity(records.len());
    let mut kept = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        let issues = check_record(&record);
        let blank = issues.contains(&RecordIssue::BlankId);
        let duplicate = !blank && !seen.insert(record.id.clone());
        for issue in issues {
            problems.push(RecordProblem {
                index,
                id: record.id.to_string(),
                issue,
            });
        }
        if duplicate {
            problems.push(RecordProblem {
                index,
                id: record.id.to_string(),
                issue: RecordIssue::DuplicateId,
            });
        }
        if !blank && !duplicate {
            kept.push(record);
        }
    }

    problems.sort_by_key(|problem| problem.index);
    for problem in &problems {
        tracing::debug!(%problem, "malformed record");
    }
    if let Some(first) = problems.first() {
        tracing::warn!(
            problems = problems.len(),
            kept = kept.len(),
            first = %first,
            "loaded records with problems"
        );
    }

    LoadReport {
        records: kept,
        problems,
    }
}
