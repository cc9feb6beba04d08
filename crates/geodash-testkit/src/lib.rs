// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use geodash_app::{Record, RecordId, RecordStatus};
use std::fs;
use std::path::PathBuf;

pub fn fixture_date() -> &'static str {
    "2024-05-17"
}

pub fn sample_record(
    id: &str,
    name: &str,
    latitude: f64,
    longitude: f64,
    status: RecordStatus,
) -> Record {
    Record {
        id: RecordId::from(id),
        name: name.to_owned(),
        latitude,
        longitude,
        status: Some(status),
        last_updated: fixture_date().to_owned(),
    }
}

/// The two-record store used to pin down search/status AND semantics.
pub fn solar_wind_pair() -> Vec<Record> {
    vec![
        sample_record(
            "p1",
            "Solar Farm North Alpha-001",
            34.05,
            -118.25,
            RecordStatus::Active,
        ),
        sample_record(
            "p2",
            "Wind Turbine South Beta-002",
            -33.87,
            151.21,
            RecordStatus::Pending,
        ),
    ]
}

/// `count` well-formed records with ids `site-00000..` spread over a lat/lng
/// grid and statuses cycling through every variant.
pub fn grid_records(count: usize) -> Vec<Record> {
    (0..count)
        .map(|index| {
            let latitude = -80.0 + (index % 161) as f64;
            let longitude = -170.0 + ((index * 13) % 341) as f64;
            let mut record = sample_record(
                &format!("site-{index:05}"),
                &format!("Grid Site {index:05}"),
                latitude,
                longitude,
                RecordStatus::ALL[index % RecordStatus::ALL.len()],
            );
            record.last_updated = format!("2023-{:02}-{:02}", index % 12 + 1, index % 28 + 1);
            record
        })
        .collect()
}

pub fn temp_data_file(contents: &str) -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("projects.json");
    fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
    Ok((dir, path))
}

pub fn temp_records_file(records: &[Record]) -> Result<(tempfile::TempDir, PathBuf)> {
    let json = serde_json::to_string_pretty(records).context("encode records")?;
    temp_data_file(&json)
}

#[cfg(test)]
mod tests {
    use super::{grid_records, solar_wind_pair, temp_records_file};
    use anyhow::Result;
    use std::collections::HashSet;

    #[test]
    fn grid_records_have_unique_ids_and_valid_coordinates() {
        let records = grid_records(2_000);
        let ids = records
            .iter()
            .map(|record| record.id.as_str())
            .collect::<HashSet<_>>();
        assert_eq!(ids.len(), 2_000);
        assert!(records.iter().all(|record| record.coordinates_in_range()));
    }

    #[test]
    fn pair_matches_documented_example() {
        let pair = solar_wind_pair();
        assert_eq!(pair[0].id.as_str(), "p1");
        assert_eq!(pair[1].status_label(), "Pending");
    }

    #[test]
    fn records_file_round_trips_through_disk() -> Result<()> {
        let (_dir, path) = temp_records_file(&solar_wind_pair())?;
        let contents = std::fs::read_to_string(path)?;
        assert!(contents.contains("Solar Farm North Alpha-001"));
        assert!(contents.contains("lastUpdated"));
        Ok(())
    }
}
