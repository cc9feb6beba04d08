// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::ids::RecordId;

pub const LATITUDE_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;
pub const LONGITUDE_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordStatus {
    Active,
    Pending,
    Completed,
    #[serde(rename = "On Hold", alias = "OnHold")]
    OnHold,
}

impl RecordStatus {
    pub const ALL: [Self; 4] = [Self::Active, Self::Pending, Self::Completed, Self::OnHold];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Pending => "Pending",
            Self::Completed => "Completed",
            Self::OnHold => "On Hold",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Active" => Some(Self::Active),
            "Pending" => Some(Self::Pending),
            "Completed" => Some(Self::Completed),
            "On Hold" | "OnHold" => Some(Self::OnHold),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StatusFilter {
    #[default]
    All,
    Only(RecordStatus),
}

impl StatusFilter {
    pub const ALL: [Self; 5] = [
        Self::All,
        Self::Only(RecordStatus::Active),
        Self::Only(RecordStatus::Pending),
        Self::Only(RecordStatus::Completed),
        Self::Only(RecordStatus::OnHold),
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Only(status) => status.label(),
        }
    }

    /// Records with an unknown status only pass the `All` filter.
    pub fn matches(self, status: Option<RecordStatus>) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => status == Some(wanted),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: RecordId,
    #[serde(alias = "projectName")]
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: Option<RecordStatus>,
    pub last_updated: String,
}

impl Record {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    pub fn status_label(&self) -> &'static str {
        self.status.map_or("Unknown", RecordStatus::label)
    }

    pub fn coordinates_in_range(&self) -> bool {
        LATITUDE_RANGE.contains(&self.latitude) && LONGITUDE_RANGE.contains(&self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FilterState {
    pub search: String,
    pub status: StatusFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    Name,
    Latitude,
    Longitude,
    Status,
    LastUpdated,
}

impl SortKey {
    pub const ALL: [Self; 5] = [
        Self::Name,
        Self::Latitude,
        Self::Longitude,
        Self::Status,
        Self::LastUpdated,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Project Name",
            Self::Latitude => "Latitude",
            Self::Longitude => "Longitude",
            Self::Status => "Status",
            Self::LastUpdated => "Last Updated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Column sort. A key without a direction cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortState {
    #[default]
    Unsorted,
    Sorted {
        key: SortKey,
        direction: SortDirection,
    },
}

impl SortState {
    pub const fn key(self) -> Option<SortKey> {
        match self {
            Self::Unsorted => None,
            Self::Sorted { key, .. } => Some(key),
        }
    }

    pub const fn direction(self) -> Option<SortDirection> {
        match self {
            Self::Unsorted => None,
            Self::Sorted { direction, .. } => Some(direction),
        }
    }

    /// Header click: `none -> asc -> desc -> none` on one column, and a click
    /// on a different column restarts at `asc` for that column.
    pub fn clicked(self, clicked: SortKey) -> Self {
        match self {
            Self::Sorted {
                key,
                direction: SortDirection::Asc,
            } if key == clicked => Self::Sorted {
                key,
                direction: SortDirection::Desc,
            },
            Self::Sorted {
                key,
                direction: SortDirection::Desc,
            } if key == clicked => Self::Unsorted,
            _ => Self::Sorted {
                key: clicked,
                direction: SortDirection::Asc,
            },
        }
    }

    pub fn indicator(self, column: SortKey) -> &'static str {
        match self {
            Self::Sorted { key, direction } if key == column => match direction {
                SortDirection::Asc => "↑",
                SortDirection::Desc => "↓",
            },
            _ => "↕",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Loading,
    Failed(String),
    Ready,
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            Self::Loading | Self::Ready => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordCounts {
    pub total: usize,
    pub filtered: usize,
}

impl RecordCounts {
    pub fn filter_info(self) -> Option<String> {
        if self.filtered == self.total {
            return None;
        }
        Some(format!(
            "Showing {} of {}",
            format_count(self.filtered),
            format_count(self.total)
        ))
    }
}

pub fn format_count(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
