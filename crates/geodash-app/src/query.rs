// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;

use crate::{FilterState, Record, RecordId, RecordStore, SortDirection, SortKey, SortState};

/// Ordered store positions that passed the current filter. Holding indices
/// rather than records keeps every field exactly as loaded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VisibleSubset {
    indices: Vec<usize>,
}

impl VisibleSubset {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn record<'a>(&self, records: &'a [Record], position: usize) -> Option<&'a Record> {
        self.indices
            .get(position)
            .and_then(|index| records.get(*index))
    }

    pub fn records<'a>(&'a self, records: &'a [Record]) -> impl Iterator<Item = &'a Record> + 'a {
        self.indices.iter().filter_map(|index| records.get(*index))
    }

    pub fn position_of(&self, records: &[Record], id: &RecordId) -> Option<usize> {
        self.indices
            .iter()
            .position(|index| records.get(*index).is_some_and(|record| &record.id == id))
    }
}

/// Filters then sorts `records`. Pure: equal inputs give equal output.
pub fn compute(records: &[Record], filter: &FilterState, sort: &SortState) -> VisibleSubset {
    let needle = filter.search.to_lowercase();
    let mut indices = records
        .iter()
        .enumerate()
        .filter(|(_, record)| {
            matches_search(record, &needle) && filter.status.matches(record.status)
        })
        .map(|(index, _)| index)
        .collect::<Vec<_>>();

    if let SortState::Sorted { key, direction } = *sort {
        // `sort_by` is stable, so ties keep store order in both directions.
        indices.sort_by(|left, right| {
            compare_records(&records[*left], &records[*right], key, direction)
        });
    }

    VisibleSubset { indices }
}

fn matches_search(record: &Record, needle: &str) -> bool {
    needle.is_empty()
        || record.name.to_lowercase().contains(needle)
        || record.id.as_str().to_lowercase().contains(needle)
}

pub fn compare_records(
    left: &Record,
    right: &Record,
    key: SortKey,
    direction: SortDirection,
) -> Ordering {
    match key {
        SortKey::Name => compare_text(&left.name, &right.name, direction),
        SortKey::LastUpdated => compare_text(&left.last_updated, &right.last_updated, direction),
        SortKey::Latitude => compare_float(left.latitude, right.latitude, direction),
        SortKey::Longitude => compare_float(left.longitude, right.longitude, direction),
        SortKey::Status => compare_missing_last(
            left.status.map(|status| status.label()),
            right.status.map(|status| status.label()),
            direction,
        ),
    }
}

fn compare_text(left: &str, right: &str, direction: SortDirection) -> Ordering {
    compare_missing_last(
        Some(left).filter(|value| !value.is_empty()),
        Some(right).filter(|value| !value.is_empty()),
        direction,
    )
}

fn compare_float(left: f64, right: f64, direction: SortDirection) -> Ordering {
    match (left.is_nan(), right.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => directed(left.total_cmp(&right), direction),
    }
}

// Missing values sort last regardless of direction.
fn compare_missing_last<T: Ord>(
    left: Option<T>,
    right: Option<T>,
    direction: SortDirection,
) -> Ordering {
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(left), Some(right)) => directed(left.cmp(&right), direction),
    }
}

fn directed(order: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => order,
        SortDirection::Desc => order.reverse(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SubsetKey {
    generation: u64,
    filter: FilterState,
    sort: SortState,
}

/// Memoizes [`compute`] on the identity of its three inputs.
#[derive(Debug, Clone, Default)]
pub struct SubsetCache {
    key: Option<SubsetKey>,
    subset: VisibleSubset,
    recomputations: u64,
}

impl SubsetCache {
    /// Returns true when the subset was recomputed.
    pub fn refresh(&mut self, store: &RecordStore, filter: &FilterState, sort: &SortState) -> bool {
        let unchanged = self.key.as_ref().is_some_and(|key| {
            key.generation == store.generation() && key.filter == *filter && key.sort == *sort
        });
        if unchanged {
            return false;
        }

        self.subset = compute(store.records(), filter, sort);
        self.key = Some(SubsetKey {
            generation: store.generation(),
            filter: filter.clone(),
            sort: *sort,
        });
        self.recomputations = self.recomputations.saturating_add(1);
        tracing::debug!(
            visible = self.subset.len(),
            total = store.len(),
            search = %filter.search,
            status = filter.status.label(),
            "visible subset recomputed"
        );
        true
    }

    pub fn subset(&self) -> &VisibleSubset {
        &self.subset
    }

    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }
}
