// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use geodash_app::{
    DashboardCommand, DashboardEvent, DashboardState, FilterState, RecordId, RecordStatus,
    SortDirection, SortKey, SortState, StatusFilter, compute,
};
use geodash_testkit::{grid_records, solar_wind_pair};
use std::time::{Duration, Instant};

fn ready(records: Vec<geodash_app::Record>, now: Instant) -> DashboardState {
    let mut state = DashboardState::default();
    state.dispatch(DashboardCommand::LoadStarted, now);
    state.dispatch(DashboardCommand::LoadSucceeded(records), now);
    state
}

#[test]
fn documented_filter_examples_hold() {
    let store = solar_wind_pair();
    let unsorted = SortState::Unsorted;
    let ids = |filter: FilterState| {
        compute(&store, &filter, &unsorted)
            .records(&store)
            .map(|record| record.id.to_string())
            .collect::<Vec<_>>()
    };

    assert_eq!(
        ids(FilterState {
            search: "solar".to_owned(),
            status: StatusFilter::All,
        }),
        vec!["p1"]
    );
    assert_eq!(
        ids(FilterState {
            search: String::new(),
            status: StatusFilter::Only(RecordStatus::Pending),
        }),
        vec!["p2"]
    );
    assert!(
        ids(FilterState {
            search: "solar".to_owned(),
            status: StatusFilter::Only(RecordStatus::Pending),
        })
        .is_empty()
    );
}

#[test]
fn large_store_is_windowed_and_sampled() {
    let now = Instant::now();
    let state = ready(grid_records(10_000), now);

    let window = state.window();
    assert_eq!(window.first().map(|row| row.index), Some(0));
    assert_eq!(window.last().map(|row| row.index), Some(19));
    assert_eq!(state.viewport().total_size(), 10_000 * 44);

    let frame = state.map_frame();
    assert_eq!(frame.markers.len(), 1_000);
    assert_eq!(
        frame.note.as_deref(),
        Some("Showing 1,000 of 10,000 markers")
    );
}

#[test]
fn sorted_filtered_selection_flows_to_both_views() -> Result<()> {
    let start = Instant::now();
    let mut state = ready(grid_records(3_000), start);

    state.dispatch(
        DashboardCommand::SetStatusFilter(StatusFilter::Only(RecordStatus::Completed)),
        start,
    );
    state.dispatch(DashboardCommand::ClickColumn(SortKey::Latitude), start);
    state.dispatch(DashboardCommand::ClickColumn(SortKey::Latitude), start);
    assert_eq!(
        state.sort(),
        SortState::Sorted {
            key: SortKey::Latitude,
            direction: SortDirection::Desc,
        }
    );
    assert_eq!(state.visible_len(), 750);

    let latitudes = state
        .visible_records()
        .map(|record| record.latitude)
        .collect::<Vec<_>>();
    assert!(latitudes.windows(2).all(|pair| pair[0] >= pair[1]));

    let target = state
        .visible_record(400)
        .map(|record| record.id.clone())
        .context("row 400 exists")?;
    let events = state.dispatch(DashboardCommand::ClickRow(400), start);
    assert!(events.contains(&DashboardEvent::SelectionChanged(Some(target.clone()))));

    let frame = state.map_frame();
    assert_eq!(frame.markers.len(), 750);
    assert_eq!(
        frame.selected_marker().map(|marker| &marker.record_id),
        Some(&target)
    );

    state.dispatch(DashboardCommand::Tick, start + Duration::from_secs(2));
    let visible = state.viewport().visible_range().context("rows visible")?;
    assert!(visible.contains(&400));
    let selected = state.map_frame().center;
    let record = state
        .selection()
        .current()
        .context("selection retained")?;
    assert_eq!(selected, record.point());
    Ok(())
}

#[test]
fn typing_burst_applies_only_the_settled_value() {
    let start = Instant::now();
    let mut state = ready(grid_records(500), start);
    let mut applied = Vec::new();

    for (offset, text) in [(0, "g"), (80, "gr"), (160, "gri"), (240, "grid site 001")] {
        let at = start + Duration::from_millis(offset);
        state.dispatch(DashboardCommand::SearchInput(text.to_owned()), at);
        applied.extend(state.dispatch(DashboardCommand::Tick, at));
    }
    for step in 1..=10 {
        let at = start + Duration::from_millis(240 + step * 50);
        applied.extend(state.dispatch(DashboardCommand::Tick, at));
    }

    let filters = applied
        .iter()
        .filter_map(|event| match event {
            DashboardEvent::FilterApplied(filter) => Some(filter.search.clone()),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(filters, vec!["grid site 001".to_owned()]);
    assert_eq!(state.visible_len(), 100);
}

#[test]
fn marker_click_for_filtered_out_record_still_selects() {
    let now = Instant::now();
    let mut state = ready(solar_wind_pair(), now);
    state.dispatch(
        DashboardCommand::SetStatusFilter(StatusFilter::Only(RecordStatus::Active)),
        now,
    );

    let events = state.dispatch(DashboardCommand::ClickMarker(RecordId::from("p2")), now);
    assert!(events.contains(&DashboardEvent::SelectionChanged(Some(RecordId::from("p2")))));
    assert!(
        !events
            .iter()
            .any(|event| matches!(event, DashboardEvent::ScrollRequested(_)))
    );
    assert_eq!(state.selected_position(), None);
}
