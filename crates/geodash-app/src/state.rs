// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::{Duration, Instant};

use crate::{
    CameraMove, Debouncer, FLY_DURATION, FilterState, ListViewport, LoadState, MapCamera,
    MapFrame, Record, RecordCounts, RecordId, RecordStore, SEARCH_DEBOUNCE, ScrollCommand,
    SelectionAuthority, SelectionSubscription, SortKey, SortState, SpatialConfig, StatusFilter,
    SubsetCache, VirtualRow, VisibleSubset, format_count, view_center,
};

pub const ROW_HEIGHT: u32 = 44;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardConfig {
    pub row_height: u32,
    pub viewport_height: u32,
    pub overscan: usize,
    pub search_debounce: Duration,
    pub scroll_animation: Duration,
    pub fly_duration: Duration,
    pub spatial: SpatialConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            row_height: ROW_HEIGHT,
            viewport_height: ROW_HEIGHT * 10,
            overscan: crate::DEFAULT_OVERSCAN,
            search_debounce: SEARCH_DEBOUNCE,
            scroll_animation: crate::DEFAULT_SCROLL_ANIMATION,
            fly_duration: FLY_DURATION,
            spatial: SpatialConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardCommand {
    LoadStarted,
    LoadSucceeded(Vec<Record>),
    LoadFailed(String),
    SearchInput(String),
    ClearSearch,
    Tick,
    SetStatusFilter(StatusFilter),
    ClickColumn(SortKey),
    /// Position within the visible subset.
    ClickRow(usize),
    ClickMarker(RecordId),
    /// Clears the selection even when its record has left the store.
    ClearSelection,
    ScrollBy(i64),
    ScrollTo(u64),
    MoveCursor(isize),
    ActivateCursor,
    ResizeViewport(u32),
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    LoadStateChanged(LoadState),
    FilterApplied(FilterState),
    SortChanged(SortState),
    SubsetRecomputed { visible: usize },
    SelectionChanged(Option<RecordId>),
    ScrollRequested(ScrollCommand),
    CameraMoved(CameraMove),
    StatusUpdated(String),
    StatusCleared,
}

/// Owns every piece of dashboard state and turns commands into events.
/// The table and the map both read from here; neither keeps its own copy of
/// the selection.
#[derive(Debug, Clone)]
pub struct DashboardState {
    config: DashboardConfig,
    load: LoadState,
    store: RecordStore,
    filter: FilterState,
    search_input: String,
    search: Debouncer<String>,
    sort: SortState,
    cache: SubsetCache,
    selection: SelectionAuthority,
    table_watch: SelectionSubscription,
    map_watch: SelectionSubscription,
    viewport: ListViewport,
    camera: MapCamera,
    cursor: Option<usize>,
    recenter_pending: bool,
    status_line: Option<String>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl DashboardState {
    pub fn new(config: DashboardConfig) -> Self {
        let selection = SelectionAuthority::default();
        let mut state = Self {
            config,
            load: LoadState::Loading,
            store: RecordStore::default(),
            filter: FilterState::default(),
            search_input: String::new(),
            search: Debouncer::new(config.search_debounce),
            sort: SortState::Unsorted,
            cache: SubsetCache::default(),
            table_watch: selection.subscribe(),
            map_watch: selection.subscribe(),
            selection,
            viewport: ListViewport::new(config.row_height, config.viewport_height)
                .with_overscan(config.overscan)
                .with_scroll_duration(config.scroll_animation),
            camera: MapCamera::default().with_fly_duration(config.fly_duration),
            cursor: None,
            recenter_pending: false,
            status_line: None,
        };
        state.cache.refresh(&state.store, &state.filter, &state.sort);
        state
    }

    pub fn dispatch(&mut self, command: DashboardCommand, now: Instant) -> Vec<DashboardEvent> {
        let mut events = match command {
            DashboardCommand::LoadStarted => {
                self.load = LoadState::Loading;
                vec![DashboardEvent::LoadStateChanged(self.load.clone())]
            }
            DashboardCommand::LoadSucceeded(records) => self.finish_load(records),
            DashboardCommand::LoadFailed(message) => {
                tracing::warn!(error = %message, "record load failed");
                self.load = LoadState::Failed(message);
                vec![
                    DashboardEvent::LoadStateChanged(self.load.clone()),
                    self.set_status("failed to load projects".to_owned()),
                ]
            }
            DashboardCommand::SearchInput(text) => {
                self.search_input.clone_from(&text);
                self.search.schedule(text, now);
                Vec::new()
            }
            DashboardCommand::ClearSearch => {
                self.search_input.clear();
                self.search.cancel();
                self.apply_search(String::new())
                    .into_iter()
                    .collect()
            }
            DashboardCommand::Tick => self
                .search
                .poll(now)
                .and_then(|settled| self.apply_search(settled))
                .into_iter()
                .collect(),
            DashboardCommand::SetStatusFilter(status) => {
                if self.filter.status == status {
                    Vec::new()
                } else {
                    self.filter.status = status;
                    vec![
                        DashboardEvent::FilterApplied(self.filter.clone()),
                        self.set_status(format!("status: {}", status.label())),
                    ]
                }
            }
            DashboardCommand::ClickColumn(key) => {
                self.sort = self.sort.clicked(key);
                let message = match self.sort {
                    SortState::Unsorted => "sort cleared".to_owned(),
                    SortState::Sorted { key, direction } => {
                        format!("sort: {} {}", key.label(), direction.as_str())
                    }
                };
                vec![
                    DashboardEvent::SortChanged(self.sort),
                    self.set_status(message),
                ]
            }
            DashboardCommand::ClickRow(position) => self.select_position(position),
            DashboardCommand::ClickMarker(id) => {
                let record = self
                    .store
                    .index_of(&id)
                    .and_then(|index| self.store.get(index))
                    .cloned();
                match record {
                    Some(record) => {
                        self.selection.select(Some(&record));
                        Vec::new()
                    }
                    None => {
                        tracing::debug!(id = %id, "marker click for unknown record");
                        Vec::new()
                    }
                }
            }
            DashboardCommand::ClearSelection => {
                self.selection.select(None);
                Vec::new()
            }
            DashboardCommand::ScrollBy(delta) => {
                self.viewport.scroll_by(delta);
                Vec::new()
            }
            DashboardCommand::ScrollTo(offset) => {
                self.viewport.scroll_to(offset);
                Vec::new()
            }
            DashboardCommand::MoveCursor(delta) => {
                self.move_cursor(delta);
                Vec::new()
            }
            DashboardCommand::ActivateCursor => match self.cursor {
                Some(position) => self.select_position(position),
                None => Vec::new(),
            },
            DashboardCommand::ResizeViewport(height) => {
                self.viewport.resize(height);
                Vec::new()
            }
            DashboardCommand::SetStatus(message) => vec![self.set_status(message)],
            DashboardCommand::ClearStatus => {
                self.status_line = None;
                vec![DashboardEvent::StatusCleared]
            }
        };

        self.reconcile(now, &mut events);
        events
    }

    fn finish_load(&mut self, records: Vec<Record>) -> Vec<DashboardEvent> {
        self.store = self.store.replaced(records);
        self.load = LoadState::Ready;
        tracing::info!(
            records = self.store.len(),
            generation = self.store.generation(),
            "records loaded"
        );

        // A retained selection keeps the camera where the user put it.
        self.recenter_pending = self.selection.current().is_none();

        let message = format!("loaded {} projects", format_count(self.store.len()));
        vec![
            DashboardEvent::LoadStateChanged(self.load.clone()),
            self.set_status(message),
        ]
    }

    fn apply_search(&mut self, search: String) -> Option<DashboardEvent> {
        if self.filter.search == search {
            return None;
        }
        self.filter.search = search;
        Some(DashboardEvent::FilterApplied(self.filter.clone()))
    }

    fn select_position(&mut self, position: usize) -> Vec<DashboardEvent> {
        let record = self
            .cache
            .subset()
            .record(self.store.records(), position)
            .cloned();
        if let Some(record) = record {
            self.cursor = Some(position);
            self.selection.select(Some(&record));
        }
        Vec::new()
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.cache.subset().len();
        if len == 0 {
            self.cursor = None;
            return;
        }
        // Without a cursor, movement starts just above the first row.
        let next = match self.cursor {
            None if delta <= 0 => 0,
            None => (delta.unsigned_abs() - 1).min(len - 1),
            Some(current) => current.saturating_add_signed(delta).min(len - 1),
        };
        self.cursor = Some(next);
        self.viewport.ensure_visible(next);
    }

    fn reconcile(&mut self, now: Instant, events: &mut Vec<DashboardEvent>) {
        if self.cache.refresh(&self.store, &self.filter, &self.sort) {
            let visible = self.cache.subset().len();
            self.viewport.set_item_count(visible);
            self.cursor = match self.cursor {
                _ if visible == 0 => None,
                Some(cursor) => Some(cursor.min(visible - 1)),
                None => None,
            };
            events.push(DashboardEvent::SubsetRecomputed { visible });
        }

        if self.recenter_pending {
            self.recenter_pending = false;
            let center = view_center(
                self.store.records(),
                self.cache.subset(),
                self.selection.current(),
                self.config.spatial.centroid_sample,
            );
            self.camera.jump_to(center);
        }

        if let Some(current) = self.table_watch.poll(&self.selection) {
            let current = current.cloned();
            events.push(DashboardEvent::SelectionChanged(
                current.as_ref().map(|record| record.id.clone()),
            ));
            let position = current.as_ref().and_then(|record| {
                self.cache
                    .subset()
                    .position_of(self.store.records(), &record.id)
            });
            if let Some(position) = position {
                self.cursor = Some(position);
                if let Some(command) = self.viewport.scroll_to_index_centered(position, now) {
                    events.push(DashboardEvent::ScrollRequested(command));
                }
            }
        }

        if let Some(Some(record)) = self.map_watch.poll(&self.selection) {
            if let Some(movement) = self.camera.fly_to(record.point(), now) {
                events.push(DashboardEvent::CameraMoved(movement));
            }
        }

        self.viewport.tick(now);
        self.camera.tick(now);
    }

    fn set_status(&mut self, message: String) -> DashboardEvent {
        self.status_line = Some(message.clone());
        DashboardEvent::StatusUpdated(message)
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn subset(&self) -> &VisibleSubset {
        self.cache.subset()
    }

    pub fn visible_records(&self) -> impl Iterator<Item = &Record> + '_ {
        self.cache.subset().records(self.store.records())
    }

    pub fn visible_record(&self, position: usize) -> Option<&Record> {
        self.cache.subset().record(self.store.records(), position)
    }

    pub fn visible_len(&self) -> usize {
        self.cache.subset().len()
    }

    pub fn viewport(&self) -> &ListViewport {
        &self.viewport
    }

    pub fn window(&self) -> Vec<VirtualRow> {
        self.viewport.virtual_rows()
    }

    pub fn camera(&self) -> &MapCamera {
        &self.camera
    }

    pub fn map_frame(&self) -> MapFrame {
        MapFrame::build(
            self.store.records(),
            self.cache.subset(),
            &self.selection,
            &self.camera,
            self.config.spatial,
        )
    }

    pub fn counts(&self) -> RecordCounts {
        RecordCounts {
            total: self.store.len(),
            filtered: self.cache.subset().len(),
        }
    }

    /// Raw search input, which may not have settled into the filter yet.
    pub fn search_text(&self) -> &str {
        &self.search_input
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    pub fn sort_indicator(&self, key: SortKey) -> &'static str {
        self.sort.indicator(key)
    }

    pub fn selection(&self) -> &SelectionAuthority {
        &self.selection
    }

    /// Where the selected record sits in the visible subset, if it is there.
    pub fn selected_position(&self) -> Option<usize> {
        let current = self.selection.current()?;
        self.cache
            .subset()
            .position_of(self.store.records(), &current.id)
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn status_line(&self) -> Option<&str> {
        self.status_line.as_deref()
    }

    pub fn search_deadline(&self) -> Option<Instant> {
        self.search.deadline()
    }

    pub fn is_animating(&self) -> bool {
        self.viewport.is_animating() || self.camera.is_flying()
    }
}
