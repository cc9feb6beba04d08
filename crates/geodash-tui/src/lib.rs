// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod render;

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use geodash_app::{
    DashboardCommand, DashboardEvent, DashboardState, Record, SortKey, StatusFilter,
    nearest_marker,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use render::{MapView, ScreenLayout, contains};

const IDLE_POLL: Duration = Duration::from_millis(120);
const FRAME_POLL: Duration = Duration::from_millis(16);
const STATUS_CLEAR_DELAY: Duration = Duration::from_secs(4);
const WHEEL_ROWS: i64 = 3;

pub trait AppRuntime {
    fn load_records(&mut self) -> Result<Vec<Record>>;

    /// Runs the load and reports back on `tx`. The default loads inline;
    /// runtimes with a slow source override this to load off the UI thread.
    fn spawn_load(&mut self, request_id: u64, tx: Sender<InternalEvent>) -> Result<()> {
        let outcome = self
            .load_records()
            .map_err(|error| format!("{error:#}"));
        tx.send(InternalEvent::Loaded {
            request_id,
            outcome,
        })
        .map_err(|_| anyhow::anyhow!("load event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    ClearStatus {
        token: u64,
    },
    Loaded {
        request_id: u64,
        outcome: std::result::Result<Vec<Record>, String>,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct ViewData {
    pub layout: ScreenLayout,
    pub help_visible: bool,
    pub search_editing: bool,
    pub column_cursor: usize,
    pub status_token: u64,
    pub load_request: u64,
}

pub fn run_app<R: AppRuntime>(state: &mut DashboardState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen, EnableMouseCapture)
        .context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();
    request_load(state, runtime, &mut view_data, &internal_tx, Instant::now());

    let result = event_loop(
        &mut terminal,
        state,
        runtime,
        &mut view_data,
        &internal_tx,
        &internal_rx,
    );

    disable_raw_mode().context("disable raw mode")?;
    execute!(
        io::stdout(),
        DisableMouseCapture,
        terminal::LeaveAlternateScreen
    )
    .context("leave alternate screen")?;
    result
}

fn event_loop<R: AppRuntime>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut DashboardState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    internal_rx: &Receiver<InternalEvent>,
) -> Result<()> {
    loop {
        let now = Instant::now();
        process_internal_events(state, view_data, internal_tx, internal_rx, now);
        dispatch(state, view_data, internal_tx, DashboardCommand::Tick, now);

        terminal
            .draw(|frame| {
                view_data.layout = ScreenLayout::new(frame.area());
                render::render(frame, state, view_data);
            })
            .context("draw frame")?;
        sync_viewport_height(state, view_data, internal_tx, now);

        let timeout = poll_timeout(state, Instant::now());
        if !event::poll(timeout).context("poll event")? {
            continue;
        }
        let now = Instant::now();
        match event::read().context("read event")? {
            Event::Key(key) => {
                if handle_key_event(state, runtime, view_data, internal_tx, key, now) {
                    return Ok(());
                }
            }
            Event::Mouse(mouse) => handle_mouse_event(state, view_data, internal_tx, mouse, now),
            _ => {}
        }
    }
}

/// Sleeps no longer than the next debounce deadline, and polls at frame rate
/// while an animation is running.
fn poll_timeout(state: &DashboardState, now: Instant) -> Duration {
    let mut timeout = if state.is_animating() {
        FRAME_POLL
    } else {
        IDLE_POLL
    };
    if let Some(deadline) = state.search_deadline() {
        timeout = timeout.min(deadline.saturating_duration_since(now));
    }
    timeout
}

fn sync_viewport_height(
    state: &mut DashboardState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    now: Instant,
) {
    let height = u32::from(view_data.layout.table_body.height);
    if height != state.viewport().viewport_height() {
        dispatch(
            state,
            view_data,
            internal_tx,
            DashboardCommand::ResizeViewport(height),
            now,
        );
    }
}

fn process_internal_events(
    state: &mut DashboardState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
    now: Instant,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(DashboardCommand::ClearStatus, now);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::Loaded { request_id, .. } if request_id != view_data.load_request => {}
            InternalEvent::Loaded { outcome, .. } => {
                let command = match outcome {
                    Ok(records) => DashboardCommand::LoadSucceeded(records),
                    Err(error) => DashboardCommand::LoadFailed(error),
                };
                dispatch(state, view_data, tx, command, now);
            }
        }
    }
}

fn request_load<R: AppRuntime>(
    state: &mut DashboardState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    now: Instant,
) {
    view_data.load_request = view_data.load_request.wrapping_add(1);
    tracing::debug!(request_id = view_data.load_request, "load requested");
    dispatch(
        state,
        view_data,
        internal_tx,
        DashboardCommand::LoadStarted,
        now,
    );
    if let Err(error) = runtime.spawn_load(view_data.load_request, internal_tx.clone()) {
        dispatch(
            state,
            view_data,
            internal_tx,
            DashboardCommand::LoadFailed(format!("{error:#}")),
            now,
        );
    }
}

fn dispatch(
    state: &mut DashboardState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: DashboardCommand,
    now: Instant,
) {
    for event in state.dispatch(command, now) {
        if let DashboardEvent::StatusUpdated(_) = event {
            view_data.status_token = view_data.status_token.saturating_add(1);
            schedule_status_clear(internal_tx, view_data.status_token);
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_DELAY);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

/// Returns true when the app should quit.
fn handle_key_event<R: AppRuntime>(
    state: &mut DashboardState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
    now: Instant,
) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('q') if ctrl => return true,
        KeyCode::Char('c') if ctrl => return true,
        KeyCode::Char('u') if ctrl => {
            dispatch(
                state,
                view_data,
                internal_tx,
                DashboardCommand::ClearSearch,
                now,
            );
            return false;
        }
        KeyCode::Char('r') if ctrl => {
            request_load(state, runtime, view_data, internal_tx, now);
            return false;
        }
        _ => {}
    }

    if view_data.help_visible {
        view_data.help_visible = false;
        return false;
    }

    if view_data.search_editing {
        handle_search_key(state, view_data, internal_tx, key, now);
        return false;
    }

    let command = match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('?') => {
            view_data.help_visible = true;
            None
        }
        KeyCode::Char('/') => {
            view_data.search_editing = true;
            None
        }
        KeyCode::Char(digit @ '1'..='5') => {
            let index = (digit as usize) - ('1' as usize);
            StatusFilter::ALL
                .get(index)
                .map(|filter| DashboardCommand::SetStatusFilter(*filter))
        }
        KeyCode::Left | KeyCode::Char('h') => {
            view_data.column_cursor = view_data.column_cursor.saturating_sub(1);
            None
        }
        KeyCode::Right | KeyCode::Char('l') => {
            view_data.column_cursor = (view_data.column_cursor + 1).min(SortKey::ALL.len() - 1);
            None
        }
        KeyCode::Char('s') => SortKey::ALL
            .get(view_data.column_cursor)
            .map(|key| DashboardCommand::ClickColumn(*key)),
        KeyCode::Down | KeyCode::Char('j') => Some(DashboardCommand::MoveCursor(1)),
        KeyCode::Up | KeyCode::Char('k') => Some(DashboardCommand::MoveCursor(-1)),
        KeyCode::PageDown => Some(DashboardCommand::MoveCursor(page_rows(state))),
        KeyCode::PageUp => Some(DashboardCommand::MoveCursor(-page_rows(state))),
        KeyCode::Char('g') | KeyCode::Home => Some(DashboardCommand::MoveCursor(isize::MIN)),
        KeyCode::Char('G') | KeyCode::End => Some(DashboardCommand::MoveCursor(isize::MAX)),
        KeyCode::Enter | KeyCode::Char(' ') => Some(DashboardCommand::ActivateCursor),
        KeyCode::Esc => Some(DashboardCommand::ClearSelection),
        _ => None,
    };

    if let Some(command) = command {
        dispatch(state, view_data, internal_tx, command, now);
    }
    false
}

fn handle_search_key(
    state: &mut DashboardState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
    now: Instant,
) {
    let mut text = state.search_text().to_owned();
    match key.code {
        KeyCode::Enter | KeyCode::Esc => {
            view_data.search_editing = false;
            return;
        }
        KeyCode::Backspace => {
            if text.pop().is_none() {
                return;
            }
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => text.push(ch),
        _ => return,
    }
    dispatch(
        state,
        view_data,
        internal_tx,
        DashboardCommand::SearchInput(text),
        now,
    );
}

fn page_rows(state: &DashboardState) -> isize {
    isize::try_from(state.viewport().viewport_height())
        .unwrap_or(1)
        .max(1)
}

fn handle_mouse_event(
    state: &mut DashboardState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    mouse: MouseEvent,
    now: Instant,
) {
    let layout = view_data.layout;
    let (column, row) = (mouse.column, mouse.row);
    let command = match mouse.kind {
        MouseEventKind::ScrollDown if contains(layout.table, column, row) => {
            Some(DashboardCommand::ScrollBy(WHEEL_ROWS))
        }
        MouseEventKind::ScrollUp if contains(layout.table, column, row) => {
            Some(DashboardCommand::ScrollBy(-WHEEL_ROWS))
        }
        MouseEventKind::Down(MouseButton::Left) => click_command(state, &layout, column, row),
        _ => None,
    };
    if let Some(command) = command {
        if let DashboardCommand::ClickColumn(key) = command {
            view_data.column_cursor = SortKey::ALL
                .iter()
                .position(|candidate| *candidate == key)
                .unwrap_or(view_data.column_cursor);
        }
        view_data.search_editing = contains(layout.search, column, row);
        dispatch(state, view_data, internal_tx, command, now);
    } else if mouse.kind == MouseEventKind::Down(MouseButton::Left) {
        view_data.search_editing = contains(layout.search, column, row);
    }
}

fn click_command(
    state: &DashboardState,
    layout: &ScreenLayout,
    column: u16,
    row: u16,
) -> Option<DashboardCommand> {
    if contains(layout.table_header, column, row) {
        return layout.column_at(column).map(DashboardCommand::ClickColumn);
    }
    if contains(layout.table_body, column, row) {
        let position = state
            .viewport()
            .index_at(u32::from(row - layout.table_body.y))?;
        return Some(DashboardCommand::ClickRow(position));
    }
    if let Some((filter, _)) = layout
        .chip_rects()
        .into_iter()
        .find(|(_, rect)| contains(*rect, column, row))
    {
        return Some(DashboardCommand::SetStatusFilter(filter));
    }
    if contains(layout.search, column, row) && !state.search_text().is_empty() {
        let clear_x = layout.search.x.saturating_add(search_clear_column(state));
        if column == clear_x || column == clear_x.saturating_add(1) {
            return Some(DashboardCommand::ClearSearch);
        }
        return None;
    }
    if contains(layout.map_canvas, column, row) {
        let frame = state.map_frame();
        let view = MapView::new(layout.map_canvas, frame.center, frame.zoom);
        let point = view.unproject(column, row)?;
        return nearest_marker(&frame.markers, point, view.cell_degrees() * 1.5)
            .map(|marker| marker.click_command());
    }
    None
}

// "/ " prefix, the text, then " ×".
fn search_clear_column(state: &DashboardState) -> u16 {
    let width = 2 + state.search_text().chars().count();
    u16::try_from(width).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::{
        AppRuntime, InternalEvent, ViewData, click_command, handle_key_event, handle_mouse_event,
        poll_timeout, process_internal_events, request_load,
    };
    use crate::render::{self, MapView, ScreenLayout};
    use anyhow::Result;
    use crossterm::event::{
        KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    };
    use geodash_app::{
        DashboardCommand, DashboardConfig, DashboardState, Record, RecordId, RecordStatus,
        SortKey, SortState, StatusFilter,
    };
    use geodash_testkit::sample_record;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::layout::Rect;
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    #[derive(Debug, Default)]
    struct TestRuntime {
        records: Vec<Record>,
        error: Option<String>,
        loads: usize,
    }

    impl AppRuntime for TestRuntime {
        fn load_records(&mut self) -> Result<Vec<Record>> {
            self.loads += 1;
            if let Some(error) = self.error.take() {
                return Err(anyhow::anyhow!("{error}"));
            }
            Ok(self.records.clone())
        }
    }

    fn runtime() -> TestRuntime {
        TestRuntime {
            records: vec![
                sample_record(
                    "p1",
                    "Solar Farm North Alpha-001",
                    10.0,
                    20.0,
                    RecordStatus::Active,
                ),
                sample_record(
                    "p2",
                    "Wind Turbine South Beta-002",
                    -30.0,
                    -60.0,
                    RecordStatus::Pending,
                ),
                sample_record(
                    "p3",
                    "Hydro Plant East Gamma-003",
                    50.0,
                    100.0,
                    RecordStatus::Completed,
                ),
            ],
            ..TestRuntime::default()
        }
    }

    struct Harness {
        state: DashboardState,
        runtime: TestRuntime,
        view_data: ViewData,
        tx: mpsc::Sender<InternalEvent>,
        rx: mpsc::Receiver<InternalEvent>,
        now: Instant,
    }

    impl Harness {
        fn loaded() -> Self {
            let (tx, rx) = mpsc::channel();
            let config = DashboardConfig {
                row_height: 1,
                viewport_height: 20,
                ..DashboardConfig::default()
            };
            let mut harness = Self {
                state: DashboardState::new(config),
                runtime: runtime(),
                view_data: ViewData {
                    layout: ScreenLayout::new(Rect::new(0, 0, 160, 40)),
                    ..ViewData::default()
                },
                tx,
                rx,
                now: Instant::now(),
            };
            request_load(
                &mut harness.state,
                &mut harness.runtime,
                &mut harness.view_data,
                &harness.tx,
                harness.now,
            );
            harness.pump();
            harness
        }

        fn pump(&mut self) {
            process_internal_events(
                &mut self.state,
                &mut self.view_data,
                &self.tx,
                &self.rx,
                self.now,
            );
        }

        fn key(&mut self, code: KeyCode) -> bool {
            self.key_with(code, KeyModifiers::NONE)
        }

        fn key_with(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
            let quit = handle_key_event(
                &mut self.state,
                &mut self.runtime,
                &mut self.view_data,
                &self.tx,
                KeyEvent::new(code, modifiers),
                self.now,
            );
            self.pump();
            quit
        }

        fn click(&mut self, column: u16, row: u16) {
            let mouse = MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row,
                modifiers: KeyModifiers::NONE,
            };
            handle_mouse_event(
                &mut self.state,
                &mut self.view_data,
                &self.tx,
                mouse,
                self.now,
            );
        }

        fn advance(&mut self, by: Duration) {
            self.now += by;
            self.state.dispatch(DashboardCommand::Tick, self.now);
        }
    }

    #[test]
    fn startup_load_populates_state() {
        let harness = Harness::loaded();
        assert_eq!(harness.runtime.loads, 1);
        assert!(!harness.state.load_state().is_loading());
        assert_eq!(harness.state.counts().total, 3);
    }

    #[test]
    fn failed_load_surfaces_error_and_ctrl_r_retries() {
        let mut harness = Harness::loaded();
        harness.runtime.error = Some("source offline".to_owned());
        harness.key_with(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert_eq!(
            harness.state.load_state().error(),
            Some("source offline")
        );
        assert_eq!(harness.state.counts().total, 3);

        harness.key_with(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert_eq!(harness.runtime.loads, 3);
        assert!(harness.state.load_state().error().is_none());
    }

    #[test]
    fn stale_load_results_are_ignored() {
        let mut harness = Harness::loaded();
        harness
            .tx
            .send(InternalEvent::Loaded {
                request_id: 0,
                outcome: Ok(Vec::new()),
            })
            .expect("send");
        harness.pump();
        assert_eq!(harness.state.counts().total, 3);
    }

    #[test]
    fn typing_in_search_filters_after_debounce() {
        let mut harness = Harness::loaded();
        harness.key(KeyCode::Char('/'));
        assert!(harness.view_data.search_editing);
        for ch in "wind".chars() {
            harness.key(KeyCode::Char(ch));
        }
        assert_eq!(harness.state.search_text(), "wind");
        assert_eq!(harness.state.visible_len(), 3);

        harness.advance(Duration::from_millis(300));
        assert_eq!(harness.state.visible_len(), 1);

        harness.key(KeyCode::Backspace);
        assert_eq!(harness.state.search_text(), "win");
        harness.key(KeyCode::Enter);
        assert!(!harness.view_data.search_editing);

        harness.key_with(KeyCode::Char('u'), KeyModifiers::CONTROL);
        assert_eq!(harness.state.search_text(), "");
        assert_eq!(harness.state.visible_len(), 3);
    }

    #[test]
    fn q_does_not_quit_while_editing_search() {
        let mut harness = Harness::loaded();
        harness.key(KeyCode::Char('/'));
        assert!(!harness.key(KeyCode::Char('q')));
        harness.key(KeyCode::Esc);
        assert!(harness.key(KeyCode::Char('q')));
    }

    #[test]
    fn digit_keys_pick_status_filter() {
        let mut harness = Harness::loaded();
        harness.key(KeyCode::Char('3'));
        assert_eq!(
            harness.state.filter().status,
            StatusFilter::Only(RecordStatus::Pending)
        );
        assert_eq!(harness.state.visible_len(), 1);
        harness.key(KeyCode::Char('1'));
        assert_eq!(harness.state.filter().status, StatusFilter::All);
    }

    #[test]
    fn column_cursor_and_s_cycle_sort() {
        let mut harness = Harness::loaded();
        harness.key(KeyCode::Right);
        harness.key(KeyCode::Char('s'));
        assert_eq!(harness.state.sort().key(), Some(SortKey::Latitude));
        harness.key(KeyCode::Char('s'));
        harness.key(KeyCode::Char('s'));
        assert_eq!(harness.state.sort(), SortState::Unsorted);

        for _ in 0..10 {
            harness.key(KeyCode::Right);
        }
        assert_eq!(harness.view_data.column_cursor, SortKey::ALL.len() - 1);
    }

    #[test]
    fn enter_toggles_selection_at_cursor() {
        let mut harness = Harness::loaded();
        harness.key(KeyCode::Char('j'));
        harness.key(KeyCode::Char('j'));
        harness.key(KeyCode::Enter);
        assert!(harness.state.selection().is_selected(&RecordId::from("p2")));
        harness.key(KeyCode::Enter);
        assert!(harness.state.selection().current().is_none());
    }

    #[test]
    fn esc_clears_selection_dropped_by_reload() {
        let mut harness = Harness::loaded();
        harness.key(KeyCode::Char('j'));
        harness.key(KeyCode::Enter);
        assert!(harness.state.selection().is_selected(&RecordId::from("p1")));

        harness.runtime.records.remove(0);
        harness.key_with(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert_eq!(harness.state.counts().total, 2);
        assert!(harness.state.selection().is_selected(&RecordId::from("p1")));

        harness.key(KeyCode::Esc);
        assert!(harness.state.selection().current().is_none());
    }

    #[test]
    fn search_clear_glyph_hit_test_survives_long_text() {
        let mut harness = Harness::loaded();
        let search = harness.view_data.layout.search;
        harness
            .state
            .dispatch(DashboardCommand::SearchInput("wind".to_owned()), harness.now);
        // "/ wind" then " ×": the glyph sits two cells past the text.
        assert_eq!(
            click_command(&harness.state, &harness.view_data.layout, search.x + 7, search.y),
            Some(DashboardCommand::ClearSearch)
        );

        harness
            .state
            .dispatch(DashboardCommand::SearchInput("x".repeat(70_000)), harness.now);
        assert_eq!(
            click_command(&harness.state, &harness.view_data.layout, search.x + 3, search.y),
            None
        );
    }

    #[test]
    fn status_clear_only_honors_latest_token() {
        let mut harness = Harness::loaded();
        harness.key(KeyCode::Char('2'));
        let first = harness.view_data.status_token;
        harness.key(KeyCode::Char('3'));
        let latest = harness.view_data.status_token;
        assert!(latest > first);

        harness
            .tx
            .send(InternalEvent::ClearStatus { token: first })
            .expect("send");
        harness.pump();
        assert!(harness.state.status_line().is_some());

        harness
            .tx
            .send(InternalEvent::ClearStatus { token: latest })
            .expect("send");
        harness.pump();
        assert!(harness.state.status_line().is_none());
    }

    #[test]
    fn header_click_sorts_that_column() {
        let mut harness = Harness::loaded();
        let layout = harness.view_data.layout;
        let status_column = layout.columns[3];
        harness.click(status_column.x, layout.table_header.y);
        assert_eq!(harness.state.sort().key(), Some(SortKey::Status));
        assert_eq!(harness.view_data.column_cursor, 3);
    }

    #[test]
    fn row_click_selects_visible_row() {
        let mut harness = Harness::loaded();
        let layout = harness.view_data.layout;
        harness.click(layout.table_body.x + 2, layout.table_body.y + 2);
        assert!(harness.state.selection().is_selected(&RecordId::from("p3")));
    }

    #[test]
    fn chip_click_sets_filter() {
        let mut harness = Harness::loaded();
        let chips = harness.view_data.layout.chip_rects();
        let (filter, rect) = chips[4];
        harness.click(rect.x + 1, rect.y);
        assert_eq!(harness.state.filter().status, filter);
        assert_eq!(harness.state.visible_len(), 0);
    }

    #[test]
    fn marker_click_selects_nearest_record() {
        let harness = Harness::loaded();
        let layout = harness.view_data.layout;
        let frame = harness.state.map_frame();
        let view = MapView::new(layout.map_canvas, frame.center, frame.zoom);

        let mut hit = None;
        'outer: for row in layout.map_canvas.y..layout.map_canvas.y + layout.map_canvas.height {
            for column in layout.map_canvas.x..layout.map_canvas.x + layout.map_canvas.width {
                let Some(point) = view.unproject(column, row) else {
                    continue;
                };
                if (point.lat - 50.0).abs() < view.cell_degrees()
                    && (point.lng - 100.0).abs() < view.cell_degrees()
                {
                    hit = Some((column, row));
                    break 'outer;
                }
            }
        }
        let (column, row) = hit.expect("marker cell on screen");
        let command = click_command(&harness.state, &layout, column, row);
        assert_eq!(
            command,
            Some(DashboardCommand::ClickMarker(RecordId::from("p3")))
        );
    }

    #[test]
    fn poll_timeout_is_bounded_by_debounce_deadline() {
        let mut harness = Harness::loaded();
        assert_eq!(
            poll_timeout(&harness.state, harness.now),
            Duration::from_millis(120)
        );
        harness.key(KeyCode::Char('/'));
        harness.key(KeyCode::Char('x'));
        let timeout = poll_timeout(&harness.state, harness.now + Duration::from_millis(250));
        assert_eq!(timeout, Duration::from_millis(50));
    }

    #[test]
    fn render_shows_loading_then_table() -> Result<()> {
        let backend = TestBackend::new(160, 40);
        let mut terminal = Terminal::new(backend)?;
        let mut state = DashboardState::default();
        let mut view_data = ViewData::default();

        terminal.draw(|frame| {
            view_data.layout = ScreenLayout::new(frame.area());
            render::render(frame, &state, &view_data);
        })?;
        let screen = format!("{:?}", terminal.backend().buffer());
        assert!(screen.contains("Loading projects..."));

        state.dispatch(
            DashboardCommand::LoadSucceeded(runtime().records),
            Instant::now(),
        );
        terminal.draw(|frame| {
            view_data.layout = ScreenLayout::new(frame.area());
            render::render(frame, &state, &view_data);
        })?;
        let screen = format!("{:?}", terminal.backend().buffer());
        assert!(screen.contains("3 geo-spatial projects"));
        assert!(screen.contains("Solar Farm North Alpha-001"));
        assert!(screen.contains("Showing 3 projects"));
        assert!(screen.contains("Project Name ↕"));
        Ok(())
    }
}
