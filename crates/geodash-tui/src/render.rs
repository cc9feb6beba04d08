// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use geodash_app::{
    DEFAULT_ZOOM, DashboardState, GeoPoint, LoadState, MapFrame, MarkerDescriptor, Record, Rgb,
    SortKey, StatusFilter, format_count, legend, status_color,
};
use ratatui::layout::{Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Circle, Map, MapResolution, Points};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};

use crate::ViewData;

const SEARCH_WIDTH: u16 = 36;
const INFO_WIDTH: u16 = 26;
const MAP_INFO_LINES: u16 = 3;
const SEARCH_PLACEHOLDER: &str = "Search projects...";

pub(crate) const COLUMN_WIDTHS: [Constraint; 5] = [
    Constraint::Fill(1),
    Constraint::Length(10),
    Constraint::Length(11),
    Constraint::Length(10),
    Constraint::Length(12),
];

/// Screen regions from the last draw. Mouse hit-testing reads the same
/// rectangles the renderer painted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct ScreenLayout {
    pub title: Rect,
    pub filters: Rect,
    pub search: Rect,
    pub chips: Rect,
    pub info: Rect,
    pub table: Rect,
    pub table_header: Rect,
    pub table_body: Rect,
    pub columns: [Rect; 5],
    pub map: Rect,
    pub map_canvas: Rect,
    pub map_info: Rect,
    pub status: Rect,
}

impl ScreenLayout {
    pub fn new(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(1),
            ])
            .split(area);
        let (title, filters, body, status) = (rows[0], rows[1], rows[2], rows[3]);

        let filter_inner = filters.inner(Margin::new(1, 1));
        let filter_parts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(SEARCH_WIDTH),
                Constraint::Min(10),
                Constraint::Length(INFO_WIDTH),
            ])
            .split(filter_inner);

        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(body);
        let (table, map) = (panes[0], panes[1]);

        let table_inner = table.inner(Margin::new(1, 1));
        let table_header = Rect {
            height: table_inner.height.min(1),
            ..table_inner
        };
        let table_body = Rect {
            y: table_inner.y.saturating_add(1),
            height: table_inner.height.saturating_sub(1),
            ..table_inner
        };
        let column_parts = Layout::horizontal(COLUMN_WIDTHS)
            .spacing(1)
            .split(table_inner);
        let columns = std::array::from_fn(|index| {
            column_parts.get(index).copied().unwrap_or_default()
        });

        let map_inner = map.inner(Margin::new(1, 1));
        let info_height = MAP_INFO_LINES.min(map_inner.height);
        let map_canvas = Rect {
            height: map_inner.height - info_height,
            ..map_inner
        };
        let map_info = Rect {
            y: map_canvas.y + map_canvas.height,
            height: info_height,
            ..map_inner
        };

        Self {
            title,
            filters,
            search: filter_parts[0],
            chips: filter_parts[1],
            info: filter_parts[2],
            table,
            table_header,
            table_body,
            columns,
            map,
            map_canvas,
            map_info,
            status,
        }
    }

    pub fn column_at(&self, column: u16) -> Option<SortKey> {
        self.columns
            .iter()
            .position(|rect| column >= rect.x && column < rect.x + rect.width)
            .and_then(|index| SortKey::ALL.get(index).copied())
    }

    pub fn chip_rects(&self) -> Vec<(StatusFilter, Rect)> {
        let mut x = self.chips.x;
        let right = self.chips.x + self.chips.width;
        let mut out = Vec::with_capacity(StatusFilter::ALL.len());
        for filter in StatusFilter::ALL {
            let width = chip_label(filter).chars().count() as u16;
            if x + width > right {
                break;
            }
            out.push((
                filter,
                Rect {
                    x,
                    y: self.chips.y,
                    width,
                    height: 1,
                },
            ));
            x += width + 1;
        }
        out
    }
}

pub(crate) fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x && column < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
}

fn chip_label(filter: StatusFilter) -> String {
    format!(" {} ", filter.label())
}

/// Equirectangular window onto the world for the current camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MapView {
    pub area: Rect,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl MapView {
    pub fn new(area: Rect, center: GeoPoint, zoom: f64) -> Self {
        let scale = 2f64.powf((zoom - DEFAULT_ZOOM).max(0.0));
        let half_lng = 180.0 / scale;
        let half_lat = 90.0 / scale;
        Self {
            area,
            x_bounds: [center.lng - half_lng, center.lng + half_lng],
            y_bounds: [center.lat - half_lat, center.lat + half_lat],
        }
    }

    pub fn unproject(&self, column: u16, row: u16) -> Option<GeoPoint> {
        if !contains(self.area, column, row) {
            return None;
        }
        let fx = (f64::from(column - self.area.x) + 0.5) / f64::from(self.area.width);
        let fy = (f64::from(row - self.area.y) + 0.5) / f64::from(self.area.height);
        Some(GeoPoint::new(
            self.y_bounds[1] - fy * (self.y_bounds[1] - self.y_bounds[0]),
            self.x_bounds[0] + fx * (self.x_bounds[1] - self.x_bounds[0]),
        ))
    }

    /// Largest extent of one terminal cell in degrees.
    pub fn cell_degrees(&self) -> f64 {
        let width = f64::from(self.area.width.max(1));
        let height = f64::from(self.area.height.max(1));
        ((self.x_bounds[1] - self.x_bounds[0]) / width)
            .max((self.y_bounds[1] - self.y_bounds[0]) / height)
    }
}

pub(crate) fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

pub(crate) fn render(frame: &mut ratatui::Frame<'_>, state: &DashboardState, view_data: &ViewData) {
    let layout = &view_data.layout;

    let title = Paragraph::new(title_text(state)).style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );
    frame.render_widget(title, layout.title);

    render_filters(frame, state, view_data);
    render_table(frame, state, view_data);
    render_map(frame, state, layout);

    let status =
        Paragraph::new(status_text(state, view_data)).style(Style::default().fg(Color::Yellow));
    frame.render_widget(status, layout.status);

    if view_data.help_visible {
        let area = centered_rect(70, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

pub(crate) fn title_text(state: &DashboardState) -> String {
    format!(
        "Geo Data Dashboard | Interactive visualization of {} geo-spatial projects",
        format_count(state.counts().total)
    )
}

fn render_filters(frame: &mut ratatui::Frame<'_>, state: &DashboardState, view_data: &ViewData) {
    let layout = &view_data.layout;
    let border = if view_data.search_editing {
        Color::Cyan
    } else {
        Color::Gray
    };
    frame.render_widget(
        Block::default()
            .title("filters")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
        layout.filters,
    );

    frame.render_widget(Paragraph::new(search_line(state, view_data)), layout.search);

    let active = state.filter().status;
    let mut chips = Vec::new();
    for (index, (filter, _)) in layout.chip_rects().into_iter().enumerate() {
        if index > 0 {
            chips.push(Span::raw(" "));
        }
        let style = if filter == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        chips.push(Span::styled(chip_label(filter), style));
    }
    frame.render_widget(Paragraph::new(Line::from(chips)), layout.chips);

    if let Some(info) = state.counts().filter_info() {
        frame.render_widget(
            Paragraph::new(info).style(Style::default().fg(Color::Cyan)),
            layout.info,
        );
    }
}

pub(crate) fn search_line(state: &DashboardState, view_data: &ViewData) -> Line<'static> {
    let text = state.search_text();
    let mut spans = vec![Span::styled("/ ", Style::default().fg(Color::DarkGray))];
    if text.is_empty() && !view_data.search_editing {
        spans.push(Span::styled(
            SEARCH_PLACEHOLDER,
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        spans.push(Span::raw(text.to_owned()));
    }
    if view_data.search_editing {
        spans.push(Span::styled("▏", Style::default().fg(Color::Cyan)));
    }
    if !text.is_empty() {
        spans.push(Span::styled(" ×", Style::default().fg(Color::DarkGray)));
    }
    Line::from(spans)
}

fn render_table(frame: &mut ratatui::Frame<'_>, state: &DashboardState, view_data: &ViewData) {
    let layout = &view_data.layout;
    let counts = state.counts();
    let block = Block::default()
        .title("projects")
        .title_bottom(format!("Showing {} projects", format_count(counts.filtered)))
        .borders(Borders::ALL);

    let message = match state.load_state() {
        LoadState::Loading => Some("Loading projects...".to_owned()),
        LoadState::Failed(error) => Some(format!("Error: {error}\n\nctrl+r to retry")),
        LoadState::Ready if counts.filtered == 0 => {
            Some("No projects match the current filters".to_owned())
        }
        LoadState::Ready => None,
    };
    if let Some(message) = message {
        let body = Paragraph::new(message)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::Gray))
            .block(block);
        frame.render_widget(body, layout.table);
        return;
    }

    let header = Row::new(SortKey::ALL.iter().enumerate().map(|(index, key)| {
        let mut style = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);
        if index == view_data.column_cursor {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        Cell::from(header_label(state, *key)).style(style)
    }));

    let offset = state.viewport().scroll_offset();
    let selected = state.selected_position();
    let cursor = state.cursor();
    let rows = state
        .window()
        .into_iter()
        .filter(|row| row.start >= offset)
        .filter_map(|row| {
            let record = state.visible_record(row.index)?;
            let mut style = Style::default();
            if cursor == Some(row.index) {
                style = style.bg(Color::DarkGray);
            }
            if selected == Some(row.index) {
                style = style
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD);
            }
            Some(table_row(record).style(style))
        });

    let table = Table::new(rows, COLUMN_WIDTHS)
        .header(header)
        .column_spacing(1)
        .block(block);
    frame.render_widget(table, layout.table);
}

pub(crate) fn header_label(state: &DashboardState, key: SortKey) -> String {
    format!("{} {}", key.label(), state.sort_indicator(key))
}

fn table_row(record: &Record) -> Row<'static> {
    Row::new(vec![
        Cell::from(record.name.clone()),
        Cell::from(format!("{:.4}", record.latitude)),
        Cell::from(format!("{:.4}", record.longitude)),
        Cell::from(record.status_label())
            .style(Style::default().fg(color(status_color(record.status)))),
        Cell::from(record.last_updated.clone()),
    ])
}

fn render_map(frame: &mut ratatui::Frame<'_>, state: &DashboardState, layout: &ScreenLayout) {
    frame.render_widget(
        Block::default().title("map").borders(Borders::ALL),
        layout.map,
    );

    let map_frame = state.map_frame();
    let view = MapView::new(layout.map_canvas, map_frame.center, map_frame.zoom);
    let groups = marker_groups(&map_frame.markers);
    let selected = map_frame.selected_marker().cloned();
    let circle_radius = view.cell_degrees() * 1.5;

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds(view.x_bounds)
        .y_bounds(view.y_bounds)
        .paint(move |ctx| {
            ctx.draw(&Map {
                resolution: MapResolution::High,
                color: Color::DarkGray,
            });
            ctx.layer();
            for (rgb, coords) in &groups {
                ctx.draw(&Points {
                    coords,
                    color: color(*rgb),
                });
            }
            if let Some(marker) = &selected {
                ctx.layer();
                ctx.draw(&Circle {
                    x: marker.point.lng,
                    y: marker.point.lat,
                    radius: circle_radius,
                    color: color(marker.style.stroke),
                });
                ctx.draw(&Points {
                    coords: &[(marker.point.lng, marker.point.lat)],
                    color: color(marker.style.fill),
                });
            }
        });
    frame.render_widget(canvas, layout.map_canvas);

    frame.render_widget(
        Paragraph::new(map_info_lines(state, &map_frame)),
        layout.map_info,
    );
}

// One point cloud per color keeps draw calls bounded by the palette size.
fn marker_groups(markers: &[MarkerDescriptor]) -> Vec<(Rgb, Vec<(f64, f64)>)> {
    let mut groups: Vec<(Rgb, Vec<(f64, f64)>)> = Vec::new();
    for marker in markers.iter().filter(|marker| !marker.is_selected()) {
        let coord = (marker.point.lng, marker.point.lat);
        match groups.iter_mut().find(|(rgb, _)| *rgb == marker.style.fill) {
            Some((_, coords)) => coords.push(coord),
            None => groups.push((marker.style.fill, vec![coord])),
        }
    }
    groups
}

pub(crate) fn map_info_lines(state: &DashboardState, map_frame: &MapFrame) -> Vec<Line<'static>> {
    let mut legend_spans = Vec::new();
    for (label, rgb) in legend() {
        legend_spans.push(Span::styled("● ", Style::default().fg(color(rgb))));
        legend_spans.push(Span::raw(format!("{label}  ")));
    }
    let mut lines = vec![Line::from(legend_spans)];

    lines.push(Line::styled(
        map_frame.note.clone().unwrap_or_default(),
        Style::default().fg(Color::DarkGray),
    ));

    let popup = match state.selection().current() {
        Some(record) => popup_text(record),
        None => "select a row or marker".to_owned(),
    };
    lines.push(Line::raw(popup));
    lines
}

pub(crate) fn popup_text(record: &Record) -> String {
    format!(
        "{} | {} | {:.4}, {:.4} | updated {}",
        record.name,
        record.status_label(),
        record.latitude,
        record.longitude,
        record.last_updated
    )
}

pub(crate) fn status_text(state: &DashboardState, view_data: &ViewData) -> String {
    let (mode, hints) = if view_data.search_editing {
        ("SEARCH", "type to filter | enter/esc done | ctrl+u clear")
    } else {
        (
            "NAV",
            "/ search | 1-5 status | h/l s sort | j/k enter select | ctrl+r reload | ? help | q quit",
        )
    };
    match state.status_line() {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

pub(crate) fn help_overlay_text() -> &'static str {
    "search: / edit | type filters after a pause | enter/esc done | ctrl+u clear\n\
status: 1 all | 2 active | 3 pending | 4 completed | 5 on hold\n\
sort: h/l or left/right pick column | s cycle asc, desc, off\n\
rows: j/k up/down | pgup/pgdn | g/G first/last | enter/space select or deselect\n\
mouse: click header sort | click row or marker select | click chip filter | wheel scroll\n\
global: ctrl+r reload | ? help | q or ctrl+q quit"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
