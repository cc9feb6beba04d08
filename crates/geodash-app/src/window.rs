// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::ops::RangeInclusive;
use std::time::{Duration, Instant};

pub const DEFAULT_OVERSCAN: usize = 10;
pub const DEFAULT_SCROLL_ANIMATION: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualRow {
    pub index: usize,
    pub start: u64,
    pub size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAlign {
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// Imperative "bring row `index` into view" request handed to the list
/// surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollCommand {
    pub index: usize,
    pub target_offset: u64,
    pub align: ScrollAlign,
    pub behavior: ScrollBehavior,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollAnimation {
    from: u64,
    to: u64,
    started: Instant,
    duration: Duration,
}

impl ScrollAnimation {
    pub fn target(&self) -> u64 {
        self.to
    }

    pub fn offset_at(&self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.started);
        if self.duration.is_zero() || elapsed >= self.duration {
            return self.to;
        }
        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        let eased = 1.0 - (1.0 - t).powi(3);
        let from = self.from as f64;
        let to = self.to as f64;
        (from + (to - from) * eased).round().max(0.0) as u64
    }

    pub fn finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.duration
    }
}

/// Fixed-height row virtualization: all geometry is derived from the item
/// count, the row height and the scroll offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListViewport {
    item_count: usize,
    row_height: u32,
    viewport_height: u32,
    overscan: usize,
    scroll_offset: u64,
    scroll_duration: Duration,
    animation: Option<ScrollAnimation>,
}

impl ListViewport {
    pub fn new(row_height: u32, viewport_height: u32) -> Self {
        Self {
            item_count: 0,
            row_height: row_height.max(1),
            viewport_height,
            overscan: DEFAULT_OVERSCAN,
            scroll_offset: 0,
            scroll_duration: DEFAULT_SCROLL_ANIMATION,
            animation: None,
        }
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_scroll_duration(mut self, duration: Duration) -> Self {
        self.scroll_duration = duration;
        self
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn row_height(&self) -> u32 {
        self.row_height
    }

    pub fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    pub fn overscan(&self) -> usize {
        self.overscan
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    pub fn animation(&self) -> Option<&ScrollAnimation> {
        self.animation.as_ref()
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn total_size(&self) -> u64 {
        self.item_count as u64 * u64::from(self.row_height)
    }

    pub fn max_offset(&self) -> u64 {
        self.total_size()
            .saturating_sub(u64::from(self.viewport_height))
    }

    pub fn set_item_count(&mut self, item_count: usize) {
        self.item_count = item_count;
        self.clamp();
    }

    pub fn resize(&mut self, viewport_height: u32) {
        self.viewport_height = viewport_height;
        self.clamp();
    }

    /// Rows that intersect the viewport, without overscan.
    pub fn visible_range(&self) -> Option<RangeInclusive<usize>> {
        if self.item_count == 0 || self.viewport_height == 0 {
            return None;
        }
        let height = u64::from(self.row_height);
        let last_row = self.item_count - 1;
        let first = usize::try_from(self.scroll_offset / height).ok()?;
        if first > last_row {
            return None;
        }
        let bottom = self.scroll_offset + u64::from(self.viewport_height) - 1;
        let last = usize::try_from(bottom / height)
            .unwrap_or(usize::MAX)
            .min(last_row);
        Some(first..=last)
    }

    /// Rows to materialize: the visible range widened by the overscan on
    /// each side and clamped to the list.
    pub fn window(&self) -> Option<RangeInclusive<usize>> {
        let visible = self.visible_range()?;
        let start = visible.start().saturating_sub(self.overscan);
        let end = visible
            .end()
            .saturating_add(self.overscan)
            .min(self.item_count - 1);
        Some(start..=end)
    }

    pub fn virtual_rows(&self) -> Vec<VirtualRow> {
        let Some(window) = self.window() else {
            return Vec::new();
        };
        window
            .map(|index| VirtualRow {
                index,
                start: self.row_start(index),
                size: self.row_height,
            })
            .collect()
    }

    pub fn row_start(&self, index: usize) -> u64 {
        index as u64 * u64::from(self.row_height)
    }

    /// Row under a point `y` measured from the top of the viewport.
    pub fn index_at(&self, y: u32) -> Option<usize> {
        if y >= self.viewport_height {
            return None;
        }
        let absolute = self.scroll_offset + u64::from(y);
        let index = usize::try_from(absolute / u64::from(self.row_height)).ok()?;
        (index < self.item_count).then_some(index)
    }

    pub fn scroll_by(&mut self, delta: i64) {
        let next = if delta.is_negative() {
            self.scroll_offset.saturating_sub(delta.unsigned_abs())
        } else {
            self.scroll_offset.saturating_add(delta as u64)
        };
        self.scroll_to(next);
    }

    /// User-driven scroll; interrupts any running animation.
    pub fn scroll_to(&mut self, offset: u64) {
        self.animation = None;
        self.scroll_offset = offset.min(self.max_offset());
    }

    pub fn centered_offset(&self, index: usize) -> u64 {
        let row_center = self.row_start(index) + u64::from(self.row_height / 2);
        row_center
            .saturating_sub(u64::from(self.viewport_height / 2))
            .min(self.max_offset())
    }

    /// Starts an animated scroll that centers row `index`. Returns `None`
    /// when the row does not exist or the list already rests (or is already
    /// heading) at the centered offset.
    pub fn scroll_to_index_centered(
        &mut self,
        index: usize,
        now: Instant,
    ) -> Option<ScrollCommand> {
        if index >= self.item_count {
            return None;
        }
        let target = self.centered_offset(index);
        let destination = self
            .animation
            .map_or(self.scroll_offset, |animation| animation.to);
        if destination == target {
            return None;
        }

        let behavior = if self.scroll_duration.is_zero() {
            self.animation = None;
            self.scroll_offset = target;
            ScrollBehavior::Instant
        } else {
            self.animation = Some(ScrollAnimation {
                from: self.scroll_offset,
                to: target,
                started: now,
                duration: self.scroll_duration,
            });
            ScrollBehavior::Smooth
        };

        Some(ScrollCommand {
            index,
            target_offset: target,
            align: ScrollAlign::Center,
            behavior,
        })
    }

    /// Moves the offset the least amount that shows row `index` entirely.
    pub fn ensure_visible(&mut self, index: usize) {
        if index >= self.item_count {
            return;
        }
        let start = self.row_start(index);
        let end = start + u64::from(self.row_height);
        let viewport = u64::from(self.viewport_height);
        if start < self.scroll_offset {
            self.scroll_to(start);
        } else if end > self.scroll_offset + viewport {
            self.scroll_to(end.saturating_sub(viewport));
        }
    }

    /// Advances a running animation. Returns true while one is in flight.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(animation) = self.animation else {
            return false;
        };
        self.scroll_offset = animation.offset_at(now).min(self.max_offset());
        if animation.finished(now) {
            self.animation = None;
            return false;
        }
        true
    }

    fn clamp(&mut self) {
        let max = self.max_offset();
        self.scroll_offset = self.scroll_offset.min(max);
        if let Some(animation) = &mut self.animation {
            animation.to = animation.to.min(max);
            animation.from = animation.from.min(max);
        }
    }
}
