// chat_viewport - List virtualization engine for chat transcripts
// Copyright (C) 2025  Simon Peter Rothgang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Visible range calculation.
//!
//! The start of the range comes from a binary search over the position index.
//! The end is found by walking forward from the start until the viewport is
//! covered, so the cost is `O(log n + k)` for `k` visible items regardless of
//! how uneven the item heights are.

use super::height_cache::sanitize_height;
use super::position_index::PositionIndex;
use serde::Serialize;

/// Inclusive index range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct IndexRange {
    pub start: usize,
    pub end: usize,
}

impl IndexRange {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn contains(self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }

    /// `true` if every index of `other` is also in `self`.
    #[must_use]
    pub const fn covers(self, other: Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Result of one range computation.
///
/// `visible` is the strictly visible range; `rendered` adds overscan on both
/// sides. For an empty list both ranges are `[0, 0]` and [`Self::is_empty`]
/// is `true`: callers must render nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ComputedRange {
    pub visible: IndexRange,
    pub rendered: IndexRange,
    pub item_count: usize,
}

impl ComputedRange {
    pub const EMPTY: Self =
        Self { visible: IndexRange::new(0, 0), rendered: IndexRange::new(0, 0), item_count: 0 };

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.item_count == 0
    }

    /// Indices the renderer should materialize.
    #[must_use]
    pub fn indices(&self) -> std::ops::Range<usize> {
        if self.is_empty() { 0..0 } else { self.rendered.start..self.rendered.end + 1 }
    }
}

/// Clamp a raw scroll offset into `[0, total_height]`. NaN maps to 0.
#[must_use]
pub fn clamp_scroll_top(scroll_top: f64, total_height: f64) -> f64 {
    if scroll_top.is_nan() {
        return 0.0;
    }
    scroll_top.clamp(0.0, total_height.max(0.0))
}

/// Compute the visible and overscanned index ranges for a viewport.
#[must_use]
pub fn compute_range(
    index: &PositionIndex,
    scroll_top: f64,
    client_height: f64,
    overscan: usize,
) -> ComputedRange {
    let Some(last) = index.len().checked_sub(1) else {
        return ComputedRange::EMPTY;
    };

    let scroll_top = clamp_scroll_top(scroll_top, index.total_height());
    let viewport_bottom = scroll_top + sanitize_height(client_height);

    let start = index.first_visible(scroll_top).unwrap_or(last);
    let mut end = start;
    while end < last && index.bottom_of(end) < viewport_bottom {
        end += 1;
    }

    ComputedRange {
        visible: IndexRange::new(start, end),
        rendered: IndexRange::new(start.saturating_sub(overscan), end.saturating_add(overscan).min(last)),
        item_count: index.len(),
    }
}
