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

//! Programmatic scrolling and scroll-position preservation across list changes.
//!
//! Append-only feeds follow new content only while the reader sits at the
//! bottom. Anyone who has scrolled up keeps their absolute offset.

use super::position_index::PositionIndex;
use serde::{Deserialize, Serialize};

/// Distance from the bottom edge that still counts as pinned, in px.
pub const PIN_TOLERANCE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollAlign {
    /// Item top at the viewport top.
    #[default]
    Start,
    /// Item bottom at the viewport bottom.
    End,
    Center,
    /// Keep the current offset if the item is fully visible, otherwise the
    /// smallest scroll that brings it into view.
    Auto,
}

/// Where re-anchoring left the scroll offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "scroll_top", rename_all = "snake_case")]
pub enum Reanchor {
    PinnedToBottom(f64),
    Preserved(f64),
}

impl Reanchor {
    #[must_use]
    pub fn scroll_top(self) -> f64 {
        match self {
            Self::PinnedToBottom(top) | Self::Preserved(top) => top,
        }
    }
}

/// Top offset of item `index`, the target for a scroll-to-index request.
#[must_use]
pub fn offset_of(index: &PositionIndex, item: usize) -> f64 {
    index.offset_of(item)
}

/// Largest valid scroll offset. 0 when the content fits the viewport.
#[must_use]
pub fn max_scroll_top(total_height: f64, client_height: f64) -> f64 {
    (total_height - client_height).max(0.0)
}

#[must_use]
pub fn is_pinned_to_bottom(
    scroll_top: f64,
    client_height: f64,
    scroll_height: f64,
    tolerance: f64,
) -> bool {
    scroll_height - (scroll_top + client_height) <= tolerance
}

/// Scroll offset after the list changed from `previous` geometry to `total_height`.
///
/// Pinned lists are re-pinned to the new bottom. Otherwise the offset is kept,
/// only clamped when the content shrank below it.
#[must_use]
pub fn reanchor(
    previous_scroll_top: f64,
    previous_scroll_height: f64,
    client_height: f64,
    total_height: f64,
    tolerance: f64,
) -> Reanchor {
    let max = max_scroll_top(total_height, client_height);
    if is_pinned_to_bottom(previous_scroll_top, client_height, previous_scroll_height, tolerance) {
        Reanchor::PinnedToBottom(max)
    } else {
        Reanchor::Preserved(previous_scroll_top.clamp(0.0, max))
    }
}

/// Scroll offset that brings item `item` into view with the given alignment.
///
/// The result is clamped to `[0, max_scroll_top]`. An empty list yields 0.
#[must_use]
pub fn scroll_to_index_offset(
    index: &PositionIndex,
    item: usize,
    align: ScrollAlign,
    current_scroll_top: f64,
    client_height: f64,
) -> f64 {
    let Some(last) = index.len().checked_sub(1) else {
        return 0.0;
    };
    let item = item.min(last);
    let top = index.offset_of(item);
    let bottom = index.bottom_of(item);

    let target = match align {
        ScrollAlign::Start => top,
        ScrollAlign::End => bottom - client_height,
        ScrollAlign::Center => top + (bottom - top) / 2.0 - client_height / 2.0,
        ScrollAlign::Auto => {
            let view_bottom = current_scroll_top + client_height;
            if top >= current_scroll_top && bottom <= view_bottom {
                current_scroll_top
            } else if top < current_scroll_top {
                top
            } else {
                bottom - client_height
            }
        }
    };

    target.clamp(0.0, max_scroll_top(index.total_height(), client_height))
}
