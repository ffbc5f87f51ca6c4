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

//! Prefix-sum table of item offsets.
//!
//! `offsets[i]` is the top edge of item `i`; an extra trailing entry holds the
//! total height, so `offsets[i + 1] - offsets[i]` is the height of item `i`.
//! The table is rebuilt in one forward pass into a fresh buffer and only then
//! swapped in, so a range query never observes a half-built index.

use super::height_cache::{HeightCache, sanitize_height};
use super::item::{HeightFn, Item};

#[derive(Debug, Clone, PartialEq)]
pub struct PositionIndex {
    /// `len + 1` entries; the first is always 0 and the last is the total height.
    offsets: Vec<f64>,
}

impl PositionIndex {
    #[must_use]
    pub fn new() -> Self {
        Self { offsets: vec![0.0] }
    }

    /// Build the index for `items`, resolving heights through `cache`.
    #[must_use]
    pub fn build(items: &[Item], cache: &mut HeightCache, measure: Option<&HeightFn>) -> Self {
        let mut offsets = Vec::with_capacity(items.len() + 1);
        let mut top = 0.0;
        offsets.push(top);
        for (i, item) in items.iter().enumerate() {
            top += cache.height_of(item, i, measure);
            offsets.push(top);
        }
        Self { offsets }
    }

    /// Build directly from raw heights. Invalid heights are clamped to 0.
    #[must_use]
    pub fn from_heights(heights: impl IntoIterator<Item = f64>) -> Self {
        let mut offsets = vec![0.0];
        let mut top = 0.0;
        for height in heights {
            top += sanitize_height(height);
            offsets.push(top);
        }
        Self { offsets }
    }

    /// Replace the contents with a freshly built index for `items`.
    pub fn rebuild(&mut self, items: &[Item], cache: &mut HeightCache, measure: Option<&HeightFn>) {
        *self = Self::build(items, cache, measure);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn total_height(&self) -> f64 {
        self.offsets.last().copied().unwrap_or(0.0)
    }

    /// Top offsets of every item, without the trailing total.
    #[must_use]
    pub fn positions(&self) -> &[f64] {
        &self.offsets[..self.len()]
    }

    /// Top edge of item `index`. Indices past the end map to the total height.
    #[must_use]
    pub fn offset_of(&self, index: usize) -> f64 {
        self.offsets[index.min(self.len())]
    }

    /// Bottom edge of item `index`, clamped like [`Self::offset_of`].
    #[must_use]
    pub fn bottom_of(&self, index: usize) -> f64 {
        self.offsets[index.saturating_add(1).min(self.len())]
    }

    #[must_use]
    pub fn height_of(&self, index: usize) -> f64 {
        self.bottom_of(index) - self.offset_of(index)
    }

    /// First item whose bottom edge lies below `scroll_top`.
    ///
    /// When `scroll_top` is at or past the end of the content the last item is
    /// returned. `None` only for an empty index.
    #[must_use]
    pub fn first_visible(&self, scroll_top: f64) -> Option<usize> {
        let last = self.len().checked_sub(1)?;
        let bottoms = &self.offsets[1..];
        let found = bottoms.partition_point(|bottom| *bottom <= scroll_top);
        Some(found.min(last))
    }
}

impl Default for PositionIndex {
    fn default() -> Self {
        Self::new()
    }
}
