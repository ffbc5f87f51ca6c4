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

//! Memoized item heights.
//!
//! The cache is owned by a single [`ViewportEngine`](super::ViewportEngine),
//! never shared between lists. By default entries are keyed by item id alone,
//! so an id that moves to a new position keeps its measured height and a
//! height change only invalidates that one id. [`CacheKeyPolicy::IdAndIndex`]
//! keeps the older `(id, index)` keying for hosts that rely on it.

use super::item::{HeightFn, Item, ItemId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Height used when an item has neither an explicit height nor a height function.
pub const DEFAULT_ITEM_HEIGHT: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKeyPolicy {
    #[default]
    Id,
    IdAndIndex,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    Id(ItemId),
    IdAndIndex(ItemId, usize),
}

impl CacheKey {
    fn id(&self) -> &ItemId {
        match self {
            Self::Id(id) | Self::IdAndIndex(id, _) => id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HeightCache {
    entries: HashMap<CacheKey, f64>,
    policy: CacheKeyPolicy,
    default_height: f64,
}

impl HeightCache {
    #[must_use]
    pub fn new(policy: CacheKeyPolicy, default_height: f64) -> Self {
        Self { entries: HashMap::new(), policy, default_height: sanitize_height(default_height) }
    }

    fn key(&self, id: &ItemId, index: usize) -> CacheKey {
        match self.policy {
            CacheKeyPolicy::Id => CacheKey::Id(id.clone()),
            CacheKeyPolicy::IdAndIndex => CacheKey::IdAndIndex(id.clone(), index),
        }
    }

    /// Height of `item` at `index`, computing and storing it on a miss.
    ///
    /// An explicit height always wins and overwrites a stale entry. Otherwise a
    /// cached value is returned as-is; on a miss `measure` (or the default
    /// height) supplies the value. Every stored height is non-negative and finite.
    pub fn height_of(&mut self, item: &Item, index: usize, measure: Option<&HeightFn>) -> f64 {
        let key = self.key(&item.id, index);

        if let Some(explicit) = item.explicit_height {
            let height = sanitize_reported(explicit, &item.id, index);
            self.entries.insert(key, height);
            return height;
        }

        if let Some(height) = self.entries.get(&key) {
            return *height;
        }

        let height = match measure {
            Some(measure) => sanitize_reported(measure(item, index), &item.id, index),
            None => self.default_height,
        };
        self.entries.insert(key, height);
        height
    }

    /// Record a measured height. Returns `true` when the stored value changed.
    pub fn set_height(&mut self, id: &ItemId, index: usize, height: f64) -> bool {
        let height = sanitize_reported(height, id, index);
        let key = self.key(id, index);
        let previous = self.entries.insert(key, height);
        previous.is_none_or(|old| (old - height).abs() > f64::EPSILON)
    }

    /// Drop every entry for `id`. Returns the number of entries removed.
    pub fn invalidate(&mut self, id: &ItemId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.id() != id);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn get(&self, id: &ItemId, index: usize) -> Option<f64> {
        self.entries.get(&self.key(id, index)).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn policy(&self) -> CacheKeyPolicy {
        self.policy
    }

    #[must_use]
    pub fn default_height(&self) -> f64 {
        self.default_height
    }
}

impl Default for HeightCache {
    fn default() -> Self {
        Self::new(CacheKeyPolicy::default(), DEFAULT_ITEM_HEIGHT)
    }
}

/// Clamp a height to a finite, non-negative value. NaN and infinities become 0.
#[must_use]
pub fn sanitize_height(height: f64) -> f64 {
    if height.is_finite() && height > 0.0 { height } else { 0.0 }
}

fn sanitize_reported(height: f64, id: &ItemId, index: usize) -> f64 {
    let clean = sanitize_height(height);
    if clean.to_bits() != height.to_bits() && height != 0.0 {
        tracing::warn!(%id, index, reported = height, "clamped invalid item height to 0");
    }
    clean
}
