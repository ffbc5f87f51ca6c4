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

use chat_viewport::config::EngineConfig;
use chat_viewport::viewport::{Item, PositionIndex, ViewportEngine};

/// Items with integer ids `0..count` and the same explicit height.
pub fn uniform_items(count: usize, height: f64) -> Vec<Item> {
    (0..count).map(|i| Item::with_height(i, height)).collect()
}

/// Items with integer ids starting at `first_id`, heights cycling through `pattern`.
pub fn patterned_items(first_id: usize, count: usize, pattern: &[f64]) -> Vec<Item> {
    (0..count).map(|i| Item::with_height(first_id + i, pattern[i % pattern.len()])).collect()
}

/// Engine with default config, sized and populated.
pub fn engine_with(client_height: f64, items: Vec<Item>) -> ViewportEngine {
    engine_with_config(EngineConfig::default(), client_height, items)
}

pub fn engine_with_config(
    config: EngineConfig,
    client_height: f64,
    items: Vec<Item>,
) -> ViewportEngine {
    let mut engine = ViewportEngine::new(config);
    engine.set_client_height(client_height);
    engine.set_items(items);
    engine
}

/// Deterministic pseudo-random heights in `[1, 200]`.
pub fn scattered_heights(count: usize, seed: u64) -> Vec<f64> {
    let mut state = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
    (0..count)
        .map(|_| {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
            #[allow(clippy::cast_precision_loss)]
            let height = ((state >> 33) % 200 + 1) as f64;
            height
        })
        .collect()
}

pub fn index_of(heights: &[f64]) -> PositionIndex {
    PositionIndex::from_heights(heights.iter().copied())
}

pub fn approx(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}
