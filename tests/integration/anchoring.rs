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

// =====
// TESTS: 9
// =====
//
// Re-anchoring on list changes, resizes and streamed message growth.

use chat_viewport::config::EngineConfig;
use chat_viewport::viewport::{
    CacheKeyPolicy, InitialPosition, Item, ItemId, ScrollAlign, ScrollEvent,
};
use pretty_assertions::assert_eq;
use std::time::{Duration, Instant};

use crate::helpers::{approx, engine_with, engine_with_config, patterned_items, uniform_items};

#[test]
fn pinned_list_stays_pinned_across_bulk_append() {
    let mut engine = engine_with(600.0, uniform_items(100, 60.0));
    engine.scroll_to_bottom();

    let mut items = engine.items().to_vec();
    items.extend(patterned_items(100, 25, &[45.0, 90.0]));
    let update = engine.set_items(items);

    assert!(approx(update.state.scroll_top, update.state.total_height - 600.0));
    assert_eq!(update.range.visible.end, 124);
}

#[test]
fn reading_history_keeps_offset_when_messages_arrive() {
    let mut engine = engine_with(600.0, uniform_items(100, 60.0));
    engine.on_scroll(ScrollEvent { scroll_top: 1_234.0 }, Instant::now());

    let mut items = engine.items().to_vec();
    items.extend(uniform_items(130, 60.0).into_iter().skip(100));
    let update = engine.set_items(items);

    assert!(approx(update.state.scroll_top, 1_234.0));
    assert!(!engine.is_at_bottom());
}

#[test]
fn streamed_growth_of_last_message_keeps_bottom_pinned() {
    let mut engine = engine_with(400.0, (0..30u64).map(Item::new).collect());
    engine.scroll_to_bottom();
    assert!(approx(engine.state().scroll_top, 800.0));

    for height in [80.0, 160.0, 320.0] {
        let update = engine.set_measured_height(&ItemId::Int(29), height);
        assert!(approx(update.state.scroll_top, update.state.total_height - 400.0));
    }
    assert!(approx(engine.state().total_height, 29.0 * 40.0 + 320.0));
}

#[test]
fn measuring_an_unknown_item_changes_nothing() {
    let mut engine = engine_with(400.0, uniform_items(10, 50.0));
    let before = engine.update();
    let after = engine.set_measured_height(&ItemId::from("ghost"), 500.0);
    assert_eq!(before, after);
}

#[test]
fn initial_bottom_position_opens_at_latest_message() {
    let config = EngineConfig { initial_position: InitialPosition::Bottom, ..EngineConfig::default() };
    let engine = engine_with_config(config, 500.0, uniform_items(200, 25.0));
    assert!(approx(engine.state().scroll_top, 4_500.0));
    assert_eq!(engine.range().visible.end, 199);
}

#[test]
fn scroll_to_index_alignments() {
    let mut engine = engine_with(600.0, uniform_items(1_000, 60.0));

    let start = engine.scroll_to_index(100, ScrollAlign::Start).unwrap();
    assert!(approx(start.state.scroll_top, 6_000.0));

    let end = engine.scroll_to_index(100, ScrollAlign::End).unwrap();
    assert!(approx(end.state.scroll_top, 6_060.0 - 600.0));

    let center = engine.scroll_to_index(100, ScrollAlign::Center).unwrap();
    assert!(approx(center.state.scroll_top, 6_030.0 - 300.0));

    // Already fully visible: Auto leaves the offset alone.
    let auto = engine.scroll_to_index(101, ScrollAlign::Auto).unwrap();
    assert!(approx(auto.state.scroll_top, center.state.scroll_top));

    let last = engine.scroll_to_index(999, ScrollAlign::Start).unwrap();
    assert!(approx(last.state.scroll_top, 60_000.0 - 600.0));
}

#[test]
fn index_keyed_cache_follows_position_not_identity() {
    let config = EngineConfig { cache_key: CacheKeyPolicy::IdAndIndex, ..EngineConfig::default() };
    let mut engine = engine_with_config(config, 400.0, (0..4u64).map(Item::new).collect());
    engine.set_measured_height(&ItemId::Int(0), 100.0);
    assert!(approx(engine.state().total_height, 220.0));

    // Inserting ahead of item 0 moves it to index 1; its measurement stays at index 0.
    let mut items = vec![Item::new(99u64)];
    items.extend(engine.items().iter().cloned());
    let update = engine.set_items(items);
    assert!(approx(update.state.total_height, 40.0 * 5.0));
    assert_eq!(engine.height_cache().get(&ItemId::Int(0), 0), Some(100.0));
}

// --- List changes inside the throttle window ---

#[test]
fn append_during_pending_tick_stays_pinned() {
    let mut engine = engine_with(600.0, uniform_items(100, 60.0));
    let t0 = Instant::now();
    engine.on_scroll(ScrollEvent { scroll_top: 5_400.0 }, t0);
    // Still within the pin tolerance, but parked behind the throttle.
    let deferred = engine.on_scroll(ScrollEvent { scroll_top: 5_396.0 }, t0 + Duration::from_millis(2));
    assert!(deferred.is_none());

    let mut items = engine.items().to_vec();
    items.extend(patterned_items(100, 5, &[60.0]));
    let update = engine.set_items(items);
    assert!(approx(update.state.scroll_top, 5_700.0));
    assert_eq!(engine.pending_deadline(), None);

    assert!(engine.poll(t0 + Duration::from_millis(16)).is_none());
    assert!(approx(engine.state().scroll_top, 5_700.0));
    assert!(engine.is_at_bottom());
}

#[test]
fn append_during_pending_tick_keeps_latest_reading_offset() {
    let mut engine = engine_with(600.0, uniform_items(100, 60.0));
    let t0 = Instant::now();
    engine.on_scroll(ScrollEvent { scroll_top: 5_400.0 }, t0);
    engine.on_scroll(ScrollEvent { scroll_top: 3_000.0 }, t0 + Duration::from_millis(2));

    let mut items = engine.items().to_vec();
    items.extend(patterned_items(100, 5, &[60.0]));
    let update = engine.set_items(items);
    assert!(approx(update.state.scroll_top, 3_000.0));
    assert_eq!(update.range.visible.start, 50);

    assert!(engine.poll(t0 + Duration::from_millis(16)).is_none());
    assert!(approx(engine.state().scroll_top, 3_000.0));
}
