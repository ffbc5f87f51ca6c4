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
// TESTS: 7
// =====
//
// Geometry properties of the position index and range computation,
// checked over deterministic pseudo-random height lists.

use chat_viewport::viewport::{PositionIndex, compute_range};
use chat_viewport::viewport::anchor::{ScrollAlign, scroll_to_index_offset};
use pretty_assertions::assert_eq;

use crate::helpers::{approx, index_of, scattered_heights};

const SEEDS: [u64; 4] = [1, 7, 42, 2_025];

/// Scroll offsets spread across `[0, limit)` plus a few awkward ones.
fn probe_offsets(limit: f64) -> Vec<f64> {
    let mut offsets: Vec<f64> = (0..200).map(|i| limit * f64::from(i) / 200.0).collect();
    offsets.extend([0.5, limit - 0.5, limit / 3.0]);
    offsets.retain(|offset| *offset >= 0.0 && *offset < limit);
    offsets
}

#[test]
fn positions_are_monotonic_prefix_sums() {
    for seed in SEEDS {
        let heights = scattered_heights(500, seed);
        let index = index_of(&heights);
        let positions = index.positions();
        assert_eq!(positions.len(), heights.len());
        for (i, height) in heights.iter().enumerate() {
            assert!(index.bottom_of(i) >= index.offset_of(i));
            assert!(approx(index.bottom_of(i) - positions[i], *height));
        }
        assert!(approx(index.total_height(), heights.iter().sum()));
    }
}

#[test]
fn invalid_heights_keep_the_index_monotonic() {
    let index = PositionIndex::from_heights([10.0, -5.0, f64::NAN, 20.0, f64::INFINITY, 5.0]);
    assert_eq!(index.positions(), &[0.0, 10.0, 10.0, 10.0, 30.0, 30.0]);
    assert!(approx(index.total_height(), 35.0));
}

#[test]
fn start_index_straddles_scroll_offset() {
    for seed in SEEDS {
        let index = index_of(&scattered_heights(400, seed));
        for scroll_top in probe_offsets(index.total_height()) {
            let start = compute_range(&index, scroll_top, 500.0, 0).visible.start;
            assert!(
                index.bottom_of(start) > scroll_top,
                "seed {seed}: item {start} ends above {scroll_top}"
            );
            if start > 0 {
                assert!(index.bottom_of(start - 1) <= scroll_top);
            }
        }
    }
}

#[test]
fn visible_items_fill_the_viewport() {
    let client_height = 700.0;
    for seed in SEEDS {
        let index = index_of(&scattered_heights(400, seed));
        let limit = index.total_height() - client_height;
        for scroll_top in probe_offsets(limit) {
            let visible = compute_range(&index, scroll_top, client_height, 0).visible;
            let covered = index.bottom_of(visible.end) - index.offset_of(visible.start);
            assert!(covered >= client_height.min(index.total_height()));
        }
    }

    // Content shorter than the viewport: everything is visible.
    let short = index_of(&[100.0, 50.0, 25.0]);
    let visible = compute_range(&short, 0.0, client_height, 0).visible;
    assert_eq!((visible.start, visible.end), (0, 2));
}

#[test]
fn overscan_widens_by_exactly_the_count_unless_clamped() {
    let index = index_of(&scattered_heights(300, 3));
    let last = index.len() - 1;
    for scroll_top in probe_offsets(index.total_height()) {
        let raw = compute_range(&index, scroll_top, 400.0, 0);
        let wide = compute_range(&index, scroll_top, 400.0, 5);
        assert_eq!(raw.visible, wide.visible);
        assert!(wide.rendered.covers(wide.visible));
        assert_eq!(wide.rendered.start, raw.visible.start.saturating_sub(5));
        assert_eq!(wide.rendered.end, (raw.visible.end + 5).min(last));
    }
}

#[test]
fn range_computation_is_idempotent() {
    let index = index_of(&scattered_heights(250, 11));
    for scroll_top in probe_offsets(index.total_height()) {
        assert_eq!(
            compute_range(&index, scroll_top, 650.0, 5),
            compute_range(&index, scroll_top, 650.0, 5)
        );
    }
}

#[test]
fn scroll_to_index_round_trips_into_range() {
    for seed in SEEDS {
        let index = index_of(&scattered_heights(300, seed));
        for item in (0..index.len()).step_by(7) {
            let range = compute_range(&index, index.offset_of(item), 600.0, 5);
            assert!(range.visible.start <= item && item <= range.visible.end);

            for align in [ScrollAlign::Start, ScrollAlign::End, ScrollAlign::Center] {
                let target = scroll_to_index_offset(&index, item, align, 0.0, 600.0);
                let range = compute_range(&index, target, 600.0, 5);
                assert!(range.rendered.contains(item), "seed {seed}: {align:?} lost item {item}");
            }
        }
    }
}
