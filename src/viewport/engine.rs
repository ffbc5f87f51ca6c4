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

use super::anchor::{self, Reanchor, ScrollAlign};
use super::end_reached::{self, EndReachedTracker};
use super::height_cache::{HeightCache, sanitize_height};
use super::item::{HeightFn, Item, ItemId};
use super::position_index::PositionIndex;
use super::range::{ComputedRange, clamp_scroll_top, compute_range};
use super::scroll::{ScrollController, ScrollDirection, ScrollEvent, ThrottleDecision};
use crate::config::EngineConfig;
use crate::error::ViewportError;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Range computations slower than this are logged as warnings.
pub const FRAME_BUDGET: Duration = Duration::from_millis(16);

/// Geometry of the viewport after the latest recomputation.
///
/// `start_index`/`end_index` are the inclusive rendered range (overscan
/// applied). `scroll_height` is `max(total_height, client_height)`, the way a
/// scroll container reports it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ViewportState {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
    pub start_index: usize,
    pub end_index: usize,
    pub total_height: f64,
}

/// Everything a renderer needs after one engine step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewportUpdate {
    pub state: ViewportState,
    pub range: ComputedRange,
    pub direction: Option<ScrollDirection>,
    pub is_scrolling: bool,
    /// The end-reached callback fired during this step.
    pub end_reached: bool,
}

/// Where the viewport lands when a list is first populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialPosition {
    #[default]
    Top,
    Bottom,
}

pub type EndReachedCallback = Box<dyn FnMut(&ViewportState)>;

/// One virtualized list: owns its items, height cache, position index and
/// scroll state.
pub struct ViewportEngine {
    config: EngineConfig,
    items: Vec<Item>,
    cache: HeightCache,
    measure: Option<HeightFn>,
    index: PositionIndex,
    scroll: ScrollController,
    end_reached: EndReachedTracker,
    on_end_reached: Option<EndReachedCallback>,
    state: ViewportState,
    range: ComputedRange,
    alive: bool,
}

impl ViewportEngine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            items: Vec::new(),
            cache: HeightCache::new(config.cache_key, config.default_height),
            measure: None,
            index: PositionIndex::new(),
            scroll: ScrollController::new(config.throttle(), config.idle_timeout()),
            end_reached: EndReachedTracker::new(config.end_reached_mode),
            on_end_reached: None,
            state: ViewportState::default(),
            range: ComputedRange::EMPTY,
            alive: true,
            config,
        }
    }

    pub fn try_new(config: EngineConfig) -> Result<Self, ViewportError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Measure items without an explicit height with `measure`.
    #[must_use]
    pub fn with_height_fn(mut self, measure: impl Fn(&Item, usize) -> f64 + 'static) -> Self {
        self.measure = Some(Box::new(measure));
        self
    }

    pub fn set_on_end_reached(&mut self, callback: impl FnMut(&ViewportState) + 'static) {
        self.on_end_reached = Some(Box::new(callback));
    }

    // ---------------------------------------------------------------------
    // List and geometry changes
    // ---------------------------------------------------------------------

    /// Replace the item list.
    ///
    /// The index is rebuilt before anything reads it. When the length or total
    /// height changed, the scroll offset is re-anchored: a list pinned to the
    /// bottom stays pinned, otherwise the absolute offset is kept.
    pub fn set_items(&mut self, items: Vec<Item>) -> ViewportUpdate {
        self.absorb_pending_scroll();
        let previous = self.state;
        let previous_len = self.items.len();
        self.items = items;
        self.rebuild_index();

        let total = self.index.total_height();
        if previous_len == 0 && !self.items.is_empty() {
            self.state.scroll_top = match self.config.initial_position {
                InitialPosition::Top => 0.0,
                InitialPosition::Bottom => anchor::max_scroll_top(total, self.state.client_height),
            };
        } else if previous_len != self.items.len()
            || (total - previous.total_height).abs() > f64::EPSILON
        {
            self.apply_reanchor(&previous, total);
        } else {
            self.state.scroll_top = clamp_scroll_top(self.state.scroll_top, total);
        }

        self.scroll.sync_scroll_top(self.state.scroll_top);
        self.recompute();
        self.snapshot(false)
    }

    /// Record a measured height for `id`, invalidating only that item.
    pub fn set_measured_height(&mut self, id: &ItemId, height: f64) -> ViewportUpdate {
        let Some(position) = self.items.iter().position(|item| item.id == *id) else {
            tracing::debug!(%id, "measured height for unknown item ignored");
            return self.snapshot(false);
        };
        if !self.cache.set_height(id, position, height) {
            return self.snapshot(false);
        }

        self.absorb_pending_scroll();
        let previous = self.state;
        self.rebuild_index();
        let total = self.index.total_height();
        self.apply_reanchor(&previous, total);
        self.scroll.sync_scroll_top(self.state.scroll_top);
        self.recompute();
        self.snapshot(false)
    }

    /// Resize the viewport. A list pinned to the bottom stays pinned.
    pub fn set_client_height(&mut self, client_height: f64) -> ViewportUpdate {
        self.absorb_pending_scroll();
        let was_pinned = self.is_at_bottom();
        self.state.client_height = sanitize_height(client_height);
        let total = self.index.total_height();
        self.state.scroll_top = if was_pinned && !self.items.is_empty() {
            anchor::max_scroll_top(total, self.state.client_height)
        } else {
            clamp_scroll_top(self.state.scroll_top, total)
        };
        self.recompute();
        self.snapshot(false)
    }

    /// Fold a deferred scroll offset into the state ahead of a list or
    /// programmatic change. Pin detection then sees the latest user position
    /// and the stale tick can no longer land after the change.
    fn absorb_pending_scroll(&mut self) {
        if let Some(scroll_top) = self.scroll.take_pending() {
            self.state.scroll_top = clamp_scroll_top(scroll_top, self.index.total_height());
            tracing::trace!(scroll_top = self.state.scroll_top, "deferred scroll tick absorbed");
        }
    }

    fn apply_reanchor(&mut self, previous: &ViewportState, total: f64) {
        let outcome = anchor::reanchor(
            previous.scroll_top,
            previous.scroll_height,
            previous.client_height,
            total,
            self.config.pin_tolerance,
        );
        if let Reanchor::PinnedToBottom(top) = outcome {
            tracing::debug!(from = previous.scroll_top, to = top, total, "re-pinned to bottom");
        }
        self.state.scroll_top = outcome.scroll_top();
    }

    fn rebuild_index(&mut self) {
        let _timer = crate::perf::start_with("viewport::rebuild_index", "n", self.items.len());
        self.index = PositionIndex::build(&self.items, &mut self.cache, self.measure.as_ref());
        tracing::debug!(
            items = self.items.len(),
            total_height = self.index.total_height(),
            "position index rebuilt"
        );
    }

    fn recompute(&mut self) {
        let started = Instant::now();
        let range = {
            let _timer = crate::perf::start_with("viewport::compute_range", "n", self.items.len());
            compute_range(
                &self.index,
                self.state.scroll_top,
                self.state.client_height,
                self.config.overscan,
            )
        };
        let elapsed = started.elapsed();
        if elapsed > FRAME_BUDGET {
            tracing::warn!(?elapsed, items = self.items.len(), "range computation exceeded frame budget");
        }

        if range != self.range {
            tracing::debug!(
                start = range.rendered.start,
                end = range.rendered.end,
                scroll_top = self.state.scroll_top,
                "visible range changed"
            );
        }

        let total = self.index.total_height();
        self.range = range;
        self.state.total_height = total;
        self.state.scroll_height = total.max(self.state.client_height);
        self.state.start_index = range.rendered.start;
        self.state.end_index = range.rendered.end;
    }

    // ---------------------------------------------------------------------
    // Scrolling
    // ---------------------------------------------------------------------

    /// Feed a raw scroll event. Returns an update when the throttle lets the
    /// recomputation run now; otherwise the host must [`poll`](Self::poll) at
    /// [`next_deadline`](Self::next_deadline).
    pub fn on_scroll(&mut self, event: ScrollEvent, now: Instant) -> Option<ViewportUpdate> {
        if !self.alive {
            return None;
        }
        match self.scroll.on_event(event, now) {
            ThrottleDecision::Run(scroll_top) => Some(self.tick(scroll_top)),
            ThrottleDecision::Deferred { .. } => None,
        }
    }

    /// Run due timers: a deferred scroll tick and/or the idle transition.
    pub fn poll(&mut self, now: Instant) -> Option<ViewportUpdate> {
        if !self.alive {
            return None;
        }
        let outcome = self.scroll.poll(now);
        if let Some(scroll_top) = outcome.tick {
            return Some(self.tick(scroll_top));
        }
        if outcome.became_idle {
            tracing::trace!("scrolling went idle");
            return Some(self.snapshot(false));
        }
        None
    }

    fn tick(&mut self, scroll_top: f64) -> ViewportUpdate {
        crate::perf::next_tick();
        self.state.scroll_top = clamp_scroll_top(scroll_top, self.index.total_height());
        self.recompute();

        let reached = end_reached::check(
            self.state.scroll_top,
            self.state.scroll_height,
            self.config.end_reached_threshold,
        );
        let fire = self.end_reached.update(reached);
        if fire {
            tracing::debug!(scroll_top = self.state.scroll_top, "end reached");
            crate::perf::mark_with("viewport::end_reached", "n", self.items.len());
            if let Some(callback) = self.on_end_reached.as_mut() {
                callback(&self.state);
            }
        }
        self.snapshot(fire)
    }

    /// Top offset of item `index`, for driving a programmatic scroll.
    #[must_use]
    pub fn offset_of(&self, index: usize) -> f64 {
        anchor::offset_of(&self.index, index)
    }

    /// Scroll so item `index` is placed according to `align`.
    pub fn scroll_to_index(
        &mut self,
        index: usize,
        align: ScrollAlign,
    ) -> Result<ViewportUpdate, ViewportError> {
        if index >= self.items.len() {
            return Err(ViewportError::IndexOutOfRange { index, len: self.items.len() });
        }
        self.absorb_pending_scroll();
        let target = anchor::scroll_to_index_offset(
            &self.index,
            index,
            align,
            self.state.scroll_top,
            self.state.client_height,
        );
        self.state.scroll_top = target;
        self.scroll.sync_scroll_top(target);
        self.recompute();
        Ok(self.snapshot(false))
    }

    pub fn scroll_to_bottom(&mut self) -> ViewportUpdate {
        self.absorb_pending_scroll();
        let target =
            anchor::max_scroll_top(self.index.total_height(), self.state.client_height);
        self.state.scroll_top = target;
        self.scroll.sync_scroll_top(target);
        self.recompute();
        self.snapshot(false)
    }

    #[must_use]
    pub fn is_at_bottom(&self) -> bool {
        anchor::is_pinned_to_bottom(
            self.state.scroll_top,
            self.state.client_height,
            self.state.scroll_height,
            self.config.pin_tolerance,
        )
    }

    /// Allow the end-reached callback to fire again, typically after older
    /// history finished loading.
    pub fn rearm_end_reached(&mut self) {
        self.end_reached.rearm();
    }

    /// Stop reacting to timers. Later `on_scroll`/`poll` calls are no-ops.
    pub fn teardown(&mut self) {
        if self.alive {
            tracing::debug!(items = self.items.len(), "viewport engine torn down");
        }
        self.alive = false;
        self.scroll.cancel();
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    fn snapshot(&self, end_reached: bool) -> ViewportUpdate {
        ViewportUpdate {
            state: self.state,
            range: self.range,
            direction: self.scroll.direction(),
            is_scrolling: self.scroll.is_scrolling(),
            end_reached,
        }
    }

    #[must_use]
    pub fn update(&self) -> ViewportUpdate {
        self.snapshot(false)
    }

    #[must_use]
    pub fn state(&self) -> ViewportState {
        self.state
    }

    #[must_use]
    pub fn range(&self) -> ComputedRange {
        self.range
    }

    #[must_use]
    pub fn direction(&self) -> Option<ScrollDirection> {
        self.scroll.direction()
    }

    #[must_use]
    pub fn is_scrolling(&self) -> bool {
        self.scroll.is_scrolling()
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[must_use]
    pub fn position_index(&self) -> &PositionIndex {
        &self.index
    }

    #[must_use]
    pub fn height_cache(&self) -> &HeightCache {
        &self.cache
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn pending_deadline(&self) -> Option<Instant> {
        if self.alive { self.scroll.pending_deadline() } else { None }
    }

    #[must_use]
    pub fn idle_deadline(&self) -> Option<Instant> {
        if self.alive { self.scroll.idle_deadline() } else { None }
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.alive { self.scroll.next_deadline() } else { None }
    }
}

impl Default for ViewportEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
