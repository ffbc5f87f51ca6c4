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

//! List virtualization: which items of an arbitrarily long, unevenly sized
//! list are visible for a given scroll offset, and what changed since the
//! last scroll event.
//!
//! Data flows leaves-first: items and height hints go through the
//! [`HeightCache`] into a [`PositionIndex`]; [`compute_range`] searches that
//! index for the visible range; [`ScrollController`] throttles raw scroll
//! events and tracks direction and idleness; [`ViewportEngine`] ties it all
//! together per list and [`ViewportDriver`] hosts an engine on tokio timers.

pub mod anchor;
mod driver;
pub mod end_reached;
mod engine;
mod height_cache;
mod item;
mod position_index;
mod range;
mod scroll;

pub use anchor::{PIN_TOLERANCE, Reanchor, ScrollAlign};
pub use driver::{ViewportDriver, ViewportEvent};
pub use end_reached::{DEFAULT_END_REACHED_THRESHOLD, EndReachedMode, EndReachedTracker};
pub use engine::{
    EndReachedCallback, FRAME_BUDGET, InitialPosition, ViewportEngine, ViewportState,
    ViewportUpdate,
};
pub use height_cache::{CacheKeyPolicy, DEFAULT_ITEM_HEIGHT, HeightCache, sanitize_height};
pub use item::{HeightFn, Item, ItemId};
pub use position_index::PositionIndex;
pub use range::{ComputedRange, IndexRange, clamp_scroll_top, compute_range};
pub use scroll::{
    IDLE_TIMEOUT, PollOutcome, ScrollController, ScrollDirection, ScrollEvent, ScrollPhase,
    THROTTLE_INTERVAL, ThrottleDecision,
};
