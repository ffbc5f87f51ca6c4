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

//! End-of-list detection for loading older or newer history.

use serde::{Deserialize, Serialize};

pub const DEFAULT_END_REACHED_THRESHOLD: f64 = 0.8;

/// `true` when `scroll_top / scroll_height` has reached `threshold`.
///
/// An empty or zero-height list never counts as reached.
#[must_use]
pub fn check(scroll_top: f64, scroll_height: f64, threshold: f64) -> bool {
    if scroll_height.is_nan() || scroll_height <= 0.0 || scroll_top.is_nan() {
        return false;
    }
    scroll_top / scroll_height >= threshold
}

/// How often the end-reached callback fires while the ratio stays above the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReachedMode {
    /// Once per crossing; re-arms when the ratio drops back below the threshold.
    #[default]
    Edge,
    /// On every qualifying tick.
    Level,
}

#[derive(Debug, Clone)]
pub struct EndReachedTracker {
    mode: EndReachedMode,
    armed: bool,
}

impl EndReachedTracker {
    #[must_use]
    pub fn new(mode: EndReachedMode) -> Self {
        Self { mode, armed: true }
    }

    /// Feed the latest [`check`] result. Returns `true` if the callback should fire.
    pub fn update(&mut self, reached: bool) -> bool {
        match self.mode {
            EndReachedMode::Level => reached,
            EndReachedMode::Edge if !reached => {
                self.armed = true;
                false
            }
            EndReachedMode::Edge => std::mem::replace(&mut self.armed, false),
        }
    }

    /// Re-arm after the host has loaded more content.
    pub fn rearm(&mut self) {
        self.armed = true;
    }

    #[must_use]
    pub fn mode(&self) -> EndReachedMode {
        self.mode
    }
}
