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

use crate::error::ViewportError;
use crate::viewport::{
    CacheKeyPolicy, DEFAULT_END_REACHED_THRESHOLD, DEFAULT_ITEM_HEIGHT, EndReachedMode,
    IDLE_TIMEOUT, InitialPosition, PIN_TOLERANCE, THROTTLE_INTERVAL,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_OVERSCAN: usize = 5;

/// Tuning knobs for one [`ViewportEngine`](crate::viewport::ViewportEngine).
///
/// Every field has a default, so a config file only needs the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub overscan: usize,
    pub default_height: f64,
    pub end_reached_threshold: f64,
    pub end_reached_mode: EndReachedMode,
    pub throttle_ms: u64,
    pub idle_ms: u64,
    pub pin_tolerance: f64,
    pub cache_key: CacheKeyPolicy,
    pub initial_position: InitialPosition,
}

impl Default for EngineConfig {
    #[allow(clippy::cast_possible_truncation)]
    fn default() -> Self {
        Self {
            overscan: DEFAULT_OVERSCAN,
            default_height: DEFAULT_ITEM_HEIGHT,
            end_reached_threshold: DEFAULT_END_REACHED_THRESHOLD,
            end_reached_mode: EndReachedMode::default(),
            throttle_ms: THROTTLE_INTERVAL.as_millis() as u64,
            idle_ms: IDLE_TIMEOUT.as_millis() as u64,
            pin_tolerance: PIN_TOLERANCE,
            cache_key: CacheKeyPolicy::default(),
            initial_position: InitialPosition::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ViewportError> {
        if !self.default_height.is_finite() || self.default_height < 0.0 {
            return Err(ViewportError::InvalidConfig(format!(
                "default_height must be a non-negative number, got {}",
                self.default_height
            )));
        }
        if !self.pin_tolerance.is_finite() || self.pin_tolerance < 0.0 {
            return Err(ViewportError::InvalidConfig(format!(
                "pin_tolerance must be a non-negative number, got {}",
                self.pin_tolerance
            )));
        }
        if !(0.0..=1.0).contains(&self.end_reached_threshold) {
            return Err(ViewportError::InvalidConfig(format!(
                "end_reached_threshold must be within [0, 1], got {}",
                self.end_reached_threshold
            )));
        }
        Ok(())
    }

    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ViewportError> {
        let content = std::fs::read_to_string(path).map_err(|e| ViewportError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| ViewportError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_ms)
    }
}
