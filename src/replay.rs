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

//! Scripted scroll sessions.
//!
//! A scenario is a JSON document describing an initial list, a viewport height
//! and a timeline of steps (scrolls, appends, resizes, ...). [`replay`] runs
//! it through a [`ViewportEngine`] on a synthetic clock, firing the throttle
//! and idle timers at exactly their deadlines. [`replay_realtime`] runs the
//! same timeline through a [`ViewportDriver`] on real tokio timers.

use crate::config::EngineConfig;
use crate::error::ViewportError;
use crate::viewport::{
    Item, ItemId, ScrollAlign, ScrollEvent, ViewportDriver, ViewportEngine, ViewportEvent,
    ViewportUpdate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub config: Option<EngineConfig>,
    pub client_height: f64,
    #[serde(default)]
    pub items: Vec<Item>,
    /// Appended after `items`: `count` items with integer ids cycling through `heights`.
    #[serde(default)]
    pub generate: Option<GeneratedItems>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratedItems {
    pub count: usize,
    pub heights: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Scroll { scroll_top: f64 },
    Append { items: Vec<Item> },
    Truncate { len: usize },
    Resize { client_height: f64 },
    ScrollToIndex {
        index: usize,
        #[serde(default)]
        align: ScrollAlign,
    },
    Measure { id: ItemId, height: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cause {
    Initial,
    Scroll,
    Timer,
    Items,
    Resize,
    ScrollToIndex,
    Measure,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayRecord {
    pub at_ms: u64,
    pub cause: Cause,
    #[serde(flatten)]
    pub update: ViewportUpdate,
}

impl Scenario {
    pub fn from_json(content: &str, origin: &str) -> Result<Self, ViewportError> {
        serde_json::from_str(content)
            .map_err(|e| ViewportError::Parse { path: origin.to_owned(), reason: e.to_string() })
    }

    pub fn load(path: &Path) -> Result<Self, ViewportError> {
        let content = std::fs::read_to_string(path).map_err(|e| ViewportError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&content, &path.display().to_string())
    }

    /// Initial item list, including generated items.
    #[must_use]
    pub fn initial_items(&self) -> Vec<Item> {
        let mut items = self.items.clone();
        if let Some(generate) = &self.generate
            && !generate.heights.is_empty()
        {
            let base = items.len();
            items.extend((0..generate.count).map(|i| {
                Item::with_height(base + i, generate.heights[i % generate.heights.len()])
            }));
        }
        items
    }

    fn items_after(current: &[Item], action: &Action) -> Option<Vec<Item>> {
        match action {
            Action::Append { items } => {
                let mut next = current.to_vec();
                next.extend(items.iter().cloned());
                Some(next)
            }
            Action::Truncate { len } => Some(current[..(*len).min(current.len())].to_vec()),
            _ => None,
        }
    }
}

fn millis_since(base: Instant, at: Instant) -> u64 {
    u64::try_from(at.saturating_duration_since(base).as_millis()).unwrap_or(u64::MAX)
}

/// Fire every engine timer due at or before `until`, at its exact deadline.
fn drain_timers(
    engine: &mut ViewportEngine,
    base: Instant,
    until: Instant,
    records: &mut Vec<ReplayRecord>,
) {
    while let Some(due) = engine.next_deadline()
        && due <= until
    {
        if let Some(update) = engine.poll(due) {
            records.push(ReplayRecord { at_ms: millis_since(base, due), cause: Cause::Timer, update });
        }
        if engine.next_deadline() == Some(due) {
            break;
        }
    }
}

/// Replay `scenario` on a synthetic clock and return every emitted update.
pub fn replay(scenario: &Scenario, config: EngineConfig) -> Result<Vec<ReplayRecord>, ViewportError> {
    let mut engine = ViewportEngine::try_new(config)?;
    let base = Instant::now();
    let mut records = Vec::new();

    engine.set_client_height(scenario.client_height);
    let update = engine.set_items(scenario.initial_items());
    records.push(ReplayRecord { at_ms: 0, cause: Cause::Initial, update });

    let mut at_ms = 0;
    let mut now = base;
    for step in &scenario.steps {
        at_ms = at_ms.max(step.at_ms);
        now = base + Duration::from_millis(at_ms);
        drain_timers(&mut engine, base, now, &mut records);

        let (cause, update) = match &step.action {
            Action::Scroll { scroll_top } => {
                (Cause::Scroll, engine.on_scroll(ScrollEvent { scroll_top: *scroll_top }, now))
            }
            action @ (Action::Append { .. } | Action::Truncate { .. }) => {
                let items = Scenario::items_after(engine.items(), action).unwrap_or_default();
                (Cause::Items, Some(engine.set_items(items)))
            }
            Action::Resize { client_height } => {
                (Cause::Resize, Some(engine.set_client_height(*client_height)))
            }
            Action::ScrollToIndex { index, align } => {
                (Cause::ScrollToIndex, Some(engine.scroll_to_index(*index, *align)?))
            }
            Action::Measure { id, height } => {
                (Cause::Measure, Some(engine.set_measured_height(id, *height)))
            }
        };
        if let Some(update) = update {
            records.push(ReplayRecord { at_ms, cause, update });
        }
    }

    let settle = engine.config().throttle() + engine.config().idle_timeout();
    drain_timers(&mut engine, base, now + settle, &mut records);
    engine.teardown();
    tracing::info!(steps = scenario.steps.len(), records = records.len(), "scenario replayed");
    Ok(records)
}

/// Replay `scenario` in real time through a [`ViewportDriver`].
///
/// Must run inside a tokio `LocalSet`. Returns the published events in order.
pub async fn replay_realtime(
    scenario: &Scenario,
    config: EngineConfig,
) -> Result<Vec<ViewportEvent>, ViewportError> {
    let settle = config.throttle() + config.idle_timeout();
    let (mut driver, mut event_rx) = ViewportDriver::new(ViewportEngine::try_new(config)?);
    let start = tokio::time::Instant::now();

    driver.set_client_height(scenario.client_height);
    driver.set_items(scenario.initial_items());

    for step in &scenario.steps {
        tokio::time::sleep_until(start + Duration::from_millis(step.at_ms)).await;
        match &step.action {
            Action::Scroll { scroll_top } => driver.scroll(ScrollEvent { scroll_top: *scroll_top }),
            action @ (Action::Append { .. } | Action::Truncate { .. }) => {
                let items = driver
                    .with_engine(|engine| Scenario::items_after(engine.items(), action))
                    .unwrap_or_default();
                driver.set_items(items);
            }
            Action::Resize { client_height } => driver.set_client_height(*client_height),
            Action::ScrollToIndex { index, align } => driver.scroll_to_index(*index, *align)?,
            Action::Measure { id, height } => driver.set_measured_height(id, *height),
        }
    }

    tokio::time::sleep(settle).await;
    driver.shutdown();

    let mut events = Vec::new();
    while let Ok(event) = event_rx.try_recv() {
        events.push(event);
    }
    Ok(events)
}
