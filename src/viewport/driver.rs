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

//! Async host for a [`ViewportEngine`] on a tokio `LocalSet`.
//!
//! The engine itself never sleeps. The driver owns the two single-shot timers
//! (throttle and idle), polls the engine when they fire, and publishes every
//! resulting update on an unbounded channel. Shutting down aborts both timers
//! and flips a liveness flag, so a timer that already woke up does nothing.

use super::anchor::ScrollAlign;
use super::engine::{ViewportEngine, ViewportState, ViewportUpdate};
use super::item::{Item, ItemId};
use super::scroll::ScrollEvent;
use crate::error::ViewportError;
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ViewportEvent {
    Updated(ViewportUpdate),
    EndReached(ViewportState),
}

pub struct ViewportDriver {
    engine: Rc<RefCell<ViewportEngine>>,
    alive: Rc<Cell<bool>>,
    event_tx: mpsc::UnboundedSender<ViewportEvent>,
    throttle_timer: Option<JoinHandle<()>>,
    idle_timer: Option<JoinHandle<()>>,
}

fn now() -> std::time::Instant {
    tokio::time::Instant::now().into_std()
}

fn publish(tx: &mpsc::UnboundedSender<ViewportEvent>, update: ViewportUpdate) {
    let _ = tx.send(ViewportEvent::Updated(update));
    if update.end_reached {
        let _ = tx.send(ViewportEvent::EndReached(update.state));
    }
}

impl ViewportDriver {
    /// Wrap `engine`. Timers are spawned with `spawn_local`, so the driver
    /// must be used from inside a `LocalSet`.
    pub fn new(engine: ViewportEngine) -> (Self, mpsc::UnboundedReceiver<ViewportEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let driver = Self {
            engine: Rc::new(RefCell::new(engine)),
            alive: Rc::new(Cell::new(true)),
            event_tx,
            throttle_timer: None,
            idle_timer: None,
        };
        (driver, event_rx)
    }

    pub fn scroll(&mut self, event: ScrollEvent) {
        if !self.alive.get() {
            return;
        }
        let update = self.engine.borrow_mut().on_scroll(event, now());
        if let Some(update) = update {
            publish(&self.event_tx, update);
        }
        self.arm_timers();
    }

    pub fn set_items(&mut self, items: Vec<Item>) {
        if !self.alive.get() {
            return;
        }
        let update = self.engine.borrow_mut().set_items(items);
        publish(&self.event_tx, update);
    }

    pub fn set_client_height(&mut self, client_height: f64) {
        if !self.alive.get() {
            return;
        }
        let update = self.engine.borrow_mut().set_client_height(client_height);
        publish(&self.event_tx, update);
    }

    pub fn set_measured_height(&mut self, id: &ItemId, height: f64) {
        if !self.alive.get() {
            return;
        }
        let update = self.engine.borrow_mut().set_measured_height(id, height);
        publish(&self.event_tx, update);
    }

    /// A no-op once the driver is shut down.
    pub fn scroll_to_index(&mut self, index: usize, align: ScrollAlign) -> Result<(), ViewportError> {
        if !self.alive.get() {
            return Ok(());
        }
        let update = self.engine.borrow_mut().scroll_to_index(index, align)?;
        publish(&self.event_tx, update);
        Ok(())
    }

    /// Run `f` against the engine, e.g. to read state or items.
    pub fn with_engine<R>(&self, f: impl FnOnce(&ViewportEngine) -> R) -> R {
        f(&self.engine.borrow())
    }

    #[must_use]
    pub fn state(&self) -> ViewportState {
        self.engine.borrow().state()
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive.get()
    }

    fn arm_timers(&mut self) {
        let (pending, idle) = {
            let engine = self.engine.borrow();
            (engine.pending_deadline(), engine.idle_deadline())
        };

        // At most one throttle timer at a time; the pending tick always holds
        // the latest offset, so an already armed timer picks it up.
        if let Some(due) = pending
            && self.throttle_timer.as_ref().is_none_or(JoinHandle::is_finished)
        {
            self.throttle_timer = Some(self.spawn_timer(due));
        }

        if let Some(due) = idle {
            if let Some(previous) = self.idle_timer.take() {
                previous.abort();
            }
            self.idle_timer = Some(self.spawn_timer(due));
        }
    }

    fn spawn_timer(&self, due: std::time::Instant) -> JoinHandle<()> {
        let engine = Rc::clone(&self.engine);
        let alive = Rc::clone(&self.alive);
        let tx = self.event_tx.clone();
        tokio::task::spawn_local(async move {
            tokio::time::sleep_until(tokio::time::Instant::from_std(due)).await;
            if !alive.get() {
                return;
            }
            let update = engine.borrow_mut().poll(now());
            if let Some(update) = update {
                publish(&tx, update);
            }
        })
    }

    /// Cancel both timers and tear the engine down. Idempotent.
    pub fn shutdown(&mut self) {
        if !self.alive.replace(false) {
            return;
        }
        for timer in [self.throttle_timer.take(), self.idle_timer.take()].into_iter().flatten() {
            timer.abort();
        }
        self.engine.borrow_mut().teardown();
        tracing::debug!("viewport driver shut down");
    }
}

impl Drop for ViewportDriver {
    fn drop(&mut self) {
        self.shutdown();
    }
}
