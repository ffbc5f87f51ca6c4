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

//! Per-tick timing log for the viewport engine.
//!
//! Gated behind `--features perf`. Without the feature every type is
//! zero-size and every call compiles away.
//!
//! ```bash
//! cargo run --features perf -- scenario.json --perf-log perf.jsonl
//! # {"run":"...","tick":12,"fn":"viewport::compute_range","ms":0.004,"n":1000}
//! ```

#[cfg(feature = "perf")]
mod enabled {
    use serde_json::{Map, Value, json};
    use std::cell::RefCell;
    use std::fs::{File, OpenOptions};
    use std::io::{BufWriter, Write};
    use std::path::Path;
    use std::time::Instant;

    struct Sink {
        writer: BufWriter<File>,
        run_id: String,
        tick: u64,
    }

    thread_local! {
        static SINK: RefCell<Option<Sink>> = const { RefCell::new(None) };
    }

    pub(super) fn is_open() -> bool {
        SINK.with(|sink| sink.borrow().is_some())
    }

    pub(super) fn write_entry(name: &'static str, ms: f64, extra: Option<(&'static str, usize)>) {
        SINK.with(|sink| {
            let mut sink = sink.borrow_mut();
            let Some(sink) = sink.as_mut() else {
                return;
            };
            let mut entry = Map::new();
            entry.insert("run".to_owned(), Value::from(sink.run_id.as_str()));
            entry.insert("tick".to_owned(), Value::from(sink.tick));
            entry.insert("fn".to_owned(), Value::from(name));
            entry.insert("ms".to_owned(), Value::from((ms * 1000.0).round() / 1000.0));
            if let Some((key, value)) = extra {
                entry.insert(key.to_owned(), Value::from(value));
            }
            let _ = writeln!(sink.writer, "{}", Value::Object(entry));
        });
    }

    pub struct PerfLogger {
        _private: (),
    }

    impl PerfLogger {
        /// Open (or create) the log file. Returns `None` on I/O error.
        pub fn open(path: &Path, append: bool) -> Option<Self> {
            let mut options = OpenOptions::new();
            options.create(true).write(true);
            if append {
                options.append(true);
            } else {
                options.truncate(true);
            }
            let mut writer = BufWriter::new(options.open(path).ok()?);
            let run_id = uuid::Uuid::new_v4().to_string();
            let header = json!({
                "event": "run_start",
                "run": run_id,
                "pid": std::process::id(),
                "version": env!("CARGO_PKG_VERSION"),
            });
            let _ = writeln!(writer, "{header}");
            SINK.with(|sink| *sink.borrow_mut() = Some(Sink { writer, run_id, tick: 0 }));
            Some(Self { _private: () })
        }
    }

    pub(super) fn next_tick() {
        SINK.with(|sink| {
            if let Some(sink) = sink.borrow_mut().as_mut() {
                sink.tick += 1;
                if sink.tick % 256 == 0 {
                    let _ = sink.writer.flush();
                }
            }
        });
    }

    impl Drop for PerfLogger {
        fn drop(&mut self) {
            SINK.with(|sink| {
                if let Some(mut sink) = sink.borrow_mut().take() {
                    let _ = sink.writer.flush();
                }
            });
        }
    }

    pub struct Timer {
        pub(super) name: &'static str,
        pub(super) start: Instant,
        pub(super) extra: Option<(&'static str, usize)>,
    }

    impl Drop for Timer {
        fn drop(&mut self) {
            let ms = self.start.elapsed().as_secs_f64() * 1000.0;
            write_entry(self.name, ms, self.extra);
        }
    }
}

#[cfg(not(feature = "perf"))]
mod disabled {
    use std::path::Path;

    pub struct PerfLogger;
    pub struct Timer;

    impl PerfLogger {
        #[inline]
        pub fn open(_path: &Path, _append: bool) -> Option<Self> {
            None
        }
    }
}

/// Start a named timer that logs on drop. `None` when no log is open.
#[cfg(feature = "perf")]
#[must_use]
#[inline]
pub fn start_with(name: &'static str, extra_name: &'static str, extra_val: usize) -> Option<Timer> {
    enabled::is_open().then(|| Timer {
        name,
        start: std::time::Instant::now(),
        extra: Some((extra_name, extra_val)),
    })
}

#[cfg(not(feature = "perf"))]
#[must_use]
#[inline]
pub fn start_with(
    _name: &'static str,
    _extra_name: &'static str,
    _extra_val: usize,
) -> Option<Timer> {
    None
}

/// Advance the tick counter. Called once per processed scroll tick.
#[cfg(feature = "perf")]
#[inline]
pub fn next_tick() {
    enabled::next_tick();
}

#[cfg(not(feature = "perf"))]
#[inline]
pub fn next_tick() {}

/// Write an instant marker (`ms = 0`) with one numeric field.
#[cfg(feature = "perf")]
#[inline]
pub fn mark_with(name: &'static str, extra_name: &'static str, extra_val: usize) {
    enabled::write_entry(name, 0.0, Some((extra_name, extra_val)));
}

#[cfg(not(feature = "perf"))]
#[inline]
pub fn mark_with(_name: &'static str, _extra_name: &'static str, _extra_val: usize) {}

#[cfg(feature = "perf")]
pub use enabled::{PerfLogger, Timer};

#[cfg(not(feature = "perf"))]
pub use disabled::{PerfLogger, Timer};
