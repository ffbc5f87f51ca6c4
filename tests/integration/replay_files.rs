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
// TESTS: 5
// =====
//
// Loading scenario and config files from disk and replaying them.

use chat_viewport::config::EngineConfig;
use chat_viewport::error::ViewportError;
use chat_viewport::replay::{self, Cause, Scenario};
use pretty_assertions::assert_eq;
use std::io::Write;
use std::path::Path;

fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

const CHAT_SESSION: &str = r#"{
    "config": {"overscan": 2, "initial_position": "bottom"},
    "client_height": 300,
    "items": [
        {"id": "welcome", "height": 120},
        {"id": 1, "height": 30}
    ],
    "generate": {"count": 48, "heights": [30]},
    "steps": [
        {"at_ms": 0, "action": "append", "items": [{"id": "reply"}]},
        {"at_ms": 50, "action": "measure", "id": "reply", "height": 150},
        {"at_ms": 100, "action": "scroll", "scroll_top": 0},
        {"at_ms": 500, "action": "resize", "client_height": 600},
        {"at_ms": 600, "action": "truncate", "len": 10}
    ]
}"#;

#[test]
fn scenario_file_replays_a_chat_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "session.json", CHAT_SESSION);
    let scenario = Scenario::load(&path).unwrap();
    let config = scenario.config.clone().unwrap();
    assert_eq!(config.overscan, 2);

    let records = replay::replay(&scenario, config).unwrap();
    let causes: Vec<_> = records.iter().map(|record| record.cause).collect();
    assert_eq!(
        causes,
        vec![
            Cause::Initial,
            Cause::Items,
            Cause::Measure,
            Cause::Scroll,
            Cause::Timer,
            Cause::Resize,
            Cause::Items,
        ]
    );

    // Opened at the bottom of 120 + 49 * 30 = 1590px.
    assert!((records[0].update.state.scroll_top - 1_290.0).abs() < 1e-9);
    // Appending and growing the reply keep the bottom pinned.
    assert!((records[1].update.state.scroll_top - 1_330.0).abs() < 1e-9);
    assert!((records[2].update.state.scroll_top - 1_440.0).abs() < 1e-9);
    // Scrolled to the top, then idle.
    assert_eq!(records[3].update.range.rendered.start, 0);
    assert!(!records[4].update.is_scrolling);
    // Truncated list fits the viewport.
    assert_eq!(records[6].update.range.visible.end, 9);
    assert!((records[6].update.state.scroll_top).abs() < 1e-9);
}

#[test]
fn config_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "engine.json", r#"{"overscan": 0, "idle_ms": 300}"#);
    let config = EngineConfig::load(&path).unwrap();
    assert_eq!(config.overscan, 0);
    assert_eq!(config.idle_timeout().as_millis(), 300);
    assert_eq!(config.throttle_ms, 16);
}

#[test]
fn invalid_config_file_is_rejected_with_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "engine.json", r#"{"end_reached_threshold": 2.0}"#);
    let err = EngineConfig::load(&path).unwrap_err();
    assert!(matches!(err, ViewportError::InvalidConfig(_)));
    assert_eq!(err.exit_code(), ViewportError::INVALID_CONFIG_EXIT_CODE);
}

#[test]
fn missing_scenario_reports_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Scenario::load(&dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, ViewportError::Read { .. }));
    assert!(err.user_message().contains("nope.json"));
}

#[tokio::test(start_paused = true)]
async fn realtime_replay_matches_synthetic_timeline() {
    let scenario = Scenario::from_json(
        r#"{
            "client_height": 600,
            "generate": {"count": 1000, "heights": [60]},
            "steps": [
                {"at_ms": 0, "action": "scroll", "scroll_top": 600},
                {"at_ms": 5, "action": "scroll", "scroll_top": 3000},
                {"at_ms": 300, "action": "scroll_to_index", "index": 900}
            ]
        }"#,
        "inline",
    )
    .unwrap();

    let synthetic: Vec<_> = replay::replay(&scenario, EngineConfig::default())
        .unwrap()
        .into_iter()
        .map(|record| record.update)
        .collect();
    let realtime: Vec<_> = tokio::task::LocalSet::new()
        .run_until(replay::replay_realtime(&scenario, EngineConfig::default()))
        .await
        .unwrap()
        .into_iter()
        .filter_map(|event| match event {
            chat_viewport::viewport::ViewportEvent::Updated(update) => Some(update),
            chat_viewport::viewport::ViewportEvent::EndReached(_) => None,
        })
        .collect();

    // The realtime driver also publishes the initial resize.
    assert_eq!(&realtime[1..], &synthetic[..]);
}
