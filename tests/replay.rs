use std::fs;
use std::path::PathBuf;

use serde_json::{Value, json};
use tempfile::TempDir;

use chase_replay::engine::history::{AgentId, Outcome};
use chase_replay::engine::playback::{AgentStatus, Mode, PauseCause, Playback};
use chase_replay::renderer::{ArtifactFormat, Recorder};
use chase_replay::scene::Scene;
use chase_replay::types::{Frame, PlayablePresentation};
use chase_replay::{Replay, ReplayConfig, ReplayError};

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Fixture {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    fn write(&self, file: &str, value: &Value) -> PathBuf {
        let path = self.path(file);
        fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
        path
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.path().join(file)
    }
}

fn config() -> ReplayConfig {
    ReplayConfig {
        width: 60,
        height: 30,
        padding: 5,
        start_a: 0,
        start_b: 1,
        ..ReplayConfig::default()
    }
}

/// Two nodes ten units apart, joined by a single edge of weight 4.
fn graph() -> Value {
    json!({
        "adjacency": { "0": [[1, 4]], "1": [] },
        "positions": { "0": [0, 0], "1": [10, 0] },
        "metadata": { "exit_nodes": ["start", 1] }
    })
}

fn history() -> Value {
    json!([
        {
            "step": 1,
            "carA": { "pos": 0, "edge_from": 0, "edge_to": 1, "progress": 2, "Dijkstra_path": [0, 1] },
            "carB": { "pos": 1, "Dijkstra_path": [], "delay": 0 },
            "log_events": ["A leaves 0"]
        },
        {
            "step": 2,
            "carA": { "pos": 1, "Dijkstra_path": [] },
            "carB": { "pos": 1, "Dijkstra_path": [] },
            "caught": true
        }
    ])
}

fn load(fixture: &Fixture) -> Replay {
    let graph = fixture.write("graph.json", &graph());
    let history = fixture.write("simulation.json", &history());
    Replay::load(&graph, &history, &config()).unwrap()
}

#[test]
fn halfway_along_an_edge_is_the_midpoint() {
    let fixture = Fixture::new();
    let replay = load(&fixture);
    assert_eq!(replay.exits(), &[1]);

    let start = replay.layout().get(0).unwrap();
    let end = replay.layout().get(1).unwrap();

    let mut playback = Playback::new(&replay);
    assert!(playback.tick());
    let snapshot = playback.frame();
    let a = snapshot.view.agent(AgentId::A);
    assert_eq!(a.status, AgentStatus::OnEdge { from: 0, to: 1 });
    assert!((a.position.x - (start.x + end.x) / 2.0).abs() < 1e-9);
    assert!((a.position.y - start.y).abs() < 1e-9);
    assert!(a.heading.abs() < 1e-9);
}

#[test]
fn capture_freezes_playback() {
    let fixture = Fixture::new();
    let replay = load(&fixture);
    let mut playback = Playback::new(&replay);
    while playback.tick() {}

    assert_eq!(playback.cursor(), 2);
    assert_eq!(playback.mode(), Mode::Paused(PauseCause::Decided(Outcome::Caught)));
    playback.toggle_pause();
    assert!(!playback.tick());
    assert_eq!(playback.cursor(), 2);
}

#[test]
fn missing_history_is_reported() {
    let fixture = Fixture::new();
    let graph = fixture.write("graph.json", &graph());
    let err = Replay::load(&graph, &fixture.path("nope.json"), &config()).unwrap_err();
    assert!(matches!(err, ReplayError::MissingInput { ref path, .. } if path.ends_with("nope.json")));
}

#[test]
fn unknown_start_node_is_rejected() {
    let fixture = Fixture::new();
    let graph = fixture.write("graph.json", &graph());
    let history = fixture.write("simulation.json", &history());
    let config = ReplayConfig {
        start_b: 49,
        ..config()
    };
    let err = Replay::load(&graph, &history, &config).unwrap_err();
    assert!(matches!(err, ReplayError::UnknownNode { node: 49, .. }));
}

#[test]
fn exported_json_plays_back_the_recording() {
    let fixture = Fixture::new();
    let replay = load(&fixture);
    let config = config();
    let scene = Scene::new(&replay, &config);
    let recording = Recorder::record(&replay, &scene, config.tick_ms);
    assert_eq!(recording.frames.len(), replay.history().len());

    let out = fixture.path("anim.json");
    recording.write(&out, ArtifactFormat::from_path(&out)).unwrap();
    let presentation: PlayablePresentation =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();

    assert_eq!(presentation.interval_ms, 500);
    assert_eq!(presentation.frames.len(), 3);
    assert!(matches!(presentation.frames[0], Frame::Full { .. }));
    let labels: Vec<_> = presentation.markers.iter().map(|m| m.label.as_str()).collect();
    assert_eq!(labels, vec!["A leaves 0", "CAUGHT! at step 2"]);
    assert_eq!(presentation.markers_at(2).count(), 1);
}

#[test]
fn exported_html_is_self_contained() {
    let fixture = Fixture::new();
    let replay = load(&fixture);
    let config = config();
    let scene = Scene::new(&replay, &config);
    let recording = Recorder::record(&replay, &scene, 200);

    let out = fixture.path("anim.html");
    recording.write(&out, ArtifactFormat::Html).unwrap();
    let html = fs::read_to_string(&out).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert_eq!(html.matches("<pre class=\"frame\"").count(), 3);
    assert!(html.contains("data-interval=\"200\""));
    assert!(html.contains("CAUGHT!"));
}

#[test]
fn export_keeps_steps_after_an_early_capture() {
    let fixture = Fixture::new();
    let mut records = history();
    records[0]["caught"] = json!(true);
    let graph = fixture.write("graph.json", &graph());
    let history = fixture.write("simulation.json", &records);
    let config = config();
    let replay = Replay::load(&graph, &history, &config).unwrap();
    let scene = Scene::new(&replay, &config);

    let recording = Recorder::record(&replay, &scene, config.tick_ms);
    assert_eq!(recording.frames.len(), 3);
    let labels: Vec<_> = recording.markers.iter().map(|m| m.label.as_str()).collect();
    assert_eq!(labels, vec!["A leaves 0", "CAUGHT! at step 1"]);
}
