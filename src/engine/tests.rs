//! Playback tests against a hand-made graph and step log.

#[cfg(test)]
pub(crate) mod helpers {
    use serde_json::json;

    use crate::config::ReplayConfig;
    use crate::engine::Replay;
    use crate::engine::graph::{GraphDocument, LoadedGraph};
    use crate::engine::history::{AgentState, StepRecord};

    /// Nodes (layout x, y):
    ///   0:(0,0)  1:(4,0)  2:(4,4)  3:(0,4)
    ///
    /// Edges: 0→1 (4), 1→2 (2), 2→1 (2), 3→2 (4), 3→0 (4)
    /// Exits: 2 (metadata lists a sentinel first).
    pub fn graph() -> LoadedGraph {
        let doc: GraphDocument = serde_json::from_value(json!({
            "adjacency": {
                "0": [[1, 4]],
                "1": [[2, 2]],
                "2": [[1, 2]],
                "3": [[2, 4], [0, 4]]
            },
            "positions": { "0": [0, 0], "1": [4, 0], "2": [4, 4], "3": [0, 4] },
            "metadata": { "exit_nodes": ["start", 2] }
        }))
        .unwrap();
        LoadedGraph::from_document(doc)
    }

    /// Agent A starts on 0, agent B on 3.
    pub fn config() -> ReplayConfig {
        ReplayConfig {
            width: 60,
            height: 30,
            padding: 5,
            start_a: 0,
            start_b: 3,
            ..ReplayConfig::default()
        }
    }

    pub fn parked(node: u32) -> AgentState {
        AgentState::parked(node, Vec::new())
    }

    pub fn moving(from: u32, to: u32, progress: f64) -> AgentState {
        AgentState {
            pos: from,
            edge_from: Some(from),
            edge_to: Some(to),
            progress,
            planned_path: Vec::new(),
            delay: None,
        }
    }

    pub fn record(step: u32, a: AgentState, b: AgentState) -> StepRecord {
        StepRecord {
            step,
            agent_a: a,
            agent_b: b,
            caught: false,
            reached: false,
            log_events: Vec::new(),
        }
    }

    /// Five steps; B is delayed by 3 and leaves node 3 towards 2 at step 3.
    pub fn chase() -> Vec<StepRecord> {
        let mut first = record(1, moving(0, 1, 2.0), moving(3, 2, 1.0));
        first.agent_a.planned_path = vec![1, 2];
        first.agent_b.delay = Some(3);
        vec![
            first,
            record(2, parked(1), moving(3, 2, 2.0)),
            record(3, moving(1, 2, 1.0), moving(3, 2, 1.0)),
            record(4, parked(2), moving(3, 2, 3.0)),
            record(5, parked(2), parked(2)),
        ]
    }

    pub fn replay(records: Vec<StepRecord>) -> Replay {
        Replay::new(graph(), records, &config()).unwrap()
    }
}

#[cfg(test)]
mod replay {
    use super::helpers::*;
    use crate::engine::Replay;
    use crate::error::ReplayError;

    #[test]
    fn unknown_start_node_is_rejected() {
        let config = crate::config::ReplayConfig {
            start_b: 42,
            ..config()
        };
        let err = Replay::new(graph(), chase(), &config).unwrap_err();
        assert!(matches!(err, ReplayError::UnknownNode { node: 42, .. }));
    }

    #[test]
    fn unknown_record_position_is_rejected() {
        let records = vec![record(1, parked(9), parked(3))];
        let err = Replay::new(graph(), records, &config()).unwrap_err();
        assert!(matches!(err, ReplayError::UnknownNode { node: 9, .. }));
    }

    #[test]
    fn exits_drop_the_sentinel() {
        assert_eq!(replay(chase()).exits(), &[2]);
    }
}

#[cfg(test)]
mod playback {
    use super::helpers::*;
    use crate::engine::history::{AgentId, Outcome};
    use crate::engine::playback::{AgentStatus, Mode, PauseCause, Playback};

    #[test]
    fn starts_playing_on_the_opening_frame() {
        let replay = replay(chase());
        let mut playback = Playback::new(&replay);
        let frame = playback.frame();
        assert_eq!(frame.mode, Mode::Playing);
        assert_eq!(frame.view.index, 0);
        assert_eq!(frame.view.step, 0);
        assert_eq!(frame.view.agent(AgentId::A).status, AgentStatus::AtNode(0));
        // The opening frame is never delay-gated.
        assert_eq!(frame.view.agent(AgentId::B).status, AgentStatus::AtNode(3));
        assert_eq!(frame.trails.points(AgentId::B).len(), 1);
    }

    #[test]
    fn ticks_advance_one_frame_at_a_time_until_finished() {
        let replay = replay(chase());
        let mut playback = Playback::new(&replay);
        for expected in 1..=5 {
            assert!(playback.tick());
            assert_eq!(playback.cursor(), expected);
        }
        assert_eq!(playback.mode(), Mode::Finished);
        assert!(!playback.tick());
        assert_eq!(playback.cursor(), 5);
        assert_eq!(playback.toggle_pause(), Mode::Finished);
    }

    #[test]
    fn delayed_agent_waits_on_its_start_node() {
        let replay = replay(chase());
        let start_b = replay.layout().get(3).unwrap();
        let mut playback = Playback::new(&replay);

        playback.tick();
        let frame = playback.frame();
        assert_eq!(
            frame.view.agent(AgentId::B).status,
            AgentStatus::Waiting { remaining: 2 }
        );
        assert_eq!(frame.view.agent(AgentId::B).position, start_b);

        playback.tick();
        let frame = playback.frame();
        assert_eq!(frame.view.step, 2);
        let b = frame.view.agent(AgentId::B);
        assert_eq!(b.status, AgentStatus::Waiting { remaining: 1 });
        assert!(!b.visible());
        assert_eq!(b.position, start_b);
        // Only the opening frame put B on its trail so far.
        assert_eq!(frame.trails.points(AgentId::B), &[start_b]);

        playback.tick();
        let frame = playback.frame();
        assert_eq!(frame.view.step, 3);
        assert_eq!(
            frame.view.agent(AgentId::B).status,
            AgentStatus::OnEdge { from: 3, to: 2 }
        );
        assert!(frame.view.agent(AgentId::B).visible());
        assert_eq!(frame.trails.points(AgentId::B).len(), 2);
    }

    #[test]
    fn caught_freezes_on_the_decisive_frame() {
        let mut records = chase();
        records[2].caught = true;
        let replay = replay(records);
        let mut playback = Playback::new(&replay);

        playback.tick();
        playback.tick();
        assert!(playback.tick());
        assert_eq!(playback.cursor(), 3);
        assert_eq!(playback.mode(), Mode::Paused(PauseCause::Decided(Outcome::Caught)));

        for _ in 0..3 {
            assert!(!playback.tick());
        }
        assert_eq!(playback.cursor(), 3);
        // Resuming a decisive pause does nothing.
        playback.toggle_pause();
        assert!(!playback.tick());
        assert_eq!(playback.frame().view.outcome, Some(Outcome::Caught));
    }

    #[test]
    fn reached_pauses_as_escaped() {
        let mut records = chase();
        records[0].reached = true;
        let replay = replay(records);
        let mut playback = Playback::new(&replay);
        playback.tick();
        assert_eq!(
            playback.mode(),
            Mode::Paused(PauseCause::Decided(Outcome::Escaped))
        );
    }

    #[test]
    fn user_pause_holds_the_frame_and_redraws_idempotently() {
        let replay = replay(chase());
        let mut playback = Playback::new(&replay);
        playback.tick();
        assert_eq!(playback.toggle_pause(), Mode::Paused(PauseCause::User));

        let before = playback.frame().view.clone();
        let trails_before = playback.trails().clone();
        for _ in 0..4 {
            assert!(!playback.tick());
            assert_eq!(playback.frame().view, &before);
        }
        assert_eq!(playback.trails(), &trails_before);

        assert_eq!(playback.toggle_pause(), Mode::Playing);
        assert!(playback.tick());
        assert_eq!(playback.cursor(), 2);
    }

    #[test]
    fn parked_agent_keeps_its_last_heading() {
        let replay = replay(chase());
        let mut playback = Playback::new(&replay);
        playback.tick();
        let moving_heading = playback.frame().view.agent(AgentId::A).heading;
        // 0 → 1 runs straight right on screen.
        assert_eq!(moving_heading, 0.0);

        playback.tick();
        playback.tick();
        // 1 → 2 runs straight up on screen.
        let up = playback.frame().view.agent(AgentId::A).heading;
        assert!((up - 90.0).abs() < 1e-9);

        playback.tick();
        let parked = playback.frame().view.agent(AgentId::A);
        assert_eq!(parked.status, AgentStatus::AtNode(2));
        assert_eq!(parked.heading, up);
    }

    #[test]
    fn restart_is_idempotent() {
        let replay = replay(chase());
        let mut playback = Playback::new(&replay);
        for _ in 0..4 {
            playback.tick();
        }
        playback.toggle_pause();

        playback.restart();
        let once = (
            playback.cursor(),
            playback.mode(),
            playback.trails().clone(),
            playback.headings(),
        );
        playback.restart();
        let twice = (
            playback.cursor(),
            playback.mode(),
            playback.trails().clone(),
            playback.headings(),
        );

        assert_eq!(once, twice);
        assert_eq!(once.0, 0);
        assert_eq!(once.1, Mode::Playing);
        assert!(once.2.points(AgentId::A).is_empty());
        assert!(once.2.points(AgentId::B).is_empty());
        assert_eq!(once.3, [0.0, 0.0]);
    }

    #[test]
    fn restart_after_a_decisive_frame_plays_again() {
        let mut records = chase();
        records[1].caught = true;
        let replay = replay(records);
        let mut playback = Playback::new(&replay);
        playback.tick();
        playback.tick();
        assert!(!playback.is_playing());

        playback.restart();
        assert_eq!(playback.frame().view.index, 0);
        assert!(playback.tick());
        assert_eq!(playback.cursor(), 1);
    }

    #[test]
    fn trails_never_repeat_a_point() {
        let replay = replay(chase());
        let mut playback = Playback::new(&replay);
        while playback.tick() {}
        for agent in AgentId::ALL {
            let points = playback.trails().points(agent);
            assert!(points.windows(2).all(|w| w[0] != w[1]));
        }
    }

    #[test]
    fn manual_steps_only_while_paused_by_the_operator() {
        let replay = replay(chase());
        let mut straight = Playback::new(&replay);
        straight.tick();
        straight.tick();
        let expected_trails = straight.trails().clone();

        let mut playback = Playback::new(&replay);
        assert!(!playback.step_forward());
        playback.toggle_pause();
        assert!(playback.step_forward());
        assert!(playback.step_forward());
        assert!(playback.step_forward());
        assert_eq!(playback.cursor(), 3);

        assert!(playback.step_back());
        assert_eq!(playback.cursor(), 2);
        assert_eq!(playback.mode(), Mode::Paused(PauseCause::User));
        assert_eq!(playback.trails(), &expected_trails);
        assert_eq!(playback.frame().view.step, 2);
    }

    #[test]
    fn advance_walks_past_a_decisive_frame() {
        let mut records = chase();
        records[1].caught = true;
        let replay = replay(records);
        let mut playback = Playback::new(&replay);

        let mut steps = vec![playback.frame().view.step];
        while playback.advance() {
            steps.push(playback.frame().view.step);
        }
        assert_eq!(steps, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(playback.mode(), Mode::Finished);
        assert!(!playback.advance());
    }

    #[test]
    fn empty_history_finishes_on_the_opening_frame() {
        let replay = replay(Vec::new());
        let mut playback = Playback::new(&replay);
        assert_eq!(playback.frame().mode, Mode::Finished);
        assert!(!playback.tick());
        assert_eq!(playback.cursor(), 0);
    }
}
