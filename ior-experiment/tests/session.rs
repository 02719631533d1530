mod common;

use common::{ms, test_config, FixedSource, MemoryStore, Reaction, ScriptedHost};
use ior_core::{
    BlockType, ErrorTag, Location, MessageKey, Modality, OrNa, ProbeColour, Record, SessionPhase,
    TrialSpec, ValueClass,
};
use ior_experiment::{ConfigError, ExperimentConfig, Session, SessionError};
use ior_timing::SimulatedTimer;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn source() -> FixedSource {
    FixedSource {
        bandit: vec![
            TrialSpec::bandit(Location::Left, ValueClass::High),
            TrialSpec::bandit(Location::Right, ValueClass::Low),
        ],
        probe: vec![
            TrialSpec::probe(Location::Left, Location::Right, ProbeColour::High),
            TrialSpec::probe(Location::Right, Location::Right, ProbeColour::Neutral),
        ],
    }
}

fn participant() -> Reaction {
    Reaction {
        bandit_key: Some("z"),
        probe: Some(Modality::Vocal),
        delay: ms(320),
        ..Default::default()
    }
}

fn small_config(blocks: usize, trials: usize) -> ExperimentConfig {
    ExperimentConfig {
        blocks_per_experiment: blocks,
        trials_per_block: trials,
        ..test_config()
    }
}

fn session(
    config: ExperimentConfig,
    timer: &SimulatedTimer,
) -> Session<SimulatedTimer, StdRng> {
    Session::new(config, timer.clone(), StdRng::seed_from_u64(5)).unwrap()
}

#[test]
fn runs_every_planned_block_and_stores_each_trial() {
    let timer = SimulatedTimer::new();
    let mut session = session(small_config(2, 3), &timer);
    let mut host = ScriptedHost::new(timer, participant());
    let mut store = MemoryStore::default();

    session.setup(&mut host);
    assert_eq!(host.boundaries.len(), 1);
    let summary = session.run(&mut host, &mut store, &mut source()).unwrap();

    assert_eq!(
        session.plan(),
        &[BlockType::Bandit, BlockType::Probe, BlockType::Bandit, BlockType::Probe]
    );
    assert_eq!(session.phase(), SessionPhase::Debrief);
    assert_eq!(summary.trials, 12);
    assert_eq!(summary.recycled, 0);
    assert!(!summary.quit);
    assert_eq!(summary.errors.get(&ErrorTag::Na), Some(&12));

    let trials = store.trials();
    assert_eq!(trials.len(), 12);
    for (i, record) in trials.iter().enumerate() {
        assert_eq!(record.block_num, i / 3 + 1);
        assert_eq!(record.trial_num, i % 3 + 1);
    }
    let bandit = trials.iter().find(|r| r.block_type == BlockType::Bandit).unwrap();
    assert_eq!(bandit.bandit_rt, OrNa::Value(320.0));
    assert_eq!(bandit.probe_rt, OrNa::Na);
    let probe = trials.iter().find(|r| r.block_type == BlockType::Probe).unwrap();
    assert_eq!(probe.probe_rt, OrNa::Value(320.0));
    assert_eq!(probe.high_value_col, OrNa::Na);

    // One score per bandit block, and the first one is announced before block 2.
    assert_eq!(summary.block_scores.iter().map(|(b, _)| *b).collect::<Vec<_>>(), vec![1, 3]);
    let (_, first_score) = summary.block_scores[0];
    assert_eq!(host.texts_containing("Total block score"), 2);
    assert!(host.texts_containing(&format!("Total block score: {first_score} points!")) >= 1);
}

#[test]
fn bandit_blocks_use_distinct_complementary_colours() {
    let timer = SimulatedTimer::new();
    let mut session = session(small_config(2, 1), &timer);
    let mut host = ScriptedHost::new(timer, participant());
    let mut store = MemoryStore::default();
    session.setup(&mut host);
    session.run(&mut host, &mut store, &mut source()).unwrap();

    let colours: Vec<_> = store
        .trials()
        .iter()
        .filter(|r| r.block_type == BlockType::Bandit)
        .map(|r| (r.high_value_col.value().copied(), r.low_value_col.value().copied()))
        .collect();
    assert_eq!(colours.len(), 2);
    assert_ne!(colours[0], colours[1]);
    // The scripted display encodes the wheel angle in the red channel.
    let wheel: Vec<[u8; 2]> = [0u16, 45, 90, 135]
        .iter()
        .map(|a| [(a % 256) as u8, ((a + 180) % 360 % 256) as u8])
        .collect();
    for (high, low) in colours {
        let reds = [high.unwrap()[0], low.unwrap()[0]];
        assert!(wheel.iter().any(|p| *p == reds || *p == [reds[1], reds[0]]));
    }
}

#[test]
fn fixation_break_requeues_the_trial_without_recording_it() {
    let timer = SimulatedTimer::new();
    let mut session = session(small_config(1, 2), &timer);
    let mut host = ScriptedHost::new(timer, participant());
    host.gaze_out.push((ms(500), ms(510)));
    let mut store = MemoryStore::default();

    session.setup(&mut host);
    let summary = session.run(&mut host, &mut store, &mut source()).unwrap();

    assert_eq!(summary.recycled, 1);
    // Both blocks still complete their full trial count.
    assert_eq!(summary.trials, 4);
    assert_eq!(store.trials().len(), 4);
    assert!(store.trials().iter().all(|r| r.err != ErrorTag::LeftFixation));
    assert_eq!(host.texts_containing(&MessageKey::Fixation.text()), 1);
}

#[test]
fn learning_probes_are_stored_alongside_trials() {
    let timer = SimulatedTimer::new();
    let config = ExperimentConfig {
        learning_probe_thresholds: vec![1, 2],
        ..small_config(1, 4)
    };
    let mut session = session(config, &timer);
    let mut host = ScriptedHost::new(timer, participant());
    let mut store = MemoryStore::default();

    session.setup(&mut host);
    let summary = session.run(&mut host, &mut store, &mut source()).unwrap();

    // "z" always picks the left bandit, which is high value on every other trial.
    assert_eq!(summary.learning_probes, 2);
    let probes: Vec<_> = store
        .records
        .iter()
        .filter_map(|r| match r {
            Record::LearningProbe(p) => Some(p),
            Record::Trial(_) => None,
        })
        .collect();
    assert_eq!(probes.iter().map(|p| p.threshold).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(probes[0].trial_num, 1);
    assert_eq!(probes[1].trial_num, 3);
    assert_eq!(host.questions, 2);
}

#[test]
fn quit_request_ends_the_session_early() {
    let timer = SimulatedTimer::new();
    let mut session = session(small_config(2, 3), &timer);
    let mut host = ScriptedHost::new(timer, participant());
    host.quit_on_feedback = true;
    let mut store = MemoryStore::default();

    session.setup(&mut host);
    let summary = session.run(&mut host, &mut store, &mut source()).unwrap();

    assert!(summary.quit);
    assert_eq!(summary.trials, 0);
    assert!(store.records.is_empty());
    assert_eq!(
        session.phase(),
        SessionPhase::Block {
            number: 1,
            block_type: BlockType::Bandit
        }
    );
}

#[test]
fn probe_only_sessions_still_assign_colours() {
    let timer = SimulatedTimer::new();
    let config = ExperimentConfig {
        run_bandit_blocks: false,
        ..small_config(3, 2)
    };
    let mut session = session(config, &timer);
    let mut host = ScriptedHost::new(timer, participant());
    let mut store = MemoryStore::default();

    session.setup(&mut host);
    let summary = session.run(&mut host, &mut store, &mut source()).unwrap();

    assert_eq!(session.plan(), &[BlockType::Probe; 3]);
    assert_eq!(summary.trials, 6);
    assert!(summary.block_scores.is_empty());
}

#[test]
fn more_blocks_than_colour_sets_is_rejected() {
    let result = Session::new(
        small_config(5, 1),
        SimulatedTimer::new(),
        StdRng::seed_from_u64(0),
    );
    assert!(matches!(
        result,
        Err(SessionError::Config(ConfigError::NotEnoughColourSets {
            requested: 5,
            available: 4
        }))
    ));
}
