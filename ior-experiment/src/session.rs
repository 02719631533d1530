use std::collections::{BTreeMap, VecDeque};

use ior_core::{
    BlockType, ErrorTag, Host, Record, ResultStore, SessionPhase, TextStyle, TrialSource,
};
use ior_timing::Timer;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, warn};

use crate::config::ExperimentConfig;
use crate::context::BlockColours;
use crate::engine::TrialEngine;
use crate::error::{SessionError, TrialError};
use crate::reward::ScoreState;
use crate::screen::show_text;

/// Tallies kept while a session runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSummary {
    pub trials: usize,
    pub recycled: usize,
    pub errors: BTreeMap<ErrorTag, usize>,
    /// Final score of each bandit block, by block number.
    pub block_scores: Vec<(usize, i64)>,
    pub learning_probes: usize,
    pub quit: bool,
}

enum BlockFlow {
    Continue,
    Quit,
}

/// Drives blocks of trials: colour assignment, score resets, the trial queue
/// and recycling.
pub struct Session<T, R>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    engine: TrialEngine<T, R>,
    plan: Vec<BlockType>,
    phase: SessionPhase,
    colour_sets: Vec<[ior_core::Colour; 2]>,
    colours: Option<BlockColours>,
    score: ScoreState,
    summary: SessionSummary,
}

impl<T, R> Session<T, R>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    pub fn new(config: ExperimentConfig, timer: T, rng: R) -> Result<Self, SessionError> {
        let plan = SessionPhase::plan(config.blocks_per_experiment, config.run_bandit_blocks);
        let engine = TrialEngine::new(config, timer, rng)?;
        Ok(Self {
            engine,
            plan,
            phase: SessionPhase::default(),
            colour_sets: Vec::new(),
            colours: None,
            score: ScoreState::default(),
            summary: SessionSummary::default(),
        })
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.engine.config
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn plan(&self) -> &[BlockType] {
        &self.plan
    }

    /// Registers the fixation boundary and draws one complementary colour
    /// pair per block from the display's colour wheel.
    pub fn setup<H: Host>(&mut self, host: &mut H) {
        self.engine.setup(host);
        self.colour_sets = self
            .engine
            .config
            .colour_wheel_angles
            .iter()
            .map(|&angle| {
                [
                    host.constant_luminance(angle),
                    host.constant_luminance((angle + 180) % 360),
                ]
            })
            .collect();
        self.colour_sets.shuffle(&mut self.engine.rng);
    }

    pub fn run<H, S, Src>(
        &mut self,
        host: &mut H,
        store: &mut S,
        source: &mut Src,
    ) -> Result<SessionSummary, SessionError>
    where
        H: Host,
        S: ResultStore,
        Src: TrialSource,
    {
        while let Some(next) = self.phase.next(&self.plan) {
            self.phase = next;
            match next {
                SessionPhase::Block { number, block_type } => {
                    self.start_block(host, number, block_type)?;
                    let flow = self.run_block(host, store, source, number, block_type)?;
                    if block_type == BlockType::Bandit {
                        self.summary.block_scores.push((number, self.score.total()));
                    }
                    if let BlockFlow::Quit = flow {
                        info!(block = number, "session ended at participant request");
                        self.summary.quit = true;
                        break;
                    }
                }
                SessionPhase::Debrief => break,
                SessionPhase::Welcome => {}
            }
        }
        Ok(self.summary.clone())
    }

    fn start_block<H: Host>(
        &mut self,
        host: &mut H,
        number: usize,
        block_type: BlockType,
    ) -> Result<(), SessionError> {
        if self.score.total() != 0 {
            show_text(
                host,
                format!("Total block score: {} points!", self.score.total()),
                TextStyle::Timeout,
            );
        }
        self.score.reset();

        if block_type == BlockType::Bandit || !self.engine.config.run_bandit_blocks {
            let mut pair = self
                .colour_sets
                .pop()
                .ok_or(SessionError::ColoursExhausted(number))?;
            pair.shuffle(&mut self.engine.rng);
            self.colours = Some(BlockColours {
                high: pair[0],
                low: pair[1],
            });
        }

        let threshold = host.calibrate_audio();
        info!(
            block = number,
            block_type = block_type.as_str(),
            audio_threshold = threshold,
            "block started"
        );
        Ok(())
    }

    fn run_block<H, S, Src>(
        &mut self,
        host: &mut H,
        store: &mut S,
        source: &mut Src,
        block_num: usize,
        block_type: BlockType,
    ) -> Result<BlockFlow, SessionError>
    where
        H: Host,
        S: ResultStore,
        Src: TrialSource,
    {
        let colours = self
            .colours
            .ok_or(SessionError::ColoursExhausted(block_num))?;
        let mut queue: VecDeque<_> = source
            .block_trials(block_type, self.engine.config.trials_per_block)
            .into();
        let mut completed = 0;

        while let Some(spec) = queue.pop_front() {
            let trial_num = completed + 1;
            let trial_err = |source| SessionError::Trial {
                block_num,
                trial_num,
                source,
            };
            let prepared = self.engine.prepare(spec).map_err(trial_err)?;
            let result = self.engine.run_trial(
                host,
                prepared,
                block_num,
                trial_num,
                colours,
                &mut self.score,
            );
            self.engine.clean_up(host);

            match result {
                Ok(outcome) => {
                    completed += 1;
                    self.summary.trials += 1;
                    *self.summary.errors.entry(outcome.record.err).or_default() += 1;
                    store.insert(Record::Trial(outcome.record))?;
                    if let Some(probe) = outcome.learning_probe {
                        self.summary.learning_probes += 1;
                        store.insert(Record::LearningProbe(probe))?;
                    }
                }
                Err(TrialError::Recycle(recycle)) => {
                    self.summary.recycled += 1;
                    let at = self.engine.rng.random_range(0..=queue.len());
                    queue.insert(at, spec);
                    warn!(
                        block = block_num,
                        trial = trial_num,
                        elapsed_ms = recycle.elapsed.as_secs_f64() * 1e3,
                        requeued_at = at,
                        "trial recycled"
                    );
                }
                Err(TrialError::QuitRequested) => return Ok(BlockFlow::Quit),
                Err(other) => return Err(trial_err(other)),
            }
        }
        Ok(BlockFlow::Continue)
    }
}
