use std::path::PathBuf;

use anyhow::Result;
use ior_experiment::{ExperimentConfig, Session, SessionSummary};
use ior_timing::{HighPrecisionTimer, SimulatedTimer, Timer};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use crate::sim::{Participant, SimulatedHost};
use crate::source::FactorialTrialSource;
use crate::store::MemoryStore;
use crate::Cli;

pub struct App {
    config: ExperimentConfig,
    output: PathBuf,
    seed: Option<u64>,
    realtime: bool,
    participant: Participant,
}

impl App {
    /// Loads the configuration file if given, applies CLI overrides and
    /// validates the result.
    pub fn new(cli: Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => ExperimentConfig::from_json_file(path)?,
            None => ExperimentConfig::default(),
        };
        if let Some(blocks) = cli.blocks {
            config.blocks_per_experiment = blocks;
        }
        if let Some(trials) = cli.trials {
            config.trials_per_block = trials;
        }
        if let Some(variant) = cli.variant {
            config.variant = variant.into();
        }
        if let Some(hz) = cli.refresh_rate {
            config.refresh_rate_hz = hz;
        }
        if cli.no_bandit_blocks {
            config.run_bandit_blocks = false;
        }
        if cli.ignore_vocal_for_bandits {
            config.ignore_vocal_for_bandits = true;
        }
        config.validate()?;

        let p = &cli.participant;
        let participant = Participant {
            rt_mean_ms: p.rt_mean,
            rt_sd_ms: p.rt_sd,
            break_rate: p.break_rate,
            lapse_rate: p.lapse_rate,
            slip_rate: p.slip_rate,
            false_alarm_rate: p.false_alarm_rate,
            explore_rate: p.explore_rate,
            probe_modality: config.variant.probe_modality(),
        };

        Ok(Self {
            config,
            output: cli.output,
            seed: cli.seed,
            realtime: cli.realtime,
            participant,
        })
    }

    pub fn run(self) -> Result<()> {
        info!(
            platform = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            variant = ?self.config.variant,
            blocks = self.config.blocks_per_experiment,
            trials_per_block = self.config.trials_per_block,
            refresh_hz = self.config.refresh_rate_hz,
            realtime = self.realtime,
            "starting session"
        );
        if self.realtime {
            self.run_with(HighPrecisionTimer::new())
        } else {
            self.run_with(SimulatedTimer::new())
        }
    }

    fn run_with<T: Timer<Timestamp = u64>>(&self, timer: T) -> Result<()> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let host_rng = StdRng::seed_from_u64(rng.random());
        let source_rng = StdRng::seed_from_u64(rng.random());

        let frame = self.config.refresh()?;
        let mut host =
            SimulatedHost::new(timer.clone(), frame, self.participant.clone(), host_rng)?;
        let mut source =
            FactorialTrialSource::new(source_rng, self.config.variant.uses_go_signal());
        let mut store = MemoryStore::default();

        let mut session = Session::new(self.config.clone(), timer, rng)?;
        session.setup(&mut host);
        let summary = session.run(&mut host, &mut store, &mut source)?;

        self.report(&summary, &store, &host);
        store.write_json(&self.output, &self.config, self.seed)?;
        info!(path = %self.output.display(), "results saved");
        Ok(())
    }

    fn report<T: Timer<Timestamp = u64>>(
        &self,
        summary: &SessionSummary,
        store: &MemoryStore,
        host: &SimulatedHost<T>,
    ) {
        if summary.quit {
            warn!("session ended early at participant request");
        }
        info!(
            trials = summary.trials,
            recycled = summary.recycled,
            learning_probes = summary.learning_probes,
            messages = host.messages,
            "session complete"
        );
        for (tag, rate) in store.error_rates() {
            info!(err = %tag, rate_pct = (rate * 1000.0).round() / 10.0, "error rate");
        }
        match store.probe_rt_stats() {
            Some((mean_ms, min_ms, max_ms)) => {
                info!(mean_ms, min_ms, max_ms, "probe reaction times")
            }
            None => info!("no valid probe responses"),
        }
        for (block, score) in &summary.block_scores {
            info!(block, score, "bandit block score");
        }

        let stats = host.timer().calibration_stats();
        info!(
            frames = host.frames,
            frame_ms = stats.average_frame_time_ns / 1e6,
            jitter_ms = stats.jitter_ns / 1e6,
            fps = stats.effective_fps,
            "frame timing"
        );
    }
}
