use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ior_core::Modality;
use ior_timing::{refresh_interval, IntervalError};
use serde::{Deserialize, Serialize};

/// Which version of the probe task runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialTypeConfig {
    /// Vocal responses to probes, keypresses to bandits.
    #[default]
    Audio,
    /// Keypress responses to both.
    Keypress,
    /// Keypress responses to probes, withheld on no-go trials.
    GoNoGo,
}

impl TrialTypeConfig {
    pub fn probe_modality(&self) -> Modality {
        match self {
            TrialTypeConfig::Audio => Modality::Vocal,
            TrialTypeConfig::Keypress | TrialTypeConfig::GoNoGo => Modality::Keypress,
        }
    }

    pub fn uses_go_signal(&self) -> bool {
        matches!(self, TrialTypeConfig::GoNoGo)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub blocks_per_experiment: usize,
    pub trials_per_block: usize,
    pub run_bandit_blocks: bool,
    pub variant: TrialTypeConfig,
    pub ignore_vocal_for_bandits: bool,
    pub refresh_rate_hz: f64,
    pub trial_start_ms: u64,
    pub cue_duration_ms: u64,
    pub cueback_duration_ms: u64,
    pub cotoa_range_ms: (u64, u64),
    pub response_window_ms: u64,
    pub feedback_duration_ms: u64,
    pub high_payout_baseline: f64,
    pub low_payout_baseline: f64,
    pub payout_sd: f64,
    pub penalty: i64,
    pub fixation_radius_px: f32,
    pub colour_wheel_angles: Vec<u16>,
    pub learning_probe_thresholds: Vec<u32>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            blocks_per_experiment: 4,
            trials_per_block: 40,
            run_bandit_blocks: true,
            variant: TrialTypeConfig::Audio,
            ignore_vocal_for_bandits: false,
            refresh_rate_hz: 60.0,
            trial_start_ms: 1000,
            cue_duration_ms: 200,
            cueback_duration_ms: 200,
            cotoa_range_ms: (700, 1000),
            response_window_ms: 2000,
            feedback_duration_ms: 1250,
            high_payout_baseline: 12.0,
            low_payout_baseline: 8.0,
            payout_sd: 1.0,
            penalty: -5,
            fixation_radius_px: 60.0,
            colour_wheel_angles: vec![0, 45, 90, 135],
            learning_probe_thresholds: vec![5, 10, 15],
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse JSON {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("at least one block is required")]
    NoBlocks,
    #[error(
        "only {available} sets of colours available, {requested} blocks requested; \
         add colour wheel angles to run more blocks"
    )]
    NotEnoughColourSets { requested: usize, available: usize },
    #[error("cotoa range {lower} to {upper} ms is invalid at {hz} Hz: {source}")]
    Cotoa {
        lower: u64,
        upper: u64,
        hz: f64,
        #[source]
        source: IntervalError,
    },
    #[error("cotoa lower bound {cotoa_ms} ms must exceed the cueback duration {cueback_ms} ms")]
    CotoaOverlapsCueback { cotoa_ms: u64, cueback_ms: u64 },
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
    #[error("payout standard deviation must be finite and positive, got {0}")]
    PayoutSpread(f64),
    #[error(transparent)]
    Refresh(#[from] IntervalError),
}

impl ExperimentConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.blocks_per_experiment == 0 {
            return Err(ConfigError::NoBlocks);
        }
        if self.blocks_per_experiment > self.colour_wheel_angles.len() {
            return Err(ConfigError::NotEnoughColourSets {
                requested: self.blocks_per_experiment,
                available: self.colour_wheel_angles.len(),
            });
        }
        if self.trials_per_block == 0 {
            return Err(ConfigError::ZeroDuration("trials_per_block"));
        }
        if self.response_window_ms == 0 {
            return Err(ConfigError::ZeroDuration("response_window_ms"));
        }
        if self.cue_duration_ms == 0 {
            return Err(ConfigError::ZeroDuration("cue_duration_ms"));
        }
        if self.cueback_duration_ms == 0 {
            return Err(ConfigError::ZeroDuration("cueback_duration_ms"));
        }
        if self.trial_start_ms == 0 {
            return Err(ConfigError::ZeroDuration("trial_start_ms"));
        }
        if !self.payout_sd.is_finite() || self.payout_sd <= 0.0 {
            return Err(ConfigError::PayoutSpread(self.payout_sd));
        }

        let refresh = self.refresh()?;
        let (lower, upper) = self.cotoa_range_ms;
        let frames = refresh.as_nanos();
        let cotoa_err = |source| ConfigError::Cotoa {
            lower,
            upper,
            hz: self.refresh_rate_hz,
            source,
        };
        if lower > upper {
            return Err(cotoa_err(IntervalError::Inverted {
                lower: ms(lower),
                upper: ms(upper),
            }));
        }
        if ms(lower).as_nanos().div_ceil(frames) > ms(upper).as_nanos() / frames {
            return Err(cotoa_err(IntervalError::NoFrameInRange {
                lower: ms(lower),
                upper: ms(upper),
                refresh,
            }));
        }
        if lower <= self.cueback_duration_ms {
            return Err(ConfigError::CotoaOverlapsCueback {
                cotoa_ms: lower,
                cueback_ms: self.cueback_duration_ms,
            });
        }
        Ok(())
    }

    pub fn refresh(&self) -> Result<Duration, IntervalError> {
        refresh_interval(self.refresh_rate_hz)
    }

    pub fn trial_start(&self) -> Duration {
        ms(self.trial_start_ms)
    }

    pub fn cue_duration(&self) -> Duration {
        ms(self.cue_duration_ms)
    }

    pub fn cueback_duration(&self) -> Duration {
        ms(self.cueback_duration_ms)
    }

    pub fn cotoa_bounds(&self) -> (Duration, Duration) {
        (ms(self.cotoa_range_ms.0), ms(self.cotoa_range_ms.1))
    }

    pub fn response_window(&self) -> Duration {
        ms(self.response_window_ms)
    }

    pub fn feedback_duration(&self) -> Duration {
        ms(self.feedback_duration_ms)
    }
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}
