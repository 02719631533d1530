pub mod classifier;
pub mod collector;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod fixation;
pub mod reward;
pub mod screen;
pub mod session;
pub mod trial;

pub use classifier::{Classifier, Verdict};
pub use collector::{KeyBinding, KeyMap, ResponseCollector};
pub use config::{ConfigError, ExperimentConfig, TrialTypeConfig};
pub use context::{BlockColours, TrialContext};
pub use engine::TrialEngine;
pub use error::{Recycle, SessionError, TrialError};
pub use fixation::FixationMonitor;
pub use reward::{Payout, RewardCalculator, ScoreState};
pub use session::{Session, SessionSummary};
pub use trial::{PreparedTrial, TrialOutcome};
