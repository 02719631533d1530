use std::time::Duration;

use ior_core::HostError;
use ior_timing::{IntervalError, TimelineError};

use crate::config::ConfigError;

/// Signal that a trial was abandoned before its target appeared and must be
/// run again later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recycle {
    pub elapsed: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum TrialError {
    #[error("gaze left fixation {:?} into the trial, before target onset", .0.elapsed)]
    Recycle(Recycle),
    #[error("participant requested to quit")]
    QuitRequested,
    #[error(transparent)]
    Timeline(#[from] TimelineError),
    #[error(transparent)]
    Interval(#[from] IntervalError),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("trial {trial_num} of block {block_num} failed: {source}")]
    Trial {
        block_num: usize,
        trial_num: usize,
        #[source]
        source: TrialError,
    },
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("no colour set left for block {0}")]
    ColoursExhausted(usize),
}
