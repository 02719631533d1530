use std::time::Duration;

use ior_core::{Colour, ErrorTag, Location, TrialSpec, TrialState};
use ior_timing::{Timer, TrialClock};
use tracing::debug;

use crate::reward::ScoreState;

/// High- and low-value colours for the current block pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockColours {
    pub high: Colour,
    pub low: Colour,
}

impl BlockColours {
    pub fn at(&self, spec: &TrialSpec, location: Location) -> Colour {
        if location == spec.high_value_location {
            self.high
        } else {
            self.low
        }
    }
}

/// Everything one trial reads and writes, passed explicitly through the
/// trial phases.
#[derive(Debug)]
pub struct TrialContext<'a, T: Timer> {
    pub block_num: usize,
    pub trial_num: usize,
    pub spec: TrialSpec,
    pub clock: TrialClock<T>,
    pub cotoa: Option<Duration>,
    pub colours: BlockColours,
    pub score: &'a mut ScoreState,
    /// Set once the response window opens; fixation breaks no longer recycle.
    pub targets_shown: bool,
    state: TrialState,
    err: ErrorTag,
}

impl<'a, T: Timer> TrialContext<'a, T> {
    pub fn new(
        block_num: usize,
        trial_num: usize,
        spec: TrialSpec,
        clock: TrialClock<T>,
        cotoa: Option<Duration>,
        colours: BlockColours,
        score: &'a mut ScoreState,
    ) -> Self {
        Self {
            block_num,
            trial_num,
            spec,
            clock,
            cotoa,
            colours,
            score,
            targets_shown: false,
            state: TrialState::Placeholders,
            err: ErrorTag::Na,
        }
    }

    pub fn state(&self) -> TrialState {
        self.state
    }

    pub fn set_state(&mut self, state: TrialState) {
        if self.state != state {
            debug!(
                block = self.block_num,
                trial = self.trial_num,
                from = ?self.state,
                to = ?state,
                elapsed_ms = self.clock.elapsed().as_secs_f64() * 1e3,
                "trial state"
            );
            self.state = state;
        }
    }

    pub fn error(&self) -> ErrorTag {
        self.err
    }

    /// Records `tag` unless an error is already held. Returns whether it took.
    pub fn latch(&mut self, tag: ErrorTag) -> bool {
        if self.err.is_error() {
            return false;
        }
        self.err = tag;
        true
    }

    /// Response errors replace a latched fixation break.
    pub fn override_error(&mut self, tag: ErrorTag) {
        self.err = tag;
    }
}
