use std::time::Duration;

use ior_core::{LearningProbeRecord, TrialRecord, TrialSpec};
use ior_timing::EventTimeline;

use crate::classifier::Verdict;
use crate::reward::Payout;

/// A trial with its timeline fixed, ready to run.
#[derive(Debug, Clone)]
pub struct PreparedTrial {
    pub spec: TrialSpec,
    pub timeline: EventTimeline,
    /// Cue-offset to target-onset asynchrony; probe trials only.
    pub cotoa: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct TrialOutcome {
    pub record: TrialRecord,
    pub verdict: Verdict,
    pub payout: Option<Payout>,
    pub learning_probe: Option<LearningProbeRecord>,
}
