use ior_core::{Boundary, ErrorTag, GazeSampler, Host, MessageKey};
use ior_timing::Timer;
use tracing::{info, warn};

use crate::context::TrialContext;
use crate::error::{Recycle, TrialError};
use crate::screen::show_error_message;

pub const FIXATION_BOUNDARY: &str = "fixation";

/// Checks gaze against the fixation boundary once per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FixationMonitor {
    boundary: Boundary,
}

impl FixationMonitor {
    pub fn new(radius_px: f32) -> Self {
        Self {
            boundary: Boundary::circle(FIXATION_BOUNDARY, radius_px),
        }
    }

    pub fn register<G: GazeSampler + ?Sized>(&self, gaze: &mut G) {
        gaze.add_boundary(self.boundary.clone());
    }

    /// Before the targets appear a break recycles the trial. Afterwards it is
    /// latched as `left_fixation` and the trial runs on; the message is only
    /// shown for the first break.
    pub fn confirm_fixation<H, T>(
        &self,
        host: &mut H,
        ctx: &mut TrialContext<'_, T>,
    ) -> Result<(), TrialError>
    where
        H: Host + ?Sized,
        T: Timer,
    {
        if host.within_boundary(&self.boundary.name) {
            return Ok(());
        }
        let elapsed = ctx.clock.elapsed();
        if !ctx.targets_shown {
            info!(
                block = ctx.block_num,
                trial = ctx.trial_num,
                elapsed_ms = elapsed.as_secs_f64() * 1e3,
                "gaze left fixation, recycling trial"
            );
            show_error_message(host, MessageKey::Fixation);
            return Err(TrialError::Recycle(Recycle { elapsed }));
        }
        if ctx.latch(ErrorTag::LeftFixation) {
            warn!(
                block = ctx.block_num,
                trial = ctx.trial_num,
                elapsed_ms = elapsed.as_secs_f64() * 1e3,
                "gaze left fixation after target onset"
            );
            show_error_message(host, MessageKey::Fixation);
        }
        Ok(())
    }
}
