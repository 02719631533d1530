use std::time::Duration;

use ior_core::stimulus::{GREY, WHITE};
use ior_core::{
    BlockType, Colour, ErrorTag, GazeSampler, GoSignal, Host, InputCapture, Layer,
    LearningProbeRecord, Location, Modality, OrNa, ProbeColour, ScreenLocation, Shape, TextStyle,
    TrialRecord, TrialSpec, TrialState,
};
use ior_timing::{random_interval, EventName, EventTimeline, Timer, TrialClock};
use rand::Rng;
use tracing::{debug, info};

use crate::classifier::{Classifier, Verdict};
use crate::collector::{KeyMap, ResponseCollector};
use crate::config::{ConfigError, ExperimentConfig};
use crate::context::{BlockColours, TrialContext};
use crate::error::TrialError;
use crate::fixation::FixationMonitor;
use crate::reward::{Payout, RewardCalculator, ScoreState};
use crate::screen::{present_neutral_boxes, show_error_message};
use crate::trial::{PreparedTrial, TrialOutcome};

pub const LEARNING_PROBE_QUESTION: &str =
    "Which colour do you think has been paying out more points?";

/// Runs single trials: timeline preparation, the placeholder and cue loop,
/// the response window, classification and bandit feedback.
pub struct TrialEngine<T, R>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    pub config: ExperimentConfig,
    pub timer: T,
    pub rng: R,
    refresh: Duration,
    fixation: FixationMonitor,
    classifier: Classifier,
    reward: RewardCalculator,
    probe_rc: ResponseCollector,
    bandit_rc: ResponseCollector,
}

impl<T, R> TrialEngine<T, R>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    pub fn new(config: ExperimentConfig, timer: T, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let refresh = config.refresh()?;
        let window = config.response_window();
        let both = vec![Modality::Keypress, Modality::Vocal];
        let bandit_interrupts = if config.ignore_vocal_for_bandits {
            vec![Modality::Keypress]
        } else {
            both.clone()
        };

        Ok(Self {
            refresh,
            fixation: FixationMonitor::new(config.fixation_radius_px),
            classifier: Classifier::new(config.variant, config.ignore_vocal_for_bandits),
            reward: RewardCalculator::from_config(&config)?,
            probe_rc: ResponseCollector::new(
                window,
                both.clone(),
                both.clone(),
                KeyMap::bandit_response(),
            ),
            bandit_rc: ResponseCollector::new(
                window,
                both,
                bandit_interrupts,
                KeyMap::bandit_response(),
            ),
            config,
            timer,
            rng,
        })
    }

    pub fn setup<G: GazeSampler + ?Sized>(&self, gaze: &mut G) {
        self.fixation.register(gaze);
    }

    /// Draws the trial's cotoa and lays out its events.
    pub fn prepare(&mut self, spec: TrialSpec) -> Result<PreparedTrial, TrialError> {
        let start = self.config.trial_start();
        match spec.trial_type {
            BlockType::Bandit => Ok(PreparedTrial {
                spec,
                timeline: EventTimeline::bandit(start)?,
                cotoa: None,
            }),
            BlockType::Probe => {
                let (lower, upper) = self.config.cotoa_bounds();
                let cotoa = random_interval(&mut self.rng, lower, upper, self.refresh)?;
                let timeline = EventTimeline::probe(
                    start,
                    self.config.cue_duration(),
                    self.config.cueback_duration(),
                    cotoa,
                )?;
                Ok(PreparedTrial {
                    spec,
                    timeline,
                    cotoa: Some(cotoa),
                })
            }
        }
    }

    pub fn run_trial<H: Host>(
        &mut self,
        host: &mut H,
        prepared: PreparedTrial,
        block_num: usize,
        trial_num: usize,
        colours: BlockColours,
        score: &mut ScoreState,
    ) -> Result<TrialOutcome, TrialError> {
        host.drift_correct();
        let PreparedTrial {
            spec,
            timeline,
            cotoa,
        } = prepared;
        debug!(
            block = block_num,
            trial = trial_num,
            target_on_ms = timeline.target_onset().as_secs_f64() * 1e3,
            "trial started"
        );
        let clock = TrialClock::start(self.timer.clone(), timeline);
        let mut ctx = TrialContext::new(block_num, trial_num, spec, clock, cotoa, colours, score);

        let outcome = match spec.trial_type {
            BlockType::Bandit => self.bandit_trial(host, &mut ctx),
            BlockType::Probe => self.probe_trial(host, &mut ctx),
        };
        host.clear();
        let outcome = outcome?;
        ctx.set_state(TrialState::Complete);

        info!(
            block = block_num,
            trial = trial_num,
            block_type = spec.trial_type.as_str(),
            err = %outcome.record.err,
            rt_ms = ?outcome.verdict.rt_ms(),
            "trial complete"
        );
        Ok(outcome)
    }

    /// Clears both collectors and the host's input buffers before the next
    /// trial.
    pub fn clean_up<I: InputCapture + ?Sized>(&mut self, input: &mut I) {
        self.probe_rc.reset();
        self.bandit_rc.reset();
        input.reset();
    }

    fn bandit_trial<H: Host>(
        &mut self,
        host: &mut H,
        ctx: &mut TrialContext<'_, T>,
    ) -> Result<TrialOutcome, TrialError> {
        let star = Shape::FixationStar;
        while ctx.clock.before(EventName::TargetOn)? {
            self.fixation.confirm_fixation(host, ctx)?;
            present_neutral_boxes(host, &star);
            host.flip();
        }

        ctx.targets_shown = true;
        ctx.set_state(TrialState::Response);

        let left = Shape::Bandit {
            colour: ctx.colours.at(&ctx.spec, Location::Left),
        };
        let right = Shape::Bandit {
            colour: ctx.colours.at(&ctx.spec, Location::Right),
        };
        let fixation = &self.fixation;
        let collected = self.bandit_rc.collect(
            host,
            &self.timer,
            |h: &mut H| -> Result<(), TrialError> {
                fixation.confirm_fixation(h, ctx)?;
                present_neutral_boxes(h, &star);
                h.present(&left, Layer::Stimulus, ScreenLocation::LeftBox);
                h.present(&right, Layer::Stimulus, ScreenLocation::RightBox);
                Ok(())
            },
        )?;

        let verdict = self.classifier.classify(&ctx.spec, &collected);
        let mut payout = None;
        let mut learning_probe = None;
        let mut choice = None;
        let mut bandit_rt = None;
        match verdict {
            // A latched fixation break outranks a timeout.
            Verdict::Error(ErrorTag::BanditTimeout) if ctx.error().is_error() => {}
            Verdict::Error(tag) => report_error(host, ctx, tag),
            // ...and voids the choice.
            Verdict::ValidChoice { .. } if ctx.error().is_error() => {}
            Verdict::ValidChoice { choice: chosen, rt_ms } => {
                let settled = self.reward.settle(&mut self.rng, &ctx.spec, chosen);
                let total = ctx.score.add(settled.points());
                debug!(points = settled.points(), total, "bandit payout");

                ctx.set_state(TrialState::Feedback);
                self.feedback(host, &settled)?;

                let thresholds = &self.config.learning_probe_thresholds;
                let value = ctx.spec.value_at(chosen);
                if let Some(threshold) = ctx.score.record_choice(value, thresholds) {
                    learning_probe = Some(learning_probe_query(host, ctx, threshold));
                }
                payout = Some(settled);
                choice = Some(chosen);
                bandit_rt = Some(rt_ms);
            }
            Verdict::Detected { .. } | Verdict::Withheld => {}
        }

        let record = TrialRecord {
            block_num: ctx.block_num,
            trial_num: ctx.trial_num,
            block_type: BlockType::Bandit,
            high_value_col: OrNa::Value(rgb(ctx.colours.high)),
            low_value_col: OrNa::Value(rgb(ctx.colours.low)),
            winning_bandit: OrNa::Value(ctx.spec.winning_bandit),
            bandit_choice: choice.into(),
            bandit_rt: bandit_rt.into(),
            reward: payout.map(|p| p.points()).into(),
            cue_loc: OrNa::Na,
            cotoa: OrNa::Na,
            probe_loc: OrNa::Na,
            probe_col: OrNa::Na,
            go_signal: OrNa::Na,
            probe_rt: OrNa::Na,
            err: ctx.error(),
        };
        Ok(TrialOutcome {
            record,
            verdict,
            payout,
            learning_probe,
        })
    }

    fn probe_trial<H: Host>(
        &mut self,
        host: &mut H,
        ctx: &mut TrialContext<'_, T>,
    ) -> Result<TrialOutcome, TrialError> {
        let spec = ctx.spec;
        while ctx.clock.before(EventName::TargetOn)? {
            self.fixation.confirm_fixation(host, ctx)?;
            present_neutral_boxes(host, &Shape::FixationStar);

            if ctx.clock.between(EventName::CueOn, EventName::CueOff)? {
                ctx.set_state(TrialState::Cue);
                host.present(&Shape::Cue, Layer::Stimulus, spec.cue_location.into());
            } else if ctx.clock.between(EventName::CueOff, EventName::CuebackOff)? {
                ctx.set_state(TrialState::Cueback);
                host.present(&Shape::Cueback, Layer::Stimulus, ScreenLocation::Centre);
            } else {
                ctx.set_state(TrialState::Placeholders);
            }
            host.flip();
        }

        ctx.targets_shown = true;
        ctx.set_state(TrialState::Response);

        let nogo = self.config.variant.uses_go_signal() && spec.go_signal == GoSignal::Nogo;
        let star = if nogo {
            Shape::MutedStar
        } else {
            Shape::FixationStar
        };
        let probe = (!spec.is_catch()).then(|| Shape::Probe {
            colour: probe_colour(&ctx.colours, spec.probe_colour),
        });
        let probe_loc = ScreenLocation::from(spec.probe_location);
        let fixation = &self.fixation;
        let collected = self.probe_rc.collect(
            host,
            &self.timer,
            |h: &mut H| -> Result<(), TrialError> {
                fixation.confirm_fixation(h, ctx)?;
                present_neutral_boxes(h, &star);
                if let Some(probe) = &probe {
                    h.present(probe, Layer::Stimulus, probe_loc);
                }
                Ok(())
            },
        )?;

        let verdict = self.classifier.classify(&spec, &collected);
        if let Verdict::Error(tag) = verdict {
            report_error(host, ctx, tag);
        }
        let probe_rt = if ctx.error().is_error() {
            None
        } else {
            verdict.rt_ms()
        };

        let go_signal = if self.config.variant.uses_go_signal() {
            OrNa::Value(spec.go_signal)
        } else {
            OrNa::Na
        };
        let record = TrialRecord {
            block_num: ctx.block_num,
            trial_num: ctx.trial_num,
            block_type: BlockType::Probe,
            high_value_col: OrNa::Na,
            low_value_col: OrNa::Na,
            winning_bandit: OrNa::Na,
            bandit_choice: OrNa::Na,
            bandit_rt: OrNa::Na,
            reward: OrNa::Na,
            cue_loc: OrNa::Value(spec.cue_location),
            cotoa: ctx.cotoa.map(|d| d.as_secs_f64() * 1e3).into(),
            probe_loc: OrNa::Value(spec.probe_location),
            probe_col: OrNa::Value(spec.probe_colour),
            go_signal,
            probe_rt: probe_rt.into(),
            err: ctx.error(),
        };
        Ok(TrialOutcome {
            record,
            verdict,
            payout: None,
            learning_probe: None,
        })
    }

    /// Shows the payout for the feedback period. Quit requests are still
    /// honoured; no trial input is read.
    fn feedback<H: Host>(&self, host: &mut H, payout: &Payout) -> Result<(), TrialError> {
        let style = match payout {
            Payout::Won(_) => TextStyle::ScoreUp,
            Payout::Lost(_) => TextStyle::ScoreDown,
        };
        let message = Shape::Text {
            content: payout.message(),
            style,
        };
        let start = self.timer.now();
        while self.timer.elapsed(start) < self.config.feedback_duration() {
            if host.quit_requested() {
                return Err(TrialError::QuitRequested);
            }
            host.fill();
            host.present(&message, Layer::Overlay, ScreenLocation::Centre);
            host.flip();
        }
        Ok(())
    }
}

fn report_error<H: Host, T: Timer>(host: &mut H, ctx: &mut TrialContext<'_, T>, tag: ErrorTag) {
    debug!(block = ctx.block_num, trial = ctx.trial_num, err = %tag, "response error");
    ctx.override_error(tag);
    if let Some(key) = tag.message() {
        show_error_message(host, key);
    }
}

fn learning_probe_query<H: Host, T: Timer>(
    host: &mut H,
    ctx: &TrialContext<'_, T>,
    threshold: u32,
) -> LearningProbeRecord {
    let answer = host.ask(LEARNING_PROBE_QUESTION);
    info!(
        block = ctx.block_num,
        trial = ctx.trial_num,
        threshold,
        answer = answer.as_str(),
        "learning probe answered"
    );
    LearningProbeRecord {
        block_num: ctx.block_num,
        trial_num: ctx.trial_num,
        times_selected_high: ctx.score.times_selected_high(),
        threshold,
        answer,
    }
}

fn probe_colour(colours: &BlockColours, probe: ProbeColour) -> Colour {
    match probe {
        ProbeColour::High => colours.high,
        ProbeColour::Low => colours.low,
        ProbeColour::Neutral => WHITE,
        ProbeColour::Catch => GREY,
    }
}

fn rgb(colour: Colour) -> [u8; 3] {
    [colour[0], colour[1], colour[2]]
}
