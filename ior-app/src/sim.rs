use std::collections::HashMap;
use std::time::Duration;

use ior_core::{
    Boundary, Colour, Display, GazeSampler, InputCapture, Layer, Location, Modality, RawResponse,
    ScreenLocation, Shape,
};
use ior_timing::Timer;
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::{debug, trace};

/// Behavioural knobs of the simulated participant.
#[derive(Debug, Clone)]
pub struct Participant {
    pub rt_mean_ms: f64,
    pub rt_sd_ms: f64,
    /// Chance per trial that gaze briefly leaves fixation.
    pub break_rate: f64,
    /// Chance of not answering a target at all.
    pub lapse_rate: f64,
    /// Chance of answering with the wrong modality.
    pub slip_rate: f64,
    /// Chance per trial of an anticipatory response before any target.
    pub false_alarm_rate: f64,
    /// Chance of picking a bandit at random instead of the best-known colour.
    pub explore_rate: f64,
    /// Modality the probe task asks for.
    pub probe_modality: Modality,
}

impl Default for Participant {
    fn default() -> Self {
        Self {
            rt_mean_ms: 420.0,
            rt_sd_ms: 80.0,
            break_rate: 0.03,
            lapse_rate: 0.02,
            slip_rate: 0.02,
            false_alarm_rate: 0.02,
            explore_rate: 0.2,
            probe_modality: Modality::Vocal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Target {
    Bandits { left: Colour, right: Colour },
    Probe,
    Nogo,
}

/// What the participant is doing within the current trial.
#[derive(Debug, Default)]
struct TrialPlan {
    gaze_break: Option<(u64, u64)>,
    anticipation_at: Option<u64>,
    target: Option<(u64, Target)>,
    pending: Vec<(u64, Modality, Option<&'static str>)>,
    chosen: Option<Colour>,
}

/// Headless host: frames are paced by the timer, gaze and responses come from
/// a simulated participant.
pub struct SimulatedHost<T: Timer<Timestamp = u64>> {
    timer: T,
    frame: Duration,
    rng: StdRng,
    rt: Normal<f64>,
    participant: Participant,
    boundaries: Vec<Boundary>,
    plan: TrialPlan,
    /// Running mean payout per bandit colour.
    values: HashMap<Colour, (f64, u32)>,
    last_pair: Option<(Colour, Colour)>,
    pub frames: u64,
    pub messages: usize,
}

const KEY_LEFT: &str = "z";
const KEY_RIGHT: &str = "/";
const MIN_RT_MS: f64 = 120.0;

impl<T: Timer<Timestamp = u64>> SimulatedHost<T> {
    pub fn new(
        timer: T,
        frame: Duration,
        participant: Participant,
        rng: StdRng,
    ) -> anyhow::Result<Self> {
        let rt = Normal::new(participant.rt_mean_ms, participant.rt_sd_ms)?;
        Ok(Self {
            timer,
            frame,
            rng,
            rt,
            participant,
            boundaries: Vec::new(),
            plan: TrialPlan::default(),
            values: HashMap::new(),
            last_pair: None,
            frames: 0,
            messages: 0,
        })
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    fn draw_rt(&mut self) -> u64 {
        let ms = self.rt.sample(&mut self.rng).max(MIN_RT_MS);
        (ms * 1e6) as u64
    }

    fn chance(&mut self, p: f64) -> bool {
        p > 0.0 && self.rng.random_bool(p.min(1.0))
    }

    fn expected(&self, colour: Colour) -> f64 {
        // Untried colours look promising.
        self.values.get(&colour).map_or(15.0, |(mean, _)| *mean)
    }

    fn pick_bandit(&mut self, left: Colour, right: Colour) -> Location {
        if self.chance(self.participant.explore_rate) {
            return if self.rng.random_bool(0.5) {
                Location::Left
            } else {
                Location::Right
            };
        }
        if self.expected(right) > self.expected(left) {
            Location::Right
        } else {
            Location::Left
        }
    }

    /// Plans the answer to a target the first time it is seen.
    fn react(&mut self, onset: u64, target: Target) {
        if target == Target::Nogo || self.chance(self.participant.lapse_rate) {
            return;
        }
        let at = onset + self.draw_rt();
        let slip = self.chance(self.participant.slip_rate);
        match target {
            Target::Bandits { left, right } => {
                if slip {
                    self.plan.pending.push((at, Modality::Vocal, None));
                    return;
                }
                let choice = self.pick_bandit(left, right);
                let (key, colour) = match choice {
                    Location::Left => (KEY_LEFT, left),
                    Location::Right => (KEY_RIGHT, right),
                };
                self.plan.chosen = Some(colour);
                self.plan.pending.push((at, Modality::Keypress, Some(key)));
            }
            Target::Probe => {
                let modality = match (self.participant.probe_modality, slip) {
                    (m, false) => m,
                    (Modality::Vocal, true) => Modality::Keypress,
                    (Modality::Keypress, true) => Modality::Vocal,
                };
                let key = (modality == Modality::Keypress).then_some(KEY_LEFT);
                self.plan.pending.push((at, modality, key));
            }
            Target::Nogo => {}
        }
    }

    fn learn(&mut self, feedback: &str) {
        let Some(colour) = self.plan.chosen.take() else {
            return;
        };
        let points = feedback
            .split_whitespace()
            .find_map(|w| w.parse::<f64>().ok())
            .map(|p| if feedback.starts_with("You lost") { -p } else { p });
        if let Some(points) = points {
            let entry = self.values.entry(colour).or_insert((0.0, 0));
            entry.1 += 1;
            entry.0 += (points - entry.0) / entry.1 as f64;
            trace!(?colour, points, mean = entry.0, "participant updated value");
        }
    }

    fn see(&mut self, target: Target) {
        if self.plan.target.is_some() {
            return;
        }
        let now = self.timer.now();
        self.plan.target = Some((now, target));
        self.react(now, target);
    }
}

impl<T: Timer<Timestamp = u64>> Display for SimulatedHost<T> {
    fn fill(&mut self) {}

    fn present(&mut self, shape: &Shape, _layer: Layer, location: ScreenLocation) {
        match shape {
            Shape::Bandit { colour } => {
                // Both bandits are presented in the same frame; react once the
                // right one is known.
                match (location, self.last_pair) {
                    (ScreenLocation::LeftBox, _) => self.last_pair = Some((*colour, *colour)),
                    (ScreenLocation::RightBox, Some((left, _))) => {
                        self.last_pair = Some((left, *colour));
                        self.see(Target::Bandits {
                            left,
                            right: *colour,
                        });
                    }
                    _ => {}
                }
            }
            Shape::Probe { .. } => self.see(Target::Probe),
            Shape::MutedStar => self.see(Target::Nogo),
            Shape::Text { content, .. } if content.starts_with("You ") => self.learn(content),
            _ => {}
        }
    }

    fn flip(&mut self) {
        let before = self.timer.now();
        self.timer.sleep(self.frame);
        let took = self.timer.elapsed(before);
        self.timer.record_frame(took);
        self.frames += 1;
    }

    fn clear(&mut self) {
        self.plan.gaze_break = None;
        self.plan.anticipation_at = None;
        self.plan.target = None;
    }

    fn constant_luminance(&self, angle_deg: u16) -> Colour {
        hue_to_rgb(f64::from(angle_deg % 360))
    }
}

impl<T: Timer<Timestamp = u64>> GazeSampler for SimulatedHost<T> {
    fn add_boundary(&mut self, boundary: Boundary) {
        debug!(name = boundary.name.as_str(), radius_px = boundary.radius_px, "boundary added");
        self.boundaries.push(boundary);
    }

    fn within_boundary(&mut self, name: &str) -> bool {
        if !self.boundaries.iter().any(|b| b.name == name) {
            return true;
        }
        let now = self.timer.now();
        !matches!(self.plan.gaze_break, Some((start, end)) if start <= now && now < end)
    }

    /// Called before every trial; the participant settles on what will go
    /// wrong this time.
    fn drift_correct(&mut self) {
        let now = self.timer.now();
        self.plan = TrialPlan::default();
        if self.chance(self.participant.break_rate) {
            let start = now + self.rng.random_range(300..3000) * 1_000_000;
            self.plan.gaze_break = Some((start, start + 80_000_000));
        }
        if self.chance(self.participant.false_alarm_rate) {
            self.plan.anticipation_at = Some(now + self.rng.random_range(1500..3000) * 1_000_000);
        }
    }
}

impl<T: Timer<Timestamp = u64>> InputCapture for SimulatedHost<T> {
    fn poll(&mut self, modalities: &[Modality]) -> Vec<RawResponse> {
        let now = self.timer.now();
        let mut out = Vec::new();
        if let Some(at) = self.plan.anticipation_at {
            if at <= now {
                self.plan.anticipation_at = None;
                out.push(RawResponse::voice(now));
            }
        }
        let (due, later): (Vec<_>, Vec<_>) =
            self.plan.pending.drain(..).partition(|(at, ..)| *at <= now);
        self.plan.pending = later;
        for (at, modality, key) in due {
            out.push(match (modality, key) {
                (Modality::Keypress, Some(key)) => RawResponse::key(key, at),
                _ => RawResponse::voice(at),
            });
        }
        out.retain(|r| modalities.contains(&r.modality));
        out
    }

    fn reset(&mut self) {
        self.plan.pending.clear();
    }

    fn stream_fault(&self) -> bool {
        false
    }

    fn acknowledge(&mut self) {
        self.messages += 1;
    }

    fn quit_requested(&mut self) -> bool {
        false
    }

    fn calibrate_audio(&mut self) -> f64 {
        self.rng.random_range(0.05..0.2)
    }

    fn ask(&mut self, _question: &str) -> String {
        let Some((left, right)) = self.last_pair else {
            return "unsure".to_string();
        };
        if self.expected(right) > self.expected(left) {
            Location::Right.to_string()
        } else {
            Location::Left.to_string()
        }
    }
}

/// Hue at a fixed saturation and brightness.
fn hue_to_rgb(hue: f64) -> Colour {
    let (s, v) = (0.6, 0.85);
    let c = v * s;
    let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match (hue / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let byte = |v: f64| ((v + m) * 255.0).round() as u8;
    [byte(r), byte(g), byte(b), 255]
}
