#![allow(dead_code)]

use std::time::Duration;

use ior_core::{
    BlockType, Boundary, Colour, Display, GazeSampler, HostError, InputCapture, Layer, Modality,
    RawResponse, Record, ResultStore, ScreenLocation, Shape, TrialSource, TrialSpec,
};
use ior_experiment::{ExperimentConfig, TrialEngine};
use ior_timing::{SimulatedTimer, Timer};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

/// How the scripted participant reacts once a target appears.
#[derive(Debug, Clone, Default)]
pub struct Reaction {
    pub bandit_key: Option<&'static str>,
    pub bandit_vocal: bool,
    pub probe: Option<Modality>,
    pub delay: Duration,
}

/// Headless host whose clock moves one frame per flip.
pub struct ScriptedHost {
    pub timer: SimulatedTimer,
    pub frame: Duration,
    pub reaction: Reaction,
    /// Absolute `[start, end)` windows during which gaze is off fixation.
    pub gaze_out: Vec<(Duration, Duration)>,
    /// Responses delivered once the clock passes their timestamp, whether or
    /// not anything is on screen.
    pub scheduled: Vec<RawResponse>,
    pub stream_fault: bool,
    pub quit_on_feedback: bool,
    pub muted_frames: usize,
    pub boundaries: Vec<Boundary>,
    pub texts: Vec<String>,
    pub acknowledgements: usize,
    pub questions: usize,
    pub flips: usize,
    pub drift_corrections: usize,
    target_onset: Option<(Duration, BlockType)>,
    responded: bool,
}

impl ScriptedHost {
    pub fn new(timer: SimulatedTimer, reaction: Reaction) -> Self {
        Self {
            timer,
            frame: ms(10),
            reaction,
            gaze_out: Vec::new(),
            scheduled: Vec::new(),
            stream_fault: false,
            quit_on_feedback: false,
            muted_frames: 0,
            boundaries: Vec::new(),
            texts: Vec::new(),
            acknowledgements: 0,
            questions: 0,
            flips: 0,
            drift_corrections: 0,
            target_onset: None,
            responded: false,
        }
    }

    fn now(&self) -> Duration {
        Duration::from_nanos(self.timer.now())
    }

    pub fn texts_containing(&self, needle: &str) -> usize {
        self.texts.iter().filter(|t| t.contains(needle)).count()
    }
}

impl Display for ScriptedHost {
    fn fill(&mut self) {}

    fn present(&mut self, shape: &Shape, _layer: Layer, _location: ScreenLocation) {
        match shape {
            Shape::Bandit { .. } if self.target_onset.is_none() => {
                self.target_onset = Some((self.now(), BlockType::Bandit));
            }
            Shape::Probe { .. } if self.target_onset.is_none() => {
                self.target_onset = Some((self.now(), BlockType::Probe));
            }
            Shape::MutedStar => self.muted_frames += 1,
            Shape::Text { content, .. } => self.texts.push(content.clone()),
            _ => {}
        }
    }

    fn flip(&mut self) {
        self.flips += 1;
        self.timer.advance(self.frame);
    }

    fn clear(&mut self) {
        self.target_onset = None;
        self.responded = false;
    }

    fn constant_luminance(&self, angle_deg: u16) -> Colour {
        [(angle_deg % 256) as u8, 120, 120, 255]
    }
}

impl GazeSampler for ScriptedHost {
    fn add_boundary(&mut self, boundary: Boundary) {
        self.boundaries.push(boundary);
    }

    fn within_boundary(&mut self, _name: &str) -> bool {
        let now = self.now();
        !self.gaze_out.iter().any(|(s, e)| *s <= now && now < *e)
    }

    fn drift_correct(&mut self) {
        self.drift_corrections += 1;
    }
}

impl InputCapture for ScriptedHost {
    fn poll(&mut self, modalities: &[Modality]) -> Vec<RawResponse> {
        let now = self.now().as_nanos() as u64;
        let (mut out, later): (Vec<_>, Vec<_>) = self
            .scheduled
            .drain(..)
            .partition(|r| r.timestamp_ns <= now);
        self.scheduled = later;

        if let Some((onset, kind)) = self.target_onset {
            let due = onset + self.reaction.delay;
            if !self.responded && self.now() >= due {
                self.responded = true;
                let at = due.as_nanos() as u64;
                match kind {
                    BlockType::Bandit => {
                        if let Some(key) = self.reaction.bandit_key {
                            out.push(RawResponse::key(key, at));
                        }
                        if self.reaction.bandit_vocal {
                            out.push(RawResponse::voice(at));
                        }
                    }
                    BlockType::Probe => match self.reaction.probe {
                        Some(Modality::Vocal) => out.push(RawResponse::voice(at)),
                        Some(Modality::Keypress) => out.push(RawResponse::key("z", at)),
                        None => {}
                    },
                }
            }
        }
        out.retain(|r| modalities.contains(&r.modality));
        out
    }

    fn reset(&mut self) {}

    fn stream_fault(&self) -> bool {
        self.stream_fault
    }

    fn acknowledge(&mut self) {
        self.acknowledgements += 1;
    }

    fn quit_requested(&mut self) -> bool {
        self.quit_on_feedback
    }

    fn calibrate_audio(&mut self) -> f64 {
        0.5
    }

    fn ask(&mut self, _question: &str) -> String {
        self.questions += 1;
        "left".to_string()
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    pub records: Vec<Record>,
}

impl ResultStore for MemoryStore {
    fn insert(&mut self, record: Record) -> Result<(), HostError> {
        self.records.push(record);
        Ok(())
    }
}

impl MemoryStore {
    pub fn trials(&self) -> Vec<&ior_core::TrialRecord> {
        self.records
            .iter()
            .filter_map(|r| match r {
                Record::Trial(t) => Some(t),
                Record::LearningProbe(_) => None,
            })
            .collect()
    }
}

/// Hands out the same specs for every block of a type.
pub struct FixedSource {
    pub bandit: Vec<TrialSpec>,
    pub probe: Vec<TrialSpec>,
}

impl TrialSource for FixedSource {
    fn block_trials(&mut self, block_type: BlockType, count: usize) -> Vec<TrialSpec> {
        let specs = match block_type {
            BlockType::Bandit => &self.bandit,
            BlockType::Probe => &self.probe,
        };
        specs.iter().cycle().take(count).copied().collect()
    }
}

/// 100 Hz keeps every frame a whole 10 ms.
pub fn test_config() -> ExperimentConfig {
    ExperimentConfig {
        refresh_rate_hz: 100.0,
        ..Default::default()
    }
}

pub fn engine(
    config: ExperimentConfig,
    timer: &SimulatedTimer,
) -> TrialEngine<SimulatedTimer, StdRng> {
    TrialEngine::new(config, timer.clone(), StdRng::seed_from_u64(11)).unwrap()
}
