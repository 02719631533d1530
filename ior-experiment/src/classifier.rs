use ior_core::{BlockType, ErrorTag, GoSignal, Location, Modality, ResponseOutcome, TrialSpec};

use crate::config::TrialTypeConfig;

/// What a response window amounted to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    ValidChoice { choice: Location, rt_ms: f64 },
    Detected { rt_ms: f64 },
    /// Nothing was said or pressed, and nothing should have been.
    Withheld,
    Error(ErrorTag),
}

impl Verdict {
    pub fn error_tag(&self) -> ErrorTag {
        match self {
            Verdict::Error(tag) => *tag,
            _ => ErrorTag::Na,
        }
    }

    pub fn rt_ms(&self) -> Option<f64> {
        match self {
            Verdict::ValidChoice { rt_ms, .. } | Verdict::Detected { rt_ms } => Some(*rt_ms),
            Verdict::Withheld | Verdict::Error(_) => None,
        }
    }
}

/// Maps a response window to a verdict. Wrong-modality responses are checked
/// before missing ones, since both can be present at once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classifier {
    pub variant: TrialTypeConfig,
    pub ignore_vocal_for_bandits: bool,
}

impl Classifier {
    pub fn new(variant: TrialTypeConfig, ignore_vocal_for_bandits: bool) -> Self {
        Self {
            variant,
            ignore_vocal_for_bandits,
        }
    }

    pub fn classify(&self, spec: &TrialSpec, outcome: &ResponseOutcome) -> Verdict {
        match spec.trial_type {
            BlockType::Bandit => self.bandit(outcome),
            BlockType::Probe => self.probe(spec, outcome),
        }
    }

    fn bandit(&self, outcome: &ResponseOutcome) -> Verdict {
        if !self.ignore_vocal_for_bandits && outcome.has(Modality::Vocal) {
            return Verdict::Error(self.wrong_modality(BlockType::Bandit));
        }
        match outcome
            .responses(Modality::Keypress)
            .iter()
            .find_map(|r| r.value.map(|choice| (choice, r.rt_ms)))
        {
            Some((choice, rt_ms)) => Verdict::ValidChoice { choice, rt_ms },
            None => Verdict::Error(ErrorTag::BanditTimeout),
        }
    }

    fn probe(&self, spec: &TrialSpec, outcome: &ResponseOutcome) -> Verdict {
        let nogo = self.variant.uses_go_signal() && spec.go_signal == GoSignal::Nogo;
        if spec.is_catch() || nogo {
            return if outcome.is_empty() {
                Verdict::Withheld
            } else if spec.is_catch() {
                Verdict::Error(ErrorTag::ResponseOnCatch)
            } else {
                Verdict::Error(ErrorTag::ResponseOnNogo)
            };
        }

        let accepted = self.variant.probe_modality();
        let wrong = match accepted {
            Modality::Vocal => Modality::Keypress,
            Modality::Keypress => Modality::Vocal,
        };
        if outcome.has(wrong) {
            return Verdict::Error(self.wrong_modality(BlockType::Probe));
        }
        match outcome.first(accepted) {
            Some(response) => Verdict::Detected {
                rt_ms: response.rt_ms,
            },
            None if accepted == Modality::Vocal && outcome.stream_fault => {
                Verdict::Error(ErrorTag::MicrophoneError)
            }
            None => Verdict::Error(ErrorTag::ProbeTimeout),
        }
    }

    fn wrong_modality(&self, block_type: BlockType) -> ErrorTag {
        match (self.variant, block_type) {
            (TrialTypeConfig::Audio, BlockType::Bandit) => ErrorTag::VocalOnBandit,
            (TrialTypeConfig::Audio, BlockType::Probe) => ErrorTag::KeypressOnProbe,
            _ => ErrorTag::WrongResponse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ior_core::{ProbeColour, Response, ValueClass};

    fn outcome(responses: &[(Modality, Option<Location>, f64)]) -> ResponseOutcome {
        let mut outcome = ResponseOutcome::default();
        for &(modality, value, rt_ms) in responses {
            outcome.push(Response {
                modality,
                value,
                rt_ms,
            });
        }
        outcome
    }

    fn go_probe() -> TrialSpec {
        TrialSpec::probe(Location::Left, Location::Right, ProbeColour::High)
    }

    #[test]
    fn bandit_keypress_is_a_choice() {
        let c = Classifier::new(TrialTypeConfig::Audio, false);
        let spec = TrialSpec::bandit(Location::Left, ValueClass::High);
        let verdict = c.classify(
            &spec,
            &outcome(&[(Modality::Keypress, Some(Location::Right), 400.0)]),
        );
        assert_eq!(
            verdict,
            Verdict::ValidChoice {
                choice: Location::Right,
                rt_ms: 400.0
            }
        );
        assert_eq!(verdict.error_tag(), ErrorTag::Na);
    }

    #[test]
    fn vocal_on_bandit_beats_keypress_and_timeout() {
        let spec = TrialSpec::bandit(Location::Left, ValueClass::High);
        let both = outcome(&[
            (Modality::Keypress, Some(Location::Left), 500.0),
            (Modality::Vocal, None, 300.0),
        ]);
        let audio = Classifier::new(TrialTypeConfig::Audio, false);
        assert_eq!(audio.classify(&spec, &both), Verdict::Error(ErrorTag::VocalOnBandit));

        let keypress = Classifier::new(TrialTypeConfig::Keypress, false);
        assert_eq!(
            keypress.classify(&spec, &both),
            Verdict::Error(ErrorTag::WrongResponse)
        );

        let ignoring = Classifier::new(TrialTypeConfig::Audio, true);
        assert_eq!(ignoring.classify(&spec, &both).rt_ms(), Some(500.0));
    }

    #[test]
    fn silent_bandit_times_out() {
        let c = Classifier::new(TrialTypeConfig::Audio, false);
        let spec = TrialSpec::bandit(Location::Right, ValueClass::Low);
        assert_eq!(
            c.classify(&spec, &ResponseOutcome::default()),
            Verdict::Error(ErrorTag::BanditTimeout)
        );
    }

    #[test]
    fn audio_probe_outcomes() {
        let c = Classifier::new(TrialTypeConfig::Audio, false);
        let spec = go_probe();
        assert_eq!(
            c.classify(&spec, &outcome(&[(Modality::Vocal, None, 350.0)])),
            Verdict::Detected { rt_ms: 350.0 }
        );
        assert_eq!(
            c.classify(&spec, &outcome(&[(Modality::Keypress, Some(Location::Left), 350.0)])),
            Verdict::Error(ErrorTag::KeypressOnProbe)
        );
        assert_eq!(
            c.classify(&spec, &ResponseOutcome::default()),
            Verdict::Error(ErrorTag::ProbeTimeout)
        );
        let faulted = ResponseOutcome {
            stream_fault: true,
            ..Default::default()
        };
        assert_eq!(
            c.classify(&spec, &faulted),
            Verdict::Error(ErrorTag::MicrophoneError)
        );
    }

    #[test]
    fn keypress_probe_rejects_voice() {
        let c = Classifier::new(TrialTypeConfig::GoNoGo, false);
        let verdict = c.classify(&go_probe(), &outcome(&[(Modality::Vocal, None, 280.0)]));
        assert_eq!(verdict, Verdict::Error(ErrorTag::WrongResponse));
        assert_eq!(verdict.rt_ms(), None);

        let faulted = ResponseOutcome {
            stream_fault: true,
            ..Default::default()
        };
        assert_eq!(
            c.classify(&go_probe(), &faulted),
            Verdict::Error(ErrorTag::ProbeTimeout)
        );
    }

    #[test]
    fn catch_and_nogo_expect_silence() {
        let c = Classifier::new(TrialTypeConfig::GoNoGo, false);
        let catch = TrialSpec::probe(Location::Left, Location::Left, ProbeColour::Catch);
        let nogo = go_probe().with_go_signal(GoSignal::Nogo);
        let any = outcome(&[(Modality::Keypress, Some(Location::Left), 410.0)]);

        assert_eq!(c.classify(&catch, &any), Verdict::Error(ErrorTag::ResponseOnCatch));
        assert_eq!(c.classify(&nogo, &any), Verdict::Error(ErrorTag::ResponseOnNogo));
        assert_eq!(c.classify(&catch, &ResponseOutcome::default()), Verdict::Withheld);
        assert_eq!(c.classify(&nogo, &ResponseOutcome::default()), Verdict::Withheld);

        // No-go only matters in the go/no-go version.
        let audio = Classifier::new(TrialTypeConfig::Audio, false);
        assert_eq!(
            audio.classify(&nogo, &outcome(&[(Modality::Vocal, None, 300.0)])),
            Verdict::Detected { rt_ms: 300.0 }
        );
    }

    #[test]
    fn classification_is_deterministic() {
        let c = Classifier::new(TrialTypeConfig::Audio, false);
        let spec = go_probe();
        let collected = outcome(&[
            (Modality::Vocal, None, 512.5),
            (Modality::Keypress, Some(Location::Left), 600.0),
        ]);
        let first = c.classify(&spec, &collected);
        for _ in 0..10 {
            assert_eq!(c.classify(&spec, &collected), first);
        }
    }
}
