use ior_core::{BlockType, GoSignal, Location, ProbeColour, TrialSource, TrialSpec, ValueClass};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

const LOCATIONS: [Location; 2] = [Location::Left, Location::Right];
const PROBE_COLOURS: [ProbeColour; 4] = [
    ProbeColour::High,
    ProbeColour::Low,
    ProbeColour::Neutral,
    ProbeColour::Catch,
];
const VALUE_CLASSES: [ValueClass; 2] = [ValueClass::High, ValueClass::Low];

/// Fully crossed trial factors, dealt out in shuffled passes so every block
/// stays as balanced as its length allows.
pub struct FactorialTrialSource {
    rng: StdRng,
    go_signals: Vec<GoSignal>,
}

impl FactorialTrialSource {
    pub fn new(rng: StdRng, with_go_signal: bool) -> Self {
        let go_signals = if with_go_signal {
            vec![GoSignal::Go, GoSignal::Nogo]
        } else {
            vec![GoSignal::Go]
        };
        Self { rng, go_signals }
    }

    fn crossing(&self, block_type: BlockType) -> Vec<TrialSpec> {
        let mut specs = Vec::new();
        for &high_value_location in &LOCATIONS {
            for &winning_bandit in &VALUE_CLASSES {
                if block_type == BlockType::Bandit {
                    specs.push(TrialSpec::bandit(high_value_location, winning_bandit));
                    continue;
                }
                for &cue in &LOCATIONS {
                    for &probe in &LOCATIONS {
                        for &colour in &PROBE_COLOURS {
                            for &go in &self.go_signals {
                                specs.push(TrialSpec {
                                    high_value_location,
                                    winning_bandit,
                                    ..TrialSpec::probe(cue, probe, colour).with_go_signal(go)
                                });
                            }
                        }
                    }
                }
            }
        }
        specs
    }
}

impl TrialSource for FactorialTrialSource {
    fn block_trials(&mut self, block_type: BlockType, count: usize) -> Vec<TrialSpec> {
        let crossing = self.crossing(block_type);
        let mut trials = Vec::with_capacity(count);
        while trials.len() < count {
            let mut pass = crossing.clone();
            pass.shuffle(&mut self.rng);
            trials.extend(pass.into_iter().take(count - trials.len()));
        }
        trials
    }
}
