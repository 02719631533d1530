use std::collections::BTreeSet;

use ior_core::{Location, TrialSpec, ValueClass};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::config::{ConfigError, ExperimentConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payout {
    Won(i64),
    Lost(i64),
}

impl Payout {
    pub fn points(&self) -> i64 {
        match self {
            Payout::Won(p) | Payout::Lost(p) => *p,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Payout::Won(p) => format!("You won {p} points!"),
            Payout::Lost(p) => format!("You lost {} points!", p.abs()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RewardCalculator {
    high: Normal<f64>,
    low: Normal<f64>,
    pub penalty: i64,
}

impl RewardCalculator {
    pub fn new(
        high_baseline: f64,
        low_baseline: f64,
        sd: f64,
        penalty: i64,
    ) -> Result<Self, ConfigError> {
        let normal = |mean| Normal::new(mean, sd).map_err(|_| ConfigError::PayoutSpread(sd));
        Ok(Self {
            high: normal(high_baseline)?,
            low: normal(low_baseline)?,
            penalty,
        })
    }

    pub fn from_config(config: &ExperimentConfig) -> Result<Self, ConfigError> {
        Self::new(
            config.high_payout_baseline,
            config.low_payout_baseline,
            config.payout_sd,
            config.penalty,
        )
    }

    /// Normal draw around the class baseline, rounded half up.
    pub fn bandit_payout<R: Rng + ?Sized>(&self, rng: &mut R, class: ValueClass) -> i64 {
        let dist = match class {
            ValueClass::High => &self.high,
            ValueClass::Low => &self.low,
        };
        (dist.sample(rng) + 0.5).floor() as i64
    }

    /// Pays the winning bandit's draw if it was chosen, the penalty otherwise.
    pub fn settle<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        spec: &TrialSpec,
        choice: Location,
    ) -> Payout {
        if choice == spec.winning_location() {
            Payout::Won(self.bandit_payout(rng, spec.winning_bandit))
        } else {
            Payout::Lost(self.penalty)
        }
    }
}

/// Block-scoped bandit bookkeeping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreState {
    total: i64,
    times_selected_high: u32,
    fired_thresholds: BTreeSet<u32>,
}

impl ScoreState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn add(&mut self, points: i64) -> i64 {
        self.total += points;
        self.total
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn times_selected_high(&self) -> u32 {
        self.times_selected_high
    }

    /// Counts a choice and returns the threshold it crossed, if one is due.
    /// Each threshold fires at most once per block.
    pub fn record_choice(&mut self, chosen: ValueClass, thresholds: &[u32]) -> Option<u32> {
        if chosen != ValueClass::High {
            return None;
        }
        self.times_selected_high += 1;
        let count = self.times_selected_high;
        (thresholds.contains(&count) && self.fired_thresholds.insert(count)).then_some(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn calculator() -> RewardCalculator {
        RewardCalculator::from_config(&ExperimentConfig::default()).unwrap()
    }

    #[test]
    fn high_payouts_centre_on_baseline() {
        let calc = calculator();
        let mut rng = StdRng::seed_from_u64(42);
        let draws: Vec<i64> = (0..20_000)
            .map(|_| calc.bandit_payout(&mut rng, ValueClass::High))
            .collect();
        let mean = draws.iter().sum::<i64>() as f64 / draws.len() as f64;
        assert!((mean - 12.0).abs() < 0.05, "mean {mean}");
        let within_two = draws.iter().filter(|p| (**p - 12).abs() <= 2).count();
        assert!(within_two as f64 / draws.len() as f64 > 0.9);
        assert!(draws.iter().all(|p| (6..=18).contains(p)));
    }

    #[test]
    fn low_payouts_centre_on_low_baseline() {
        let calc = calculator();
        let mut rng = StdRng::seed_from_u64(9);
        let mean = (0..10_000)
            .map(|_| calc.bandit_payout(&mut rng, ValueClass::Low) as f64)
            .sum::<f64>()
            / 10_000.0;
        assert!((mean - 8.0).abs() < 0.1, "mean {mean}");
    }

    #[test]
    fn losing_choice_costs_the_penalty() {
        let calc = calculator();
        let mut rng = StdRng::seed_from_u64(1);
        let spec = TrialSpec::bandit(Location::Left, ValueClass::Low);
        assert_eq!(calc.settle(&mut rng, &spec, Location::Left), Payout::Lost(-5));
        assert!(matches!(
            calc.settle(&mut rng, &spec, Location::Right),
            Payout::Won(_)
        ));
        assert_eq!(Payout::Lost(-5).message(), "You lost 5 points!");
        assert_eq!(Payout::Won(13).message(), "You won 13 points!");
    }

    #[test]
    fn score_accumulates_signed_payouts() {
        let mut score = ScoreState::default();
        score.add(Payout::Won(13).points());
        assert_eq!(score.add(Payout::Lost(-5).points()), 8);
        score.reset();
        assert_eq!(score.total(), 0);
    }

    #[test]
    fn learning_thresholds_fire_once() {
        let thresholds = [5, 10, 15];
        let mut score = ScoreState::default();
        let fired: Vec<u32> = (0..16)
            .filter_map(|_| score.record_choice(ValueClass::High, &thresholds))
            .collect();
        assert_eq!(fired, vec![5, 10, 15]);
        assert_eq!(score.record_choice(ValueClass::Low, &thresholds), None);
        assert_eq!(score.times_selected_high(), 16);
    }

    #[test]
    fn bad_spread_is_a_config_error() {
        assert!(matches!(
            RewardCalculator::new(12.0, 8.0, f64::NAN, -5),
            Err(ConfigError::PayoutSpread(_))
        ));
    }
}
