use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::phase::BlockType;

/// Trial state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialState {
    Placeholders,
    Cue,
    Cueback,
    Response,
    Feedback,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Left,
    Right,
}

impl Location {
    pub fn opposite(&self) -> Self {
        match self {
            Location::Left => Location::Right,
            Location::Right => Location::Left,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Left => "left",
            Location::Right => "right",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Location {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Location::Left),
            "right" => Ok(Location::Right),
            other => Err(format!("unknown location `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeColour {
    High,
    Low,
    Neutral,
    Catch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoSignal {
    #[default]
    Go,
    Nogo,
}

/// Payout class of a bandit: which one wins on a trial, and which baseline
/// a payout is drawn around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueClass {
    High,
    Low,
}

/// Immutable per-trial parameters handed over by the trial source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialSpec {
    pub trial_type: BlockType,
    pub cue_location: Location,
    pub probe_location: Location,
    pub probe_colour: ProbeColour,
    #[serde(default)]
    pub go_signal: GoSignal,
    pub high_value_location: Location,
    pub winning_bandit: ValueClass,
}

impl TrialSpec {
    pub fn bandit(high_value_location: Location, winning_bandit: ValueClass) -> Self {
        Self {
            trial_type: BlockType::Bandit,
            cue_location: Location::Left,
            probe_location: Location::Left,
            probe_colour: ProbeColour::Neutral,
            go_signal: GoSignal::Go,
            high_value_location,
            winning_bandit,
        }
    }

    pub fn probe(
        cue_location: Location,
        probe_location: Location,
        probe_colour: ProbeColour,
    ) -> Self {
        Self {
            trial_type: BlockType::Probe,
            cue_location,
            probe_location,
            probe_colour,
            go_signal: GoSignal::Go,
            high_value_location: Location::Left,
            winning_bandit: ValueClass::High,
        }
    }

    pub fn with_go_signal(mut self, go_signal: GoSignal) -> Self {
        self.go_signal = go_signal;
        self
    }

    pub fn low_value_location(&self) -> Location {
        self.high_value_location.opposite()
    }

    /// Location of the bandit that pays out on this trial.
    pub fn winning_location(&self) -> Location {
        match self.winning_bandit {
            ValueClass::High => self.high_value_location,
            ValueClass::Low => self.low_value_location(),
        }
    }

    pub fn value_at(&self, location: Location) -> ValueClass {
        if location == self.high_value_location {
            ValueClass::High
        } else {
            ValueClass::Low
        }
    }

    pub fn is_catch(&self) -> bool {
        self.probe_colour == ProbeColour::Catch
    }
}
