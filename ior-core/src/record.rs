use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::outcome::ErrorTag;
use crate::phase::BlockType;
use crate::trial::{GoSignal, Location, ProbeColour, ValueClass};

const NA: &str = "NA";

/// A record field that is either a value or the literal `"NA"`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum OrNa<T> {
    Value(T),
    #[default]
    Na,
}

impl<T> OrNa<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            OrNa::Value(v) => Some(v),
            OrNa::Na => None,
        }
    }
}

impl<T> From<Option<T>> for OrNa<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(OrNa::Na, OrNa::Value)
    }
}

impl<T: Serialize> Serialize for OrNa<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OrNa::Value(v) => v.serialize(serializer),
            OrNa::Na => serializer.serialize_str(NA),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for OrNa<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw<T> {
            Value(T),
            Text(String),
        }

        match Raw::<T>::deserialize(deserializer)? {
            Raw::Value(v) => Ok(OrNa::Value(v)),
            Raw::Text(s) if s == NA => Ok(OrNa::Na),
            Raw::Text(s) => Err(de::Error::custom(format!(
                "expected a value or \"NA\", got `{s}`"
            ))),
        }
    }
}

/// Flat per-trial result row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub block_num: usize,
    pub trial_num: usize,
    pub block_type: BlockType,
    pub high_value_col: OrNa<[u8; 3]>,
    pub low_value_col: OrNa<[u8; 3]>,
    pub winning_bandit: OrNa<ValueClass>,
    pub bandit_choice: OrNa<Location>,
    pub bandit_rt: OrNa<f64>,
    pub reward: OrNa<i64>,
    pub cue_loc: OrNa<Location>,
    pub cotoa: OrNa<f64>,
    pub probe_loc: OrNa<Location>,
    pub probe_col: OrNa<ProbeColour>,
    pub go_signal: OrNa<GoSignal>,
    pub probe_rt: OrNa<f64>,
    pub err: ErrorTag,
}

/// Answer to a learning probe fired when the high-value bandit had been
/// chosen `threshold` times in a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningProbeRecord {
    pub block_num: usize,
    pub trial_num: usize,
    pub times_selected_high: u32,
    pub threshold: u32,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Trial(TrialRecord),
    LearningProbe(LearningProbeRecord),
}

impl Record {
    pub fn destination(&self) -> &'static str {
        match self {
            Record::Trial(_) => "trials",
            Record::LearningProbe(_) => "learning_probes",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bandit_row() -> TrialRecord {
        TrialRecord {
            block_num: 1,
            trial_num: 3,
            block_type: BlockType::Bandit,
            high_value_col: OrNa::Value([10, 20, 30]),
            low_value_col: OrNa::Value([30, 20, 10]),
            winning_bandit: OrNa::Value(ValueClass::High),
            bandit_choice: OrNa::Value(Location::Left),
            bandit_rt: OrNa::Value(400.0),
            reward: OrNa::Value(13),
            cue_loc: OrNa::Na,
            cotoa: OrNa::Na,
            probe_loc: OrNa::Na,
            probe_col: OrNa::Na,
            go_signal: OrNa::Na,
            probe_rt: OrNa::Na,
            err: ErrorTag::Na,
        }
    }

    #[test]
    fn inapplicable_fields_are_written_as_na() {
        let json = serde_json::to_value(bandit_row()).unwrap();
        assert_eq!(json["bandit_choice"], "left");
        assert_eq!(json["reward"], 13);
        assert_eq!(json["cue_loc"], "NA");
        assert_eq!(json["probe_rt"], "NA");
        assert_eq!(json["err"], "NA");
    }

    #[test]
    fn rows_read_back_from_json() {
        let row = bandit_row();
        let text = serde_json::to_string(&row).unwrap();
        let back: TrialRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(back, row);
        assert!(serde_json::from_str::<OrNa<f64>>("\"n/a\"").is_err());
    }

    #[test]
    fn records_know_their_destination() {
        assert_eq!(Record::Trial(bandit_row()).destination(), "trials");
    }
}
