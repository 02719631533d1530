use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use ior_core::{
    BlockType, ErrorTag, HostError, LearningProbeRecord, OrNa, Record, ResultStore, TrialRecord,
};
use ior_experiment::ExperimentConfig;
use serde::Serialize;

/// Keeps every record in memory until the session ends.
#[derive(Debug, Default, Serialize)]
pub struct MemoryStore {
    pub trials: Vec<TrialRecord>,
    pub learning_probes: Vec<LearningProbeRecord>,
}

impl ResultStore for MemoryStore {
    fn insert(&mut self, record: Record) -> Result<(), HostError> {
        match record {
            Record::Trial(trial) => self.trials.push(trial),
            Record::LearningProbe(probe) => self.learning_probes.push(probe),
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct Export<'a> {
    seed: Option<u64>,
    config: &'a ExperimentConfig,
    trials: &'a [TrialRecord],
    learning_probes: &'a [LearningProbeRecord],
}

impl MemoryStore {
    pub fn write_json(
        &self,
        path: &Path,
        config: &ExperimentConfig,
        seed: Option<u64>,
    ) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("cannot create result file {}", path.display()))?;
        let export = Export {
            seed,
            config,
            trials: &self.trials,
            learning_probes: &self.learning_probes,
        };
        serde_json::to_writer_pretty(BufWriter::new(file), &export)
            .with_context(|| format!("failed to write results to {}", path.display()))?;
        Ok(())
    }

    /// Error rate per tag over all stored trials.
    pub fn error_rates(&self) -> BTreeMap<ErrorTag, f64> {
        let mut counts = BTreeMap::new();
        for trial in &self.trials {
            *counts.entry(trial.err).or_insert(0usize) += 1;
        }
        let total = self.trials.len().max(1) as f64;
        counts
            .into_iter()
            .map(|(tag, n)| (tag, n as f64 / total))
            .collect()
    }

    /// Mean, min and max of the valid probe reaction times.
    pub fn probe_rt_stats(&self) -> Option<(f64, f64, f64)> {
        let times: Vec<f64> = self
            .trials
            .iter()
            .filter(|t| t.block_type == BlockType::Probe)
            .filter_map(|t| match t.probe_rt {
                OrNa::Value(rt) => Some(rt),
                OrNa::Na => None,
            })
            .collect();
        if times.is_empty() {
            return None;
        }
        let mean = times.iter().sum::<f64>() / times.len() as f64;
        let min = times.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = times.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        Some((mean, min, max))
    }
}
