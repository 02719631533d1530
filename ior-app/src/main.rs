mod app;
mod logging;
mod sim;
mod source;
mod store;

use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum, ValueHint};
use ior_experiment::TrialTypeConfig;

pub use app::App;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Runs the IOR reward task against a simulated participant"
)]
pub struct Cli {
    /// JSON experiment configuration; defaults are used for missing fields
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Where to write trial and learning-probe records
    #[arg(long, short, default_value = "ior_results.json", value_hint = ValueHint::FilePath)]
    pub output: PathBuf,

    /// Seed for every random draw; omit for a fresh session
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of bandit+probe block pairs
    #[arg(long)]
    pub blocks: Option<usize>,

    /// Trials per block
    #[arg(long)]
    pub trials: Option<usize>,

    /// Probe response variant
    #[arg(long, value_enum)]
    pub variant: Option<Variant>,

    /// Run probe blocks only
    #[arg(long)]
    pub no_bandit_blocks: bool,

    /// Vocal responses to bandits neither end the window nor count as errors
    #[arg(long)]
    pub ignore_vocal_for_bandits: bool,

    /// Display refresh rate in Hz
    #[arg(long)]
    pub refresh_rate: Option<f64>,

    /// Pace frames with the wall clock instead of simulated time
    #[arg(long)]
    pub realtime: bool,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log: String,

    #[command(flatten)]
    pub participant: ParticipantArgs,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Variant {
    Audio,
    Keypress,
    GoNoGo,
}

impl From<Variant> for TrialTypeConfig {
    fn from(v: Variant) -> Self {
        match v {
            Variant::Audio => TrialTypeConfig::Audio,
            Variant::Keypress => TrialTypeConfig::Keypress,
            Variant::GoNoGo => TrialTypeConfig::GoNoGo,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ParticipantArgs {
    /// Mean reaction time of the simulated participant (ms)
    #[arg(long, default_value_t = 420.0)]
    pub rt_mean: f64,

    /// Reaction time standard deviation (ms)
    #[arg(long, default_value_t = 80.0)]
    pub rt_sd: f64,

    /// Per-trial chance of a brief fixation break
    #[arg(long, default_value_t = 0.03)]
    pub break_rate: f64,

    /// Chance of missing a target
    #[arg(long, default_value_t = 0.02)]
    pub lapse_rate: f64,

    /// Chance of answering with the wrong modality
    #[arg(long, default_value_t = 0.02)]
    pub slip_rate: f64,

    /// Per-trial chance of an anticipatory vocal response
    #[arg(long, default_value_t = 0.02)]
    pub false_alarm_rate: f64,

    /// Chance of picking a bandit at random
    #[arg(long, default_value_t = 0.2)]
    pub explore_rate: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(&cli.log)?;

    let app = App::new(cli)?;
    app.run()?;

    Ok(())
}
