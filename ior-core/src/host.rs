//! Services the experiment consumes from its host: a display, an eye
//! tracker, input devices, a result store and a trial list generator.

use crate::phase::BlockType;
use crate::record::Record;
use crate::response::{Modality, RawResponse};
use crate::stimulus::{Colour, Layer, ScreenLocation, Shape};
use crate::trial::TrialSpec;

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("failed to store {destination} record: {source}")]
    Store {
        destination: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

pub trait Display {
    /// Clears the back buffer to the background colour.
    fn fill(&mut self);
    fn present(&mut self, shape: &Shape, layer: Layer, location: ScreenLocation);
    /// Shows the back buffer at the next refresh. This is the frame boundary.
    fn flip(&mut self);
    fn clear(&mut self);
    /// Colour at `angle_deg` on a constant-luminance colour wheel.
    fn constant_luminance(&self, angle_deg: u16) -> Colour;
}

/// Circular gaze boundary centred on the screen centre.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    pub name: String,
    pub radius_px: f32,
}

impl Boundary {
    pub fn circle(name: &str, radius_px: f32) -> Self {
        Self {
            name: name.to_string(),
            radius_px,
        }
    }
}

pub trait GazeSampler {
    fn add_boundary(&mut self, boundary: Boundary);
    /// Whether the latest gaze sample lies inside the named boundary.
    fn within_boundary(&mut self, name: &str) -> bool;
    fn drift_correct(&mut self);
}

pub trait InputCapture {
    /// Responses that arrived since the last poll, on the given channels.
    /// `RawResponse::timestamp_ns` must be read from the same clock as the
    /// engine's `Timer::now`; reaction times are measured against it.
    fn poll(&mut self, modalities: &[Modality]) -> Vec<RawResponse>;
    fn reset(&mut self);
    /// Set when the audio stream failed during the last collection.
    fn stream_fault(&self) -> bool;
    /// Blocks until the participant presses any key.
    fn acknowledge(&mut self);
    fn quit_requested(&mut self) -> bool;
    /// Re-measures the voice-onset threshold and returns it.
    fn calibrate_audio(&mut self) -> f64;
    fn ask(&mut self, question: &str) -> String;
}

/// Everything a running trial talks to.
pub trait Host: Display + GazeSampler + InputCapture {}

impl<T: Display + GazeSampler + InputCapture> Host for T {}

pub trait ResultStore {
    fn insert(&mut self, record: Record) -> Result<(), HostError>;
}

/// Supplies permutation-balanced trial parameters for a block.
pub trait TrialSource {
    fn block_trials(&mut self, block_type: BlockType, count: usize) -> Vec<TrialSpec>;
}
