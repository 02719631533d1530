pub mod host;
pub mod outcome;
pub mod phase;
pub mod record;
pub mod response;
pub mod stimulus;
pub mod trial;

pub use host::{
    Boundary, Display, GazeSampler, Host, HostError, InputCapture, ResultStore, TrialSource,
};
pub use outcome::{ErrorTag, MessageKey};
pub use phase::{BlockType, SessionPhase};
pub use record::{LearningProbeRecord, OrNa, Record, TrialRecord};
pub use response::{Modality, RawResponse, Response, ResponseOutcome};
pub use stimulus::{Colour, Layer, ScreenLocation, Shape, TextStyle};
pub use trial::{GoSignal, Location, ProbeColour, TrialSpec, TrialState, ValueClass};
