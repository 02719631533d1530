pub mod interval;
pub mod timeline;
pub mod timer;

pub use interval::{random_interval, refresh_interval, IntervalError};
pub use timeline::{EventName, EventTicket, EventTimeline, TimelineError, TrialClock};
pub use timer::{CalibrationStats, FrameLog, HighPrecisionTimer, SimulatedTimer, Timer};
