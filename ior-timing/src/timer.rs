use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Clock the trial engine reads. Timestamps are opaque; only differences via
/// [`Timer::elapsed`] are meaningful.
pub trait Timer: Clone + Send + Sync {
    type Timestamp: Copy + Clone + Send + Sync + std::fmt::Debug;
    fn now(&self) -> Self::Timestamp;
    fn elapsed(&self, ts: Self::Timestamp) -> Duration;
    /// Waits out `d`. Frame pacing on a headless host goes through here.
    fn sleep(&self, d: Duration);
    fn record_frame(&mut self, d: Duration);
    fn frame_count(&self) -> usize;
    fn calibration_stats(&self) -> CalibrationStats;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalibrationStats {
    pub average_frame_time_ns: f64,
    pub jitter_ns: f64,
    pub min_frame_time_ns: f64,
    pub max_frame_time_ns: f64,
    pub effective_fps: f64,
}

/// Most recent frame durations, oldest dropped first.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameLog {
    frames: VecDeque<Duration>,
    capacity: usize,
}

impl FrameLog {
    pub const DEFAULT_CAPACITY: usize = 1000;

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: VecDeque::with_capacity(capacity.min(Self::DEFAULT_CAPACITY)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, d: Duration) {
        if self.frames.len() == self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(d);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Duration> {
        self.frames.iter()
    }

    pub fn stats(&self) -> CalibrationStats {
        if self.frames.is_empty() {
            return CalibrationStats::default();
        }
        let n = self.frames.len() as f64;
        let ns = || self.frames.iter().map(|d| d.as_nanos() as f64);
        let avg = ns().sum::<f64>() / n;
        let var = ns().map(|x| (x - avg).powi(2)).sum::<f64>() / n;
        CalibrationStats {
            average_frame_time_ns: avg,
            jitter_ns: var.sqrt(),
            min_frame_time_ns: ns().fold(f64::INFINITY, f64::min),
            max_frame_time_ns: ns().fold(f64::NEG_INFINITY, f64::max),
            effective_fps: if avg > 0.0 { 1e9 / avg } else { 0.0 },
        }
    }
}

impl Default for FrameLog {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

/// Wall-clock timer for runs paced by real time.
#[derive(Debug, Clone)]
pub struct HighPrecisionTimer {
    pub start: Instant,
    pub frames: FrameLog,
}

impl Timer for HighPrecisionTimer {
    type Timestamp = u64;
    fn now(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }
    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }
    fn sleep(&self, d: Duration) {
        self.high_precision_sleep(d)
    }
    fn record_frame(&mut self, d: Duration) {
        self.frames.push(d);
    }
    fn frame_count(&self) -> usize {
        self.frames.len()
    }
    fn calibration_stats(&self) -> CalibrationStats {
        self.frames.stats()
    }
}

impl HighPrecisionTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            frames: FrameLog::default(),
        }
    }

    pub fn high_precision_sleep(&self, duration: Duration) {
        #[cfg(target_os = "linux")]
        linux_sleep(duration);
        #[cfg(not(target_os = "linux"))]
        std::thread::sleep(duration);
    }
}

impl Default for HighPrecisionTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Relative monotonic sleep; retries when a signal cuts it short.
#[cfg(target_os = "linux")]
fn linux_sleep(duration: Duration) {
    use libc::{clock_nanosleep, timespec, CLOCK_MONOTONIC, EINTR};

    let mut req = timespec {
        tv_sec: duration.as_secs() as libc::time_t,
        tv_nsec: duration.subsec_nanos() as libc::c_long,
    };
    let mut rem = timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: both pointers refer to live, initialised timespecs on this stack.
    while unsafe { clock_nanosleep(CLOCK_MONOTONIC, 0, &req, &mut rem) } == EINTR {
        req = rem;
    }
}

/// Timer whose clock only moves when told to.
///
/// Clones share the same clock, so a headless display can advance time on
/// every flip while the trial engine reads it through its own handle.
#[derive(Debug, Clone)]
pub struct SimulatedTimer {
    now_ns: Arc<AtomicU64>,
    pub frames: FrameLog,
}

impl SimulatedTimer {
    pub fn new() -> Self {
        Self {
            now_ns: Arc::new(AtomicU64::new(0)),
            frames: FrameLog::default(),
        }
    }

    pub fn advance(&self, d: Duration) {
        self.now_ns.fetch_add(d.as_nanos() as u64, Ordering::SeqCst);
    }

    pub fn set(&self, ns: u64) {
        self.now_ns.store(ns, Ordering::SeqCst);
    }
}

impl Default for SimulatedTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer for SimulatedTimer {
    type Timestamp = u64;
    fn now(&self) -> u64 {
        self.now_ns.load(Ordering::SeqCst)
    }
    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }
    fn sleep(&self, d: Duration) {
        self.advance(d)
    }
    fn record_frame(&mut self, d: Duration) {
        self.frames.push(d);
    }
    fn frame_count(&self) -> usize {
        self.frames.len()
    }
    fn calibration_stats(&self) -> CalibrationStats {
        self.frames.stats()
    }
}
