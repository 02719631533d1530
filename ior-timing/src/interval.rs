use std::time::Duration;

use rand::Rng;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntervalError {
    #[error("refresh interval must be non-zero")]
    ZeroRefresh,
    #[error("interval lower bound {lower:?} exceeds upper bound {upper:?}")]
    Inverted { lower: Duration, upper: Duration },
    #[error("no whole frame of {refresh:?} fits between {lower:?} and {upper:?}")]
    NoFrameInRange {
        lower: Duration,
        upper: Duration,
        refresh: Duration,
    },
    #[error("refresh rate must be a positive number of hertz, got {0}")]
    BadRefreshRate(f64),
}

/// Duration of one display frame at `hz`, to the nanosecond.
pub fn refresh_interval(hz: f64) -> Result<Duration, IntervalError> {
    if !hz.is_finite() || hz <= 0.0 {
        return Err(IntervalError::BadRefreshRate(hz));
    }
    Ok(Duration::from_nanos((1e9 / hz).round() as u64))
}

/// Picks a delay that is a whole number of frames and lies in
/// `[lower, upper]`, each admissible frame count being equally likely.
pub fn random_interval<R: Rng + ?Sized>(
    rng: &mut R,
    lower: Duration,
    upper: Duration,
    refresh: Duration,
) -> Result<Duration, IntervalError> {
    let frame_ns = refresh.as_nanos();
    if frame_ns == 0 {
        return Err(IntervalError::ZeroRefresh);
    }
    if lower > upper {
        return Err(IntervalError::Inverted { lower, upper });
    }
    let min_flips = lower.as_nanos().div_ceil(frame_ns);
    let max_flips = upper.as_nanos() / frame_ns;
    if min_flips > max_flips {
        return Err(IntervalError::NoFrameInRange {
            lower,
            upper,
            refresh,
        });
    }
    let flips = rng.random_range(min_flips..=max_flips);
    Ok(Duration::from_nanos((flips * frame_ns) as u64))
}
