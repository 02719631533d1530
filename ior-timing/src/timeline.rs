use std::fmt;
use std::time::Duration;

use crate::timer::Timer;

/// Named moments within a trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    CueOn,
    CueOff,
    CuebackOff,
    TargetOn,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::CueOn => "cue_on",
            EventName::CueOff => "cue_off",
            EventName::CuebackOff => "cueback_off",
            EventName::TargetOn => "target_on",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventTicket {
    pub name: EventName,
    pub offset: Duration,
}

impl EventTicket {
    pub fn new(name: EventName, offset: Duration) -> Self {
        Self { name, offset }
    }

    pub fn offset_ms(&self) -> f64 {
        self.offset.as_secs_f64() * 1e3
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimelineError {
    #[error("no event named `{0}` on this trial's timeline")]
    UnknownEvent(EventName),
    #[error("event `{0}` registered twice")]
    DuplicateEvent(EventName),
    #[error("event `{name}` at {offset:?} does not follow the previous event at {previous:?}")]
    NotIncreasing {
        name: EventName,
        offset: Duration,
        previous: Duration,
    },
    #[error("timeline must end with `target_on`")]
    MissingTargetOnset,
}

/// Ordered, strictly increasing set of event offsets for one trial.
#[derive(Debug, Clone, PartialEq)]
pub struct EventTimeline {
    tickets: Vec<EventTicket>,
}

impl EventTimeline {
    pub fn new(tickets: Vec<EventTicket>) -> Result<Self, TimelineError> {
        for (i, ticket) in tickets.iter().enumerate() {
            if tickets[..i].iter().any(|t| t.name == ticket.name) {
                return Err(TimelineError::DuplicateEvent(ticket.name));
            }
            if let Some(prev) = i.checked_sub(1).map(|p| tickets[p]) {
                if ticket.offset <= prev.offset {
                    return Err(TimelineError::NotIncreasing {
                        name: ticket.name,
                        offset: ticket.offset,
                        previous: prev.offset,
                    });
                }
            }
        }
        match tickets.last() {
            Some(last) if last.name == EventName::TargetOn => Ok(Self { tickets }),
            _ => Err(TimelineError::MissingTargetOnset),
        }
    }

    /// Cue, cueback and target events. The target is placed `cotoa` after cue
    /// offset, so `cotoa` must outlast the cueback.
    pub fn probe(
        start: Duration,
        cue: Duration,
        cueback: Duration,
        cotoa: Duration,
    ) -> Result<Self, TimelineError> {
        let cue_off = start + cue;
        Self::new(vec![
            EventTicket::new(EventName::CueOn, start),
            EventTicket::new(EventName::CueOff, cue_off),
            EventTicket::new(EventName::CuebackOff, cue_off + cueback),
            EventTicket::new(EventName::TargetOn, cue_off + cotoa),
        ])
    }

    pub fn bandit(start: Duration) -> Result<Self, TimelineError> {
        Self::new(vec![EventTicket::new(EventName::TargetOn, start)])
    }

    pub fn offset(&self, name: EventName) -> Result<Duration, TimelineError> {
        self.tickets
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.offset)
            .ok_or(TimelineError::UnknownEvent(name))
    }

    pub fn target_onset(&self) -> Duration {
        self.tickets.last().map_or(Duration::ZERO, |t| t.offset)
    }

    pub fn tickets(&self) -> &[EventTicket] {
        &self.tickets
    }
}

/// Clock anchored at trial-body entry, answering questions about the
/// trial's timeline.
#[derive(Debug, Clone)]
pub struct TrialClock<T: Timer> {
    timer: T,
    start: T::Timestamp,
    timeline: EventTimeline,
}

impl<T: Timer> TrialClock<T> {
    pub fn start(timer: T, timeline: EventTimeline) -> Self {
        let start = timer.now();
        Self {
            timer,
            start,
            timeline,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.timer.elapsed(self.start)
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timeline(&self) -> &EventTimeline {
        &self.timeline
    }

    /// True while the named event still lies in the future.
    pub fn before(&self, name: EventName) -> Result<bool, TimelineError> {
        Ok(self.elapsed() < self.timeline.offset(name)?)
    }

    /// True when `a <= now < b`.
    pub fn between(&self, a: EventName, b: EventName) -> Result<bool, TimelineError> {
        let now = self.elapsed();
        Ok(self.timeline.offset(a)? <= now && now < self.timeline.offset(b)?)
    }
}
