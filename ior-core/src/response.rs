use serde::{Deserialize, Serialize};

use crate::trial::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Keypress,
    Vocal,
}

/// Input exactly as the capture device reports it. `content` is the key
/// symbol for keypresses and empty for voice onsets.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub modality: Modality,
    pub content: Option<String>,
    pub timestamp_ns: u64,
}

impl RawResponse {
    pub fn key(symbol: &str, timestamp_ns: u64) -> Self {
        Self {
            modality: Modality::Keypress,
            content: Some(symbol.to_string()),
            timestamp_ns,
        }
    }

    pub fn voice(timestamp_ns: u64) -> Self {
        Self {
            modality: Modality::Vocal,
            content: None,
            timestamp_ns,
        }
    }
}

/// A response accepted by a collector, timed from window onset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Response {
    pub modality: Modality,
    pub value: Option<Location>,
    pub rt_ms: f64,
}

/// Everything collected during one response window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseOutcome {
    pub keypress: Vec<Response>,
    pub vocal: Vec<Response>,
    pub stream_fault: bool,
}

impl ResponseOutcome {
    pub fn push(&mut self, response: Response) {
        match response.modality {
            Modality::Keypress => self.keypress.push(response),
            Modality::Vocal => self.vocal.push(response),
        }
    }

    pub fn responses(&self, modality: Modality) -> &[Response] {
        match modality {
            Modality::Keypress => &self.keypress,
            Modality::Vocal => &self.vocal,
        }
    }

    pub fn first(&self, modality: Modality) -> Option<&Response> {
        self.responses(modality).first()
    }

    pub fn has(&self, modality: Modality) -> bool {
        !self.responses(modality).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.keypress.is_empty() && self.vocal.is_empty()
    }

    pub fn clear(&mut self) {
        self.keypress.clear();
        self.vocal.clear();
        self.stream_fault = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(modality: Modality, rt_ms: f64) -> Response {
        Response {
            modality,
            value: None,
            rt_ms,
        }
    }

    #[test]
    fn responses_are_kept_per_modality() {
        let mut outcome = ResponseOutcome::default();
        assert!(outcome.is_empty());
        outcome.push(response(Modality::Keypress, 420.0));
        outcome.push(response(Modality::Vocal, 380.0));
        outcome.push(response(Modality::Keypress, 510.0));
        assert_eq!(outcome.responses(Modality::Keypress).len(), 2);
        assert_eq!(outcome.first(Modality::Vocal).map(|r| r.rt_ms), Some(380.0));
        assert!(outcome.has(Modality::Keypress));
        outcome.stream_fault = true;
        outcome.clear();
        assert!(outcome.is_empty());
        assert!(!outcome.stream_fault);
    }
}
