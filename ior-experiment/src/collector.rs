use std::time::Duration;

use ior_core::{Host, Location, Modality, Response, ResponseOutcome};
use ior_timing::Timer;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct KeyBinding {
    pub ui_label: String,
    pub data_label: Location,
    pub symbol: String,
}

/// Maps key symbols to the response values they stand for.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyMap {
    pub name: String,
    pub bindings: Vec<KeyBinding>,
}

impl KeyMap {
    /// `z` picks the left bandit, `/` the right one.
    pub fn bandit_response() -> Self {
        Self {
            name: "bandit_response".to_string(),
            bindings: vec![
                KeyBinding {
                    ui_label: "z".to_string(),
                    data_label: Location::Left,
                    symbol: "z".to_string(),
                },
                KeyBinding {
                    ui_label: "/".to_string(),
                    data_label: Location::Right,
                    symbol: "/".to_string(),
                },
            ],
        }
    }

    pub fn lookup(&self, symbol: &str) -> Option<Location> {
        self.bindings
            .iter()
            .find(|b| b.symbol == symbol)
            .map(|b| b.data_label)
    }
}

/// Runs a bounded response window, one display frame at a time.
#[derive(Debug, Clone)]
pub struct ResponseCollector {
    pub terminate_after: Duration,
    pub listens: Vec<Modality>,
    pub interrupts: Vec<Modality>,
    pub key_map: KeyMap,
    responses: ResponseOutcome,
}

impl ResponseCollector {
    pub fn new(
        terminate_after: Duration,
        listens: Vec<Modality>,
        interrupts: Vec<Modality>,
        key_map: KeyMap,
    ) -> Self {
        Self {
            terminate_after,
            listens,
            interrupts,
            key_map,
            responses: ResponseOutcome::default(),
        }
    }

    /// Calls `display_callback` then flips on every frame until an
    /// interrupting modality responds or the window elapses. An error from the
    /// callback ends collection immediately.
    pub fn collect<H, T, F, E>(
        &mut self,
        host: &mut H,
        timer: &T,
        mut display_callback: F,
    ) -> Result<ResponseOutcome, E>
    where
        H: Host,
        T: Timer<Timestamp = u64>,
        F: FnMut(&mut H) -> Result<(), E>,
    {
        let start = timer.now();
        loop {
            display_callback(host)?;
            host.flip();

            for raw in host.poll(&self.listens) {
                if !self.listens.contains(&raw.modality) {
                    continue;
                }
                let value = match raw.modality {
                    Modality::Keypress => {
                        match raw.content.as_deref().and_then(|s| self.key_map.lookup(s)) {
                            Some(location) => Some(location),
                            None => continue,
                        }
                    }
                    Modality::Vocal => None,
                };
                let rt_ms = raw.timestamp_ns.saturating_sub(start) as f64 / 1e6;
                debug!(modality = ?raw.modality, rt_ms, "response collected");
                self.responses.push(Response {
                    modality: raw.modality,
                    value,
                    rt_ms,
                });
            }

            if self.interrupts.iter().any(|m| self.responses.has(*m)) {
                break;
            }
            if timer.elapsed(start) >= self.terminate_after {
                break;
            }
        }
        self.responses.stream_fault = host.stream_fault();
        Ok(self.responses.clone())
    }

    pub fn responses(&self) -> &ResponseOutcome {
        &self.responses
    }

    pub fn reset(&mut self) {
        self.responses.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_map_resolves_bandit_keys() {
        let map = KeyMap::bandit_response();
        assert_eq!(map.lookup("z"), Some(Location::Left));
        assert_eq!(map.lookup("/"), Some(Location::Right));
        assert_eq!(map.lookup("x"), None);
    }
}
