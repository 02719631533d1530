use serde::{Deserialize, Serialize};
use std::fmt;

/// Error recorded against a trial. `Na` is the clean outcome and is written
/// to the record as `"NA"`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ErrorTag {
    #[default]
    #[serde(rename = "NA")]
    Na,
    LeftFixation,
    WrongResponse,
    KeypressOnProbe,
    VocalOnBandit,
    ProbeTimeout,
    BanditTimeout,
    MicrophoneError,
    ResponseOnCatch,
    ResponseOnNogo,
}

impl ErrorTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorTag::Na => "NA",
            ErrorTag::LeftFixation => "left_fixation",
            ErrorTag::WrongResponse => "wrong_response",
            ErrorTag::KeypressOnProbe => "keypress_on_probe",
            ErrorTag::VocalOnBandit => "vocal_on_bandit",
            ErrorTag::ProbeTimeout => "probe_timeout",
            ErrorTag::BanditTimeout => "bandit_timeout",
            ErrorTag::MicrophoneError => "microphone_error",
            ErrorTag::ResponseOnCatch => "response_on_catch",
            ErrorTag::ResponseOnNogo => "response_on_nogo",
        }
    }

    pub fn is_error(&self) -> bool {
        *self != ErrorTag::Na
    }

    /// Message shown to the participant for this error.
    pub fn message(&self) -> Option<MessageKey> {
        Some(match self {
            ErrorTag::Na => return None,
            ErrorTag::LeftFixation => MessageKey::Fixation,
            ErrorTag::WrongResponse | ErrorTag::KeypressOnProbe | ErrorTag::VocalOnBandit => {
                MessageKey::WrongResponse
            }
            // A dead microphone looks like silence to the participant.
            ErrorTag::ProbeTimeout | ErrorTag::MicrophoneError => MessageKey::ProbeTimeout,
            ErrorTag::BanditTimeout => MessageKey::BanditTimeout,
            ErrorTag::ResponseOnCatch => MessageKey::ResponseOnCatch,
            ErrorTag::ResponseOnNogo => MessageKey::TooSoon,
        })
    }
}

impl fmt::Display for ErrorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// On-screen error messages that wait for a keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    Fixation,
    TooSoon,
    ProbeTimeout,
    BanditTimeout,
    WrongResponse,
    ResponseOnCatch,
}

impl MessageKey {
    pub fn text(&self) -> String {
        let body = match self {
            MessageKey::Fixation => "Eyes moved! Please keep your eyes on the asterisk.",
            MessageKey::TooSoon => {
                "Responded too soon! Please wait until the 'go' signal to make a response."
            }
            MessageKey::ProbeTimeout => "No response detected! Please answer louder or faster.",
            MessageKey::BanditTimeout => "Bandit selection timed out!",
            MessageKey::WrongResponse => {
                "Wrong response type!\nPlease make vocal responses to probes and keypress responses to bandits."
            }
            MessageKey::ResponseOnCatch => {
                "No target presented!\nPlease wait until a target is presented before making a response."
            }
        };
        format!("{body}\n\nPress any key to continue.")
    }

    pub fn uses_timeout_style(&self) -> bool {
        matches!(self, MessageKey::ProbeTimeout | MessageKey::BanditTimeout)
    }
}
