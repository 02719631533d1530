use crate::outcome::MessageKey;
use crate::trial::Location;

pub type Colour = [u8; 4];

pub const WHITE: Colour = [255, 255, 255, 255];
pub const GREY: Colour = [100, 100, 100, 255];
pub const PASTEL_GREEN: Colour = [75, 210, 100, 255];
pub const PASTEL_RED: Colour = [210, 75, 75, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Default,
    ScoreUp,
    ScoreDown,
    Timeout,
}

impl TextStyle {
    pub fn colour(&self) -> Colour {
        match self {
            TextStyle::Default | TextStyle::Timeout => WHITE,
            TextStyle::ScoreUp => PASTEL_GREEN,
            TextStyle::ScoreDown => PASTEL_RED,
        }
    }
}

/// Everything the trial sequences onto the screen. How each one looks is the
/// display's business.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Thin-bordered placeholder box.
    Placeholder,
    /// Thick-bordered box marking the cued side.
    Cue,
    FixationStar,
    /// Greyed fixation star, the no-go signal.
    MutedStar,
    /// Enlarged star flashed at fixation after the cue.
    Cueback,
    Bandit { colour: Colour },
    Probe { colour: Colour },
    Text { content: String, style: TextStyle },
}

impl Shape {
    pub fn message(key: MessageKey) -> Self {
        let style = if key.uses_timeout_style() {
            TextStyle::Timeout
        } else {
            TextStyle::Default
        };
        Shape::Text {
            content: key.text(),
            style,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Background,
    Placeholder,
    Stimulus,
    Overlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenLocation {
    Centre,
    LeftBox,
    RightBox,
}

impl From<Location> for ScreenLocation {
    fn from(location: Location) -> Self {
        match location {
            Location::Left => ScreenLocation::LeftBox,
            Location::Right => ScreenLocation::RightBox,
        }
    }
}
