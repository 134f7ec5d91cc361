use std::fmt;

/// Power-off countdown as last reported by the appliance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Countdown {
    #[default]
    Hidden,
    Visible(String),
}

impl Countdown {
    pub const LABEL: &str = "Cancel countdown";

    /// `remaining` is only present while the appliance reports a positive
    /// timer, so a final partial second still shows as `00:00:00`.
    pub fn from_remaining(remaining: Option<u64>) -> Self {
        match remaining {
            Some(seconds) => Self::Visible(format_hms(seconds)),
            None => Self::Hidden,
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self, Self::Visible(_))
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Visible(text) => Some(text),
            Self::Hidden => None,
        }
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Visible(text) => write!(f, "{}: {text}", Self::LABEL),
            Self::Hidden => Ok(()),
        }
    }
}

/// Zero-padded `HH:MM:SS`. Hours keep counting past a day.
pub fn format_hms(seconds: u64) -> String {
    let (hours, rest) = (seconds / 3600, seconds % 3600);
    let (minutes, seconds) = (rest / 60, rest % 60);

    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
