use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvalidSelector;

/// Overall show intensity, ordered from darkest to wildest. Drives which
/// interpreter candidates are eligible for each fixture group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Blackout,
    Gentle,
    Rave,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Blackout, Mode::Gentle, Mode::Rave];

    pub fn name(&self) -> &'static str {
        match self {
            Mode::Blackout => "blackout",
            Mode::Gentle => "gentle",
            Mode::Rave => "rave",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Mode {
    type Err = InvalidSelector;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| InvalidSelector::new("mode", s, Mode::ALL.map(|m| m.name())))
    }
}

/// Requested character of the visual layer. Carried in director state and
/// forwarded to the visual collaborator on shifts; the director itself does
/// not interpret it further.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VjMode {
    Off,
    Ambient,
    Rave,
}

impl VjMode {
    pub const ALL: [VjMode; 3] = [VjMode::Off, VjMode::Ambient, VjMode::Rave];

    pub fn name(&self) -> &'static str {
        match self {
            VjMode::Off => "off",
            VjMode::Ambient => "ambient",
            VjMode::Rave => "rave",
        }
    }
}

impl fmt::Display for VjMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for VjMode {
    type Err = InvalidSelector;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VjMode::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| InvalidSelector::new("vj mode", s, VjMode::ALL.map(|m| m.name())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_ordering() {
        assert!(Mode::Blackout < Mode::Gentle);
        assert!(Mode::Gentle < Mode::Rave);
    }

    #[test]
    fn test_mode_parse_round_trip() {
        for mode in Mode::ALL {
            assert_eq!(mode.name().parse::<Mode>(), Ok(mode));
        }
        assert_eq!("RAVE".parse::<Mode>(), Ok(Mode::Rave));
    }

    #[test]
    fn test_unknown_mode_reports_valid_names() {
        let err = "warp".parse::<Mode>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("blackout"));
        assert!(message.contains("rave"));
    }
}
