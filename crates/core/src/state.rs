use nocturne_fixtures::Venue;

use crate::messages::DirectorCommand;
use crate::mode::{Mode, VjMode};
use crate::theme::{default_theme, Theme};

/// Externally-visible show state. Mutated only on the owner thread through
/// `apply`; every observable change comes back as a typed event so the
/// director can react at the drain point, never from a foreign thread.
#[derive(Clone, Debug)]
pub struct State {
    pub venue: Venue,
    pub mode: Mode,
    pub vj_mode: VjMode,
    pub theme: Theme,
    /// Show-wide energy scalar, 0-100.
    pub hype: f32,
    /// When enabled, interpreter selection stays within ±30 of `hype`.
    pub hype_limiter: bool,
    /// Override level for manual groups, 0-1.
    pub manual_dimmer: f32,
}

/// Typed change notification emitted by `State::apply`. Dispatch is
/// synchronous and single-threaded, performed by the director while
/// draining the command queue.
#[derive(Clone, Debug, PartialEq)]
pub enum StateEvent {
    ModeChanged(Mode),
    VenueChanged(Venue),
    ThemeChanged,
    VjModeChanged(VjMode),
}

impl State {
    pub fn new(venue: Venue) -> Self {
        State {
            venue,
            mode: Mode::Gentle,
            vj_mode: VjMode::Ambient,
            theme: default_theme(),
            hype: 50.0,
            hype_limiter: false,
            manual_dimmer: 0.0,
        }
    }

    /// Apply one drained command. Shift and hype-deploy commands are the
    /// director's to handle and never reach here.
    pub fn apply(&mut self, command: DirectorCommand) -> Vec<StateEvent> {
        match command {
            DirectorCommand::SetMode(mode) => {
                if self.mode == mode {
                    return Vec::new();
                }
                self.mode = mode;
                vec![StateEvent::ModeChanged(mode)]
            }
            DirectorCommand::SetVenue(venue) => {
                if self.venue == venue {
                    return Vec::new();
                }
                self.venue = venue;
                vec![StateEvent::VenueChanged(venue)]
            }
            DirectorCommand::SetTheme(theme) => {
                if self.theme == theme {
                    return Vec::new();
                }
                self.theme = theme;
                vec![StateEvent::ThemeChanged]
            }
            DirectorCommand::SetVjMode(vj_mode) => {
                if self.vj_mode == vj_mode {
                    return Vec::new();
                }
                self.vj_mode = vj_mode;
                vec![StateEvent::VjModeChanged(vj_mode)]
            }
            DirectorCommand::SetHype(hype) => {
                self.hype = hype.clamp(0.0, 100.0);
                Vec::new()
            }
            DirectorCommand::SetHypeLimiter(enabled) => {
                self.hype_limiter = enabled;
                Vec::new()
            }
            DirectorCommand::SetManualDimmer(level) => {
                self.manual_dimmer = level.clamp(0.0, 1.0);
                Vec::new()
            }
            DirectorCommand::DeployHype
            | DirectorCommand::Shift
            | DirectorCommand::ShiftLightingOnly
            | DirectorCommand::ShiftVjOnly => Vec::new(),
        }
    }
}
