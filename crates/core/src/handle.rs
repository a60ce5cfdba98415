use std::sync::Arc;

use crossbeam_channel::{Sender, TrySendError};
use nocturne_fixtures::Venue;
use parking_lot::RwLock;

use crate::error::InvalidSelector;
use crate::messages::{DirectorCommand, DirectorStatus, HypeStatus};
use crate::mode::{Mode, VjMode};
use crate::theme::Theme;

/// Parse a venue name at the boundary.
pub fn parse_venue(name: &str) -> Result<Venue, InvalidSelector> {
    Venue::ALL
        .into_iter()
        .find(|v| v.name().eq_ignore_ascii_case(name))
        .ok_or_else(|| InvalidSelector::new("venue", name, Venue::ALL.map(|v| v.name())))
}

/// Cloneable entry point for external control surfaces. Validation happens
/// here, before anything is enqueued; accepted requests are acknowledged
/// optimistically and applied by the director at its next drain point, so
/// callers must not assume the mutation is visible synchronously. Queries
/// read the per-tick status snapshot and never touch live director state.
#[derive(Clone)]
pub struct DirectorHandle {
    commands: Sender<DirectorCommand>,
    status: Arc<RwLock<DirectorStatus>>,
}

impl DirectorHandle {
    pub(crate) fn new(commands: Sender<DirectorCommand>, status: Arc<RwLock<DirectorStatus>>) -> Self {
        DirectorHandle { commands, status }
    }

    fn submit(&self, command: DirectorCommand) {
        match self.commands.try_send(command) {
            Ok(()) => {}
            Err(TrySendError::Full(command)) => {
                log::warn!("director command queue full, dropping {:?}", command);
            }
            Err(TrySendError::Disconnected(command)) => {
                log::warn!("director gone, dropping {:?}", command);
            }
        }
    }

    pub fn set_mode(&self, name: &str) -> Result<Mode, InvalidSelector> {
        let mode: Mode = name.parse()?;
        self.submit(DirectorCommand::SetMode(mode));
        Ok(mode)
    }

    pub fn set_vj_mode(&self, name: &str) -> Result<VjMode, InvalidSelector> {
        let vj_mode: VjMode = name.parse()?;
        self.submit(DirectorCommand::SetVjMode(vj_mode));
        Ok(vj_mode)
    }

    pub fn set_venue(&self, name: &str) -> Result<Venue, InvalidSelector> {
        let venue = parse_venue(name)?;
        self.submit(DirectorCommand::SetVenue(venue));
        Ok(venue)
    }

    pub fn set_theme(&self, name: &str) -> Result<(), InvalidSelector> {
        let theme: Theme = name.parse()?;
        self.submit(DirectorCommand::SetTheme(theme));
        Ok(())
    }

    pub fn set_hype(&self, hype: f32) {
        self.submit(DirectorCommand::SetHype(hype));
    }

    pub fn set_hype_limiter(&self, enabled: bool) {
        self.submit(DirectorCommand::SetHypeLimiter(enabled));
    }

    /// Clamped to [0, 1] before it is stored.
    pub fn set_manual_dimmer(&self, level: f32) {
        self.submit(DirectorCommand::SetManualDimmer(level));
    }

    pub fn deploy_hype(&self) {
        self.submit(DirectorCommand::DeployHype);
    }

    pub fn shift(&self) {
        self.submit(DirectorCommand::Shift);
    }

    pub fn shift_lighting_only(&self) {
        self.submit(DirectorCommand::ShiftLightingOnly);
    }

    pub fn shift_vj_only(&self) {
        self.submit(DirectorCommand::ShiftVjOnly);
    }

    pub fn hype_status(&self) -> HypeStatus {
        self.status.read().hype_status
    }

    pub fn manual_dimmer(&self) -> f32 {
        self.status.read().manual_dimmer
    }

    pub fn status(&self) -> DirectorStatus {
        self.status.read().clone()
    }
}
