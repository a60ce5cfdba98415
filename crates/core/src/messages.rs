use nocturne_fixtures::Venue;
use serde::{Deserialize, Serialize};

use crate::mode::{Mode, VjMode};
use crate::theme::Theme;

/// Requests enqueued by external control surfaces and drained exactly once
/// per tick on the owner thread, before interpreters step. The boundary
/// acknowledges optimistically; the mutation becomes visible at the next
/// drain, never mid-step.
#[derive(Clone, Debug, PartialEq)]
pub enum DirectorCommand {
    SetMode(Mode),
    SetVjMode(VjMode),
    SetVenue(Venue),
    SetTheme(Theme),
    SetHype(f32),
    SetHypeLimiter(bool),
    SetManualDimmer(f32),
    DeployHype,
    Shift,
    ShiftLightingOnly,
    ShiftVjOnly,
}

/// Hype window status, computed purely from elapsed time since the deploy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HypeStatus {
    pub active: bool,
    pub remaining: f64,
}

impl HypeStatus {
    pub const INACTIVE: HypeStatus = HypeStatus {
        active: false,
        remaining: 0.0,
    };
}

/// Read-only snapshot the director publishes once per tick for boundary
/// queries, so no external context ever touches live director state.
#[derive(Clone, Debug)]
pub struct DirectorStatus {
    pub venue: Venue,
    pub mode: Mode,
    pub vj_mode: VjMode,
    pub theme: &'static str,
    pub hype: f32,
    pub hype_limiter: bool,
    pub manual_dimmer: f32,
    pub shift_count: u64,
    pub hype_status: HypeStatus,
    pub tick_time: f64,
}

/// Tunable director settings, persisted by the config manager.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    // General settings
    pub target_fps: f64,
    pub warmup_secs: f64,
    pub shift_after_secs: f64,
    pub hype_duration_secs: f64,
    pub command_queue_depth: usize,

    // Output settings (DMX/Art-Net)
    pub dmx_enabled: bool,
    pub dmx_broadcast: bool,
    pub dmx_source_ip: String,
    pub dmx_dest_ip: Option<String>,
    pub dmx_port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // General defaults
            target_fps: 44.0,
            warmup_secs: 30.0,
            shift_after_secs: 60.0,
            hype_duration_secs: 8.0,
            command_queue_depth: 64,

            // Output defaults
            dmx_enabled: true,
            dmx_broadcast: true,
            dmx_source_ip: "0.0.0.0".to_string(),
            dmx_dest_ip: None,
            dmx_port: 6454,
        }
    }
}
