use crate::color::ColorScheme;
use crate::mode::{Mode, VjMode};
use crate::signal::Frame;

/// Visual-layer collaborator stepped alongside the lighting rig. `shift`
/// regenerates its content: threshold 1.0 means a complete regeneration,
/// lower values a subtler change.
pub trait VisualLayer {
    fn step(&mut self, frame: &Frame, scheme: &ColorScheme);
    fn shift(&mut self, vj_mode: VjMode, threshold: f32);
}

/// Mode-specific handler for the one-shot hype pulse. Receives the most
/// recent frame at deploy time.
pub trait HypeHandler {
    fn deploy(&mut self, mode: Mode, frame: &Frame);
}
