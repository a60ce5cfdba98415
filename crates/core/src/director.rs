use std::collections::BTreeMap;
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver};
use nocturne_fixtures::{venue_patch, Fixture, FixtureGroup, FixtureKind, FixtureLibrary, PatchEntry};
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::color::ColorScheme;
use crate::dmx::DmxOutput;
use crate::handle::DirectorHandle;
use crate::interpreter::{Interpreter, InterpreterArgs, InterpreterRegistry};
use crate::lerp::LerpAnimator;
use crate::messages::{DirectorCommand, DirectorStatus, HypeStatus, Settings};
use crate::signal::{Frame, Signal};
use crate::state::{State, StateEvent};
use crate::visual::{HypeHandler, VisualLayer};

/// Color scheme transition window, seconds.
const SCHEME_FADE_SECS: f64 = 4.0;

/// Staggered per-group energy targets; cycled by group index so the rig
/// never runs every group at the same energy at once.
const HYPE_BUCKETS: [f32; 3] = [10.0, 40.0, 70.0];

/// How far interpreter selection may wander from live hype when the limiter
/// is on.
const HYPE_WINDOW: f32 = 30.0;

/// A scheduled shift waits until the sustained-low signal drops below this,
/// so it never lands mid-cue.
const SUSTAINED_LOW_GATE: f32 = 0.2;

/// Kinds clustered into groups, in priority order. Kinds outside this list
/// still get trailing groups of their own rather than being dropped from
/// interpreter control.
const GROUP_PRIORITY: [FixtureKind; 6] = [
    FixtureKind::Par,
    FixtureKind::MovingHead,
    FixtureKind::MotionStrip,
    FixtureKind::Laser,
    FixtureKind::Rotosphere,
    FixtureKind::Derby,
];

/// Orchestrates the rig: owns the fixture groups, the live interpreter list,
/// the color scheme animator and the show state. All mutation happens on the
/// owner thread driving `step`/`render`; external requests arrive through
/// the bounded command queue and are drained once per tick, before anything
/// steps.
pub struct Director {
    state: State,
    settings: Settings,
    registry: Box<dyn InterpreterRegistry>,
    visual: Option<Box<dyn VisualLayer>>,
    hype_handler: Option<Box<dyn HypeHandler>>,

    groups: Vec<FixtureGroup>,
    manual_groups: Vec<FixtureGroup>,
    interpreters: Vec<Box<dyn Interpreter>>,
    scheme: LerpAnimator,

    rng: StdRng,
    commands: Receiver<DirectorCommand>,
    status: Arc<RwLock<DirectorStatus>>,

    start_time: Option<f64>,
    last_shift_time: f64,
    shift_count: u64,
    warmup_complete: bool,
    hype_deployed_at: Option<f64>,
    last_frame: Option<Frame>,
}

impl Director {
    pub fn new(
        state: State,
        registry: Box<dyn InterpreterRegistry>,
        settings: Settings,
        mut rng: StdRng,
    ) -> (Self, DirectorHandle) {
        let (tx, rx) = bounded(settings.command_queue_depth.max(1));

        let initial_scheme = state
            .theme
            .schemes()
            .choose(&mut rng)
            .copied()
            .unwrap_or_default();

        let status = Arc::new(RwLock::new(DirectorStatus {
            venue: state.venue,
            mode: state.mode,
            vj_mode: state.vj_mode,
            theme: state.theme.name(),
            hype: state.hype,
            hype_limiter: state.hype_limiter,
            manual_dimmer: state.manual_dimmer,
            shift_count: 0,
            hype_status: HypeStatus::INACTIVE,
            tick_time: 0.0,
        }));
        let handle = DirectorHandle::new(tx, status.clone());

        let mut director = Director {
            state,
            settings,
            registry,
            visual: None,
            hype_handler: None,
            groups: Vec::new(),
            manual_groups: Vec::new(),
            interpreters: Vec::new(),
            scheme: LerpAnimator::new(initial_scheme, SCHEME_FADE_SECS),
            rng,
            commands: rx,
            status,
            start_time: None,
            last_shift_time: 0.0,
            shift_count: 0,
            warmup_complete: false,
            hype_deployed_at: None,
            last_frame: None,
        };

        director.setup_patch(0.0);
        director.generate_color_scheme(0.0);
        (director, handle)
    }

    pub fn with_visual(mut self, visual: Box<dyn VisualLayer>) -> Self {
        self.visual = Some(visual);
        self
    }

    pub fn with_hype_handler(mut self, handler: Box<dyn HypeHandler>) -> Self {
        self.hype_handler = Some(handler);
        self
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn shift_count(&self) -> u64 {
        self.shift_count
    }

    pub fn groups(&self) -> &[FixtureGroup] {
        &self.groups
    }

    pub fn interpreters(&self) -> &[Box<dyn Interpreter>] {
        &self.interpreters
    }

    /// Rebuild groups from the venue patch and regenerate everything.
    /// Destructive: interpreters tied to the old groups are discarded.
    fn setup_patch(&mut self, now: f64) {
        let library = FixtureLibrary::new();
        let patch = venue_patch(self.state.venue, &library);
        self.apply_patch(patch, now);
    }

    fn apply_patch(&mut self, patch: Vec<PatchEntry>, now: f64) {
        let (groups, manual_groups) = group_fixtures(patch);
        self.groups = groups;
        self.manual_groups = manual_groups;
        self.generate_all(now);
    }

    fn interpreter_args(&self, hype: f32) -> InterpreterArgs {
        let (hype_min, hype_max) = if self.state.hype_limiter {
            (
                (self.state.hype - HYPE_WINDOW).max(0.0),
                (self.state.hype + HYPE_WINDOW).min(100.0),
            )
        } else {
            (0.0, 100.0)
        };
        InterpreterArgs {
            hype,
            allow_rainbows: self.state.theme.allow_rainbows,
            hype_min,
            hype_max,
        }
    }

    /// Regenerate interpreters for lighting only; replaces the whole list
    /// and re-establishes the length and coverage invariants.
    fn generate_interpreters(&mut self) {
        let mut interpreters: Vec<Box<dyn Interpreter>> = Vec::with_capacity(self.groups.len());
        for (idx, group) in self.groups.iter().enumerate() {
            let args = self.interpreter_args(HYPE_BUCKETS[idx % HYPE_BUCKETS.len()]);
            interpreters.push(
                self.registry
                    .interpreter_for(self.state.mode, group, &args, &mut self.rng),
            );
        }
        self.interpreters = interpreters;
        self.ensure_each_signal_is_covered();
    }

    /// Regenerate both lighting interpreters and the visual layer.
    fn generate_all(&mut self, _now: f64) {
        self.generate_interpreters();
        if let Some(visual) = &mut self.visual {
            visual.shift(self.state.vj_mode, 1.0);
        }
        log::info!(
            "{}",
            self.lighting_tree(&format!("after initialization to {}", self.state.mode))
        );
    }

    /// Replace the whole interpolation target with a fresh candidate.
    fn generate_color_scheme(&mut self, now: f64) {
        let candidate = self.state.theme.schemes().choose(&mut self.rng).copied();
        if let Some(scheme) = candidate {
            self.scheme.push(scheme, now);
            log::info!("shifting palette to {}", scheme);
        }
    }

    /// Splice one random axis of a fresh candidate into the currently
    /// rendered scheme; visually subtler than a full replacement.
    fn shift_color_scheme(&mut self, now: f64) {
        let candidate = self.state.theme.schemes().choose(&mut self.rng).copied();
        let Some(candidate) = candidate else {
            return;
        };
        let mut colors = self.scheme.render(now).as_array();
        let axis = self.rng.random_range(0..ColorScheme::AXES);
        colors[axis] = candidate.as_array()[axis];
        let spliced = ColorScheme::from_array(colors);
        self.scheme.push(spliced, now);
        log::info!("shifting palette to {}", spliced);
    }

    /// Reshuffle a single randomly-chosen group so the whole rig doesn't
    /// change character at once. Bounds come from the live hype value, not
    /// the bucket cycle.
    pub fn shift_interpreter(&mut self) {
        if self.interpreters.is_empty() {
            return;
        }
        let eviction_index = self.rng.random_range(0..self.interpreters.len());
        let args = self.interpreter_args(self.state.hype);
        self.interpreters[eviction_index] = self.registry.interpreter_for(
            self.state.mode,
            &self.groups[eviction_index],
            &args,
            &mut self.rng,
        );
    }

    /// Invariant repair: every signal must be handled by at least one
    /// signal-switch-capable interpreter. No-op when none exposes the
    /// capability.
    fn ensure_each_signal_is_covered(&mut self) {
        let switches: Vec<usize> = self
            .interpreters
            .iter()
            .enumerate()
            .filter(|(_, i)| i.signal_switch().is_some())
            .map(|(idx, _)| idx)
            .collect();
        if switches.is_empty() {
            return;
        }

        for signal in Signal::ALL {
            let covered = switches.iter().any(|&idx| {
                self.interpreters[idx]
                    .signal_switch()
                    .is_some_and(|s| s.responds_to(signal))
            });
            if covered {
                continue;
            }
            if let Some(&chosen) = switches.choose(&mut self.rng) {
                if let Some(switch) = self.interpreters[chosen].signal_switch_mut() {
                    switch.set_enabled(signal, true);
                }
            }
        }
    }

    /// Combined shift: partial color change plus a single-group reshuffle.
    pub fn shift(&mut self, now: f64) {
        self.shift_color_scheme(now);
        self.shift_interpreter();
        self.ensure_each_signal_is_covered();
        if let Some(visual) = &mut self.visual {
            visual.shift(self.state.vj_mode, 0.3);
        }
        self.last_shift_time = now;
        self.shift_count += 1;
        log::info!(
            "{}",
            self.lighting_tree(&format!(
                "after shift #{} in {}",
                self.shift_count, self.state.mode
            ))
        );
    }

    /// Full shift of the lighting rig only; does not touch the visual layer.
    pub fn shift_lighting_only(&mut self, now: f64) {
        self.generate_color_scheme(now);
        self.generate_interpreters();
        self.last_shift_time = now;
        self.shift_count += 1;
        log::info!(
            "{}",
            self.lighting_tree(&format!(
                "after shift #{} in {}",
                self.shift_count, self.state.mode
            ))
        );
    }

    /// Full regeneration of the visual layer only; lighting is untouched.
    pub fn shift_vj_only(&mut self) {
        if let Some(visual) = &mut self.visual {
            visual.shift(self.state.vj_mode, 1.0);
        }
    }

    /// One-shot boosted pulse: forward the most recent frame to the
    /// mode-specific handler and open the active window.
    pub fn deploy_hype(&mut self) {
        let Some(frame) = self.last_frame.clone() else {
            log::warn!("hype deploy before first frame, ignored");
            return;
        };
        if let Some(handler) = &mut self.hype_handler {
            handler.deploy(self.state.mode, &frame);
        }
        self.hype_deployed_at = Some(frame.time);
        log::info!("hype deployed at t={:.1}", frame.time);
    }

    /// Pure status query; no side effects.
    pub fn hype_status(&self, now: f64) -> HypeStatus {
        match self.hype_deployed_at {
            Some(deployed) if now - deployed < self.settings.hype_duration_secs => HypeStatus {
                active: true,
                remaining: self.settings.hype_duration_secs - (now - deployed),
            },
            _ => HypeStatus::INACTIVE,
        }
    }

    /// Mode changes affect lighting character only: regenerate interpreters
    /// for the new mode, leave the palette and the visual layer alone.
    pub fn on_mode_change(&mut self, mode: crate::mode::Mode) {
        log::info!("mode changed to {}", mode);
        self.generate_interpreters();
        log::info!(
            "{}",
            self.lighting_tree(&format!("after mode change to {}", mode))
        );
    }

    fn dispatch(&mut self, event: StateEvent, now: f64) {
        match event {
            StateEvent::ModeChanged(mode) => self.on_mode_change(mode),
            StateEvent::VenueChanged(venue) => {
                log::info!("venue changed to {}", venue);
                self.setup_patch(now);
            }
            StateEvent::ThemeChanged => self.generate_color_scheme(now),
            StateEvent::VjModeChanged(vj_mode) => {
                log::info!("vj mode changed to {}", vj_mode);
            }
        }
    }

    /// Drain the command queue fully, before anything steps. This is the
    /// only place external requests become visible, guaranteeing at most one
    /// state version per tick and no mutation mid-step.
    fn drain_commands(&mut self, now: f64) {
        while let Ok(command) = self.commands.try_recv() {
            match command {
                DirectorCommand::DeployHype => self.deploy_hype(),
                DirectorCommand::Shift => self.shift(now),
                DirectorCommand::ShiftLightingOnly => self.shift_lighting_only(now),
                DirectorCommand::ShiftVjOnly => self.shift_vj_only(),
                other => {
                    for event in self.state.apply(other) {
                        self.dispatch(event, now);
                    }
                }
            }
        }
    }

    pub fn step(&mut self, frame: &Frame) {
        if self.start_time.is_none() {
            self.start_time = Some(frame.time);
            self.last_shift_time = frame.time;
        }
        self.last_frame = Some(frame.clone());

        self.drain_commands(frame.time);

        let scheme = self.scheme.render(frame.time);
        let start_time = self.start_time.unwrap_or(frame.time);
        let run_time = frame.time - start_time;
        let warmup_phase = if self.settings.warmup_secs > 0.0 {
            (run_time / self.settings.warmup_secs).min(1.0) as f32
        } else {
            1.0
        };
        if warmup_phase >= 1.0 && !self.warmup_complete {
            self.warmup_complete = true;
            log::info!("warmup phase complete");
        }
        let frame = frame.clone() * warmup_phase;

        // Accumulators reset before interpreters step, so overlapping
        // writes combine via max() instead of overwriting.
        for group in self.groups.iter_mut().chain(self.manual_groups.iter_mut()) {
            for fixture in group.fixtures_mut() {
                fixture.begin();
            }
        }

        for (interpreter, group) in self.interpreters.iter_mut().zip(self.groups.iter_mut()) {
            interpreter.step(group.fixtures_mut(), &frame, &scheme);
        }

        if let Some(visual) = &mut self.visual {
            visual.step(&frame, &scheme);
        }

        if frame.time - self.last_shift_time > self.settings.shift_after_secs
            && frame[Signal::SustainedLow] < SUSTAINED_LOW_GATE
        {
            for (interpreter, group) in self.interpreters.iter_mut().zip(self.groups.iter_mut()) {
                interpreter.exit(group.fixtures_mut(), &frame, &scheme);
            }
            self.shift(frame.time);
        }

        self.publish_status(frame.time);
    }

    /// Flush finalized channel values to the device. Submission failures are
    /// the device layer's to recover; the tick loop carries on.
    pub fn render(&mut self, dmx: &mut dyn DmxOutput) {
        let manual_dimmer = self.state.manual_dimmer;
        for group in &mut self.manual_groups {
            group.set_manual_dimmer(manual_dimmer);
            for fixture in group.fixtures() {
                dmx.stage(fixture.universe, fixture.start_address, &fixture.dmx_values());
            }
        }
        for group in &self.groups {
            for fixture in group.fixtures() {
                dmx.stage(fixture.universe, fixture.start_address, &fixture.dmx_values());
            }
        }
        if let Err(e) = dmx.submit() {
            log::error!("dmx submit failed, retrying next tick: {:#}", e);
        }
    }

    fn publish_status(&self, now: f64) {
        *self.status.write() = DirectorStatus {
            venue: self.state.venue,
            mode: self.state.mode,
            vj_mode: self.state.vj_mode,
            theme: self.state.theme.name(),
            hype: self.state.hype,
            hype_limiter: self.state.hype_limiter,
            manual_dimmer: self.state.manual_dimmer,
            shift_count: self.shift_count,
            hype_status: self.hype_status(now),
            tick_time: now,
        };
    }

    /// Diagnostic dump: one line per active interpreter with its bound
    /// fixtures coalesced by model and address.
    pub fn lighting_tree(&self, context: &str) -> String {
        let mut out = String::from("lighting tree");
        if !context.is_empty() {
            out.push_str(&format!(" ({})", context));
        }
        out.push_str(":\n");

        if self.interpreters.is_empty() {
            out.push_str("`-- (no interpreters)\n");
            return out;
        }

        for (idx, (interpreter, group)) in self
            .interpreters
            .iter()
            .zip(self.groups.iter())
            .enumerate()
        {
            let connector = if idx == self.interpreters.len() - 1 {
                "`-- "
            } else {
                "|-- "
            };
            out.push_str(&format!(
                "{}{} [{}]\n",
                connector,
                format_fixture_names(group.fixtures()),
                interpreter
            ));
        }
        out
    }
}

/// Partition a venue patch into interpreted groups and manual groups.
/// Explicit non-manual groups come first in patch order; loose fixtures are
/// clustered by kind in priority order, then any remaining kinds get
/// trailing groups so nothing is silently dropped.
fn group_fixtures(patch: Vec<PatchEntry>) -> (Vec<FixtureGroup>, Vec<FixtureGroup>) {
    let mut groups = Vec::new();
    let mut manual_groups = Vec::new();
    let mut loose: Vec<Fixture> = Vec::new();

    for entry in patch {
        match entry {
            PatchEntry::Group(group) if group.is_manual() => manual_groups.push(group),
            PatchEntry::Group(group) => groups.push(group),
            PatchEntry::Single(fixture) => loose.push(fixture),
        }
    }

    let mut cluster = |loose: &mut Vec<Fixture>, kind: FixtureKind| {
        let (mine, rest): (Vec<Fixture>, Vec<Fixture>) =
            loose.drain(..).partition(|f| f.kind() == kind);
        *loose = rest;
        if !mine.is_empty() {
            groups.push(FixtureGroup::new(kind.display_name(), mine));
        }
    };

    for kind in GROUP_PRIORITY {
        cluster(&mut loose, kind);
    }
    for kind in FixtureKind::ALL {
        if !GROUP_PRIORITY.contains(&kind) {
            cluster(&mut loose, kind);
        }
    }

    (groups, manual_groups)
}

/// "Model @ a1, a2; Other Model @ a3" — fixtures coalesced by model with
/// sorted address lists.
fn format_fixture_names(fixtures: &[Fixture]) -> String {
    if fixtures.len() == 1 {
        return fixtures[0].to_string();
    }

    let mut by_model: BTreeMap<&str, Vec<u16>> = BTreeMap::new();
    for fixture in fixtures {
        by_model
            .entry(fixture.profile.model.as_str())
            .or_default()
            .push(fixture.start_address);
    }

    let mut parts = Vec::new();
    for (model, mut addresses) in by_model {
        addresses.sort_unstable();
        let list: Vec<String> = addresses.iter().map(|a| a.to_string()).collect();
        parts.push(format!("{} @ {}", model, list.join(", ")));
    }
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use std::fmt;
    use std::sync::Arc;

    use approx::assert_relative_eq;
    use nocturne_fixtures::{ChannelType, Venue};
    use parking_lot::Mutex;
    use rand::SeedableRng;

    use crate::interpreter::repertoire::Repertoire;
    use crate::interpreter::SignalSwitch;
    use crate::mode::{Mode, VjMode};
    use crate::visual::VisualLayer;

    use super::*;

    /// Signal-switch-capable test interpreter with every signal disabled by
    /// default, so coverage repair is observable. Optionally records the
    /// freq_all intensity it is stepped with.
    struct TestSwitch {
        enabled: [bool; Signal::COUNT],
        seen: Option<Arc<Mutex<Vec<f32>>>>,
    }

    impl Interpreter for TestSwitch {
        fn step(&mut self, _fixtures: &mut [Fixture], frame: &Frame, _scheme: &ColorScheme) {
            if let Some(seen) = &self.seen {
                seen.lock().push(frame[Signal::FreqAll]);
            }
        }

        fn signal_switch(&self) -> Option<&dyn SignalSwitch> {
            Some(self)
        }

        fn signal_switch_mut(&mut self) -> Option<&mut dyn SignalSwitch> {
            Some(self)
        }
    }

    impl SignalSwitch for TestSwitch {
        fn responds_to(&self, signal: Signal) -> bool {
            self.enabled[signal as usize]
        }

        fn set_enabled(&mut self, signal: Signal, enabled: bool) {
            self.enabled[signal as usize] = enabled;
        }
    }

    impl fmt::Display for TestSwitch {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "TestSwitch")
        }
    }

    #[derive(Default)]
    struct TestRegistry {
        seen: Option<Arc<Mutex<Vec<f32>>>>,
    }

    impl InterpreterRegistry for TestRegistry {
        fn interpreter_for(
            &self,
            _mode: Mode,
            _group: &FixtureGroup,
            _args: &InterpreterArgs,
            _rng: &mut StdRng,
        ) -> Box<dyn Interpreter> {
            Box::new(TestSwitch {
                enabled: [false; Signal::COUNT],
                seen: self.seen.clone(),
            })
        }
    }

    /// Records the thresholds passed to `shift`.
    struct TestVisual {
        shifts: Arc<Mutex<Vec<f32>>>,
    }

    impl VisualLayer for TestVisual {
        fn step(&mut self, _frame: &Frame, _scheme: &ColorScheme) {}

        fn shift(&mut self, _vj_mode: VjMode, threshold: f32) {
            self.shifts.lock().push(threshold);
        }
    }

    fn new_director(seed: u64) -> (Director, DirectorHandle) {
        Director::new(
            State::new(Venue::Studio),
            Box::new(TestRegistry::default()),
            Settings::default(),
            StdRng::seed_from_u64(seed),
        )
    }

    fn all_signals_covered(director: &Director) -> bool {
        Signal::ALL.into_iter().all(|signal| {
            director.interpreters().iter().any(|i| {
                i.signal_switch()
                    .is_some_and(|switch| switch.responds_to(signal))
            })
        })
    }

    fn interpreter_ptrs(director: &Director) -> Vec<*const ()> {
        director
            .interpreters()
            .iter()
            .map(|b| &**b as *const dyn Interpreter as *const ())
            .collect()
    }

    #[test]
    fn test_interpreter_count_matches_groups_for_all_modes_and_venues() {
        for venue in Venue::ALL {
            for mode in Mode::ALL {
                let mut state = State::new(venue);
                state.mode = mode;
                let (director, _handle) = Director::new(
                    state,
                    Box::new(Repertoire),
                    Settings::default(),
                    StdRng::seed_from_u64(42),
                );
                assert!(!director.groups().is_empty());
                assert_eq!(
                    director.interpreters().len(),
                    director.groups().len(),
                    "{:?}/{:?}",
                    venue,
                    mode
                );
            }
        }
    }

    #[test]
    fn test_every_signal_covered_across_randomized_shifts() {
        for seed in 0..30 {
            let (mut director, _handle) = new_director(seed);
            assert!(all_signals_covered(&director), "seed {} after init", seed);

            for round in 0..5 {
                director.shift(round as f64 * 70.0);
                assert!(
                    all_signals_covered(&director),
                    "seed {} after shift {}",
                    seed,
                    round
                );
            }
            director.shift_lighting_only(1000.0);
            assert!(all_signals_covered(&director), "seed {} after full shift", seed);
        }
    }

    #[test]
    fn test_coverage_guarantor_is_noop_without_switches() {
        // The blackout roster has no signal-switch interpreters.
        let mut state = State::new(Venue::Studio);
        state.mode = Mode::Blackout;
        let (mut director, _handle) = Director::new(
            state,
            Box::new(Repertoire),
            Settings::default(),
            StdRng::seed_from_u64(5),
        );
        director.shift(0.0);
        assert!(director
            .interpreters()
            .iter()
            .all(|i| i.signal_switch().is_none()));
    }

    #[test]
    fn test_no_scheduled_shift_while_sustained_low_holds() {
        let (mut director, _handle) = new_director(1);
        for tick in 0..=120 {
            let frame = Frame::with(tick as f64, &[(Signal::SustainedLow, 1.0)]);
            director.step(&frame);
        }
        assert_eq!(director.shift_count(), 0);
    }

    #[test]
    fn test_scheduled_shift_fires_once_gate_clears() {
        let (mut director, _handle) = new_director(2);
        director.step(&Frame::new(0.0));
        director.step(&Frame::new(61.0));
        assert_eq!(director.shift_count(), 1);

        // The timer reset; nearby ticks must not shift again.
        director.step(&Frame::new(61.5));
        director.step(&Frame::new(62.0));
        assert_eq!(director.shift_count(), 1);
    }

    #[test]
    fn test_scheduled_shift_waits_for_signal_drop() {
        let (mut director, _handle) = new_director(3);
        for tick in 0..=90 {
            let frame = Frame::with(tick as f64, &[(Signal::SustainedLow, 0.9)]);
            director.step(&frame);
        }
        assert_eq!(director.shift_count(), 0);

        // One tick after the cue releases, the shift lands.
        director.step(&Frame::new(91.0));
        assert_eq!(director.shift_count(), 1);
    }

    #[test]
    fn test_shift_interpreter_replaces_exactly_one() {
        let (mut director, _handle) = new_director(4);
        let before = interpreter_ptrs(&director);
        director.shift_interpreter();
        let after = interpreter_ptrs(&director);

        assert_eq!(before.len(), after.len());
        let changed = before
            .iter()
            .zip(after.iter())
            .filter(|(a, b)| a != b)
            .count();
        assert_eq!(changed, 1);
    }

    #[test]
    fn test_hype_window_boundaries() {
        let (mut director, _handle) = new_director(6);
        director.step(&Frame::new(10.0));
        director.deploy_hype();

        let status = director.hype_status(17.9);
        assert!(status.active);
        assert_relative_eq!(status.remaining, 0.1, epsilon = 1e-9);

        let status = director.hype_status(18.1);
        assert!(!status.active);
        assert_eq!(status.remaining, 0.0);
    }

    #[test]
    fn test_hype_deploy_is_deferred_to_drain() {
        let (mut director, handle) = new_director(7);
        director.step(&Frame::new(0.0));

        handle.deploy_hype();
        // Not visible until the next drain.
        assert!(!director.hype_status(0.0).active);

        director.step(&Frame::new(1.0));
        assert!(director.hype_status(1.0).active);
        assert!(handle.hype_status().active);
    }

    #[test]
    fn test_manual_dimmer_commands_clamp_and_reach_fixtures() {
        let (mut director, handle) = new_director(8);

        handle.set_manual_dimmer(1.7);
        director.step(&Frame::new(0.0));
        assert_eq!(director.state().manual_dimmer, 1.0);

        let mut buffer = crate::dmx::UniverseBuffer::new();
        director.render(&mut buffer);
        let manual = &director.manual_groups[0];
        let fixture = &manual.fixtures()[0];
        let dimmer_offset = fixture
            .channels
            .iter()
            .position(|c| c.channel_type == ChannelType::Dimmer)
            .unwrap() as u16;
        assert_eq!(
            buffer.channel(fixture.universe, fixture.start_address + dimmer_offset),
            255
        );

        handle.set_manual_dimmer(-0.5);
        director.step(&Frame::new(1.0));
        assert_eq!(director.state().manual_dimmer, 0.0);
    }

    #[test]
    fn test_mode_change_applies_at_drain_and_regenerates() {
        let mut state = State::new(Venue::Studio);
        state.mode = Mode::Rave;
        let (mut director, handle) = Director::new(
            state,
            Box::new(Repertoire),
            Settings::default(),
            StdRng::seed_from_u64(9),
        );

        handle.set_mode("blackout").unwrap();
        assert!(director
            .interpreters()
            .iter()
            .all(|i| i.to_string() != "Dark"));

        director.step(&Frame::new(0.0));
        assert!(director
            .interpreters()
            .iter()
            .all(|i| i.to_string() == "Dark"));
        assert_eq!(director.state().mode, Mode::Blackout);
    }

    #[test]
    fn test_visual_shift_thresholds() {
        let shifts = Arc::new(Mutex::new(Vec::new()));
        let (director, _handle) = new_director(10);
        let mut director = director.with_visual(Box::new(TestVisual {
            shifts: shifts.clone(),
        }));

        director.shift_vj_only();
        assert_eq!(*shifts.lock(), vec![1.0]);

        director.shift(0.0);
        assert_eq!(*shifts.lock(), vec![1.0, 0.3]);

        // Lighting-only shift leaves the visual layer alone.
        director.shift_lighting_only(1.0);
        assert_eq!(*shifts.lock(), vec![1.0, 0.3]);

        // Mode changes touch lighting character only.
        director.on_mode_change(Mode::Rave);
        assert_eq!(*shifts.lock(), vec![1.0, 0.3]);
    }

    #[test]
    fn test_warmup_ramp_scales_frames() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let registry = TestRegistry {
            seen: Some(seen.clone()),
        };
        let (mut director, _handle) = Director::new(
            State::new(Venue::BlackBox),
            Box::new(registry),
            Settings::default(),
            StdRng::seed_from_u64(11),
        );

        for time in [0.0, 15.0, 30.0, 45.0] {
            director.step(&Frame::with(time, &[(Signal::FreqAll, 1.0)]));
        }

        let seen = seen.lock();
        let groups = director.groups().len();
        assert!(groups > 0);
        // One recording per interpreter per tick; check the first group's.
        let per_tick: Vec<f32> = seen.chunks(groups).map(|chunk| chunk[0]).collect();
        assert_relative_eq!(per_tick[0], 0.0, epsilon = 1e-6);
        assert_relative_eq!(per_tick[1], 0.5, epsilon = 1e-6);
        assert_relative_eq!(per_tick[2], 1.0, epsilon = 1e-6);
        assert_relative_eq!(per_tick[3], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_empty_patch_is_a_noop() {
        let (mut director, _handle) = new_director(12);
        director.apply_patch(Vec::new(), 0.0);
        assert!(director.interpreters().is_empty());

        director.step(&Frame::new(0.0));
        let mut buffer = crate::dmx::UniverseBuffer::new();
        director.render(&mut buffer);
        assert!(director.lighting_tree("").contains("(no interpreters)"));
    }

    #[test]
    fn test_device_failure_does_not_break_the_loop() {
        struct FailingDmx;

        impl DmxOutput for FailingDmx {
            fn stage(&mut self, _universe: u8, _start_address: u16, _values: &[u8]) {}

            fn submit(&mut self) -> anyhow::Result<()> {
                Err(anyhow::anyhow!("wire unplugged"))
            }
        }

        let (mut director, _handle) = new_director(13);
        director.step(&Frame::new(0.0));
        director.render(&mut FailingDmx);
        // Next tick proceeds normally.
        director.step(&Frame::new(1.0));
    }

    #[test]
    fn test_venue_change_rebuilds_groups() {
        let (mut director, handle) = new_director(14);
        let studio_groups = director.groups().len();

        handle.set_venue("warehouse").unwrap();
        director.step(&Frame::new(0.0));

        assert_eq!(director.state().venue, Venue::Warehouse);
        assert_ne!(director.groups().len(), studio_groups);
        assert_eq!(director.interpreters().len(), director.groups().len());
    }

    #[test]
    fn test_grouping_order_and_manual_exclusion() {
        let library = FixtureLibrary::new();
        let patch = venue_patch(Venue::Studio, &library);
        let (groups, manual) = group_fixtures(patch);

        let names: Vec<&str> = groups.iter().map(|g| g.name()).collect();
        assert_eq!(names, vec!["front wash", "moving head", "motion strip", "pinspot"]);
        assert_eq!(manual.len(), 1);
        assert_eq!(manual[0].name(), "booth wash");

        // Deterministic: regrouping the same patch yields the same order.
        let again = venue_patch(Venue::Studio, &library);
        let (groups2, _) = group_fixtures(again);
        let names2: Vec<&str> = groups2.iter().map(|g| g.name()).collect();
        assert_eq!(names, names2);
    }

    #[test]
    fn test_lighting_tree_shape() {
        let (director, _handle) = new_director(15);
        let tree = director.lighting_tree("after test");
        assert!(tree.starts_with("lighting tree (after test):"));
        assert!(tree.contains("|-- "));
        assert!(tree.ends_with("\n"));
        assert_eq!(
            tree.matches("`-- ").count(),
            1,
            "exactly one terminal connector"
        );
        assert!(tree.contains("TestSwitch"));
    }
}
