use std::f64::consts::PI;
use std::fmt;

use nocturne_fixtures::{ChannelType, Fixture, FixtureGroup};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

use crate::color::{Color, ColorScheme};
use crate::interpreter::{Interpreter, InterpreterArgs, InterpreterRegistry, SignalSwitch};
use crate::mode::Mode;
use crate::signal::{Frame, Signal};

/// The built-in interpreter roster: per-mode candidate tables scored by
/// hype. Selection picks uniformly among candidates admitted by the args
/// bounds (and the rainbow gate); if the window admits nothing, it falls
/// back to the candidate closest to the requested hype rather than failing.
pub struct Repertoire;

struct Candidate {
    score: f32,
    rainbow: bool,
    build: fn() -> Box<dyn Interpreter>,
}

const fn candidate(score: f32, rainbow: bool, build: fn() -> Box<dyn Interpreter>) -> Candidate {
    Candidate { score, rainbow, build }
}

fn roster(mode: Mode) -> &'static [Candidate] {
    static BLACKOUT: [Candidate; 1] = [candidate(0.0, false, || Box::new(Dark))];
    static GENTLE: [Candidate; 3] = [
        candidate(10.0, false, || Box::new(SteadyGlow)),
        candidate(40.0, false, || Box::new(SignalReactor::new())),
        candidate(50.0, false, || Box::new(ColorPulse)),
    ];
    static RAVE: [Candidate; 5] = [
        candidate(40.0, false, || Box::new(SignalReactor::new())),
        candidate(50.0, false, || Box::new(ColorPulse)),
        candidate(55.0, false, || Box::new(MoverSweep)),
        candidate(70.0, true, || Box::new(RainbowSweep)),
        candidate(85.0, false, || Box::new(StrobeBurst)),
    ];
    match mode {
        Mode::Blackout => &BLACKOUT,
        Mode::Gentle => &GENTLE,
        Mode::Rave => &RAVE,
    }
}

impl InterpreterRegistry for Repertoire {
    fn interpreter_for(
        &self,
        mode: Mode,
        _group: &FixtureGroup,
        args: &InterpreterArgs,
        rng: &mut StdRng,
    ) -> Box<dyn Interpreter> {
        let candidates = roster(mode);
        let eligible: Vec<&Candidate> = candidates
            .iter()
            .filter(|c| args.admits(c.score) && (!c.rainbow || args.allow_rainbows))
            .collect();

        if let Some(chosen) = eligible.choose(rng) {
            return (chosen.build)();
        }

        // Nothing inside the hype window; take the closest admissible
        // candidate so regeneration always yields a full interpreter list.
        let fallback = candidates
            .iter()
            .filter(|c| !c.rainbow || args.allow_rainbows)
            .min_by(|a, b| {
                let da = (a.score - args.hype).abs();
                let db = (b.score - args.hype).abs();
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            });
        match fallback {
            Some(c) => (c.build)(),
            None => Box::new(Dark),
        }
    }
}

fn set_color(fixture: &mut Fixture, color: Color) {
    let (r, g, b) = color.to_bytes();
    fixture.set_channel(&ChannelType::Red, r);
    fixture.set_channel(&ChannelType::Green, g);
    fixture.set_channel(&ChannelType::Blue, b);
}

fn dimmer_byte(level: f32) -> u8 {
    (level.clamp(0.0, 1.0) * 255.0) as u8
}

/// Blackout: leave the per-tick accumulator reset in place and latch colors
/// to black.
struct Dark;

impl Interpreter for Dark {
    fn step(&mut self, fixtures: &mut [Fixture], _frame: &Frame, _scheme: &ColorScheme) {
        for fixture in fixtures {
            set_color(fixture, Color::BLACK);
        }
    }
}

impl fmt::Display for Dark {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Dark")
    }
}

/// Low-energy wash: background color with a slow breathing dimmer.
struct SteadyGlow;

impl Interpreter for SteadyGlow {
    fn step(&mut self, fixtures: &mut [Fixture], frame: &Frame, scheme: &ColorScheme) {
        let breath = ((frame.time * 2.0 * PI / 8.0).sin() * 0.5 + 0.5) as f32;
        let level = 0.2 + 0.3 * breath;
        for fixture in fixtures {
            set_color(fixture, scheme.background);
            fixture.blend_channel(&ChannelType::Dimmer, dimmer_byte(level));
        }
    }
}

impl fmt::Display for SteadyGlow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SteadyGlow")
    }
}

/// Dimmer follows the strongest of its enabled signals; foreground color.
/// This is the signal-switch-capable member of the roster, so coverage
/// repair lands here.
struct SignalReactor {
    enabled: [bool; Signal::COUNT],
}

impl SignalReactor {
    fn new() -> Self {
        let mut enabled = [false; Signal::COUNT];
        enabled[Signal::FreqAll as usize] = true;
        SignalReactor { enabled }
    }
}

impl Interpreter for SignalReactor {
    fn step(&mut self, fixtures: &mut [Fixture], frame: &Frame, scheme: &ColorScheme) {
        let mut level: f32 = 0.0;
        for signal in Signal::ALL {
            if self.enabled[signal as usize] {
                level = level.max(frame[signal]);
            }
        }
        for fixture in fixtures {
            set_color(fixture, scheme.foreground);
            fixture.blend_channel(&ChannelType::Dimmer, dimmer_byte(level));
        }
    }

    fn exit(&mut self, fixtures: &mut [Fixture], _frame: &Frame, _scheme: &ColorScheme) {
        for fixture in fixtures {
            fixture.blend_channel(&ChannelType::Dimmer, 0);
        }
    }

    fn signal_switch(&self) -> Option<&dyn SignalSwitch> {
        Some(self)
    }

    fn signal_switch_mut(&mut self) -> Option<&mut dyn SignalSwitch> {
        Some(self)
    }
}

impl SignalSwitch for SignalReactor {
    fn responds_to(&self, signal: Signal) -> bool {
        self.enabled[signal as usize]
    }

    fn set_enabled(&mut self, signal: Signal, enabled: bool) {
        self.enabled[signal as usize] = enabled;
    }
}

impl fmt::Display for SignalReactor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names: Vec<&str> = Signal::ALL
            .into_iter()
            .filter(|s| self.enabled[*s as usize])
            .map(|s| s.name())
            .collect();
        write!(f, "SignalReactor[{}]", names.join(", "))
    }
}

/// Color blends background to foreground with low-frequency energy; dimmer
/// rides the full-band level.
struct ColorPulse;

impl Interpreter for ColorPulse {
    fn step(&mut self, fixtures: &mut [Fixture], frame: &Frame, scheme: &ColorScheme) {
        let color = Color::lerp(&scheme.background, &scheme.foreground, frame[Signal::FreqLow]);
        let level = 0.3 + 0.7 * frame[Signal::FreqAll];
        for fixture in fixtures {
            set_color(fixture, color);
            fixture.blend_channel(&ChannelType::Dimmer, dimmer_byte(level));
        }
    }
}

impl fmt::Display for ColorPulse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ColorPulse")
    }
}

/// Pan/tilt figure-eight with per-fixture phase offsets; dimmer follows the
/// high band so the movers read on hits.
struct MoverSweep;

impl Interpreter for MoverSweep {
    fn step(&mut self, fixtures: &mut [Fixture], frame: &Frame, scheme: &ColorScheme) {
        for (idx, fixture) in fixtures.iter_mut().enumerate() {
            let phase = frame.time * 2.0 * PI / 6.0 + idx as f64 * PI / 4.0;
            let pan = (phase.sin() * 0.5 + 0.5) * 255.0;
            let tilt = ((phase * 2.0).cos() * 0.35 + 0.5) * 255.0;
            fixture.set_channel(&ChannelType::Pan, pan as u8);
            fixture.set_channel(&ChannelType::Tilt, tilt as u8);
            set_color(fixture, scheme.background_contrast);
            fixture.blend_channel(&ChannelType::Dimmer, dimmer_byte(frame[Signal::FreqHigh]));
        }
    }
}

impl fmt::Display for MoverSweep {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MoverSweep")
    }
}

/// Hue wheel distributed across the group, gated behind themes that allow
/// rainbows.
struct RainbowSweep;

impl Interpreter for RainbowSweep {
    fn step(&mut self, fixtures: &mut [Fixture], frame: &Frame, _scheme: &ColorScheme) {
        let count = fixtures.len().max(1) as f32;
        for (idx, fixture) in fixtures.iter_mut().enumerate() {
            let hue = (frame.time / 12.0) as f32 + idx as f32 / count;
            set_color(fixture, Color::from_hue(hue));
            fixture.blend_channel(
                &ChannelType::Dimmer,
                dimmer_byte(0.4 + 0.6 * frame[Signal::FreqAll]),
            );
        }
    }
}

impl fmt::Display for RainbowSweep {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "RainbowSweep")
    }
}

/// Full-intensity strobe hits on the strobe signal, white flood on drops.
struct StrobeBurst;

impl Interpreter for StrobeBurst {
    fn step(&mut self, fixtures: &mut [Fixture], frame: &Frame, scheme: &ColorScheme) {
        let strobe = dimmer_byte(frame[Signal::Strobe]);
        let flood = dimmer_byte(frame[Signal::Drop]);
        for fixture in fixtures {
            set_color(fixture, scheme.foreground);
            fixture.blend_channel(&ChannelType::Strobe, strobe);
            fixture.blend_channel(&ChannelType::Dimmer, flood);
        }
    }

    fn exit(&mut self, fixtures: &mut [Fixture], _frame: &Frame, _scheme: &ColorScheme) {
        for fixture in fixtures {
            fixture.set_channel(&ChannelType::Strobe, 0);
        }
    }
}

impl fmt::Display for StrobeBurst {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "StrobeBurst")
    }
}
