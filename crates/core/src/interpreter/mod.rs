use std::fmt;

use nocturne_fixtures::{Fixture, FixtureGroup};
use rand::rngs::StdRng;

use crate::color::ColorScheme;
use crate::mode::Mode;
use crate::signal::{Frame, Signal};

pub mod repertoire;

/// Bounds handed to interpreter construction. `hype` communicates current
/// show energy (0-100); `hype_min`/`hype_max` bound how far randomized
/// selection may wander from it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InterpreterArgs {
    pub hype: f32,
    pub allow_rainbows: bool,
    pub hype_min: f32,
    pub hype_max: f32,
}

impl InterpreterArgs {
    pub fn admits(&self, score: f32) -> bool {
        score >= self.hype_min && score <= self.hype_max
    }
}

/// Optional capability: an interpreter that can be told which signals to
/// react to. The coverage guarantor uses it to make sure every signal is
/// handled somewhere after a shift.
pub trait SignalSwitch {
    fn responds_to(&self, signal: Signal) -> bool;
    fn set_enabled(&mut self, signal: Signal, enabled: bool);
}

/// Stateful behavior bound to one fixture group for its lifetime. `step`
/// runs once per tick with the warmup-scaled frame and the current rendered
/// scheme; `exit` runs immediately before the interpreter is replaced.
pub trait Interpreter: fmt::Display {
    fn step(&mut self, fixtures: &mut [Fixture], frame: &Frame, scheme: &ColorScheme);

    fn exit(&mut self, _fixtures: &mut [Fixture], _frame: &Frame, _scheme: &ColorScheme) {}

    fn signal_switch(&self) -> Option<&dyn SignalSwitch> {
        None
    }

    fn signal_switch_mut(&mut self) -> Option<&mut dyn SignalSwitch> {
        None
    }
}

/// Factory selecting one interpreter for a fixture group under the current
/// mode. Concrete interpreters stay pluggable behind this seam; the director
/// only depends on the selection contract.
pub trait InterpreterRegistry {
    fn interpreter_for(
        &self,
        mode: Mode,
        group: &FixtureGroup,
        args: &InterpreterArgs,
        rng: &mut StdRng,
    ) -> Box<dyn Interpreter>;
}
