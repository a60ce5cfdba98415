pub use color::{Color, ColorScheme};
pub use config::{ConfigError, ConfigManager};
pub use director::Director;
pub use dmx::{ArtNetMode, ArtNetOutput, DmxOutput, UniverseBuffer, UNIVERSE_SIZE};
pub use error::InvalidSelector;
pub use handle::{parse_venue, DirectorHandle};
pub use interpreter::repertoire::Repertoire;
pub use interpreter::{Interpreter, InterpreterArgs, InterpreterRegistry, SignalSwitch};
pub use lerp::LerpAnimator;
pub use messages::{DirectorCommand, DirectorStatus, HypeStatus, Settings};
pub use mode::{Mode, VjMode};
pub use signal::{Frame, Signal};
pub use state::{State, StateEvent};
pub use theme::{builtin_themes, default_theme, Theme};
pub use visual::{HypeHandler, VisualLayer};

mod color;
mod config;
mod director;
mod dmx;
mod error;
mod handle;
mod interpreter;
mod lerp;
pub mod messages;
mod mode;
mod signal;
mod state;
mod theme;
mod visual;
