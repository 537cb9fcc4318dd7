pub mod args;
pub mod logging;
pub mod repl;
pub mod terminal;

pub use args::{Cli, Mode, Overrides};
pub use terminal::{TerminalDisplay, TerminalTrigger};
