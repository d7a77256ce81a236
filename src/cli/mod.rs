// CLI module
// Public interface for the argument surface and console output

mod args;
mod console;

pub use args::Args;
pub use console::ConsoleSink;
