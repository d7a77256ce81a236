// Configuration module
// Public interface for settings, loading, and personas

mod loader;
mod persona;
mod settings;

pub use loader::load_config;
pub use persona::Persona;
pub use settings::{ApplicationConfig, Config, OracleConfig};
