use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{AnalysisDefaults, Config, ProviderConfig};

/// Loads the application configuration from `config.toml`.
///
/// The file is optional: a missing file (or any missing section) yields the
/// built-in defaults, so the binary works out of the box.
pub fn load_config() -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name("config").required(false))
        .build()?;

    let config = builder.try_deserialize::<Config>()?;

    Ok(config)
}
