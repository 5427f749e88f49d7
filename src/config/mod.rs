#[cfg(feature = "cli")]
pub mod cli;
pub mod settings;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CleanArg, CliCommand, CliConfig};
pub use settings::{PackagerSettings, ProjectMetadata, TargetPlatform};
pub use toml_config::TomlConfig;
