use crate::config::settings::PackagerSettings;
use crate::config::toml_config::{TomlConfig, DEFAULT_CONFIG_FILE};
use crate::core::packager::CleanTarget;
use crate::domain::model::Stage;
use crate::utils::error::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "jpackager")]
#[command(about = "Builds a jlink runtime image and a jpackage installer for a modular Java app")]
pub struct CliConfig {
    /// Path to the TOML configuration (default: <project-root>/packager.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory that relative paths in the configuration resolve against
    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,

    /// JDK installation providing jlink and jpackage
    #[arg(long)]
    pub java_home: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Log process CPU and memory after each stage
    #[arg(long)]
    pub monitor: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Download and extract the JavaFX modules if missing
    Fetch,
    /// Fetch, then build the runtime image with jlink
    Image,
    /// Fetch, build the runtime image, then build the installer with jpackage
    Package,
    /// Print the tool command lines without running anything
    Plan,
    /// Delete build outputs
    Clean {
        #[arg(value_enum, default_value = "all")]
        target: CleanArg,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CleanArg {
    Modules,
    Image,
    Installer,
    All,
}

impl From<CleanArg> for CleanTarget {
    fn from(arg: CleanArg) -> Self {
        match arg {
            CleanArg::Modules => CleanTarget::Modules,
            CleanArg::Image => CleanTarget::Image,
            CleanArg::Installer => CleanTarget::Installer,
            CleanArg::All => CleanTarget::All,
        }
    }
}

impl CliCommand {
    /// Last pipeline stage this command runs, if it runs the pipeline.
    pub fn final_stage(&self) -> Option<Stage> {
        match self {
            CliCommand::Fetch => Some(Stage::Fetch),
            CliCommand::Image => Some(Stage::Image),
            CliCommand::Package => Some(Stage::Installer),
            CliCommand::Plan | CliCommand::Clean { .. } => None,
        }
    }
}

impl CliConfig {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| self.project_root.join(DEFAULT_CONFIG_FILE))
    }

    /// Load the configuration file (explicit paths must exist) and resolve it.
    pub fn load_settings(&self) -> Result<PackagerSettings> {
        let config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::from_optional_file(self.config_path())?,
        };
        PackagerSettings::resolve(&config, &self.project_root, self.java_home.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_package_command() {
        let cli = CliConfig::parse_from([
            "jpackager",
            "--project-root",
            "/work",
            "--java-home",
            "/jdk",
            "-v",
            "package",
        ]);

        assert!(cli.verbose);
        assert_eq!(cli.command.final_stage(), Some(Stage::Installer));
        assert_eq!(cli.config_path(), PathBuf::from("/work/packager.toml"));
    }

    #[test]
    fn test_parse_clean_defaults_to_all() {
        let cli = CliConfig::parse_from(["jpackager", "clean"]);
        match cli.command {
            CliCommand::Clean { target } => assert_eq!(target, CleanArg::All),
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = CliConfig::parse_from(["jpackager", "clean", "image"]);
        assert!(matches!(
            cli.command,
            CliCommand::Clean {
                target: CleanArg::Image
            }
        ));
    }

    #[test]
    fn test_load_settings_without_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path().to_str().unwrap();
        let cli = CliConfig::parse_from([
            "jpackager",
            "--project-root",
            root,
            "--java-home",
            "/jdk",
            "fetch",
        ]);

        let settings = cli.load_settings().unwrap();
        assert_eq!(settings.java_home, PathBuf::from("/jdk"));
        assert_eq!(settings.jmods_dir, dir.path().join("app/build/jmods"));
    }

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        let cli = CliConfig::parse_from([
            "jpackager",
            "--config",
            "/definitely/missing/packager.toml",
            "--java-home",
            "/jdk",
            "fetch",
        ]);
        assert!(cli.load_settings().is_err());
    }
}
