//! Fully resolved packaging settings.
//!
//! [`TomlConfig`] holds what the user wrote; [`PackagerSettings`] holds
//! absolute paths and concrete values, and hands each stage the request it
//! needs.

use crate::config::toml_config::{ImageConfig, InstallerConfig, TomlConfig};
use crate::core::fetcher::FetchRequest;
use crate::core::image::ImageRequest;
use crate::core::installer::{InstallerRequest, PlatformOptions};
use crate::utils::error::{PackagerError, Result};
use crate::utils::validation::Validate;
use chrono::Datelike;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetPlatform {
    Windows,
    Linux,
    MacOs,
}

impl TargetPlatform {
    pub fn host() -> Self {
        match std::env::consts::OS {
            "windows" => TargetPlatform::Windows,
            "macos" => TargetPlatform::MacOs,
            _ => TargetPlatform::Linux,
        }
    }

    /// Module archive classifier, e.g. `linux-x64` or `osx-aarch64`.
    pub fn classifier(self, arch: &str) -> String {
        let os = match self {
            TargetPlatform::Windows => "windows",
            TargetPlatform::Linux => "linux",
            TargetPlatform::MacOs => "osx",
        };
        let arch = match arch {
            "x86_64" => "x64",
            "x86" => "x86",
            other => other,
        };
        format!("{}-{}", os, arch)
    }
}

impl FromStr for TargetPlatform {
    type Err = PackagerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "windows" | "win" => Ok(TargetPlatform::Windows),
            "linux" => Ok(TargetPlatform::Linux),
            "macos" | "mac" | "osx" => Ok(TargetPlatform::MacOs),
            _ => Err(PackagerError::InvalidConfigValueError {
                field: "installer.platform".to_string(),
                value: s.to_string(),
                reason: "Expected one of: windows, linux, macos".to_string(),
            }),
        }
    }
}

impl fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetPlatform::Windows => f.write_str("windows"),
            TargetPlatform::Linux => f.write_str("linux"),
            TargetPlatform::MacOs => f.write_str("macos"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMetadata {
    pub name: String,
    pub version: String,
    pub vendor: String,
    pub description: String,
    pub copyright: String,
}

#[derive(Debug, Clone)]
pub struct PackagerSettings {
    pub project: ProjectMetadata,
    pub java_home: PathBuf,
    pub javafx_version: String,
    pub classifier: String,
    pub download_base_url: String,
    pub jmods_dir: PathBuf,
    pub extra_module_paths: Vec<PathBuf>,
    pub artifact_dir: PathBuf,
    pub image_dir: PathBuf,
    pub temp_dir: PathBuf,
    pub installer_dir: PathBuf,
    pub platform: TargetPlatform,
    pub image: ImageConfig,
    pub installer: InstallerConfig,
}

impl PackagerSettings {
    /// Resolve `config` against `project_root`.
    ///
    /// The Java home comes from `java_home_override`, then
    /// `toolchain.java_home`, then `JAVA_HOME`.
    pub fn resolve(
        config: &TomlConfig,
        project_root: &Path,
        java_home_override: Option<&Path>,
    ) -> Result<Self> {
        config.validate()?;

        let java_home = match java_home_override {
            Some(path) => path.to_path_buf(),
            None => resolve_java_home(config.toolchain.java_home.as_deref())?,
        };

        let platform = match &config.installer.platform {
            Some(value) => value.parse()?,
            None => TargetPlatform::host(),
        };
        let classifier = config
            .modules
            .classifier
            .clone()
            .unwrap_or_else(|| platform.classifier(std::env::consts::ARCH));

        let build_dir = project_root.join(&config.paths.build_dir);
        let dist_dir = project_root.join(&config.paths.dist_dir);
        let jmods_dir = match &config.modules.jmods_dir {
            Some(dir) => project_root.join(dir),
            None => build_dir.join("jmods"),
        };

        let copyright = config
            .project
            .copyright
            .clone()
            .unwrap_or_else(|| format!("Copyright {}", chrono::Local::now().year()));

        Ok(Self {
            project: ProjectMetadata {
                name: config.project.name.clone(),
                version: config.project.version.clone(),
                vendor: config.project.vendor.clone(),
                description: config.project.description.clone(),
                copyright,
            },
            java_home,
            javafx_version: config.modules.javafx_version.clone(),
            classifier,
            download_base_url: config.modules.download_base_url.clone(),
            jmods_dir,
            extra_module_paths: config
                .modules
                .extra_module_paths
                .iter()
                .map(|p| project_root.join(p))
                .collect(),
            artifact_dir: project_root.join(&config.paths.artifact_dir),
            image_dir: dist_dir.join("image"),
            temp_dir: build_dir.join("tmp").join("jpackage"),
            installer_dir: dist_dir.join("installer"),
            platform,
            image: config.image.clone(),
            installer: config.installer.clone(),
        })
    }

    pub fn javafx_module_dir(&self) -> PathBuf {
        self.fetch_request().module_dir()
    }

    /// JDK modules, the application, JavaFX modules, then extra directories.
    pub fn module_path(&self) -> Vec<PathBuf> {
        let mut paths = vec![
            self.java_home.join("jmods"),
            self.artifact_dir.clone(),
            self.javafx_module_dir(),
        ];
        paths.extend(self.extra_module_paths.iter().cloned());
        paths
    }

    pub fn fetch_request(&self) -> FetchRequest {
        FetchRequest {
            target_dir: self.jmods_dir.clone(),
            version: self.javafx_version.clone(),
            classifier: self.classifier.clone(),
            base_url: self.download_base_url.clone(),
        }
    }

    pub fn image_request(&self) -> ImageRequest {
        ImageRequest {
            java_home: self.java_home.clone(),
            module_path: self.module_path(),
            add_modules: self.image.add_modules.clone(),
            output_dir: self.image_dir.clone(),
            bind_services: self.image.bind_services,
            strip_native_commands: self.image.strip_native_commands,
        }
    }

    pub fn installer_request(&self) -> InstallerRequest {
        let platform_options = match self.platform {
            TargetPlatform::Windows => PlatformOptions::Windows(self.installer.windows.clone()),
            TargetPlatform::Linux => PlatformOptions::Linux(self.installer.linux.clone()),
            TargetPlatform::MacOs => PlatformOptions::MacOs(self.installer.mac.clone()),
        };

        InstallerRequest {
            java_home: self.java_home.clone(),
            metadata: self.project.clone(),
            main_module: self.installer.main_module.clone(),
            module_path: self.module_path(),
            input_dir: self.artifact_dir.clone(),
            temp_dir: self.temp_dir.clone(),
            dest_dir: self.installer_dir.clone(),
            java_options: self.installer.java_options.clone(),
            jlink_options: self.installer.jlink_options.clone(),
            runtime_image: self
                .installer
                .use_runtime_image
                .then(|| self.image_dir.clone()),
            installer_type: self.installer.installer_type.clone(),
            platform_options,
        }
    }
}

fn resolve_java_home(configured: Option<&str>) -> Result<PathBuf> {
    if let Some(value) = configured {
        // an unset ${VAR} survives substitution verbatim
        if !value.contains("${") {
            return Ok(PathBuf::from(value));
        }
        tracing::debug!("toolchain.java_home '{}' is unresolved, trying JAVA_HOME", value);
    }

    match std::env::var_os("JAVA_HOME") {
        Some(home) if !home.is_empty() => Ok(PathBuf::from(home)),
        _ => Err(PackagerError::MissingConfigError {
            field: "toolchain.java_home (or JAVA_HOME)".to_string(),
        }),
    }
}
