use crate::config::settings::ProjectMetadata;
use crate::config::toml_config::{
    LinuxInstallerConfig, MacInstallerConfig, WindowsInstallerConfig,
};
use crate::core::clean::remove_dir_force;
use crate::core::image::{existing_module_path, join_module_path};
use crate::core::process::{check_jdk_tool, jdk_tool_path, require_success};
use crate::domain::model::ToolInvocation;
use crate::domain::ports::ToolRunner;
use crate::utils::error::{PackagerError, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

pub const JPACKAGE: &str = "jpackage";

/// Installer options only understood by jpackage on one platform.
#[derive(Debug, Clone)]
pub enum PlatformOptions {
    Windows(WindowsInstallerConfig),
    Linux(LinuxInstallerConfig),
    MacOs(MacInstallerConfig),
}

impl PlatformOptions {
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::new();
        match self {
            PlatformOptions::Windows(win) => {
                if win.per_user_install {
                    args.push("--win-per-user-install".to_string());
                }
                if let Some(group) = &win.menu_group {
                    args.push("--win-menu-group".to_string());
                    args.push(group.clone());
                }
                if win.shortcut {
                    args.push("--win-shortcut".to_string());
                }
                if win.shortcut_prompt {
                    args.push("--win-shortcut-prompt".to_string());
                }
            }
            PlatformOptions::Linux(linux) => {
                if linux.shortcut {
                    args.push("--linux-shortcut".to_string());
                }
                if let Some(group) = &linux.menu_group {
                    args.push("--linux-menu-group".to_string());
                    args.push(group.clone());
                }
            }
            PlatformOptions::MacOs(mac) => {
                if let Some(identifier) = &mac.package_identifier {
                    args.push("--mac-package-identifier".to_string());
                    args.push(identifier.clone());
                }
            }
        }
        args
    }
}

#[derive(Debug, Clone)]
pub struct InstallerRequest {
    pub java_home: PathBuf,
    pub metadata: ProjectMetadata,
    /// `<module>/<main class>`
    pub main_module: String,
    pub module_path: Vec<PathBuf>,
    pub input_dir: PathBuf,
    pub temp_dir: PathBuf,
    pub dest_dir: PathBuf,
    pub java_options: Vec<String>,
    pub jlink_options: Vec<String>,
    /// Package this image instead of letting jpackage run jlink itself.
    pub runtime_image: Option<PathBuf>,
    pub installer_type: Option<String>,
    pub platform_options: PlatformOptions,
}

impl InstallerRequest {
    pub fn invocation(&self) -> Result<ToolInvocation> {
        let mut invocation =
            ToolInvocation::new(JPACKAGE, jdk_tool_path(&self.java_home, JPACKAGE))
                .arg_pair("--name", &self.metadata.name)
                .arg_pair("--temp", &self.temp_dir)
                .arg_pair("--module", &self.main_module);

        invocation = match &self.runtime_image {
            Some(image) => invocation.arg_pair("--runtime-image", image),
            None => {
                invocation = invocation
                    .arg_pair(
                        "--module-path",
                        join_module_path(&existing_module_path(&self.module_path))?,
                    )
                    .arg_pair("--input", &self.input_dir);
                if self.jlink_options.is_empty() {
                    invocation
                } else {
                    invocation.arg_pair("--jlink-options", self.jlink_options.join(" "))
                }
            }
        };

        if !self.java_options.is_empty() {
            invocation = invocation.arg_pair("--java-options", self.java_options.join(" "));
        }

        invocation = invocation
            .arg_pair("--dest", &self.dest_dir)
            .arg_pair("--description", &self.metadata.description)
            .arg_pair("--vendor", &self.metadata.vendor)
            .arg_pair("--copyright", &self.metadata.copyright)
            .arg_pair("--app-version", &self.metadata.version);

        if let Some(kind) = &self.installer_type {
            invocation = invocation.arg_pair("--type", kind);
        }

        for arg in self.platform_options.args() {
            invocation = invocation.arg(arg);
        }
        Ok(invocation)
    }
}

/// Wraps the application into a platform installer with jpackage.
pub struct InstallerBuilder {
    runner: Arc<dyn ToolRunner>,
}

impl InstallerBuilder {
    pub fn new(runner: Arc<dyn ToolRunner>) -> Self {
        Self { runner }
    }

    /// Returns the files jpackage left in the destination directory.
    pub async fn build(&self, request: &InstallerRequest) -> Result<Vec<PathBuf>> {
        check_jdk_tool(&request.java_home, JPACKAGE)?;

        if let Some(image) = &request.runtime_image {
            if !image.is_dir() {
                return Err(PackagerError::MissingOutputError {
                    tool: "jlink".to_string(),
                    path: image.clone(),
                });
            }
        }

        remove_dir_force(&request.temp_dir)?;
        remove_dir_force(&request.dest_dir)?;
        for dir in [&request.temp_dir, &request.dest_dir] {
            fs::create_dir_all(dir).map_err(|e| PackagerError::fs("creating", dir, e))?;
        }

        let invocation = request.invocation()?;
        tracing::info!("Generating application installable...");
        let output = self.runner.run(&invocation).await?;
        require_success(JPACKAGE, &output)?;

        let installers = list_files(&request.dest_dir)?;
        if installers.is_empty() {
            return Err(PackagerError::MissingOutputError {
                tool: JPACKAGE.to_string(),
                path: request.dest_dir.clone(),
            });
        }
        for installer in &installers {
            tracing::info!("Installer written to {}", installer.display());
        }
        Ok(installers)
    }
}

fn list_files(dir: &std::path::Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| PackagerError::fs("reading", dir, e))? {
        let entry = entry.map_err(|e| PackagerError::fs("reading", dir, e))?;
        if entry.path().is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}
