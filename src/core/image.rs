use crate::core::clean::remove_dir_force;
use crate::core::process::{check_jdk_tool, jdk_tool_path, require_success};
use crate::domain::model::ToolInvocation;
use crate::domain::ports::ToolRunner;
use crate::utils::error::{PackagerError, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const JLINK: &str = "jlink";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub java_home: PathBuf,
    pub module_path: Vec<PathBuf>,
    pub add_modules: Vec<String>,
    pub output_dir: PathBuf,
    pub bind_services: bool,
    pub strip_native_commands: bool,
}

impl ImageRequest {
    pub fn invocation(&self) -> Result<ToolInvocation> {
        let module_path = join_module_path(&existing_module_path(&self.module_path))?;

        let mut invocation = ToolInvocation::new(JLINK, jdk_tool_path(&self.java_home, JLINK))
            .arg_pair("--module-path", module_path)
            .arg_pair("--add-modules", self.add_modules.join(","))
            .arg_pair("--output", &self.output_dir);
        if self.bind_services {
            invocation = invocation.arg("--bind-services");
        }
        if self.strip_native_commands {
            invocation = invocation.arg("--strip-native-commands");
        }
        Ok(invocation
            .arg("--strip-debug")
            .arg("--no-man-pages")
            .arg("--no-header-files"))
    }
}

/// Links the application and its modules into a minimal runtime image.
pub struct ImageBuilder {
    runner: Arc<dyn ToolRunner>,
}

impl ImageBuilder {
    pub fn new(runner: Arc<dyn ToolRunner>) -> Self {
        Self { runner }
    }

    pub async fn build(&self, request: &ImageRequest) -> Result<PathBuf> {
        check_jdk_tool(&request.java_home, JLINK)?;

        if remove_dir_force(&request.output_dir)? {
            tracing::info!("Removed previous image at {}", request.output_dir.display());
        }
        if let Some(parent) = request.output_dir.parent() {
            fs::create_dir_all(parent).map_err(|e| PackagerError::fs("creating", parent, e))?;
        }

        let invocation = request.invocation()?;
        tracing::info!("Building runtime image in {}", request.output_dir.display());
        let output = self.runner.run(&invocation).await?;
        require_success(JLINK, &output)?;

        if !request.output_dir.is_dir() {
            return Err(PackagerError::MissingOutputError {
                tool: JLINK.to_string(),
                path: request.output_dir.clone(),
            });
        }

        Ok(request.output_dir.clone())
    }
}

/// Drop module path entries that do not exist; newer JDKs may ship without
/// a `jmods` directory.
pub fn existing_module_path(paths: &[PathBuf]) -> Vec<PathBuf> {
    paths
        .iter()
        .filter(|path| {
            let exists = path.exists();
            if !exists {
                tracing::warn!("Skipping missing module path entry {}", path.display());
            }
            exists
        })
        .cloned()
        .collect()
}

/// Join module path entries with the platform path separator.
pub fn join_module_path(paths: &[PathBuf]) -> Result<OsString> {
    std::env::join_paths(paths).map_err(|e| PackagerError::InvalidConfigValueError {
        field: "module_path".to_string(),
        value: paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
        reason: e.to_string(),
    })
}
