use crate::utils::error::{PackagerError, Result};
use crate::utils::validation::{
    validate_no_whitespace, validate_non_empty_string, validate_path, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "packager.toml";
pub const DEFAULT_JAVAFX_VERSION: &str = "25";
pub const DEFAULT_DOWNLOAD_BASE_URL: &str = "https://download2.gluonhq.com/openjfx";

/// On-disk configuration. Every field is optional; missing values fall back
/// to the defaults of the template project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TomlConfig {
    pub project: ProjectConfig,
    pub toolchain: ToolchainConfig,
    pub modules: ModulesConfig,
    pub paths: PathsConfig,
    pub image: ImageConfig,
    pub installer: InstallerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    pub name: String,
    pub version: String,
    pub vendor: String,
    pub description: String,
    pub copyright: Option<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "Template".to_string(),
            version: "1.0".to_string(),
            vendor: "TCF".to_string(),
            description: "Template Project".to_string(),
            copyright: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolchainConfig {
    pub java_home: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModulesConfig {
    pub javafx_version: String,
    pub classifier: Option<String>,
    pub download_base_url: String,
    pub jmods_dir: Option<String>,
    pub extra_module_paths: Vec<String>,
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            javafx_version: DEFAULT_JAVAFX_VERSION.to_string(),
            classifier: None,
            download_base_url: DEFAULT_DOWNLOAD_BASE_URL.to_string(),
            jmods_dir: None,
            extra_module_paths: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub build_dir: String,
    pub artifact_dir: String,
    pub dist_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            build_dir: "app/build".to_string(),
            artifact_dir: "app/build/libs".to_string(),
            dist_dir: "dist".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageConfig {
    pub add_modules: Vec<String>,
    pub bind_services: bool,
    pub strip_native_commands: bool,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            add_modules: vec!["app".to_string()],
            bind_services: true,
            strip_native_commands: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstallerConfig {
    pub main_module: String,
    pub java_options: Vec<String>,
    pub jlink_options: Vec<String>,
    pub installer_type: Option<String>,
    pub use_runtime_image: bool,
    /// `windows`, `linux` or `macos`; detected from the host when absent.
    pub platform: Option<String>,
    pub windows: WindowsInstallerConfig,
    pub linux: LinuxInstallerConfig,
    pub mac: MacInstallerConfig,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            main_module: "app/app.AppMain".to_string(),
            java_options: vec![
                "-Xmx1g".to_string(),
                "--enable-native-access=javafx.graphics".to_string(),
            ],
            jlink_options: [
                "--bind-services",
                "--strip-native-commands",
                "--strip-debug",
                "--no-man-pages",
                "--no-header-files",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            installer_type: None,
            use_runtime_image: false,
            platform: None,
            windows: WindowsInstallerConfig::default(),
            linux: LinuxInstallerConfig::default(),
            mac: MacInstallerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowsInstallerConfig {
    pub per_user_install: bool,
    pub menu_group: Option<String>,
    pub shortcut: bool,
    pub shortcut_prompt: bool,
}

impl Default for WindowsInstallerConfig {
    fn default() -> Self {
        Self {
            per_user_install: true,
            menu_group: Some("JavaProjects".to_string()),
            shortcut: true,
            shortcut_prompt: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinuxInstallerConfig {
    pub shortcut: bool,
    pub menu_group: Option<String>,
}

impl Default for LinuxInstallerConfig {
    fn default() -> Self {
        Self {
            shortcut: true,
            menu_group: Some("JavaProjects".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MacInstallerConfig {
    pub package_identifier: Option<String>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| PackagerError::fs("reading config", path, e))?;
        Self::from_toml_str(&content)
    }

    /// Load `path` if it exists, otherwise use defaults.
    pub fn from_optional_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            tracing::debug!("Loading configuration from {}", path.display());
            Self::from_file(path)
        } else {
            tracing::debug!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PackagerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR}` with the environment value; unknown variables are left as-is.
    ///
    /// Values are escaped for use inside double-quoted TOML strings, so
    /// Windows paths such as `C:\Program Files\Java` survive parsing.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PackagerError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => escape_basic_string(&value),
                Err(_) => format!("${{{}}}", var_name),
            }
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("project.name", &self.project.name)?;
        validate_non_empty_string("project.version", &self.project.version)?;
        validate_non_empty_string("project.vendor", &self.project.vendor)?;
        validate_non_empty_string("modules.javafx_version", &self.modules.javafx_version)?;
        validate_url("modules.download_base_url", &self.modules.download_base_url)?;

        if let Some(classifier) = &self.modules.classifier {
            validate_no_whitespace("modules.classifier", classifier)?;
        }
        if let Some(java_home) = &self.toolchain.java_home {
            validate_path("toolchain.java_home", java_home)?;
        }
        if let Some(jmods_dir) = &self.modules.jmods_dir {
            validate_path("modules.jmods_dir", jmods_dir)?;
        }
        for extra in &self.modules.extra_module_paths {
            validate_path("modules.extra_module_paths", extra)?;
        }

        validate_path("paths.build_dir", &self.paths.build_dir)?;
        validate_path("paths.artifact_dir", &self.paths.artifact_dir)?;
        validate_path("paths.dist_dir", &self.paths.dist_dir)?;

        if self.image.add_modules.is_empty() {
            return Err(PackagerError::MissingConfigError {
                field: "image.add_modules".to_string(),
            });
        }

        validate_non_empty_string("installer.main_module", &self.installer.main_module)?;
        for option in &self.installer.java_options {
            validate_no_whitespace("installer.java_options", option)?;
        }
        for option in &self.installer.jlink_options {
            validate_no_whitespace("installer.jlink_options", option)?;
        }

        Ok(())
    }
}

fn escape_basic_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_template_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();

        assert_eq!(config.project.name, "Template");
        assert_eq!(config.project.vendor, "TCF");
        assert_eq!(config.modules.javafx_version, "25");
        assert_eq!(config.installer.main_module, "app/app.AppMain");
        assert_eq!(
            config.installer.windows.menu_group.as_deref(),
            Some("JavaProjects")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_content = r#"
[project]
name = "Viewer"
version = "2.3"

[modules]
javafx_version = "21.0.2"
classifier = "linux-x64"

[installer]
installer_type = "deb"
use_runtime_image = true

[installer.linux]
menu_group = "Graphics"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.project.name, "Viewer");
        assert_eq!(config.project.vendor, "TCF");
        assert_eq!(config.modules.classifier.as_deref(), Some("linux-x64"));
        assert_eq!(config.installer.installer_type.as_deref(), Some("deb"));
        assert!(config.installer.use_runtime_image);
        assert_eq!(config.installer.linux.menu_group.as_deref(), Some("Graphics"));
        assert!(config.installer.linux.shortcut);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("JPACKAGER_TEST_JAVA_HOME", "/opt/jdk-25");

        let toml_content = r#"
[toolchain]
java_home = "${JPACKAGER_TEST_JAVA_HOME}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.toolchain.java_home.as_deref(), Some("/opt/jdk-25"));

        std::env::remove_var("JPACKAGER_TEST_JAVA_HOME");
    }

    #[test]
    fn test_env_var_with_windows_path_is_escaped() {
        let java_home = r#"C:\Program Files\Java\jdk-25 "current""#;
        std::env::set_var("JPACKAGER_TEST_WINDOWS_JAVA_HOME", java_home);

        let sample = include_str!("../../packager.toml")
            .replace("${JAVA_HOME}", "${JPACKAGER_TEST_WINDOWS_JAVA_HOME}");
        let config = TomlConfig::from_toml_str(&sample).unwrap();
        assert_eq!(config.toolchain.java_home.as_deref(), Some(java_home));

        std::env::remove_var("JPACKAGER_TEST_WINDOWS_JAVA_HOME");
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result = TomlConfig::from_toml_str("[project]\nnmae = \"typo\"\n");
        assert!(matches!(
            result,
            Err(PackagerError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_validation() {
        let config = TomlConfig::from_toml_str(
            r#"
[modules]
download_base_url = "ftp://mirror.example.com"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        let config = TomlConfig::from_toml_str(
            r#"
[installer]
java_options = ["-Xmx1g -Xms1g"]
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        let config = TomlConfig::from_toml_str(
            r#"
[image]
add_modules = []
"#,
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(PackagerError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[project]\nname = \"file-test\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.project.name, "file-test");
    }

    #[test]
    fn test_sample_config_matches_defaults() {
        let config = TomlConfig::from_toml_str(include_str!("../../packager.toml")).unwrap();
        let defaults = TomlConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.project.name, defaults.project.name);
        assert_eq!(config.installer.jlink_options, defaults.installer.jlink_options);
        assert_eq!(config.installer.java_options, defaults.installer.java_options);
        assert_eq!(config.image.add_modules, defaults.image.add_modules);
    }

    #[test]
    fn test_missing_optional_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = TomlConfig::from_optional_file(dir.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        assert_eq!(config.project.name, "Template");
    }
}
