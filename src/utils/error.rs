use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PackagerError {
    #[error("Download failed: {0}")]
    DownloadError(#[from] reqwest::Error),

    #[error("Download of {url} returned HTTP {status}")]
    DownloadStatusError { url: String, status: u16 },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Extraction of '{entry}' failed: {message}")]
    ExtractionError { entry: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{action} '{}': {source}", path.display())]
    FileSystemError {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} not found at '{}'", path.display())]
    ToolNotFoundError { tool: String, path: PathBuf },

    #[error("{tool} failed with exit code {code}")]
    ToolFailedError { tool: String, code: i32 },

    #[error("{tool} was terminated before reporting an exit code")]
    ToolTerminatedError { tool: String },

    #[error("{tool} exited successfully but '{}' was not produced", path.display())]
    MissingOutputError { tool: String, path: PathBuf },

    #[error("Module directory '{}' is incomplete: {message}", path.display())]
    ModuleLayoutError { path: PathBuf, message: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Cannot move packager from {from} to {to}")]
    InvalidStateError { from: String, to: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Extraction,
    Tool,
    Configuration,
    FileSystem,
    Pipeline,
}

impl PackagerError {
    pub fn fs(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PackagerError::FileSystemError {
            action,
            path: path.into(),
            source,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            PackagerError::DownloadError(_) | PackagerError::DownloadStatusError { .. } => {
                ErrorCategory::Network
            }
            PackagerError::ZipError(_)
            | PackagerError::ExtractionError { .. }
            | PackagerError::ModuleLayoutError { .. } => ErrorCategory::Extraction,
            PackagerError::ToolNotFoundError { .. }
            | PackagerError::ToolFailedError { .. }
            | PackagerError::ToolTerminatedError { .. }
            | PackagerError::MissingOutputError { .. } => ErrorCategory::Tool,
            PackagerError::ConfigValidationError { .. }
            | PackagerError::InvalidConfigValueError { .. }
            | PackagerError::MissingConfigError { .. } => ErrorCategory::Configuration,
            PackagerError::IoError(_) | PackagerError::FileSystemError { .. } => {
                ErrorCategory::FileSystem
            }
            PackagerError::InvalidStateError { .. } => ErrorCategory::Pipeline,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            PackagerError::DownloadError(_) | PackagerError::DownloadStatusError { .. } => {
                "Check network access and that modules.javafx_version and modules.classifier name a published archive"
            }
            PackagerError::ZipError(_) | PackagerError::ExtractionError { .. } => {
                "The downloaded archive is unusable; rerun the fetch or set modules.download_base_url to a working mirror"
            }
            PackagerError::ModuleLayoutError { .. } => {
                "Run `jpackager clean modules` and fetch again"
            }
            PackagerError::ToolNotFoundError { .. } => {
                "Point toolchain.java_home, --java-home or JAVA_HOME at a JDK that ships jlink and jpackage"
            }
            PackagerError::ToolFailedError { .. } | PackagerError::ToolTerminatedError { .. } => {
                "Inspect the tool output above; rerun with --verbose for the full command line"
            }
            PackagerError::MissingOutputError { .. } => {
                "Verify the JDK installation; the tool reported success without producing output"
            }
            PackagerError::ConfigValidationError { .. }
            | PackagerError::InvalidConfigValueError { .. }
            | PackagerError::MissingConfigError { .. } => "Fix the configuration file and retry",
            PackagerError::IoError(_) | PackagerError::FileSystemError { .. } => {
                "Check permissions and free space on the build and dist directories"
            }
            PackagerError::InvalidStateError { .. } => {
                "Create a new packager for each run; failed runs are not retried"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not download runtime modules: {}", self),
            ErrorCategory::Extraction => format!("Could not prepare runtime modules: {}", self),
            ErrorCategory::Tool => format!("Packaging tool failed: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::FileSystem => format!("Filesystem error: {}", self),
            ErrorCategory::Pipeline => format!("Build failed: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, PackagerError>;
