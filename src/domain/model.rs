use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Lifecycle of a single packaging run. `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageState {
    NotStarted,
    Fetching,
    ImageBuilding,
    InstallerBuilding,
    Done,
    Failed,
}

impl PackageState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PackageState::Done | PackageState::Failed)
    }

    pub fn can_transition_to(self, next: PackageState) -> bool {
        use PackageState::*;
        match (self, next) {
            (Done | Failed, _) => false,
            (_, Failed) => true,
            (NotStarted, Fetching) => true,
            (Fetching, ImageBuilding | Done) => true,
            (ImageBuilding, InstallerBuilding | Done) => true,
            (InstallerBuilding, Done) => true,
            _ => false,
        }
    }
}

impl fmt::Display for PackageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PackageState::NotStarted => "NOT_STARTED",
            PackageState::Fetching => "FETCHING",
            PackageState::ImageBuilding => "IMAGE_BUILDING",
            PackageState::InstallerBuilding => "INSTALLER_BUILDING",
            PackageState::Done => "DONE",
            PackageState::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Fetch,
    Image,
    Installer,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Fetch, Stage::Image, Stage::Installer];

    pub fn running_state(self) -> PackageState {
        match self {
            Stage::Fetch => PackageState::Fetching,
            Stage::Image => PackageState::ImageBuilding,
            Stage::Installer => PackageState::InstallerBuilding,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Fetch => f.write_str("fetch"),
            Stage::Image => f.write_str("image"),
            Stage::Installer => f.write_str("installer"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    AlreadyPresent {
        module_dir: PathBuf,
    },
    Downloaded {
        url: String,
        files: usize,
        module_dir: PathBuf,
    },
}

/// One external command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub tool: String,
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl ToolInvocation {
    pub fn new(tool: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            tool: tool.into(),
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn arg_pair(self, flag: &str, value: impl Into<OsString>) -> Self {
        self.arg(flag).arg(value)
    }

    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Value following `flag`, if present.
    pub fn flag_value(&self, flag: &str) -> Option<String> {
        let args = self.args_lossy();
        let pos = args.iter().position(|a| a == flag)?;
        args.get(pos + 1).cloned()
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a == flag)
    }

    pub fn command_line(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        for arg in self.args_lossy() {
            if arg.contains(' ') {
                parts.push(format!("\"{}\"", arg));
            } else {
                parts.push(arg);
            }
        }
        parts.join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct StageReport {
    pub stage: Stage,
    pub elapsed: Duration,
    pub summary: String,
}

#[derive(Debug, Clone)]
pub struct PackageReport {
    pub stages: Vec<StageReport>,
    pub state: PackageState,
    pub fetch: Option<FetchOutcome>,
    pub image_dir: Option<PathBuf>,
    pub installers: Vec<PathBuf>,
}
