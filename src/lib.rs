//! Packages a modular JavaFX application into a runtime image and a native
//! installer.
//!
//! The pipeline has three stages, always run in this order:
//!
//! - **fetch** - download and unpack the JavaFX `.jmod` archive unless it is
//!   already on disk ([`core::fetcher`])
//! - **image** - link a trimmed runtime image with `jlink` ([`core::image`])
//! - **installer** - wrap the application with `jpackage` ([`core::installer`])
//!
//! [`Packager`] drives the stages; external tools are run through the
//! [`ToolRunner`] port so tests can substitute them.

pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::{PackagerSettings, TomlConfig};

pub use crate::core::packager::{CleanTarget, Packager};
pub use crate::core::process::SystemToolRunner;
pub use crate::domain::model::{PackageReport, PackageState, Stage};
pub use crate::domain::ports::ToolRunner;
pub use crate::utils::error::{PackagerError, Result};
