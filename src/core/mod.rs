pub mod clean;
pub mod fetcher;
pub mod image;
pub mod installer;
pub mod packager;
pub mod process;

pub use crate::domain::model::{FetchOutcome, PackageReport, PackageState, Stage};
pub use crate::domain::ports::ToolRunner;
pub use crate::utils::error::Result;
