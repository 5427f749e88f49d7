use crate::domain::model::{ToolInvocation, ToolOutput};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Runs an external command to completion.
///
/// Implementations report the exit status in [`ToolOutput`]; turning a
/// nonzero status into an error is left to the caller.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    async fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput>;
}
