use crate::config::settings::PackagerSettings;
use crate::core::clean::remove_dir_force;
use crate::core::fetcher::AssetFetcher;
use crate::core::image::ImageBuilder;
use crate::core::installer::InstallerBuilder;
use crate::domain::model::{
    FetchOutcome, PackageReport, PackageState, Stage, StageReport, ToolInvocation,
};
use crate::domain::ports::ToolRunner;
use crate::utils::error::{PackagerError, Result};
use crate::utils::monitor::SystemMonitor;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanTarget {
    Modules,
    Image,
    Installer,
    All,
}

/// Runs fetch, image and installer stages strictly in order.
///
/// A packager runs once; after `Done` or `Failed` it refuses further runs.
pub struct Packager {
    settings: PackagerSettings,
    fetcher: AssetFetcher,
    runner: Arc<dyn ToolRunner>,
    monitor: SystemMonitor,
    state: PackageState,
}

impl Packager {
    pub fn new(settings: PackagerSettings, runner: Arc<dyn ToolRunner>) -> Self {
        Self::new_with_monitoring(settings, runner, false)
    }

    pub fn new_with_monitoring(
        settings: PackagerSettings,
        runner: Arc<dyn ToolRunner>,
        monitor_enabled: bool,
    ) -> Self {
        Self {
            settings,
            fetcher: AssetFetcher::new(),
            runner,
            monitor: SystemMonitor::new(monitor_enabled),
            state: PackageState::NotStarted,
        }
    }

    pub fn state(&self) -> PackageState {
        self.state
    }

    pub fn settings(&self) -> &PackagerSettings {
        &self.settings
    }

    pub async fn run(&mut self) -> Result<PackageReport> {
        self.run_until(Stage::Installer).await
    }

    /// Run every stage up to and including `last`.
    pub async fn run_until(&mut self, last: Stage) -> Result<PackageReport> {
        let mut report = PackageReport {
            stages: Vec::new(),
            state: self.state,
            fetch: None,
            image_dir: None,
            installers: Vec::new(),
        };

        for stage in Stage::ALL.into_iter().filter(|stage| *stage <= last) {
            self.transition(stage.running_state())?;
            tracing::info!("Stage {} started", stage);
            let started = Instant::now();

            let summary = match self.run_stage(stage, &mut report).await {
                Ok(summary) => summary,
                Err(e) => {
                    self.state = PackageState::Failed;
                    tracing::error!("Stage {} failed: {}", stage, e);
                    return Err(e);
                }
            };

            let elapsed = started.elapsed();
            tracing::info!("Stage {} finished in {:?}: {}", stage, elapsed, summary);
            self.monitor.log_stats(&stage.to_string());
            report.stages.push(StageReport {
                stage,
                elapsed,
                summary,
            });
        }

        self.transition(PackageState::Done)?;
        report.state = self.state;
        Ok(report)
    }

    async fn run_stage(&self, stage: Stage, report: &mut PackageReport) -> Result<String> {
        match stage {
            Stage::Fetch => {
                let outcome = self.fetcher.ensure(&self.settings.fetch_request()).await?;
                let summary = match &outcome {
                    FetchOutcome::AlreadyPresent { module_dir } => {
                        format!("modules already present in {}", module_dir.display())
                    }
                    FetchOutcome::Downloaded { files, module_dir, .. } => {
                        format!("extracted {} files into {}", files, module_dir.display())
                    }
                };
                report.fetch = Some(outcome);
                Ok(summary)
            }
            Stage::Image => {
                let image = ImageBuilder::new(self.runner.clone())
                    .build(&self.settings.image_request())
                    .await?;
                let summary = format!("runtime image at {}", image.display());
                report.image_dir = Some(image);
                Ok(summary)
            }
            Stage::Installer => {
                let installers = InstallerBuilder::new(self.runner.clone())
                    .build(&self.settings.installer_request())
                    .await?;
                let summary = format!(
                    "{} installer(s) in {}",
                    installers.len(),
                    self.settings.installer_dir.display()
                );
                report.installers = installers;
                Ok(summary)
            }
        }
    }

    fn transition(&mut self, next: PackageState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(PackagerError::InvalidStateError {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        tracing::debug!("Packager state {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    /// Tool command lines the full pipeline would run, without running them.
    pub fn plan(&self) -> Result<Vec<ToolInvocation>> {
        Ok(vec![
            self.settings.image_request().invocation()?,
            self.settings.installer_request().invocation()?,
        ])
    }

    /// Delete build outputs. Returns the directories that were removed.
    pub fn clean(&self, target: CleanTarget) -> Result<Vec<PathBuf>> {
        let dirs = match target {
            CleanTarget::Modules => vec![self.settings.jmods_dir.clone()],
            CleanTarget::Image => vec![self.settings.image_dir.clone()],
            CleanTarget::Installer => vec![
                self.settings.temp_dir.clone(),
                self.settings.installer_dir.clone(),
            ],
            CleanTarget::All => vec![
                self.settings.jmods_dir.clone(),
                self.settings.image_dir.clone(),
                self.settings.temp_dir.clone(),
                self.settings.installer_dir.clone(),
            ],
        };

        let mut removed = Vec::new();
        for dir in dirs {
            if remove_dir_force(&dir)? {
                tracing::info!("Removed {}", dir.display());
                removed.push(dir);
            }
        }
        Ok(removed)
    }
}
