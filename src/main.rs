use anyhow::Context;
use clap::Parser;
use jpackager::config::CliCommand;
use jpackager::utils::logger;
use jpackager::{CliConfig, Packager, PackagerError, PackagerSettings, SystemToolRunner};
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);
    tracing::debug!("CLI config: {:?}", cli);

    let settings = match cli.load_settings() {
        Ok(settings) => settings,
        Err(e) => exit_with(&e),
    };

    display_settings_summary(&settings, &cli);

    let mut packager = Packager::new_with_monitoring(
        settings,
        Arc::new(SystemToolRunner::new()),
        cli.monitor,
    );

    match &cli.command {
        CliCommand::Plan => {
            let plan = packager.plan().context("building tool command lines")?;
            for invocation in plan {
                println!("{}", invocation.command_line());
            }
        }
        CliCommand::Clean { target } => match packager.clean((*target).into()) {
            Ok(removed) if removed.is_empty() => println!("Nothing to clean"),
            Ok(removed) => {
                for dir in removed {
                    println!("Removed {}", dir.display());
                }
            }
            Err(e) => exit_with(&e),
        },
        command => {
            let Some(last) = command.final_stage() else {
                anyhow::bail!("command {:?} does not run the pipeline", command);
            };
            match packager.run_until(last).await {
                Ok(report) => {
                    for stage in &report.stages {
                        println!("{}: {} ({:.1?})", stage.stage, stage.summary, stage.elapsed);
                    }
                    for installer in &report.installers {
                        println!("Installer: {}", installer.display());
                    }
                    tracing::info!("Packaging finished in state {}", report.state);
                }
                Err(e) => exit_with(&e),
            }
        }
    }

    Ok(())
}

fn display_settings_summary(settings: &PackagerSettings, cli: &CliConfig) {
    tracing::info!(
        "Project {} {} ({})",
        settings.project.name,
        settings.project.version,
        settings.project.vendor
    );
    tracing::info!("Config: {}", cli.config_path().display());
    tracing::info!("Java home: {}", settings.java_home.display());
    tracing::info!(
        "JavaFX {} ({}) in {}",
        settings.javafx_version,
        settings.classifier,
        settings.jmods_dir.display()
    );
    tracing::info!("Target platform: {}", settings.platform);
}

fn exit_with(e: &PackagerError) -> ! {
    tracing::error!("Build failed: {} (Category: {:?})", e, e.category());
    tracing::error!("Suggestion: {}", e.recovery_suggestion());
    eprintln!("{}", e.user_friendly_message());
    eprintln!("Suggestion: {}", e.recovery_suggestion());
    std::process::exit(1);
}
