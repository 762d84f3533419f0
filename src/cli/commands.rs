//! Command dispatch: wires the container and renders outcomes

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::{
    prompt_layer_name, ApplicationError, DeclineReason, IoResultExt, PipelineEventSink,
    PipelineOutcome, PublishOptions,
};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output::{self, ConsoleEventSink};
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{BuildContext, LayerName};
use crate::exitcode;
use crate::infrastructure::di::ServiceContainer;

/// Run the parsed command, returning the process exit status.
#[instrument(skip(cli))]
pub fn execute_command(cli: &Cli) -> CliResult<i32> {
    let Some(command) = &cli.command else {
        Cli::command()
            .print_help()
            .with_context("print help")?;
        return Ok(exitcode::OK);
    };

    let work_dir = resolve_work_dir(cli.work_dir.as_deref())?;
    debug!("work_dir: {}", work_dir.display());
    let events = ConsoleEventSink;

    match command {
        Commands::Publish {
            name,
            manifest,
            yes,
            keep,
        } => {
            let container = container(&work_dir, manifest.as_deref())?;
            let ctx = build_context(&container, name.clone(), &work_dir, &events)?;
            let options = PublishOptions {
                assume_yes: *yes,
                keep_archive: *keep,
            };
            let outcome = container.pipeline().publish(&ctx, options, &events)?;
            Ok(report(outcome))
        }
        Commands::Build { name, manifest } => {
            let container = container(&work_dir, manifest.as_deref())?;
            let ctx = build_context(&container, name.clone(), &work_dir, &events)?;
            let outcome = container.pipeline().build(&ctx, &events)?;
            Ok(report(outcome))
        }
        Commands::Check { manifest } => {
            let container = container(&work_dir, manifest.as_deref())?;
            let manifest = work_dir.join(&container.settings.manifest);
            let outcome = container.pipeline().check(&manifest, &events)?;
            Ok(report(outcome))
        }
        Commands::Clean { name } => {
            let container = container(&work_dir, None)?;
            let ctx = build_context(&container, name.clone(), &work_dir, &events)?;
            let outcome = container.pipeline().clean(&ctx, &events)?;
            Ok(report(outcome))
        }
        Commands::Config { command } => config_command(command, &work_dir),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(exitcode::OK)
        }
    }
}

fn resolve_work_dir(work_dir: Option<&Path>) -> CliResult<PathBuf> {
    match work_dir {
        Some(dir) if !dir.is_dir() => Err(CliError::Usage(format!(
            "work dir does not exist: {}",
            dir.display()
        ))),
        Some(dir) => Ok(dir.to_path_buf()),
        None => Ok(std::env::current_dir().with_context("determine current directory")?),
    }
}

/// Load settings for `work_dir`; a `--manifest` flag overrides the configured one.
///
/// The configured manifest is relative to the work dir, the flag to the
/// directory the command was started from.
fn container(work_dir: &Path, manifest: Option<&Path>) -> CliResult<ServiceContainer> {
    let mut settings = Settings::load(Some(work_dir))?;
    if let Some(manifest) = manifest {
        let cwd = std::env::current_dir().with_context("determine current directory")?;
        settings.manifest = resolve_flag_path(manifest, &cwd);
    }
    Ok(ServiceContainer::new(settings))
}

fn resolve_flag_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

fn build_context(
    container: &ServiceContainer,
    name: Option<LayerName>,
    work_dir: &Path,
    events: &dyn PipelineEventSink,
) -> CliResult<BuildContext> {
    let name = match name {
        Some(name) => name,
        None => prompt_layer_name(container.prompter.as_ref(), events)?,
    };
    Ok(BuildContext::new(name, work_dir, &container.settings.layout()))
}

fn report(outcome: PipelineOutcome) -> i32 {
    match outcome {
        PipelineOutcome::Published(_) => {}
        PipelineOutcome::Built { archive, .. } => output::action("Built", &archive.display()),
        PipelineOutcome::Checked => output::success("ready to build"),
        PipelineOutcome::Cleaned { removed } if removed.is_empty() => {
            output::info("nothing to clean")
        }
        PipelineOutcome::Cleaned { .. } => output::success("clean"),
        PipelineOutcome::Declined(DeclineReason::Credentials) => {
            output::warning("aborted: cloud credentials not repaired")
        }
        PipelineOutcome::Declined(DeclineReason::Confirmation) => {
            output::info("publish cancelled")
        }
    }
    exitcode::OK
}

fn config_command(command: &ConfigCommands, work_dir: &Path) -> CliResult<i32> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(work_dir))?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path().ok_or_else(|| ApplicationError::Config {
                    message: "cannot determine global config directory".into(),
                })?
            } else {
                local_config_path(work_dir)
            };
            if path.exists() {
                return Err(CliError::Usage(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).with_path_context("create config dir", parent)?;
            }
            std::fs::write(&path, Settings::template()).with_path_context("write config", &path)?;
            output::action("Created", &path.display());
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::info(&format!("global: {}", path.display())),
                None => output::info("global: (unavailable)"),
            }
            output::info(&format!("local:  {}", local_config_path(work_dir).display()));
        }
    }
    Ok(exitcode::OK)
}
