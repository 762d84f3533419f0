//! AWS CLI adapter

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::config::AwsConfig;
use crate::infrastructure::traits::{
    command_line, run_checked, CloudClient, CommandOutput, CommandRunner,
};
use crate::infrastructure::{InfraError, InfraResult};

/// Cloud client shelling out to the `aws` binary.
pub struct AwsCli {
    cmd: Arc<dyn CommandRunner>,
    config: AwsConfig,
}

impl AwsCli {
    pub fn new(cmd: Arc<dyn CommandRunner>, config: AwsConfig) -> Self {
        Self { cmd, config }
    }

    /// `--profile`/`--region` forwarded to every call.
    fn global_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(profile) = &self.config.profile {
            args.extend(["--profile".to_string(), profile.clone()]);
        }
        if let Some(region) = &self.config.region {
            args.extend(["--region".to_string(), region.clone()]);
        }
        args
    }
}

fn with_globals<'a>(args: &[&'a str], globals: &'a [String]) -> Vec<&'a str> {
    args.iter()
        .copied()
        .chain(globals.iter().map(String::as_str))
        .collect()
}

impl CloudClient for AwsCli {
    fn probe(&self) -> InfraResult<CommandOutput> {
        let globals = self.global_args();
        let probe: Vec<&str> = self.config.probe.iter().map(String::as_str).collect();
        let args = with_globals(&probe, &globals);
        let command = command_line(&self.config.cli, &args);
        debug!("probe: {}", command);

        self.cmd
            .run(&self.config.cli, &args)
            .map_err(|e| InfraError::Command {
                command,
                message: e.to_string(),
                exit_code: None,
            })
    }

    fn configure(&self) -> InfraResult<()> {
        let profile: Vec<String> = self
            .config
            .profile
            .iter()
            .flat_map(|p| ["--profile".to_string(), p.clone()])
            .collect();
        let args = with_globals(&["configure"], &profile);
        let command = command_line(&self.config.cli, &args);
        debug!("configure: {}", command);

        let output = self
            .cmd
            .run_interactive(&self.config.cli, &args)
            .map_err(|e| InfraError::Command {
                command: command.clone(),
                message: e.to_string(),
                exit_code: None,
            })?;
        if output.success {
            Ok(())
        } else {
            Err(InfraError::Command {
                command,
                message: "interactive configuration did not complete".to_string(),
                exit_code: output.exit_code,
            })
        }
    }

    fn publish_layer(
        &self,
        layer_name: &str,
        archive: &Path,
        runtime: &str,
    ) -> InfraResult<String> {
        let zip_file = format!("fileb://{}", archive.display());
        let globals = self.global_args();
        let args = with_globals(
            &[
                "lambda",
                "publish-layer-version",
                "--layer-name",
                layer_name,
                "--zip-file",
                &zip_file,
                "--compatible-runtimes",
                runtime,
                "--output",
                "json",
            ],
            &globals,
        );
        let output = run_checked(self.cmd.as_ref(), &self.config.cli, &args)?;
        Ok(output.stdout)
    }
}
