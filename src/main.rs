//! Binary entry point for the `ci-trigger` CLI.

use std::io::{self, Write};
use std::process;

use ci_trigger::{
    ApiError, BuildSubmitter, CloudBuildClient, DeviceCatalog, DirTree, GcsStore, SubmitError,
    SubmittedJob, SubmitterConfig,
};
use clap::Parser;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use cli::{Cli, SubmitCommand};

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("device catalog error: {0}")]
    Devices(String),
    #[error("no devices match platform {0}")]
    NoDevices(String),
    #[error("cannot open source tree {path}: {message}")]
    Source { path: String, message: String },
    #[error("submission for {platform} failed: {source}")]
    Submit {
        platform: String,
        #[source]
        source: Box<SubmitError<ApiError, ApiError>>,
    },
    #[error("build {job_id} for {platform} was created but could not be reported: {message}")]
    Output {
        platform: String,
        job_id: String,
        message: String,
    },
}

impl CliError {
    fn outcome_unknown(&self) -> bool {
        match self {
            Self::Submit { source, .. } => source.outcome_unknown(),
            _ => false,
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let exit_code = match dispatch(cli).await {
        Ok(()) => 0,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ci_trigger=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

async fn dispatch(cli: Cli) -> Result<(), CliError> {
    match cli {
        Cli::Submit(command) => submit_command(command).await,
    }
}

async fn submit_command(args: SubmitCommand) -> Result<(), CliError> {
    let catalog =
        DeviceCatalog::load(&args.devices).map_err(|err| CliError::Devices(err.to_string()))?;
    let devices = catalog.select(args.platform.as_deref());
    if devices.is_empty() {
        return Err(CliError::NoDevices(
            args.platform.unwrap_or_else(|| String::from("<any>")),
        ));
    }

    let tree = DirTree::open(&args.source).map_err(|err| CliError::Source {
        path: args.source.to_string(),
        message: err.to_string(),
    })?;

    let config =
        SubmitterConfig::load_without_cli_args().map_err(|err| CliError::Config(err.to_string()))?;
    let target = config
        .target()
        .map_err(|err| CliError::Config(err.to_string()))?;
    let submitter = BuildSubmitter::new(
        GcsStore::from_config(&config),
        CloudBuildClient::from_config(&config),
        target,
    );

    for device in devices {
        let platform = device.device_type.platform_key();
        let job = submitter
            .submit(device, &tree)
            .await
            .map_err(|source| CliError::Submit {
                platform: platform.clone(),
                source: Box::new(source),
            })?;
        report_job(io::stdout(), &platform, &job)?;
    }

    Ok(())
}

fn render_job(platform: &str, job: &SubmittedJob) -> String {
    format!("{platform} {} {}", job.job_id, job.log_url)
}

fn report_job(mut target: impl Write, platform: &str, job: &SubmittedJob) -> Result<(), CliError> {
    writeln!(target, "{}", render_job(platform, job)).map_err(|err| CliError::Output {
        platform: platform.to_owned(),
        job_id: job.job_id.clone(),
        message: err.to_string(),
    })
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
    if err.outcome_unknown() {
        writeln!(
            target,
            "the build may have been created; check the build history before retrying"
        )
        .ok();
    }
}
