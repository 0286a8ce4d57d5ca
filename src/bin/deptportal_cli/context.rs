#![deny(clippy::all, clippy::pedantic)]

use deptportal::PortalClient;
use deptportal::config::{self, Settings};
use deptportal::infra::{error::ClientError, telemetry};
use deptportal::transport::ApiError;
use thiserror::Error;

use crate::args::Cli;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("{}", describe_api_error(.0))]
    Api(#[from] ApiError),
    #[error("failed to read input file {path}: {source}")]
    InputFile {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to render output: {0}")]
    Output(String),
}

impl From<config::LoadError> for CliError {
    fn from(error: config::LoadError) -> Self {
        Self::Client(ClientError::Config(error))
    }
}

fn describe_api_error(error: &ApiError) -> String {
    match error.status() {
        Some(status) => format!("server answered {status}: {}", error.message()),
        None => error.to_string(),
    }
}

/// Resolve settings from files, environment and flags.
pub fn settings_from_cli(cli: &Cli) -> Result<Settings, CliError> {
    Ok(config::load(&cli.overrides)?)
}

/// Install logging and build the client.
pub fn build_client(settings: &Settings) -> Result<PortalClient, CliError> {
    telemetry::init(&settings.logging)?;
    Ok(PortalClient::init(settings)?)
}
