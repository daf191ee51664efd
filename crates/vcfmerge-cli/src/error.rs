use anyhow::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error as ThisError;
use vcfmerge_config::ConfigError;

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_INVALID_CONFIG: u8 = 3;

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error("The file '{0}' was not found.")]
    InputNotFound(PathBuf),
}

pub fn input_not_found(path: PathBuf) -> Error {
    CliError::InputNotFound(path).into()
}

/// A missing input file is a user-facing outcome and goes to stdout; every
/// other failure is reported on stderr.
pub fn report_error(err: &Error, verbose: bool) {
    if let Some(CliError::InputNotFound(_)) = err.downcast_ref::<CliError>() {
        println!("Error: {}", err);
        return;
    }
    if verbose {
        eprintln!("error: {:#}", err);
    } else {
        eprintln!("error: {}", err);
    }
}

pub fn exit_code_for(err: &Error) -> ExitCode {
    ExitCode::from(exit_status_for(err))
}

fn exit_status_for(err: &Error) -> u8 {
    for cause in err.chain() {
        if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            return config_exit_code(config_err);
        }
    }
    EXIT_FAILURE
}

fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::MissingHomeDir | ConfigError::Read { .. } => EXIT_FAILURE,
        ConfigError::InvalidConfigPath(_)
        | ConfigError::MissingConfigFile(_)
        | ConfigError::InvalidDefaultCountry(_)
        | ConfigError::EmptyOutput
        | ConfigError::Parse { .. } => EXIT_INVALID_CONFIG,
    }
}
