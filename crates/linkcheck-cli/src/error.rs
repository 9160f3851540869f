// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use std::fmt;
use std::process::ExitCode;

/// CLI-specific error type with exit code mapping
#[derive(Debug)]
pub enum CliError {
    /// Invalid command-line arguments or expectation input
    InvalidArgs(String),
    /// Build tool failed or produced no binary
    BuildFailed(String),
    /// Inspection tool failed or is unavailable
    InspectFailed(String),
    /// Observed linkage differs from the expected set
    Mismatch(String),
    /// Build or inspection timed out
    Timeout(String),
    /// General error
    General(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::InvalidArgs(msg) => write!(f, "Invalid arguments: {}", msg),
            CliError::BuildFailed(msg) => write!(f, "Build failed: {}", msg),
            CliError::InspectFailed(msg) => write!(f, "Inspection failed: {}", msg),
            CliError::Mismatch(msg) => write!(f, "Linkage check failed: {}", msg),
            CliError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            CliError::General(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::InvalidArgs(_) => ExitCode::from(2),
            CliError::BuildFailed(_) => ExitCode::from(3),
            CliError::InspectFailed(_) => ExitCode::from(4),
            CliError::Mismatch(_) => ExitCode::from(5),
            CliError::Timeout(_) => ExitCode::from(6),
            CliError::General(_) => ExitCode::from(1),
        }
    }
}

/// Map linkcheck::Error to CliError with appropriate exit codes
impl From<linkcheck::Error> for CliError {
    fn from(err: linkcheck::Error) -> Self {
        use linkcheck::Error;

        match err {
            Error::BuildSpawn { .. } | Error::BuildFailed { .. } | Error::ArtifactMissing(_) => {
                CliError::BuildFailed(err.to_string())
            }
            Error::InspectFailed { .. } | Error::UnsupportedPlatform(_) | Error::Unstable { .. } => {
                CliError::InspectFailed(err.to_string())
            }
            Error::Mismatch(comparison) => CliError::Mismatch(comparison.to_string()),
            Error::Timeout { .. } => CliError::Timeout(err.to_string()),
            Error::Expectation(msg) => CliError::InvalidArgs(msg),
            Error::Io(io_err) => match io_err.kind() {
                std::io::ErrorKind::NotFound => {
                    CliError::InspectFailed(format!("Tool not found: {}", io_err))
                }
                std::io::ErrorKind::TimedOut => {
                    CliError::Timeout(format!("Operation timed out: {}", io_err))
                }
                _ => CliError::General(format!("I/O error: {}", io_err)),
            },
        }
    }
}

/// Helper function to convert result to exit code
pub fn result_to_exit_code<T>(result: Result<T, CliError>) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            e.exit_code()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            CliError::InvalidArgs("test".into()).exit_code(),
            ExitCode::from(2)
        );
        assert_eq!(
            CliError::BuildFailed("test".into()).exit_code(),
            ExitCode::from(3)
        );
        assert_eq!(
            CliError::InspectFailed("test".into()).exit_code(),
            ExitCode::from(4)
        );
        assert_eq!(
            CliError::Mismatch("test".into()).exit_code(),
            ExitCode::from(5)
        );
        assert_eq!(
            CliError::Timeout("test".into()).exit_code(),
            ExitCode::from(6)
        );
        assert_eq!(
            CliError::General("test".into()).exit_code(),
            ExitCode::from(1)
        );
    }

    #[test]
    fn test_error_display() {
        let err = CliError::BuildFailed("exit status: 101".to_string());
        assert_eq!(format!("{}", err), "Build failed: exit status: 101");
    }

    #[test]
    fn test_from_library_errors() {
        let err = CliError::from(linkcheck::Error::ArtifactMissing(PathBuf::from("app")));
        assert!(matches!(err, CliError::BuildFailed(_)));

        let err = CliError::from(linkcheck::Error::Timeout {
            program: "ldd".into(),
            after: Duration::from_secs(1),
        });
        assert!(matches!(err, CliError::Timeout(_)));

        let err = CliError::from(linkcheck::Error::Expectation("bad".into()));
        assert!(matches!(err, CliError::InvalidArgs(_)));

        let err = CliError::from(linkcheck::Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "otool",
        )));
        assert!(matches!(err, CliError::InspectFailed(_)));
    }

    #[test]
    fn test_missing_build_tool_is_build_failure() {
        let err = CliError::from(linkcheck::Error::BuildSpawn {
            program: "cargo".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        });
        assert!(matches!(err, CliError::BuildFailed(_)));
        assert_eq!(err.exit_code(), ExitCode::from(3));
        assert!(err.to_string().contains("could not run cargo"));
    }
}
