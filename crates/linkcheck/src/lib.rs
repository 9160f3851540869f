// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Native Linkage Verification for Rust
//!
//! Builds a release binary, inspects the dynamic libraries it records for
//! load time, and asserts that the set equals an expected baseline. The
//! check is meant to run as a regression gate: a new crate that quietly
//! pulls in a system library shows up as a failed comparison instead of a
//! surprise on a customer device.
//!
//! The pipeline is strictly sequential:
//!
//! 1. [`builder::BuildCommand`] runs `cargo build --release`
//! 2. [`inspect::Inspector`] runs `otool -L` or `ldd` on the artifact
//! 3. [`parse::parse_linkage`] extracts library paths from the tool output
//! 4. [`compare::compare`] sorts both sides and compares them exactly
//!
//! # Quick Start
//!
//! ```no_run
//! use linkcheck::baseline::Baseline;
//! use linkcheck::builder::BuildCommand;
//! use linkcheck::check::LinkageCheck;
//! use linkcheck::inspect::Inspector;
//!
//! let check = LinkageCheck::build(BuildCommand::new("linkcheck-fixture"))
//!     .with_inspector(Inspector::for_host()?)
//!     .with_baseline(Baseline::for_host()?);
//!
//! let report = check.run()?;
//! report.verify()?;
//! # Ok::<(), linkcheck::Error>(())
//! ```
//!
//! # Parsing Only
//!
//! ```
//! use linkcheck::parse::parse_linkage;
//!
//! let output = "target/release/app:\n\
//!     \t/usr/lib/libiconv.2.dylib (compatibility version 7.0.0)\n\
//!     \t/usr/lib/libSystem.B.dylib (compatibility version 1.0.0)\n";
//! let libs = parse_linkage(output);
//! assert_eq!(libs.len(), 2);
//! ```

use std::{
    error, fmt, io,
    path::PathBuf,
    process::ExitStatus,
    time::Duration,
};

/// Error type for linkage verification
#[derive(Debug)]
pub enum Error {
    /// Spawning or waiting on a child process failed
    Io(io::Error),

    /// The build tool could not be started
    BuildSpawn { program: String, source: io::Error },

    /// The build tool exited unsuccessfully
    BuildFailed {
        /// Exit status reported by the build tool
        status: ExitStatus,
        /// Trailing lines of the build tool's stderr
        stderr: String,
    },

    /// The binary to inspect does not exist
    ArtifactMissing(PathBuf),

    /// The inspection tool exited unsuccessfully
    InspectFailed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    /// A child process exceeded its deadline and was killed
    Timeout { program: String, after: Duration },

    /// No default inspector or baseline exists for the host platform
    UnsupportedPlatform(String),

    /// Repeated inspections of the same binary disagreed
    Unstable {
        /// 1-based index of the run that diverged
        run: u32,
        first: Vec<String>,
        latest: Vec<String>,
    },

    /// The observed linkage set differs from the expected set
    Mismatch(compare::Comparison),

    /// An expectation file could not be read or parsed
    Expectation(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::BuildSpawn { program, source } => {
                write!(f, "could not run {}: {}", program, source)
            }
            Error::BuildFailed { status, stderr } => {
                write!(f, "build failed ({})", status)?;
                if !stderr.is_empty() {
                    write!(f, ":\n{}", stderr)?;
                }
                Ok(())
            }
            Error::ArtifactMissing(path) => {
                write!(f, "binary not found: {}", path.display())
            }
            Error::InspectFailed {
                program,
                status,
                stderr,
            } => {
                write!(f, "{} failed ({})", program, status)?;
                if !stderr.is_empty() {
                    write!(f, ": {}", stderr.trim())?;
                }
                Ok(())
            }
            Error::Timeout { program, after } => {
                write!(f, "{} did not finish within {:?}", program, after)
            }
            Error::UnsupportedPlatform(os) => {
                write!(f, "no built-in linkage inspector or baseline for {}", os)
            }
            Error::Unstable { run, first, latest } => write!(
                f,
                "inspection run {} disagreed with run 1\n  run 1: {:?}\n  run {}: {:?}",
                run, first, run, latest
            ),
            Error::Mismatch(comparison) => write!(f, "{}", comparison),
            Error::Expectation(msg) => write!(f, "invalid expectation: {}", msg),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::BuildSpawn { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

/// The process module runs child processes with captured output and deadlines.
pub mod process;

/// The builder module invokes the native build tool in release mode.
pub mod builder;

/// The inspect module runs the platform binary inspection tool.
pub mod inspect;

/// The parse module extracts library paths from inspection output.
pub mod parse;

/// The compare module checks observed linkage against expectations.
pub mod compare;

/// The baseline module provides expected linkage sets.
pub mod baseline;

/// The check module composes build, inspection, and comparison.
pub mod check;

/// Get the linkcheck library version string
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_error_display() {
        let err = Error::ArtifactMissing(PathBuf::from("target/release/app"));
        assert_eq!(format!("{}", err), "binary not found: target/release/app");

        let err = Error::Timeout {
            program: "ldd".to_string(),
            after: Duration::from_secs(10),
        };
        assert_eq!(format!("{}", err), "ldd did not finish within 10s");

        let err = Error::UnsupportedPlatform("windows".to_string());
        assert!(format!("{}", err).contains("windows"));
    }

    #[test]
    fn test_error_source() {
        use std::error::Error as _;

        let err = Error::from(io::Error::new(io::ErrorKind::NotFound, "cargo"));
        assert!(err.source().is_some());
        assert!(Error::Expectation("bad".into()).source().is_none());
    }
}
