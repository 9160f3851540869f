// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use crate::{process, Error};
use std::{
    env,
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::Command,
    time::Duration,
};

/// Binary built when no other target is named
pub const DEFAULT_BIN: &str = "linkcheck-fixture";

/// Number of stderr lines kept in [`Error::BuildFailed`]
const STDERR_TAIL_LINES: usize = 40;

/// Release build of a single binary target
///
/// The target directory is always passed to the build tool explicitly so the
/// artifact lands at a known path, independent of workspace layout.
#[derive(Debug, Clone)]
pub struct BuildCommand {
    /// build tool executable, `$CARGO` or `cargo`
    program: OsString,

    /// directory the build tool runs in
    manifest_dir: PathBuf,

    /// optional `--package` selection
    package: Option<String>,

    /// binary target name
    bin: String,

    /// explicit target directory, otherwise `$CARGO_TARGET_DIR` or `target`
    target_dir: Option<PathBuf>,

    /// optional build deadline, unbounded by default
    timeout: Option<Duration>,
}

impl BuildCommand {
    pub fn new(bin: &str) -> BuildCommand {
        BuildCommand {
            program: env::var_os("CARGO").unwrap_or_else(|| OsString::from("cargo")),
            manifest_dir: PathBuf::from("."),
            package: None,
            bin: bin.to_owned(),
            target_dir: None,
            timeout: None,
        }
    }

    pub fn with_program<S: AsRef<OsStr>>(self, program: S) -> BuildCommand {
        BuildCommand {
            program: program.as_ref().to_owned(),
            ..self
        }
    }

    pub fn with_manifest_dir<P: AsRef<Path>>(self, dir: P) -> BuildCommand {
        BuildCommand {
            manifest_dir: dir.as_ref().to_owned(),
            ..self
        }
    }

    pub fn with_package(self, package: &str) -> BuildCommand {
        BuildCommand {
            package: Some(package.to_owned()),
            ..self
        }
    }

    pub fn with_target_dir<P: AsRef<Path>>(self, dir: P) -> BuildCommand {
        BuildCommand {
            target_dir: Some(dir.as_ref().to_owned()),
            ..self
        }
    }

    pub fn with_timeout(self, timeout: Option<Duration>) -> BuildCommand {
        BuildCommand { timeout, ..self }
    }

    pub fn bin(&self) -> &str {
        &self.bin
    }

    /// Resolved target directory
    ///
    /// Relative paths, including a relative `$CARGO_TARGET_DIR`, are taken
    /// relative to the manifest directory, as the build tool would.
    pub fn target_dir(&self) -> PathBuf {
        let dir = self
            .target_dir
            .clone()
            .or_else(|| env::var_os("CARGO_TARGET_DIR").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("target"));

        if dir.is_absolute() {
            dir
        } else {
            self.manifest_dir.join(dir)
        }
    }

    /// Path of the release binary once the build has succeeded
    pub fn artifact_path(&self) -> PathBuf {
        self.target_dir()
            .join("release")
            .join(format!("{}{}", self.bin, env::consts::EXE_SUFFIX))
    }

    /// Arguments passed to the build tool
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["build".into(), "--release".into()];
        if let Some(package) = &self.package {
            args.push("--package".into());
            args.push(package.into());
        }
        args.push("--bin".into());
        args.push(self.bin.as_str().into());
        args.push("--target-dir".into());
        args.push(self.target_dir().into_os_string());
        args
    }

    /// Run the build and return the path of the produced binary
    ///
    /// Blocks until the build tool exits. Any unsuccessful exit is a hard
    /// stop reported as [`Error::BuildFailed`]; nothing is retried. A build
    /// tool that cannot be started is [`Error::BuildSpawn`].
    pub fn run(&self) -> Result<PathBuf, Error> {
        log::info!(
            "Building {} (release) in {}",
            self.bin,
            self.manifest_dir.display()
        );

        let mut command = Command::new(&self.program);
        command.args(self.args()).current_dir(&self.manifest_dir);

        let captured =
            process::run_captured(&mut command, self.timeout).map_err(|err| match err {
                Error::Io(source) => Error::BuildSpawn {
                    program: self.program.to_string_lossy().into_owned(),
                    source,
                },
                other => other,
            })?;
        let stderr = captured.stderr_lossy();
        if !captured.status.success() {
            return Err(Error::BuildFailed {
                status: captured.status,
                stderr: process::tail(&stderr, STDERR_TAIL_LINES),
            });
        }
        for line in stderr.lines() {
            log::debug!("build: {}", line);
        }

        let artifact = self.artifact_path();
        if !artifact.is_file() {
            return Err(Error::ArtifactMissing(artifact));
        }

        log::info!(
            "Built {} in {:.1}s",
            artifact.display(),
            captured.elapsed.as_secs_f64()
        );
        Ok(artifact)
    }
}
