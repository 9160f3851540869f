// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use crate::error::CliError;
use crate::utils::{parse_timeout, print_report, ExpectArgs, InspectorArgs};
use clap::Args as ClapArgs;
use linkcheck::builder::{BuildCommand, DEFAULT_BIN};
use linkcheck::check::LinkageCheck;
use std::path::PathBuf;

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Directory to run the build tool in (workspace root)
    #[arg(long, value_name = "DIR", default_value = ".")]
    manifest_dir: PathBuf,

    /// Package containing the binary
    #[arg(short, long, value_name = "PKG")]
    package: Option<String>,

    /// Binary target to build and verify
    #[arg(long, value_name = "NAME", default_value = DEFAULT_BIN)]
    bin: String,

    /// Target directory for the release build
    #[arg(long, value_name = "DIR")]
    target_dir: Option<PathBuf>,

    /// Build timeout in seconds (0 waits indefinitely)
    #[arg(long, value_name = "SECS", default_value_t = 0.0)]
    build_timeout: f64,

    /// Skip the build and verify an existing binary
    #[arg(long, value_name = "PATH", conflicts_with_all = ["package", "bin", "manifest_dir", "target_dir", "build_timeout"])]
    binary: Option<PathBuf>,

    /// Inspect the binary this many times and require identical results
    #[arg(long, value_name = "N", default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    repeat: u32,

    #[command(flatten)]
    inspector: InspectorArgs,

    #[command(flatten)]
    expect: ExpectArgs,
}

pub fn execute(args: Args, json: bool) -> Result<(), CliError> {
    log::debug!("Executing check command: {:?}", args);

    // Resolve expectations and tooling before spending time on a build
    let baseline = args.expect.baseline()?;
    let inspector = args.inspector.inspector()?;

    let check = match &args.binary {
        Some(path) => LinkageCheck::prebuilt(path),
        None => {
            let mut build = BuildCommand::new(&args.bin)
                .with_manifest_dir(&args.manifest_dir)
                .with_timeout(parse_timeout(args.build_timeout)?);
            if let Some(package) = &args.package {
                build = build.with_package(package);
            }
            if let Some(dir) = &args.target_dir {
                build = build.with_target_dir(dir);
            }
            LinkageCheck::build(build)
        }
    };

    let report = check
        .with_inspector(inspector)
        .with_baseline(baseline)
        .with_runs(args.repeat)
        .run()?;

    print_report(&report, json)?;
    report.verify()?;
    Ok(())
}
