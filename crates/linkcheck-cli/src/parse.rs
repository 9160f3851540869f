// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Offline verification of saved `otool -L` style output.

use crate::error::CliError;
use crate::utils::{print_libraries, ExpectArgs};
use clap::Args as ClapArgs;
use linkcheck::compare::{compare, Comparison};
use linkcheck::parse::parse_linkage;
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// File with inspection output, or - for stdin
    input: PathBuf,

    #[command(flatten)]
    expect: ExpectArgs,
}

#[derive(Debug, Serialize)]
struct ParseOutput {
    libraries: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comparison: Option<Comparison>,
}

pub fn execute(args: Args, json: bool) -> Result<(), CliError> {
    log::debug!("Executing parse command: {:?}", args);

    let text = read_input(&args.input)?;
    let linkage = parse_linkage(&text);

    // Only compare when expectations were given explicitly
    let comparison = if args.expect.is_empty() {
        None
    } else {
        let baseline = args.expect.baseline()?;
        Some(compare(&baseline.as_set(), &linkage))
    };

    let output = ParseOutput {
        libraries: linkage.into_inner(),
        comparison,
    };

    if json {
        let json_str = serde_json::to_string_pretty(&output)
            .map_err(|e| CliError::General(format!("JSON serialization failed: {}", e)))?;
        println!("{}", json_str);
    } else {
        print_libraries("Libraries", &output.libraries);
        if let Some(comparison) = &output.comparison {
            println!();
            println!("{}", comparison);
        }
    }

    if let Some(comparison) = &output.comparison {
        comparison.verify()?;
    }
    Ok(())
}

fn read_input(input: &Path) -> Result<String, CliError> {
    if input.as_os_str() == "-" {
        let mut bytes = Vec::new();
        io::stdin()
            .read_to_end(&mut bytes)
            .map_err(|e| CliError::General(format!("Failed to read stdin: {}", e)))?;
        return Ok(String::from_utf8_lossy(&bytes).into_owned());
    }

    // Decoded lossily, as live inspection output is
    let bytes = fs::read(input).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => {
            CliError::InvalidArgs(format!("Input not found: {}", input.display()))
        }
        _ => CliError::General(format!("Failed to read {}: {}", input.display(), e)),
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
