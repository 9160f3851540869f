// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use crate::error::CliError;
use crate::utils::{print_libraries, InspectorArgs};
use clap::Args as ClapArgs;
use linkcheck::inspect::Tool;
use serde::Serialize;
use std::path::PathBuf;

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Binary to inspect
    binary: PathBuf,

    /// Print libraries in lexicographic order instead of tool order
    #[arg(long)]
    sort: bool,

    #[command(flatten)]
    inspector: InspectorArgs,
}

#[derive(Debug, Serialize)]
struct InspectOutput {
    binary: PathBuf,
    tool: Tool,
    elapsed_ms: u64,
    libraries: Vec<String>,
}

pub fn execute(args: Args, json: bool) -> Result<(), CliError> {
    log::debug!("Executing inspect command: {:?}", args);

    let inspector = args.inspector.inspector()?;
    let inspection = inspector.inspect(&args.binary)?;
    let linkage = inspection.linkage();

    let output = InspectOutput {
        binary: inspection.binary,
        tool: inspection.tool,
        elapsed_ms: inspection.elapsed.as_millis() as u64,
        libraries: if args.sort {
            linkage.sorted()
        } else {
            linkage.into_inner()
        },
    };

    if json {
        let json_str = serde_json::to_string_pretty(&output)
            .map_err(|e| CliError::General(format!("JSON serialization failed: {}", e)))?;
        println!("{}", json_str);
    } else {
        println!("Binary: {}", output.binary.display());
        println!("Tool:   {}", output.tool);
        println!();
        print_libraries("Libraries", &output.libraries);
    }

    Ok(())
}
