// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use crate::error::CliError;
use clap::{Args as ClapArgs, ValueEnum};
use linkcheck::baseline::Baseline;
use linkcheck::check::CheckReport;
use linkcheck::inspect::{Inspector, DEFAULT_INSPECT_TIMEOUT};
use std::path::PathBuf;
use std::time::Duration;

/// Inspection tool selectable on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolArg {
    /// otool -L (macOS)
    Otool,
    /// ldd (Linux and other Unix systems)
    Ldd,
}

/// Options selecting and configuring the inspection tool
#[derive(ClapArgs, Debug)]
pub struct InspectorArgs {
    /// Inspection tool (defaults to otool on macOS, ldd elsewhere)
    #[arg(long, value_enum)]
    tool: Option<ToolArg>,

    /// Custom inspection command; its output must start with a header line
    #[arg(long, value_name = "PROGRAM", conflicts_with = "tool")]
    tool_cmd: Option<String>,

    /// Extra argument for --tool-cmd, placed before the binary path (repeatable)
    #[arg(long, value_name = "ARG", requires = "tool_cmd", allow_hyphen_values = true)]
    tool_arg: Vec<String>,

    /// Inspection timeout in seconds (0 waits indefinitely)
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_INSPECT_TIMEOUT.as_secs_f64())]
    inspect_timeout: f64,
}

impl InspectorArgs {
    pub fn inspector(&self) -> Result<Inspector, CliError> {
        let inspector = match (&self.tool_cmd, self.tool) {
            (Some(program), _) => Inspector::custom(program, &self.tool_arg),
            (None, Some(ToolArg::Otool)) => Inspector::otool(),
            (None, Some(ToolArg::Ldd)) => Inspector::ldd(),
            (None, None) => Inspector::for_host()?,
        };
        Ok(inspector.with_timeout(parse_timeout(self.inspect_timeout)?))
    }
}

/// Options describing the expected linkage set
#[derive(ClapArgs, Debug)]
pub struct ExpectArgs {
    /// Expected library path (repeatable)
    #[arg(long, value_name = "LIB")]
    expect: Vec<String>,

    /// JSON file with {"libraries": [...]}
    #[arg(long, value_name = "FILE", conflicts_with = "expect")]
    expect_file: Option<PathBuf>,
}

impl ExpectArgs {
    pub fn is_empty(&self) -> bool {
        self.expect.is_empty() && self.expect_file.is_none()
    }

    /// Expected libraries from flags, a file, or the host default
    pub fn baseline(&self) -> Result<Baseline, CliError> {
        if let Some(path) = &self.expect_file {
            return Ok(Baseline::from_json_file(path)?);
        }
        if !self.expect.is_empty() {
            return Ok(Baseline::new(self.expect.iter().cloned()));
        }
        Baseline::for_host().map_err(|e| {
            CliError::InvalidArgs(format!("{}; pass --expect or --expect-file", e))
        })
    }
}

/// Convert a timeout in seconds, where 0 means no timeout
pub fn parse_timeout(secs: f64) -> Result<Option<Duration>, CliError> {
    if secs == 0.0 {
        return Ok(None);
    }
    match Duration::try_from_secs_f64(secs) {
        // Rounds to zero, which would expire before the child starts
        Ok(timeout) if timeout.is_zero() => Err(CliError::InvalidArgs(format!(
            "Timeout is too small: {} seconds",
            secs
        ))),
        Ok(timeout) => Ok(Some(timeout)),
        Err(e) => Err(CliError::InvalidArgs(format!(
            "Timeout must be a non-negative number of seconds: {} ({})",
            secs, e
        ))),
    }
}

/// Print a list of libraries with a heading
pub fn print_libraries(heading: &str, libraries: &[String]) {
    println!("{} ({}):", heading, libraries.len());
    for lib in libraries {
        println!("  {}", lib);
    }
}

/// Print a check report as JSON or text
pub fn print_report(report: &CheckReport, json: bool) -> Result<(), CliError> {
    if json {
        let json_str = serde_json::to_string_pretty(report)
            .map_err(|e| CliError::General(format!("JSON serialization failed: {}", e)))?;
        println!("{}", json_str);
        return Ok(());
    }

    println!("Binary: {}", report.binary.display());
    println!("Tool:   {}", report.tool);
    if let Some(ms) = report.build_ms {
        println!("Build:  {:.1}s", ms as f64 / 1000.0);
    }
    if report.runs > 1 {
        println!("Runs:   {}", report.runs);
    }
    println!();
    print_libraries("Expected", &report.comparison.expected);
    print_libraries("Observed", &report.comparison.observed);

    if !report.comparison.missing.is_empty() {
        print_libraries("Missing", &report.comparison.missing);
    }
    if !report.comparison.unexpected.is_empty() {
        print_libraries("Unexpected", &report.comparison.unexpected);
    }

    println!();
    if report.passed {
        println!("PASS: linkage matches the expected set");
    } else {
        println!("FAIL: linkage differs from the expected set");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout(0.0).unwrap(), None);
        assert_eq!(parse_timeout(10.0).unwrap(), Some(Duration::from_secs(10)));
        assert_eq!(
            parse_timeout(2.5).unwrap(),
            Some(Duration::from_millis(2500))
        );
    }

    #[test]
    fn test_parse_timeout_invalid() {
        assert!(parse_timeout(-1.0).is_err());
        assert!(parse_timeout(f64::NAN).is_err());
        assert!(parse_timeout(f64::INFINITY).is_err());
        assert!(parse_timeout(1e30).is_err());
        assert!(parse_timeout(1e-12).is_err());
    }

    #[test]
    fn test_expect_flags() {
        let args = ExpectArgs {
            expect: vec!["libc.so.6".into(), "libm.so.6".into()],
            expect_file: None,
        };
        assert!(!args.is_empty());
        assert_eq!(args.baseline().unwrap().libraries, ["libc.so.6", "libm.so.6"]);
    }

    #[test]
    fn test_custom_tool_cmd() {
        let args = InspectorArgs {
            tool: None,
            tool_cmd: Some("cat".into()),
            tool_arg: vec![],
            inspect_timeout: 0.0,
        };
        let inspector = args.inspector().unwrap();
        assert_eq!(inspector.tool(), linkcheck::inspect::Tool::Custom);
        assert_eq!(inspector.timeout(), None);
    }
}
