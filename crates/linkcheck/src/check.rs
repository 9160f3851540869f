// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use crate::{
    baseline::Baseline,
    builder::BuildCommand,
    compare::{compare, Comparison},
    inspect::{Inspector, Tool},
    Error,
};
use serde::Serialize;
use std::{
    path::{Path, PathBuf},
    time::Instant,
};

/// Where the binary under test comes from
#[derive(Debug, Clone)]
pub enum Target {
    /// Build it first
    Build(BuildCommand),
    /// Use an existing binary as-is
    Prebuilt(PathBuf),
}

/// Build, inspect, and compare, in that order
///
/// Each step finishes before the next starts. A failed build stops the check
/// before any inspection is attempted.
#[derive(Debug, Clone)]
pub struct LinkageCheck {
    target: Target,

    /// inspector, host default when unset
    inspector: Option<Inspector>,

    /// expected libraries, host default when unset
    baseline: Option<Baseline>,

    /// number of inspection runs, at least one
    runs: u32,
}

impl LinkageCheck {
    pub fn build(build: BuildCommand) -> LinkageCheck {
        LinkageCheck::new(Target::Build(build))
    }

    pub fn prebuilt<P: AsRef<Path>>(binary: P) -> LinkageCheck {
        LinkageCheck::new(Target::Prebuilt(binary.as_ref().to_owned()))
    }

    pub fn new(target: Target) -> LinkageCheck {
        LinkageCheck {
            target,
            inspector: None,
            baseline: None,
            runs: 1,
        }
    }

    pub fn with_inspector(self, inspector: Inspector) -> LinkageCheck {
        LinkageCheck {
            inspector: Some(inspector),
            ..self
        }
    }

    pub fn with_baseline(self, baseline: Baseline) -> LinkageCheck {
        LinkageCheck {
            baseline: Some(baseline),
            ..self
        }
    }

    /// Inspect the binary `runs` times and require identical results
    pub fn with_runs(self, runs: u32) -> LinkageCheck {
        LinkageCheck {
            runs: runs.max(1),
            ..self
        }
    }

    /// Run the pipeline and report the comparison
    ///
    /// Build and inspection failures are returned as errors. A linkage
    /// mismatch is not an error here; it is recorded in the report so it
    /// can be printed in full. Use [`CheckReport::verify`] or
    /// [`LinkageCheck::assert`] to turn it into one.
    pub fn run(&self) -> Result<CheckReport, Error> {
        let inspector = match &self.inspector {
            Some(inspector) => inspector.clone(),
            None => Inspector::for_host()?,
        };
        let baseline = match &self.baseline {
            Some(baseline) => baseline.clone(),
            None => Baseline::for_host()?,
        };

        let (binary, build_ms) = match &self.target {
            Target::Build(build) => {
                let start = Instant::now();
                let binary = build.run()?;
                (binary, Some(start.elapsed().as_millis() as u64))
            }
            Target::Prebuilt(path) => (path.clone(), None),
        };

        log::info!(
            "Inspecting {} with {}",
            binary.display(),
            inspector.program().to_string_lossy()
        );

        let start = Instant::now();
        let first = inspector.inspect(&binary)?.linkage();
        for run in 2..=self.runs {
            let latest = inspector.inspect(&binary)?.linkage();
            if latest.sorted() != first.sorted() {
                return Err(Error::Unstable {
                    run,
                    first: first.sorted(),
                    latest: latest.sorted(),
                });
            }
        }
        let inspect_ms = start.elapsed().as_millis() as u64;

        let comparison = compare(&baseline.as_set(), &first);
        if comparison.matches() {
            log::info!("Linkage of {} matches the baseline", binary.display());
        } else {
            log::warn!("Linkage of {} differs from the baseline", binary.display());
        }

        Ok(CheckReport {
            binary,
            tool: inspector.tool(),
            built: build_ms.is_some(),
            build_ms,
            inspect_ms,
            runs: self.runs,
            passed: comparison.matches(),
            comparison,
        })
    }

    /// Run the pipeline and fail on any mismatch
    pub fn assert(&self) -> Result<CheckReport, Error> {
        let report = self.run()?;
        report.verify()?;
        Ok(report)
    }
}

/// Outcome of a [`LinkageCheck`]
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub binary: PathBuf,
    pub tool: Tool,
    pub built: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_ms: Option<u64>,
    pub inspect_ms: u64,
    pub runs: u32,
    pub passed: bool,
    #[serde(flatten)]
    pub comparison: Comparison,
}

impl CheckReport {
    pub fn verify(&self) -> Result<(), Error> {
        self.comparison.verify()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_at_least_one() {
        let check = LinkageCheck::prebuilt("/tmp/app").with_runs(0);
        assert_eq!(check.runs, 1);
        assert_eq!(check.with_runs(3).runs, 3);
    }

    #[test]
    fn test_missing_prebuilt_binary() {
        let check = LinkageCheck::prebuilt("/nonexistent/linkcheck/app")
            .with_inspector(Inspector::custom("cat", Vec::<String>::new()))
            .with_baseline(Baseline::macos());
        assert!(matches!(check.run(), Err(Error::ArtifactMissing(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_build_failure_stops_before_inspection() {
        // Inspector would fail to spawn if it were ever reached.
        let check = LinkageCheck::build(BuildCommand::new("app").with_program("false"))
            .with_inspector(Inspector::custom("linkcheck-no-such-program", ["-L"]))
            .with_baseline(Baseline::macos());
        assert!(matches!(check.run(), Err(Error::BuildFailed { .. })));
    }

    #[test]
    fn test_report_serializes_comparison_flat() {
        let comparison = compare(
            &Baseline::macos().as_set(),
            &Baseline::macos().as_set(),
        );
        let report = CheckReport {
            binary: PathBuf::from("target/release/app"),
            tool: Tool::Otool,
            built: false,
            build_ms: None,
            inspect_ms: 3,
            runs: 1,
            passed: true,
            comparison,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["tool"], "otool");
        assert_eq!(json["passed"], true);
        assert_eq!(json["expected"].as_array().unwrap().len(), 2);
        assert!(json.get("build_ms").is_none());
        assert!(report.verify().is_ok());
    }
}
