// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use crate::{parse::LinkageSet, Error};
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};

/// System libraries every Rust release binary links on macOS
pub const MACOS_BASELINE: [&str; 2] = ["/usr/lib/libiconv.2.dylib", "/usr/lib/libSystem.B.dylib"];

/// Expected linkage set
///
/// Serialized form, as read by [`Baseline::from_json_file`]:
///
/// ```json
/// {
///   "platform": "macos",
///   "libraries": ["/usr/lib/libiconv.2.dylib", "/usr/lib/libSystem.B.dylib"]
/// }
/// ```
///
/// `platform` is informational and may be omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Baseline {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    pub libraries: Vec<String>,
}

impl Baseline {
    pub fn new<I, S>(libraries: I) -> Baseline
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Baseline {
            platform: None,
            libraries: libraries.into_iter().map(Into::into).collect(),
        }
    }

    pub fn macos() -> Baseline {
        Baseline {
            platform: Some("macos".to_string()),
            ..Baseline::new(MACOS_BASELINE)
        }
    }

    /// Built-in baseline for the host platform
    ///
    /// Only macOS has a fixed baseline. Linux results depend on the libc,
    /// architecture, and loader path, so callers there supply their own.
    pub fn for_host() -> Result<Baseline, Error> {
        if cfg!(target_os = "macos") {
            Ok(Baseline::macos())
        } else {
            Err(Error::UnsupportedPlatform(env::consts::OS.to_string()))
        }
    }

    pub fn from_json_str(json: &str) -> Result<Baseline, Error> {
        serde_json::from_str(json).map_err(|e| Error::Expectation(e.to_string()))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Baseline, Error> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| Error::Expectation(format!("{}: {}", path.display(), e)))?;
        let baseline: Baseline = serde_json::from_str(&json)
            .map_err(|e| Error::Expectation(format!("{}: {}", path.display(), e)))?;
        log::debug!(
            "Loaded {} expected libraries from {}",
            baseline.libraries.len(),
            path.display()
        );
        Ok(baseline)
    }

    pub fn as_set(&self) -> LinkageSet {
        LinkageSet::new(self.libraries.iter().cloned())
    }
}
