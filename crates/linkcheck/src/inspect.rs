// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use crate::{
    parse::{parse_linkage, LinkageSet},
    process, Error,
};
use serde::Serialize;
use std::{
    env,
    ffi::{OsStr, OsString},
    fmt,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    process::Command,
    time::Duration,
};

/// Deadline for a single inspection run
pub const DEFAULT_INSPECT_TIMEOUT: Duration = Duration::from_secs(10);

/// `ldd` output for a static-pie executable
const LDD_STATIC_LINKED: &str = "statically linked";

/// `ldd` output for any file it cannot load, static ELF or not
const LDD_NOT_DYNAMIC: &str = "not a dynamic executable";

const ELF_MAGIC: [u8; 4] = *b"\x7fELF";

/// Binary inspection tool family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// `otool -L`, prints its own header line
    Otool,
    /// `ldd`, prints no header for a single binary
    Ldd,
    /// Any command whose output already starts with a header line
    Custom,
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Tool::Otool => write!(f, "otool"),
            Tool::Ldd => write!(f, "ldd"),
            Tool::Custom => write!(f, "custom"),
        }
    }
}

/// Runs an inspection tool against a binary
///
/// The binary path is appended after the configured arguments. Output is
/// normalised so the first line always identifies the binary, which is
/// what [`parse_linkage`] expects.
#[derive(Debug, Clone)]
pub struct Inspector {
    tool: Tool,
    program: OsString,
    args: Vec<OsString>,
    timeout: Option<Duration>,
}

impl Inspector {
    pub fn otool() -> Inspector {
        Inspector {
            tool: Tool::Otool,
            program: OsString::from("otool"),
            args: vec![OsString::from("-L")],
            timeout: Some(DEFAULT_INSPECT_TIMEOUT),
        }
    }

    pub fn ldd() -> Inspector {
        Inspector {
            tool: Tool::Ldd,
            program: OsString::from("ldd"),
            args: Vec::new(),
            timeout: Some(DEFAULT_INSPECT_TIMEOUT),
        }
    }

    pub fn custom<P, I, S>(program: P, args: I) -> Inspector
    where
        P: AsRef<OsStr>,
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        Inspector {
            tool: Tool::Custom,
            program: program.as_ref().to_owned(),
            args: args.into_iter().map(|a| a.as_ref().to_owned()).collect(),
            timeout: Some(DEFAULT_INSPECT_TIMEOUT),
        }
    }

    /// Default inspector for the host: `otool` on Apple platforms, `ldd` on
    /// other Unix systems
    pub fn for_host() -> Result<Inspector, Error> {
        if cfg!(any(target_os = "macos", target_os = "ios")) {
            Ok(Inspector::otool())
        } else if cfg!(unix) {
            Ok(Inspector::ldd())
        } else {
            Err(Error::UnsupportedPlatform(env::consts::OS.to_string()))
        }
    }

    /// Replace the inspection deadline, `None` waits indefinitely
    pub fn with_timeout(self, timeout: Option<Duration>) -> Inspector {
        Inspector { timeout, ..self }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run the tool against `binary` and capture its output
    pub fn inspect(&self, binary: &Path) -> Result<Inspection, Error> {
        if !binary.exists() {
            return Err(Error::ArtifactMissing(binary.to_owned()));
        }

        let mut command = Command::new(&self.program);
        command.args(&self.args).arg(binary);
        let captured = process::run_captured(&mut command, self.timeout)?;
        let stdout = captured.stdout_lossy();
        let stderr = captured.stderr_lossy();

        let body = if self.tool == Tool::Ldd && is_static_report(binary, &stdout, &stderr) {
            log::info!("{} is statically linked", binary.display());
            String::new()
        } else if !captured.status.success() {
            return Err(Error::InspectFailed {
                program: self.program.to_string_lossy().into_owned(),
                status: captured.status,
                stderr,
            });
        } else {
            stdout
        };

        Ok(Inspection {
            binary: binary.to_owned(),
            tool: self.tool,
            output: self.normalize(binary, body),
            elapsed: captured.elapsed,
        })
    }

    fn normalize(&self, binary: &Path, body: String) -> String {
        match self.tool {
            Tool::Ldd => format!("{}:\n{}", binary.display(), body),
            Tool::Otool | Tool::Custom => body,
        }
    }
}

/// Whether `ldd` output describes a statically linked ELF binary
///
/// `ldd` says "not a dynamic executable" for text files and scripts too, so
/// that message only counts when the file really is ELF.
fn is_static_report(binary: &Path, stdout: &str, stderr: &str) -> bool {
    let reported = |marker: &str| stdout.contains(marker) || stderr.contains(marker);
    if reported(LDD_STATIC_LINKED) {
        return true;
    }
    reported(LDD_NOT_DYNAMIC) && is_elf(binary)
}

fn is_elf(path: &Path) -> bool {
    let mut magic = [0u8; 4];
    File::open(path)
        .and_then(|mut file| file.read_exact(&mut magic))
        .map(|_| magic == ELF_MAGIC)
        .unwrap_or(false)
}

/// Captured inspection output for one binary
#[derive(Debug, Clone)]
pub struct Inspection {
    pub binary: PathBuf,
    pub tool: Tool,
    /// Tool output, first line identifying the binary
    pub output: String,
    pub elapsed: Duration,
}

impl Inspection {
    pub fn linkage(&self) -> LinkageSet {
        parse_linkage(&self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_display() {
        assert_eq!(Tool::Otool.to_string(), "otool");
        assert_eq!(Tool::Ldd.to_string(), "ldd");
        assert_eq!(Tool::Custom.to_string(), "custom");
    }

    #[test]
    fn test_ldd_output_gets_header() {
        let ldd = Inspector::ldd();
        let body = "\tlibc.so.6 => /lib/libc.so.6 (0x0)\n".to_string();
        let output = ldd.normalize(Path::new("/tmp/app"), body);
        assert!(output.starts_with("/tmp/app:\n"));
        assert_eq!(parse_linkage(&output).libraries(), ["libc.so.6"]);
    }

    #[test]
    fn test_otool_output_untouched() {
        let otool = Inspector::otool();
        let body = "/tmp/app:\n\t/usr/lib/libSystem.B.dylib (x)\n".to_string();
        assert_eq!(otool.normalize(Path::new("/tmp/app"), body.clone()), body);
    }

    fn scratch_file(name: &str, contents: &[u8]) -> PathBuf {
        let path = env::temp_dir().join(format!("linkcheck-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_static_markers() {
        let elf = scratch_file("static-elf", b"\x7fELF\x02\x01\x01\0");
        assert!(is_static_report(&elf, "", "\tnot a dynamic executable\n"));
        assert!(is_static_report(&elf, "\tstatically linked\n", ""));
        assert!(!is_static_report(&elf, "\tlibc.so.6 => /lib/libc.so.6\n", ""));
        std::fs::remove_file(elf).unwrap();
    }

    #[test]
    fn test_not_dynamic_requires_elf() {
        let text = scratch_file("notes.txt", b"hello\n");
        assert!(!is_static_report(&text, "", "\tnot a dynamic executable\n"));
        assert!(!is_elf(&text));
        assert!(!is_elf(Path::new("/nonexistent/linkcheck/app")));
        std::fs::remove_file(text).unwrap();
    }

    #[test]
    fn test_missing_binary_not_spawned() {
        let inspector = Inspector::custom("linkcheck-no-such-program", ["-x"]);
        let err = inspector
            .inspect(Path::new("/nonexistent/linkcheck/app"))
            .unwrap_err();
        assert!(matches!(err, Error::ArtifactMissing(_)));
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(Inspector::ldd().timeout(), Some(DEFAULT_INSPECT_TIMEOUT));
        assert_eq!(Inspector::otool().with_timeout(None).timeout(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_for_host_unix() {
        let inspector = Inspector::for_host().unwrap();
        if cfg!(target_os = "macos") {
            assert_eq!(inspector.tool(), Tool::Otool);
        } else {
            assert_eq!(inspector.tool(), Tool::Ldd);
        }
    }
}
