// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Inspection output parsing
//!
//! Inspection tools print one identification line for the binary itself,
//! followed by one line per linked library beginning with the library's
//! path:
//!
//! ```text
//! target/release/app:
//! 	/usr/lib/libiconv.2.dylib (compatibility version 7.0.0, current version 7.0.0)
//! 	/usr/lib/libSystem.B.dylib (compatibility version 1.0.0, current version 1319.0.0)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Libraries a binary records for resolution at load time
///
/// Entries keep the order the inspection tool reported them in; use
/// [`LinkageSet::sorted`] for order-independent comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkageSet(Vec<String>);

impl LinkageSet {
    pub fn new<I, S>(libraries: I) -> LinkageSet
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LinkageSet(libraries.into_iter().map(Into::into).collect())
    }

    pub fn libraries(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, library: &str) -> bool {
        self.0.iter().any(|l| l == library)
    }

    /// Libraries in lexicographic order
    pub fn sorted(&self) -> Vec<String> {
        let mut libs = self.0.clone();
        libs.sort();
        libs
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl FromIterator<String> for LinkageSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        LinkageSet(iter.into_iter().collect())
    }
}

impl fmt::Display for LinkageSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// Extract library paths from inspection tool output
///
/// The first line identifies the binary and is always dropped, even when it
/// looks like a library path. Every other line contributes its first
/// whitespace-delimited token; lines that are blank after trimming are
/// skipped. Paths containing spaces are cut at the first space.
pub fn parse_linkage(output: &str) -> LinkageSet {
    let libs: LinkageSet = output
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_owned)
        .collect();

    log::debug!("Parsed {} libraries from inspection output", libs.len());
    libs
}

#[cfg(test)]
mod tests {
    use super::*;

    const OTOOL_OUTPUT: &str = "target/release/linkcheck-fixture:
\t/usr/lib/libiconv.2.dylib (compatibility version 7.0.0, current version 7.0.0)
\t/usr/lib/libSystem.B.dylib (compatibility version 1.0.0, current version 1319.0.0)
";

    #[test]
    fn test_parse_otool_output() {
        let libs = parse_linkage(OTOOL_OUTPUT);
        assert_eq!(
            libs.libraries(),
            ["/usr/lib/libiconv.2.dylib", "/usr/lib/libSystem.B.dylib"]
        );
    }

    #[test]
    fn test_header_always_discarded() {
        // Header that looks exactly like a library line
        let output = "/usr/lib/libfake.dylib (compatibility version 1.0.0)\n\t/usr/lib/libSystem.B.dylib\n";
        let libs = parse_linkage(output);
        assert_eq!(libs.libraries(), ["/usr/lib/libSystem.B.dylib"]);
        assert!(!libs.contains("/usr/lib/libfake.dylib"));
    }

    #[test]
    fn test_trailing_blank_lines_ignored() {
        let output = format!("{}\n\n   \n\t\n", OTOOL_OUTPUT);
        assert_eq!(parse_linkage(&output).len(), 2);
    }

    #[test]
    fn test_interior_blank_lines_ignored() {
        let output = "app:\n\n\t/usr/lib/libA.dylib\n\n\t/usr/lib/libB.dylib\n";
        assert_eq!(
            parse_linkage(output).libraries(),
            ["/usr/lib/libA.dylib", "/usr/lib/libB.dylib"]
        );
    }

    #[test]
    fn test_crlf_line_endings() {
        let output = "app:\r\n\t/usr/lib/libA.dylib (x)\r\n\t/usr/lib/libB.dylib (y)\r\n";
        assert_eq!(
            parse_linkage(output).libraries(),
            ["/usr/lib/libA.dylib", "/usr/lib/libB.dylib"]
        );
    }

    #[test]
    fn test_ldd_style_lines() {
        let output = "/tmp/app:
\tlinux-vdso.so.1 (0x00007ffc4a5f2000)
\tlibgcc_s.so.1 => /lib/x86_64-linux-gnu/libgcc_s.so.1 (0x00007f1c2a400000)
\tlibc.so.6 => /lib/x86_64-linux-gnu/libc.so.6 (0x00007f1c2a200000)
\t/lib64/ld-linux-x86-64.so.2 (0x00007f1c2a6a0000)
";
        assert_eq!(
            parse_linkage(output).libraries(),
            [
                "linux-vdso.so.1",
                "libgcc_s.so.1",
                "libc.so.6",
                "/lib64/ld-linux-x86-64.so.2"
            ]
        );
    }

    #[test]
    fn test_empty_and_header_only() {
        assert!(parse_linkage("").is_empty());
        assert!(parse_linkage("app:").is_empty());
        assert!(parse_linkage("app:\n").is_empty());
    }

    #[test]
    fn test_duplicates_preserved() {
        let output = "app:\n\t/usr/lib/libA.dylib\n\t/usr/lib/libA.dylib\n";
        assert_eq!(parse_linkage(output).len(), 2);
    }

    #[test]
    fn test_sorted_does_not_reorder_original() {
        let libs = LinkageSet::new(["b", "a"]);
        assert_eq!(libs.sorted(), ["a", "b"]);
        assert_eq!(libs.libraries(), ["b", "a"]);
    }

    #[test]
    fn test_display() {
        let libs = LinkageSet::new(["a", "b"]);
        assert_eq!(format!("{}", libs), "[a, b]");
    }
}
