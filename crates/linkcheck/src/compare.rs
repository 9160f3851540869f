// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use crate::{parse::LinkageSet, Error};
use serde::Serialize;
use std::{cmp::Ordering, fmt};

/// Sorted expected and observed linkage with their differences
///
/// Equality is exact: both sequences are sorted lexicographically and
/// compared element by element, so an extra, missing, or duplicated library
/// is a mismatch. There is no subset matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub expected: Vec<String>,
    pub observed: Vec<String>,
    /// expected but not observed
    pub missing: Vec<String>,
    /// observed but not expected
    pub unexpected: Vec<String>,
}

impl Comparison {
    pub fn matches(&self) -> bool {
        self.expected == self.observed
    }

    /// Turn a mismatch into [`Error::Mismatch`]
    pub fn verify(&self) -> Result<(), Error> {
        if self.matches() {
            Ok(())
        } else {
            Err(Error::Mismatch(self.clone()))
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.matches() {
            return write!(f, "linkage matches: {:?}", self.observed);
        }
        writeln!(f, "linkage mismatch")?;
        writeln!(f, "  expected:   {:?}", self.expected)?;
        write!(f, "  observed:   {:?}", self.observed)?;
        if !self.missing.is_empty() {
            write!(f, "\n  missing:    {:?}", self.missing)?;
        }
        if !self.unexpected.is_empty() {
            write!(f, "\n  unexpected: {:?}", self.unexpected)?;
        }
        Ok(())
    }
}

/// Compare observed linkage against the expected libraries
pub fn compare(expected: &LinkageSet, observed: &LinkageSet) -> Comparison {
    let expected = expected.sorted();
    let observed = observed.sorted();

    // Merge walk over both sorted lists; counts duplicates like a multiset.
    let mut missing = Vec::new();
    let mut unexpected = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < expected.len() && j < observed.len() {
        match expected[i].cmp(&observed[j]) {
            Ordering::Equal => {
                i += 1;
                j += 1;
            }
            Ordering::Less => {
                missing.push(expected[i].clone());
                i += 1;
            }
            Ordering::Greater => {
                unexpected.push(observed[j].clone());
                j += 1;
            }
        }
    }
    missing.extend_from_slice(&expected[i..]);
    unexpected.extend_from_slice(&observed[j..]);

    let comparison = Comparison {
        expected,
        observed,
        missing,
        unexpected,
    };
    if comparison.matches() {
        log::debug!("Linkage matches {} expected libraries", comparison.expected.len());
    } else {
        log::debug!(
            "Linkage differs: {} missing, {} unexpected",
            comparison.missing.len(),
            comparison.unexpected.len()
        );
    }
    comparison
}
