// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Release binary used as the default linkage check target.
//!
//! Links the linkcheck library and the CLI logging stack so a check of this
//! binary catches any crate in that stack that starts pulling in a system
//! library beyond the platform baseline.

use linkcheck::baseline::Baseline;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    println!("linkcheck {}", linkcheck::version());
    match Baseline::for_host() {
        Ok(baseline) => {
            for lib in &baseline.libraries {
                println!("{}", lib);
            }
        }
        Err(e) => log::warn!("{}", e),
    }
}
