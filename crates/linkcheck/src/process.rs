// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use crate::Error;
use std::{
    io::{self, Read},
    process::{Command, ExitStatus, Stdio},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};
use wait_timeout::ChildExt;

/// Output of a finished child process
#[derive(Debug)]
pub struct Captured {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub elapsed: Duration,
}

impl Captured {
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Run `command` to completion, capturing stdout and stderr.
///
/// Both pipes are drained on background threads while the child runs, so a
/// tool that writes more than a pipe buffer cannot stall the wait. With a
/// `timeout`, a child still running at the deadline is killed and
/// [`Error::Timeout`] is returned; without one the call blocks until exit.
pub fn run_captured(command: &mut Command, timeout: Option<Duration>) -> Result<Captured, Error> {
    let program = command.get_program().to_string_lossy().into_owned();
    log::debug!("Running {:?}", command);

    let start = Instant::now();
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = match timeout {
        Some(limit) => match child.wait_timeout(limit)? {
            Some(status) => status,
            None => {
                log::warn!("{} still running after {:?}, killing it", program, limit);
                if let Err(e) = child.kill() {
                    log::debug!("kill {} failed: {}", program, e);
                }
                child.wait()?;
                // Reader threads are detached; they end once the pipes close.
                return Err(Error::Timeout {
                    program,
                    after: limit,
                });
            }
        },
        None => child.wait()?,
    };

    let captured = Captured {
        status,
        stdout: collect(stdout)?,
        stderr: collect(stderr)?,
        elapsed: start.elapsed(),
    };
    log::debug!(
        "{} exited with {} after {} ms",
        program,
        captured.status,
        captured.elapsed.as_millis()
    );
    Ok(captured)
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn collect(handle: JoinHandle<io::Result<Vec<u8>>>) -> Result<Vec<u8>, Error> {
    let result = handle
        .join()
        .map_err(|_| io::Error::new(io::ErrorKind::Other, "output reader thread panicked"))?;
    Ok(result?)
}

/// Keep the last `max_lines` lines of `text`
///
/// Build logs can run to thousands of lines; errors only carry the end.
pub fn tail(text: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let skip = lines.len().saturating_sub(max_lines);
    lines[skip..].join("\n")
}
