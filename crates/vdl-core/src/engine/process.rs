//! The Python driver script, run as a child process.

use std::ffi::OsStr;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, ExitStatus, Stdio};

use super::EngineError;

const DRIVER: &str = include_str!("driver.py");

/// Child that is killed and reaped if dropped while still running.
struct Driver(Child);

impl Drop for Driver {
    fn drop(&mut self) {
        if let Ok(None) = self.0.try_wait() {
            let _ = self.0.kill();
            let _ = self.0.wait();
        }
    }
}

/// Run the driver under `python` with `request` on stdin and pass every
/// non-blank stdout line to `on_line`. Invalid UTF-8 is replaced, not fatal.
pub(super) fn run_driver(
    python: &OsStr,
    request: &[u8],
    mut on_line: impl FnMut(&str),
) -> Result<ExitStatus, EngineError> {
    let program = python.to_string_lossy().into_owned();
    let child = Command::new(python)
        .arg("-c")
        .arg(DRIVER)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| EngineError::Spawn { program, source })?;
    let mut driver = Driver(child);

    // The driver reads the whole request before writing anything.
    if let Some(mut stdin) = driver.0.stdin.take() {
        stdin.write_all(request)?;
    }

    if let Some(stdout) = driver.0.stdout.take() {
        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches(['\r', '\n']);
            if !line.trim().is_empty() {
                on_line(line);
            }
        }
    }

    Ok(driver.0.wait()?)
}
