//! Syscall discovery from kernel audit logs
//!
//! A profile in `SCMP_ACT_LOG` (complain) mode makes the kernel emit one
//! record per syscall, e.g.:
//!
//! ```text
//! Nov 15 14:34:39 machine kernel: [26233.096391] audit: type=1326 audit(1573828479.772:49):
//!   auid=4294967295 uid=0 gid=0 ses=4294967295 pid=15 comm="runc:[2:INIT]" exe="/" sig=0
//!   arch=c000003e syscall=1 compat=0 ip=0x55a02e943be0 code=0x7ffc0000
//! ```
//!
//! [`LogSource`] scans such a stream line by line and keeps the syscalls
//! recorded for a set of process IDs.

use crate::config::LogConfig;
use crate::error::{Result, SeccompError};
use crate::profile::SyscallRule;
use crate::source::SyscallsSource;
use crate::syscalls::syscall_name;
use regex::Regex;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Syscalls source reading an audit-style log stream
pub struct LogSource<R> {
    reader: R,
    process_ids: Vec<i32>,
}

impl<R: BufRead> LogSource<R> {
    /// Scan `reader` for syscalls issued by any of `process_ids`
    pub fn new(reader: R, process_ids: impl Into<Vec<i32>>) -> Self {
        Self {
            reader,
            process_ids: process_ids.into(),
        }
    }

    /// Build the audit line matcher, or `None` when no PID can match
    fn matcher(&self) -> Result<Option<Regex>> {
        if self.process_ids.is_empty() || self.process_ids.iter().any(|pid| *pid < 0) {
            return Ok(None);
        }

        let alternatives = self
            .process_ids
            .iter()
            .map(i32::to_string)
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(r"audit:.+\bpid=(?:{})\b.+\bsyscall=(\d+)\b", alternatives);
        Ok(Some(Regex::new(&pattern)?))
    }

    fn scan(&mut self, matcher: &Regex) -> Result<Vec<String>> {
        let mut seen_ids = HashSet::new();
        let mut names = Vec::new();
        let mut line = Vec::new();
        let mut lines_scanned = 0usize;

        loop {
            line.clear();
            if self.reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            lines_scanned += 1;

            // Non UTF-8 bytes only ever appear in free-text fields such as comm=
            let text = String::from_utf8_lossy(&line);
            let Some(id) = extract_syscall_id(matcher, &text) else {
                continue;
            };
            if !seen_ids.insert(id) {
                continue;
            }

            let name = syscall_name(id).ok_or(SeccompError::UnsupportedSyscallId(id))?;
            tracing::trace!(id, name, "syscall recorded");
            names.push(name.to_string());
        }

        tracing::debug!(lines_scanned, unique = names.len(), "audit log scanned");
        Ok(names)
    }
}

impl LogSource<BufReader<File>> {
    /// Open a log file on disk, e.g. the configured syslog path
    pub fn from_path(path: impl AsRef<Path>, process_ids: impl Into<Vec<i32>>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SeccompError::LogUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file), process_ids))
    }

    /// Open the log file named by configuration
    pub fn from_config(config: &LogConfig, process_ids: impl Into<Vec<i32>>) -> Result<Self> {
        Self::from_path(&config.path, process_ids)
    }
}

impl<R: BufRead> SyscallsSource for LogSource<R> {
    fn system_calls(&mut self) -> Result<Option<SyscallRule>> {
        let Some(matcher) = self.matcher()? else {
            tracing::debug!(pids = ?self.process_ids, "no usable process id, skipping scan");
            return Ok(None);
        };

        let names = self.scan(&matcher)?;
        if names.is_empty() {
            return Ok(None);
        }
        Ok(Some(SyscallRule::allow(names)))
    }
}

/// Syscall number of a matching audit line
///
/// Numbers that do not fit a `u32` are treated as a non-match.
fn extract_syscall_id(matcher: &Regex, line: &str) -> Option<u32> {
    matcher
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
