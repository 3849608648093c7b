//! Sandboxed execution boundary used by brute-force discovery
//!
//! A [`SandboxRunner`] executes the workload under test, optionally
//! constrained by a trial profile. [`RunError`] separates a workload that
//! ran and failed (the signal brute force feeds on) from a harness that
//! could not run anything at all.
//!
//! [`CommandRunner`] drives any external launcher, e.g.
//! `docker run --rm --security-opt seccomp={profile} alpine ls`.

use crate::config::RunnerConfig;
use crate::profile::Profile;
use std::io::Write;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Placeholder substituted with the trial profile location
pub const PROFILE_PLACEHOLDER: &str = "{profile}";

/// Default execution timeout for a single run
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Outcome of a run that did not complete successfully
#[derive(Error, Debug)]
pub enum RunError {
    #[error("workload exited with status {code}")]
    Exited { code: i32 },

    #[error("workload terminated by a signal")]
    Signalled,

    #[error("workload timed out after {after:?}")]
    TimedOut { after: Duration },

    /// The trial could not be constructed or launched
    #[error("{0}")]
    Harness(String),
}

impl RunError {
    /// Whether the failure says nothing about the workload itself
    pub fn is_harness_fault(&self) -> bool {
        matches!(self, RunError::Harness(_))
    }
}

/// Executes the workload, optionally constrained by a profile
///
/// `None` means unconstrained. `Ok(())` iff the workload exited with
/// status zero within the allotted time. Implementations must not leave
/// processes or containers running after they return.
pub trait SandboxRunner: Sync {
    fn run_with_seccomp(&self, profile: Option<&Profile>) -> Result<(), RunError>;
}

impl<T: SandboxRunner + ?Sized> SandboxRunner for &T {
    fn run_with_seccomp(&self, profile: Option<&Profile>) -> Result<(), RunError> {
        (**self).run_with_seccomp(profile)
    }
}

/// Runs an external command, handing it the trial profile as a file
#[derive(Debug, Clone)]
pub struct CommandRunner {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    unconstrained_value: String,
}

impl CommandRunner {
    /// Every argument containing `{profile}` gets it replaced by the path of
    /// the serialized trial profile, or by the unconstrained value.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            timeout: DEFAULT_TIMEOUT,
            unconstrained_value: "unconfined".to_string(),
        }
    }

    /// Apply timeout and unconstrained value from configuration
    pub fn with_config(self, config: &RunnerConfig) -> Self {
        self.timeout(config.timeout())
            .unconstrained_value(config.unconstrained_value.clone())
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Value substituted for `{profile}` when running unconstrained
    pub fn unconstrained_value(mut self, value: impl Into<String>) -> Self {
        self.unconstrained_value = value.into();
        self
    }

    fn write_profile(profile: &Profile) -> Result<NamedTempFile, RunError> {
        let content = profile
            .to_json()
            .map_err(|e| RunError::Harness(format!("cannot serialize trial profile: {}", e)))?;
        let mut file = tempfile::Builder::new()
            .prefix("seccomp-trial-")
            .suffix(".json")
            .tempfile()
            .map_err(|e| RunError::Harness(format!("cannot create trial profile: {}", e)))?;
        file.write_all(content.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| RunError::Harness(format!("cannot write trial profile: {}", e)))?;
        Ok(file)
    }

    fn wait_with_deadline(&self, child: &mut Child) -> Result<ExitStatus, RunError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) if Instant::now() >= deadline => {
                    tracing::debug!(pid = child.id(), timeout = ?self.timeout, "run timed out, killing");
                    // kill() only fails when the child already exited; wait() reaps it either way
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(RunError::TimedOut {
                        after: self.timeout,
                    });
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(RunError::Harness(format!("cannot wait for workload: {}", e)));
                }
            }
        }
    }
}

impl SandboxRunner for CommandRunner {
    fn run_with_seccomp(&self, profile: Option<&Profile>) -> Result<(), RunError> {
        // Kept alive until the child has been reaped
        let profile_file = profile.map(Self::write_profile).transpose()?;
        let substitute = match &profile_file {
            Some(file) => file.path().display().to_string(),
            None => self.unconstrained_value.clone(),
        };

        let args: Vec<String> = self
            .args
            .iter()
            .map(|arg| arg.replace(PROFILE_PLACEHOLDER, &substitute))
            .collect();

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| RunError::Harness(format!("cannot launch '{}': {}", self.program, e)))?;
        tracing::trace!(program = %self.program, pid = child.id(), constrained = profile.is_some(), "workload started");

        let status = self.wait_with_deadline(&mut child)?;
        match status.code() {
            Some(0) => Ok(()),
            Some(code) => Err(RunError::Exited { code }),
            None => Err(RunError::Signalled),
        }
    }
}
