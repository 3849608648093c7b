//! Static audit of an existing seccomp profile
//!
//! Reports the high-risk syscalls a profile lets through at runtime. A
//! syscall is exposed when
//!
//! 1. the default action permits it (`SCMP_ACT_ALLOW`/`SCMP_ACT_LOG`) and no
//!    blocking rule (`ERRNO`, `KILL*`, `TRAP`) names it, or
//! 2. a permitting rule names it explicitly, whatever the default.

use crate::catalog::{is_high_risk, HIGH_RISK_SYSCALLS};
use crate::error::{Result, SeccompError};
use crate::profile::Profile;
use std::collections::BTreeSet;
use std::io::Read;

/// A high-risk syscall the verified profile allows
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Warning {
    pub syscall_name: String,
}

/// Findings of a verification run
///
/// Keeps the warnings even when [`Verification::status`] reports the
/// high-risk sentinel, so callers can act on both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    warnings: Vec<Warning>,
}

impl Verification {
    /// One warning per exposed syscall, ordered by name
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// `Err(HighRiskSyscallsAllowed)` whenever any warning exists
    pub fn status(&self) -> Result<()> {
        if self.warnings.is_empty() {
            Ok(())
        } else {
            Err(SeccompError::HighRiskSyscallsAllowed {
                count: self.warnings.len(),
            })
        }
    }
}

/// Verifies a serialized profile read from `reader`
pub struct ProfileVerifier<R> {
    reader: R,
}

impl<R: Read> ProfileVerifier<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    fn profile(&mut self) -> Result<Profile> {
        let mut content = String::new();
        self.reader
            .read_to_string(&mut content)
            .map_err(|_| SeccompError::InvalidProfile)?;
        serde_json::from_str(&content).map_err(|e| {
            tracing::debug!(error = %e, "profile rejected");
            SeccompError::InvalidProfile
        })
    }

    /// Parse the profile and collect its exposed high-risk syscalls
    pub fn run(mut self) -> Result<Verification> {
        let profile = self.profile()?;
        let verification = verify(&profile);
        tracing::debug!(
            default_action = ?profile.default_action,
            rules = profile.syscalls.len(),
            warnings = verification.warnings.len(),
            "profile verified"
        );
        Ok(verification)
    }
}

/// Exposure analysis of an already parsed profile
pub fn verify(profile: &Profile) -> Verification {
    let mut exposed = BTreeSet::new();

    if profile.default_action.is_permitting() {
        let blocked: BTreeSet<&str> = profile
            .syscalls
            .iter()
            .filter(|rule| rule.action.is_blocking())
            .flat_map(|rule| rule.names.iter().map(String::as_str))
            .collect();
        exposed.extend(
            HIGH_RISK_SYSCALLS
                .iter()
                .copied()
                .filter(|name| !blocked.contains(name)),
        );
    }

    exposed.extend(
        profile
            .syscalls
            .iter()
            .filter(|rule| rule.action.is_permitting())
            .flat_map(|rule| rule.names.iter().map(String::as_str))
            .filter(|name| is_high_risk(name)),
    );

    Verification {
        warnings: exposed
            .into_iter()
            .map(|name| Warning {
                syscall_name: name.to_string(),
            })
            .collect(),
    }
}
