//! Brute-force syscall discovery
//!
//! Finds the syscalls a workload cannot do without by elimination: for every
//! candidate `c`, run the workload under a profile that allows the whole
//! candidate universe except `c`, with `SCMP_ACT_ERRNO` as default. If the
//! run fails, `c` is required. Essential syscalls are allowed in every trial
//! and reported whether or not the universe names them.
//!
//! # Design
//!
//! ```text
//!   preflight: run(None) ── fails ──> ExecutionAborted
//!        │
//!        ▼
//!   candidates ──> crossbeam channel ──> N workers ──> run(trial without c)
//!                                                  │
//!                                   fails ──> required set (Mutex<BTreeSet>)
//! ```
//!
//! Probes are independent, so they run on a bounded worker pool. Result
//! order never depends on completion order.

use crate::catalog::{self, BRUTE_FORCE_CANDIDATES, ESSENTIAL_SYSCALLS};
use crate::config::BruteForceConfig;
use crate::error::{Result, SeccompError};
use crate::profile::{Action, Profile, SyscallRule};
use crate::runner::{RunError, SandboxRunner};
use crate::source::SyscallsSource;
use std::collections::{BTreeSet, HashSet};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;

/// Syscalls source that probes a sandboxed workload
pub struct BruteForceSource<R> {
    runner: R,
    candidates: Vec<String>,
    max_parallel_probes: usize,
}

impl<R: SandboxRunner> BruteForceSource<R> {
    /// Probe the built-in candidate universe, one worker per available CPU
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            candidates: BRUTE_FORCE_CANDIDATES.iter().map(|s| s.to_string()).collect(),
            max_parallel_probes: default_parallelism(),
        }
    }

    pub fn with_config(runner: R, config: &BruteForceConfig) -> Self {
        let mut source = Self::new(runner);
        if let Some(candidates) = &config.candidates {
            source = source.candidates(candidates.iter().cloned());
        }
        if let Some(max) = config.max_parallel_probes {
            source = source.max_parallel_probes(max);
        }
        source
    }

    /// Replace the candidate universe; duplicates keep their first position
    pub fn candidates<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        self.candidates = candidates
            .into_iter()
            .map(Into::into)
            .filter(|name: &String| seen.insert(name.clone()))
            .collect();
        self
    }

    /// Upper bound on simultaneous sandbox runs (at least one)
    pub fn max_parallel_probes(mut self, max: usize) -> Self {
        self.max_parallel_probes = max.max(1);
        self
    }

    /// Essential syscalls the candidate universe does not name
    fn missing_essentials(&self) -> impl Iterator<Item = String> + '_ {
        ESSENTIAL_SYSCALLS
            .iter()
            .filter(|name| !self.candidates.iter().any(|c| c == *name))
            .map(|name| name.to_string())
    }

    /// Trial profile allowing every candidate except `excluded`, plus the essentials
    fn trial_profile(&self, excluded: &str) -> Profile {
        let mut allowed = exclude(&self.candidates, excluded);
        allowed.extend(self.missing_essentials());
        Profile {
            default_action: Action::Errno,
            architectures: Vec::new(),
            syscalls: vec![SyscallRule::allow(allowed)],
        }
    }

    /// Whether the workload fails without `syscall`
    fn is_required(&self, syscall: &str) -> std::result::Result<bool, RunError> {
        let trial = self.trial_profile(syscall);
        match self.runner.run_with_seccomp(Some(&trial)) {
            Ok(()) => Ok(false),
            Err(e) if e.is_harness_fault() => Err(e),
            Err(e) => {
                tracing::trace!(syscall, reason = %e, "workload failed without syscall");
                Ok(true)
            }
        }
    }

    /// Probe every non-essential candidate, returning required indices
    fn probe_all(&self) -> Result<BTreeSet<usize>> {
        let probes: Vec<usize> = (0..self.candidates.len())
            .filter(|&i| !catalog::is_essential(&self.candidates[i]))
            .collect();
        let workers = self.max_parallel_probes.min(probes.len()).max(1);
        tracing::debug!(probes = probes.len(), workers, "starting elimination probes");

        let (tx, rx) = crossbeam::channel::unbounded();
        for index in probes {
            // The receiver is alive until the scope below ends
            let _ = tx.send(index);
        }
        drop(tx);

        let required = Mutex::new(BTreeSet::new());
        let fault: Mutex<Option<(usize, RunError)>> = Mutex::new(None);
        let stop = AtomicBool::new(false);

        thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| {
                    while let Ok(index) = rx.recv() {
                        if stop.load(Ordering::Relaxed) {
                            break;
                        }
                        match self.is_required(&self.candidates[index]) {
                            Ok(true) => {
                                required
                                    .lock()
                                    .unwrap_or_else(PoisonError::into_inner)
                                    .insert(index);
                            }
                            Ok(false) => {}
                            Err(e) => {
                                stop.store(true, Ordering::Relaxed);
                                let mut fault =
                                    fault.lock().unwrap_or_else(PoisonError::into_inner);
                                if fault.is_none() {
                                    *fault = Some((index, e));
                                }
                                break;
                            }
                        }
                    }
                });
            }
        });

        let fault = fault.into_inner().unwrap_or_else(PoisonError::into_inner);
        if let Some((index, source)) = fault {
            return Err(SeccompError::ProbeHarness {
                syscall: self.candidates[index].clone(),
                source,
            });
        }
        Ok(required.into_inner().unwrap_or_else(PoisonError::into_inner))
    }
}

impl<R: SandboxRunner> SyscallsSource for BruteForceSource<R> {
    fn system_calls(&mut self) -> Result<Option<SyscallRule>> {
        self.runner
            .run_with_seccomp(None)
            .map_err(|source| SeccompError::ExecutionAborted { source })?;

        let required = self.probe_all()?;
        let mut names: Vec<String> = self
            .candidates
            .iter()
            .enumerate()
            .filter(|(i, name)| catalog::is_essential(name) || required.contains(i))
            .map(|(_, name)| name.clone())
            .collect();
        names.extend(self.missing_essentials());

        tracing::debug!(
            candidates = self.candidates.len(),
            required = names.len(),
            "brute force finished"
        );
        Ok(Some(SyscallRule::allow(names)))
    }
}

/// Copy of `source` without any occurrence of `item`
pub fn exclude(source: &[String], item: &str) -> Vec<String> {
    source.iter().filter(|s| *s != item).cloned().collect()
}

fn default_parallelism() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}
