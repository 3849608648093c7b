//! Syscall discovery strategies
//!
//! Every strategy implements [`SyscallsSource`]. The log extractor and the
//! brute-force discoverer live in their own modules; this module holds the
//! trait plus the template and binary-analysis adapters.

use crate::catalog;
use crate::error::{Result, SeccompError};
use crate::profile::SyscallRule;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A strategy that discovers the syscalls a workload needs
///
/// `Ok(None)` means nothing was observed, which callers may treat
/// differently from a result that names zero syscalls. Instances are meant
/// to be queried once; a source may consume its input while producing.
pub trait SyscallsSource {
    fn system_calls(&mut self) -> Result<Option<SyscallRule>>;
}

impl<S: SyscallsSource + ?Sized> SyscallsSource for Box<S> {
    fn system_calls(&mut self) -> Result<Option<SyscallRule>> {
        (**self).system_calls()
    }
}

/// Source backed by one of the built-in templates
#[derive(Debug, Clone)]
pub struct TemplateSource {
    name: String,
}

impl TemplateSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl SyscallsSource for TemplateSource {
    fn system_calls(&mut self) -> Result<Option<SyscallRule>> {
        let syscalls = catalog::template(&self.name)
            .ok_or_else(|| SeccompError::InvalidTemplateName(self.name.clone()))?;
        tracing::debug!(template = %self.name, count = syscalls.len(), "template resolved");
        Ok(Some(SyscallRule::allow(syscalls.iter().copied())))
    }
}

/// Boundary to a static binary analyser
///
/// Given an executable, returns the syscall names its instructions
/// reference. Implementations live outside this crate.
pub trait BinaryExtractor {
    fn extract(&self, path: &Path) -> Result<Vec<String>>;
}

impl<F> BinaryExtractor for F
where
    F: Fn(&Path) -> Result<Vec<String>>,
{
    fn extract(&self, path: &Path) -> Result<Vec<String>> {
        self(path)
    }
}

/// Source that statically extracts syscalls from an executable
pub struct BinarySource<E> {
    path: PathBuf,
    extractor: E,
}

impl<E: BinaryExtractor> BinarySource<E> {
    pub fn new(path: impl Into<PathBuf>, extractor: E) -> Self {
        Self {
            path: path.into(),
            extractor,
        }
    }
}

impl<E: BinaryExtractor> SyscallsSource for BinarySource<E> {
    fn system_calls(&mut self) -> Result<Option<SyscallRule>> {
        let extracted = self.extractor.extract(&self.path)?;

        let mut seen = HashSet::with_capacity(extracted.len());
        let names: Vec<String> = extracted
            .into_iter()
            .filter(|name| seen.insert(name.clone()))
            .collect();

        tracing::debug!(path = %self.path.display(), count = names.len(), "binary syscalls extracted");
        Ok(Some(SyscallRule::allow(names)))
    }
}
