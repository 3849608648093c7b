//! Profile synthesis from a discovery source

use crate::config::SynthesisConfig;
use crate::error::Result;
use crate::profile::{architectures_for, Action, Profile};
use crate::source::SyscallsSource;

/// Builds a deny-by-default profile from whatever a source discovered
pub struct Synthesizer<S> {
    source: S,
    default_action: Action,
    config: SynthesisConfig,
}

impl<S: SyscallsSource> Synthesizer<S> {
    /// Synthesizer targeting amd64, producing a profile even for empty discoveries
    pub fn new(source: S) -> Self {
        Self::with_config(source, SynthesisConfig::default())
    }

    pub fn with_config(source: S, config: SynthesisConfig) -> Self {
        Self {
            source,
            default_action: Action::Errno,
            config,
        }
    }

    /// Return no profile at all when discovery comes back empty
    pub fn nil_profile_for_no_calls(mut self, enabled: bool) -> Self {
        self.config.nil_profile_for_no_calls = enabled;
        self
    }

    pub fn architectures<I, A>(mut self, architectures: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.config.architectures = architectures.into_iter().map(Into::into).collect();
        self
    }

    /// Query the source and assemble the profile
    ///
    /// Source errors are returned untouched. `Ok(None)` only happens with
    /// `nil_profile_for_no_calls` set and nothing discovered.
    pub fn profile(&mut self) -> Result<Option<Profile>> {
        let discovered = self
            .source
            .system_calls()?
            .filter(|rule| !rule.names.is_empty());

        if discovered.is_none() && self.config.nil_profile_for_no_calls {
            tracing::debug!("no syscalls discovered, returning no profile");
            return Ok(None);
        }

        let mut profile = Profile::new(self.default_action);
        profile.architectures = architectures_for(&self.config.architectures);

        if let Some(mut rule) = discovered {
            rule.names.sort();
            rule.names.dedup();
            profile.syscalls.push(rule);
        }

        tracing::debug!(
            rules = profile.syscalls.len(),
            syscalls = profile.syscalls.first().map_or(0, |r| r.names.len()),
            architectures = profile.architectures.len(),
            "profile synthesized"
        );
        Ok(Some(profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SeccompError;
    use crate::profile::{Arch, SyscallRule};

    /// Source returning a fixed discovery
    struct SourceStub {
        result: Option<Result<Option<SyscallRule>>>,
    }

    impl SourceStub {
        fn names(names: &[&str]) -> Self {
            Self {
                result: Some(Ok(Some(SyscallRule::allow(names.iter().copied())))),
            }
        }

        fn nothing() -> Self {
            Self {
                result: Some(Ok(None)),
            }
        }

        fn failing() -> Self {
            Self {
                result: Some(Err(SeccompError::InvalidTemplateName("x".to_string()))),
            }
        }
    }

    impl SyscallsSource for SourceStub {
        fn system_calls(&mut self) -> Result<Option<SyscallRule>> {
            self.result.take().unwrap_or(Ok(None))
        }
    }

    #[test]
    fn test_profile_when_syscalls_found() {
        let profile = Synthesizer::new(SourceStub::names(&["def", "abc"]))
            .profile()
            .unwrap()
            .unwrap();
        assert_eq!(
            profile,
            Profile {
                default_action: Action::Errno,
                architectures: vec![Arch::X86_64, Arch::X86, Arch::X32],
                syscalls: vec![SyscallRule::allow(["abc", "def"])],
            }
        );
    }

    #[test]
    fn test_duplicates_removed() {
        let profile = Synthesizer::new(SourceStub::names(&["write", "read", "write"]))
            .profile()
            .unwrap()
            .unwrap();
        assert_eq!(profile.syscalls[0].names, vec!["read", "write"]);
    }

    #[test]
    fn test_source_error_propagates() {
        let result = Synthesizer::new(SourceStub::failing()).profile();
        assert!(matches!(result, Err(SeccompError::InvalidTemplateName(_))));
    }

    #[test]
    fn test_nil_profile_for_no_calls() {
        let mut synthesizer = Synthesizer::new(SourceStub::nothing()).nil_profile_for_no_calls(true);
        assert!(synthesizer.profile().unwrap().is_none());

        let mut synthesizer =
            Synthesizer::new(SourceStub::names(&[])).nil_profile_for_no_calls(true);
        assert!(synthesizer.profile().unwrap().is_none());
    }

    #[test]
    fn test_empty_discovery_yields_rule_free_profile() {
        let profile = Synthesizer::new(SourceStub::nothing()).profile().unwrap().unwrap();
        assert_eq!(profile.default_action, Action::Errno);
        assert!(profile.syscalls.is_empty());

        let profile = Synthesizer::new(SourceStub::names(&[])).profile().unwrap().unwrap();
        assert!(profile.syscalls.is_empty());
    }

    #[test]
    fn test_architectures_configurable() {
        let profile = Synthesizer::new(SourceStub::names(&["read"]))
            .architectures(["arm64", "mips"])
            .profile()
            .unwrap()
            .unwrap();
        assert_eq!(profile.architectures, vec![Arch::Arm, Arch::Aarch64]);
    }
}
