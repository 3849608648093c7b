//! seccomp-forge - seccomp profile synthesis and verification
//!
//! This library discovers the syscalls a workload needs and turns them into
//! deny-by-default seccomp profiles, and audits existing profiles for
//! high-risk exposure.
//!
//! Discovery strategies implement [`source::SyscallsSource`]:
//! - [`log_source::LogSource`]: replay of kernel audit records
//! - [`brute_force::BruteForceSource`]: elimination probing in a sandbox
//! - [`source::TemplateSource`]: built-in allow lists
//! - [`source::BinarySource`]: adapter for external binary analysis
//!
//! ```
//! use seccomp_forge::{synthesizer::Synthesizer, source::TemplateSource};
//! use seccomp_forge::verifier::ProfileVerifier;
//!
//! let profile = Synthesizer::new(TemplateSource::new("web")).profile()?.unwrap();
//! let json = profile.to_json()?;
//!
//! let verification = ProfileVerifier::new(json.as_bytes()).run()?;
//! assert!(verification.is_clean());
//! # Ok::<(), seccomp_forge::error::SeccompError>(())
//! ```

pub mod brute_force;
pub mod catalog;
pub mod config;
pub mod error;
pub mod log_source;
pub mod profile;
pub mod runner;
pub mod source;
pub mod synthesizer;
pub mod syscalls;
pub mod verifier;

pub use error::{Result, SeccompError};
pub use profile::{Action, Arch, Profile, SyscallRule};
pub use source::SyscallsSource;
