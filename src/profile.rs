//! Seccomp profile model and its JSON representation
//!
//! The serialized form follows the OCI runtime `LinuxSeccomp` layout that
//! container engines accept:
//!
//! ```json
//! {
//!   "defaultAction": "SCMP_ACT_ERRNO",
//!   "architectures": ["SCMP_ARCH_X86_64", "SCMP_ARCH_X86", "SCMP_ARCH_X32"],
//!   "syscalls": [{ "names": ["read", "write"], "action": "SCMP_ACT_ALLOW" }]
//! }
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Runtime disposition for a matched syscall
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "SCMP_ACT_ALLOW")]
    Allow,
    /// Deny-by-default posture; also assumed when a document omits `defaultAction`
    #[default]
    #[serde(rename = "SCMP_ACT_ERRNO")]
    Errno,
    #[serde(rename = "SCMP_ACT_KILL")]
    Kill,
    #[serde(rename = "SCMP_ACT_KILL_PROCESS")]
    KillProcess,
    #[serde(rename = "SCMP_ACT_KILL_THREAD")]
    KillThread,
    #[serde(rename = "SCMP_ACT_TRAP")]
    Trap,
    #[serde(rename = "SCMP_ACT_TRACE")]
    Trace,
    #[serde(rename = "SCMP_ACT_LOG")]
    Log,
    #[serde(rename = "SCMP_ACT_NOTIFY")]
    Notify,
}

impl Action {
    /// Whether the kernel refuses the syscall under this action
    pub fn is_blocking(self) -> bool {
        matches!(
            self,
            Action::Errno | Action::Kill | Action::KillProcess | Action::KillThread | Action::Trap
        )
    }

    /// Whether the syscall goes through under this action (logging still executes it)
    pub fn is_permitting(self) -> bool {
        matches!(self, Action::Allow | Action::Log)
    }
}

/// Wire-level architecture identifier
///
/// Covers the libseccomp architecture set. Identifiers added by newer
/// releases are kept verbatim in [`Arch::Other`] so such profiles still load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arch {
    #[serde(rename = "SCMP_ARCH_X86_64")]
    X86_64,
    #[serde(rename = "SCMP_ARCH_X86")]
    X86,
    #[serde(rename = "SCMP_ARCH_X32")]
    X32,
    #[serde(rename = "SCMP_ARCH_ARM")]
    Arm,
    #[serde(rename = "SCMP_ARCH_AARCH64")]
    Aarch64,
    #[serde(rename = "SCMP_ARCH_MIPS")]
    Mips,
    #[serde(rename = "SCMP_ARCH_MIPS64")]
    Mips64,
    #[serde(rename = "SCMP_ARCH_MIPS64N32")]
    Mips64N32,
    #[serde(rename = "SCMP_ARCH_MIPSEL")]
    Mipsel,
    #[serde(rename = "SCMP_ARCH_MIPSEL64")]
    Mipsel64,
    #[serde(rename = "SCMP_ARCH_MIPSEL64N32")]
    Mipsel64N32,
    #[serde(rename = "SCMP_ARCH_PPC")]
    Ppc,
    #[serde(rename = "SCMP_ARCH_PPC64")]
    Ppc64,
    #[serde(rename = "SCMP_ARCH_PPC64LE")]
    Ppc64Le,
    #[serde(rename = "SCMP_ARCH_S390")]
    S390,
    #[serde(rename = "SCMP_ARCH_S390X")]
    S390X,
    #[serde(rename = "SCMP_ARCH_PARISC")]
    Parisc,
    #[serde(rename = "SCMP_ARCH_PARISC64")]
    Parisc64,
    #[serde(rename = "SCMP_ARCH_RISCV64")]
    Riscv64,
    #[serde(rename = "SCMP_ARCH_LOONGARCH64")]
    Loongarch64,
    #[serde(rename = "SCMP_ARCH_M68K")]
    M68k,
    #[serde(rename = "SCMP_ARCH_SH")]
    Sh,
    #[serde(rename = "SCMP_ARCH_SHEB")]
    Sheb,
    #[serde(untagged)]
    Other(String),
}

/// Logical architecture names and the wire identifiers each expands to
const ARCHITECTURE_TABLE: &[(&str, &[Arch])] = &[
    ("amd64", &[Arch::X86_64, Arch::X86, Arch::X32]),
    ("arm64", &[Arch::Arm, Arch::Aarch64]),
];

/// Expand logical architecture names into wire identifiers
///
/// Unknown names are skipped so that configurations written for newer
/// releases keep working.
pub fn architectures_for<S: AsRef<str>>(targets: &[S]) -> Vec<Arch> {
    let mut arches = Vec::new();
    for target in targets {
        if let Some((_, expanded)) = ARCHITECTURE_TABLE
            .iter()
            .find(|(name, _)| *name == target.as_ref())
        {
            arches.extend_from_slice(expanded);
        }
    }
    arches
}

/// Whether a logical architecture name has an expansion
pub fn is_known_architecture(name: &str) -> bool {
    ARCHITECTURE_TABLE.iter().any(|(known, _)| *known == name)
}

/// A set of syscall names sharing one action
///
/// Every syscall source reports its discovery as a rule with `Action::Allow`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyscallRule {
    pub names: Vec<String>,
    pub action: Action,
}

impl SyscallRule {
    /// Rule allowing the given names
    pub fn allow<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            action: Action::Allow,
        }
    }
}

/// A complete seccomp policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Disposition for any syscall not named by a rule
    #[serde(default)]
    pub default_action: Action,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub architectures: Vec<Arch>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub syscalls: Vec<SyscallRule>,
}

impl Profile {
    /// Profile that applies `default_action` to every syscall
    pub fn new(default_action: Action) -> Self {
        Self {
            default_action,
            architectures: Vec::new(),
            syscalls: Vec::new(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}
