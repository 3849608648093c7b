//! End-to-end verification of profiles on disk
//!
//! Covers the synthesize, serialize, verify round trip and audits a few
//! hand-written profiles in the shapes container engines ship.

use seccomp_forge::catalog::HIGH_RISK_SYSCALLS;
use seccomp_forge::source::TemplateSource;
use seccomp_forge::synthesizer::Synthesizer;
use seccomp_forge::verifier::ProfileVerifier;
use seccomp_forge::{Action, Profile, SeccompError, SyscallRule};
use std::fs::File;
use std::io::Write;
use std::sync::Once;

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn verify_file(content: &str) -> seccomp_forge::Result<seccomp_forge::verifier::Verification> {
    init_tracing();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    ProfileVerifier::new(File::open(file.path()).unwrap()).run()
}

#[test]
fn test_synthesized_template_profile_is_clean() {
    init_tracing();
    let profile = Synthesizer::new(TemplateSource::new("web"))
        .architectures(["amd64", "arm64"])
        .profile()
        .unwrap()
        .unwrap();

    let verification = verify_file(&profile.to_json_pretty().unwrap()).unwrap();
    assert!(verification.is_clean());
    assert!(verification.status().is_ok());
}

#[test]
fn test_round_trip_preserves_profile() {
    let profile = Synthesizer::new(TemplateSource::new("web"))
        .profile()
        .unwrap()
        .unwrap();
    let parsed = Profile::from_json(&profile.to_json().unwrap()).unwrap();
    assert_eq!(parsed, profile);
}

#[test]
fn test_allow_list_with_dangerous_entries() {
    let mut profile = Profile::new(Action::Errno);
    profile.syscalls.push(SyscallRule::allow(["read", "write", "mount", "unshare", "setns"]));

    let verification = verify_file(&profile.to_json().unwrap()).unwrap();
    let names: Vec<_> = verification
        .warnings()
        .iter()
        .map(|w| w.syscall_name.as_str())
        .collect();
    assert_eq!(names, vec!["mount", "setns", "unshare"]);

    let err = verification.status().unwrap_err();
    assert_eq!(err.to_string(), "profile allows high-risk system calls (3 found)");
}

#[test]
fn test_deny_list_profile_blocking_every_high_risk_call() {
    let mut profile = Profile::new(Action::Allow);
    profile.syscalls.push(SyscallRule {
        names: HIGH_RISK_SYSCALLS.iter().map(|s| s.to_string()).collect(),
        action: Action::Errno,
    });
    assert!(verify_file(&profile.to_json().unwrap()).unwrap().is_clean());
}

#[test]
fn test_deny_list_split_across_actions() {
    let (killed, trapped) = HIGH_RISK_SYSCALLS.split_at(10);
    let profile = Profile {
        default_action: Action::Log,
        architectures: Vec::new(),
        syscalls: vec![
            SyscallRule {
                names: killed.iter().map(|s| s.to_string()).collect(),
                action: Action::KillProcess,
            },
            SyscallRule {
                names: trapped[1..].iter().map(|s| s.to_string()).collect(),
                action: Action::Trap,
            },
        ],
    };

    let verification = verify_file(&profile.to_json().unwrap()).unwrap();
    assert_eq!(verification.warnings().len(), 1);
    assert_eq!(verification.warnings()[0].syscall_name, trapped[0]);
}

#[test]
fn test_trace_rule_does_not_block_under_allow_default() {
    let verification = verify_file(
        r#"{
            "defaultAction": "SCMP_ACT_ALLOW",
            "syscalls": [{"names": ["ptrace"], "action": "SCMP_ACT_TRACE"}]
        }"#,
    )
    .unwrap();
    assert!(verification
        .warnings()
        .iter()
        .any(|w| w.syscall_name == "ptrace"));
}

#[test]
fn test_non_profile_documents_are_invalid() {
    for content in ["", "{\"defaultAction\": 3}", "null", "syscalls: []"] {
        assert!(
            matches!(verify_file(content), Err(SeccompError::InvalidProfile)),
            "accepted {:?}",
            content
        );
    }
}
