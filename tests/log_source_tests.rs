//! Integration tests for audit log discovery
//!
//! Scans the recorded syslog excerpt in `tests/fixtures/audit.log`, which
//! mixes records from a container init (pid 15), a shell (pid 16), the
//! daemon (pid 150) and non-audit noise.

use seccomp_forge::config::LogConfig;
use seccomp_forge::log_source::LogSource;
use seccomp_forge::synthesizer::Synthesizer;
use seccomp_forge::{Action, SeccompError, SyscallsSource};
use std::io::Write;
use std::path::PathBuf;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/audit.log")
}

fn discover(pids: &[i32]) -> Option<Vec<String>> {
    LogSource::from_path(fixture(), pids.to_vec())
        .unwrap()
        .system_calls()
        .unwrap()
        .map(|rule| rule.names)
}

#[test]
fn test_single_process_in_first_seen_order() {
    assert_eq!(discover(&[15]), Some(vec!["write".to_string(), "open".to_string()]));
}

#[test]
fn test_multiple_processes_are_merged() {
    let names = discover(&[16, 15]).unwrap();
    assert_eq!(names, vec!["write", "open", "execve", "read", "exit_group"]);
}

#[test]
fn test_pid_prefixes_do_not_leak() {
    // pid=150 shares the "15" prefix
    assert_eq!(discover(&[150]), Some(vec!["ptrace".to_string()]));
    assert!(!discover(&[15]).unwrap().contains(&"ptrace".to_string()));
}

#[test]
fn test_non_audit_lines_are_ignored() {
    // The dockerd line carries pid=15 syscall=9 (mmap) outside an audit record
    assert!(!discover(&[15]).unwrap().contains(&"mmap".to_string()));
}

#[test]
fn test_unknown_process_yields_none() {
    assert_eq!(discover(&[4242]), None);
}

#[test]
fn test_from_config() {
    let config = LogConfig { path: fixture() };
    let rule = LogSource::from_config(&config, vec![16])
        .unwrap()
        .system_calls()
        .unwrap()
        .unwrap();
    assert_eq!(rule.action, Action::Allow);
    assert_eq!(rule.names, vec!["execve", "read", "exit_group"]);
}

#[test]
fn test_missing_log_is_reported_with_path() {
    let config = LogConfig {
        path: PathBuf::from("/nonexistent/var/log/syslog"),
    };
    match LogSource::from_config(&config, vec![1]) {
        Err(SeccompError::LogUnavailable { path, .. }) => assert_eq!(path, config.path),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("expected missing log to fail"),
    }
}

#[test]
fn test_unsupported_id_aborts_scan() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "audit: type=1326 pid=15 syscall=0 compat=0").unwrap();
    writeln!(file, "audit: type=1326 pid=15 syscall=777 compat=0").unwrap();
    file.flush().unwrap();

    let err = LogSource::from_path(file.path(), vec![15])
        .unwrap()
        .system_calls()
        .unwrap_err();
    assert_eq!(err.to_string(), "syscall id 777 not supported");
}

#[test]
fn test_synthesized_profile_is_sorted() {
    let source = LogSource::from_path(fixture(), vec![15, 16]).unwrap();
    let profile = Synthesizer::new(source).profile().unwrap().unwrap();

    assert_eq!(profile.default_action, Action::Errno);
    assert_eq!(profile.syscalls.len(), 1);
    assert_eq!(
        profile.syscalls[0].names,
        vec!["execve", "exit_group", "open", "read", "write"]
    );
}

#[test]
fn test_nil_profile_when_process_never_logged() {
    let source = LogSource::from_path(fixture(), vec![4242]).unwrap();
    let profile = Synthesizer::new(source)
        .nil_profile_for_no_calls(true)
        .profile()
        .unwrap();
    assert!(profile.is_none());
}
