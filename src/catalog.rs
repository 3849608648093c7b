//! Static syscall catalogs consumed by the sources and the verifier
//!
//! - [`HIGH_RISK_SYSCALLS`]: calls that escalate privilege or break isolation
//! - [`ESSENTIAL_SYSCALLS`]: calls no process can start or exit without
//! - [`BRUTE_FORCE_CANDIDATES`]: frequency-ranked universe probed by brute force
//! - [`template`]: named, pre-computed allow lists

/// Syscalls that materially escalate privilege or bypass isolation
///
/// Kernel module and kexec control, tracing of other processes, namespace
/// manipulation, keyring access, NUMA policy, clock changes and similar.
pub const HIGH_RISK_SYSCALLS: &[&str] = &[
    "_sysctl",
    "acct",
    "add_key",
    "bpf",
    "clock_adjtime",
    "clock_settime",
    "create_module",
    "delete_module",
    "finit_module",
    "get_kernel_syms",
    "get_mempolicy",
    "init_module",
    "ioperm",
    "iopl",
    "kcmp",
    "kexec_file_load",
    "kexec_load",
    "keyctl",
    "lookup_dcookie",
    "mbind",
    "mount",
    "move_pages",
    "name_to_handle_at",
    "nfsservctl",
    "open_by_handle_at",
    "perf_event_open",
    "personality",
    "pivot_root",
    "process_vm_readv",
    "process_vm_writev",
    "ptrace",
    "query_module",
    "quotactl",
    "reboot",
    "request_key",
    "set_mempolicy",
    "setns",
    "settimeofday",
    "stime",
    "swapoff",
    "swapon",
    "sysfs",
    "umount",
    "umount2",
    "unshare",
    "uselib",
    "userfaultfd",
    "ustat",
    "vm86",
    "vm86old",
];

/// Syscalls every workload needs; never excluded while probing
pub const ESSENTIAL_SYSCALLS: &[&str] = &["close", "exit", "exit_group", "execve", "futex"];

/// Commonly required syscalls, most frequent first
///
/// Brute force only probes this universe, trading completeness for a
/// tractable number of sandbox runs.
pub const BRUTE_FORCE_CANDIDATES: &[&str] = &[
    "read",
    "write",
    "close",
    "openat",
    "mmap",
    "fstat",
    "newfstatat",
    "mprotect",
    "futex",
    "brk",
    "rt_sigaction",
    "rt_sigprocmask",
    "munmap",
    "execve",
    "exit_group",
    "exit",
    "arch_prctl",
    "access",
    "pread64",
    "lseek",
    "ioctl",
    "getdents64",
    "fcntl",
    "stat",
    "lstat",
    "open",
    "set_tid_address",
    "set_robust_list",
    "prlimit64",
    "getrandom",
    "rseq",
    "clock_gettime",
    "clock_nanosleep",
    "nanosleep",
    "getpid",
    "gettid",
    "getppid",
    "getuid",
    "geteuid",
    "getgid",
    "getegid",
    "getpgrp",
    "getcwd",
    "chdir",
    "uname",
    "sysinfo",
    "readlink",
    "readlinkat",
    "faccessat",
    "faccessat2",
    "statx",
    "statfs",
    "fstatfs",
    "dup",
    "dup2",
    "dup3",
    "pipe",
    "pipe2",
    "poll",
    "ppoll",
    "select",
    "pselect6",
    "epoll_create1",
    "epoll_ctl",
    "epoll_wait",
    "epoll_pwait",
    "eventfd2",
    "madvise",
    "mremap",
    "sigaltstack",
    "rt_sigreturn",
    "sched_yield",
    "sched_getaffinity",
    "clone",
    "clone3",
    "fork",
    "vfork",
    "wait4",
    "kill",
    "tgkill",
    "prctl",
    "capget",
    "capset",
    "setuid",
    "setgid",
    "setgroups",
    "socket",
    "connect",
    "accept",
    "accept4",
    "bind",
    "listen",
    "sendto",
    "recvfrom",
    "sendmsg",
    "recvmsg",
    "shutdown",
    "getsockname",
    "getpeername",
    "setsockopt",
    "getsockopt",
    "socketpair",
    "writev",
    "readv",
    "pwrite64",
    "sendfile",
    "mkdir",
    "mkdirat",
    "unlink",
    "unlinkat",
    "rename",
    "renameat",
    "rmdir",
    "chmod",
    "fchmod",
    "fchmodat",
    "fchown",
    "umask",
    "fsync",
    "fdatasync",
    "ftruncate",
    "flock",
    "utimensat",
    "getrlimit",
    "setrlimit",
    "getrusage",
    "times",
    "gettimeofday",
    "time",
    "sched_setaffinity",
    "membarrier",
    "memfd_create",
    "close_range",
];

const WEB_TEMPLATE: &[&str] = &[
    "arch_prctl",
    "capget",
    "capset",
    "chdir",
    "close",
    "epoll_pwait",
    "execve",
    "fstat",
    "fstatfs",
    "futex",
    "getdents64",
    "getppid",
    "mprotect",
    "newfstatat",
    "openat",
    "prctl",
    "read",
    "setgid",
    "setgroups",
    "setuid",
    "stat",
    "write",
];

const TEMPLATES: &[(&str, &[&str])] = &[("web", WEB_TEMPLATE)];

/// Allow list of a built-in template
pub fn template(name: &str) -> Option<&'static [&'static str]> {
    TEMPLATES
        .iter()
        .find(|(template, _)| *template == name)
        .map(|(_, syscalls)| *syscalls)
}

/// Names of all built-in templates
pub fn template_names() -> impl Iterator<Item = &'static str> {
    TEMPLATES.iter().map(|(name, _)| *name)
}

pub fn is_high_risk(name: &str) -> bool {
    HIGH_RISK_SYSCALLS.contains(&name)
}

pub fn is_essential(name: &str) -> bool {
    ESSENTIAL_SYSCALLS.contains(&name)
}
