#![no_main]

use libfuzzer_sys::fuzz_target;
use seccomp_forge::log_source::LogSource;
use seccomp_forge::SyscallsSource;

fuzz_target!(|data: &[u8]| {
    // Any byte stream, including invalid UTF-8, must scan without panicking
    let mut source = LogSource::new(data, vec![1, 15, 4242]);
    let _ = source.system_calls();
});
