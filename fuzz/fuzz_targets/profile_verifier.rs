#![no_main]

use libfuzzer_sys::fuzz_target;
use seccomp_forge::verifier::ProfileVerifier;

fuzz_target!(|data: &[u8]| {
    // Arbitrary documents either verify or come back as InvalidProfile
    if let Ok(verification) = ProfileVerifier::new(data).run() {
        let _ = verification.status();
    }
});
