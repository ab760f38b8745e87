//! In-kernel builtin-test tooling.
//!
//! Tests are plain functions returning [`TestResult`], grouped into
//! `*_tests.rs` modules next to the code they exercise.  Each module exposes
//! a `run_all()` aggregator driven by the [`run_test!`] macro; results go to
//! the kernel log.

use core::ffi::c_int;

use crate::klog_info;

mod assertions;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestResult {
    Pass,
    Fail,
    /// Preconditions not met (e.g. hardware absent); not counted as failure.
    Skipped,
}

impl TestResult {
    #[inline]
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Fail)
    }

    #[inline]
    pub fn to_c_int(self) -> c_int {
        match self {
            Self::Pass | Self::Skipped => 0,
            Self::Fail => -1,
        }
    }
}

/// Run one test and log its outcome.
pub fn run_single_test(name: &str, test: impl FnOnce() -> TestResult) -> TestResult {
    let result = test();
    match result {
        TestResult::Pass => klog_info!("TEST: {} ... ok", name),
        TestResult::Fail => klog_info!("TEST: {} ... FAILED", name),
        TestResult::Skipped => klog_info!("TEST: {} ... skipped", name),
    }
    result
}

#[macro_export]
macro_rules! pass {
    () => {
        $crate::testing::TestResult::Pass
    };
}

#[macro_export]
macro_rules! skip {
    () => {
        $crate::testing::TestResult::Skipped
    };
    ($msg:expr) => {{
        $crate::klog_info!("TEST SKIP: {}", $msg);
        $crate::testing::TestResult::Skipped
    }};
}

#[macro_export]
macro_rules! fail {
    () => {
        $crate::testing::TestResult::Fail
    };
    ($msg:expr) => {{
        $crate::klog_info!("TEST FAIL: {}", $msg);
        $crate::testing::TestResult::Fail
    }};
    ($fmt:expr, $($arg:tt)*) => {{
        $crate::klog_info!(concat!("TEST FAIL: ", $fmt), $($arg)*);
        $crate::testing::TestResult::Fail
    }};
}

/// Run a test function, bumping the caller's failed/total counters.
#[macro_export]
macro_rules! run_test {
    ($failed:expr, $total:expr, $test_fn:expr) => {{
        $total += 1;
        let result = $crate::testing::run_single_test(stringify!($test_fn), || $test_fn());
        if result.is_failure() {
            $failed += 1;
        }
    }};
}
