//! Shared fixtures for the integration tests: device-format line builders
//! and helpers that run a backend over in-memory text

// Each test binary uses a different subset of the helpers
#![allow(dead_code)]

pub mod builders;
pub mod mock_helpers;

/// Assert two readings agree to within `tolerance`
pub fn assert_float_eq(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() < tolerance,
        "reading {} differs from {} by more than {}",
        actual,
        expected,
        tolerance
    );
}
