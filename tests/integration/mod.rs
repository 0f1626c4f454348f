// Integration tests for the offer monitor
// These exercise the scan pipeline and the command loop end to end

pub mod scan_tests;
pub mod support;
