//! Domain models for the console.


pub use compliance_test::{ComplianceTest, DEFAULT_CATEGORY, NewComplianceTest};
