//! Style Enforcement Tests
//!
//! Scans the production sources of the workspace crates for patterns that
//! clippy does not catch.
//!
//! - `dead_code_enforcement` - No `#[allow(dead_code)]` in production code
//! - `stdout_enforcement` - The core library never writes to stdout

#[path = "style/source_scan.rs"]
mod source_scan;

#[path = "style/dead_code_enforcement.rs"]
mod dead_code_enforcement;

#[path = "style/stdout_enforcement.rs"]
mod stdout_enforcement;
