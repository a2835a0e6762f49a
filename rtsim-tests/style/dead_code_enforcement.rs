//! Dead Code Enforcement
//!
//! Production code must not silence dead code warnings. Test modules are
//! exempt.

use super::source_scan::{self, Violation};

fn is_dead_code_allowance(line: &str) -> bool {
    let trimmed = line.trim();
    (trimmed.starts_with("#[allow(") || trimmed.starts_with("#![allow("))
        && trimmed.contains("dead_code")
}

fn report(files_checked: usize, violations: &[Violation]) -> String {
    let mut message = format!(
        "Found {} dead code allowance(s) in {} file(s) checked:\n",
        violations.len(),
        files_checked
    );
    for violation in violations {
        message.push_str(&format!("  {violation}\n"));
    }
    message.push_str("Remove the unused code or use it.\n");
    message
}

#[test]
fn test_no_dead_code_allowances() {
    let (files_checked, violations) =
        source_scan::scan(&["rtsim-core", "rtsim-cli"], is_dead_code_allowance);

    assert!(files_checked > 0, "no source files found");
    assert!(violations.is_empty(), "{}", report(files_checked, &violations));
}

#[test]
fn test_detects_allowance() {
    assert!(is_dead_code_allowance("    #[allow(dead_code)]"));
    assert!(is_dead_code_allowance("#[allow(unused, dead_code)]"));
    assert!(is_dead_code_allowance("#![allow(dead_code)]"));
    assert!(!is_dead_code_allowance("let dead_code = 1;"));
}
