//! Stdout Enforcement
//!
//! Only the CLI renderer writes to stdout. The core library reports
//! through `tracing` and return values.

use super::source_scan;

fn writes_stdout(line: &str) -> bool {
    let line = line.replace("eprintln!", "").replace("eprint!(", "");
    ["println!", "print!(", "dbg!(", "std::io::stdout"]
        .iter()
        .any(|pattern| line.contains(pattern))
}

#[test]
fn test_core_never_prints() {
    let (files_checked, violations) = source_scan::scan(&["rtsim-core"], writes_stdout);

    assert!(files_checked > 0, "no source files found");
    let listing: Vec<String> = violations.iter().map(ToString::to_string).collect();
    assert!(
        violations.is_empty(),
        "stdout writes in rtsim-core:\n{}",
        listing.join("\n")
    );
}

#[test]
fn test_detects_prints() {
    assert!(writes_stdout("    println!(\"x\");"));
    assert!(writes_stdout("let out = std::io::stdout();"));
    assert!(!writes_stdout("tracing::info!(\"x\");"));
    assert!(!writes_stdout("eprintln!(\"x\");"));
}
