//! Shared source walking for style checks.

use std::fs;
use std::path::{Path, PathBuf};

/// A forbidden pattern found in production code.
#[derive(Debug)]
pub struct Violation {
    pub file_path: String,
    pub line_number: usize,
    pub context: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.file_path, self.line_number, self.context.trim())
    }
}

/// Workspace root, one level above this crate.
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".."))
}

/// All `.rs` files under `crate_name/src`.
pub fn crate_sources(crate_name: &str) -> Vec<PathBuf> {
    let mut files = Vec::new();
    collect_rust_files(&workspace_root().join(crate_name).join("src"), &mut files);
    files.sort();
    files
}

fn collect_rust_files(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rust_files(&path, files);
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            files.push(path);
        }
    }
}

/// True for files that hold only test code.
pub fn is_test_file(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name == "tests.rs" || name.to_string_lossy().ends_with("_tests.rs"))
}

/// Production lines of a file: stops at the first `#[cfg(test)]` and
/// skips comment lines. Yields 1-based line numbers.
pub fn production_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| line.trim() != "#[cfg(test)]")
        .filter(|(_, line)| !line.trim_start().starts_with("//"))
        .map(|(index, line)| (index + 1, line))
}

/// Runs `matches` over every production line of the given crates.
pub fn scan(crates: &[&str], matches: impl Fn(&str) -> bool) -> (usize, Vec<Violation>) {
    let mut files_checked = 0;
    let mut violations = Vec::new();

    for crate_name in crates {
        for path in crate_sources(crate_name) {
            if is_test_file(&path) {
                continue;
            }
            let Ok(content) = fs::read_to_string(&path) else {
                continue;
            };
            files_checked += 1;

            for (line_number, line) in production_lines(&content) {
                if matches(line) {
                    violations.push(Violation {
                        file_path: path.to_string_lossy().into_owned(),
                        line_number,
                        context: line.to_string(),
                    });
                }
            }
        }
    }

    (files_checked, violations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_test_file() {
        assert!(is_test_file(Path::new("src/scheduler/tests.rs")));
        assert!(is_test_file(Path::new("src/monitor_tests.rs")));
        assert!(!is_test_file(Path::new("src/scheduler/monitor.rs")));
    }

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let source = "fn a() {}\n// note\nfn b() {}\n#[cfg(test)]\nmod tests {}\n";

        let lines: Vec<(usize, &str)> = production_lines(source).collect();

        assert_eq!(lines, vec![(1, "fn a() {}"), (3, "fn b() {}")]);
    }
}
