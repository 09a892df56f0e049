//! Test harness for the UCFG parser against fixture files.
//!
//! This test harness reads all .ucfg files from the test/ucfg/ directory,
//! parses them, and compares the canonical output against test/fmt/ when an
//! expected file exists. It also reads .nay files from test/nay/ (expected to
//! fail) and verifies they produce the expected error messages from
//! corresponding .error files.

use std::fs;
use std::path::{Path, PathBuf};

use libucfg::{parse, parse_with_filename, stringify};

/// Root test directory.
fn test_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("test")
}

/// Get all files with a given extension from a subdirectory of test/.
fn get_files_in_subdir(subdir: &str, ext: &str) -> Vec<PathBuf> {
    let pattern = test_root().join(subdir).join(format!("*.{}", ext));
    let mut files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
        .expect("valid glob pattern")
        .flatten()
        .collect();
    files.sort();
    files
}

/// Read a sibling fixture with the same stem.
fn read_expected(subdir: &str, path: &Path, ext: &str) -> Option<String> {
    let stem = path.file_stem().unwrap().to_string_lossy();
    let expected = test_root().join(subdir).join(format!("{}.{}", stem, ext));
    fs::read_to_string(expected).ok()
}

/// Run a single .ucfg test file (expected to succeed).
fn run_ucfg_test(path: &Path) -> Result<(), String> {
    let filename = path.file_name().unwrap().to_string_lossy().to_string();
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", filename, e))?;

    let root = parse(&content).map_err(|e| format!("{}: Unexpected parse error: {}", filename, e))?;

    let output =
        stringify(&root, 2).map_err(|e| format!("{}: Format error: {}", filename, e))?;

    if let Some(expected) = read_expected("fmt", path, "ucfg") {
        let expected = expected.trim_end_matches('\n');
        if output != expected {
            return Err(format!(
                "{}: Output mismatch\n    expected: {:?}\n    actual:   {:?}",
                filename, expected, output
            ));
        }
    }

    // The canonical form must parse back to the same tree.
    let reparsed = parse(&output)
        .map_err(|e| format!("{}: Canonical output does not parse: {}", filename, e))?;
    if reparsed != root {
        return Err(format!(
            "{}: Round trip mismatch\n    first:  {:?}\n    second: {:?}",
            filename, root, reparsed
        ));
    }

    // Formatting is stable after one pass.
    let again = stringify(&reparsed, 2).map_err(|e| format!("{}: {}", filename, e))?;
    if again != output {
        return Err(format!("{}: Canonical output is not stable", filename));
    }

    println!("  {} => ok", filename);
    Ok(())
}

/// Run a single .nay test file (expected to fail with specific error).
fn run_nay_test(path: &Path) -> Result<(), String> {
    let filename = path.file_name().unwrap().to_string_lossy().to_string();
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", filename, e))?;

    match parse_with_filename(&content, Some(&filename)) {
        Ok(root) => Err(format!(
            "{}: Expected parse error, but got success: {:?}",
            filename, root
        )),
        Err(e) => {
            let actual_error = e.to_string();
            match read_expected("nay", path, "error") {
                Some(expected) => {
                    let expected = expected.trim();
                    if actual_error == expected {
                        println!("  {} => error (as expected)", filename);
                        Ok(())
                    } else {
                        Err(format!(
                            "{}: Error mismatch\n    expected: {}\n    actual:   {}",
                            filename, expected, actual_error
                        ))
                    }
                }
                None => {
                    println!(
                        "  {} => error: {} (no .error file to compare)",
                        filename, actual_error
                    );
                    Ok(())
                }
            }
        }
    }
}

fn run_all(files: &[PathBuf], run: fn(&Path) -> Result<(), String>) -> Vec<String> {
    let mut errors = Vec::new();
    for file in files {
        if let Err(e) = run(file) {
            errors.push(e);
        }
    }
    println!(
        "\nResults: {} passed, {} failed",
        files.len() - errors.len(),
        errors.len()
    );
    for error in &errors {
        println!("  - {}", error);
    }
    errors
}

#[test]
fn test_all_ucfg_fixtures() {
    let files = get_files_in_subdir("ucfg", "ucfg");
    assert!(!files.is_empty(), "no .ucfg fixtures found");

    println!("\nRunning {} .ucfg test files:", files.len());
    let errors = run_all(&files, run_ucfg_test);
    assert!(errors.is_empty(), "{} .ucfg tests failed", errors.len());
}

#[test]
fn test_all_nay_fixtures() {
    let files = get_files_in_subdir("nay", "nay");
    assert!(!files.is_empty(), "no .nay fixtures found");

    println!("\nRunning {} .nay test files:", files.len());
    let errors = run_all(&files, run_nay_test);
    assert!(errors.is_empty(), "{} .nay tests failed", errors.len());
}

#[test]
fn test_every_fmt_file_has_a_source() {
    for expected in get_files_in_subdir("fmt", "ucfg") {
        let name = expected.file_name().unwrap();
        assert!(
            test_root().join("ucfg").join(name).exists(),
            "orphan expected output {:?}",
            name
        );
    }
}

#[test]
fn test_fmt_fixtures_are_canonical() {
    // Expected outputs are themselves valid documents in canonical form.
    for path in get_files_in_subdir("fmt", "ucfg") {
        let content = fs::read_to_string(&path).unwrap();
        let content = content.trim_end_matches('\n');
        let root = parse(content).unwrap();
        assert_eq!(stringify(&root, 2).unwrap(), content, "{:?}", path);
    }
}
