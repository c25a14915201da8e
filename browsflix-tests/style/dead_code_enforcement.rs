//! Dead Code Enforcement
//!
//! Production code in the Browsflix crates must not silence the dead code
//! lint. Test code is exempt.

use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
struct DeadCodeViolation {
    file_path: String,
    line_number: usize,
    context: String,
}

struct DeadCodeChecker {
    violations: Vec<DeadCodeViolation>,
    files_checked: usize,
}

impl DeadCodeChecker {
    fn new() -> Self {
        Self {
            violations: Vec::new(),
            files_checked: 0,
        }
    }

    fn production_sources(root: &Path) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(root)? {
            let path = entry?.path();
            let is_production_crate = path.file_name().is_some_and(|name| {
                let name = name.to_string_lossy();
                name.starts_with("browsflix") && name != "browsflix-tests"
            });
            if path.is_dir() && is_production_crate {
                Self::collect_rust_files(&path.join("src"), &mut files)?;
            }
        }
        Ok(files)
    }

    fn collect_rust_files(
        dir: &Path,
        files: &mut Vec<PathBuf>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if !dir.is_dir() {
            return Ok(());
        }

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                Self::collect_rust_files(&path, files)?;
            } else if path.extension().is_some_and(|ext| ext == "rs") {
                files.push(path);
            }
        }
        Ok(())
    }

    /// Records every dead code allowance in `content`.
    fn scan(&mut self, file_path: &str, content: &str) {
        for (index, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            let allows_dead_code = (trimmed.starts_with("#[allow(")
                || trimmed.starts_with("#![allow("))
                && trimmed.contains("dead_code");

            if allows_dead_code {
                self.violations.push(DeadCodeViolation {
                    file_path: file_path.to_string(),
                    line_number: index + 1,
                    context: trimmed.to_string(),
                });
            }
        }
    }

    fn check_workspace(&mut self, root: &Path) -> Result<(), Box<dyn std::error::Error>> {
        for file in Self::production_sources(root)? {
            let content = fs::read_to_string(&file)?;
            self.scan(&file.display().to_string(), &content);
            self.files_checked += 1;
        }
        Ok(())
    }

    fn report_violations(&self) -> bool {
        if self.violations.is_empty() {
            println!(
                "Dead code enforcement: {} files checked, no violations found",
                self.files_checked
            );
            return true;
        }

        println!("Dead code enforcement violations found:");
        println!();
        for violation in &self.violations {
            println!("{}:{}", violation.file_path, violation.line_number);
            println!("  {}", violation.context);
        }
        println!();
        println!(
            "Found {} violation(s) in {} file(s) checked",
            self.violations.len(),
            self.files_checked
        );
        println!("Remove unused code, use it, or gate it behind cfg(test).");

        false
    }
}
