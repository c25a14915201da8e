//! Naming Convention Checker
//!
//! Flags banned function prefixes, role-noun type suffixes, generic module
//! names and malformed `# Errors` sections in the Browsflix crates.

use std::fs;
use std::path::{Path, PathBuf};

/// A naming violation found in the code
#[derive(Debug)]
struct NamingViolation {
    file_path: String,
    line_number: usize,
    violation_type: &'static str,
    message: String,
}

impl NamingViolation {
    fn new(file_path: &Path, line_number: usize, violation_type: &'static str, message: String) -> Self {
        Self {
            file_path: file_path.display().to_string(),
            line_number,
            violation_type,
            message,
        }
    }
}

const BANNED_FUNCTION_PREFIXES: [(&str, &str); 3] = [
    ("get_", "Use the noun directly: movie.year() not movie.get_year()"),
    (
        "set_",
        "Use a verb describing the change: update_query() not set_query()",
    ),
    (
        "handle_",
        "Be specific: process_command() not handle_command()",
    ),
];

const BANNED_TYPE_SUFFIXES: [(&str, &str); 2] = [
    ("Factory", "Use a constructor or builder method"),
    ("Service", "Name what the type does, not that it serves"),
];

/// Allowed on traits, where the role is the point
const STRUCT_ROLE_SUFFIXES: [(&str, &str); 4] = [
    ("Manager", "Name what the struct IS, not its role"),
    ("Handler", "Name what is being handled"),
    ("Processor", "Name what is being processed"),
    ("Controller", "Name what is being controlled"),
];

const BANNED_MODULE_NAMES: [&str; 5] = ["utils", "common", "helpers", "misc", "stuff"];

struct NamingChecker {
    violations: Vec<NamingViolation>,
    files_checked: usize,
}

impl NamingChecker {
    fn new() -> Self {
        Self {
            violations: Vec::new(),
            files_checked: 0,
        }
    }

    /// Rust files of every `browsflix*` crate in the workspace.
    fn crate_sources(root: &Path) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(root)? {
            let path = entry?.path();
            let is_crate_dir = path
                .file_name()
                .is_some_and(|name| name.to_string_lossy().starts_with("browsflix"));
            if path.is_dir() && is_crate_dir {
                Self::collect_rust_files(&path, &mut files, 0)?;
            }
        }
        Ok(files)
    }

    fn collect_rust_files(
        dir: &Path,
        files: &mut Vec<PathBuf>,
        depth: usize,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if depth > 8 {
            return Ok(());
        }

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let skipped = path.file_name().is_some_and(|name| {
                let name = name.to_string_lossy();
                name == "target" || name.starts_with('.')
            });
            if skipped {
                continue;
            }

            if path.is_dir() {
                Self::collect_rust_files(&path, files, depth + 1)?;
            } else if path.extension().is_some_and(|ext| ext == "rs") {
                files.push(path);
            }
        }
        Ok(())
    }

    fn check_function_prefixes(&mut self, file_path: &Path, content: &str) {
        for (line_num, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.starts_with("//") {
                continue;
            }

            let signature = ["pub fn ", "pub async fn ", "fn ", "async fn ", "pub(crate) fn "]
                .iter()
                .find_map(|start| trimmed.strip_prefix(start));
            let Some(signature) = signature else {
                continue;
            };

            for (prefix, correction) in BANNED_FUNCTION_PREFIXES {
                if signature.starts_with(prefix) {
                    self.violations.push(NamingViolation::new(
                        file_path,
                        line_num + 1,
                        "BANNED_FUNCTION_PREFIX",
                        format!("Function uses banned prefix '{prefix}'. {correction}"),
                    ));
                }
            }
        }
    }

    fn check_type_naming(&mut self, file_path: &Path, content: &str) {
        for (line_num, line) in content.lines().enumerate() {
            let trimmed = line.trim().trim_start_matches("pub(crate) ").trim_start_matches("pub ");

            let (kind, rest) = match trimmed.split_once(' ') {
                Some((kind @ ("struct" | "enum" | "trait"), rest)) => (kind, rest),
                _ => continue,
            };
            let type_name = rest
                .split(|c: char| !(c.is_alphanumeric() || c == '_'))
                .next()
                .unwrap_or("");
            if type_name.is_empty() {
                continue;
            }

            for (suffix, message) in BANNED_TYPE_SUFFIXES {
                if type_name.ends_with(suffix) {
                    self.violations.push(NamingViolation::new(
                        file_path,
                        line_num + 1,
                        "BANNED_TYPE_SUFFIX",
                        format!("Type '{type_name}' uses banned '{suffix}' suffix. {message}"),
                    ));
                }
            }

            if kind == "trait" {
                continue;
            }
            for (suffix, message) in STRUCT_ROLE_SUFFIXES {
                if type_name.ends_with(suffix) {
                    self.violations.push(NamingViolation::new(
                        file_path,
                        line_num + 1,
                        "VERBOSE_TYPE_SUFFIX",
                        format!("Type '{type_name}' uses verbose '{suffix}' suffix. {message}"),
                    ));
                }
            }
        }
    }

    fn check_module_names(&mut self, file_path: &Path) {
        let Some(stem) = file_path.file_stem() else {
            return;
        };
        let stem = stem.to_string_lossy();

        if BANNED_MODULE_NAMES.contains(&stem.as_ref()) {
            self.violations.push(NamingViolation::new(
                file_path,
                1,
                "BANNED_MODULE_NAME",
                format!("Module name '{stem}' is too generic. Name what the module contains"),
            ));
        }
    }

    /// `# Errors` sections: blank doc line, then ``- `ErrorType` - condition`` bullets.
    fn check_errors_sections(&mut self, file_path: &Path, content: &str) {
        let lines: Vec<&str> = content.lines().map(str::trim).collect();

        for (index, line) in lines.iter().enumerate() {
            if *line != "/// # Errors" {
                continue;
            }

            if lines.get(index + 1) != Some(&"///") {
                self.violations.push(NamingViolation::new(
                    file_path,
                    index + 1,
                    "INVALID_DOC_FORMAT",
                    "# Errors section must be followed by blank line: `///`".to_string(),
                ));
                continue;
            }

            let mut entries = 0;
            for (offset, doc_line) in lines[index + 2..].iter().enumerate() {
                let Some(text) = doc_line.strip_prefix("///") else {
                    break;
                };
                let text = text.trim();
                if text.starts_with("# ") {
                    break;
                }
                if text.is_empty() {
                    continue;
                }

                entries += 1;
                let line_number = index + 3 + offset;
                match text.strip_prefix("- ") {
                    Some(bullet) if bullet.starts_with('`') && bullet.contains("` - ") => {}
                    Some(_) => self.violations.push(NamingViolation::new(
                        file_path,
                        line_number,
                        "INVALID_DOC_FORMAT",
                        "Use format `- ErrorType - condition` with backticks around error type"
                            .to_string(),
                    )),
                    None => self.violations.push(NamingViolation::new(
                        file_path,
                        line_number,
                        "INVALID_DOC_FORMAT",
                        "# Errors content must use bullet points: `- ErrorType - condition`"
                            .to_string(),
                    )),
                }
            }

            if entries == 0 {
                self.violations.push(NamingViolation::new(
                    file_path,
                    index + 1,
                    "INVALID_DOC_FORMAT",
                    "# Errors section cannot be empty - list specific error types".to_string(),
                ));
            }
        }
    }

    fn check_file(&mut self, file_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        // This file spells out violations on purpose
        if file_path.ends_with("naming_conventions.rs") {
            return Ok(());
        }

        let content = fs::read_to_string(file_path)?;

        self.check_function_prefixes(file_path, &content);
        self.check_type_naming(file_path, &content);
        self.check_module_names(file_path);
        self.check_errors_sections(file_path, &content);

        self.files_checked += 1;
        Ok(())
    }

    fn check_workspace(&mut self, root: &Path) -> Result<(), Box<dyn std::error::Error>> {
        for file in Self::crate_sources(root)? {
            if let Err(e) = self.check_file(&file) {
                eprintln!("Warning: Failed to check {}: {e}", file.display());
            }
        }
        Ok(())
    }

    fn report_violations(&self) -> bool {
        if self.violations.is_empty() {
            println!("Naming conventions check passed");
            println!("  Files checked: {}", self.files_checked);
            return true;
        }

        println!("Naming convention violations found:");
        println!();
        for violation in &self.violations {
            println!(
                "{}:{}:{} - {}",
                violation.file_path,
                violation.line_number,
                violation.violation_type,
                violation.message
            );
        }
        println!();
        println!("  Files checked: {}", self.files_checked);
        println!("  Violations: {}", self.violations.len());

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banned_function_prefixes() {
        let mut checker = NamingChecker::new();
        const CODE: &str = r#"
impl Session {
    pub fn get_state(&self) -> u32 { 42 }
    pub fn set_query(&mut self, q: String) { }
    fn handle_command(&self) { }
    pub async fn get_results(&self) { }
    pub fn update_query(&mut self) { } // OK
    fn process_get_request(&self) { } // OK - get_ not at the start
    pub fn getter(&self) { } // OK - no underscore
    // fn get_commented(&self) { }
}
"#;

        checker.check_function_prefixes(Path::new("session.rs"), CODE);

        assert_eq!(checker.violations.len(), 4);
        assert!(checker.violations.iter().all(|v| v.violation_type == "BANNED_FUNCTION_PREFIX"));
        assert_eq!(checker.violations[0].line_number, 3);
    }

    #[test]
    fn test_type_suffixes() {
        let mut checker = NamingChecker::new();
        const CODE: &str = r#"
pub struct CatalogClientFactory { }
pub struct SearchService;
struct SessionController { }
pub(crate) enum EventHandler { }
pub trait RecorderManager: Send { }
pub struct SearchSession { }
pub trait UsageRecorder { }
"#;

        checker.check_type_naming(Path::new("types.rs"), CODE);

        // Factory, Service, Controller, Handler; trait role suffixes are allowed
        assert_eq!(checker.violations.len(), 4);
        assert!(!checker.violations.iter().any(|v| v.message.contains("RecorderManager")));
        assert!(!checker.violations.iter().any(|v| v.message.contains("SearchSession")));
    }

    #[test]
    fn test_banned_module_names() {
        let mut checker = NamingChecker::new();

        for path in ["utils.rs", "common.rs", "helpers.rs", "src/misc.rs"] {
            checker.check_module_names(Path::new(path));
        }
        for path in ["debouncer.rs", "strategy.rs", "mod.rs"] {
            checker.check_module_names(Path::new(path));
        }

        assert_eq!(checker.violations.len(), 4);
    }

    #[test]
    fn test_errors_section_format() {
        let mut checker = NamingChecker::new();
        const CODE: &str = r#"
/// Fine.
///
/// # Errors
///
/// - `SessionError::Shutdown` - Session loop is no longer running
fn good() {}

/// # Errors
/// - `CatalogError` - Missing blank line
fn no_blank() {}

/// # Errors
///
/// Returns CatalogError if the request fails
fn prose() {}

/// # Errors
///
/// - CatalogError when it fails
fn no_backticks() {}
"#;

        checker.check_errors_sections(Path::new("docs.rs"), CODE);

        let lines: Vec<usize> = checker.violations.iter().map(|v| v.line_number).collect();
        assert_eq!(lines, vec![9, 15, 20]);
    }

    #[test]
    fn naming_convention_enforcement() {
        let mut checker = NamingChecker::new();

        checker
            .check_workspace(Path::new(".."))
            .expect("Failed to check workspace");

        assert!(
            checker.report_violations(),
            "Naming convention violations found - see output above"
        );
    }
}
