//! Style Enforcement Tests
//!
//! Enforces naming and documentation patterns that clippy cannot catch.
//!
//! # Test Organization
//!
//! - `naming_conventions` - Enforces naming patterns for types, functions, and modules
//! - `dead_code_enforcement` - Prevents #[allow(dead_code)] in production code
//!
//! Only the `browsflix*` crates are scanned.

#[path = "style/naming_conventions.rs"]
mod naming_conventions;

#[path = "style/dead_code_enforcement.rs"]
mod dead_code_enforcement;
