//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use std::path::PathBuf;
use tempfile::TempDir;

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times; subsequent calls are no-ops.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Write a settings file and a notes file describing a small vault.
///
/// Returns `(settings_path, notes_path)`.
///
/// ```text
/// Home
/// ├── Projects ── same ── Areas
/// │   ├── alpha
/// │   └── beta
/// └── Areas
///     └── health
/// ```
#[allow(dead_code)]
pub fn create_test_vault(temp_dir: &TempDir) -> (PathBuf, PathBuf) {
    let settings_path = temp_dir.path().join("crumbs.toml");
    let settings = r#"
freeze_destination = "dataview-inline"

[[hierarchies]]
dirs = { up = ["parent"], same = ["sibling"], down = ["child"] }
implied_relationships = { same_parent_is_sibling = true, parents_sibling_is_parent = true }

[[hierarchies]]
dirs = { next = ["next"], prev = ["prev"] }

[trail]
index_notes = ["Home.md"]
selection = "all"

[list_index]
indent = "  "
link_kind = "wiki"
"#;
    std::fs::write(&settings_path, settings).unwrap();

    let notes_path = temp_dir.path().join("notes.toml");
    let notes = r#"
notes = ["Home.md", "Projects.md", "Areas.md", "alpha.md", "beta.md", "health.md"]

[[edges]]
source = "Projects.md"
field = "parent"
target = "Home.md"

[[edges]]
source = "Areas.md"
field = "parent"
target = "Home.md"

[[edges]]
source = "Projects.md"
field = "sibling"
target = "Areas.md"

[[edges]]
source = "alpha.md"
field = "parent"
target = "Projects.md"

[[edges]]
source = "beta.md"
field = "parent"
target = "Projects.md"

[[edges]]
source = "health.md"
field = "parent"
target = "Areas.md"

[[edges]]
source = "alpha.md"
field = "next"
target = "beta.md"
"#;
    std::fs::write(&notes_path, notes).unwrap();

    (settings_path, notes_path)
}
