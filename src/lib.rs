//! # shell-tools
//!
//! Small filesystem helpers for developer workstations.
//!
//! ## Features
//!
//! - Find empty leaf directories, optionally treating zero-byte files as absent
//! - Apply a named action (`print`, `remove`) to the directories found
//! - Generate files filled with random data
//! - Pull every git repository below a directory
//!
//! ## Usage
//!
//! ### Command Line
//!
//! ```bash
//! # Print empty directories below the current directory
//! shell-tools find-empty
//!
//! # Remove them, ignoring zero-byte files
//! shell-tools find-empty ~/projects --ignore-empty-files --remove
//!
//! # Generate a 10 MiB file of random lines
//! shell-tools generate-file data.txt --size 10mb
//!
//! # Pull all repositories below ~/src, recursively
//! shell-tools sync-repos ~/src -r
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use shell_tools::{Action, ActionRegistry, ClassifyConfig, EmptyDirClassifier};
//!
//! let temp_dir = tempfile::TempDir::new()?;
//! std::fs::create_dir(temp_dir.path().join("empty"))?;
//!
//! let classifier = EmptyDirClassifier::new(ClassifyConfig {
//!     ignore_empty_files: true,
//!     ..Default::default()
//! });
//! let dirs = classifier.classify(temp_dir.path())?;
//! assert_eq!(dirs.len(), 1);
//!
//! let registry = ActionRegistry::with_defaults();
//! registry.resolve("print")?.apply(&dirs)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export core functionality
pub use shell_tools_core::*;

// Re-export commonly used types
pub use shell_tools_core::{
    Action, ActionRegistry, ActionReport, ClassifyConfig, EmptyDirClassifier, FileGenerator,
    GenerateConfig, RepoSyncer, ShellToolsError, SyncConfig, TraversalPolicy,
};
