pub mod action;
pub mod classifier;
pub mod error;
pub mod generator;
pub mod repos;

pub use action::{Action, ActionFailure, ActionRegistry, ActionReport, PrintAction, RemoveAction};
pub use classifier::{
    ClassifyConfig, ClassifyOutcome, EmptyDirClassifier, TraversalPolicy, find_empty_dirs,
};
pub use error::{Result, ShellToolsError};
pub use generator::{FileGenerator, GenerateConfig, parse_size};
pub use repos::{RepoSyncer, SyncConfig, SyncSummary, find_repositories};

/// 格式化字节大小为人类可读格式
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}
