use shell_tools_core::{
    Action, ActionReport, ClassifyConfig, EmptyDirClassifier, TraversalPolicy, action,
};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 创建临时目录树
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    fs::create_dir_all(root.join("docs/drafts"))?;
    fs::create_dir_all(root.join("assets/icons"))?;
    fs::create_dir_all(root.join("logs"))?;
    fs::write(root.join("assets/icons/app.svg"), "<svg/>")?;
    fs::write(root.join("logs/run.log"), "")?;

    let classifier = EmptyDirClassifier::new(ClassifyConfig {
        ignore_empty_files: true,
        on_error: TraversalPolicy::Skip,
    });
    let outcome = classifier.classify_with_outcome(root)?;

    println!("找到 {} 个空目录:", outcome.empty_dirs.len());
    action::resolve_global(action::PRINT)?.apply(&outcome.empty_dirs)?;

    // 注册一个只统计数量的动作
    action::register_global("count", |paths: &[PathBuf]| -> shell_tools_core::Result<ActionReport> {
        println!("共 {} 个目录", paths.len());
        let mut report = ActionReport::new();
        report.processed = paths.len();
        Ok(report)
    });
    action::resolve_global("count")?.apply(&outcome.empty_dirs)?;

    // logs 中的空文件需要先删除，remove 只删除真正的空目录
    fs::remove_file(root.join("logs/run.log"))?;

    println!("\n开始删除...");
    let report = action::resolve_global(action::REMOVE)?.apply(&outcome.empty_dirs)?;
    println!(
        "\n删除完成: 成功 {} 个，失败 {} 个",
        report.processed,
        report.failed.len()
    );

    Ok(())
}
