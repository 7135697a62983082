use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::error::{Result, ShellToolsError};

/// 仓库同步配置
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// 拉取后是否更新子模块
    pub submodules: bool,
    pub git_program: PathBuf,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            submodules: false,
            git_program: PathBuf::from("git"),
        }
    }
}

/// 批量同步结果
#[derive(Debug, Clone, Default)]
pub struct SyncSummary {
    pub synced: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

/// 查找 `root` 下的 git 仓库（包含 `.git` 的目录）
///
/// 非递归模式只检查 `root` 的直接子目录；递归模式检查 `root` 本身及其下
/// 所有目录，但不进入 `.git` 目录。结果按路径排序。
pub fn find_repositories<P: AsRef<Path>>(root: P, recursive: bool) -> Vec<PathBuf> {
    let root = root.as_ref();
    if !root.is_dir() {
        warn!("仓库根路径不是目录: {:?}", root);
        return Vec::new();
    }

    let (min_depth, max_depth) = if recursive { (0, usize::MAX) } else { (1, 1) };

    let mut repos: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(min_depth)
        .max_depth(max_depth)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != ".git")
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("扫描错误: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_dir() && entry.path().join(".git").exists())
        .map(|entry| entry.into_path())
        .collect();

    repos.sort();
    info!("在 {:?} 下找到 {} 个仓库", root, repos.len());
    repos
}

/// 通过 git 命令行拉取仓库更新
pub struct RepoSyncer {
    config: SyncConfig,
}

impl RepoSyncer {
    pub fn new(config: SyncConfig) -> Self {
        Self { config }
    }

    /// 同步单个仓库，返回 git 的标准输出行
    pub fn sync<P: AsRef<Path>>(&self, repo: P) -> Result<Vec<String>> {
        let repo = repo.as_ref();
        debug!("同步仓库: {:?}", repo);

        let mut output = self.run_git(repo, &["pull"])?;
        if self.config.submodules {
            output.extend(self.run_git(repo, &["submodule", "update", "--init", "--recursive"])?);
        }

        Ok(output)
    }

    /// 依次同步所有仓库，单个失败不影响其余仓库
    pub fn sync_all(&self, repos: &[PathBuf]) -> SyncSummary {
        let mut summary = SyncSummary::default();

        for repo in repos {
            match self.sync(repo) {
                Ok(_) => summary.synced.push(repo.clone()),
                Err(e) => {
                    error!("同步仓库失败 {:?}: {}", repo, e);
                    summary.failed.push((repo.clone(), e.to_string()));
                }
            }
        }

        info!(
            "同步完成: 成功 {} 个，失败 {} 个",
            summary.synced.len(),
            summary.failed.len()
        );
        summary
    }

    fn run_git(&self, repo: &Path, args: &[&str]) -> Result<Vec<String>> {
        let git_error = |message: String| ShellToolsError::Git {
            repo: repo.to_path_buf(),
            message,
        };

        let output = Command::new(&self.config.git_program)
            .arg("-C")
            .arg(repo)
            .args(args)
            .output()
            .map_err(|e| git_error(format!("failed to run {:?}: {e}", self.config.git_program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(git_error(format!(
                "`git {}` exited with {}: {}",
                args.join(" "),
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .trim()
            .lines()
            .map(str::to_string)
            .collect())
    }
}

impl Default for RepoSyncer {
    fn default() -> Self {
        Self::new(SyncConfig::default())
    }
}
