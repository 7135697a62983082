use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{Result, ShellToolsError};

/// 遍历过程中读取目录失败时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TraversalPolicy {
    /// 遇到第一个错误即中止整个扫描
    #[default]
    Abort,
    /// 跳过出错的子树，继续扫描
    Skip,
}

/// 空目录分类器配置
#[derive(Debug, Clone, Default)]
pub struct ClassifyConfig {
    /// 为 true 时，只包含零字节文件的叶子目录也视为空目录
    pub ignore_empty_files: bool,
    pub on_error: TraversalPolicy,
}

/// 一次扫描的完整结果
#[derive(Debug, Clone, Default)]
pub struct ClassifyOutcome {
    /// 按先序遍历顺序排列的空目录
    pub empty_dirs: Vec<PathBuf>,
    /// 在 `TraversalPolicy::Skip` 下被跳过的目录
    pub skipped: Vec<PathBuf>,
}

/// 单个目录的检查结果
enum Visit {
    Empty,
    Occupied,
    Branch(Vec<PathBuf>),
}

/// 空目录分类器
pub struct EmptyDirClassifier {
    config: ClassifyConfig,
}

impl EmptyDirClassifier {
    /// 创建新的分类器
    pub fn new(config: ClassifyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifyConfig {
        &self.config
    }

    /// 查找 `root` 下所有空的叶子目录
    pub fn classify<P: AsRef<Path>>(&self, root: P) -> Result<Vec<PathBuf>> {
        self.classify_with_outcome(root)
            .map(|outcome| outcome.empty_dirs)
    }

    /// 查找空目录，同时返回被跳过的目录
    ///
    /// `root` 不是已存在的目录时返回空结果而不是错误，由调用方负责提示。
    /// 使用显式栈代替递归，结果顺序与递归先序遍历一致。
    pub fn classify_with_outcome<P: AsRef<Path>>(&self, root: P) -> Result<ClassifyOutcome> {
        let root = root.as_ref();
        let mut outcome = ClassifyOutcome::default();

        if !root.is_dir() {
            warn!("根路径不存在或不是目录: {:?}", root);
            return Ok(outcome);
        }

        info!(
            "开始扫描空目录: {:?} (忽略空文件: {})",
            root, self.config.ignore_empty_files
        );

        let mut pending = vec![root.to_path_buf()];
        while let Some(dir) = pending.pop() {
            match self.visit(&dir) {
                Ok(Visit::Empty) => {
                    debug!("发现空目录: {:?}", dir);
                    outcome.empty_dirs.push(dir);
                }
                Ok(Visit::Occupied) => {}
                // 逆序入栈，保证按枚举顺序出栈
                Ok(Visit::Branch(subdirs)) => pending.extend(subdirs.into_iter().rev()),
                Err(err) => match self.config.on_error {
                    TraversalPolicy::Abort => return Err(err),
                    TraversalPolicy::Skip => {
                        warn!("跳过无法读取的目录 {:?}: {}", dir, err);
                        outcome.skipped.push(dir);
                    }
                },
            }
        }

        info!(
            "扫描完成: 找到 {} 个空目录，跳过 {} 个目录",
            outcome.empty_dirs.len(),
            outcome.skipped.len()
        );

        Ok(outcome)
    }

    /// 读取目录的直接子项并按当前策略判断
    fn visit(&self, dir: &Path) -> Result<Visit> {
        let traversal = |path: &Path, source| ShellToolsError::Traversal {
            path: path.to_path_buf(),
            source,
        };

        let mut subdirs = Vec::new();
        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| traversal(dir, e))? {
            let path = entry.map_err(|e| traversal(dir, e))?.path();
            if path.is_dir() {
                subdirs.push(path);
            } else if path.is_file() {
                files.push(path);
            }
        }

        if !subdirs.is_empty() {
            return Ok(Visit::Branch(subdirs));
        }

        if files.is_empty() {
            return Ok(Visit::Empty);
        }

        if !self.config.ignore_empty_files {
            return Ok(Visit::Occupied);
        }

        for file in &files {
            let len = fs::metadata(file).map_err(|e| traversal(file.as_path(), e))?.len();
            if len > 0 {
                return Ok(Visit::Occupied);
            }
        }

        Ok(Visit::Empty)
    }
}

impl Default for EmptyDirClassifier {
    fn default() -> Self {
        Self::new(ClassifyConfig::default())
    }
}

/// 使用默认错误策略查找空目录
pub fn find_empty_dirs<P: AsRef<Path>>(root: P, ignore_empty_files: bool) -> Result<Vec<PathBuf>> {
    EmptyDirClassifier::new(ClassifyConfig {
        ignore_empty_files,
        ..Default::default()
    })
    .classify(root)
}
