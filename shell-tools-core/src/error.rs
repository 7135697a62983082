use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 核心库统一错误类型
#[derive(Debug, Error)]
pub enum ShellToolsError {
    /// 根路径存在但不是目录
    #[error("root path is not a directory: {}", path.display())]
    InvalidRoot { path: PathBuf },

    /// 遍历目录时读取失败（权限、I/O）
    #[error("failed to read directory {}: {source}", path.display())]
    Traversal {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unknown action '{name}'")]
    UnknownAction { name: String },

    /// 删除单个目录失败
    #[error("failed to remove {}: {source}", path.display())]
    Deletion {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid file size '{0}'")]
    InvalidSize(String),

    #[error("line size must be greater than zero")]
    InvalidLineSize,

    #[error("'{}' exists and it's a directory", .0.display())]
    PathIsDirectory(PathBuf),

    #[error("file '{}' already exists", .0.display())]
    FileExists(PathBuf),

    /// git 命令启动失败或返回非零状态
    #[error("git failed in {}: {message}", repo.display())]
    Git { repo: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ShellToolsError>;
