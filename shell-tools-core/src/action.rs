//! 空目录处理动作及其注册表
//!
//! 动作在启动时通过 [`ActionRegistry::register`] 显式注册，之后按名称查找。
//! 进程级共享的注册表由 [`global`] 在首次访问时初始化，并预先注册
//! `print` 和 `remove` 两个内置动作。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};
use tracing::{debug, error, info};

use crate::error::{Result, ShellToolsError};

pub const PRINT: &str = "print";
pub const REMOVE: &str = "remove";

/// 作用于一组目录路径的动作
pub trait Action: Send + Sync {
    fn apply(&self, paths: &[PathBuf]) -> Result<ActionReport>;
}

impl<F> Action for F
where
    F: Fn(&[PathBuf]) -> Result<ActionReport> + Send + Sync,
{
    fn apply(&self, paths: &[PathBuf]) -> Result<ActionReport> {
        self(paths)
    }
}

/// 单个路径的处理失败记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// 动作执行结果统计
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionReport {
    pub processed: usize,
    pub failed: Vec<ActionFailure>,
}

impl ActionReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_success(&mut self) {
        self.processed += 1;
    }

    pub fn add_failure(&mut self, path: &Path, reason: impl Into<String>) {
        self.failed.push(ActionFailure {
            path: path.to_path_buf(),
            reason: reason.into(),
        });
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// 逐行输出路径
pub struct PrintAction<W = io::Stdout> {
    out: Mutex<W>,
}

impl PrintAction {
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl<W: Write + Send> PrintAction<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> Action for PrintAction<W> {
    fn apply(&self, paths: &[PathBuf]) -> Result<ActionReport> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let mut report = ActionReport::new();

        for path in paths {
            writeln!(out, "{}", path.display())?;
            report.add_success();
        }
        out.flush()?;

        Ok(report)
    }
}

/// 逐个删除空目录
///
/// 每个路径先输出一行提示再删除。只删除空目录：扫描之后目录被写入内容
/// 或已被删除时，该路径记为失败，其余路径继续处理。
pub struct RemoveAction<W = io::Stdout> {
    out: Mutex<W>,
}

impl RemoveAction {
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl<W: Write + Send> RemoveAction<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> Action for RemoveAction<W> {
    fn apply(&self, paths: &[PathBuf]) -> Result<ActionReport> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let mut report = ActionReport::new();

        info!("开始删除 {} 个空目录", paths.len());

        for path in paths {
            writeln!(out, "removing '{}'", path.display())?;
            out.flush()?;

            match fs::remove_dir(path) {
                Ok(()) => {
                    debug!("已删除: {:?}", path);
                    report.add_success();
                }
                Err(source) => {
                    let err = ShellToolsError::Deletion {
                        path: path.clone(),
                        source,
                    };
                    error!("{}", err);
                    report.add_failure(path, err.to_string());
                }
            }
        }

        info!(
            "删除完成: 成功 {} 个，失败 {} 个",
            report.processed,
            report.failed.len()
        );

        Ok(report)
    }
}

/// 动作名称到实现的映射
#[derive(Default)]
pub struct ActionRegistry {
    actions: HashMap<String, Arc<dyn Action>>,
}

impl ActionRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建已注册内置动作的注册表
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_defaults();
        registry
    }

    /// 注册内置的 `print` 和 `remove`
    pub fn register_defaults(&mut self) {
        self.register(PRINT, PrintAction::stdout());
        self.register(REMOVE, RemoveAction::stdout());
    }

    /// 按名称注册动作，同名动作会被覆盖
    pub fn register<A>(&mut self, name: impl Into<String>, action: A) -> Arc<dyn Action>
    where
        A: Action + 'static,
    {
        self.register_shared(name, Arc::new(action))
    }

    pub fn register_shared(
        &mut self,
        name: impl Into<String>,
        action: Arc<dyn Action>,
    ) -> Arc<dyn Action> {
        let name = name.into();
        if self.actions.insert(name.clone(), Arc::clone(&action)).is_some() {
            debug!("覆盖已注册的动作: {}", name);
        }
        action
    }

    /// 查找动作，未注册时返回 `UnknownAction`
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Action>> {
        self.actions
            .get(name)
            .cloned()
            .ok_or_else(|| ShellToolsError::UnknownAction {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// 已注册的动作名称（排序后）
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.actions.keys().cloned().collect();
        names.sort();
        names
    }
}

static GLOBAL_REGISTRY: OnceLock<RwLock<ActionRegistry>> = OnceLock::new();

/// 进程级注册表，首次访问时初始化并注册内置动作
pub fn global() -> &'static RwLock<ActionRegistry> {
    GLOBAL_REGISTRY.get_or_init(|| RwLock::new(ActionRegistry::with_defaults()))
}

/// 在进程级注册表中注册动作
pub fn register_global<A>(name: impl Into<String>, action: A) -> Arc<dyn Action>
where
    A: Action + 'static,
{
    global()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register(name, action)
}

/// 从进程级注册表查找动作
pub fn resolve_global(name: &str) -> Result<Arc<dyn Action>> {
    global()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .resolve(name)
}
