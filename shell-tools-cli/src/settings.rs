use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 命令行默认值配置（TOML）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub ignore_empty_files: bool,
    pub action: String,
    pub file_size: String,
    pub line_size: usize,
    pub submodules: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ignore_empty_files: false,
            action: shell_tools_core::action::PRINT.to_string(),
            file_size: "10mb".to_string(),
            line_size: 64,
            submodules: false,
        }
    }
}

impl Settings {
    /// 获取默认配置文件路径
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("shell-tools").join("config.toml"))
    }

    /// 加载配置
    ///
    /// 显式指定的文件必须存在；未指定时读取默认路径，文件不存在则使用默认值。
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => Self::load_from_file(&path),
            _ => {
                tracing::debug!("使用默认配置");
                Ok(Self::default())
            }
        }
    }

    /// 从文件加载设置
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let settings = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        tracing::info!("已加载配置文件: {:?}", path);
        Ok(settings)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
