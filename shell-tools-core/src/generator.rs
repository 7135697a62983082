use rand::Rng;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Result, ShellToolsError};

const KB: u64 = 1024;
const MB: u64 = 1024 * KB;
const GB: u64 = 1024 * MB;
/// 允许生成的最大文件大小
pub const MAX_SIZE: u64 = 1024 * GB;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// 随机文件生成配置
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// 目标大小（字节，不含换行符）
    pub size: u64,
    /// 每行字符数
    pub line_size: usize,
    /// 目标文件已存在时是否覆盖
    pub overwrite: bool,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            size: 10 * MB,
            line_size: 64,
            overwrite: false,
        }
    }
}

/// 解析大小字符串（如 "10mb", "1.5KB", "2048"）
///
/// 单位不区分大小写，按 1024 进制换算，没有单位时按字节计算。
/// 结果为 0 或超过 [`MAX_SIZE`] 的大小同样视为无效。
pub fn parse_size(text: &str) -> Result<u64> {
    let invalid = || ShellToolsError::InvalidSize(text.to_string());
    let lower = text.trim().to_ascii_lowercase();

    let (number, multiplier) = if let Some(n) = lower.strip_suffix("gb") {
        (n, GB)
    } else if let Some(n) = lower.strip_suffix("mb") {
        (n, MB)
    } else if let Some(n) = lower.strip_suffix("kb") {
        (n, KB)
    } else {
        (lower.as_str(), 1)
    };

    let well_formed = number.starts_with(|c: char| c.is_ascii_digit())
        && number.chars().all(|c| c.is_ascii_digit() || c == '.')
        && number.matches('.').count() <= 1;
    if !well_formed {
        return Err(invalid());
    }

    let value: f64 = number.parse().map_err(|_| invalid())?;
    let scaled = value * multiplier as f64;
    if !scaled.is_finite() || scaled > MAX_SIZE as f64 {
        return Err(invalid());
    }

    let bytes = scaled as u64;
    if bytes == 0 {
        return Err(invalid());
    }

    Ok(bytes)
}

/// 生成由 `[A-Z0-9]` 组成的随机字符串
pub fn random_line(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

/// 向 `writer` 写入 `size` 个随机字符，每 `line_size` 个字符一行
///
/// 不足一整行的剩余部分单独成行。返回实际写入的字节数（含换行符）。
pub fn write_random_data<W: Write>(writer: &mut W, size: u64, line_size: usize) -> Result<u64> {
    if line_size == 0 {
        return Err(ShellToolsError::InvalidLineSize);
    }

    let full_rows = size / line_size as u64;
    let remains = (size % line_size as u64) as usize;
    let mut written = 0u64;

    for _ in 0..full_rows {
        writeln!(writer, "{}", random_line(line_size))?;
        written += line_size as u64 + 1;
    }

    if remains > 0 {
        writeln!(writer, "{}", random_line(remains))?;
        written += remains as u64 + 1;
    }

    Ok(written)
}

/// 随机内容文件生成器
pub struct FileGenerator {
    config: GenerateConfig,
}

impl FileGenerator {
    pub fn new(config: GenerateConfig) -> Self {
        Self { config }
    }

    /// 在 `path` 生成文件，返回写入的字节数
    pub fn generate<P: AsRef<Path>>(&self, path: P) -> Result<u64> {
        let path = path.as_ref();

        // 行长无效时不触碰目标文件
        if self.config.line_size == 0 {
            return Err(ShellToolsError::InvalidLineSize);
        }

        if path.is_dir() {
            return Err(ShellToolsError::PathIsDirectory(path.to_path_buf()));
        }

        if path.is_file() && !self.config.overwrite {
            return Err(ShellToolsError::FileExists(path.to_path_buf()));
        }

        info!(
            "开始生成文件: {:?} (大小 {} 字节，行长 {})",
            path, self.config.size, self.config.line_size
        );

        let mut writer = BufWriter::new(File::create(path)?);
        let written = write_random_data(&mut writer, self.config.size, self.config.line_size)?;
        writer.flush()?;

        debug!("文件生成完成: {:?}, 写入 {} 字节", path, written);
        Ok(written)
    }
}

impl Default for FileGenerator {
    fn default() -> Self {
        Self::new(GenerateConfig::default())
    }
}
