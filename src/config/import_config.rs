// ==========================================
// 表格数据导入工具 - 导入配置
// ==========================================
// 职责: 分派阈值 / 批次大小 / 空白行策略
// 来源: 默认值 → JSON 配置文件 → 环境变量覆写
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 数据行数不超过该值时顺序处理
pub const DEFAULT_SEQUENTIAL_THRESHOLD: usize = 10_000;

/// 分批并行时每批行数
pub const DEFAULT_BATCH_SIZE: usize = 1_000;

// ==========================================
// 配置键（环境变量名）
// ==========================================
pub mod config_keys {
    pub const SEQUENTIAL_THRESHOLD: &str = "SHEET_IMPORT_SEQUENTIAL_THRESHOLD";
    pub const BATCH_SIZE: &str = "SHEET_IMPORT_BATCH_SIZE";
    pub const SKIP_BLANK_ROWS: &str = "SHEET_IMPORT_SKIP_BLANK_ROWS";
    /// 日志格式（text / json），由 `logging::init` 读取
    pub const LOG_FORMAT: &str = "SHEET_IMPORT_LOG_FORMAT";
}

// ==========================================
// ImportConfig - 导入配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// 顺序处理的最大数据行数（含）
    pub sequential_threshold: usize,
    /// 每批行数
    pub batch_size: usize,
    /// 跳过整行为空的数据行
    pub skip_blank_rows: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            sequential_threshold: DEFAULT_SEQUENTIAL_THRESHOLD,
            batch_size: DEFAULT_BATCH_SIZE,
            skip_blank_rows: true,
        }
    }
}

impl ImportConfig {
    /// 从 JSON 文件加载（缺省字段取默认值）
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ImportError::ConfigReadError {
            key: path.display().to_string(),
            message: e.to_string(),
        })?;

        let config: ImportConfig =
            serde_json::from_str(&raw).map_err(|e| ImportError::ConfigReadError {
                key: path.display().to_string(),
                message: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// 默认值 + 环境变量覆写
    pub fn from_env() -> ImportResult<Self> {
        Self::default().with_env_overrides()
    }

    /// 使用进程环境变量覆写
    pub fn with_env_overrides(self) -> ImportResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// 使用任意查找函数覆写（键见 `config_keys`）
    pub fn with_overrides<F>(mut self, lookup: F) -> ImportResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(config_keys::SEQUENTIAL_THRESHOLD) {
            self.sequential_threshold = parse_usize(config_keys::SEQUENTIAL_THRESHOLD, &value)?;
        }
        if let Some(value) = lookup(config_keys::BATCH_SIZE) {
            self.batch_size = parse_usize(config_keys::BATCH_SIZE, &value)?;
        }
        if let Some(value) = lookup(config_keys::SKIP_BLANK_ROWS) {
            self.skip_blank_rows = parse_bool(config_keys::SKIP_BLANK_ROWS, &value)?;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> ImportResult<()> {
        if self.batch_size == 0 {
            return Err(ImportError::ConfigValueError {
                key: "batch_size".to_string(),
                value: "0".to_string(),
                message: "批次大小必须大于 0".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_usize(key: &str, value: &str) -> ImportResult<usize> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|e| ImportError::ConfigValueError {
            key: key.to_string(),
            value: value.to_string(),
            message: e.to_string(),
        })
}

fn parse_bool(key: &str, value: &str) -> ImportResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ImportError::ConfigValueError {
            key: key.to_string(),
            value: value.to_string(),
            message: "期望 true/false".to_string(),
        }),
    }
}
