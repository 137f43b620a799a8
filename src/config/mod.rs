// ==========================================
// 表格数据导入工具 - 配置层
// ==========================================
// 职责: 导入配置加载与校验
// ==========================================

pub mod import_config;

pub use import_config::{config_keys, ImportConfig, DEFAULT_BATCH_SIZE, DEFAULT_SEQUENTIAL_THRESHOLD};
