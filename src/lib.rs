// ==========================================
// 表格数据导入工具 - 核心库
// ==========================================
// 职责: 表格（Excel / CSV）按列映射导入为强类型记录
// 流程: 解析 → 表头 → 逐行映射(取值/必填/转换) → 顺序或分批并行 → 汇总
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 导入策略与汇总
pub mod domain;

// 导入层 - 表格解析与行映射
pub mod importer;

// 配置层 - 导入配置
pub mod config;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

pub use config::ImportConfig;

pub use domain::{DispatchStrategy, ImportPhase, ImportReport, ImportSummary};

pub use importer::{
    import_all, CellValue, ConversionError, Converter, ImportError, ImportRecord, ImportResult,
    RecordImporter, RowMappingError, Schema, Sheet, SheetImporterImpl,
};

// ==========================================
// 常量定义
// ==========================================

// 版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 名称
pub const APP_NAME: &str = "表格数据导入工具";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
