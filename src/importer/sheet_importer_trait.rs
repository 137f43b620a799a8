// ==========================================
// 表格数据导入工具 - 导入 Trait
// ==========================================
// 职责: 定义导入接口（不包含实现）
// ==========================================

use crate::domain::import::ImportReport;
use crate::importer::cell::Sheet;
use crate::importer::error::{ImportError, ImportResult};
use async_trait::async_trait;
use std::path::Path;

// ==========================================
// RecordImporter Trait
// ==========================================
// 用途: 表格 → 记录列表 的主接口
// 实现者: SheetImporterImpl
#[async_trait]
pub trait RecordImporter<T: Send + 'static>: Send + Sync {
    /// 导入已读入内存的工作表
    ///
    /// # 返回
    /// - Ok(ImportReport): 全部记录 + 汇总（策略、批次数、阶段轨迹）
    /// - Err: 空表 / 任一行映射失败 / 批次中断，不返回部分结果
    ///
    /// # 顺序
    /// - 顺序处理保持行序
    /// - 分批并行时批次间顺序不保证
    async fn import_sheet(&self, sheet: Sheet) -> ImportResult<ImportReport<T>>;

    /// 从字节流导入
    ///
    /// # 参数
    /// - bytes: 文件内容（不能为空）
    /// - file_name: 文件名，仅用于选择解码器
    async fn import_bytes(&self, bytes: &[u8], file_name: &str) -> ImportResult<ImportReport<T>>;

    /// 从文件导入
    async fn import_file<P: AsRef<Path> + Send>(&self, file_path: P) -> ImportResult<ImportReport<T>>;

    /// 批量导入多个文件（并发执行）
    ///
    /// # 说明
    /// - 每个文件的导入是独立的，互不影响
    /// - 返回值与输入顺序一一对应
    async fn batch_import<P: AsRef<Path> + Send + Sync>(
        &self,
        file_paths: Vec<P>,
    ) -> Vec<ImportResult<ImportReport<T>>>;
}

// ==========================================
// SheetParser Trait
// ==========================================
// 用途: 外部表格库适配（只读取第一个工作表）
// 实现者: ExcelParser, CsvParser, UniversalFileParser
pub trait SheetParser: Send + Sync {
    /// 解析字节流为内存工作表
    fn parse_bytes(&self, bytes: &[u8], file_name: &str) -> ImportResult<Sheet>;

    /// 解析文件
    fn parse_file(&self, file_path: &Path) -> ImportResult<Sheet> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        let bytes = std::fs::read(file_path)?;
        let file_name = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        self.parse_bytes(&bytes, file_name)
    }
}
