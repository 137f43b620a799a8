// ==========================================
// 表格数据导入工具 - 表格导入器实现
// ==========================================
// 职责: 整合导入流程，从文件到记录列表
// 流程: 参数校验 → 解析 → 表头 → 分派(顺序/分批) → 汇总
// ==========================================

use crate::config::ImportConfig;
use crate::domain::import::ImportReport;
use crate::importer::cell::Sheet;
use crate::importer::dispatcher::Dispatcher;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::schema::{ImportRecord, Schema};
use crate::importer::sheet_importer_trait::{RecordImporter, SheetParser};
use async_trait::async_trait;
use futures::future::join_all;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

// ==========================================
// SheetImporterImpl - 表格导入器实现
// ==========================================
pub struct SheetImporterImpl<T> {
    // 文件解析器
    file_parser: Box<dyn SheetParser>,

    // 分派器（持有 Schema 与配置）
    dispatcher: Dispatcher<T>,
}

impl<T> SheetImporterImpl<T>
where
    T: Default + Send + 'static,
{
    /// 创建新的导入器实例
    ///
    /// # 参数
    /// - file_parser: 文件解析器
    /// - schema: 列映射（不能为空）
    /// - config: 导入配置
    pub fn new(
        file_parser: Box<dyn SheetParser>,
        schema: Schema<T>,
        config: ImportConfig,
    ) -> ImportResult<Self> {
        if schema.is_empty() {
            return Err(ImportError::InvalidArgument(
                "Schema 未声明任何字段".to_string(),
            ));
        }
        config.validate()?;

        Ok(Self {
            file_parser,
            dispatcher: Dispatcher::new(Arc::new(schema), config),
        })
    }

    /// 通用解析器 + 默认配置
    pub fn with_schema(schema: Schema<T>) -> ImportResult<Self> {
        Self::new(Box::new(UniversalFileParser), schema, ImportConfig::default())
    }

    pub fn config(&self) -> &ImportConfig {
        self.dispatcher.config()
    }
}

impl<T: ImportRecord> SheetImporterImpl<T> {
    /// 使用记录类型自带的 Schema（构建时解析一次）
    pub fn for_record(config: ImportConfig) -> ImportResult<Self> {
        Self::new(Box::new(UniversalFileParser), T::schema(), config)
    }
}

#[async_trait]
impl<T> RecordImporter<T> for SheetImporterImpl<T>
where
    T: Default + Send + 'static,
{
    #[instrument(skip(self, sheet), fields(import_id = tracing::field::Empty))]
    async fn import_sheet(&self, sheet: Sheet) -> ImportResult<ImportReport<T>> {
        let import_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("import_id", import_id.as_str());

        info!(
            import_id = %import_id,
            sheet = %sheet.name,
            rows = sheet.rows.len(),
            "开始导入表格数据"
        );

        self.dispatcher.run(sheet, &import_id).await
    }

    async fn import_bytes(&self, bytes: &[u8], file_name: &str) -> ImportResult<ImportReport<T>> {
        if bytes.is_empty() {
            return Err(ImportError::InvalidArgument("输入内容不能为空".to_string()));
        }
        if file_name.trim().is_empty() {
            return Err(ImportError::InvalidArgument("文件名不能为空".to_string()));
        }

        debug!(file_name, size = bytes.len(), "解析文件");
        let sheet = self.file_parser.parse_bytes(bytes, file_name).map_err(|e| {
            error!(file_name, error = %e, "文件解析失败");
            e
        })?;

        self.import_sheet(sheet).await
    }

    async fn import_file<P: AsRef<Path> + Send>(&self, file_path: P) -> ImportResult<ImportReport<T>> {
        let path = file_path.as_ref();
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        self.import_bytes(&bytes, &file_name).await
    }

    async fn batch_import<P: AsRef<Path> + Send + Sync>(
        &self,
        file_paths: Vec<P>,
    ) -> Vec<ImportResult<ImportReport<T>>> {
        info!(count = file_paths.len(), "开始批量导入文件");

        // 为每个文件创建导入任务
        let import_tasks = file_paths.into_iter().map(|path| {
            let path_str = path.as_ref().display().to_string();
            async move {
                let result = self.import_file(path).await;
                match &result {
                    Ok(report) => info!(
                        file = %path_str,
                        records = report.summary.records,
                        "文件导入成功"
                    ),
                    Err(e) => error!(file = %path_str, error = %e, "文件导入失败"),
                }
                result
            }
        });

        // 并发执行所有导入任务
        let results = join_all(import_tasks).await;

        info!(
            total = results.len(),
            success = results.iter().filter(|r| r.is_ok()).count(),
            failed = results.iter().filter(|r| r.is_err()).count(),
            "批量导入完成"
        );

        results
    }
}

/// 一次性导入：字节流 + 文件名 + Schema → 记录列表
///
/// 任一行失败则整体失败，不返回部分结果。
pub async fn import_all<T>(bytes: &[u8], file_name: &str, schema: Schema<T>) -> ImportResult<Vec<T>>
where
    T: Default + Send + 'static,
{
    let importer = SheetImporterImpl::with_schema(schema)?;
    let report = importer.import_bytes(bytes, file_name).await?;
    Ok(report.into_records())
}
