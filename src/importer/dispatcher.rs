// ==========================================
// 表格数据导入工具 - 导入分派器
// ==========================================
// 职责: 表头解析 → 按行数选择顺序/分批并行 → 汇总
// 状态: Idle → ReadingHeader → {Sequential | Batched} → Merged → Done
//       任一步失败 → Failed
// ==========================================
// 分批并行:
//   - 行数据 / Schema / 表头 以 Arc 只读共享
//   - 原子游标分配批次起止行，全部批次立即启动
//   - 结果列表由一把 Mutex 保护，按批次完成先后追加
//   - join_all 等待所有批次结束后才返回
//   - 任一行失败即置中止标记，其余批次在下一行前停止；
//     返回已收集错误中行号最小者，不返回部分结果
// ==========================================

use crate::config::ImportConfig;
use crate::domain::import::{DispatchStrategy, ImportPhase, ImportReport, ImportSummary};
use crate::importer::cell::{is_blank_row, Row, Sheet};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::header_resolver::{resolve_header, HeaderMap};
use crate::importer::row_mapper::map_row;
use crate::importer::schema::Schema;
use futures::future::join_all;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, error, info, warn};

// ==========================================
// PhaseTracker - 阶段轨迹
// ==========================================
struct PhaseTracker<'a> {
    import_id: &'a str,
    phases: Vec<ImportPhase>,
}

impl<'a> PhaseTracker<'a> {
    fn new(import_id: &'a str) -> Self {
        Self {
            import_id,
            phases: vec![ImportPhase::Idle],
        }
    }

    fn current(&self) -> ImportPhase {
        self.phases.last().copied().unwrap_or(ImportPhase::Idle)
    }

    fn advance(&mut self, next: ImportPhase) {
        let current = self.current();
        debug_assert!(
            current.can_transition_to(next),
            "非法阶段迁移: {:?} → {:?}",
            current,
            next
        );
        debug!(import_id = %self.import_id, from = ?current, to = ?next, "导入阶段迁移");
        self.phases.push(next);
    }
}

/// 映射阶段产出
struct Dispatched<T> {
    records: Vec<T>,
    strategy: DispatchStrategy,
    data_rows: usize,
    batches: usize,
    skipped_blank_rows: usize,
}

/// 单段行区间的映射结果
struct RangeOutput<T> {
    records: Vec<T>,
    skipped_blank: usize,
}

/// 映射 [start, end) 区间的行（行索引以表头为 0）
///
/// `abort` 被置位后在下一行前停止；本区间失败时负责置位。
fn map_range<T: Default>(
    rows: &[Row],
    start: usize,
    end: usize,
    schema: &Schema<T>,
    header: &HeaderMap,
    skip_blank_rows: bool,
    abort: Option<&AtomicBool>,
) -> ImportResult<RangeOutput<T>> {
    let mut records = Vec::with_capacity(end.saturating_sub(start));
    let mut skipped_blank = 0;

    for (index, row) in rows.iter().enumerate().take(end).skip(start) {
        if abort.is_some_and(|flag| flag.load(Ordering::Acquire)) {
            break;
        }

        if skip_blank_rows && is_blank_row(row) {
            skipped_blank += 1;
            continue;
        }

        match map_row(row, schema, header) {
            Ok(record) => records.push(record),
            Err(source) => {
                if let Some(flag) = abort {
                    flag.store(true, Ordering::Release);
                }
                // 表格行号从 1 开始，表头为第 1 行
                let row_number = index + 1;
                warn!(row = row_number, error = %source, "行映射失败");
                return Err(ImportError::RowMapping {
                    row: row_number,
                    source,
                });
            }
        }
    }

    Ok(RangeOutput {
        records,
        skipped_blank,
    })
}

// ==========================================
// Dispatcher - 导入分派器
// ==========================================
pub struct Dispatcher<T> {
    schema: Arc<Schema<T>>,
    config: ImportConfig,
}

impl<T> Dispatcher<T>
where
    T: Default + Send + 'static,
{
    pub fn new(schema: Arc<Schema<T>>, config: ImportConfig) -> Self {
        Self { schema, config }
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// 按行数选择策略
    pub fn select_strategy(&self, data_rows: usize) -> DispatchStrategy {
        DispatchStrategy::select(data_rows, self.config.sequential_threshold)
    }

    /// 执行导入
    pub async fn run(&self, sheet: Sheet, import_id: &str) -> ImportResult<ImportReport<T>> {
        let start_time = Instant::now();
        let mut tracker = PhaseTracker::new(import_id);
        let sheet_name = sheet.name.clone();

        match self.run_phases(sheet, &mut tracker).await {
            Ok(Dispatched {
                records,
                strategy,
                data_rows,
                batches,
                skipped_blank_rows,
            }) => {
                tracker.advance(ImportPhase::Merged);
                tracker.advance(ImportPhase::Done);

                let summary = ImportSummary {
                    import_id: import_id.to_string(),
                    sheet_name,
                    strategy,
                    data_rows,
                    skipped_blank_rows,
                    records: records.len(),
                    batches,
                    phases: tracker.phases,
                    elapsed: start_time.elapsed(),
                };

                info!(
                    import_id = %import_id,
                    strategy = %strategy,
                    data_rows,
                    records = summary.records,
                    batches,
                    elapsed_ms = summary.elapsed.as_millis() as u64,
                    "表格导入完成"
                );

                Ok(ImportReport { records, summary })
            }
            Err(e) => {
                tracker.advance(ImportPhase::Failed);
                error!(import_id = %import_id, error = %e, "表格导入失败");
                Err(e)
            }
        }
    }

    async fn run_phases(
        &self,
        sheet: Sheet,
        tracker: &mut PhaseTracker<'_>,
    ) -> ImportResult<Dispatched<T>> {
        if sheet.is_empty() {
            return Err(ImportError::EmptySheet);
        }

        // === 步骤 1: 解析表头 ===
        tracker.advance(ImportPhase::ReadingHeader);
        let header = resolve_header(sheet.header_row());
        for column in self.schema.columns() {
            if !header.contains(column) {
                debug!(column, "表头中不存在该列，字段保持默认值");
            }
        }

        // === 步骤 2: 选择策略 ===
        let data_rows = sheet.data_row_count();
        let strategy = self.select_strategy(data_rows);
        info!(
            sheet = %sheet.name,
            data_rows,
            threshold = self.config.sequential_threshold,
            strategy = %strategy,
            "选择处理策略"
        );

        let rows = sheet.rows;

        // === 步骤 3: 映射 ===
        match strategy {
            DispatchStrategy::Sequential => {
                tracker.advance(ImportPhase::Sequential);
                let output = map_range(
                    &rows,
                    1,
                    rows.len(),
                    &self.schema,
                    &header,
                    self.config.skip_blank_rows,
                    None,
                )?;
                Ok(Dispatched {
                    records: output.records,
                    strategy,
                    data_rows,
                    // 无数据行时不计批次
                    batches: usize::from(data_rows > 0),
                    skipped_blank_rows: output.skipped_blank,
                })
            }
            DispatchStrategy::Batched => {
                tracker.advance(ImportPhase::Batched);
                let (records, batches, skipped_blank_rows) =
                    self.run_batches(Arc::new(rows), Arc::new(header)).await?;
                Ok(Dispatched {
                    records,
                    strategy,
                    data_rows,
                    batches,
                    skipped_blank_rows,
                })
            }
        }
    }

    /// 分批并行处理，返回 (记录, 批次数, 跳过空白行数)
    async fn run_batches(
        &self,
        rows: Arc<Vec<Row>>,
        header: Arc<HeaderMap>,
    ) -> ImportResult<(Vec<T>, usize, usize)> {
        let total_rows = rows.len();
        let data_rows = total_rows.saturating_sub(1);
        let batch_size = self.config.batch_size.max(1);
        let batch_count = data_rows.div_ceil(batch_size);
        let skip_blank_rows = self.config.skip_blank_rows;

        let results: Arc<Mutex<Vec<T>>> = Arc::new(Mutex::new(Vec::with_capacity(data_rows)));
        let cursor = Arc::new(AtomicUsize::new(1));
        let abort = Arc::new(AtomicBool::new(false));

        debug!(batch_count, batch_size, "启动分批任务");

        let mut handles = Vec::with_capacity(batch_count);
        for batch_index in 0..batch_count {
            let start = cursor.fetch_add(batch_size, Ordering::SeqCst);
            let end = (start + batch_size).min(total_rows);

            let rows = Arc::clone(&rows);
            let header = Arc::clone(&header);
            let schema = Arc::clone(&self.schema);
            let results = Arc::clone(&results);
            let abort = Arc::clone(&abort);

            handles.push(tokio::task::spawn_blocking(move || -> ImportResult<usize> {
                let output = map_range(
                    &rows,
                    start,
                    end,
                    &schema,
                    &header,
                    skip_blank_rows,
                    Some(abort.as_ref()),
                )?;

                let mapped = output.records.len();
                results
                    .lock()
                    .map_err(|e| ImportError::BatchInterrupted(format!("结果列表锁获取失败: {}", e)))?
                    .extend(output.records);

                debug!(batch_index, start, end, mapped, "批次完成");
                Ok(output.skipped_blank)
            }));
        }

        // 等待全部批次结束
        let outcomes = join_all(handles).await;

        let mut skipped_blank = 0;
        let mut first_error: Option<ImportError> = None;
        for outcome in outcomes {
            let err = match outcome {
                Ok(Ok(skipped)) => {
                    skipped_blank += skipped;
                    continue;
                }
                Ok(Err(e)) => e,
                Err(join_error) => ImportError::from(join_error),
            };

            let replace = match &first_error {
                None => true,
                Some(current) => {
                    err.row().unwrap_or(usize::MAX) < current.row().unwrap_or(usize::MAX)
                }
            };
            if replace {
                first_error = Some(err);
            }
        }

        if let Some(err) = first_error {
            return Err(err);
        }

        let records = match Arc::try_unwrap(results) {
            Ok(mutex) => mutex
                .into_inner()
                .map_err(|e| ImportError::BatchInterrupted(format!("结果列表锁获取失败: {}", e)))?,
            Err(shared) => std::mem::take(
                &mut *shared
                    .lock()
                    .map_err(|e| ImportError::BatchInterrupted(format!("结果列表锁获取失败: {}", e)))?,
            ),
        };

        Ok((records, batch_count, skipped_blank))
    }
}
