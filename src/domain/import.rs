// ==========================================
// 表格数据导入工具 - 导入领域对象
// ==========================================
// 职责: 分派策略 / 导入阶段 / 导入汇总
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// ==========================================
// DispatchStrategy - 处理策略
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DispatchStrategy {
    /// 单次顺序处理，输出保持行序
    Sequential,
    /// 固定大小分批并行，批次间输出顺序不保证
    Batched,
}

impl DispatchStrategy {
    /// 按数据行数选择策略：`data_rows <= threshold` 顺序，否则分批
    pub fn select(data_rows: usize, threshold: usize) -> Self {
        if data_rows <= threshold {
            DispatchStrategy::Sequential
        } else {
            DispatchStrategy::Batched
        }
    }
}

impl fmt::Display for DispatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchStrategy::Sequential => write!(f, "SEQUENTIAL"),
            DispatchStrategy::Batched => write!(f, "BATCHED"),
        }
    }
}

// ==========================================
// ImportPhase - 导入状态机
// ==========================================
// Idle → ReadingHeader → {Sequential | Batched} → Merged → Done
// 任一步骤失败 → Failed（终态）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportPhase {
    Idle,
    ReadingHeader,
    Sequential,
    Batched,
    Merged,
    Done,
    Failed,
}

impl ImportPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, ImportPhase::Done | ImportPhase::Failed)
    }

    /// 是否为合法迁移
    pub fn can_transition_to(self, next: ImportPhase) -> bool {
        use ImportPhase as P;
        match (self, next) {
            (current, P::Failed) => !current.is_terminal(),
            (P::Idle, P::ReadingHeader) => true,
            (P::ReadingHeader, P::Sequential | P::Batched) => true,
            (P::Sequential | P::Batched, P::Merged) => true,
            (P::Merged, P::Done) => true,
            _ => false,
        }
    }
}

// ==========================================
// ImportSummary - 导入汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub import_id: String,           // 导入 ID（UUID）
    pub sheet_name: String,          // 工作表名
    pub strategy: DispatchStrategy,  // 处理策略
    pub data_rows: usize,            // 数据行数（表头之后全部行）
    pub skipped_blank_rows: usize,   // 跳过的空白行
    pub records: usize,              // 生成记录数
    pub batches: usize,              // 批次数（顺序处理为 1，无数据行为 0）
    pub phases: Vec<ImportPhase>,    // 经历的阶段
    pub elapsed: Duration,           // 耗时
}

// ==========================================
// ImportReport - 导入结果
// ==========================================
#[derive(Debug, Clone)]
pub struct ImportReport<T> {
    pub records: Vec<T>,
    pub summary: ImportSummary,
}

impl<T> ImportReport<T> {
    pub fn into_records(self) -> Vec<T> {
        self.records
    }
}
