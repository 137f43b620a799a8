// ==========================================
// 表格数据导入工具 - 领域模型层
// ==========================================
// 职责: 导入过程的领域对象（策略、阶段、汇总）
// 红线: 不含解析逻辑，不含映射逻辑
// ==========================================

pub mod import;

// 重导出核心类型
pub use import::{DispatchStrategy, ImportPhase, ImportReport, ImportSummary};
