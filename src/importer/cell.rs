// ==========================================
// 表格数据导入工具 - 单元格模型
// ==========================================
// 职责: 与底层表格库解耦的单元格值（封闭枚举）
// ==========================================

use crate::importer::cell_extractor::excel_serial_to_date;
use chrono::NaiveDate;

/// 单元格值
///
/// 新增种类时 `cell_extractor::extract_cell_value` 的 match 必须同步处理。
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// 文本
    Text(String),
    /// 数值
    Numeric(f64),
    /// 日期格式单元格，已按工作簿的日期系统（1900 / 1904）换算
    Date(NaiveDate),
    /// 布尔
    Boolean(bool),
    /// 公式：公式文本 + 缓存的计算结果（可能缺失）
    Formula {
        formula: String,
        cached: Option<Box<CellValue>>,
    },
    /// 错误值（#DIV/0!、#N/A 等）
    Error(String),
    /// 空单元格
    Empty,
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn number(value: f64) -> Self {
        CellValue::Numeric(value)
    }

    /// 1900 日期系统序列号 → 日期单元格；超出范围时退化为数值
    pub fn date_serial(serial: f64) -> Self {
        excel_serial_to_date(serial)
            .map(CellValue::Date)
            .unwrap_or(CellValue::Numeric(serial))
    }

    pub fn formula(formula: impl Into<String>, cached: Option<CellValue>) -> Self {
        CellValue::Formula {
            formula: formula.into(),
            cached: cached.map(Box::new),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

/// 一行单元格，按列索引访问
pub type Row = Vec<CellValue>;

/// 整行是否全为空单元格
pub fn is_blank_row(row: &[CellValue]) -> bool {
    row.iter().all(CellValue::is_empty)
}

// ==========================================
// Sheet - 已完全读入内存的工作表
// ==========================================
// 分批并行前必须完全物化，各批次只读共享
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub name: String,
    /// 第 0 行为表头
    pub rows: Vec<Row>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// 由纯文本二维数组构造（空串视为空单元格），测试与 CSV 场景常用
    pub fn from_text_rows<S: AsRef<str>>(name: impl Into<String>, rows: &[Vec<S>]) -> Self {
        let rows = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|v| {
                        let v = v.as_ref();
                        if v.is_empty() {
                            CellValue::Empty
                        } else {
                            CellValue::text(v)
                        }
                    })
                    .collect()
            })
            .collect();
        Self::new(name, rows)
    }

    pub fn header_row(&self) -> Option<&[CellValue]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// 数据行数（表头之后的全部行，含空白行）
    pub fn data_row_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
