// ==========================================
// 表格数据导入工具 - 单元格取值器
// ==========================================
// 职责: 将各类单元格统一规范为字符串
// 规则:
//   文本 → 原样
//   日期格式数值 → YYYY-MM-DD
//   数值 → 整数不带小数点，非整数保留完整小数
//   布尔 → "true"/"false"
//   公式 → 缓存结果按上述规则格式化，无结果则回退为公式文本
//   空 / 错误值 → None
// ==========================================

use crate::importer::cell::CellValue;
use chrono::{Days, NaiveDate};

/// 单元格日期输出格式
pub const CELL_DATE_FORMAT: &str = "%Y-%m-%d";

/// 提取单元格的规范化字符串
pub fn extract_cell_value(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Text(text) => Some(text.clone()),
        CellValue::Numeric(value) => Some(format_numeric(*value)),
        CellValue::Date(date) => Some(date.format(CELL_DATE_FORMAT).to_string()),
        CellValue::Boolean(flag) => Some(flag.to_string()),
        CellValue::Formula { formula, cached } => Some(extract_formula_value(formula, cached.as_deref())),
        CellValue::Error(_) | CellValue::Empty => None,
    }
}

/// 公式单元格：优先缓存结果，缺失或求值失败时回退为公式文本
fn extract_formula_value(formula: &str, cached: Option<&CellValue>) -> String {
    match cached {
        Some(
            result @ (CellValue::Text(_)
            | CellValue::Numeric(_)
            | CellValue::Date(_)
            | CellValue::Boolean(_)),
        ) => extract_cell_value(result).unwrap_or_else(|| formula.to_string()),
        Some(CellValue::Formula { .. } | CellValue::Error(_) | CellValue::Empty) | None => {
            formula.to_string()
        }
    }
}

/// 格式化数值：整数值不带小数点（5.0 → "5"），其余保留完整小数（5.25 → "5.25"）
pub fn format_numeric(value: f64) -> String {
    // 超出 2^53 的整数无法精确转 i64，走通用格式
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}

/// Excel 日期序列号 → 日期（1900 日期系统）
///
/// 读取工作簿时由 calamine 按工作簿的日期系统换算，这里只用于手工构造的序列号。
///
/// 序列号 1 = 1900-01-01。Excel 把 1900 年当作闰年，序列号 60 之后需要向前修正一天。
/// 小数部分（时间）被忽略。
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }

    let days = serial.floor() as u64;
    let epoch = if days < 60 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    epoch.checked_add_days(Days::new(days))
}
