// ==========================================
// 表格数据导入工具 - 表头解析器
// ==========================================
// 职责: 首行 → 列名(已 TRIM) → 列索引(0 起)
// 规则: 重名列后者覆盖前者；无表头 → 空映射
// ==========================================

use crate::importer::cell::CellValue;
use crate::importer::cell_extractor::extract_cell_value;
use std::collections::HashMap;

/// 列名 → 列索引，单次导入内只读
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    columns: HashMap<String, usize>,
}

impl HeaderMap {
    pub fn get(&self, column: &str) -> Option<usize> {
        self.columns.get(column).copied()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FromIterator<(String, usize)> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = (String, usize)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

/// 解析表头行
///
/// 空单元格与错误值被忽略；其他种类按单元格取值规则转为文本后 TRIM。
pub fn resolve_header(header_row: Option<&[CellValue]>) -> HeaderMap {
    let mut columns = HashMap::new();

    if let Some(row) = header_row {
        for (index, cell) in row.iter().enumerate() {
            if let Some(label) = extract_cell_value(cell) {
                // insert 覆盖语义：重名列取最右侧
                columns.insert(label.trim().to_string(), index);
            }
        }
    }

    HeaderMap { columns }
}
