// ==========================================
// 表格数据导入工具 - 行映射器
// ==========================================
// 职责: 一行单元格 + 表头 + Schema → 一条记录
// 流程(逐字段): 查列索引 → 取值 → 必填校验 → 转换 → 赋值
// ==========================================

use crate::importer::cell::CellValue;
use crate::importer::cell_extractor::extract_cell_value;
use crate::importer::error::RowMappingError;
use crate::importer::header_resolver::HeaderMap;
use crate::importer::schema::Schema;

/// 将一行映射为记录
///
/// # 规则
/// - 列不在表头中 → 跳过，字段保持 Default 值
/// - 行比表头短 → 缺失单元格按空处理
/// - 必填列为空或仅空白 → RequiredField
/// - 转换失败 → Conversion
pub fn map_row<T: Default>(
    row: &[CellValue],
    schema: &Schema<T>,
    header: &HeaderMap,
) -> Result<T, RowMappingError> {
    let mut record = T::default();

    for mapping in schema.fields() {
        let Some(column_index) = header.get(mapping.column()) else {
            continue;
        };

        let value = row.get(column_index).and_then(extract_cell_value);

        if mapping.is_required() && value.as_deref().map_or(true, |v| v.trim().is_empty()) {
            return Err(RowMappingError::RequiredField {
                column: mapping.column().to_string(),
            });
        }

        mapping
            .apply(&mut record, value.as_deref())
            .map_err(|source| RowMappingError::Conversion {
                field: mapping.field(),
                column: mapping.column().to_string(),
                source,
            })?;
    }

    Ok(record)
}
