// ==========================================
// 表格数据导入工具 - 文件解析器实现
// ==========================================
// 职责: 字节流 → 内存工作表 (Sheet)
// 支持: Excel (.xlsx/.xlsm/.xlsb/.xls/.ods) / CSV (.csv)
// 说明: 只读取第一个工作表，并在分批处理前完全物化
// ==========================================

use crate::importer::cell::{CellValue, Row, Sheet};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::sheet_importer_trait::SheetParser;
use calamine::{Data, Ods, Range, Reader, Xls, Xlsb, Xlsx};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::fmt::Display;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

/// 文件扩展名（小写）
pub fn file_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn file_stem(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_string()
}

// ==========================================
// CSV Parser 实现
// ==========================================
// 所有非空字段均为文本单元格
pub struct CsvParser;

impl SheetParser for CsvParser {
    fn parse_bytes(&self, bytes: &[u8], file_name: &str) -> ImportResult<Sheet> {
        let ext = file_extension(file_name);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .from_reader(bytes);

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let row: Row = record
                .iter()
                .map(|value| {
                    if value.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::text(value)
                    }
                })
                .collect();
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(ImportError::EmptySheet);
        }

        debug!(rows = rows.len(), "CSV 解析完成");
        Ok(Sheet::new(file_stem(file_name), rows))
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
// 按文件名选择解码器: xlsx/xlsm → Xlsx, xlsb → Xlsb, ods → Ods, 其他 → Xls
pub struct ExcelParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkbookKind {
    Xlsx,
    Xlsb,
    Xls,
    Ods,
}

impl WorkbookKind {
    pub fn from_file_name(file_name: &str) -> Self {
        match file_extension(file_name).as_str() {
            "xlsx" | "xlsm" => WorkbookKind::Xlsx,
            "xlsb" => WorkbookKind::Xlsb,
            "ods" => WorkbookKind::Ods,
            _ => WorkbookKind::Xls,
        }
    }
}

impl SheetParser for ExcelParser {
    fn parse_bytes(&self, bytes: &[u8], file_name: &str) -> ImportResult<Sheet> {
        let kind = WorkbookKind::from_file_name(file_name);
        debug!(?kind, file_name, "选择 Excel 解码器");

        match kind {
            WorkbookKind::Xlsx => read_first_sheet::<Xlsx<_>>(bytes),
            WorkbookKind::Xlsb => read_first_sheet::<Xlsb<_>>(bytes),
            WorkbookKind::Xls => read_first_sheet::<Xls<_>>(bytes),
            WorkbookKind::Ods => read_first_sheet::<Ods<_>>(bytes),
        }
    }
}

fn excel_error(err: impl Display) -> ImportError {
    ImportError::ExcelParseError(err.to_string())
}

/// 读取第一个工作表：值区域 + 公式区域
fn read_first_sheet<'a, R>(bytes: &'a [u8]) -> ImportResult<Sheet>
where
    R: Reader<Cursor<&'a [u8]>>,
    R::Error: Display,
{
    let mut workbook = R::new(Cursor::new(bytes)).map_err(excel_error)?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ImportError::EmptySheet)?;

    let range = workbook.worksheet_range(&sheet_name).map_err(excel_error)?;
    if range.is_empty() {
        return Err(ImportError::EmptySheet);
    }

    // 公式层读取失败不影响取值，仅丢失公式回退文本
    let formulas = match workbook.worksheet_formula(&sheet_name) {
        Ok(formulas) => Some(formulas),
        Err(e) => {
            warn!(sheet = %sheet_name, error = %e, "公式读取失败，按纯值处理");
            None
        }
    };

    let rows = range_to_rows(&range, formulas.as_ref());
    debug!(sheet = %sheet_name, rows = rows.len(), "Excel 解析完成");
    Ok(Sheet::new(sheet_name, rows))
}

/// 值区域 + 公式区域 → 行列表
///
/// calamine 区域从首个非空单元格开始；补齐前导空行与空列，
/// 使第 0 行即工作表第 1 行（首行为空时表头为空），列索引为绝对列号。
fn range_to_rows(range: &Range<Data>, formulas: Option<&Range<String>>) -> Vec<Row> {
    let (start_row, start_col) = range.start().unwrap_or((0, 0));

    let mut rows: Vec<Row> = Vec::with_capacity(start_row as usize + range.height());
    rows.resize_with(start_row as usize, Vec::new);

    for (r, row) in range.rows().enumerate() {
        let mut cells: Row = Vec::with_capacity(start_col as usize + row.len());
        cells.resize(start_col as usize, CellValue::Empty);
        for (c, data) in row.iter().enumerate() {
            let position = (start_row + r as u32, start_col + c as u32);
            let formula = formulas
                .and_then(|f| f.get_value(position))
                .map(String::as_str);
            cells.push(cell_from_data(data, formula));
        }
        rows.push(cells);
    }

    rows
}

/// calamine 单元格 → CellValue
pub fn cell_from_data(data: &Data, formula: Option<&str>) -> CellValue {
    let value = value_from_data(data);

    match formula.filter(|f| !f.is_empty()) {
        None => value,
        Some(formula) => {
            // 未计算的公式缓存值为空或空串
            let cached = match value {
                CellValue::Empty => None,
                CellValue::Text(ref text) if text.is_empty() => None,
                other => Some(other),
            };
            CellValue::formula(formula, cached)
        }
    }
}

fn value_from_data(data: &Data) -> CellValue {
    match data {
        Data::String(text) => CellValue::Text(text.clone()),
        Data::Float(value) => CellValue::number(*value),
        Data::Int(value) => CellValue::number(*value as f64),
        Data::Bool(flag) => CellValue::Boolean(*flag),
        // as_datetime 按工作簿自身的日期系统（1900 / 1904）换算
        Data::DateTime(dt) if dt.is_datetime() => match dt.as_datetime() {
            Some(datetime) => CellValue::Date(datetime.date()),
            None => CellValue::number(dt.as_f64()),
        },
        Data::DateTime(dt) => CellValue::number(dt.as_f64()),
        Data::DateTimeIso(text) => parse_iso_date(text)
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Text(text.clone())),
        Data::DurationIso(text) => CellValue::Text(text.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
        Data::Empty => CellValue::Empty,
    }
}

/// ODS 日期单元格为 ISO 文本（"2023-03-15" 或 "2023-03-15T10:00:00"）
fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.get(..10)?, "%Y-%m-%d").ok()
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl SheetParser for UniversalFileParser {
    fn parse_bytes(&self, bytes: &[u8], file_name: &str) -> ImportResult<Sheet> {
        let ext = file_extension(file_name);

        match ext.as_str() {
            "csv" => CsvParser.parse_bytes(bytes, file_name),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => ExcelParser.parse_bytes(bytes, file_name),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};
    use std::io::Write;

    #[test]
    fn test_csv_parser_valid_bytes() {
        let bytes = "Name,Age\nAlice,30\nBob,25\n".as_bytes();

        let sheet = CsvParser.parse_bytes(bytes, "people.csv").unwrap();

        assert_eq!(sheet.name, "people");
        assert_eq!(sheet.rows.len(), 3);
        assert_eq!(sheet.rows[0][0], CellValue::text("Name"));
        assert_eq!(sheet.rows[1][1], CellValue::text("30"));
    }

    #[test]
    fn test_csv_parser_ragged_rows_and_empty_fields() {
        let bytes = "A,B,C\n1,,3\n4\n".as_bytes();

        let sheet = CsvParser.parse_bytes(bytes, "ragged.csv").unwrap();

        assert_eq!(sheet.rows[1][1], CellValue::Empty);
        assert_eq!(sheet.rows[2].len(), 1);
    }

    #[test]
    fn test_csv_parser_empty_input() {
        let result = CsvParser.parse_bytes(b"", "empty.csv");
        assert!(matches!(result, Err(ImportError::EmptySheet)));
    }

    #[test]
    fn test_csv_parser_file() {
        let mut temp_file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(temp_file, "材料号,重量").unwrap();
        writeln!(temp_file, "MAT001,2.5").unwrap();

        let sheet = CsvParser.parse_file(temp_file.path()).unwrap();
        assert_eq!(sheet.data_row_count(), 1);
        assert_eq!(sheet.rows[1][0], CellValue::text("MAT001"));
    }

    #[test]
    fn test_parse_file_not_found() {
        let result = CsvParser.parse_file(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_workbook_kind_from_file_name() {
        assert_eq!(WorkbookKind::from_file_name("a.XLSX"), WorkbookKind::Xlsx);
        assert_eq!(WorkbookKind::from_file_name("a.xlsm"), WorkbookKind::Xlsx);
        assert_eq!(WorkbookKind::from_file_name("a.xlsb"), WorkbookKind::Xlsb);
        assert_eq!(WorkbookKind::from_file_name("a.ods"), WorkbookKind::Ods);
        assert_eq!(WorkbookKind::from_file_name("a.xls"), WorkbookKind::Xls);
        assert_eq!(WorkbookKind::from_file_name("legacy"), WorkbookKind::Xls);
    }

    #[test]
    fn test_excel_parser_rejects_garbage() {
        let result = ExcelParser.parse_bytes(b"not a workbook", "broken.xlsx");
        assert!(matches!(result, Err(ImportError::ExcelParseError(_))));
    }

    #[test]
    fn test_universal_parser_unsupported() {
        let result = UniversalFileParser.parse_bytes(b"x", "notes.txt");
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(ext)) if ext == "txt"));
    }

    #[test]
    fn test_cell_from_data_kinds() {
        assert_eq!(cell_from_data(&Data::Int(5), None), CellValue::number(5.0));
        assert_eq!(cell_from_data(&Data::Float(5.25), None), CellValue::number(5.25));
        assert_eq!(cell_from_data(&Data::Bool(true), None), CellValue::Boolean(true));
        assert_eq!(
            cell_from_data(&Data::String("x".to_string()), None),
            CellValue::text("x")
        );
        assert_eq!(cell_from_data(&Data::Empty, None), CellValue::Empty);
    }

    #[test]
    fn test_cell_from_data_formula_pairing() {
        assert_eq!(
            cell_from_data(&Data::Float(10.0), Some("A1*2")),
            CellValue::formula("A1*2", Some(CellValue::number(10.0)))
        );
        assert_eq!(
            cell_from_data(&Data::Empty, Some("SUM(A1:A3)")),
            CellValue::formula("SUM(A1:A3)", None)
        );
        assert_eq!(
            cell_from_data(&Data::String(String::new()), Some("B1")),
            CellValue::formula("B1", None)
        );
        // 空公式文本视为普通单元格
        assert_eq!(cell_from_data(&Data::Int(1), Some("")), CellValue::number(1.0));
    }

    #[test]
    fn test_cell_from_data_dates_follow_workbook_date_system() {
        let date_1900 = ExcelDateTime::new(45000.0, ExcelDateTimeType::DateTime, false);
        let date_1904 = ExcelDateTime::new(43538.0, ExcelDateTimeType::DateTime, true);
        let expected = CellValue::Date(NaiveDate::from_ymd_opt(2023, 3, 15).unwrap());

        assert_eq!(cell_from_data(&Data::DateTime(date_1900), None), expected);
        assert_eq!(cell_from_data(&Data::DateTime(date_1904), None), expected);

        // 时长不是日期
        let duration = ExcelDateTime::new(1.5, ExcelDateTimeType::TimeDelta, false);
        assert_eq!(cell_from_data(&Data::DateTime(duration), None), CellValue::number(1.5));
    }

    #[test]
    fn test_cell_from_data_iso_dates() {
        assert_eq!(
            cell_from_data(&Data::DateTimeIso("2024-02-29T08:30:00".to_string()), None),
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
        assert_eq!(
            cell_from_data(&Data::DateTimeIso("08:30:00".to_string()), None),
            CellValue::text("08:30:00")
        );
    }

    #[test]
    fn test_range_to_rows_keeps_absolute_positions() {
        // 第 1 行为空，数据从 B2 开始
        let mut values: Range<Data> = Range::new((1, 1), (2, 2));
        values.set_value((1, 1), Data::String("Name".to_string()));
        values.set_value((1, 2), Data::String("Age".to_string()));
        values.set_value((2, 1), Data::String("Alice".to_string()));
        values.set_value((2, 2), Data::Int(30));

        let rows = range_to_rows(&values, None);

        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_empty());
        assert_eq!(rows[1][0], CellValue::Empty);
        assert_eq!(rows[1][1], CellValue::text("Name"));
        assert_eq!(rows[2][2], CellValue::number(30.0));
    }

    #[test]
    fn test_range_to_rows_aligns_formulas() {
        let mut values: Range<Data> = Range::new((0, 0), (1, 1));
        values.set_value((0, 0), Data::String("Qty".to_string()));
        values.set_value((0, 1), Data::String("Total".to_string()));
        values.set_value((1, 0), Data::Int(3));
        values.set_value((1, 1), Data::Float(6.0));

        let mut formulas: Range<String> = Range::new((1, 1), (1, 1));
        formulas.set_value((1, 1), "A2*2".to_string());

        let rows = range_to_rows(&values, Some(&formulas));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0], CellValue::number(3.0));
        assert_eq!(
            rows[1][1],
            CellValue::formula("A2*2", Some(CellValue::number(6.0)))
        );
    }
}
