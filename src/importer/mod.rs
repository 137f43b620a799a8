// ==========================================
// 表格数据导入工具 - 导入层
// ==========================================
// 职责: 表格数据 → 强类型记录
// 支持: Excel (.xlsx/.xlsm/.xlsb/.xls/.ods), CSV
// ==========================================

// 模块声明
pub mod cell;
pub mod cell_extractor;
pub mod converter;
pub mod dispatcher;
pub mod error;
pub mod file_parser;
pub mod header_resolver;
pub mod row_mapper;
pub mod schema;
pub mod sheet_importer_impl;
pub mod sheet_importer_trait;

// 重导出核心类型
pub use cell::{CellValue, Row, Sheet};
pub use cell_extractor::{excel_serial_to_date, extract_cell_value, format_numeric};
pub use converter::{
    BoolConverter, Converter, DateConverter, FloatConverter, FnConverter, IdentityConverter,
    IntConverter,
};
pub use dispatcher::Dispatcher;
pub use error::{ConversionError, ImportError, ImportResult, RowMappingError};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser, WorkbookKind};
pub use header_resolver::{resolve_header, HeaderMap};
pub use row_mapper::map_row;
pub use schema::{FieldMapping, ImportRecord, Schema};
pub use sheet_importer_impl::{import_all, SheetImporterImpl};

// 重导出 Trait 接口
pub use sheet_importer_trait::{RecordImporter, SheetParser};
