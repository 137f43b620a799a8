// ==========================================
// 表格数据导入工具 - 列映射 Schema
// ==========================================
// 职责: 静态声明 字段 → {列名, 是否必填, 转换器}
// 说明: 转换器在 Schema 构建时注入，运行期只读
// ==========================================

use crate::importer::converter::Converter;
use crate::importer::error::ConversionError;
use std::fmt;

type ApplyFn<T> = Box<dyn Fn(&mut T, Option<&str>) -> Result<(), ConversionError> + Send + Sync>;

// ==========================================
// FieldMapping - 单个字段映射
// ==========================================
pub struct FieldMapping<T> {
    field: &'static str,
    column: String,
    required: bool,
    apply: ApplyFn<T>,
}

impl<T: 'static> FieldMapping<T> {
    /// 创建字段映射
    ///
    /// # 参数
    /// - field: 字段名（用于错误信息）
    /// - column: 表头列名
    /// - converter: 单元格文本 → 字段值
    /// - setter: 把转换结果写入记录
    pub fn new<C, S>(field: &'static str, column: impl Into<String>, converter: C, setter: S) -> Self
    where
        C: Converter + 'static,
        S: Fn(&mut T, C::Output) + Send + Sync + 'static,
    {
        let apply = move |record: &mut T, raw: Option<&str>| {
            let value = converter.convert(raw)?;
            setter(record, value);
            Ok(())
        };

        Self {
            field,
            column: column.into(),
            required: false,
            apply: Box::new(apply),
        }
    }

    /// 标记为必填
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

impl<T> FieldMapping<T> {
    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// 转换并赋值
    pub fn apply(&self, record: &mut T, raw: Option<&str>) -> Result<(), ConversionError> {
        (self.apply)(record, raw)
    }
}

impl<T> fmt::Debug for FieldMapping<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldMapping")
            .field("field", &self.field)
            .field("column", &self.column)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

// ==========================================
// Schema - 记录类型的完整映射表
// ==========================================
// 字段按声明顺序处理，字段之间互不依赖
pub struct Schema<T> {
    fields: Vec<FieldMapping<T>>,
}

impl<T: 'static> Schema<T> {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// 追加已构造的字段映射
    pub fn field(mut self, mapping: FieldMapping<T>) -> Self {
        self.fields.push(mapping);
        self
    }

    /// 追加可选列
    pub fn column<C, S>(self, field: &'static str, column: impl Into<String>, converter: C, setter: S) -> Self
    where
        C: Converter + 'static,
        S: Fn(&mut T, C::Output) + Send + Sync + 'static,
    {
        self.field(FieldMapping::new(field, column, converter, setter))
    }

    /// 追加必填列
    pub fn required_column<C, S>(
        self,
        field: &'static str,
        column: impl Into<String>,
        converter: C,
        setter: S,
    ) -> Self
    where
        C: Converter + 'static,
        S: Fn(&mut T, C::Output) + Send + Sync + 'static,
    {
        self.field(FieldMapping::new(field, column, converter, setter).required())
    }
}

impl<T> Schema<T> {
    pub fn fields(&self) -> &[FieldMapping<T>] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Schema 引用的全部列名（声明顺序）
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(FieldMapping::column)
    }
}

impl<T: 'static> Default for Schema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.fields.iter()).finish()
    }
}

// ==========================================
// ImportRecord Trait
// ==========================================
// 用途: 记录类型自带 Schema，导入器构建时解析一次
// 未出现在表头中的列，对应字段保持 Default 值
pub trait ImportRecord: Default + Send + 'static {
    fn schema() -> Schema<Self>;
}
