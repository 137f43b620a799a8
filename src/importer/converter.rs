// ==========================================
// 表格数据导入工具 - 数据转换器
// ==========================================
// 职责: 单元格文本 → 字段类型（纯函数，无副作用）
// 内置: Identity / Date / Int / Float / Bool
// 扩展: 实现 Converter，或用 FnConverter 包装闭包
// ==========================================

use crate::importer::error::ConversionError;
use chrono::NaiveDate;

/// 默认日期格式
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

// ==========================================
// Converter Trait
// ==========================================
// 用途: 在 Schema 构建时按字段注入，而非逐行实例化
pub trait Converter: Send + Sync {
    /// 转换结果类型
    type Output;

    /// 转换单元格文本；`None` 表示单元格为空
    fn convert(&self, raw: Option<&str>) -> Result<Self::Output, ConversionError>;
}

/// 空白文本视为缺失
fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|v| !v.is_empty())
}

// ==========================================
// IdentityConverter - 原样返回
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityConverter;

impl Converter for IdentityConverter {
    type Output = Option<String>;

    fn convert(&self, raw: Option<&str>) -> Result<Self::Output, ConversionError> {
        Ok(raw.map(str::to_string))
    }
}

// ==========================================
// DateConverter - 固定格式日期
// ==========================================
#[derive(Debug, Clone)]
pub struct DateConverter {
    format: String,
}

impl DateConverter {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }

    pub fn format(&self) -> &str {
        &self.format
    }
}

impl Default for DateConverter {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMAT)
    }
}

impl Converter for DateConverter {
    type Output = Option<NaiveDate>;

    fn convert(&self, raw: Option<&str>) -> Result<Self::Output, ConversionError> {
        match non_blank(raw) {
            None => Ok(None),
            Some(value) => NaiveDate::parse_from_str(value, &self.format)
                .map(Some)
                .map_err(|e| {
                    ConversionError::new(
                        "DateConverter",
                        value,
                        format!("日期转换错误，期望格式 {}: {}", self.format, e),
                    )
                }),
        }
    }
}

// ==========================================
// IntConverter - 整数
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct IntConverter;

impl Converter for IntConverter {
    type Output = Option<i64>;

    fn convert(&self, raw: Option<&str>) -> Result<Self::Output, ConversionError> {
        match non_blank(raw) {
            None => Ok(None),
            Some(value) => value.parse::<i64>().map(Some).map_err(|_| {
                ConversionError::new("IntConverter", value, format!("无法解析为整数: {}", value))
            }),
        }
    }
}

// ==========================================
// FloatConverter - 浮点数
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatConverter;

impl Converter for FloatConverter {
    type Output = Option<f64>;

    fn convert(&self, raw: Option<&str>) -> Result<Self::Output, ConversionError> {
        match non_blank(raw) {
            None => Ok(None),
            Some(value) => value.parse::<f64>().map(Some).map_err(|_| {
                ConversionError::new(
                    "FloatConverter",
                    value,
                    format!("无法解析为浮点数: {}", value),
                )
            }),
        }
    }
}

// ==========================================
// BoolConverter - 布尔
// ==========================================
// 接受 true/false（不区分大小写）与 1/0
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolConverter;

impl Converter for BoolConverter {
    type Output = Option<bool>;

    fn convert(&self, raw: Option<&str>) -> Result<Self::Output, ConversionError> {
        match non_blank(raw) {
            None => Ok(None),
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(Some(true)),
                "false" | "0" => Ok(Some(false)),
                _ => Err(ConversionError::new(
                    "BoolConverter",
                    value,
                    format!("无法解析为布尔值: {}", value),
                )),
            },
        }
    }
}

// ==========================================
// FnConverter - 闭包转换器
// ==========================================
pub struct FnConverter<F> {
    name: &'static str,
    f: F,
}

impl<F> FnConverter<F> {
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<F, O> Converter for FnConverter<F>
where
    F: Fn(Option<&str>) -> Result<O, ConversionError> + Send + Sync,
{
    type Output = O;

    fn convert(&self, raw: Option<&str>) -> Result<Self::Output, ConversionError> {
        (self.f)(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_passthrough() {
        let c = IdentityConverter;
        assert_eq!(c.convert(Some(" raw ")).unwrap(), Some(" raw ".to_string()));
        assert_eq!(c.convert(None).unwrap(), None);
    }

    #[test]
    fn test_date_default_format() {
        let c = DateConverter::default();
        assert_eq!(
            c.convert(Some("2024-12-18")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 18)
        );
        assert_eq!(c.convert(Some("   ")).unwrap(), None);
        assert_eq!(c.convert(None).unwrap(), None);
    }

    #[test]
    fn test_date_rejects_other_formats() {
        let c = DateConverter::default();
        let err = c.convert(Some("18/12/2024")).unwrap_err();
        assert_eq!(err.converter, "DateConverter");
        assert_eq!(err.value, "18/12/2024");

        assert!(c.convert(Some("2024-02-30")).is_err());
    }

    #[test]
    fn test_date_custom_format() {
        let c = DateConverter::new("%Y%m%d");
        assert_eq!(
            c.convert(Some("20250120")).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 20)
        );
    }

    #[test]
    fn test_int_converter() {
        let c = IntConverter;
        assert_eq!(c.convert(Some("30")).unwrap(), Some(30));
        assert_eq!(c.convert(Some(" -7 ")).unwrap(), Some(-7));
        assert_eq!(c.convert(Some("")).unwrap(), None);
        assert!(c.convert(Some("3.5")).is_err());
        assert!(c.convert(Some("thirty")).is_err());
    }

    #[test]
    fn test_float_converter() {
        let c = FloatConverter;
        assert_eq!(c.convert(Some("5.25")).unwrap(), Some(5.25));
        assert!(c.convert(Some("n/a")).is_err());
    }

    #[test]
    fn test_bool_converter() {
        let c = BoolConverter;
        assert_eq!(c.convert(Some("TRUE")).unwrap(), Some(true));
        assert_eq!(c.convert(Some("0")).unwrap(), Some(false));
        assert_eq!(c.convert(None).unwrap(), None);
        assert!(c.convert(Some("yes")).is_err());
    }

    #[test]
    fn test_fn_converter() {
        let upper = FnConverter::new("Upper", |raw: Option<&str>| {
            Ok::<_, ConversionError>(raw.map(str::to_uppercase).unwrap_or_default())
        });
        assert_eq!(upper.name(), "Upper");
        assert_eq!(upper.convert(Some("abc")).unwrap(), "ABC");
        assert_eq!(upper.convert(None).unwrap(), "");
    }
}
