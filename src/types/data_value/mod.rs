use serde::{Deserialize, Serialize};

/// 单元格数据值 - 表格与数据库之间传递的标量值
///
/// 不做任何隐式转换：电子表格里读到什么类型，就保存为什么类型。
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub enum DataValue {
    /// 空值
    Null,
    /// 布尔值
    Bool(bool),
    /// 整数
    Int(i64),
    /// 浮点数
    Float(f64),
    /// 字符串
    String(String),
}

impl std::fmt::Display for DataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataValue::Null => write!(f, "null"),
            DataValue::Bool(b) => write!(f, "{}", b),
            DataValue::Int(i) => write!(f, "{}", i),
            DataValue::Float(fl) => write!(f, "{}", fl),
            DataValue::String(s) => write!(f, "{}", s),
        }
    }
}

impl std::fmt::Debug for DataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Debug 和 Display 保持一致，字符串额外加引号以便区分 "1" 与 1
        match self {
            DataValue::String(s) => write!(f, "{:?}", s),
            other => write!(f, "{}", other),
        }
    }
}

impl DataValue {
    /// 获取数据类型名称
    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::Null => "null",
            DataValue::Bool(_) => "boolean",
            DataValue::Int(_) => "integer",
            DataValue::Float(_) => "float",
            DataValue::String(_) => "string",
        }
    }

    /// 判断是否为空值
    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DataValue::Int(i) => Some(*i),
            DataValue::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// 数值视图，整数会被提升为浮点数
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DataValue::Int(i) => Some(*i as f64),
            DataValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DataValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// 转换为 JSON 字符串
    pub fn to_json_string(&self) -> Result<String, crate::error::SheetDbError> {
        serde_json::to_string(self).map_err(|e| {
            crate::quick_error!(serialization, format!("DataValue 转换为 JSON 失败: {}", e))
        })
    }

    /// 从 JSON 字符串解析
    pub fn from_json_string(json: &str) -> Result<Self, crate::error::SheetDbError> {
        serde_json::from_str(json).map_err(|e| {
            crate::quick_error!(serialization, format!("JSON 解析为 DataValue 失败: {}", e))
        })
    }

    /// 转换为不带类型标签的 JSON 值
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            DataValue::Null => serde_json::Value::Null,
            DataValue::Bool(b) => serde_json::Value::Bool(*b),
            DataValue::Int(i) => serde_json::Value::Number(serde_json::Number::from(*i)),
            DataValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            DataValue::String(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self {
        DataValue::Bool(value)
    }
}

impl From<i32> for DataValue {
    fn from(value: i32) -> Self {
        DataValue::Int(value as i64)
    }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Int(value)
    }
}

impl From<f32> for DataValue {
    fn from(value: f32) -> Self {
        DataValue::Float(value as f64)
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        DataValue::Float(value)
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::String(value)
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::String(value.to_string())
    }
}

impl<T: Into<DataValue>> From<Option<T>> for DataValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(DataValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_views() {
        assert_eq!(DataValue::Int(3).as_f64(), Some(3.0));
        assert_eq!(DataValue::Bool(true).as_i64(), Some(1));
        assert_eq!(DataValue::String("3".into()).as_i64(), None);
        assert_eq!(DataValue::from(None::<i64>), DataValue::Null);
    }

    #[test]
    fn test_type_names_and_bool_view() {
        assert_eq!(DataValue::Null.type_name(), "null");
        assert_eq!(DataValue::Bool(false).type_name(), "boolean");
        assert_eq!(DataValue::Int(1).type_name(), "integer");
        assert_eq!(DataValue::Float(0.5).type_name(), "float");
        assert_eq!(DataValue::from("x").type_name(), "string");

        assert_eq!(DataValue::Bool(true).as_bool(), Some(true));
        // 整数不会被当作布尔值
        assert_eq!(DataValue::Int(1).as_bool(), None);
        assert_eq!(DataValue::Null.as_bool(), None);
    }

    #[test]
    fn test_json_value_is_untagged() {
        assert_eq!(DataValue::Int(7).to_json_value(), serde_json::json!(7));
        assert_eq!(DataValue::from("A").to_json_value(), serde_json::json!("A"));
        assert_eq!(DataValue::Float(f64::NAN).to_json_value(), serde_json::Value::Null);
    }

    #[test]
    fn test_tagged_json_string() {
        let json = DataValue::Float(1.5).to_json_string().unwrap();
        assert_eq!(DataValue::from_json_string(&json).unwrap(), DataValue::Float(1.5));
    }
}
