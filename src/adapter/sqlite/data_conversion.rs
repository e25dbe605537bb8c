//! SQLite数据转换模块
//!
//! 参数绑定与结果行转换。结果值按 SQLite 的存储类型转换，
//! 不依赖列声明的类型。

use crate::error::{SheetDbError, SheetDbResult};
use crate::types::DataValue;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::{Row, TypeInfo, ValueRef};

/// 绑定一个参数
///
/// 布尔值按 0/1 整数绑定，与建表时的存储方式一致
pub(crate) fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &DataValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        DataValue::Null => query.bind(None::<String>),
        DataValue::Bool(b) => query.bind(i64::from(*b)),
        DataValue::Int(i) => query.bind(*i),
        DataValue::Float(f) => query.bind(*f),
        DataValue::String(s) => query.bind(s.clone()),
    }
}

/// 按顺序绑定所有参数
pub(crate) fn bind_values<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    values: &[DataValue],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for value in values {
        query = bind_value(query, value);
    }
    query
}

/// 将sqlx的行转换为按列顺序排列的值
pub(crate) fn row_to_values(
    operation: &str,
    row: &SqliteRow,
    column_count: usize,
) -> SheetDbResult<Vec<DataValue>> {
    let mut values = Vec::with_capacity(column_count);
    for index in 0..column_count {
        values.push(column_value(operation, row, index)?);
    }
    Ok(values)
}

fn column_value(operation: &str, row: &SqliteRow, index: usize) -> SheetDbResult<DataValue> {
    let raw = row
        .try_get_raw(index)
        .map_err(|e| decode_error(operation, index, e))?;
    if raw.is_null() {
        return Ok(DataValue::Null);
    }

    let storage_class = raw.type_info().name().to_string();
    let value = match storage_class.as_str() {
        "INTEGER" | "BOOLEAN" => DataValue::Int(
            row.try_get_unchecked::<i64, _>(index)
                .map_err(|e| decode_error(operation, index, e))?,
        ),
        "REAL" => DataValue::Float(
            row.try_get_unchecked::<f64, _>(index)
                .map_err(|e| decode_error(operation, index, e))?,
        ),
        "BLOB" => {
            let bytes = row
                .try_get_unchecked::<Vec<u8>, _>(index)
                .map_err(|e| decode_error(operation, index, e))?;
            DataValue::String(String::from_utf8_lossy(&bytes).into_owned())
        }
        _ => DataValue::String(
            row.try_get_unchecked::<String, _>(index)
                .map_err(|e| decode_error(operation, index, e))?,
        ),
    };
    Ok(value)
}

fn decode_error(operation: &str, index: usize, error: sqlx::Error) -> SheetDbError {
    SheetDbError::query_failed(
        operation,
        &format!("读取第 {} 列失败: {}", index, error),
    )
}
