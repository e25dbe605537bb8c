//! 内存表模块
//!
//! [`Table`] 是读取器与查询结果共用的数据结构：有名字、有序的列名、有序的行。
//! 所有行的列数与列名列表一致，由构造函数和 [`Table::push_row`] 保证。

use crate::error::{SheetDbError, SheetDbResult};
use crate::types::DataValue;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// 列类型（用于建表时推断列的亲和类型）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    /// 整数（布尔值同样按 0/1 保存）
    Integer,
    /// 浮点数
    Real,
    /// 文本
    Text,
}

impl ColumnType {
    /// SQLite 建表时使用的类型名
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }

    /// 根据一列的值推断类型
    ///
    /// 只要出现字符串即为 TEXT；否则出现浮点数即为 REAL；
    /// 只有整数/布尔值时为 INTEGER；全部为空时为 TEXT。
    pub fn infer<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a DataValue>,
    {
        let mut inferred: Option<ColumnType> = None;
        for value in values {
            let current = match value {
                DataValue::Null => continue,
                DataValue::String(_) => return ColumnType::Text,
                DataValue::Float(_) => ColumnType::Real,
                DataValue::Int(_) | DataValue::Bool(_) => ColumnType::Integer,
            };
            inferred = match (inferred, current) {
                (Some(ColumnType::Real), _) | (_, ColumnType::Real) => Some(ColumnType::Real),
                _ => Some(current),
            };
        }
        inferred.unwrap_or(ColumnType::Text)
    }
}

/// 有序的行列数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<DataValue>>,
}

impl Table {
    /// 创建表并校验行宽与列名唯一性
    pub fn new<S: Into<String>>(
        name: S,
        columns: Vec<String>,
        rows: Vec<Vec<DataValue>>,
    ) -> SheetDbResult<Self> {
        let mut table = Self::empty(name, columns)?;
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// 创建只有列、没有行的表
    pub fn empty<S: Into<String>>(name: S, columns: Vec<String>) -> SheetDbResult<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(SheetDbError::invalid_parameter(
                    "table",
                    "columns",
                    &format!("列名重复: {}", column),
                ));
            }
        }
        Ok(Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        })
    }

    /// 追加一行，列数必须与表头一致
    pub fn push_row(&mut self, row: Vec<DataValue>) -> SheetDbResult<()> {
        if row.len() != self.columns.len() {
            return Err(SheetDbError::invalid_parameter(
                "table",
                "row",
                &format!(
                    "第 {} 行有 {} 个值，但表有 {} 列",
                    self.rows.len(),
                    row.len(),
                    self.columns.len()
                ),
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 以新名字返回同一份数据
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<DataValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 列名对应的下标
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn row(&self, index: usize) -> Option<&[DataValue]> {
        self.rows.get(index).map(|r| r.as_slice())
    }

    /// 读取某一单元格
    pub fn get(&self, row: usize, column: &str) -> Option<&DataValue> {
        let index = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(index))
    }

    /// 某一列的所有值（按行顺序）
    pub fn column_values(&self, column: &str) -> Option<Vec<&DataValue>> {
        let index = self.column_index(column)?;
        Some(self.rows.iter().map(|r| &r[index]).collect())
    }

    /// 每列推断出的类型
    pub fn column_types(&self) -> Vec<ColumnType> {
        (0..self.columns.len())
            .map(|i| ColumnType::infer(self.rows.iter().map(|r| &r[i])))
            .collect()
    }

    /// 以 列名 -> 值 的映射形式返回某一行
    pub fn row_map(&self, index: usize) -> Option<HashMap<String, DataValue>> {
        let row = self.rows.get(index)?;
        Some(
            self.columns
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect(),
        )
    }

    /// 转换为 JSON 记录数组（保持列顺序）
    pub fn to_records(&self) -> serde_json::Value {
        let records = self
            .rows
            .iter()
            .map(|row| {
                let object: serde_json::Map<String, serde_json::Value> = self
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(column, value)| (column.clone(), value.to_json_value()))
                    .collect();
                serde_json::Value::Object(object)
            })
            .collect();
        serde_json::Value::Array(records)
    }
}
