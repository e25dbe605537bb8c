//! 查询相关类型
//!
//! 排序方向、条件操作符以及 WHERE 条件的结构化表示

pub mod parser;

use crate::error::{SheetDbError, SheetDbResult};
use crate::types::DataValue;
use serde::{Deserialize, Serialize};

pub use parser::parse_condition;

/// 逻辑操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOperator {
    /// AND 逻辑
    And,
    /// OR 逻辑
    Or,
}

/// 条件操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryOperator {
    /// 等于
    Eq,
    /// 不等于
    Ne,
    /// 大于
    Gt,
    /// 大于等于
    Gte,
    /// 小于
    Lt,
    /// 小于等于
    Lte,
    /// 模式匹配
    Like,
    NotLike,
    /// 在列表中
    In,
    /// 不在列表中
    NotIn,
    /// 在区间内（闭区间）
    Between,
    NotBetween,
    /// 为空
    IsNull,
    /// 不为空
    IsNotNull,
}

impl QueryOperator {
    /// 该操作符需要的值个数，`None` 表示一个或多个
    pub fn arity(&self) -> Option<usize> {
        match self {
            QueryOperator::IsNull | QueryOperator::IsNotNull => Some(0),
            QueryOperator::Between | QueryOperator::NotBetween => Some(2),
            QueryOperator::In | QueryOperator::NotIn => None,
            _ => Some(1),
        }
    }
}

/// 单个查询条件：`列 操作符 值`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryCondition {
    /// 列名（未加引号的原始名称）
    pub field: String,
    /// 操作符
    pub operator: QueryOperator,
    /// 字面量，个数由操作符决定
    pub values: Vec<DataValue>,
}

/// 查询条件组合
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryConditionGroup {
    /// 单个条件
    Single(QueryCondition),
    /// 条件组合
    Group {
        /// 逻辑操作符
        operator: LogicalOperator,
        /// 子条件列表
        conditions: Vec<QueryConditionGroup>,
    },
    /// 取反
    Not(Box<QueryConditionGroup>),
}

impl QueryConditionGroup {
    /// 收集条件中引用的所有列名（按出现顺序，可能重复）
    pub fn referenced_fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        self.collect_fields(&mut fields);
        fields
    }

    /// 按映射函数替换条件中的所有列名，结构与字面量保持不变
    pub fn map_fields<F>(&self, f: &mut F) -> SheetDbResult<Self>
    where
        F: FnMut(&str) -> SheetDbResult<String>,
    {
        Ok(match self {
            QueryConditionGroup::Single(condition) => QueryConditionGroup::Single(QueryCondition {
                field: f(&condition.field)?,
                operator: condition.operator,
                values: condition.values.clone(),
            }),
            QueryConditionGroup::Group { operator, conditions } => {
                let mut mapped = Vec::with_capacity(conditions.len());
                for condition in conditions {
                    mapped.push(condition.map_fields(&mut *f)?);
                }
                QueryConditionGroup::Group {
                    operator: *operator,
                    conditions: mapped,
                }
            }
            QueryConditionGroup::Not(inner) => QueryConditionGroup::Not(Box::new(inner.map_fields(f)?)),
        })
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            QueryConditionGroup::Single(condition) => out.push(condition.field.as_str()),
            QueryConditionGroup::Group { conditions, .. } => {
                for condition in conditions {
                    condition.collect_fields(out);
                }
            }
            QueryConditionGroup::Not(inner) => inner.collect_fields(out),
        }
    }
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    /// 升序
    Asc,
    /// 降序
    Desc,
}

impl SortDirection {
    /// 解析排序方向
    ///
    /// 只接受 `asc` / `ascending` / `desc` / `descending`（不区分大小写），
    /// 其余输入一律拒绝，绝不会原样拼接进 SQL。
    pub fn parse(operation: &str, direction: &str) -> SheetDbResult<Self> {
        match direction.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(SheetDbError::invalid_parameter(
                operation,
                "direction",
                &format!("'{}' 不是 ascending/descending", direction),
            )),
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}
