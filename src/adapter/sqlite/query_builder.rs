//! SQL查询构建器模块
//!
//! 提供安全的SQL查询构建功能，防止SQL注入攻击：
//! 标识符经过验证并加引号，字面量全部作为 `?` 参数绑定

use crate::error::{SheetDbError, SheetDbResult};
use crate::security::DatabaseSecurityValidator;
use crate::types::*;
use rat_logger::debug;

/// SQLite查询构建器
#[derive(Debug, Clone, Default)]
pub struct SqlQueryBuilder {
    fields: Vec<String>,
    condition: Option<QueryConditionGroup>,
    order_by: Option<OrderClause>,
    limit: Option<i64>,
    security_validator: DatabaseSecurityValidator,
}

#[derive(Debug, Clone)]
pub struct OrderClause {
    pub field: String,
    pub direction: SortDirection,
}

impl SqlQueryBuilder {
    /// 创建新的SQLite查询构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置查询字段，为空时查询所有字段
    pub fn select<S: AsRef<str>>(mut self, fields: &[S]) -> Self {
        self.fields = fields.iter().map(|f| f.as_ref().to_string()).collect();
        self
    }

    /// 设置WHERE条件
    pub fn where_condition_group(mut self, group: QueryConditionGroup) -> Self {
        self.condition = Some(group);
        self
    }

    /// 添加排序
    pub fn order_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.order_by = Some(OrderClause {
            field: field.to_string(),
            direction,
        });
        self
    }

    /// 设置LIMIT
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// 构建SELECT语句，返回 SQL 文本和按顺序绑定的参数
    pub fn build(&self, operation: &str, table: &str) -> SheetDbResult<(String, Vec<DataValue>)> {
        let safe_table = self
            .security_validator
            .get_safe_table_identifier(operation, table)?;

        let fields = if self.fields.is_empty() {
            "*".to_string()
        } else {
            self.fields
                .iter()
                .map(|f| self.security_validator.get_safe_field_identifier(operation, f))
                .collect::<SheetDbResult<Vec<String>>>()?
                .join(", ")
        };

        let mut sql = format!("SELECT {} FROM {}", fields, safe_table);
        let mut params = Vec::new();

        // 添加WHERE条件
        if let Some(group) = &self.condition {
            let (where_clause, where_params) = self.build_condition_group_clause(operation, group)?;
            if !where_clause.is_empty() {
                sql.push_str(&format!(" WHERE {}", where_clause));
                params.extend(where_params);
            }
        }

        // 添加ORDER BY
        if let Some(order) = &self.order_by {
            let safe_field = self
                .security_validator
                .get_safe_field_identifier(operation, &order.field)?;
            sql.push_str(&format!(" ORDER BY {} {}", safe_field, order.direction.as_sql()));
        }

        // 添加LIMIT
        if let Some(limit) = self.limit {
            if limit < 0 {
                return Err(SheetDbError::invalid_parameter(
                    operation,
                    "count",
                    &format!("行数不能为负数: {}", limit),
                ));
            }
            sql.push_str(" LIMIT ?");
            params.push(DataValue::Int(limit));
        }

        debug!("[{}] 生成SQL: {}", operation, sql);
        Ok((sql, params))
    }

    /// 构建条件组合子句
    fn build_condition_group_clause(
        &self,
        operation: &str,
        group: &QueryConditionGroup,
    ) -> SheetDbResult<(String, Vec<DataValue>)> {
        match group {
            QueryConditionGroup::Single(condition) => {
                self.build_single_condition_clause(operation, condition)
            }
            QueryConditionGroup::Group {
                operator,
                conditions,
            } => {
                let mut clauses = Vec::new();
                let mut params = Vec::new();

                for condition in conditions {
                    let (clause, condition_params) =
                        self.build_condition_group_clause(operation, condition)?;
                    if !clause.is_empty() {
                        clauses.push(clause);
                        params.extend(condition_params);
                    }
                }

                if clauses.is_empty() {
                    return Ok((String::new(), Vec::new()));
                }

                let logical_op = match operator {
                    LogicalOperator::And => " AND ",
                    LogicalOperator::Or => " OR ",
                };

                let combined_clause = if clauses.len() == 1 {
                    clauses.remove(0)
                } else {
                    format!("({})", clauses.join(logical_op))
                };

                Ok((combined_clause, params))
            }
            QueryConditionGroup::Not(inner) => {
                let (clause, params) = self.build_condition_group_clause(operation, inner)?;
                if clause.is_empty() {
                    return Ok((clause, params));
                }
                Ok((format!("NOT ({})", clause), params))
            }
        }
    }

    /// 构建单个条件的子句
    fn build_single_condition_clause(
        &self,
        operation: &str,
        condition: &QueryCondition,
    ) -> SheetDbResult<(String, Vec<DataValue>)> {
        let safe_field = self
            .security_validator
            .get_safe_field_identifier(operation, &condition.field)?;

        let count = condition.values.len();
        let arity_ok = match condition.operator.arity() {
            Some(expected) => count == expected,
            None => count > 0,
        };
        if !arity_ok {
            return Err(SheetDbError::invalid_parameter(
                operation,
                "condition",
                &format!(
                    "操作符 {:?} 的值个数不正确: {}",
                    condition.operator, count
                ),
            ));
        }
        if condition.values.iter().any(DataValue::is_null) {
            return Err(SheetDbError::invalid_parameter(
                operation,
                "condition",
                "比较值不能为 NULL，请使用 IS NULL / IS NOT NULL",
            ));
        }

        let placeholders = || vec!["?"; count].join(", ");
        let clause = match condition.operator {
            QueryOperator::Eq => format!("{} = ?", safe_field),
            QueryOperator::Ne => format!("{} != ?", safe_field),
            QueryOperator::Gt => format!("{} > ?", safe_field),
            QueryOperator::Gte => format!("{} >= ?", safe_field),
            QueryOperator::Lt => format!("{} < ?", safe_field),
            QueryOperator::Lte => format!("{} <= ?", safe_field),
            QueryOperator::Like => format!("{} LIKE ?", safe_field),
            QueryOperator::NotLike => format!("{} NOT LIKE ?", safe_field),
            QueryOperator::In => format!("{} IN ({})", safe_field, placeholders()),
            QueryOperator::NotIn => format!("{} NOT IN ({})", safe_field, placeholders()),
            QueryOperator::Between => format!("{} BETWEEN ? AND ?", safe_field),
            QueryOperator::NotBetween => format!("{} NOT BETWEEN ? AND ?", safe_field),
            QueryOperator::IsNull => format!("{} IS NULL", safe_field),
            QueryOperator::IsNotNull => format!("{} IS NOT NULL", safe_field),
        };

        Ok((clause, condition.values.clone()))
    }
}
