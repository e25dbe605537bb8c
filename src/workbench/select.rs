//! 五种基础查询操作
//!
//! 每个操作先验证表名、确认表存在，再用表的实际列校验调用者给出的列名，
//! 最后生成一条带绑定参数的 SQL 交给适配器执行。

use super::SqlWorkbench;
use crate::adapter::SqlQueryBuilder;
use crate::error::{SheetDbError, SheetDbResult};
use crate::table::Table;
use crate::types::{SortDirection, parse_condition};
use rat_logger::info;
use std::collections::HashSet;

impl SqlWorkbench {
    /// 查询表的所有行，列顺序与建表顺序一致
    ///
    /// `SELECT * FROM "<table>"`
    pub fn select_all(&mut self, table: &str) -> SheetDbResult<Table> {
        let operation = "select_all";
        self.checked_schema(operation, table)?;
        self.run(operation, table, SqlQueryBuilder::new())
    }

    /// 只查询指定的列，结果列顺序与请求顺序一致
    ///
    /// `SELECT "<c1>", "<c2>" FROM "<table>"`
    pub fn select_columns<S: AsRef<str>>(
        &mut self,
        table: &str,
        columns: &[S],
    ) -> SheetDbResult<Table> {
        let operation = "select_columns";
        if columns.is_empty() {
            return Err(SheetDbError::invalid_parameter(
                operation,
                "columns",
                "至少需要指定一列",
            ));
        }

        let schema = self.checked_schema(operation, table)?;
        let mut resolved = Vec::with_capacity(columns.len());
        let mut seen = HashSet::new();
        for column in columns {
            let name = self.resolve_column(operation, table, &schema, column.as_ref())?;
            if !seen.insert(name.clone()) {
                return Err(SheetDbError::invalid_parameter(
                    operation,
                    "columns",
                    &format!("列 '{}' 重复", name),
                ));
            }
            resolved.push(name);
        }

        self.run(operation, table, SqlQueryBuilder::new().select(resolved.as_slice()))
    }

    /// 按条件过滤行
    ///
    /// 条件使用受限的谓词语法（比较、IS NULL、LIKE、IN、BETWEEN 以及
    /// AND / OR / NOT 组合），所有字面量都作为参数绑定
    ///
    /// `SELECT * FROM "<table>" WHERE <条件>`
    pub fn select_where(&mut self, table: &str, condition: &str) -> SheetDbResult<Table> {
        let operation = "select_where";
        let group = parse_condition(operation, condition)?;

        let schema = self.checked_schema(operation, table)?;
        let group = group.map_fields(&mut |field: &str| {
            self.resolve_column(operation, table, &schema, field)
        })?;

        self.run(
            operation,
            table,
            SqlQueryBuilder::new().where_condition_group(group),
        )
    }

    /// 按一列排序
    ///
    /// `direction` 只接受 `asc` / `ascending` / `desc` / `descending`（不区分大小写），
    /// 其他值直接返回 `InvalidParameter`，不会执行任何查询
    ///
    /// `SELECT * FROM "<table>" ORDER BY "<column>" ASC|DESC`
    pub fn select_ordered(
        &mut self,
        table: &str,
        column: &str,
        direction: &str,
    ) -> SheetDbResult<Table> {
        let operation = "select_ordered";
        let direction = SortDirection::parse(operation, direction)?;

        let schema = self.checked_schema(operation, table)?;
        let column = self.resolve_column(operation, table, &schema, column)?;

        self.run(
            operation,
            table,
            SqlQueryBuilder::new().order_by(&column, direction),
        )
    }

    /// 只返回前 `count` 行（按存储顺序）
    ///
    /// `SELECT * FROM "<table>" LIMIT ?`
    pub fn select_limited(&mut self, table: &str, count: i64) -> SheetDbResult<Table> {
        let operation = "select_limited";
        if count < 0 {
            return Err(SheetDbError::invalid_parameter(
                operation,
                "count",
                &format!("行数不能为负数: {}", count),
            ));
        }

        self.checked_schema(operation, table)?;
        self.run(operation, table, SqlQueryBuilder::new().limit(count))
    }

    /// 验证表名并确认表存在，返回表的列名
    fn checked_schema(&mut self, operation: &str, table: &str) -> SheetDbResult<Vec<String>> {
        self.validator.validate_table_name(operation, table)?;
        if !self.adapter.table_exists(table)? {
            return Err(SheetDbError::table_not_found(operation, table));
        }
        self.adapter.table_columns(table)
    }

    /// 把调用者给出的列名解析为表中的实际列名
    ///
    /// 先精确匹配，再按 ASCII 不区分大小写匹配（与 SQLite 的标识符规则一致）
    fn resolve_column(
        &self,
        operation: &str,
        table: &str,
        schema: &[String],
        column: &str,
    ) -> SheetDbResult<String> {
        self.validator.validate_column_name(operation, column)?;
        schema
            .iter()
            .find(|c| c.as_str() == column)
            .or_else(|| schema.iter().find(|c| c.eq_ignore_ascii_case(column)))
            .cloned()
            .ok_or_else(|| SheetDbError::column_not_found(operation, table, column))
    }

    fn run(
        &mut self,
        operation: &str,
        table: &str,
        builder: SqlQueryBuilder,
    ) -> SheetDbResult<Table> {
        let (sql, params) = builder.build(operation, table)?;
        let result = self.adapter.query(operation, &sql, &params, table)?;
        info!("[{}] 表 {} 返回 {} 行", operation, table, result.row_count());
        Ok(result)
    }
}
