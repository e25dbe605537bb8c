//! SQLite查询执行模块

use super::adapter::SqliteAdapter;
use super::data_conversion::{bind_values, row_to_values};
use crate::error::{SheetDbError, SheetDbResult};
use crate::table::Table;
use crate::types::DataValue;
use rat_logger::debug;
use sqlx::{Column, Executor, Statement};

/// 执行查询并把结果收集为 [`Table`]
///
/// 先预编译语句取得列名，因此空结果也带有完整的列信息
pub(crate) fn execute_query(
    adapter: &mut SqliteAdapter,
    operation: &str,
    sql: &str,
    params: &[DataValue],
    result_name: &str,
) -> SheetDbResult<Table> {
    debug!("[{}] 执行SQL: {} (参数 {} 个)", operation, sql, params.len());

    let (runtime, connection) = adapter.parts()?;

    let columns: Vec<String> = {
        let statement = runtime
            .block_on((&mut *connection).prepare(sql))
            .map_err(|e| SheetDbError::query_failed(operation, &e.to_string()))?;
        statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    };

    let rows = runtime
        .block_on(bind_values(sqlx::query(sql), params).fetch_all(&mut *connection))
        .map_err(|e| SheetDbError::query_failed(operation, &e.to_string()))?;

    let mut table = Table::empty(result_name, columns)
        .map_err(|e| SheetDbError::query_failed(operation, &e.to_string()))?;
    let width = table.column_count();
    for row in &rows {
        table.push_row(row_to_values(operation, row, width)?)?;
    }

    debug!("[{}] 查询返回 {} 行 {} 列", operation, table.row_count(), table.column_count());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use crate::adapter::{DatabaseAdapter, SqliteAdapter};
    use crate::config::StoreConfig;
    use crate::types::DataValue;

    fn memory() -> SqliteAdapter {
        let config = StoreConfig::builder()
            .path(":memory:")
            .create_if_missing(true)
            .busy_timeout_ms(0)
            .build()
            .unwrap();
        SqliteAdapter::open(&config).unwrap()
    }

    #[test]
    fn test_storage_class_conversion() {
        let mut adapter = memory();
        let table = adapter
            .query(
                "test",
                "SELECT 1 AS i, 2.5 AS r, 'x' AS t, NULL AS n, X'6869' AS b",
                &[],
                "result",
            )
            .unwrap();
        assert_eq!(table.name(), "result");
        assert_eq!(table.columns(), ["i", "r", "t", "n", "b"]);
        assert_eq!(
            table.row(0).unwrap(),
            [
                DataValue::Int(1),
                DataValue::Float(2.5),
                DataValue::from("x"),
                DataValue::Null,
                DataValue::from("hi"),
            ]
        );
    }

    #[test]
    fn test_bound_parameters() {
        let mut adapter = memory();
        let table = adapter
            .query(
                "test",
                "SELECT ? AS a, ? AS b, ? AS c",
                &[DataValue::Bool(true), DataValue::from("it's"), DataValue::Null],
                "result",
            )
            .unwrap();
        assert_eq!(
            table.row(0).unwrap(),
            [DataValue::Int(1), DataValue::from("it's"), DataValue::Null]
        );
    }

    #[test]
    fn test_syntax_error_is_query_error() {
        let mut adapter = memory();
        let err = adapter.query("test", "SELEC 1", &[], "r").unwrap_err();
        assert_eq!(err.kind(), "QueryError");

        let err = adapter
            .query("test", "SELECT * FROM missing_table", &[], "r")
            .unwrap_err();
        assert_eq!(err.kind(), "QueryError");
    }
}
