//! SQLite表结构管理模块
//!
//! 建表、整表替换写入、删除以及 schema 查询

use super::adapter::SqliteAdapter;
use super::data_conversion::bind_values;
use crate::error::{SheetDbError, SheetDbResult};
use crate::security::DatabaseSecurityValidator;
use crate::table::Table;
use rat_logger::{debug, info};
use sqlx::{Connection, Row};
use std::collections::HashSet;

/// 整表写入
///
/// 在一个事务内完成 `DROP TABLE IF EXISTS`、`CREATE TABLE` 和逐行 `INSERT`，
/// 失败时事务回滚，原有的同名表保持不变
pub(crate) fn persist_table(
    adapter: &mut SqliteAdapter,
    table_name: &str,
    table: &Table,
) -> SheetDbResult<()> {
    let operation = "persist";
    let validator = DatabaseSecurityValidator::new();
    let safe_table = validator.get_safe_table_identifier(operation, table_name)?;

    if table.column_count() == 0 {
        return Err(SheetDbError::invalid_parameter(
            operation,
            "table",
            &format!("表 '{}' 没有任何列", table_name),
        ));
    }

    // SQLite 列名按 ASCII 不区分大小写比较
    let mut seen = HashSet::new();
    for column in table.columns() {
        if !seen.insert(column.to_ascii_lowercase()) {
            return Err(SheetDbError::invalid_parameter(
                operation,
                "columns",
                &format!("列名 '{}' 与其他列只有大小写不同", column),
            ));
        }
    }

    let safe_columns = table
        .columns()
        .iter()
        .map(|c| validator.get_safe_field_identifier(operation, c))
        .collect::<SheetDbResult<Vec<String>>>()?;

    let column_definitions: Vec<String> = safe_columns
        .iter()
        .zip(table.column_types())
        .map(|(column, column_type)| format!("{} {}", column, column_type.sql_type()))
        .collect();

    let drop_sql = format!("DROP TABLE IF EXISTS {}", safe_table);
    let create_sql = format!("CREATE TABLE {} ({})", safe_table, column_definitions.join(", "));
    let insert_sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        safe_table,
        safe_columns.join(", "),
        vec!["?"; safe_columns.len()].join(", ")
    );
    debug!("[{}] 建表SQL: {}", operation, create_sql);
    debug!("[{}] 插入SQL: {}", operation, insert_sql);

    let (runtime, connection) = adapter.parts()?;
    runtime
        .block_on(async {
            let mut tx = connection.begin().await?;
            sqlx::query(&drop_sql).execute(&mut *tx).await?;
            sqlx::query(&create_sql).execute(&mut *tx).await?;
            for row in table.rows() {
                bind_values(sqlx::query(&insert_sql), row)
                    .execute(&mut *tx)
                    .await?;
            }
            tx.commit().await?;
            Ok::<(), sqlx::Error>(())
        })
        .map_err(|e| {
            let message = e.to_string();
            crate::quick_error!(
                query,
                operation,
                crate::i18n::tf(
                    "error.persist",
                    &[
                        ("operation", operation),
                        ("table", table_name),
                        ("message", message.as_str()),
                    ],
                )
            )
        })?;

    info!(
        "表 {} 已写入: {} 行, {} 列",
        table_name,
        table.row_count(),
        table.column_count()
    );
    Ok(())
}

/// 检查表是否存在（表名不区分大小写，与 SQLite 一致）
pub(crate) fn table_exists(adapter: &mut SqliteAdapter, table: &str) -> SheetDbResult<bool> {
    let operation = "table_exists";
    DatabaseSecurityValidator::new().validate_table_name(operation, table)?;

    let (runtime, connection) = adapter.parts()?;
    let row = runtime
        .block_on(
            sqlx::query(
                "SELECT count(*) AS n FROM sqlite_master WHERE type = 'table' AND name = ? COLLATE NOCASE",
            )
            .bind(table)
            .fetch_one(&mut *connection),
        )
        .map_err(|e| SheetDbError::query_failed(operation, &e.to_string()))?;

    let count: i64 = row
        .try_get("n")
        .map_err(|e| SheetDbError::query_failed(operation, &e.to_string()))?;
    Ok(count > 0)
}

/// 按建表顺序返回列名
pub(crate) fn table_columns(adapter: &mut SqliteAdapter, table: &str) -> SheetDbResult<Vec<String>> {
    let operation = "table_columns";
    let safe_table =
        DatabaseSecurityValidator::new().get_safe_table_identifier(operation, table)?;

    let sql = format!("PRAGMA table_info({})", safe_table);
    let (runtime, connection) = adapter.parts()?;
    let rows = runtime
        .block_on(sqlx::query(&sql).fetch_all(&mut *connection))
        .map_err(|e| SheetDbError::query_failed(operation, &e.to_string()))?;

    if rows.is_empty() {
        return Err(SheetDbError::table_not_found(operation, table));
    }

    rows.iter()
        .map(|row| {
            row.try_get::<String, _>("name")
                .map_err(|e| SheetDbError::query_failed(operation, &e.to_string()))
        })
        .collect()
}

/// 列出所有用户表，不含 `sqlite_` 开头的内部表
pub(crate) fn list_tables(adapter: &mut SqliteAdapter) -> SheetDbResult<Vec<String>> {
    let operation = "list_tables";
    let (runtime, connection) = adapter.parts()?;
    let rows = runtime
        .block_on(
            sqlx::query(
                "SELECT name FROM sqlite_master WHERE type = 'table' \
                 AND substr(name, 1, 7) != 'sqlite_' ORDER BY name",
            )
            .fetch_all(&mut *connection),
        )
        .map_err(|e| SheetDbError::query_failed(operation, &e.to_string()))?;

    rows.iter()
        .map(|row| {
            row.try_get::<String, _>("name")
                .map_err(|e| SheetDbError::query_failed(operation, &e.to_string()))
        })
        .collect()
}

/// 删除表，返回删除前表是否存在
pub(crate) fn drop_table(adapter: &mut SqliteAdapter, table: &str) -> SheetDbResult<bool> {
    let operation = "drop_table";
    let safe_table =
        DatabaseSecurityValidator::new().get_safe_table_identifier(operation, table)?;
    let existed = table_exists(adapter, table)?;

    let sql = format!("DROP TABLE IF EXISTS {}", safe_table);
    let (runtime, connection) = adapter.parts()?;
    runtime
        .block_on(sqlx::query(&sql).execute(&mut *connection))
        .map_err(|e| SheetDbError::query_failed(operation, &e.to_string()))?;

    if existed {
        info!("表 {} 已删除", table);
    }
    Ok(existed)
}

/// SQLite 版本号
pub(crate) fn server_version(adapter: &mut SqliteAdapter) -> SheetDbResult<String> {
    let operation = "server_version";
    let (runtime, connection) = adapter.parts()?;
    let row = runtime
        .block_on(sqlx::query("SELECT sqlite_version() AS version").fetch_one(&mut *connection))
        .map_err(|e| SheetDbError::query_failed(operation, &e.to_string()))?;
    row.try_get("version")
        .map_err(|e| SheetDbError::query_failed(operation, &e.to_string()))
}

#[cfg(test)]
mod tests {
    use crate::adapter::{DatabaseAdapter, SqliteAdapter};
    use crate::config::StoreConfig;
    use crate::table::Table;
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

    fn mixed() -> Table {
        Table::new(
            "mixed",
            vec!["n".into(), "x".into(), "flag".into(), "label".into(), "empty".into()],
            vec![
                vec![1.into(), 1.5.into(), true.into(), "a".into(), DataValue::Null],
                vec![2.into(), 2.into(), false.into(), DataValue::Null, DataValue::Null],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_persist_infers_column_types() {
        let mut adapter = memory();
        adapter.persist("mixed", &mixed()).unwrap();

        let schema = adapter
            .query(
                "test",
                "SELECT name, type FROM pragma_table_info('mixed') ORDER BY cid",
                &[],
                "schema",
            )
            .unwrap();
        let types: Vec<&DataValue> = schema.column_values("type").unwrap();
        assert_eq!(
            types,
            vec![
                &DataValue::from("INTEGER"),
                &DataValue::from("REAL"),
                &DataValue::from("INTEGER"),
                &DataValue::from("TEXT"),
                &DataValue::from("TEXT"),
            ]
        );

        let rows = adapter.query("test", "SELECT * FROM \"mixed\"", &[], "mixed").unwrap();
        assert_eq!(rows.get(0, "flag"), Some(&DataValue::Int(1)));
        assert_eq!(rows.get(1, "x"), Some(&DataValue::Float(2.0)));
        assert_eq!(rows.get(1, "label"), Some(&DataValue::Null));
    }

    #[test]
    fn test_persist_replaces_existing_table() {
        let mut adapter = memory();
        adapter.persist("T", &mixed()).unwrap();

        let replacement =
            Table::new("other", vec!["only".into()], vec![vec!["z".into()]]).unwrap();
        adapter.persist("T", &replacement).unwrap();

        assert_eq!(adapter.list_tables().unwrap(), vec!["T".to_string()]);
        assert_eq!(adapter.table_columns("T").unwrap(), vec!["only".to_string()]);
        let rows = adapter.query("test", "SELECT * FROM \"T\"", &[], "T").unwrap();
        assert_eq!(rows.row_count(), 1);
    }

    #[test]
    fn test_persist_rejects_bad_input() {
        let mut adapter = memory();
        let err = adapter.persist("bad name", &mixed()).unwrap_err();
        assert_eq!(err.kind(), "InvalidParameter");

        let no_columns = Table::empty("x", Vec::new()).unwrap();
        let err = adapter.persist("x", &no_columns).unwrap_err();
        assert_eq!(err.kind(), "InvalidParameter");

        assert!(adapter.list_tables().unwrap().is_empty());
    }

    #[test]
    fn test_persist_rejects_columns_differing_only_in_case() {
        let mut adapter = memory();
        adapter.persist("T", &mixed()).unwrap();

        let clashing = Table::new(
            "clash",
            vec!["Name".into(), "name".into()],
            vec![vec!["a".into(), "b".into()]],
        )
        .unwrap();
        let err = adapter.persist("T", &clashing).unwrap_err();
        assert_eq!(err.kind(), "InvalidParameter");

        // 原表保持不变
        assert_eq!(adapter.table_columns("T").unwrap().len(), 5);
    }

    #[test]
    fn test_persist_accepts_multiline_column_names() {
        let mut adapter = memory();
        let table = Table::new(
            "multi",
            vec!["first\nname".into(), "tab\tcol".into()],
            vec![vec!["Anna".into(), 1.into()]],
        )
        .unwrap();
        adapter.persist("multi", &table).unwrap();

        assert_eq!(
            adapter.table_columns("multi").unwrap(),
            vec!["first\nname".to_string(), "tab\tcol".to_string()]
        );
    }

    #[test]
    fn test_schema_helpers() {
        let mut adapter = memory();
        assert!(!adapter.table_exists("mixed").unwrap());
        adapter.persist("mixed", &mixed()).unwrap();
        assert!(adapter.table_exists("mixed").unwrap());
        assert!(adapter.table_exists("MIXED").unwrap());

        assert_eq!(
            adapter.table_columns("mixed").unwrap(),
            ["n", "x", "flag", "label", "empty"]
        );
        assert_eq!(adapter.table_columns("absent").unwrap_err().kind(), "QueryError");

        assert!(adapter.drop_table("mixed").unwrap());
        assert!(!adapter.drop_table("mixed").unwrap());
        assert!(!adapter.table_exists("mixed").unwrap());
    }
}
