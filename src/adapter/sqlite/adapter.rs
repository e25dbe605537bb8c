//! SQLite适配器核心模块
//!
//! 适配器独占一个连接和一个单线程运行时，同步接口内部用 `block_on`
//! 驱动 sqlx 的异步调用。进程内没有全局连接状态，多个适配器互不影响。

use crate::adapter::DatabaseAdapter;
use crate::config::StoreConfig;
use crate::error::{SheetDbError, SheetDbResult};
use crate::table::Table;
use crate::types::DataValue;
use rat_logger::{debug, info, warn};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};
use std::str::FromStr;
use std::time::Duration;
use tokio::runtime::Runtime;

/// SQLite适配器
pub struct SqliteAdapter {
    /// 数据库路径
    path: String,
    /// 驱动 sqlx 的单线程运行时
    runtime: Runtime,
    /// 连接，关闭后为 `None`
    connection: Option<SqliteConnection>,
}

impl SqliteAdapter {
    /// 打开（或创建）数据库
    ///
    /// 不会创建父目录；路径不可访问、文件不是数据库、或文件不存在且
    /// `create_if_missing` 为 false 时返回 `StorageUnavailable`
    pub fn open(config: &StoreConfig) -> SheetDbResult<Self> {
        config.validate()?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                let reason = crate::i18n::tf(
                    "error.runtime_create",
                    &[("message", e.to_string().as_str())],
                );
                SheetDbError::storage_unavailable(&config.path, &reason)
            })?;

        let options = if config.is_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| SheetDbError::storage_unavailable(&config.path, &e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&config.path)
                .create_if_missing(config.create_if_missing)
        };
        let options = options.busy_timeout(Duration::from_millis(config.busy_timeout_ms));

        let mut connection = runtime
            .block_on(options.connect())
            .map_err(|e| SheetDbError::storage_unavailable(&config.path, &e.to_string()))?;

        // 连接建立不代表文件是合法的数据库，读取一次 schema 才能确认
        if let Err(e) = runtime.block_on(
            sqlx::query("SELECT count(*) FROM sqlite_master").fetch_one(&mut connection),
        ) {
            let _ = runtime.block_on(connection.close());
            return Err(SheetDbError::storage_unavailable(&config.path, &e.to_string()));
        }

        info!("SQLite数据库已打开: {}", config.path);
        Ok(Self {
            path: config.path.clone(),
            runtime,
            connection: Some(connection),
        })
    }

    /// 连接是否仍然打开
    pub fn is_open(&self) -> bool {
        self.connection.is_some()
    }

    /// 同时借出运行时和连接
    pub(crate) fn parts(&mut self) -> SheetDbResult<(&Runtime, &mut SqliteConnection)> {
        let path = &self.path;
        let connection = self.connection.as_mut().ok_or_else(|| {
            crate::quick_error!(
                storage,
                path,
                crate::i18n::tf("error.storage_closed", &[("path", path.as_str())])
            )
        })?;
        Ok((&self.runtime, connection))
    }
}

impl DatabaseAdapter for SqliteAdapter {
    fn path(&self) -> &str {
        &self.path
    }

    fn persist(&mut self, table_name: &str, table: &Table) -> SheetDbResult<()> {
        super::schema::persist_table(self, table_name, table)
    }

    fn query(
        &mut self,
        operation: &str,
        sql: &str,
        params: &[DataValue],
        result_name: &str,
    ) -> SheetDbResult<Table> {
        super::query::execute_query(self, operation, sql, params, result_name)
    }

    fn table_exists(&mut self, table: &str) -> SheetDbResult<bool> {
        super::schema::table_exists(self, table)
    }

    fn table_columns(&mut self, table: &str) -> SheetDbResult<Vec<String>> {
        super::schema::table_columns(self, table)
    }

    fn list_tables(&mut self) -> SheetDbResult<Vec<String>> {
        super::schema::list_tables(self)
    }

    fn drop_table(&mut self, table: &str) -> SheetDbResult<bool> {
        super::schema::drop_table(self, table)
    }

    fn server_version(&mut self) -> SheetDbResult<String> {
        super::schema::server_version(self)
    }

    fn close(&mut self) -> SheetDbResult<()> {
        match self.connection.take() {
            Some(connection) => {
                self.runtime
                    .block_on(connection.close())
                    .map_err(|e| SheetDbError::storage_unavailable(&self.path, &e.to_string()))?;
                info!("SQLite数据库已关闭: {}", self.path);
            }
            None => debug!("SQLite数据库已经关闭，忽略: {}", self.path),
        }
        Ok(())
    }
}

impl Drop for SqliteAdapter {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            if let Err(e) = self.runtime.block_on(connection.close()) {
                warn!("关闭SQLite连接失败 {}: {}", self.path, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(path: &str, create_if_missing: bool) -> StoreConfig {
        StoreConfig::builder()
            .path(path)
            .create_if_missing(create_if_missing)
            .busy_timeout_ms(0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_open_memory_and_close_twice() {
        let mut adapter = SqliteAdapter::open(&store(":memory:", true)).unwrap();
        assert!(adapter.is_open());
        assert!(adapter.server_version().unwrap().starts_with('3'));

        adapter.close().unwrap();
        adapter.close().unwrap();
        assert!(!adapter.is_open());

        let err = adapter.list_tables().unwrap_err();
        assert_eq!(err.kind(), "StorageUnavailable");
    }

    #[test]
    fn test_open_missing_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("x.db");
        let err = SqliteAdapter::open(&store(path.to_str().unwrap(), true))
            .err()
            .unwrap();
        assert_eq!(err.kind(), "StorageUnavailable");
        assert!(!path.parent().unwrap().exists());
    }

    #[test]
    fn test_open_without_create() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.db");
        let err = SqliteAdapter::open(&store(path.to_str().unwrap(), false))
            .err()
            .unwrap();
        assert_eq!(err.kind(), "StorageUnavailable");
        assert!(!path.exists());
    }

    #[test]
    fn test_open_non_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.db");
        std::fs::write(&path, vec![0x42u8; 4096]).unwrap();
        let err = SqliteAdapter::open(&store(path.to_str().unwrap(), false))
            .err()
            .unwrap();
        assert_eq!(err.kind(), "StorageUnavailable");
    }
}
