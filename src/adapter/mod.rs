//! 数据库适配器模块
//!
//! 提供统一的数据库操作接口，屏蔽具体数据库的实现差异。
//! 适配器是同步的：每个调用在返回前完成全部工作。

use crate::config::StoreConfig;
use crate::error::SheetDbResult;
use crate::table::Table;
use crate::types::DataValue;

mod sqlite;

pub use sqlite::{SqlQueryBuilder, SqliteAdapter};

/// 数据库适配器trait，定义统一的数据库操作接口
pub trait DatabaseAdapter: Send {
    /// 数据库路径（用于日志与错误上下文）
    fn path(&self) -> &str;

    /// 持久化整张表
    ///
    /// 同名表已存在时整体替换（删除、重建、插入），不做合并
    fn persist(&mut self, table_name: &str, table: &Table) -> SheetDbResult<()>;

    /// 执行查询语句，`params` 按顺序绑定到 `?` 占位符
    ///
    /// 结果表的名字为 `result_name`，即使没有任何行也带有完整的列名
    fn query(
        &mut self,
        operation: &str,
        sql: &str,
        params: &[DataValue],
        result_name: &str,
    ) -> SheetDbResult<Table>;

    /// 检查表是否存在
    fn table_exists(&mut self, table: &str) -> SheetDbResult<bool>;

    /// 获取表的列名（按建表顺序）
    fn table_columns(&mut self, table: &str) -> SheetDbResult<Vec<String>>;

    /// 列出所有用户表（按名称排序）
    fn list_tables(&mut self) -> SheetDbResult<Vec<String>>;

    /// 删除表，返回表在删除前是否存在
    fn drop_table(&mut self, table: &str) -> SheetDbResult<bool>;

    /// 获取数据库版本信息
    fn server_version(&mut self) -> SheetDbResult<String>;

    /// 关闭连接，重复调用无副作用
    fn close(&mut self) -> SheetDbResult<()>;
}

/// 根据存储配置创建适配器
pub fn create_adapter(config: &StoreConfig) -> SheetDbResult<Box<dyn DatabaseAdapter>> {
    Ok(Box::new(SqliteAdapter::open(config)?))
}
