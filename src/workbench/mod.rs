//! SQL工作台
//!
//! [`SqlWorkbench`] 把电子表格导入、整表写入和五种基础查询封装在一起：
//! 全表查询、指定列查询、条件查询、排序查询和行数限制查询。
//! 每个查询操作都只生成一条 SQL，交给适配器执行后返回 [`Table`]。

mod sample;
mod select;

use crate::adapter::{DatabaseAdapter, create_adapter};
use crate::config::WorkbenchConfig;
use crate::error::SheetDbResult;
use crate::i18n::ErrorMessageI18n;
use crate::security::DatabaseSecurityValidator;
use crate::source::ExcelReader;
use crate::table::Table;
use rat_logger::info;
use std::path::Path;

pub use sample::{EXAMPLE_TABLE_NAME, example_employee_table};

/// SQL学习工作台
pub struct SqlWorkbench {
    config: WorkbenchConfig,
    adapter: Box<dyn DatabaseAdapter>,
    reader: ExcelReader,
    validator: DatabaseSecurityValidator,
}

impl SqlWorkbench {
    /// 按配置打开工作台
    ///
    /// 打开失败时不持有任何连接
    pub fn open(config: WorkbenchConfig) -> SheetDbResult<Self> {
        ErrorMessageI18n::ensure_initialized();
        config.validate()?;
        let adapter = create_adapter(&config.store)?;
        info!("SQL工作台已打开: {}", config.store.path);
        Ok(Self::with_adapter(config, adapter))
    }

    /// 使用已有的适配器创建工作台
    pub fn with_adapter(config: WorkbenchConfig, adapter: Box<dyn DatabaseAdapter>) -> Self {
        ErrorMessageI18n::ensure_initialized();
        Self {
            config,
            adapter,
            reader: ExcelReader::new(),
            validator: DatabaseSecurityValidator::new(),
        }
    }

    pub fn config(&self) -> &WorkbenchConfig {
        &self.config
    }

    /// 未指定表名时导入使用的表名
    pub fn default_table(&self) -> &str {
        &self.config.default_table
    }

    /// 导入电子表格的第一个工作表
    ///
    /// `table_name` 为 `None` 时使用配置中的默认表名。同名表会被整体替换。
    /// 文件不存在时返回 `SourceNotFound`，此时数据库不会被写入
    pub fn import_excel<P: AsRef<Path>>(
        &mut self,
        file_path: P,
        table_name: Option<&str>,
    ) -> SheetDbResult<Table> {
        let table_name = table_name
            .unwrap_or(self.config.default_table.as_str())
            .to_string();
        self.validator.validate_table_name("import_excel", &table_name)?;

        let table = self.reader.read(file_path.as_ref())?.with_name(table_name.as_str());
        self.adapter.persist(&table_name, &table)?;

        info!(
            "已导入 {} 到表 {}: {} 行",
            file_path.as_ref().display(),
            table_name,
            table.row_count()
        );
        Ok(table)
    }

    /// 写入内存中的表，同名表会被整体替换
    pub fn import_table(&mut self, table_name: &str, table: &Table) -> SheetDbResult<()> {
        self.validator.validate_table_name("import_table", table_name)?;
        self.adapter.persist(table_name, table)
    }

    pub fn table_exists(&mut self, table_name: &str) -> SheetDbResult<bool> {
        self.adapter.table_exists(table_name)
    }

    pub fn list_tables(&mut self) -> SheetDbResult<Vec<String>> {
        self.adapter.list_tables()
    }

    pub fn table_columns(&mut self, table_name: &str) -> SheetDbResult<Vec<String>> {
        self.adapter.table_columns(table_name)
    }

    /// 删除表，返回删除前表是否存在
    pub fn drop_table(&mut self, table_name: &str) -> SheetDbResult<bool> {
        self.adapter.drop_table(table_name)
    }

    pub fn server_version(&mut self) -> SheetDbResult<String> {
        self.adapter.server_version()
    }

    /// 关闭数据库连接，重复调用无副作用
    pub fn close(&mut self) -> SheetDbResult<()> {
        self.adapter.close()
    }
}
