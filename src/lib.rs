//! rat_sheetdb - 电子表格导入与SQL查询学习库
//!
//! 把电子表格的第一个工作表导入 SQLite 数据库，并通过 [`SqlWorkbench`]
//! 提供五种基础查询：全表、指定列、条件过滤、排序和行数限制。
//! 查询结果统一以 [`Table`] 返回。

// 导出所有公共模块
pub mod error;
pub mod types;
pub mod table;
pub mod security;
pub mod config;
pub mod adapter;
pub mod source;
pub mod workbench;
pub mod i18n;

// 重新导出常用类型和函数
pub use error::{SheetDbError, SheetDbResult};
pub use types::*;
pub use table::{ColumnType, Table};
pub use security::DatabaseSecurityValidator;
pub use config::{
    DEFAULT_TABLE_NAME, MEMORY_DATABASE_PATH, StoreConfig, StoreConfigBuilder, WorkbenchConfig,
    WorkbenchConfigBuilder, memory_workbench_config, workbench_config,
};
pub use adapter::{DatabaseAdapter, SqlQueryBuilder, SqliteAdapter, create_adapter};
pub use source::{ExcelReader, read_table};
pub use workbench::{EXAMPLE_TABLE_NAME, SqlWorkbench, example_employee_table};

// 条件编译调试宏 - 只有在 debug 模式下才输出调试信息
#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        rat_logger::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        // 在 release 模式下不输出调试信息
    };
}

/// 初始化rat_sheetdb库
///
/// 注册多语言错误消息并按 `RAT_LANG` / `LANG` 选择语言，重复调用无副作用。
/// [`SqlWorkbench::open`] 也会自动完成这一步
///
/// 注意：日志系统由调用者自行初始化，本库不初始化日志
pub fn init() {
    i18n::ErrorMessageI18n::ensure_initialized();
}

/// 库版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 库名称
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// 获取库信息
pub fn get_info() -> String {
    format!("{} v{}", NAME, VERSION)
}
