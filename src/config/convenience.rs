//! # 便利配置函数模块
//!
//! 提供常用配置的便利函数，简化配置过程

use crate::config::core::{MEMORY_DATABASE_PATH, StoreConfig, WorkbenchConfig};
use crate::error::SheetDbResult;

/// 学习项目的默认表名
pub const DEFAULT_TABLE_NAME: &str = "Fragebogen_A";

/// 创建基于数据库文件的工作台配置
///
/// 文件不存在时自动创建，遇到锁立即报错，默认表名为 `Fragebogen_A`
///
/// # 参数
///
/// * `path` - 数据库文件路径
pub fn workbench_config<P: Into<String>>(path: P) -> SheetDbResult<WorkbenchConfig> {
    WorkbenchConfig::builder()
        .store(
            StoreConfig::builder()
                .path(path)
                .create_if_missing(true)
                .busy_timeout_ms(0)
                .build()?,
        )
        .default_table(DEFAULT_TABLE_NAME)
        .build()
}

/// 创建内存数据库工作台配置
pub fn memory_workbench_config() -> SheetDbResult<WorkbenchConfig> {
    workbench_config(MEMORY_DATABASE_PATH)
}
