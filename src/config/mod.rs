//! # 配置管理模块
//!
//! 提供统一的配置管理系统，支持构建器模式和链式配置
//! 严格遵循项目规范：所有配置项必须显式设置，严禁使用默认值

pub mod builders;
pub mod convenience;
pub mod core;

pub use builders::{StoreConfigBuilder, WorkbenchConfigBuilder};
pub use convenience::{DEFAULT_TABLE_NAME, memory_workbench_config, workbench_config};
pub use core::{MEMORY_DATABASE_PATH, StoreConfig, WorkbenchConfig};
