//! # 配置构建器模块
//!
//! 提供所有配置类型的构建器实现，支持链式调用和严格验证

pub mod store_builder;
pub mod workbench_builder;

// 重新导出所有Builder类型
pub use store_builder::StoreConfigBuilder;
pub use workbench_builder::WorkbenchConfigBuilder;
