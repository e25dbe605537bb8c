//! # 工作台配置构建器模块
//!
//! 提供工作台配置的构建器实现，支持链式调用和严格验证

use crate::config::core::{StoreConfig, WorkbenchConfig};
use crate::error::SheetDbResult;

/// 工作台配置构建器
#[derive(Debug, Default)]
pub struct WorkbenchConfigBuilder {
    store: Option<StoreConfig>,
    default_table: Option<String>,
}

impl WorkbenchConfigBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置存储配置
    pub fn store(mut self, store: StoreConfig) -> Self {
        self.store = Some(store);
        self
    }

    /// 设置默认表名
    pub fn default_table<S: Into<String>>(mut self, default_table: S) -> Self {
        self.default_table = Some(default_table.into());
        self
    }

    /// 构建工作台配置
    pub fn build(self) -> SheetDbResult<WorkbenchConfig> {
        let store = self
            .store
            .ok_or_else(|| crate::quick_error!(config, "存储配置必须设置"))?;

        let default_table = self
            .default_table
            .ok_or_else(|| crate::quick_error!(config, "默认表名必须设置"))?;

        let config = WorkbenchConfig {
            store,
            default_table,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_validates_default_table() {
        let store = StoreConfig::builder()
            .path(":memory:")
            .create_if_missing(true)
            .busy_timeout_ms(0)
            .build()
            .unwrap();

        let err = WorkbenchConfigBuilder::new()
            .store(store.clone())
            .default_table("select")
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), "ConfigError");

        let config = WorkbenchConfigBuilder::new()
            .store(store)
            .default_table("employee")
            .build()
            .unwrap();
        assert!(config.store.is_memory());
    }

    #[test]
    fn test_store_required() {
        assert!(WorkbenchConfigBuilder::new().default_table("T").build().is_err());
    }
}
