//! # 存储配置构建器模块
//!
//! 严格要求所有配置项必须显式设置，严禁使用默认值

use crate::config::core::StoreConfig;
use crate::error::SheetDbResult;

/// 存储配置构建器
#[derive(Debug, Default)]
pub struct StoreConfigBuilder {
    path: Option<String>,
    create_if_missing: Option<bool>,
    busy_timeout_ms: Option<u64>,
}

impl StoreConfigBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置数据库文件路径
    ///
    /// # 参数
    ///
    /// * `path` - 数据库文件路径，`:memory:` 表示内存数据库
    pub fn path<S: Into<String>>(mut self, path: S) -> Self {
        self.path = Some(path.into());
        self
    }

    /// 设置文件不存在时是否创建
    pub fn create_if_missing(mut self, create_if_missing: bool) -> Self {
        self.create_if_missing = Some(create_if_missing);
        self
    }

    /// 设置数据库锁等待时间（毫秒）
    pub fn busy_timeout_ms(mut self, busy_timeout_ms: u64) -> Self {
        self.busy_timeout_ms = Some(busy_timeout_ms);
        self
    }

    /// 构建存储配置
    ///
    /// # 错误
    ///
    /// 如果任何必需的配置项未设置，将返回错误
    pub fn build(self) -> SheetDbResult<StoreConfig> {
        let path = self
            .path
            .ok_or_else(|| crate::quick_error!(config, "数据库路径必须设置"))?;

        let create_if_missing = self
            .create_if_missing
            .ok_or_else(|| crate::quick_error!(config, "create_if_missing 必须设置"))?;

        let busy_timeout_ms = self
            .busy_timeout_ms
            .ok_or_else(|| crate::quick_error!(config, "busy_timeout_ms 必须设置"))?;

        let config = StoreConfig {
            path,
            create_if_missing,
            busy_timeout_ms,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_fields_required() {
        let err = StoreConfigBuilder::new()
            .path("a.db")
            .create_if_missing(true)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), "ConfigError");

        let config = StoreConfigBuilder::new()
            .path("a.db")
            .create_if_missing(true)
            .busy_timeout_ms(250)
            .build()
            .unwrap();
        assert_eq!(config.busy_timeout_ms, 250);
    }

    #[test]
    fn test_blank_path_rejected() {
        let err = StoreConfigBuilder::new()
            .path("  ")
            .create_if_missing(true)
            .busy_timeout_ms(0)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), "ConfigError");
    }
}
