//! # 配置管理模块 - 核心配置类型
//!
//! 严格遵循项目规范：所有配置项必须显式设置，严禁使用默认值

use crate::error::{SheetDbError, SheetDbResult};
use crate::security::DatabaseSecurityValidator;
use rat_logger::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// SQLite 内存数据库路径
pub const MEMORY_DATABASE_PATH: &str = ":memory:";

/// 数据库存储配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// 数据库文件路径，`:memory:` 表示内存数据库
    pub path: String,
    /// 文件不存在时是否创建
    pub create_if_missing: bool,
    /// 数据库被锁定时的等待时间（毫秒），0 表示立即报错
    pub busy_timeout_ms: u64,
}

/// 工作台配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkbenchConfig {
    /// 存储配置
    pub store: StoreConfig,
    /// 未指定表名时使用的默认表名
    pub default_table: String,
}

impl StoreConfig {
    /// 创建存储配置构建器
    pub fn builder() -> super::builders::StoreConfigBuilder {
        super::builders::StoreConfigBuilder::new()
    }

    /// 是否为内存数据库
    pub fn is_memory(&self) -> bool {
        self.path == MEMORY_DATABASE_PATH
    }

    /// 验证配置
    pub fn validate(&self) -> SheetDbResult<()> {
        if self.path.trim().is_empty() {
            return Err(crate::quick_error!(
                config,
                crate::i18n::tf("error.config", &[("message", "数据库路径不能为空")])
            ));
        }
        Ok(())
    }
}

impl WorkbenchConfig {
    /// 创建工作台配置构建器
    pub fn builder() -> super::builders::WorkbenchConfigBuilder {
        super::builders::WorkbenchConfigBuilder::new()
    }

    /// 验证配置
    pub fn validate(&self) -> SheetDbResult<()> {
        self.store.validate()?;
        DatabaseSecurityValidator::new()
            .validate_table_name("config", &self.default_table)
            .map_err(|e| {
                let reason = format!("默认表名无效: {}", e);
                crate::quick_error!(
                    config,
                    crate::i18n::tf("error.config", &[("message", reason.as_str())])
                )
            })
    }

    /// 从 TOML 文本解析配置
    pub fn from_toml_str(content: &str) -> SheetDbResult<Self> {
        let config: WorkbenchConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 从配置文件加载配置
    ///
    /// 扩展名为 `.toml` 时按 TOML 解析，否则按 JSON 解析
    ///
    /// # 参数
    ///
    /// * `config_path` - 配置文件路径
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> SheetDbResult<Self> {
        let path = config_path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            let reason = format!("读取配置文件 {:?} 失败: {}", path, e);
            crate::quick_error!(
                config,
                crate::i18n::tf("error.config", &[("message", reason.as_str())])
            )
        })?;

        let config: WorkbenchConfig = if is_toml(path) {
            toml::from_str(&content)?
        } else {
            serde_json::from_str(&content).map_err(|e| {
                let reason = format!("解析JSON配置文件失败: {}", e);
                crate::quick_error!(
                    config,
                    crate::i18n::tf("error.config", &[("message", reason.as_str())])
                )
            })?
        };
        config.validate()?;

        info!("从文件加载配置: {:?}", path);
        Ok(config)
    }

    /// 保存配置到文件
    ///
    /// # 参数
    ///
    /// * `config_path` - 配置文件路径
    pub fn save_to_file<P: AsRef<Path>>(&self, config_path: P) -> SheetDbResult<()> {
        let path = config_path.as_ref();
        let content = if is_toml(path) {
            toml::to_string_pretty(self).map_err(|e| {
                crate::quick_error!(serialization, format!("序列化TOML配置失败: {}", e))
            })?
        } else {
            serde_json::to_string_pretty(self)?
        };

        std::fs::write(path, content).map_err(|e| {
            let reason = format!("写入配置文件 {:?} 失败: {}", path, e);
            SheetDbError::ConfigError {
                message: crate::i18n::tf("error.config", &[("message", reason.as_str())]),
            }
        })?;

        info!("配置已保存到文件: {:?}", path);
        Ok(())
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
default_table = "Fragebogen_A"

[store]
path = "learningproject.db"
create_if_missing = true
busy_timeout_ms = 0
"#;

    #[test]
    fn test_from_toml_str() {
        let config = WorkbenchConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.default_table, "Fragebogen_A");
        assert_eq!(config.store.path, "learningproject.db");
        assert!(config.store.create_if_missing);
        assert!(!config.store.is_memory());
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let err = WorkbenchConfig::from_toml_str("default_table = \"T\"").unwrap_err();
        assert_eq!(err.kind(), "ConfigError");
    }

    #[test]
    fn test_invalid_default_table_is_rejected() {
        let content = SAMPLE.replace("Fragebogen_A", "bad name");
        let err = WorkbenchConfig::from_toml_str(&content).unwrap_err();
        assert_eq!(err.kind(), "ConfigError");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let config = WorkbenchConfig::from_toml_str(SAMPLE).unwrap();

        for name in ["workbench.toml", "workbench.json"] {
            let path = dir.path().join(name);
            config.save_to_file(&path).unwrap();
            assert_eq!(WorkbenchConfig::from_file(&path).unwrap(), config);
        }
    }
}
