//! 标识符安全验证工具
//!
//! 表名、列名在拼接进 SQL 之前必须经过这里的验证与加引号处理，
//! 字面量则一律走绑定参数，防止SQL注入。

use crate::error::{SheetDbError, SheetDbResult};

/// 表名最大长度
const MAX_TABLE_NAME_LENGTH: usize = 64;

/// 列名最大长度（列名来自电子表格表头，允许空格等字符）
const MAX_COLUMN_NAME_LENGTH: usize = 128;

/// 表名不能使用的SQL关键字
const SQL_KEYWORDS: &[&str] = &[
    "SELECT", "FROM", "WHERE", "INSERT", "UPDATE", "DELETE", "CREATE", "DROP", "ALTER", "TABLE",
    "INDEX", "DATABASE", "SCHEMA", "VIEW", "TRIGGER", "TRANSACTION", "COMMIT", "ROLLBACK",
    "PRIMARY", "FOREIGN", "REFERENCES", "CONSTRAINT", "AND", "OR", "NOT", "NULL", "ORDER", "GROUP",
    "BY", "LIMIT", "OFFSET", "UNION", "JOIN", "PRAGMA", "ATTACH", "DETACH", "VACUUM",
];

/// SQLite 标识符验证器
#[derive(Debug, Clone, Copy, Default)]
pub struct DatabaseSecurityValidator;

impl DatabaseSecurityValidator {
    /// 创建新的安全验证器
    pub fn new() -> Self {
        Self
    }

    /// 验证表名的安全性
    ///
    /// # 参数
    /// * `operation` - 调用方操作名，用于错误上下文
    /// * `table_name` - 表名
    ///
    /// # 返回值
    /// * `Ok(())` - 表名安全
    /// * `Err(SheetDbError::InvalidParameter)` - 表名包含非法内容
    pub fn validate_table_name(&self, operation: &str, table_name: &str) -> SheetDbResult<()> {
        let reject = |reason: String| {
            Err(SheetDbError::invalid_parameter(operation, "table", &reason))
        };

        let first = match table_name.chars().next() {
            Some(c) => c,
            None => return reject("表名不能为空".to_string()),
        };

        if table_name.len() > MAX_TABLE_NAME_LENGTH {
            return reject(format!("表名长度不能超过{}个字符", MAX_TABLE_NAME_LENGTH));
        }

        // 检查第一个字符不能是数字
        if first.is_ascii_digit() {
            return reject(format!("表名 '{}' 不能以数字开头", table_name));
        }

        // 检查表名只包含安全字符
        for (i, ch) in table_name.chars().enumerate() {
            if !ch.is_ascii_alphanumeric() && ch != '_' {
                return reject(format!("表名包含非法字符 '{}' 在位置 {}", ch, i));
            }
        }

        // SQLite 内部表
        if table_name.to_ascii_lowercase().starts_with("sqlite_") {
            return reject(format!("表名不能以 sqlite_ 开头: {}", table_name));
        }

        let upper_name = table_name.to_ascii_uppercase();
        if SQL_KEYWORDS.contains(&upper_name.as_str()) {
            return reject(format!("表名不能使用SQL关键字: {}", table_name));
        }

        Ok(())
    }

    /// 验证列名的安全性
    ///
    /// 列名来自电子表格表头，可能包含空格、中文、换行等字符，因此只拒绝
    /// 空名称、过长名称以及 NUL 字符；安全性由加引号保证。
    pub fn validate_column_name(&self, operation: &str, column_name: &str) -> SheetDbResult<()> {
        if column_name.is_empty() {
            return Err(SheetDbError::invalid_parameter(operation, "column", "列名不能为空"));
        }

        if column_name.chars().count() > MAX_COLUMN_NAME_LENGTH {
            return Err(SheetDbError::invalid_parameter(
                operation,
                "column",
                &format!("列名长度不能超过{}个字符", MAX_COLUMN_NAME_LENGTH),
            ));
        }

        // SQLite 标识符以 NUL 结尾
        if column_name.contains('\0') {
            return Err(SheetDbError::invalid_parameter(
                operation,
                "column",
                &format!("列名 '{}' 包含 NUL 字符", column_name.escape_debug()),
            ));
        }

        Ok(())
    }

    /// 获取安全的表标识符
    ///
    /// 验证表名并返回加了双引号的标识符
    pub fn get_safe_table_identifier(&self, operation: &str, table_name: &str) -> SheetDbResult<String> {
        self.validate_table_name(operation, table_name)?;
        Ok(quote_identifier(table_name))
    }

    /// 获取安全的列标识符
    ///
    /// 验证列名并返回加了双引号的标识符，内部的双引号会被转义
    pub fn get_safe_field_identifier(&self, operation: &str, column_name: &str) -> SheetDbResult<String> {
        self.validate_column_name(operation, column_name)?;
        Ok(quote_identifier(column_name))
    }
}

/// 为标识符加双引号，内部的 `"` 双写转义
pub fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}
