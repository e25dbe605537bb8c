//! 多语言错误消息模块
//!
//! 使用rat_embed_lang框架提供统一的错误消息多语言支持

use once_cell::sync::OnceCell;
use rat_embed_lang::register_translations;
use std::collections::HashMap;

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// 错误消息翻译注册器
pub struct ErrorMessageI18n;

impl ErrorMessageI18n {
    /// 注册所有错误消息翻译
    pub fn register_all_translations() {
        let entries: &[(&str, &str, &str, &str)] = &[
            // 存储
            (
                "error.storage_open",
                "无法打开SQLite数据库 '{path}': {message}",
                "Cannot open SQLite database '{path}': {message}",
                "SQLiteデータベース '{path}' を開けません: {message}",
            ),
            (
                "error.runtime_create",
                "无法创建运行时: {message}",
                "Failed to create runtime: {message}",
                "ランタイムの作成に失敗しました: {message}",
            ),
            (
                "error.storage_closed",
                "数据库连接已关闭: {path}",
                "Database connection already closed: {path}",
                "データベース接続は既に閉じられています: {path}",
            ),
            // 数据源
            (
                "error.source_not_found",
                "Excel文件不存在: {path}",
                "Excel file not found: {path}",
                "Excelファイルが見つかりません: {path}",
            ),
            (
                "error.source_open",
                "无法打开电子表格 '{path}': {message}",
                "Cannot open spreadsheet '{path}': {message}",
                "スプレッドシート '{path}' を開けません: {message}",
            ),
            (
                "error.source_no_sheet",
                "电子表格不包含任何工作表: {path}",
                "Spreadsheet contains no worksheet: {path}",
                "スプレッドシートにワークシートがありません: {path}",
            ),
            (
                "error.source_no_header",
                "第一个工作表没有表头行: {path}",
                "First worksheet has no header row: {path}",
                "最初のワークシートにヘッダー行がありません: {path}",
            ),
            // 查询
            (
                "error.query",
                "[{operation}] 查询执行失败: {message}",
                "[{operation}] Query execution failed: {message}",
                "[{operation}] クエリ実行が失敗しました: {message}",
            ),
            (
                "error.table_not_found",
                "[{operation}] 表 '{table}' 不存在",
                "[{operation}] Table '{table}' does not exist",
                "[{operation}] テーブル '{table}' が存在しません",
            ),
            (
                "error.column_not_found",
                "[{operation}] 表 '{table}' 中不存在列 '{column}'",
                "[{operation}] Column '{column}' does not exist in table '{table}'",
                "[{operation}] テーブル '{table}' に列 '{column}' が存在しません",
            ),
            (
                "error.persist",
                "[{operation}] 写入表 '{table}' 失败: {message}",
                "[{operation}] Writing table '{table}' failed: {message}",
                "[{operation}] テーブル '{table}' の書き込みに失敗しました: {message}",
            ),
            // 参数
            (
                "error.invalid_parameter",
                "[{operation}] 参数 '{parameter}' 无效: {message}",
                "[{operation}] Invalid parameter '{parameter}': {message}",
                "[{operation}] パラメータ '{parameter}' が無効です: {message}",
            ),
            // 配置与序列化
            (
                "error.config",
                "配置错误: {message}",
                "Configuration error: {message}",
                "設定エラー: {message}",
            ),
            (
                "error.config_parse",
                "配置解析失败: {message}",
                "Failed to parse configuration: {message}",
                "設定の解析に失敗しました: {message}",
            ),
            (
                "error.serialization",
                "数据序列化失败: {message}",
                "Data serialization failed: {message}",
                "データシリアライズが失敗しました: {message}",
            ),
        ];

        let mut translations = HashMap::new();
        for (key, zh, en, ja) in entries {
            let mut messages = HashMap::new();
            messages.insert("zh-CN".to_string(), zh.to_string());
            messages.insert("en-US".to_string(), en.to_string());
            messages.insert("ja-JP".to_string(), ja.to_string());
            translations.insert(key.to_string(), messages);
        }

        // 注册所有翻译
        register_translations(translations);
    }

    /// 初始化错误消息多语言支持
    pub fn init() {
        Self::register_all_translations();

        // 从环境变量获取语言设置，默认为zh-CN
        let lang = std::env::var("RAT_LANG")
            .or_else(|_| std::env::var("LANG"))
            .unwrap_or_else(|_| "zh-CN".to_string());

        // 标准化语言代码
        use rat_embed_lang::normalize_language_code;
        let normalized_lang = normalize_language_code(&lang);
        set_language(&normalized_lang);
    }

    /// 只初始化一次，重复调用无副作用
    pub fn ensure_initialized() {
        INITIALIZED.get_or_init(Self::init);
    }
}

/// 重新导出rat_embed_lang的核心函数
pub use rat_embed_lang::{current_language, set_language, t, tf};
