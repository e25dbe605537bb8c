//! 表格数据源模块
//!
//! 读取电子表格的第一个工作表，转换为 [`Table`](crate::table::Table)

pub mod excel;

pub use excel::{ExcelReader, read_table};
