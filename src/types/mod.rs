//! 通用数据类型
//!
//! 单元格数据值以及查询条件、排序方向等查询类型

pub mod data_value;
pub mod query;

// 重新导出所有公共类型
pub use data_value::DataValue;
pub use query::{
    LogicalOperator, QueryCondition, QueryConditionGroup, QueryOperator, SortDirection,
    parse_condition,
};
