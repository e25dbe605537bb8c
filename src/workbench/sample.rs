//! 示例数据
//!
//! 没有电子表格时用于练习的 20 名员工数据

use super::SqlWorkbench;
use crate::error::SheetDbResult;
use crate::table::Table;
use crate::types::DataValue;
use rat_logger::info;

/// 示例数据的表名
pub const EXAMPLE_TABLE_NAME: &str = "employee";

const EMPLOYEES: [(&str, &str, i64, &str, i64); 20] = [
    ("Anna Schmidt", "IT", 55000, "2020-03-15", 1),
    ("Ben Müller", "HR", 48000, "2019-07-22", 1),
    ("Clara Wagner", "IT", 62000, "2021-01-10", 1),
    ("David Koch", "Vertrieb", 51000, "2018-11-05", 1),
    ("Emma Weber", "IT", 58000, "2020-09-30", 1),
    ("Felix Becker", "Vertrieb", 49000, "2019-04-18", 0),
    ("Greta Hoffmann", "HR", 47000, "2021-06-12", 1),
    ("Hans Schulz", "IT", 65000, "2017-08-25", 1),
    ("Ida Fischer", "Vertrieb", 52000, "2019-12-03", 1),
    ("Jonas Richter", "IT", 59000, "2020-05-20", 1),
    ("Klara Braun", "HR", 46000, "2021-03-08", 1),
    ("Leon Wolf", "Vertrieb", 50000, "2018-09-15", 0),
    ("Maria Klein", "IT", 61000, "2020-11-22", 1),
    ("Noah Schröder", "Vertrieb", 53000, "2019-02-14", 1),
    ("Olivia Neumann", "HR", 45000, "2021-07-30", 1),
    ("Paul Schwarz", "IT", 67000, "2017-05-11", 1),
    ("Quinn Zimmermann", "Vertrieb", 54000, "2019-10-28", 1),
    ("Rosa Krüger", "IT", 63000, "2020-02-17", 1),
    ("Simon Hartmann", "HR", 44000, "2021-04-05", 0),
    ("Tina Lange", "Vertrieb", 56000, "2018-12-20", 1),
];

/// 构建员工示例表
///
/// 列为 `id, name, department, salary, date of hire, active`，
/// `active` 为 0/1 整数
pub fn example_employee_table() -> SheetDbResult<Table> {
    let columns = ["id", "name", "department", "salary", "date of hire", "active"]
        .iter()
        .map(|c| c.to_string())
        .collect();

    let rows = EMPLOYEES
        .iter()
        .zip(1i64..)
        .map(|(&(name, department, salary, hired, active), id)| {
            vec![
                DataValue::Int(id),
                DataValue::from(name),
                DataValue::from(department),
                DataValue::Int(salary),
                DataValue::from(hired),
                DataValue::Int(active),
            ]
        })
        .collect();

    Table::new(EXAMPLE_TABLE_NAME, columns, rows)
}

impl SqlWorkbench {
    /// 创建并写入员工示例表，已有的 `employee` 表会被替换
    pub fn create_example_data(&mut self) -> SheetDbResult<Table> {
        let table = example_employee_table()?;
        self.import_table(EXAMPLE_TABLE_NAME, &table)?;
        info!("示例数据已创建: {} 名员工写入表 {}", table.row_count(), EXAMPLE_TABLE_NAME);
        Ok(table)
    }
}
