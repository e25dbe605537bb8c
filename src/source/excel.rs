//! 电子表格读取器
//!
//! 支持 xlsx / xlsm / xls / xlsb / ods，只读取第一个工作表。
//! 第一行是表头，其余行按原顺序成为数据行。

use crate::error::SheetDbResult;
use crate::table::Table;
use crate::types::DataValue;
use calamine::{Data, DataType, Reader, open_workbook_auto};
use rat_logger::{debug, info};
use std::collections::HashSet;
use std::path::Path;

/// 日期时间单元格的输出格式
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 电子表格读取器
#[derive(Debug, Clone, Copy, Default)]
pub struct ExcelReader;

impl ExcelReader {
    pub fn new() -> Self {
        Self
    }

    /// 读取电子表格的第一个工作表
    ///
    /// 表名取文件名（不含扩展名）。文件不存在时返回 `SourceNotFound`，
    /// 在尝试打开之前检查；无法解析、没有工作表或没有表头时返回
    /// `SourceFormatError`
    pub fn read<P: AsRef<Path>>(&self, file_path: P) -> SheetDbResult<Table> {
        let path = file_path.as_ref();
        let display = path.display().to_string();

        if !path.exists() {
            return Err(crate::quick_error!(not_found, display));
        }

        let mut workbook = open_workbook_auto(path).map_err(|e| {
            let message = e.to_string();
            crate::quick_error!(
                format,
                display,
                crate::i18n::tf(
                    "error.source_open",
                    &[("path", display.as_str()), ("message", message.as_str())],
                )
            )
        })?;

        let range = match workbook.worksheet_range_at(0) {
            Some(Ok(range)) => range,
            Some(Err(e)) => {
                let message = e.to_string();
                return Err(crate::quick_error!(
                    format,
                    display,
                    crate::i18n::tf(
                        "error.source_open",
                        &[("path", display.as_str()), ("message", message.as_str())],
                    )
                ));
            }
            None => {
                return Err(crate::quick_error!(
                    format,
                    display,
                    crate::i18n::tf("error.source_no_sheet", &[("path", display.as_str())])
                ));
            }
        };

        let mut rows = range.rows();
        let header = match rows.next() {
            Some(header) if !range.is_empty() => header,
            _ => {
                return Err(crate::quick_error!(
                    format,
                    display,
                    crate::i18n::tf("error.source_no_header", &[("path", display.as_str())])
                ));
            }
        };

        let columns = unique_headers(header);
        let mut data: Vec<Vec<DataValue>> = rows
            .map(|row| row.iter().map(convert_cell).collect())
            .collect();
        normalize_numeric_columns(&mut data, columns.len());

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let table = Table::new(name, columns, data)?;

        debug!("电子表格列名: {:?}", table.columns());
        info!(
            "已读取电子表格 {}: {} 行, {} 列",
            display,
            table.row_count(),
            table.column_count()
        );
        Ok(table)
    }
}

/// 读取电子表格的第一个工作表
pub fn read_table<P: AsRef<Path>>(file_path: P) -> SheetDbResult<Table> {
    ExcelReader::new().read(file_path)
}

/// 表头单元格转换为列名，空单元格返回 `None`
fn header_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => integral_value(*f)
            .map(|i| i.to_string())
            .unwrap_or_else(|| f.to_string()),
        Data::Bool(b) => b.to_string(),
        other => match convert_cell(other) {
            DataValue::String(s) => s,
            value => value.to_string(),
        },
    };
    if text.is_empty() { None } else { Some(text) }
}

/// 生成唯一列名
///
/// 空表头为 `Unnamed: <下标>`，重复的列名依次追加 `.1`、`.2`，首次出现的保持原名。
/// SQLite 列名不区分大小写，因此只有大小写不同的列名也视为重复
fn unique_headers(header: &[Data]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut columns = Vec::with_capacity(header.len());

    for (index, cell) in header.iter().enumerate() {
        let base = header_text(cell).unwrap_or_else(|| format!("Unnamed: {}", index));
        let mut name = base.clone();
        let mut suffix = 1;
        while seen.contains(&name.to_lowercase()) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        seen.insert(name.to_lowercase());
        columns.push(name);
    }
    columns
}

/// 单元格转换
fn convert_cell(cell: &Data) -> DataValue {
    match cell {
        Data::Empty | Data::Error(_) => DataValue::Null,
        Data::String(s) => DataValue::String(s.clone()),
        Data::Bool(b) => DataValue::Bool(*b),
        Data::Int(i) => DataValue::Int(*i),
        Data::Float(f) => DataValue::Float(*f),
        Data::DateTime(_) => {
            let datetime: Option<chrono::NaiveDateTime> = cell.as_datetime();
            match datetime {
                Some(datetime) => DataValue::String(datetime.format(DATETIME_FORMAT).to_string()),
                None => DataValue::String(cell.to_string()),
            }
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => DataValue::String(s.clone()),
    }
}

/// 浮点数是整数且在 i64 范围内时返回对应整数
fn integral_value(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// 按列统一数值类型
///
/// 一列中的浮点数全部是整数时收窄为整数；只要有一个非整数，
/// 该列的所有整数都放宽为浮点数
fn normalize_numeric_columns(rows: &mut [Vec<DataValue>], width: usize) {
    for column in 0..width {
        let all_integral = rows.iter().all(|row| match &row[column] {
            DataValue::Float(f) => integral_value(*f).is_some(),
            _ => true,
        });

        crate::debug_log!(
            "第 {} 列数值{}",
            column,
            if all_integral { "按整数处理" } else { "按浮点数处理" }
        );

        for row in rows.iter_mut() {
            let cell = &mut row[column];
            match *cell {
                DataValue::Float(f) if all_integral => {
                    if let Some(i) = integral_value(f) {
                        *cell = DataValue::Int(i);
                    }
                }
                DataValue::Int(i) if !all_integral => *cell = DataValue::Float(i as f64),
                _ => {}
            }
        }
    }
}
