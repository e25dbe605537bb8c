//! SqlWorkbench 集成测试：内存表导入与五种查询

use anyhow::Result;
use rat_sheetdb::{
    DataValue, SqlWorkbench, Table, memory_workbench_config, workbench_config,
};

fn scores_table() -> Result<Table> {
    Ok(Table::new(
        "scores",
        vec!["id".into(), "name".into(), "score".into()],
        vec![
            vec![1.into(), "A".into(), 10.into()],
            vec![2.into(), "B".into(), 30.into()],
            vec![3.into(), "C".into(), 20.into()],
        ],
    )?)
}

fn workbench_with_scores() -> Result<SqlWorkbench> {
    let mut workbench = SqlWorkbench::open(memory_workbench_config()?)?;
    workbench.import_table("T", &scores_table()?)?;
    Ok(workbench)
}

fn row(id: i64, name: &str, score: i64) -> Vec<DataValue> {
    vec![DataValue::Int(id), DataValue::from(name), DataValue::Int(score)]
}

#[test]
fn test_concrete_scenario() -> Result<()> {
    let mut workbench = workbench_with_scores()?;

    let ordered = workbench.select_ordered("T", "score", "descending")?;
    assert_eq!(ordered.rows(), [row(2, "B", 30), row(3, "C", 20), row(1, "A", 10)]);

    let limited = workbench.select_limited("T", 2)?;
    assert_eq!(limited.rows(), [row(1, "A", 10), row(2, "B", 30)]);
    Ok(())
}

#[test]
fn test_select_all_round_trip() -> Result<()> {
    let mut workbench = workbench_with_scores()?;
    let all = workbench.select_all("T")?;

    assert_eq!(all.name(), "T");
    assert_eq!(all.columns(), ["id", "name", "score"]);
    assert_eq!(all.row_count(), 3);
    assert_eq!(all.rows(), scores_table()?.rows());
    Ok(())
}

#[test]
fn test_select_columns_in_requested_order() -> Result<()> {
    let mut workbench = workbench_with_scores()?;
    let result = workbench.select_columns("T", &["score", "id"])?;

    assert_eq!(result.columns(), ["score", "id"]);
    assert_eq!(
        result.row(1),
        Some([DataValue::Int(30), DataValue::Int(2)].as_slice())
    );
    Ok(())
}

#[test]
fn test_select_limited_bounds() -> Result<()> {
    let mut workbench = workbench_with_scores()?;

    let none = workbench.select_limited("T", 0)?;
    assert!(none.is_empty());
    assert_eq!(none.columns(), ["id", "name", "score"]);

    let all = workbench.select_all("T")?;
    for count in [3, 4, 1000] {
        assert_eq!(workbench.select_limited("T", count)?, all);
    }

    let err = workbench.select_limited("T", -5).unwrap_err();
    assert_eq!(err.kind(), "InvalidParameter");
    Ok(())
}

#[test]
fn test_select_ordered_directions() -> Result<()> {
    let mut workbench = workbench_with_scores()?;

    let ascending = workbench.select_ordered("T", "score", "ASC")?;
    let scores: Vec<i64> = ascending
        .column_values("score")
        .unwrap_or_default()
        .iter()
        .filter_map(|v| v.as_i64())
        .collect();
    assert!(scores.windows(2).all(|w| w[0] <= w[1]));

    let descending = workbench.select_ordered("T", "name", "desc")?;
    assert_eq!(descending.get(0, "name"), Some(&DataValue::from("C")));

    for bad in ["sideways", "", "DESC; DROP TABLE T"] {
        let err = workbench.select_ordered("T", "score", bad).unwrap_err();
        assert_eq!(err.kind(), "InvalidParameter");
    }
    assert_eq!(workbench.select_all("T")?.row_count(), 3);
    Ok(())
}

#[test]
fn test_select_where_filters_and_rejects_injection() -> Result<()> {
    let mut workbench = workbench_with_scores()?;

    let result = workbench.select_where("T", "score >= 20 AND name != 'C'")?;
    assert_eq!(result.rows(), [row(2, "B", 30)]);

    let result = workbench.select_where("T", "name IN ('A', 'C') OR score > 100")?;
    assert_eq!(result.row_count(), 2);

    let result = workbench.select_where("T", "name LIKE 'b%'")?;
    assert_eq!(result.row_count(), 1);

    for attack in [
        "1=1; DROP TABLE T",
        "id = 1; DROP TABLE T",
        "id IN (SELECT id FROM T)",
        "id = (SELECT 1)",
        "length(name) > 0",
        "id = score",
    ] {
        let err = workbench.select_where("T", attack).unwrap_err();
        assert_eq!(err.kind(), "InvalidParameter", "应拒绝条件 {:?}", attack);
    }

    let err = workbench.select_where("T", "salary > 1").unwrap_err();
    assert_eq!(err.kind(), "QueryError");
    assert_eq!(workbench.select_all("T")?.row_count(), 3);
    Ok(())
}

#[test]
fn test_unknown_table_and_column() -> Result<()> {
    let mut workbench = workbench_with_scores()?;

    assert_eq!(workbench.select_all("Missing").unwrap_err().kind(), "QueryError");
    assert_eq!(workbench.select_limited("Missing", 1).unwrap_err().kind(), "QueryError");
    assert_eq!(
        workbench.select_ordered("T", "nope", "asc").unwrap_err().kind(),
        "QueryError"
    );
    assert_eq!(
        workbench.select_all("T; DROP TABLE T").unwrap_err().kind(),
        "InvalidParameter"
    );
    Ok(())
}

#[test]
fn test_reimport_replaces_table() -> Result<()> {
    let mut workbench = workbench_with_scores()?;

    let replacement = Table::new(
        "other",
        vec!["city".into()],
        vec![vec!["Berlin".into()], vec!["Hamburg".into()]],
    )?;
    workbench.import_table("T", &replacement)?;

    assert_eq!(workbench.list_tables()?, ["T"]);
    let all = workbench.select_all("T")?;
    assert_eq!(all.columns(), ["city"]);
    assert_eq!(all.row_count(), 2);
    Ok(())
}

#[test]
fn test_import_rejects_case_clashing_columns() -> Result<()> {
    let mut workbench = workbench_with_scores()?;

    let clashing = Table::new(
        "clash",
        vec!["Name".into(), "name".into()],
        vec![vec!["a".into(), "b".into()]],
    )?;
    let err = workbench.import_table("T", &clashing).unwrap_err();
    assert_eq!(err.kind(), "InvalidParameter");
    assert_eq!(workbench.select_all("T")?.rows(), scores_table()?.rows());
    Ok(())
}

#[test]
fn test_example_data() -> Result<()> {
    let mut workbench = SqlWorkbench::open(memory_workbench_config()?)?;
    let created = workbench.create_example_data()?;
    assert_eq!(created.row_count(), 20);

    let it = workbench.select_where("employee", "department = 'IT' AND salary > 60000")?;
    let names: Vec<&str> = it
        .column_values("name")
        .unwrap_or_default()
        .into_iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert_eq!(
        names,
        ["Clara Wagner", "Hans Schulz", "Maria Klein", "Paul Schwarz", "Rosa Krüger"]
    );

    let hired = workbench.select_columns("employee", &["date of hire"])?;
    assert_eq!(hired.get(0, "date of hire"), Some(&DataValue::from("2020-03-15")));

    let top = workbench.select_ordered("employee", "salary", "descending")?;
    assert_eq!(top.get(0, "name"), Some(&DataValue::from("Paul Schwarz")));
    Ok(())
}

#[test]
fn test_file_store_survives_reopen() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("learningproject.db");
    let path = path.to_string_lossy().into_owned();

    {
        let mut workbench = SqlWorkbench::open(workbench_config(path.as_str())?)?;
        workbench.import_table("T", &scores_table()?)?;
        workbench.close()?;
        workbench.close()?;
    }

    let mut workbench = SqlWorkbench::open(workbench_config(path.as_str())?)?;
    assert!(workbench.table_exists("T")?);
    assert_eq!(workbench.table_columns("T")?, ["id", "name", "score"]);
    assert_eq!(workbench.select_all("T")?.row_count(), 3);

    assert!(workbench.drop_table("T")?);
    assert!(workbench.list_tables()?.is_empty());
    Ok(())
}

#[test]
fn test_storage_unavailable() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("missing").join("x.db");

    let err = SqlWorkbench::open(workbench_config(path.to_string_lossy())?)
        .err()
        .map(|e| e.kind());
    assert_eq!(err, Some("StorageUnavailable"));
    Ok(())
}

#[test]
fn test_independent_stores() -> Result<()> {
    let mut first = workbench_with_scores()?;
    let mut second = SqlWorkbench::open(memory_workbench_config()?)?;

    assert!(first.table_exists("T")?);
    assert!(!second.table_exists("T")?);
    assert!(second.server_version()?.starts_with('3'));
    Ok(())
}
