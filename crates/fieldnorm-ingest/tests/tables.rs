use std::fs;

use fieldnorm_ingest::{Delimiter, IngestError, load_run_config, read_table, write_table};
use fieldnorm_model::{CleanedTable, Column, FieldKind, StructuralError};
use tempfile::tempdir;

#[test]
fn round_trips_through_files() {
    let dir = tempdir().expect("temp dir");
    let input = dir.path().join("in.csv");
    fs::write(&input, "name;note\nAnn;\"a;b\"\nBob;\n").expect("write input");

    let table = read_table(&input, Delimiter::Semicolon).expect("read table");
    assert_eq!(table.column("note").unwrap().cells, vec!["a;b", ""]);

    let output = dir.path().join("out.csv");
    let cleaned = CleanedTable::from_columns(table.columns.clone());
    write_table(&output, &cleaned, Delimiter::Semicolon).expect("write table");
    let text = fs::read_to_string(&output).expect("read output");
    assert_eq!(text, "name;note\nAnn;\"a;b\"\nBob;\n");
}

#[test]
fn quotes_only_when_needed() {
    let dir = tempdir().expect("temp dir");
    let output = dir.path().join("out.csv");
    let cleaned = CleanedTable::from_columns(vec![
        Column::from_strs("amount", &["1234.50", "1,5"]),
        Column::from_strs("note", &["say \"hi\"", "two\nlines"]),
    ]);
    write_table(&output, &cleaned, Delimiter::Comma).expect("write table");
    let text = fs::read_to_string(&output).expect("read output");
    insta::assert_snapshot!(text.trim_end(), @r#"
    amount,note
    1234.50,"say ""hi"""
    "1,5","two
    lines"
    "#);
}

#[test]
fn tab_delimited_input() {
    let dir = tempdir().expect("temp dir");
    let input = dir.path().join("in.tsv");
    fs::write(&input, "a\tb\n1,5\t2\n").expect("write input");
    let delimiter = Delimiter::for_path(&input).unwrap_or_default();
    let table = read_table(&input, delimiter).expect("read table");
    assert_eq!(table.column_names(), vec!["a", "b"]);
    assert_eq!(table.column("a").unwrap().cells, vec!["1,5"]);
}

#[test]
fn missing_and_malformed_inputs() {
    let dir = tempdir().expect("temp dir");
    let missing = read_table(&dir.path().join("nope.csv"), Delimiter::Comma).unwrap_err();
    assert!(matches!(missing, IngestError::FileNotFound { .. }));

    let ragged = dir.path().join("ragged.csv");
    fs::write(&ragged, "a,b\n1,2,3\n").expect("write input");
    let err = read_table(&ragged, Delimiter::Comma).unwrap_err();
    assert!(matches!(
        err,
        IngestError::Structure {
            source: StructuralError::RaggedRow { row: 0, .. },
            ..
        }
    ));

    let binary = dir.path().join("binary.csv");
    fs::write(&binary, b"a,b\n\xff\xfe,1\n").expect("write input");
    let err = read_table(&binary, Delimiter::Comma).unwrap_err();
    assert!(err.is_structural());
}

#[test]
fn loads_configuration_files() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("run.toml");
    fs::write(
        &path,
        "delimiter = \"semicolon\"\n\n[columns.phone]\nkind = \"phone\"\ndefault_calling_code = \"0033\"\n",
    )
    .expect("write config");
    let (config, delimiter) = load_run_config(&path).expect("load config");
    assert_eq!(delimiter, Some(Delimiter::Semicolon));
    let phone = config.column_config("phone").unwrap();
    assert_eq!(phone.kind, Some(FieldKind::Phone));
    assert_eq!(
        config.options_for("phone").unwrap().phone.default_calling_code.as_deref(),
        Some("33")
    );
}
