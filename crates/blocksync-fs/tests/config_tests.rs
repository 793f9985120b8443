use blocksync_fs::{ConfigStore, Error, NormalizedPath};
use pretty_assertions::assert_eq;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use tempfile::TempDir;

#[derive(Debug, Deserialize, PartialEq)]
struct Sample {
    name: String,
    count: u32,
}

#[test]
fn test_load_toml_json_yaml() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.toml"), "name = \"x\"\ncount = 1\n").unwrap();
    fs::write(temp.path().join("a.json"), r#"{"name": "x", "count": 1}"#).unwrap();
    fs::write(temp.path().join("a.yml"), "name: x\ncount: 1\n").unwrap();

    let store = ConfigStore::new();
    let expected = Sample {
        name: "x".into(),
        count: 1,
    };
    for file in ["a.toml", "a.json", "a.yml"] {
        let loaded: Sample = store
            .load(&NormalizedPath::new(temp.path().join(file)))
            .unwrap();
        assert_eq!(loaded, expected, "{}", file);
    }
}

#[test]
fn test_load_flat_table() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("iso.json");
    fs::write(&path, r#"{"en": "English", "nl": "Dutch"}"#).unwrap();

    let table: BTreeMap<String, String> = ConfigStore::new()
        .load(&NormalizedPath::new(&path))
        .unwrap();
    assert_eq!(table.get("nl").map(String::as_str), Some("Dutch"));
}

#[test]
fn test_unsupported_extension() {
    let result: Result<Sample, _> = ConfigStore::new().load(&NormalizedPath::new("table.csv"));
    assert!(matches!(result, Err(Error::UnsupportedFormat { extension }) if extension == "csv"));
}

#[test]
fn test_parse_error_names_format_and_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.json");
    fs::write(&path, "{not json").unwrap();

    let err = ConfigStore::new()
        .load::<Sample>(&NormalizedPath::new(&path))
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("JSON"));
    assert!(message.contains("broken.json"));
}
