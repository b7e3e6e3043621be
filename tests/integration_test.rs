use assert_cmd::Command;
use predicates::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use user_records::config::Arguments;
use user_records::{dispatch, Error, Record};

const ONE: &str = r#"[{"id":"1","email":"a@x.com","age":30}]"#;

fn run(args: &[(&str, &str)]) -> user_records::Result<Vec<u8>> {
    let map: HashMap<String, String> = args
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let mut out: Vec<u8> = Vec::new();
    dispatch::perform(&Arguments::from_map(&map), &mut out)?;
    Ok(out)
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_add_then_find() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("users.json");
    fs::write(&file, ONE).unwrap();

    let item = r#"{"id":"2","email":"b@x.com","age":25}"#;
    let out = run(&[("operation", "add"), ("fileName", path_str(&file)), ("item", item), ("id", "2")]).unwrap();

    let expected = r#"[{"id":"1","email":"a@x.com","age":30},{"id":"2","email":"b@x.com","age":25}]"#;
    assert_eq!(out, expected.as_bytes());
    assert_eq!(fs::read_to_string(&file).unwrap(), expected);

    let found = run(&[("operation", "findById"), ("fileName", path_str(&file)), ("id", "2")]).unwrap();
    assert_eq!(found, item.as_bytes());
}

#[test]
fn test_add_duplicate_keeps_file_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("users.json");
    // Pretty-printed on purpose: a rewrite would compact it.
    let original = "[\n  {\"id\": \"1\", \"email\": \"a@x.com\", \"age\": 30}\n]\n";
    fs::write(&file, original).unwrap();

    let out = run(&[("operation", "add"), ("fileName", path_str(&file)), ("item", r#"{"id":"1"}"#)]).unwrap();
    assert_eq!(out, b"Item with id 1 already exists");
    assert_eq!(fs::read_to_string(&file).unwrap(), original);
}

#[test]
fn test_remove_then_list() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("users.json");
    let content = r#"[{"id":"1","email":"a@x.com","age":30},{"id":"2","email":"b@x.com","age":25},{"id":"3","email":"c@x.com","age":40}]"#;
    fs::write(&file, content).unwrap();

    run(&[("operation", "remove"), ("fileName", path_str(&file)), ("id", "2")]).unwrap();
    let listed = run(&[("operation", "list"), ("fileName", path_str(&file))]).unwrap();

    let records: Vec<Record> = serde_json::from_slice(&listed).unwrap();
    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
}

#[test]
fn test_remove_last_record_leaves_empty_array() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("users.json");
    fs::write(&file, ONE).unwrap();

    let out = run(&[("operation", "remove"), ("fileName", path_str(&file)), ("id", "1")]).unwrap();
    assert_eq!(out, b"[]");
    assert_eq!(fs::read_to_string(&file).unwrap(), "[]");
}

#[test]
fn test_remove_and_find_missing_id() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("users.json");
    fs::write(&file, ONE).unwrap();

    let out = run(&[("operation", "remove"), ("fileName", path_str(&file)), ("id", "9")]).unwrap();
    assert_eq!(out, b"Item with id 9 not found");
    assert_eq!(fs::read_to_string(&file).unwrap(), ONE);

    let out = run(&[("operation", "findById"), ("fileName", path_str(&file)), ("id", "9")]).unwrap();
    assert!(out.is_empty());
}

#[test]
fn test_round_trip_through_list() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("users.json");

    let record = Record {
        id: "u-1".to_string(),
        email: "u@x.com".to_string(),
        age: 52,
    };
    let item = serde_json::to_string(&record).unwrap();
    run(&[("operation", "add"), ("fileName", path_str(&file)), ("item", item.as_str())]).unwrap();

    let listed = run(&[("operation", "list"), ("fileName", path_str(&file))]).unwrap();
    let records: Vec<Record> = serde_json::from_slice(&listed).unwrap();
    assert_eq!(records, vec![record]);
}

#[test]
fn test_missing_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("absent.json");

    for (op, id) in [("list", ""), ("remove", "1"), ("findById", "1")] {
        let res = run(&[("operation", op), ("fileName", path_str(&file)), ("id", id)]);
        assert!(matches!(res, Err(Error::FileOpen { .. })), "{}", op);
    }
    assert!(!file.exists());
}

#[test]
fn test_validation_errors() {
    assert!(matches!(run(&[]), Err(Error::MissingOperation)));
    assert!(matches!(run(&[("operation", "purge")]), Err(Error::UnknownOperation(_))));
    assert!(matches!(run(&[("operation", "list")]), Err(Error::MissingFileName)));
    assert!(matches!(
        run(&[("operation", "add"), ("fileName", "x.json")]),
        Err(Error::MissingItem)
    ));
    assert!(matches!(
        run(&[("operation", "remove"), ("fileName", "x.json")]),
        Err(Error::MissingId)
    ));
}

#[test]
fn test_cli_add_and_list() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("users.json");
    fs::write(&file, ONE).unwrap();

    Command::cargo_bin("user-records")
        .unwrap()
        .env_remove("USER_RECORDS_FILE")
        .arg("-operation")
        .arg("add")
        .arg(format!("-fileName={}", path_str(&file)))
        .arg("-item")
        .arg(r#"{"id":"2","email":"b@x.com","age":25}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"id":"2","email":"b@x.com","age":25}"#));

    Command::cargo_bin("user-records")
        .unwrap()
        .args(["--operation", "list", "--fileName", path_str(&file)])
        .assert()
        .success()
        .stdout(fs::read_to_string(&file).unwrap());
}

#[test]
fn test_cli_file_name_from_env() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("users.json");
    fs::write(&file, ONE).unwrap();

    Command::cargo_bin("user-records")
        .unwrap()
        .env("USER_RECORDS_FILE", &file)
        .args(["-operation", "findById", "-id", "1"])
        .assert()
        .success()
        .stdout(r#"{"id":"1","email":"a@x.com","age":30}"#);
}

#[test]
fn test_cli_failure_exit() {
    Command::cargo_bin("user-records")
        .unwrap()
        .env_remove("USER_RECORDS_FILE")
        .args(["-operation", "list"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("-fileName flag has to be specified"));

    Command::cargo_bin("user-records")
        .unwrap()
        .args(["-operation", "upsert", "-fileName", "x.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("operation upsert not allowed"));
}

#[test]
fn test_cli_reports_os_error_once() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("absent.json");

    Command::cargo_bin("user-records")
        .unwrap()
        .args(["-operation", "list", "-fileName", path_str(&file)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not open"))
        .stderr(predicate::function(|err: &str| {
            err.matches("No such file or directory").count() == 1
        }));
}

#[test]
fn test_add_lenient_item_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("users.json");
    fs::write(&file, "[]").unwrap();

    let item = r#"{"Id":"3","Email":"c@x.com","age":"5"}"#;
    let out = run(&[("operation", "add"), ("fileName", path_str(&file)), ("item", item)]).unwrap();
    assert_eq!(out, br#"[{"id":"3","email":"c@x.com","age":0}]"#);
}

#[cfg(unix)]
#[test]
fn test_add_through_symlinked_store() {
    let dir = tempfile::tempdir().unwrap();
    let real = dir.path().join("real.json");
    let link = dir.path().join("link.json");
    fs::write(&real, "[]").unwrap();
    std::os::unix::fs::symlink(&real, &link).unwrap();

    run(&[("operation", "add"), ("fileName", path_str(&link)), ("item", r#"{"id":"1"}"#)]).unwrap();

    assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    assert_eq!(fs::read_to_string(&real).unwrap(), r#"[{"id":"1","email":"","age":0}]"#);
}
