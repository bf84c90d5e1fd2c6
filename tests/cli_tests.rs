//! Integration tests for the fofak binary

use assert_cmd::Command;
use calamine::{open_workbook_auto, Reader};
use predicates::prelude::*;
use rust_xlsxwriter::Workbook;
use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use tempfile::TempDir;

fn fofak(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("fofak"));
    cmd.current_dir(dir.path())
        .env_remove("FOFA_EMAIL")
        .env_remove("FOFA_KEY")
        .env_remove("RUST_LOG")
        .env_remove("HTTP_PROXY")
        .env_remove("http_proxy")
        .env_remove("ALL_PROXY")
        .env_remove("all_proxy");
    cmd
}

/// Answers a single request with `body` as JSON. Returns the base URL.
fn serve_once(body: &'static str) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).expect("read");
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).expect("write");
    });
    (format!("http://{addr}/api/v1/search/all"), handle)
}

fn write_config(dir: &TempDir, api_url: &str, extra: &str) {
    fs::write(
        dir.path().join("fofak.toml"),
        format!("email = \"me@example.com\"\nkey = \"k3y\"\napi_url = \"{api_url}\"\ntimeout_secs = 5\n{extra}"),
    )
    .expect("write config");
}

fn sheet_names(path: &std::path::Path) -> Vec<String> {
    open_workbook_auto(path).expect("open workbook").sheet_names()
}

const TWO_ROWS: &str = r#"{"error":false,"size":99,"results":[
    ["10.0.0.8:8080","10.0.0.8","8080","Jenkins","","US","http"],
    ["portal.example.com","1.2.3.4","443","Portal","example.com","DE","https"]
]}"#;

#[test]
fn test_cli_help() {
    let tmp = TempDir::new().expect("tmp");
    fofak(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--query"))
        .stdout(predicate::str::contains("--exclude"));
}

#[test]
fn test_missing_query_is_usage_error() {
    let tmp = TempDir::new().expect("tmp");
    fofak(&tmp).arg("--exclude").assert().failure();
}

#[test]
fn test_missing_credentials_exit_one() {
    let tmp = TempDir::new().expect("tmp");
    fofak(&tmp)
        .args(["--query", "app=\"Apache-Tomcat\""])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("FOFA email and API key are required"));
    assert!(!tmp.path().join("results.xlsx").exists());
}

#[test]
fn test_zero_size_rejected() {
    let tmp = TempDir::new().expect("tmp");
    fofak(&tmp)
        .args(["--query", "port=\"80\"", "--size", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--size must be greater than 0"));
}

#[test]
fn test_unreachable_endpoint_writes_nothing() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(
        tmp.path().join("fofak.toml"),
        "email = \"me@example.com\"\n\
         key = \"k3y\"\n\
         api_url = \"http://127.0.0.1:9/api/v1/search/all\"\n\
         timeout_secs = 5\n",
    )
    .expect("write config");

    fofak(&tmp)
        .args(["--query", "port=\"80\"", "--exclude", "--output", "out"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("HTTP request failed"))
        .stderr(predicate::str::contains("k3y").not());
    assert!(!tmp.path().join("out.xlsx").exists());
}

#[test]
fn test_successful_search_writes_workbook() {
    let tmp = TempDir::new().expect("tmp");
    let (url, server) = serve_once(TWO_ROWS);
    write_config(&tmp, &url, "");

    fofak(&tmp)
        .args(["--query", "port=\"8080\"", "--output", "reports/scan"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total records: 2"))
        .stdout(predicate::str::contains("Total matches (FOFA): 99"));
    server.join().expect("server");

    let path = tmp.path().join("reports/scan.xlsx");
    assert_eq!(sheet_names(&path), vec!["results".to_string()]);
}

#[test]
fn test_no_results_exits_zero_without_file() {
    let tmp = TempDir::new().expect("tmp");
    let (url, server) = serve_once(r#"{"error":false,"size":0,"results":[]}"#);
    write_config(&tmp, &url, "");

    fofak(&tmp)
        .args(["--query", "title=\"nothing\""])
        .assert()
        .success()
        .stdout(predicate::str::contains("No results found"));
    server.join().expect("server");

    assert!(!tmp.path().join("results.xlsx").exists());
}

#[test]
fn test_api_error_message_is_reported() {
    let tmp = TempDir::new().expect("tmp");
    let (url, server) = serve_once(r#"{"error":true,"errmsg":"[820000] bad query"}"#);
    write_config(&tmp, &url, "");

    fofak(&tmp)
        .args(["--query", "title="])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("FOFA API error: [820000] bad query"));
    server.join().expect("server");

    assert!(!tmp.path().join("results.xlsx").exists());
}

#[test]
fn test_exclude_with_missing_list_falls_back() {
    let tmp = TempDir::new().expect("tmp");
    let (url, server) = serve_once(TWO_ROWS);
    write_config(&tmp, &url, "");

    fofak(&tmp)
        .args(["--query", "port=\"8080\"", "--exclude"])
        .assert()
        .success()
        .stderr(predicate::str::contains("exclusion file not found"))
        .stdout(predicate::str::contains("Excluded:").not());
    server.join().expect("server");

    assert_eq!(sheet_names(&tmp.path().join("results.xlsx")), vec!["results".to_string()]);
}

#[test]
fn test_exclude_marks_listed_hosts() {
    let tmp = TempDir::new().expect("tmp");
    let list_path = tmp.path().join("skip.xlsx");
    let mut list = Workbook::new();
    let sheet = list.add_worksheet();
    sheet.write_string(0, 0, "10.0.0.8").expect("cell");
    sheet.write_string(0, 1, "build server").expect("cell");
    list.save(&list_path).expect("save list");

    let (url, server) = serve_once(TWO_ROWS);
    write_config(&tmp, &url, "exclude_file = \"skip.xlsx\"\n");

    fofak(&tmp)
        .args(["--query", "port=\"8080\"", "--exclude"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Excluded: 1"))
        .stdout(predicate::str::contains("Valid: 1"))
        .stdout(predicate::str::contains("Excluded with remark: 1"));
    server.join().expect("server");

    assert_eq!(
        sheet_names(&tmp.path().join("results.xlsx")),
        ["results", "valid", "excluded", "exclusion list"].map(String::from).to_vec()
    );
}

#[test]
fn test_explicit_config_must_exist() {
    let tmp = TempDir::new().expect("tmp");
    fofak(&tmp)
        .args(["--query", "x", "--config", "missing.toml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("config file not found"));
}
