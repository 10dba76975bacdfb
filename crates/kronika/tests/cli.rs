// ABOUTME: Integration tests for the kronika CLI binary.
// ABOUTME: Tests saved-HTML extraction, output formats, argument validation and fetching over HTTP.

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo::CommandCargoExt;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

const GALICJA_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Galicja Express</title></head>
<body>
<article>
  <h1>Nowy most w Jaśle</h1>
  <p>14.10.2024 10:11</p>
  <div class="post-text-two-red"><p>Most zostanie otwarty w grudniu.</p></div>
</article>
</body>
</html>"#;

fn kronika_cmd() -> Command {
    Command::cargo_bin("kronika").unwrap()
}

fn write_page(dir: &TempDir, html: &str) -> std::path::PathBuf {
    let path = dir.path().join("page.html");
    fs::write(&path, html).unwrap();
    path
}

#[test]
fn html_file_prints_json_record() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = write_page(&temp_dir, GALICJA_PAGE);

    let output = kronika_cmd()
        .arg("--html")
        .arg(&html_path)
        .arg("--url")
        .arg("https://galicjaexpress.pl/wiadomosci/most")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["title"], "Nowy most w Jaśle");
    assert_eq!(json["source_domain"], "galicjaexpress.pl");
    assert_eq!(json["published_at"], "2024-10-14T10:11:00+02:00");
    assert_eq!(json["content_text"], "Most zostanie otwarty w grudniu.");
}

#[test]
fn text_format_prints_body_text() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = write_page(&temp_dir, GALICJA_PAGE);

    kronika_cmd()
        .arg("--html")
        .arg(&html_path)
        .arg("--url")
        .arg("https://galicjaexpress.pl/a")
        .arg("--format")
        .arg("text")
        .assert()
        .success()
        .stdout(predicate::str::contains("Most zostanie otwarty w grudniu."))
        .stdout(predicate::str::contains("<p>").not());
}

#[test]
fn output_flag_writes_file() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = write_page(&temp_dir, GALICJA_PAGE);
    let out_path = temp_dir.path().join("record.html");

    kronika_cmd()
        .arg("--html")
        .arg(&html_path)
        .arg("--url")
        .arg("https://galicjaexpress.pl/a")
        .arg("-f")
        .arg("html")
        .arg("-o")
        .arg(&out_path)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = fs::read_to_string(&out_path).unwrap();
    assert_eq!(written, "<p>Most zostanie otwarty w grudniu.</p>");
}

#[test]
fn html_requires_url() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = write_page(&temp_dir, GALICJA_PAGE);

    kronika_cmd()
        .arg("--html")
        .arg(&html_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--url is required"));
}

#[test]
fn no_input_is_an_error() {
    kronika_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one URL is required"));
}

#[test]
fn html_and_positional_urls_conflict() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = write_page(&temp_dir, GALICJA_PAGE);

    kronika_cmd()
        .arg("--html")
        .arg(&html_path)
        .arg("--url")
        .arg("https://galicjaexpress.pl/a")
        .arg("https://galicjaexpress.pl/b")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot use both"));
}

#[test]
fn missing_article_body_fails() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = write_page(&temp_dir, "<html><body><h1>Pusto</h1></body></html>");

    kronika_cmd()
        .arg("--html")
        .arg(&html_path)
        .arg("--url")
        .arg("https://galicjaexpress.pl/a")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error extracting"))
        .stderr(predicate::str::contains("article content not found"));
}

#[test]
fn unknown_domain_rejected_on_request() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = write_page(&temp_dir, GALICJA_PAGE);

    kronika_cmd()
        .arg("--html")
        .arg(&html_path)
        .arg("--url")
        .arg("https://example.com/a")
        .arg("--reject-unknown-domains")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no scraper for domain"));
}

#[test]
fn multiple_urls_output_json_array() {
    let server = MockServer::start();

    let mock1 = server.mock(|when, then| {
        when.method(GET).path("/page1");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body("<html><body><article><h1>Jeden</h1><p>Strona pierwsza</p></article></body></html>");
    });

    let mock2 = server.mock(|when, then| {
        when.method(GET).path("/page2");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body("<html><body><article><h1>Dwa</h1><p>Strona druga</p></article></body></html>");
    });

    let output = kronika_cmd()
        .arg("--allow-private-networks")
        .arg(server.url("/page1"))
        .arg(server.url("/page2"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    mock1.assert();
    mock2.assert();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["title"], "Jeden");
    assert_eq!(records[1]["title"], "Dwa");
}

#[test]
fn private_network_blocked_by_default() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/page");
        then.status(200).body("<html><body><article>x</article></body></html>");
    });

    kronika_cmd()
        .arg(server.url("/page"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("error extracting"));
}
