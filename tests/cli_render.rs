mod util;

use predicates::str::contains;
use regex::Regex;
use util::{StoreDir, fimeval};

fn line_numbers(html: &str, section: &str) -> Vec<usize> {
    let re = Regex::new(&format!(
        r#"data-section="{section}"[^>]*>\s*<td[^>]*>(\d+)</td>"#
    ))
    .unwrap();
    re.captures_iter(html)
        .map(|c| c[1].parse().unwrap())
        .collect()
}

#[test]
fn render_writes_file_and_reports_path() {
    let dir = StoreDir::new();
    let out = dir.path("diff.html");

    fimeval()
        .args([
            "render",
            "--prefix",
            "a\nb\nc",
            "--suffix",
            "tail",
            "--expected",
            "x",
            "--baseline",
            "y1\ny2",
            "--post-finetune",
            "z",
            "--output",
        ])
        .arg(&out)
        .assert()
        .success()
        .stdout(contains("HTML file generated:"))
        .stdout(contains("diff.html"));

    let html = std::fs::read_to_string(&out).unwrap();
    assert_eq!(line_numbers(&html, "prefix"), vec![1, 2, 3]);
    assert_eq!(line_numbers(&html, "expected"), vec![4]);
    assert_eq!(line_numbers(&html, "baseline"), vec![4, 5]);
    assert_eq!(line_numbers(&html, "post-finetune"), vec![4]);
    assert_eq!(line_numbers(&html, "suffix"), vec![6]);
    assert!(!html.starts_with("<!DOCTYPE html>"));
}

#[test]
fn render_escapes_markup() {
    let dir = StoreDir::new();
    let out = dir.path("escaped.html");

    fimeval()
        .args([
            "render",
            "--prefix",
            "if a < b && c {",
            "--suffix",
            "}",
            "--expected",
            "<b>",
            "--baseline",
            "-1",
            "--post-finetune",
            "x & y",
            "--output",
        ])
        .arg(&out)
        .assert()
        .success();

    let html = std::fs::read_to_string(&out).unwrap();
    assert!(html.contains("if a &lt; b &amp;&amp; c {"));
    assert!(html.contains("&lt;b&gt;"));
    assert!(html.contains("x &amp; y"));
    assert!(html.contains(">-1</td>"));
}

#[test]
fn render_standalone_and_context_lines() {
    let dir = StoreDir::new();
    let out = dir.path("page.html");
    let prefix: Vec<String> = (1..=10).map(|i| format!("line{i}")).collect();

    fimeval()
        .args(["render", "--standalone", "--context-lines", "3", "--prefix"])
        .arg(prefix.join("\n"))
        .args([
            "--suffix",
            "s",
            "--expected",
            "e",
            "--baseline",
            "b",
            "--post-finetune",
            "p",
            "--output",
        ])
        .arg(&out)
        .assert()
        .success();

    let html = std::fs::read_to_string(&out).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("line8"));
    assert!(html.contains("line10"));
    assert!(!html.contains("line7"));
    assert_eq!(line_numbers(&html, "prefix"), vec![1, 2, 3]);
}

#[test]
fn render_unwritable_output_is_io_error() {
    let dir = StoreDir::new();

    fimeval()
        .args([
            "render",
            "--prefix",
            "a",
            "--suffix",
            "b",
            "--expected",
            "c",
            "--baseline",
            "d",
            "--post-finetune",
            "e",
            "--output",
        ])
        .arg(dir.path("missing-dir").join("out.html"))
        .assert()
        .code(6)
        .stderr(contains("failed to write"));
}

#[test]
fn render_requires_every_text() {
    fimeval()
        .args(["render", "--prefix", "a", "--output", "x.html"])
        .assert()
        .code(2);
}
