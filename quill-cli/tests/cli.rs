use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn site() -> TempDir {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "quill.yml",
        r#"
paths:
  corpus: "blog"
  index: ".cache/content-index.json"
i18n:
  locales: [en, zh]
  default_locale: zh
"#,
    );
    write(
        root,
        "blog/home/hello.md",
        "---\nslug: hello\ntitle: Hello\ndate: 2024-03-01\ntags: [Rust]\n---\n你好world\n见[[Second Post]]\n",
    );
    write(
        root,
        "blog/home/Second Post.md",
        "---\nslug: second\ntitle: Second\ndate: 2024-1-5\n---\nSecond body\n",
    );
    write(
        root,
        "blog/daily/2024/d1.md",
        "---\nslug: d1\ndate: 2024-02-02\n---\nDaily note\n",
    );
    dir
}

fn quill(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("quill").unwrap();
    cmd.current_dir(dir.path()).arg("--config").arg("quill.yml");
    cmd
}

#[test]
fn index_writes_artifact() -> Result<(), Box<dyn std::error::Error>> {
    let dir = site();

    quill(&dir)
        .arg("index")
        .assert()
        .success()
        .stdout(predicate::str::contains("Indexed 3 of 3 markdown files"));

    let raw = fs::read_to_string(dir.path().join(".cache/content-index.json"))?;
    let value: Value = serde_json::from_str(&raw)?;
    assert!(value["generatedAt"].is_string());

    let items = value["items"].as_array().expect("items array");
    assert_eq!(items.len(), 3);
    let second = items
        .iter()
        .find(|item| item["slug"] == "second")
        .expect("second entry");
    assert_eq!(second["type"], "post");
    assert_eq!(second["fileNameBase"], "Second Post");
    assert_eq!(second["date"], "2024-01-05");

    Ok(())
}

#[test]
fn list_json_is_newest_first() -> Result<(), Box<dyn std::error::Error>> {
    let dir = site();

    let assert = quill(&dir).args(["list", "--json"]).assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
    let value: Value = serde_json::from_str(&stdout)?;
    let slugs: Vec<_> = value
        .as_array()
        .expect("json array")
        .iter()
        .map(|p| p["slug"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(slugs, vec!["hello", "second"]);
    assert_eq!(value[0]["tags"][0], "rust");

    quill(&dir)
        .args(["list", "--daily"])
        .assert()
        .success()
        .stdout(predicate::str::contains("d1").and(predicate::str::contains("1 daily entries")));

    Ok(())
}

#[test]
fn render_resolves_wiki_links_per_locale() {
    let dir = site();

    quill(&dir)
        .args(["render", "hello"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("<p>你好 world</p>")
                .and(predicate::str::contains("href=\"/posts/second\"")),
        );

    quill(&dir)
        .args(["render", "hello", "--lang", "en"])
        .assert()
        .success()
        .stdout(predicate::str::contains("href=\"/en/posts/second\""));
}

#[test]
fn render_json_carries_metadata() -> Result<(), Box<dyn std::error::Error>> {
    let dir = site();

    let assert = quill(&dir)
        .args(["render", "hello", "--format", "json"])
        .assert()
        .success();
    let value: Value = serde_json::from_slice(&assert.get_output().stdout)?;
    assert_eq!(value["slug"], "hello");
    assert_eq!(value["title"], "Hello");
    assert_eq!(value["date"], "2024-03-01");
    assert_eq!(value["unresolvedLinks"], 0);
    assert!(value["html"].as_str().unwrap_or_default().contains("<a href="));

    Ok(())
}

#[test]
fn render_rejects_unknown_slug_and_locale() {
    let dir = site();

    quill(&dir)
        .args(["render", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No document with slug 'nope'"));

    quill(&dir)
        .args(["render", "hello", "--lang", "fr"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported locale 'fr'"));
}

#[test]
fn normalize_check_then_fix() {
    let dir = site();

    quill(&dir)
        .arg("normalize")
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "date_not_normalized(2024-1-5=>2024-01-05)",
        ));

    quill(&dir)
        .args(["normalize", "--fix"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 updated"));

    let fixed = fs::read_to_string(dir.path().join("blog/home/Second Post.md")).unwrap();
    assert!(fixed.contains("2024-01-05"));
    assert!(fixed.ends_with("Second body\n"));

    quill(&dir).arg("normalize").assert().success();
}

#[test]
fn verify_reports_stale_index() -> Result<(), Box<dyn std::error::Error>> {
    let dir = site();
    quill(&dir).arg("index").assert().success();

    write(
        dir.path(),
        "blog/home/hello.md",
        "---\nslug: hello-again\ndate: 2024-03-01\n---\nbody\n",
    );

    let assert = quill(&dir).args(["verify", "--json"]).assert().success();
    let value: Value = serde_json::from_slice(&assert.get_output().stdout)?;
    assert_eq!(value["documents"], 3);

    let codes: Vec<_> = value["diagnostics"]
        .as_array()
        .expect("diagnostics array")
        .iter()
        .map(|d| d["code"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(codes, vec!["slug.mismatch"]);

    Ok(())
}
